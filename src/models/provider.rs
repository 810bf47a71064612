//! 分析能力标识
//!
//! 每个外部服务（或本地计算）对应一个固定的 `ProviderIdentity`，
//! 它是合并报告时的唯一键。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 分析能力标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProviderIdentity {
    /// 语法 / 拼写检查（Sapling）
    Grammar,
    /// 原创性检测 A（Copyleaks）
    OriginalityA,
    /// 原创性检测 B（Copyscape）
    OriginalityB,
    /// 引用查询（Zotero）
    Citation,
    /// 改写建议（RapidAPI）
    Paraphrase,
    /// 本地可读性评分
    Readability,
}

impl ProviderIdentity {
    /// 完整的注册表顺序
    pub const ALL: [ProviderIdentity; 6] = [
        ProviderIdentity::Grammar,
        ProviderIdentity::OriginalityA,
        ProviderIdentity::OriginalityB,
        ProviderIdentity::Citation,
        ProviderIdentity::Paraphrase,
        ProviderIdentity::Readability,
    ];

    /// 对外报告中使用的字段名
    pub fn field_name(self) -> &'static str {
        match self {
            ProviderIdentity::Grammar => "sapling",
            ProviderIdentity::OriginalityA => "copyleaks",
            ProviderIdentity::OriginalityB => "copyscape",
            ProviderIdentity::Citation => "zotero_citations",
            ProviderIdentity::Paraphrase => "rapidapi",
            ProviderIdentity::Readability => "readability_scores",
        }
    }

    /// 存放密钥的环境变量名；本地能力返回 `None`
    pub fn credential_env_var(self) -> Option<&'static str> {
        match self {
            ProviderIdentity::Grammar => Some("SAPLING_API_KEY"),
            ProviderIdentity::OriginalityA => Some("COPYLEAKS_API_KEY"),
            ProviderIdentity::OriginalityB => Some("COPYSCAPE_API_KEY"),
            ProviderIdentity::Citation => Some("ZOTERO_API_KEY"),
            ProviderIdentity::Paraphrase => Some("RAPIDAPI_KEY"),
            ProviderIdentity::Readability => None,
        }
    }

    /// 是否需要网络调用
    pub fn is_remote(self) -> bool {
        !matches!(self, ProviderIdentity::Readability)
    }

    /// 从对外字段名解析
    pub fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.field_name() == name)
    }
}

impl fmt::Display for ProviderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderIdentity::Grammar => "Grammar",
            ProviderIdentity::OriginalityA => "OriginalityA",
            ProviderIdentity::OriginalityB => "OriginalityB",
            ProviderIdentity::Citation => "Citation",
            ProviderIdentity::Paraphrase => "Paraphrase",
            ProviderIdentity::Readability => "Readability",
        };
        write!(f, "{}", name)
    }
}
