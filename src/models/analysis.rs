//! 单次分析请求的数据模型
//!
//! `AnalysisRequest` 与 `AggregateReport` 都是请求级对象：创建、使用、丢弃。

use crate::models::ProviderIdentity;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

/// 失败分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// 输入文本为空或非法
    InvalidInput,
    /// 未配置该服务的密钥
    MissingCredential,
    /// 传输失败或非 2xx 响应
    RemoteError,
    /// 超过截止时间
    Timeout,
    /// 2xx 但响应体无法解析
    MalformedResponse,
    /// 内部兜底错误
    InternalError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::MissingCredential => "MissingCredential",
            ErrorKind::RemoteError => "RemoteError",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::MalformedResponse => "MalformedResponse",
            ErrorKind::InternalError => "InternalError",
        };
        write!(f, "{}", name)
    }
}

/// 单个服务的分析结果
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderResult {
    /// 解码后的结构化响应，不做二次解释
    Success(JsonValue),
    /// 失败描述
    Failure { kind: ErrorKind, message: String },
}

impl ProviderResult {
    /// 构造失败结果
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        ProviderResult::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProviderResult::Success(_))
    }

    /// 失败时返回错误分类
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            ProviderResult::Success(_) => None,
            ProviderResult::Failure { kind, .. } => Some(*kind),
        }
    }

    pub fn payload(&self) -> Option<&JsonValue> {
        match self {
            ProviderResult::Success(payload) => Some(payload),
            ProviderResult::Failure { .. } => None,
        }
    }
}

/// 入站分析请求
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnalysisRequest {
    pub text: String,
}

impl AnalysisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// 文本是否可分析（去除空白后非空）
    pub fn is_valid(&self) -> bool {
        is_analyzable(&self.text)
    }
}

/// 判断文本是否可分析
pub fn is_analyzable(text: &str) -> bool {
    !text.trim().is_empty()
}

/// 聚合报告
///
/// 每个已注册的服务恰好对应一个条目，无论成功与否。
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateReport {
    pub original_text: String,
    pub results: BTreeMap<ProviderIdentity, ProviderResult>,
}

impl AggregateReport {
    /// 创建空报告
    pub fn new(original_text: impl Into<String>) -> Self {
        Self {
            original_text: original_text.into(),
            results: BTreeMap::new(),
        }
    }

    /// 记录结果；同一服务重复写入时保留最后一次
    pub fn insert(&mut self, provider: ProviderIdentity, result: ProviderResult) {
        self.results.insert(provider, result);
    }

    pub fn get(&self, provider: ProviderIdentity) -> Option<&ProviderResult> {
        self.results.get(&provider)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.results.values().filter(|r| r.is_success()).count()
    }

    /// 所有失败的服务及其分类
    pub fn failures(&self) -> Vec<(ProviderIdentity, ErrorKind)> {
        self.results
            .iter()
            .filter_map(|(p, r)| r.error_kind().map(|k| (*p, k)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_whitespace_only_text_is_not_analyzable() {
        assert!(!AnalysisRequest::new("").is_valid());
        assert!(!AnalysisRequest::new("  \n\t ").is_valid());
        assert!(AnalysisRequest::new("hi").is_valid());
    }

    #[test]
    fn test_report_counts() {
        let mut report = AggregateReport::new("text");
        report.insert(ProviderIdentity::Grammar, ProviderResult::Success(json!({})));
        report.insert(
            ProviderIdentity::Citation,
            ProviderResult::failure(ErrorKind::Timeout, "slow"),
        );

        assert_eq!(report.len(), 2);
        assert_eq!(report.success_count(), 1);
        assert_eq!(
            report.failures(),
            vec![(ProviderIdentity::Citation, ErrorKind::Timeout)]
        );
    }

    #[test]
    fn test_error_kind_display_matches_serde_name() {
        let serialized = serde_json::to_value(ErrorKind::MalformedResponse).unwrap();
        assert_eq!(serialized, json!(ErrorKind::MalformedResponse.to_string()));
    }
}
