use crate::error::{AppError, AppResult, ConfigError};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_FILE: &str = "essay_report.toml";

/// 程序配置
///
/// 不包含任何密钥；密钥只通过 [`crate::infrastructure::CredentialStore`] 读取。
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP 监听地址
    pub bind_address: String,
    /// 单个服务的超时时间（秒）
    pub provider_timeout_secs: u64,
    /// 整个请求的截止时间（秒）
    pub request_deadline_secs: u64,
    /// 允许明文 HTTP（仅用于本地 mock 服务）
    pub allow_insecure_http: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 服务端点 ---
    pub sapling_api_url: String,
    pub copyleaks_api_url: String,
    pub copyscape_api_url: String,
    pub zotero_api_url: String,
    pub zotero_user_id: String,
    pub rapidapi_url: String,
    pub rapidapi_host: String,
    /// 引用查询时截取的最大字符数
    pub citation_query_max_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5000".to_string(),
            provider_timeout_secs: 10,
            request_deadline_secs: 30,
            allow_insecure_http: false,
            verbose_logging: false,
            sapling_api_url: "https://api.sapling.ai/api/v1/spellcheck".to_string(),
            copyleaks_api_url: "https://api.copyleaks.com/v3/education/submit/text".to_string(),
            copyscape_api_url: "https://www.copyscape.com/api/".to_string(),
            zotero_api_url: "https://api.zotero.org".to_string(),
            zotero_user_id: "14615578".to_string(),
            rapidapi_url: "https://paraphrasing-tool.p.rapidapi.com/api/v1/paraphrase".to_string(),
            rapidapi_host: "paraphrasing-tool.p.rapidapi.com".to_string(),
            citation_query_max_chars: 200,
        }
    }
}

impl Config {
    /// 默认配置 + 环境变量覆盖
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 加载配置文件（可选）并应用环境变量覆盖
    ///
    /// 文件不存在时使用默认值；存在但无法解析时返回错误。
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let base = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| {
                AppError::Config(ConfigError::FileReadFailed {
                    path: path.display().to_string(),
                    source: Box::new(e),
                })
            })?;
            Self::from_toml_str(&content).map_err(|e| match e {
                AppError::Config(ConfigError::TomlParseFailed { source, .. }) => {
                    AppError::Config(ConfigError::TomlParseFailed {
                        path: path.display().to_string(),
                        source,
                    })
                }
                other => other,
            })?
        } else {
            Self::default()
        };

        let config = base.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文本解析，未出现的字段取默认值
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// 应用环境变量覆盖
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// 用任意查找函数覆盖配置（便于测试）
    pub fn with_overrides(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            bind_address: lookup("ESSAY_BIND_ADDRESS").unwrap_or(self.bind_address),
            provider_timeout_secs: parse_var(&lookup, "PROVIDER_TIMEOUT_SECS")
                .unwrap_or(self.provider_timeout_secs),
            request_deadline_secs: parse_var(&lookup, "REQUEST_DEADLINE_SECS")
                .unwrap_or(self.request_deadline_secs),
            allow_insecure_http: parse_var(&lookup, "ALLOW_INSECURE_HTTP")
                .unwrap_or(self.allow_insecure_http),
            verbose_logging: parse_var(&lookup, "VERBOSE_LOGGING").unwrap_or(self.verbose_logging),
            sapling_api_url: lookup("SAPLING_API_URL").unwrap_or(self.sapling_api_url),
            copyleaks_api_url: lookup("COPYLEAKS_API_URL").unwrap_or(self.copyleaks_api_url),
            copyscape_api_url: lookup("COPYSCAPE_API_URL").unwrap_or(self.copyscape_api_url),
            zotero_api_url: lookup("ZOTERO_API_URL").unwrap_or(self.zotero_api_url),
            zotero_user_id: lookup("ZOTERO_USER_ID").unwrap_or(self.zotero_user_id),
            rapidapi_url: lookup("RAPIDAPI_URL").unwrap_or(self.rapidapi_url),
            rapidapi_host: lookup("RAPIDAPI_HOST").unwrap_or(self.rapidapi_host),
            citation_query_max_chars: parse_var(&lookup, "CITATION_QUERY_MAX_CHARS")
                .unwrap_or(self.citation_query_max_chars),
        }
    }

    /// 校验配置
    pub fn validate(&self) -> AppResult<()> {
        if self.provider_timeout_secs == 0 {
            return Err(AppError::invalid_config("provider_timeout_secs", "必须大于 0"));
        }
        if self.request_deadline_secs < self.provider_timeout_secs {
            return Err(AppError::invalid_config(
                "request_deadline_secs",
                format!(
                    "不能小于单个服务超时 ({}s)",
                    self.provider_timeout_secs
                ),
            ));
        }
        if self.bind_address.parse::<SocketAddr>().is_err() {
            return Err(AppError::invalid_config(
                "bind_address",
                format!("无法解析地址 '{}'", self.bind_address),
            ));
        }
        if self.citation_query_max_chars == 0 {
            return Err(AppError::invalid_config("citation_query_max_chars", "必须大于 0"));
        }
        Ok(())
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    pub fn request_deadline(&self) -> Duration {
        Duration::from_secs(self.request_deadline_secs)
    }
}

/// 读取并解析变量，解析失败视为未设置
fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    lookup(name).and_then(|v| v.trim().parse().ok())
}
