use std::fmt;

use crate::models::{ErrorKind, ProviderIdentity};

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 配置错误
    Config(ConfigError),
    /// 密钥错误
    Credential(CredentialError),
    /// 外部服务调用错误
    Provider(ProviderError),
    /// HTTP 服务错误
    Server(ServerError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Credential(e) => write!(f, "密钥错误: {}", e),
            AppError::Provider(e) => write!(f, "服务错误: {}", e),
            AppError::Server(e) => write!(f, "HTTP服务错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(e) => Some(e),
            AppError::Credential(e) => Some(e),
            AppError::Provider(e) => Some(e),
            AppError::Server(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 外部服务调用错误
///
/// 只在服务层内部流转，最终通过 [`ProviderError::kind`] 归类为 `ErrorKind`。
/// 所有 `Display` 输出都不包含密钥。
#[derive(Debug)]
pub enum ProviderError {
    /// 输入文本为空
    InvalidInput,
    /// 未配置密钥
    MissingCredential { provider: ProviderIdentity },
    /// 网络请求失败（连接失败、TLS 失败、超时等）
    RequestFailed {
        endpoint: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 非 2xx 响应
    BadStatus {
        endpoint: String,
        status: u16,
        body_preview: String,
    },
    /// 2xx 但响应体无法解析
    MalformedBody {
        endpoint: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ProviderError {
    /// 映射到报告中的错误分类
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProviderError::InvalidInput => ErrorKind::InvalidInput,
            ProviderError::MissingCredential { .. } => ErrorKind::MissingCredential,
            ProviderError::RequestFailed { .. } | ProviderError::BadStatus { .. } => {
                ErrorKind::RemoteError
            }
            ProviderError::MalformedBody { .. } => ErrorKind::MalformedResponse,
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::InvalidInput => write!(f, "输入文本不能为空"),
            ProviderError::MissingCredential { provider } => {
                write!(f, "未配置 {} 的密钥", provider)
            }
            ProviderError::RequestFailed { endpoint, source } => {
                write!(f, "请求失败 ({}): {}", endpoint, source)
            }
            ProviderError::BadStatus {
                endpoint,
                status,
                body_preview,
            } => {
                write!(
                    f,
                    "服务返回错误状态 ({}): status={}, body={}",
                    endpoint, status, body_preview
                )
            }
            ProviderError::MalformedBody { endpoint, source } => {
                write!(f, "响应体解析失败 ({}): {}", endpoint, source)
            }
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProviderError::RequestFailed { source, .. }
            | ProviderError::MalformedBody { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 密钥错误
#[derive(Debug)]
pub enum CredentialError {
    /// 环境中没有该服务的密钥
    Missing {
        provider: ProviderIdentity,
        env_var: Option<&'static str>,
    },
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::Missing {
                provider,
                env_var: Some(var),
            } => write!(f, "{} 缺少密钥 (环境变量 {} 未设置)", provider, var),
            CredentialError::Missing {
                provider,
                env_var: None,
            } => write!(f, "{} 不使用密钥", provider),
        }
    }
}

impl std::error::Error for CredentialError {}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置值非法
    InvalidValue { field: String, reason: String },
    /// 读取配置文件失败
    FileReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    TomlParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "配置项 {} 非法: {}", field, reason)
            }
            ConfigError::FileReadFailed { path, source } => {
                write!(f, "读取配置文件失败 ({}): {}", path, source)
            }
            ConfigError::TomlParseFailed { path, source } => {
                write!(f, "TOML解析失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::FileReadFailed { source, .. }
            | ConfigError::TomlParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// HTTP 服务错误
#[derive(Debug)]
pub enum ServerError {
    /// 绑定监听地址失败
    BindFailed {
        address: String,
        source: std::io::Error,
    },
    /// 服务运行中的 I/O 错误
    Io { source: std::io::Error },
    /// 构建 HTTP 客户端失败
    ClientBuildFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::BindFailed { address, source } => {
                write!(f, "无法监听 {}: {}", address, source)
            }
            ServerError::Io { source } => write!(f, "I/O错误: {}", source),
            ServerError::ClientBuildFailed { source } => {
                write!(f, "无法构建 HTTP 客户端: {}", source)
            }
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::BindFailed { source, .. } | ServerError::Io { source } => Some(source),
            ServerError::ClientBuildFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

// ========== 从常见错误类型转换 ==========

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::Provider(err)
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        AppError::Credential(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(ConfigError::TomlParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Server(ServerError::Io { source: err })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建配置值非法错误
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Config(ConfigError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        })
    }

    /// 创建监听失败错误
    pub fn bind_failed(address: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Server(ServerError::BindFailed {
            address: address.into(),
            source,
        })
    }
}

impl ProviderError {
    /// 创建网络请求失败错误，去掉 URL 以免查询参数（正文）进入日志
    pub fn request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        ProviderError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source.without_url()),
        }
    }

    /// 创建响应体解析失败错误
    pub fn malformed_body(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ProviderError::MalformedBody {
            endpoint: endpoint.into(),
            source: Box::new(source),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

/// 服务层结果类型
pub type ProviderOutcome<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_kinds() {
        assert_eq!(ProviderError::InvalidInput.kind(), ErrorKind::InvalidInput);
        assert_eq!(
            ProviderError::MissingCredential {
                provider: ProviderIdentity::Citation
            }
            .kind(),
            ErrorKind::MissingCredential
        );
        let bad_status = ProviderError::BadStatus {
            endpoint: "https://example.invalid".to_string(),
            status: 500,
            body_preview: String::new(),
        };
        assert_eq!(bad_status.kind(), ErrorKind::RemoteError);

        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        assert_eq!(
            ProviderError::malformed_body("x", json_err).kind(),
            ErrorKind::MalformedResponse
        );
    }

    #[test]
    fn test_missing_credential_names_env_var() {
        let err = CredentialError::Missing {
            provider: ProviderIdentity::Grammar,
            env_var: Some("SAPLING_API_KEY"),
        };
        assert!(err.to_string().contains("SAPLING_API_KEY"));
    }
}
