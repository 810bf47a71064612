//! 密钥存储 - 基础设施层
//!
//! 进程启动时从环境变量读取一次，之后只读。

use crate::error::CredentialError;
use crate::models::ProviderIdentity;
use std::collections::HashMap;
use std::fmt;

/// 单个服务的密钥
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    provider: ProviderIdentity,
    secret: String,
}

impl Credential {
    pub fn new(provider: ProviderIdentity, secret: impl Into<String>) -> Self {
        Self {
            provider,
            secret: secret.into(),
        }
    }

    pub fn provider(&self) -> ProviderIdentity {
        self.provider
    }

    /// 明文密钥，只允许用于构造出站请求
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("provider", &self.provider)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// 密钥存储
///
/// 职责：
/// - 启动时一次性加载所有服务的密钥
/// - 缺失或为空的密钥视为未配置（fail closed）
/// - 只读，可在并发调用间共享，无需加锁
#[derive(Debug, Default)]
pub struct CredentialStore {
    credentials: HashMap<ProviderIdentity, Credential>,
}

impl CredentialStore {
    /// 从进程环境变量加载
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 用任意查找函数加载（便于测试）
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let credentials = ProviderIdentity::ALL
            .into_iter()
            .filter_map(|provider| {
                let var = provider.credential_env_var()?;
                let secret = lookup(var)?;
                let secret = secret.trim();
                if secret.is_empty() {
                    return None;
                }
                Some((provider, Credential::new(provider, secret)))
            })
            .collect();

        Self { credentials }
    }

    /// 追加一个密钥（构造阶段使用）
    pub fn with_credential(
        mut self,
        provider: ProviderIdentity,
        secret: impl Into<String>,
    ) -> Self {
        self.credentials
            .insert(provider, Credential::new(provider, secret));
        self
    }

    /// 获取服务的密钥
    pub fn get(&self, provider: ProviderIdentity) -> Result<&Credential, CredentialError> {
        self.credentials
            .get(&provider)
            .ok_or(CredentialError::Missing {
                provider,
                env_var: provider.credential_env_var(),
            })
    }

    pub fn contains(&self, provider: ProviderIdentity) -> bool {
        self.credentials.contains_key(&provider)
    }

    /// 已配置密钥的服务（按注册表顺序）
    pub fn configured(&self) -> Vec<ProviderIdentity> {
        ProviderIdentity::ALL
            .into_iter()
            .filter(|p| self.contains(*p))
            .collect()
    }
}
