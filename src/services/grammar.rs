//! 语法检查服务 - 业务能力层
//!
//! Sapling spellcheck 接口，Bearer 认证，JSON 请求体

use crate::config::Config;
use crate::error::ProviderOutcome;
use crate::infrastructure::{Credential, HttpExecutor};
use crate::models::ProviderIdentity;
use crate::services::provider::ProviderClient;
use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

/// 语法检查服务
pub struct GrammarProvider {
    executor: Arc<HttpExecutor>,
    endpoint: String,
}

impl GrammarProvider {
    pub fn new(executor: Arc<HttpExecutor>, config: &Config) -> Self {
        Self::with_endpoint(executor, config.sapling_api_url.clone())
    }

    pub fn with_endpoint(executor: Arc<HttpExecutor>, endpoint: impl Into<String>) -> Self {
        Self {
            executor,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ProviderClient for GrammarProvider {
    fn identity(&self) -> ProviderIdentity {
        ProviderIdentity::Grammar
    }

    fn endpoint(&self) -> Option<&str> {
        Some(&self.endpoint)
    }

    async fn call(
        &self,
        text: &str,
        credential: Option<&Credential>,
    ) -> ProviderOutcome<JsonValue> {
        let bearer = format!("Bearer {}", credential.map(|c| c.secret()).unwrap_or_default());
        let body = json!({ "text": text });

        self.executor
            .post_json(&self.endpoint, &[("authorization", bearer.as_str())], &body)
            .await
    }
}
