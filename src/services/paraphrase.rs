//! 改写建议服务 - 业务能力层
//!
//! RapidAPI 改写接口，`X-RapidAPI-Key` / `X-RapidAPI-Host` 请求头认证

use crate::config::Config;
use crate::error::ProviderOutcome;
use crate::infrastructure::{Credential, HttpExecutor};
use crate::models::ProviderIdentity;
use crate::services::provider::ProviderClient;
use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

/// 改写建议服务
pub struct ParaphraseProvider {
    executor: Arc<HttpExecutor>,
    endpoint: String,
    host: String,
}

impl ParaphraseProvider {
    pub fn new(executor: Arc<HttpExecutor>, config: &Config) -> Self {
        Self::with_endpoint(executor, config.rapidapi_url.clone(), config.rapidapi_host.clone())
    }

    pub fn with_endpoint(
        executor: Arc<HttpExecutor>,
        endpoint: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            executor,
            endpoint: endpoint.into(),
            host: host.into(),
        }
    }
}

#[async_trait]
impl ProviderClient for ParaphraseProvider {
    fn identity(&self) -> ProviderIdentity {
        ProviderIdentity::Paraphrase
    }

    fn endpoint(&self) -> Option<&str> {
        Some(&self.endpoint)
    }

    async fn call(
        &self,
        text: &str,
        credential: Option<&Credential>,
    ) -> ProviderOutcome<JsonValue> {
        let key = credential.map(|c| c.secret()).unwrap_or_default();
        let headers = [("x-rapidapi-key", key), ("x-rapidapi-host", self.host.as_str())];

        self.executor
            .post_json(&self.endpoint, &headers, &json!({ "text": text }))
            .await
    }
}
