//! 原创性检测服务 - 业务能力层
//!
//! 两个独立的检测服务，密钥都放在表单请求体中：
//! - Copyleaks（OriginalityA）
//! - Copyscape（OriginalityB）

use crate::config::Config;
use crate::error::ProviderOutcome;
use crate::infrastructure::{Credential, HttpExecutor};
use crate::models::ProviderIdentity;
use crate::services::provider::ProviderClient;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Copyleaks 原创性检测
pub struct CopyleaksProvider {
    executor: Arc<HttpExecutor>,
    endpoint: String,
}

impl CopyleaksProvider {
    pub fn new(executor: Arc<HttpExecutor>, config: &Config) -> Self {
        Self::with_endpoint(executor, config.copyleaks_api_url.clone())
    }

    pub fn with_endpoint(executor: Arc<HttpExecutor>, endpoint: impl Into<String>) -> Self {
        Self {
            executor,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ProviderClient for CopyleaksProvider {
    fn identity(&self) -> ProviderIdentity {
        ProviderIdentity::OriginalityA
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
        self.executor
            .post_form(&self.endpoint, &[], &[("text", text), ("key", key)])
            .await
    }
}

/// Copyscape 原创性检测
pub struct CopyscapeProvider {
    executor: Arc<HttpExecutor>,
    endpoint: String,
}

impl CopyscapeProvider {
    pub fn new(executor: Arc<HttpExecutor>, config: &Config) -> Self {
        Self::with_endpoint(executor, config.copyscape_api_url.clone())
    }

    pub fn with_endpoint(executor: Arc<HttpExecutor>, endpoint: impl Into<String>) -> Self {
        Self {
            executor,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ProviderClient for CopyscapeProvider {
    fn identity(&self) -> ProviderIdentity {
        ProviderIdentity::OriginalityB
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
        let form = [
            ("o", "csearch"),
            ("e", "UTF-8"),
            ("f", "json"),
            ("k", key),
            ("t", text),
        ];
        self.executor.post_form(&self.endpoint, &[], &form).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorKind;
    use mockito::Matcher;

    fn executor() -> Arc<HttpExecutor> {
        let config = Config {
            allow_insecure_http: true,
            ..Config::default()
        };
        Arc::new(HttpExecutor::new(&config).unwrap())
    }

    #[tokio::test]
    async fn test_copyleaks_sends_key_in_form_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v3/education/submit/text")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("text".into(), "an essay".into()),
                Matcher::UrlEncoded("key".into(), "copyleaks-key".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"scannedDocument": {"totalWords": 2}, "results": []}"#)
            .expect(1)
            .create_async()
            .await;

        let provider = CopyleaksProvider::with_endpoint(
            executor(),
            format!("{}/v3/education/submit/text", server.url()),
        );
        let credential = Credential::new(ProviderIdentity::OriginalityA, "copyleaks-key");

        let result = provider.analyze("an essay", Some(&credential)).await;

        mock.assert_async().await;
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_copyleaks_server_error_is_remote_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/submit")
            .with_status(500)
            .create_async()
            .await;

        let provider =
            CopyleaksProvider::with_endpoint(executor(), format!("{}/submit", server.url()));
        let credential = Credential::new(ProviderIdentity::OriginalityA, "k");

        let result = provider.analyze("an essay", Some(&credential)).await;

        assert_eq!(result.error_kind(), Some(ErrorKind::RemoteError));
    }

    #[tokio::test]
    async fn test_copyscape_non_json_body_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/")
            .match_body(Matcher::UrlEncoded("o".into(), "csearch".into()))
            .with_status(200)
            .with_body("<response><error>no credit</error></response>")
            .create_async()
            .await;

        let provider =
            CopyscapeProvider::with_endpoint(executor(), format!("{}/api/", server.url()));
        let credential = Credential::new(ProviderIdentity::OriginalityB, "k");

        let result = provider.analyze("an essay", Some(&credential)).await;

        assert_eq!(result.error_kind(), Some(ErrorKind::MalformedResponse));
    }
}
