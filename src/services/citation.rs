//! 引用查询服务 - 业务能力层
//!
//! 在 Zotero 用户文献库中按正文片段检索条目，`Zotero-API-Key` 请求头认证

use crate::config::Config;
use crate::error::ProviderOutcome;
use crate::infrastructure::{Credential, HttpExecutor};
use crate::models::ProviderIdentity;
use crate::services::provider::ProviderClient;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// 引用查询服务
pub struct CitationProvider {
    executor: Arc<HttpExecutor>,
    endpoint: String,
    query_max_chars: usize,
}

impl CitationProvider {
    pub fn new(executor: Arc<HttpExecutor>, config: &Config) -> Self {
        let endpoint = format!(
            "{}/users/{}/items",
            config.zotero_api_url.trim_end_matches('/'),
            config.zotero_user_id
        );
        Self {
            executor,
            endpoint,
            query_max_chars: config.citation_query_max_chars,
        }
    }

    pub fn with_endpoint(
        executor: Arc<HttpExecutor>,
        endpoint: impl Into<String>,
        query_max_chars: usize,
    ) -> Self {
        Self {
            executor,
            endpoint: endpoint.into(),
            query_max_chars,
        }
    }

    /// 检索关键词：正文的前若干个字符（按词边界截断）
    fn build_query(&self, text: &str) -> String {
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.chars().count() <= self.query_max_chars {
            return normalized;
        }
        let head: String = normalized.chars().take(self.query_max_chars).collect();
        match head.rfind(' ') {
            Some(idx) if idx > 0 => head[..idx].to_string(),
            _ => head,
        }
    }
}

#[async_trait]
impl ProviderClient for CitationProvider {
    fn identity(&self) -> ProviderIdentity {
        ProviderIdentity::Citation
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
        let query = self.build_query(text);
        let params = [("q", query.as_str()), ("qmode", "everything"), ("format", "json")];

        self.executor
            .get_query(&self.endpoint, &[("zotero-api-key", key)], &params)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn executor() -> Arc<HttpExecutor> {
        let config = Config {
            allow_insecure_http: true,
            ..Config::default()
        };
        Arc::new(HttpExecutor::new(&config).unwrap())
    }

    #[test]
    fn test_endpoint_is_built_from_config() {
        let config = Config {
            zotero_api_url: "https://api.zotero.org/".to_string(),
            zotero_user_id: "42".to_string(),
            ..Config::default()
        };
        let provider = CitationProvider::new(executor(), &config);
        assert_eq!(provider.endpoint(), Some("https://api.zotero.org/users/42/items"));
    }

    #[test]
    fn test_query_is_cut_on_word_boundary() {
        let provider = CitationProvider::with_endpoint(executor(), "https://x.invalid", 12);
        assert_eq!(provider.build_query("the quick   brown fox jumps"), "the quick");
        assert_eq!(provider.build_query("short\ntext"), "short text");
    }

    #[tokio::test]
    async fn test_search_uses_header_key_and_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/users/1/items")
            .match_header("zotero-api-key", "zotero-key")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "climate change essay".into()),
                Matcher::UrlEncoded("format".into(), "json".into()),
            ]))
            .with_status(200)
            .with_body(r#"[{"key": "ABCD", "data": {"title": "Climate"}}]"#)
            .expect(1)
            .create_async()
            .await;

        let provider = CitationProvider::with_endpoint(
            executor(),
            format!("{}/users/1/items", server.url()),
            200,
        );
        let credential = Credential::new(ProviderIdentity::Citation, "zotero-key");

        let result = provider
            .analyze("climate change essay", Some(&credential))
            .await;

        mock.assert_async().await;
        assert_eq!(result.payload().unwrap()[0]["key"], "ABCD");
    }
}
