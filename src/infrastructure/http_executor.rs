//! HTTP 执行器 - 基础设施层
//!
//! 持有唯一的 `reqwest::Client`（连接池），只暴露"发请求、取 JSON"的能力

use crate::config::Config;
use crate::error::{AppError, AppResult, ProviderError, ProviderOutcome, ServerError};
use crate::utils::logging::truncate_text;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::RequestBuilder;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::time::{Duration, Instant};
use tracing::debug;

/// 错误响应体在错误信息中保留的最大字符数
const BODY_PREVIEW_CHARS: usize = 200;

/// 请求头，值可能是密钥，发送前会被标记为敏感
pub type Headers<'a> = &'a [(&'static str, &'a str)];

/// HTTP 执行器
///
/// 职责：
/// - 持有唯一的 Client，所有服务共享同一个连接池
/// - 始终校验服务端证书，不提供关闭校验的开关
/// - 每次调用只发一次请求，不重试
/// - 不认识具体的服务，只处理状态码与 JSON 解码
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: reqwest::Client,
}

/// 可达性探测结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    pub reachable: bool,
    pub status: Option<u16>,
    pub latency_ms: u128,
    pub error: Option<String>,
}

impl HttpExecutor {
    /// 根据配置创建执行器
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .https_only(!config.allow_insecure_http)
            .connect_timeout(config.provider_timeout())
            .timeout(config.request_deadline())
            .user_agent(concat!("essay_report/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                AppError::Server(ServerError::ClientBuildFailed {
                    source: Box::new(e),
                })
            })?;

        Ok(Self { client })
    }

    /// POST JSON 请求体
    pub async fn post_json(
        &self,
        endpoint: &str,
        headers: Headers<'_>,
        body: &JsonValue,
    ) -> ProviderOutcome<JsonValue> {
        let header_map = build_headers(endpoint, headers)?;
        let request = self.client.post(endpoint).headers(header_map).json(body);
        self.send(endpoint, request).await
    }

    /// POST 表单请求体
    pub async fn post_form(
        &self,
        endpoint: &str,
        headers: Headers<'_>,
        form: &[(&str, &str)],
    ) -> ProviderOutcome<JsonValue> {
        let header_map = build_headers(endpoint, headers)?;
        let request = self.client.post(endpoint).headers(header_map).form(form);
        self.send(endpoint, request).await
    }

    /// GET 带查询参数
    pub async fn get_query(
        &self,
        endpoint: &str,
        headers: Headers<'_>,
        query: &[(&str, &str)],
    ) -> ProviderOutcome<JsonValue> {
        let header_map = build_headers(endpoint, headers)?;
        let request = self.client.get(endpoint).headers(header_map).query(query);
        self.send(endpoint, request).await
    }

    /// 可达性探测（HEAD 请求，不带任何密钥）
    ///
    /// 只要收到 HTTP 响应即视为可达，状态码不影响结果。
    pub async fn probe(&self, endpoint: &str, timeout: Duration) -> ProbeOutcome {
        let started = Instant::now();
        let result = self.client.head(endpoint).timeout(timeout).send().await;
        let latency_ms = started.elapsed().as_millis();

        match result {
            Ok(response) => ProbeOutcome {
                reachable: true,
                status: Some(response.status().as_u16()),
                latency_ms,
                error: None,
            },
            Err(e) => ProbeOutcome {
                reachable: false,
                status: None,
                latency_ms,
                error: Some(e.without_url().to_string()),
            },
        }
    }

    /// 发送请求并解码 JSON
    async fn send(&self, endpoint: &str, request: RequestBuilder) -> ProviderOutcome<JsonValue> {
        let started = Instant::now();
        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::request_failed(endpoint, e))?;

        let status = response.status();
        debug!(
            "{} 返回 {} ({} ms)",
            endpoint,
            status.as_u16(),
            started.elapsed().as_millis()
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::BadStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body_preview: truncate_text(&body, BODY_PREVIEW_CHARS),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::request_failed(endpoint, e))?;

        serde_json::from_slice(&bytes).map_err(|e| ProviderError::malformed_body(endpoint, e))
    }
}

/// 构建请求头，所有值都标记为敏感
fn build_headers(endpoint: &str, headers: Headers<'_>) -> ProviderOutcome<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let mut header_value =
            HeaderValue::from_str(value).map_err(|e| ProviderError::RequestFailed {
                endpoint: endpoint.to_string(),
                source: Box::new(e),
            })?;
        header_value.set_sensitive(true);
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ProviderError::RequestFailed {
                endpoint: endpoint.to_string(),
                source: Box::new(e),
            })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insecure_config() -> Config {
        Config {
            allow_insecure_http: true,
            provider_timeout_secs: 2,
            request_deadline_secs: 5,
            ..Config::default()
        }
    }

    #[test]
    fn test_headers_are_sensitive() {
        let map = build_headers("x", &[("authorization", "Bearer abc")]).unwrap();
        assert!(map.get("authorization").unwrap().is_sensitive());
    }

    #[test]
    fn test_invalid_header_value_is_request_failure() {
        let err = build_headers("x", &[("authorization", "bad\nvalue")]).unwrap_err();
        assert!(matches!(err, ProviderError::RequestFailed { .. }));
    }

    #[tokio::test]
    async fn test_https_only_rejects_plain_http() {
        let executor = HttpExecutor::new(&Config::default()).unwrap();
        let err = executor
            .post_json("http://127.0.0.1:1/nothing", &[], &serde_json::json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::models::ErrorKind::RemoteError);
    }

    #[tokio::test]
    async fn test_status_and_body_classification() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server
            .mock("POST", "/ok")
            .with_status(200)
            .with_body(r#"{"fine": true}"#)
            .create_async()
            .await;
        let _broken = server
            .mock("POST", "/broken")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;
        let _down = server
            .mock("POST", "/down")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let executor = HttpExecutor::new(&insecure_config()).unwrap();
        let body = serde_json::json!({"text": "hello"});

        let ok = executor
            .post_json(&format!("{}/ok", server.url()), &[], &body)
            .await
            .unwrap();
        assert_eq!(ok["fine"], true);

        let broken = executor
            .post_json(&format!("{}/broken", server.url()), &[], &body)
            .await
            .unwrap_err();
        assert_eq!(broken.kind(), crate::models::ErrorKind::MalformedResponse);

        let down = executor
            .post_json(&format!("{}/down", server.url()), &[], &body)
            .await
            .unwrap_err();
        match down {
            ProviderError::BadStatus { status, body_preview, .. } => {
                assert_eq!(status, 503);
                assert_eq!(body_preview, "maintenance");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_probe_reports_any_response_as_reachable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("HEAD", "/")
            .with_status(405)
            .create_async()
            .await;

        let executor = HttpExecutor::new(&insecure_config()).unwrap();
        let outcome = executor
            .probe(&format!("{}/", server.url()), Duration::from_secs(2))
            .await;

        assert!(outcome.reachable);
        assert_eq!(outcome.status, Some(405));
    }
}
