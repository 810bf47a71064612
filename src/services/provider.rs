//! 统一的分析能力接口
//!
//! 每个外部服务（以及本地可读性评分）都实现 [`ProviderClient`]，
//! 编排层只依赖这个 trait，不关心具体服务的协议。

use crate::error::{ProviderError, ProviderOutcome};
use crate::infrastructure::Credential;
use crate::models::{is_analyzable, ProviderIdentity, ProviderResult};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};
use url::form_urlencoded;

/// 分析能力
///
/// 职责：
/// - 对单段文本执行一次分析
/// - 每次调用最多一次出站请求，不重试
/// - 所有失败都转换成 `ProviderResult::Failure`，不向上抛出
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// 服务标识
    fn identity(&self) -> ProviderIdentity;

    /// 是否必须携带密钥
    fn requires_credential(&self) -> bool {
        self.identity().is_remote()
    }

    /// 可达性探测使用的端点；本地能力返回 `None`
    fn endpoint(&self) -> Option<&str> {
        None
    }

    /// 执行实际的调用
    ///
    /// 调用前已保证文本非空、需要密钥时密钥存在。
    async fn call(
        &self,
        text: &str,
        credential: Option<&Credential>,
    ) -> ProviderOutcome<JsonValue>;

    /// 分析文本
    ///
    /// 空文本在本地直接拒绝，不发起网络请求；错误信息中的密钥会被抹掉。
    async fn analyze(&self, text: &str, credential: Option<&Credential>) -> ProviderResult {
        let provider = self.identity();

        if !is_analyzable(text) {
            return failure_from(ProviderError::InvalidInput, credential);
        }
        if self.requires_credential() && credential.is_none() {
            return failure_from(ProviderError::MissingCredential { provider }, credential);
        }

        match self.call(text, credential).await {
            Ok(payload) => {
                debug!("[{}] ✓ 分析成功", provider);
                ProviderResult::Success(payload)
            }
            Err(e) => {
                let result = failure_from(e, credential);
                if let ProviderResult::Failure { kind, message } = &result {
                    warn!("[{}] ❌ 分析失败 ({}): {}", provider, kind, message);
                }
                result
            }
        }
    }
}

/// 将服务错误转换成失败结果，并抹掉错误信息中的密钥
pub fn failure_from(error: ProviderError, credential: Option<&Credential>) -> ProviderResult {
    let message = scrub_secret(&error.to_string(), credential);
    ProviderResult::failure(error.kind(), message)
}

/// 从文本中移除密钥
///
/// 表单编码后的密钥也一并移除。
pub fn scrub_secret(message: &str, credential: Option<&Credential>) -> String {
    let secret = match credential {
        Some(c) if !c.secret().is_empty() => c.secret(),
        _ => return message.to_string(),
    };

    let scrubbed = message.replace(secret, "<redacted>");
    let encoded: String = form_urlencoded::byte_serialize(secret.as_bytes()).collect();
    if encoded == secret {
        scrubbed
    } else {
        scrubbed.replace(&encoded, "<redacted>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorKind;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 把密钥回显到错误信息里的服务
    struct EchoingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ProviderClient for EchoingProvider {
        fn identity(&self) -> ProviderIdentity {
            ProviderIdentity::Paraphrase
        }

        async fn call(
            &self,
            text: &str,
            credential: Option<&Credential>,
        ) -> ProviderOutcome<JsonValue> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if text == "fail-form" {
                let secret = credential.unwrap().secret();
                let encoded: String = form_urlencoded::byte_serialize(secret.as_bytes()).collect();
                return Err(ProviderError::BadStatus {
                    endpoint: "https://paraphrase.invalid".to_string(),
                    status: 403,
                    body_preview: format!("rejected form key={}", encoded),
                });
            }
            if text == "fail" {
                return Err(ProviderError::BadStatus {
                    endpoint: "https://paraphrase.invalid".to_string(),
                    status: 401,
                    body_preview: format!("invalid key {}", credential.unwrap().secret()),
                });
            }
            Ok(json!({ "paraphrase": text }))
        }
    }

    fn provider() -> EchoingProvider {
        EchoingProvider {
            calls: AtomicUsize::new(0),
        }
    }

    #[tokio::test]
    async fn test_empty_text_never_calls_provider() {
        let provider = provider();
        let credential = Credential::new(ProviderIdentity::Paraphrase, "k");

        let result = provider.analyze("   ", Some(&credential)).await;

        assert_eq!(result.error_kind(), Some(ErrorKind::InvalidInput));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_credential_never_calls_provider() {
        let provider = provider();

        let result = provider.analyze("some text", None).await;

        assert_eq!(result.error_kind(), Some(ErrorKind::MissingCredential));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_secret_is_scrubbed_from_failure_message() {
        let provider = provider();
        let credential = Credential::new(ProviderIdentity::Paraphrase, "s3cr3t-value");

        let result = provider.analyze("fail", Some(&credential)).await;

        match result {
            ProviderResult::Failure { kind, message } => {
                assert_eq!(kind, ErrorKind::RemoteError);
                assert!(!message.contains("s3cr3t-value"));
                assert!(message.contains("<redacted>"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    /// 服务回显表单编码后的密钥时也要抹掉
    #[tokio::test]
    async fn test_form_encoded_secret_is_scrubbed() {
        let provider = provider();
        let credential = Credential::new(ProviderIdentity::Paraphrase, "k+y/=&z s");

        let result = provider.analyze("fail-form", Some(&credential)).await;

        match result {
            ProviderResult::Failure { message, .. } => {
                assert!(!message.contains("k%2By%2F%3D%26z+s"));
                assert!(message.contains("key=<redacted>"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_scrub_without_credential_keeps_message() {
        assert_eq!(scrub_secret("status=500", None), "status=500");
        let credential = Credential::new(ProviderIdentity::Paraphrase, "plain");
        assert_eq!(scrub_secret("bad plain key", Some(&credential)), "bad <redacted> key");
    }

    #[tokio::test]
    async fn test_success_payload_is_passed_through() {
        let provider = provider();
        let credential = Credential::new(ProviderIdentity::Paraphrase, "k");

        let result = provider.analyze("hello", Some(&credential)).await;

        assert_eq!(result, ProviderResult::Success(json!({ "paraphrase": "hello" })));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }
}
