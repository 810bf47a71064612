use async_trait::async_trait;
use essay_report::error::{ProviderError, ProviderOutcome};
use essay_report::services::ReadabilityScorer;
use essay_report::{
    AnalysisOrchestrator, Credential, CredentialStore, ErrorKind, ProviderClient,
    ProviderIdentity, ProviderRegistry, ReportAssembler,
};
use serde_json::{json, Value as JsonValue};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const ESSAY: &str = "hi my namme iss lavi. mice to meet you.";

/// 可控延迟、可计数的模拟服务
struct MockProvider {
    identity: ProviderIdentity,
    delay: Duration,
    fail_with_status: Option<u16>,
    calls: Arc<AtomicUsize>,
}

impl MockProvider {
    fn new(identity: ProviderIdentity, calls: &Arc<AtomicUsize>) -> Self {
        Self {
            identity,
            delay: Duration::ZERO,
            fail_with_status: None,
            calls: Arc::clone(calls),
        }
    }

    fn delayed(mut self, millis: u64) -> Self {
        self.delay = Duration::from_millis(millis);
        self
    }

    fn failing(mut self, status: u16) -> Self {
        self.fail_with_status = Some(status);
        self
    }
}

#[async_trait]
impl ProviderClient for MockProvider {
    fn identity(&self) -> ProviderIdentity {
        self.identity
    }

    async fn call(
        &self,
        text: &str,
        credential: Option<&Credential>,
    ) -> ProviderOutcome<JsonValue> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;

        if let Some(status) = self.fail_with_status {
            return Err(ProviderError::BadStatus {
                endpoint: format!("https://{}.invalid", self.identity.field_name()),
                status,
                body_preview: "upstream failure".to_string(),
            });
        }

        assert!(credential.is_some(), "remote providers always receive a credential");
        Ok(json!({
            "provider": self.identity.field_name(),
            "length": text.len(),
        }))
    }
}

fn credentials_except(withheld: Option<ProviderIdentity>) -> Arc<CredentialStore> {
    let withheld_var = withheld.and_then(|p| p.credential_env_var());
    Arc::new(CredentialStore::from_lookup(move |name| {
        (Some(name) != withheld_var).then(|| format!("{}-secret", name.to_lowercase()))
    }))
}

fn remote_identities() -> Vec<ProviderIdentity> {
    ProviderIdentity::ALL
        .into_iter()
        .filter(|p| p.is_remote())
        .collect()
}

/// 五个模拟网络服务 + 真实的可读性评分
fn mock_registry(calls: &Arc<AtomicUsize>) -> ProviderRegistry {
    remote_identities()
        .into_iter()
        .fold(ProviderRegistry::new(), |registry, identity| {
            registry.register(MockProvider::new(identity, calls))
        })
        .register(ReadabilityScorer::new())
}

#[tokio::test]
async fn test_report_has_one_entry_per_provider() {
    let calls = Arc::new(AtomicUsize::new(0));
    let orchestrator = AnalysisOrchestrator::new(mock_registry(&calls), credentials_except(None));

    for text in [ESSAY, "x", "One more essay.\n\nWith paragraphs."] {
        let report = orchestrator.run(text).await;
        assert_eq!(report.len(), ProviderIdentity::ALL.len());
        assert_eq!(report.success_count(), ProviderIdentity::ALL.len());
        assert_eq!(report.original_text, text);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 15);
}

#[tokio::test]
async fn test_empty_text_makes_no_calls() {
    let calls = Arc::new(AtomicUsize::new(0));
    let orchestrator = AnalysisOrchestrator::new(mock_registry(&calls), credentials_except(None));

    for text in ["", "   \n\t"] {
        let report = orchestrator.run(text).await;
        assert_eq!(report.len(), ProviderIdentity::ALL.len());
        for provider in ProviderIdentity::ALL {
            assert_eq!(
                report.get(provider).unwrap().error_kind(),
                Some(ErrorKind::InvalidInput)
            );
        }
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_withheld_credential_only_affects_its_provider() {
    for withheld in remote_identities() {
        let calls = Arc::new(AtomicUsize::new(0));
        let orchestrator =
            AnalysisOrchestrator::new(mock_registry(&calls), credentials_except(Some(withheld)));

        let report = orchestrator.run(ESSAY).await;

        assert_eq!(report.failures(), vec![(withheld, ErrorKind::MissingCredential)]);
        assert_eq!(report.success_count(), ProviderIdentity::ALL.len() - 1);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}

#[tokio::test]
async fn test_missing_credential_message_has_no_secret() {
    let calls = Arc::new(AtomicUsize::new(0));
    let orchestrator = AnalysisOrchestrator::new(
        mock_registry(&calls),
        credentials_except(Some(ProviderIdentity::Grammar)),
    );

    let shape = ReportAssembler::merge(ESSAY, &orchestrator.run(ESSAY).await);
    let rendered = shape.to_string();

    assert_eq!(shape["sapling"]["error_kind"], "MissingCredential");
    assert!(!rendered.contains("-secret"));
}

#[tokio::test]
async fn test_slow_provider_does_not_block_others() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = mock_registry(&calls)
        .register(MockProvider::new(ProviderIdentity::Citation, &calls).delayed(3_000));
    let orchestrator = AnalysisOrchestrator::new(registry, credentials_except(None))
        .with_timeouts(Duration::from_millis(300), Duration::from_secs(5));

    let started = std::time::Instant::now();
    let report = orchestrator.run(ESSAY).await;

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(report.failures(), vec![(ProviderIdentity::Citation, ErrorKind::Timeout)]);
    assert_eq!(report.success_count(), 5);
}

#[tokio::test]
async fn test_remote_failure_is_isolated() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = mock_registry(&calls)
        .register(MockProvider::new(ProviderIdentity::OriginalityA, &calls).failing(500));
    let orchestrator = AnalysisOrchestrator::new(registry, credentials_except(None));

    let shape = ReportAssembler::merge(ESSAY, &orchestrator.run(ESSAY).await);

    assert_eq!(shape["copyleaks"]["error_kind"], "RemoteError");
    for field in ["sapling", "copyscape", "zotero_citations", "rapidapi", "readability_scores"] {
        assert!(shape[field].get("error_kind").is_none(), "{field} should succeed");
    }
}

#[tokio::test]
async fn test_readability_entry_is_deterministic() {
    let calls = Arc::new(AtomicUsize::new(0));
    let orchestrator = AnalysisOrchestrator::new(mock_registry(&calls), credentials_except(None));

    let first = orchestrator.run(ESSAY).await;
    let second = orchestrator.run(ESSAY).await;

    assert_eq!(
        first.get(ProviderIdentity::Readability),
        second.get(ProviderIdentity::Readability)
    );
    let payload = first.get(ProviderIdentity::Readability).unwrap().payload().unwrap();
    assert!(payload["flesch_reading_ease"].is_number());
}

#[tokio::test]
async fn test_merge_ignores_completion_order() {
    let calls = Arc::new(AtomicUsize::new(0));
    let delays = [10, 40, 70, 100, 130];

    let forward = remote_identities()
        .into_iter()
        .zip(delays)
        .fold(ProviderRegistry::new(), |registry, (identity, delay)| {
            registry.register(MockProvider::new(identity, &calls).delayed(delay))
        })
        .register(ReadabilityScorer::new());
    let reversed = remote_identities()
        .into_iter()
        .zip(delays.into_iter().rev())
        .fold(ProviderRegistry::new(), |registry, (identity, delay)| {
            registry.register(MockProvider::new(identity, &calls).delayed(delay))
        })
        .register(ReadabilityScorer::new());

    let first = AnalysisOrchestrator::new(forward, credentials_except(None))
        .run(ESSAY)
        .await;
    let second = AnalysisOrchestrator::new(reversed, credentials_except(None))
        .run(ESSAY)
        .await;

    assert_eq!(
        ReportAssembler::merge(ESSAY, &first),
        ReportAssembler::merge(ESSAY, &second)
    );
}
