//! 分析编排器 - 编排层
//!
//! ## 职责
//!
//! 1. **输入校验**：空文本直接短路，所有服务记为 `InvalidInput`
//! 2. **密钥解析**：缺少密钥的服务直接记为 `MissingCredential`，不发起调用
//! 3. **并发分发**：每个服务一个 tokio 任务，互不依赖
//! 4. **超时控制**：单服务超时 + 请求级截止时间，超时的任务被取消
//! 5. **结果收集**：等待全部任务结束后再返回（barrier），任何失败都不影响其他服务
//!
//! 编排器本身不重试，一次分类即为最终结果。

use crate::config::Config;
use crate::infrastructure::{CredentialStore, HttpExecutor, ProbeOutcome};
use crate::models::{is_analyzable, AggregateReport, ErrorKind, ProviderIdentity, ProviderResult};
use crate::orchestrator::ProviderRegistry;
use crate::utils::logging::truncate_text;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// 日志中输入文本保留的最大字符数
const LOG_TEXT_CHARS: usize = 60;

/// 分析编排器
///
/// 可在并发请求间共享（`Arc<AnalysisOrchestrator>`），内部没有可变状态。
#[derive(Debug, Clone)]
pub struct AnalysisOrchestrator {
    registry: ProviderRegistry,
    credentials: Arc<CredentialStore>,
    provider_timeout: Duration,
    request_deadline: Duration,
}

impl AnalysisOrchestrator {
    /// 使用默认超时创建
    pub fn new(registry: ProviderRegistry, credentials: Arc<CredentialStore>) -> Self {
        Self::from_config(registry, credentials, &Config::default())
    }

    pub fn from_config(
        registry: ProviderRegistry,
        credentials: Arc<CredentialStore>,
        config: &Config,
    ) -> Self {
        Self {
            registry,
            credentials,
            provider_timeout: config.provider_timeout(),
            request_deadline: config.request_deadline(),
        }
    }

    /// 覆盖超时设置；截止时间不会短于单服务超时
    pub fn with_timeouts(mut self, provider_timeout: Duration, request_deadline: Duration) -> Self {
        self.provider_timeout = provider_timeout;
        self.request_deadline = request_deadline.max(provider_timeout);
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn provider_timeout(&self) -> Duration {
        self.provider_timeout
    }

    pub fn request_deadline(&self) -> Duration {
        self.request_deadline
    }

    /// 对文本执行一次完整分析
    ///
    /// 返回的报告对每个已注册服务恰好包含一个条目。
    pub async fn run(&self, text: &str) -> AggregateReport {
        let mut report = AggregateReport::new(text);

        if !is_analyzable(text) {
            warn!("⚠️ 输入文本为空，跳过所有服务");
            for provider in self.registry.identities() {
                report.insert(
                    provider,
                    ProviderResult::failure(ErrorKind::InvalidInput, "输入文本不能为空"),
                );
            }
            return report;
        }

        info!(
            "📝 开始分析 ({} 个服务): {}",
            self.registry.len(),
            truncate_text(text, LOG_TEXT_CHARS)
        );

        let started = Instant::now();
        let deadline = started + self.request_deadline;
        let shared_text: Arc<str> = Arc::from(text);
        let mut handles = Vec::with_capacity(self.registry.len());

        for (provider, client) in self.registry.iter() {
            let credential = match self.credentials.get(provider) {
                Ok(credential) => Some(credential.clone()),
                Err(e) if client.requires_credential() => {
                    info!("[{}] ⏭️ 未配置密钥，跳过", provider);
                    report.insert(
                        provider,
                        ProviderResult::failure(ErrorKind::MissingCredential, e.to_string()),
                    );
                    continue;
                }
                Err(_) => None,
            };

            let client = Arc::clone(client);
            let text = Arc::clone(&shared_text);
            let timeout = self.provider_timeout;

            let handle = tokio::spawn(async move {
                let call_started = Instant::now();
                let result =
                    match tokio::time::timeout(timeout, client.analyze(&text, credential.as_ref()))
                        .await
                    {
                        Ok(result) => result,
                        Err(_) => ProviderResult::failure(
                            ErrorKind::Timeout,
                            format!("{} 在 {} ms 内未响应", provider, timeout.as_millis()),
                        ),
                    };
                (result, call_started.elapsed())
            });
            handles.push((provider, handle));
        }

        for (provider, mut handle) in handles {
            let result = match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok((result, elapsed))) => {
                    log_outcome(provider, &result, elapsed);
                    result
                }
                Ok(Err(join_error)) => {
                    error!("[{}] 任务执行失败: {}", provider, join_error);
                    ProviderResult::failure(
                        ErrorKind::InternalError,
                        format!("{} 任务异常结束", provider),
                    )
                }
                Err(_) => {
                    handle.abort();
                    warn!("[{}] ⏱️ 超过请求截止时间，已取消", provider);
                    ProviderResult::failure(
                        ErrorKind::Timeout,
                        format!(
                            "超过请求截止时间 ({} ms)",
                            self.request_deadline.as_millis()
                        ),
                    )
                }
            };
            report.insert(provider, result);
        }

        info!(
            "✓ 分析完成: 成功 {}/{} ({} ms)",
            report.success_count(),
            report.len(),
            started.elapsed().as_millis()
        );

        report
    }

    /// 可达性探测（显式调用，分析流程从不隐式执行）
    ///
    /// 对每个网络服务的端点并发发送一次不带密钥的 HEAD 请求。
    pub async fn check_reachability(
        &self,
        executor: &HttpExecutor,
    ) -> BTreeMap<ProviderIdentity, ProbeOutcome> {
        let probes = self.registry.iter().filter_map(|(provider, client)| {
            let endpoint = client.endpoint()?.to_string();
            Some(async move {
                let outcome = executor.probe(&endpoint, self.provider_timeout).await;
                debug!(
                    "[{}] 探测 reachable={} ({} ms)",
                    provider, outcome.reachable, outcome.latency_ms
                );
                (provider, outcome)
            })
        });

        join_all(probes).await.into_iter().collect()
    }
}

fn log_outcome(provider: ProviderIdentity, result: &ProviderResult, elapsed: Duration) {
    match result {
        ProviderResult::Success(_) => {
            info!("[{}] ✅ 成功 ({} ms)", provider, elapsed.as_millis())
        }
        ProviderResult::Failure { kind, .. } => {
            warn!("[{}] ❌ {} ({} ms)", provider, kind, elapsed.as_millis())
        }
    }
}
