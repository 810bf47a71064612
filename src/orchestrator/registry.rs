//! 服务注册表
//!
//! 固定的服务集合，按 `ProviderIdentity` 排序，报告中的条目集合由它决定。

use crate::config::Config;
use crate::infrastructure::HttpExecutor;
use crate::models::ProviderIdentity;
use crate::services::{
    CitationProvider, CopyleaksProvider, CopyscapeProvider, GrammarProvider, ParaphraseProvider,
    ProviderClient, ReadabilityScorer,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// 已注册的服务
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<ProviderIdentity, Arc<dyn ProviderClient>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册全部六个服务，共享同一个 HTTP 执行器
    pub fn from_config(executor: Arc<HttpExecutor>, config: &Config) -> Self {
        Self::new()
            .register(GrammarProvider::new(executor.clone(), config))
            .register(CopyleaksProvider::new(executor.clone(), config))
            .register(CopyscapeProvider::new(executor.clone(), config))
            .register(CitationProvider::new(executor.clone(), config))
            .register(ParaphraseProvider::new(executor, config))
            .register(ReadabilityScorer::new())
    }

    /// 注册一个服务；同一标识重复注册时后者覆盖前者
    pub fn register(self, provider: impl ProviderClient + 'static) -> Self {
        self.register_arc(Arc::new(provider))
    }

    pub fn register_arc(mut self, provider: Arc<dyn ProviderClient>) -> Self {
        self.providers.insert(provider.identity(), provider);
        self
    }

    pub fn get(&self, provider: ProviderIdentity) -> Option<&Arc<dyn ProviderClient>> {
        self.providers.get(&provider)
    }

    pub fn identities(&self) -> Vec<ProviderIdentity> {
        self.providers.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProviderIdentity, &Arc<dyn ProviderClient>)> {
        self.providers.iter().map(|(id, p)| (*id, p))
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.providers.keys()).finish()
    }
}
