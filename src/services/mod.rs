//! 业务能力层（Services）
//!
//! 每个模块描述"我能分析什么"，只处理单段文本，不关心并发与合并。

pub mod citation;
pub mod grammar;
pub mod originality;
pub mod paraphrase;
pub mod provider;
pub mod readability;

pub use citation::CitationProvider;
pub use grammar::GrammarProvider;
pub use originality::{CopyleaksProvider, CopyscapeProvider};
pub use paraphrase::ParaphraseProvider;
pub use provider::ProviderClient;
pub use readability::ReadabilityScorer;
