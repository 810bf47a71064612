pub mod analysis;
pub mod provider;
pub mod readability;

pub use analysis::{is_analyzable, AggregateReport, AnalysisRequest, ErrorKind, ProviderResult};
pub use provider::ProviderIdentity;
pub use readability::ReadabilityScores;
