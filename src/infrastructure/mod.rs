pub mod credential_store;
pub mod http_executor;

pub use credential_store::{Credential, CredentialStore};
pub use http_executor::{HttpExecutor, ProbeOutcome};
