pub mod app;
pub mod crypto;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::credential_service::{CredentialService, IssuanceLimits};
pub use crypto::hashing::{HashGenerator, Sha256HashGenerator};
pub use domain::accreditation::AccreditedDomains;
pub use domain::credential::{CredentialRecord, NewCredential, VerificationEntry, VerifierInfo};
pub use domain::error::CredentialError;
pub use infra::blob::BlobStore;
pub use infra::config::Config;
pub use storage::credentials::CredentialStore;
