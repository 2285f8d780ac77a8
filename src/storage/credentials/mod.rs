//! Persistence for credential records and the verification audit log.

pub mod memory;
pub mod postgres;

pub use memory::MemoryCredentialStore;
pub use postgres::PostgresCredentialStore;

use crate::domain::credential::{CredentialRecord, NewCredential, VerificationEntry, VerifierInfo};
use crate::infra::config::StorageBackend;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The unique constraint on `credentials.hash` rejected the insert.
    #[error("duplicate key: credential hash {0} already exists")]
    Duplicate(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Contract for the relational store behind the credential service.
///
/// Implementations enforce hash uniqueness themselves; the service never
/// locks around `insert`.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Short name used in startup logs.
    fn backend_name(&self) -> &'static str;

    /// Cheap round trip used by the health check.
    async fn ping(&self) -> anyhow::Result<()>;

    async fn hash_exists(&self, hash: &str) -> anyhow::Result<bool>;

    async fn insert(&self, credential: NewCredential) -> Result<CredentialRecord, StoreError>;

    async fn find_by_hash(&self, hash: &str) -> anyhow::Result<Option<CredentialRecord>>;

    /// Increments `verified_count` and appends one audit row as a single unit.
    ///
    /// Returns the updated record, or `None` (with nothing written) when the
    /// hash is unknown.
    async fn record_verification(
        &self,
        hash: &str,
        info: VerifierInfo,
    ) -> anyhow::Result<Option<CredentialRecord>>;

    /// Records whose wallet matches case-insensitively, newest first.
    async fn list_by_wallet(&self, wallet: &str) -> anyhow::Result<Vec<CredentialRecord>>;

    /// Audit rows for a hash, newest first.
    async fn list_verifications(&self, hash: &str) -> anyhow::Result<Vec<VerificationEntry>>;
}

/// Connects the configured store (creating the Postgres schema if needed).
pub async fn from_config(backend: &StorageBackend) -> anyhow::Result<Arc<dyn CredentialStore>> {
    Ok(match backend {
        StorageBackend::Postgres {
            database_url,
            max_connections,
        } => Arc::new(PostgresCredentialStore::connect(database_url, *max_connections).await?),
        StorageBackend::Memory => Arc::new(MemoryCredentialStore::new()),
    })
}
