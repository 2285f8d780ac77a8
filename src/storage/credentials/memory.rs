//! In-process credential store.
//!
//! Used for local demo runs (`STORAGE_BACKEND=memory`) and by the test suite.
//! Mirrors the Postgres semantics: unique hashes, case-insensitive wallet
//! lookup, newest-first ordering.

use crate::domain::credential::{CredentialRecord, NewCredential, VerificationEntry, VerifierInfo};
use crate::storage::credentials::{CredentialStore, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

#[derive(Default)]
struct MemoryState {
    credentials: Vec<CredentialRecord>,
    verifications: Vec<VerificationEntry>,
    next_credential_id: i64,
    next_verification_id: i64,
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    state: RwLock<MemoryState>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored credential records.
    pub async fn len(&self) -> usize {
        self.state.read().await.credentials.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn hash_exists(&self, hash: &str) -> anyhow::Result<bool> {
        let state = self.state.read().await;
        Ok(state.credentials.iter().any(|c| c.hash == hash))
    }

    async fn insert(&self, credential: NewCredential) -> Result<CredentialRecord, StoreError> {
        let mut state = self.state.write().await;
        if state.credentials.iter().any(|c| c.hash == credential.hash) {
            return Err(StoreError::Duplicate(credential.hash));
        }
        state.next_credential_id += 1;
        let record = credential.into_record(state.next_credential_id, Utc::now());
        state.credentials.push(record.clone());
        Ok(record)
    }

    async fn find_by_hash(&self, hash: &str) -> anyhow::Result<Option<CredentialRecord>> {
        let state = self.state.read().await;
        Ok(state.credentials.iter().find(|c| c.hash == hash).cloned())
    }

    async fn record_verification(
        &self,
        hash: &str,
        info: VerifierInfo,
    ) -> anyhow::Result<Option<CredentialRecord>> {
        let mut state = self.state.write().await;
        let Some(record) = state.credentials.iter_mut().find(|c| c.hash == hash) else {
            return Ok(None);
        };
        record.verified_count += 1;
        let updated = record.clone();

        state.next_verification_id += 1;
        let entry = VerificationEntry {
            id: state.next_verification_id,
            credential_hash: hash.to_string(),
            verifier_info: info,
            verified_at: Utc::now(),
        };
        state.verifications.push(entry);
        Ok(Some(updated))
    }

    async fn list_by_wallet(&self, wallet: &str) -> anyhow::Result<Vec<CredentialRecord>> {
        let wallet = wallet.to_lowercase();
        let state = self.state.read().await;
        let mut found: Vec<CredentialRecord> = state
            .credentials
            .iter()
            .filter(|c| c.student_wallet_address.to_lowercase() == wallet)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.issued_at.cmp(&a.issued_at).then(b.id.cmp(&a.id)));
        Ok(found)
    }

    async fn list_verifications(&self, hash: &str) -> anyhow::Result<Vec<VerificationEntry>> {
        let state = self.state.read().await;
        let mut found: Vec<VerificationEntry> = state
            .verifications
            .iter()
            .filter(|v| v.credential_hash == hash)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.verified_at.cmp(&a.verified_at).then(b.id.cmp(&a.id)));
        Ok(found)
    }
}
