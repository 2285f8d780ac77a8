use crate::app::credential_service::{CredentialService, IssuanceLimits};
use crate::crypto::hashing::Sha256HashGenerator;
use crate::domain::accreditation::AccreditedDomains;
use crate::domain::credential::{CredentialRecord, VerificationEntry};
use crate::infra::blob;
use crate::infra::config::Config;
use crate::storage::credentials;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialService>,
    pub accredited_domains: Arc<AccreditedDomains>,
}

impl AppState {
    pub fn new(credentials: CredentialService, accredited_domains: AccreditedDomains) -> Self {
        Self {
            credentials: Arc::new(credentials),
            accredited_domains: Arc::new(accredited_domains),
        }
    }

    /// Connects the configured stores and wires the SHA-256 hash generator.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = credentials::from_config(&config.storage).await?;
        let blobs = blob::from_config(&config.blob)?;
        let service = CredentialService::new(
            store,
            blobs,
            Arc::new(Sha256HashGenerator),
            IssuanceLimits::from(config),
        );
        Ok(Self::new(service, config.accredited_domains.clone()))
    }
}

/// Multipart body of `POST /api/credentials/issue` (documentation only; the
/// handler streams the parts itself).
#[allow(dead_code)]
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueCredentialForm {
    pub student_name: String,
    pub student_email: String,
    pub student_wallet: String,
    pub university_name: String,
    pub degree_title: String,
    pub graduation_date: String,
    /// The diploma, `application/pdf`, at most the configured size ceiling.
    #[schema(value_type = String, format = Binary)]
    pub pdf_file: Vec<u8>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueCredentialResponse {
    pub success: bool,
    pub hash: String,
    pub student_wallet: String,
    pub nft_token_id: String,
    pub tx_hash: String,
    pub pdf_url: String,
    pub message: String,
}

impl From<CredentialRecord> for IssueCredentialResponse {
    fn from(record: CredentialRecord) -> Self {
        Self {
            success: true,
            hash: record.hash,
            student_wallet: record.student_wallet_address,
            nft_token_id: record.nft_token_id,
            tx_hash: record.blockchain_tx_hash,
            pdf_url: record.pdf_url,
            message: "Credential issued successfully".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HashQuery {
    /// Public 8-character credential hash.
    pub hash: Option<String>,
}

#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WalletQuery {
    /// Wallet address; matched case-insensitively.
    pub address: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct VerifyCredentialResponse {
    pub success: bool,
    pub credential: CredentialRecord,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct WalletCredentialsResponse {
    pub success: bool,
    pub credentials: Vec<CredentialRecord>,
    pub count: usize,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct VerificationHistoryResponse {
    pub success: bool,
    pub hash: String,
    pub verifications: Vec<VerificationEntry>,
    pub count: usize,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct DomainVerificationRequest {
    /// Institution domain or URL, e.g. `mit.edu` or `https://www.mit.edu/`.
    #[serde(default)]
    pub domain: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct DomainVerificationResponse {
    pub success: bool,
    pub domain: String,
    pub accredited: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<String>,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub storage: String,
    pub blob_store: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
