//! The credential service.
//!
//! Sits between the HTTP handlers and the two external stores. It is
//! responsible for:
//! 1.  Validating an uploaded PDF and the submitted student/degree fields.
//! 2.  Deriving a unique public hash (re-deriving on collision).
//! 3.  Uploading the PDF to the blob store under a timeout, then inserting
//!     the credential row. If the insert fails the uploaded blob is deleted.
//! 4.  Serving verification (counter bump + audit row) and wallet lookups.

use crate::crypto::hashing::{self, DigestInput, HashGenerator};
use crate::domain::credential::{CredentialRecord, NewCredential, VerificationEntry, VerifierInfo};
use crate::domain::error::{ByteSize, CredentialError};
use crate::infra::blob::{credential_blob_path, BlobExists, BlobStore};
use crate::infra::config::{Config, DEFAULT_MAX_FILE_SIZE_BYTES, DEFAULT_UPLOAD_TIMEOUT_SECS};
use crate::storage::credentials::{CredentialStore, StoreError};
use axum::body::Bytes;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// How many digests are tried before a collision is reported as a conflict.
pub const MAX_HASH_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuanceLimits {
    pub max_file_size_bytes: u64,
    pub upload_timeout: Duration,
}

impl Default for IssuanceLimits {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            upload_timeout: Duration::from_secs(DEFAULT_UPLOAD_TIMEOUT_SECS),
        }
    }
}

impl From<&Config> for IssuanceLimits {
    fn from(config: &Config) -> Self {
        Self {
            max_file_size_bytes: config.max_file_size_bytes,
            upload_timeout: config.upload_timeout,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadedPdf {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Everything the issuance form carries. Text fields may be blank here;
/// `issue` rejects blanks.
#[derive(Debug, Clone, Default)]
pub struct IssueRequest {
    pub student_name: String,
    pub student_email: String,
    pub student_wallet: String,
    pub university_name: String,
    pub degree_title: String,
    pub graduation_date: String,
    pub pdf: Option<UploadedPdf>,
}

pub struct CredentialService {
    store: Arc<dyn CredentialStore>,
    blobs: Arc<dyn BlobStore>,
    hasher: Arc<dyn HashGenerator>,
    limits: IssuanceLimits,
}

impl CredentialService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        blobs: Arc<dyn BlobStore>,
        hasher: Arc<dyn HashGenerator>,
        limits: IssuanceLimits,
    ) -> Self {
        Self {
            store,
            blobs,
            hasher,
            limits,
        }
    }

    pub fn limits(&self) -> IssuanceLimits {
        self.limits
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn blobs(&self) -> &Arc<dyn BlobStore> {
        &self.blobs
    }

    /// Size then MIME type. Anything failing here has no side effects.
    pub fn validate_pdf(&self, pdf: &UploadedPdf) -> Result<(), CredentialError> {
        if pdf.bytes.len() as u64 > self.limits.max_file_size_bytes {
            return Err(CredentialError::FileTooLarge {
                limit: ByteSize(self.limits.max_file_size_bytes),
            });
        }
        if !is_pdf_content_type(pdf.content_type.as_deref()) {
            return Err(CredentialError::UnsupportedMediaType {
                content_type: pdf.content_type.clone(),
            });
        }
        Ok(())
    }

    /// Runs the issuance pipeline: validate, derive hash, upload, insert.
    pub async fn issue(&self, request: IssueRequest) -> Result<CredentialRecord, CredentialError> {
        let pdf = request.pdf.as_ref().ok_or(CredentialError::MissingFile)?;
        self.validate_pdf(pdf)?;

        let student_name = required(&request.student_name, "studentName")?;
        let student_email = required(&request.student_email, "studentEmail")?;
        let student_wallet = required(&request.student_wallet, "studentWallet")?;
        let university_name = required(&request.university_name, "universityName")?;
        let degree_title = required(&request.degree_title, "degreeTitle")?;
        let graduation_date = required(&request.graduation_date, "graduationDate")?;

        tracing::info!(
            filename = %pdf.filename,
            size = pdf.bytes.len(),
            "processing credential issuance"
        );

        let timestamp_millis = Utc::now().timestamp_millis();
        let hash = self
            .derive_unique_hash(student_wallet, student_email, degree_title, timestamp_millis)
            .await?;
        tracing::info!(%hash, "derived credential hash");

        let nft_token_id = hashing::nft_token_id(timestamp_millis);
        let blockchain_tx_hash = hashing::placeholder_tx_hash();

        let pathname = credential_blob_path(&hash, &pdf.filename);
        let upload = self
            .blobs
            .put(&pathname, PDF_CONTENT_TYPE, pdf.bytes.clone());
        let stored = match tokio::time::timeout(self.limits.upload_timeout, upload).await {
            Ok(Ok(stored)) => stored,
            Ok(Err(e)) if e.is::<BlobExists>() => {
                tracing::warn!(%hash, %pathname, "blob key already taken by a concurrent issuance");
                return Err(CredentialError::DuplicateHash(hash));
            }
            Ok(Err(e)) => return Err(CredentialError::Blob(e)),
            Err(_) => {
                tracing::warn!(
                    %hash,
                    timeout_secs = self.limits.upload_timeout.as_secs_f64(),
                    "blob upload timed out"
                );
                return Err(CredentialError::UploadTimeout);
            }
        };
        tracing::info!(%hash, url = %stored.url, "uploaded credential PDF");

        let new_credential = NewCredential {
            hash: hash.clone(),
            student_wallet_address: student_wallet.to_lowercase(),
            student_name: student_name.to_string(),
            student_email: student_email.to_string(),
            university_name: university_name.to_string(),
            degree_title: degree_title.to_string(),
            graduation_date: graduation_date.to_string(),
            pdf_filename: pdf.filename.clone(),
            pdf_url: stored.url.clone(),
            nft_token_id,
            blockchain_tx_hash,
        };

        match self.store.insert(new_credential).await {
            Ok(record) => {
                tracing::info!(%hash, id = record.id, "credential inserted");
                Ok(record)
            }
            Err(e) => {
                // `put` is create-only, so `stored` was written by this request alone.
                self.discard_blob(&stored.url).await;
                match e {
                    StoreError::Duplicate(hash) => Err(CredentialError::DuplicateHash(hash)),
                    StoreError::Other(e) => Err(CredentialError::Store(e)),
                }
            }
        }
    }

    /// Looks the hash up, bumps `verified_count` and appends an audit row.
    pub async fn verify(
        &self,
        hash: &str,
        caller_ip: Option<String>,
    ) -> Result<CredentialRecord, CredentialError> {
        let hash = normalize_hash(hash)
            .ok_or_else(|| CredentialError::InvalidInput("Hash parameter is required".into()))?;
        let record = self
            .store
            .record_verification(&hash, VerifierInfo::now(caller_ip))
            .await
            .map_err(CredentialError::Store)?
            .ok_or(CredentialError::NotFound)?;
        tracing::info!(%hash, verified_count = record.verified_count, "credential verified");
        Ok(record)
    }

    pub async fn credentials_for_wallet(
        &self,
        address: &str,
    ) -> Result<Vec<CredentialRecord>, CredentialError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(CredentialError::InvalidInput(
                "Wallet address parameter is required".into(),
            ));
        }
        tracing::info!(%address, "looking up credentials for wallet");
        let credentials = self
            .store
            .list_by_wallet(address)
            .await
            .map_err(CredentialError::Store)?;
        tracing::info!(%address, count = credentials.len(), "wallet lookup finished");
        Ok(credentials)
    }

    /// Audit rows for a credential, newest first. Does not count as a verification.
    pub async fn verification_history(
        &self,
        hash: &str,
    ) -> Result<(String, Vec<VerificationEntry>), CredentialError> {
        let hash = normalize_hash(hash)
            .ok_or_else(|| CredentialError::InvalidInput("Hash parameter is required".into()))?;
        let exists = self
            .store
            .hash_exists(&hash)
            .await
            .map_err(CredentialError::Store)?;
        if !exists {
            return Err(CredentialError::NotFound);
        }
        let entries = self
            .store
            .list_verifications(&hash)
            .await
            .map_err(CredentialError::Store)?;
        Ok((hash, entries))
    }

    pub async fn ping(&self) -> Result<(), CredentialError> {
        self.store.ping().await.map_err(CredentialError::Store)
    }

    async fn derive_unique_hash(
        &self,
        wallet: &str,
        email: &str,
        degree_title: &str,
        timestamp_millis: i64,
    ) -> Result<String, CredentialError> {
        let mut last = String::new();
        for attempt in 0..MAX_HASH_ATTEMPTS {
            let candidate = self.hasher.credential_hash(&DigestInput {
                wallet,
                email,
                degree_title,
                timestamp_millis,
                attempt,
            });
            let taken = self
                .store
                .hash_exists(&candidate)
                .await
                .map_err(CredentialError::Store)?;
            if !taken {
                return Ok(candidate);
            }
            tracing::warn!(hash = %candidate, attempt, "credential hash collision, re-deriving");
            last = candidate;
        }
        Err(CredentialError::DuplicateHash(last))
    }

    /// Best-effort removal of a blob whose row never made it into the store.
    async fn discard_blob(&self, url: &str) {
        match self.blobs.delete(url).await {
            Ok(()) => tracing::warn!(%url, "insert failed, removed uploaded blob"),
            Err(e) => tracing::error!(%url, error = %e, "insert failed and blob cleanup failed"),
        }
    }
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, CredentialError> {
    let value = value.trim();
    if value.is_empty() {
        Err(CredentialError::MissingField(field))
    } else {
        Ok(value)
    }
}

/// Hashes are stored upper-case; `None` for blank input.
fn normalize_hash(hash: &str) -> Option<String> {
    let hash = hash.trim();
    (!hash.is_empty()).then(|| hash.to_ascii_uppercase())
}

fn is_pdf_content_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(PDF_CONTENT_TYPE))
}
