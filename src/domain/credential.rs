//! Credential records and verification audit entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One issued-degree entry, keyed by its public hash.
///
/// Serialized with the column names of the `credentials` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CredentialRecord {
    pub id: i64,
    /// 8 upper-case hex characters; the public lookup token.
    pub hash: String,
    /// Always stored lower-cased.
    pub student_wallet_address: String,
    pub student_name: String,
    pub student_email: String,
    pub university_name: String,
    pub degree_title: String,
    pub graduation_date: String,
    pub pdf_filename: String,
    pub pdf_url: String,
    /// Display-only, synthesized at issuance.
    pub nft_token_id: String,
    /// Display-only, synthesized at issuance.
    pub blockchain_tx_hash: String,
    pub issued_at: DateTime<Utc>,
    pub verified_count: i32,
}

/// Fields written by the issuance pipeline. The store assigns `id`,
/// `issued_at` and `verified_count`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCredential {
    pub hash: String,
    pub student_wallet_address: String,
    pub student_name: String,
    pub student_email: String,
    pub university_name: String,
    pub degree_title: String,
    pub graduation_date: String,
    pub pdf_filename: String,
    pub pdf_url: String,
    pub nft_token_id: String,
    pub blockchain_tx_hash: String,
}

impl NewCredential {
    /// Materializes the row the store would return after insert.
    pub fn into_record(self, id: i64, issued_at: DateTime<Utc>) -> CredentialRecord {
        CredentialRecord {
            id,
            hash: self.hash,
            student_wallet_address: self.student_wallet_address,
            student_name: self.student_name,
            student_email: self.student_email,
            university_name: self.university_name,
            degree_title: self.degree_title,
            graduation_date: self.graduation_date,
            pdf_filename: self.pdf_filename,
            pdf_url: self.pdf_url,
            nft_token_id: self.nft_token_id,
            blockchain_tx_hash: self.blockchain_tx_hash,
            issued_at,
            verified_count: 0,
        }
    }
}

/// Payload of the `verifier_info` JSONB column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VerifierInfo {
    pub timestamp: DateTime<Utc>,
    pub ip: Option<String>,
}

impl VerifierInfo {
    pub fn now(ip: Option<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            ip,
        }
    }
}

/// One row of the append-only `verifications` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VerificationEntry {
    pub id: i64,
    pub credential_hash: String,
    pub verifier_info: VerifierInfo,
    pub verified_at: DateTime<Utc>,
}
