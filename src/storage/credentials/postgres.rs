//! PostgreSQL-backed credential store.

use crate::domain::credential::{CredentialRecord, NewCredential, VerificationEntry, VerifierInfo};
use crate::storage::credentials::{CredentialStore, StoreError};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};

const CREDENTIAL_COLUMNS: &str = "id, hash, student_wallet_address, student_name, student_email, \
     university_name, degree_title, graduation_date, pdf_filename, pdf_url, nft_token_id, \
     blockchain_tx_hash, issued_at, verified_count";

/// Credential store on top of a shared `PgPool`.
#[derive(Clone)]
pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    /// Connects and makes sure the `credentials` and `verifications` tables exist.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Wraps an existing pool. The caller is responsible for `ensure_schema`.
    pub fn new_with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS credentials (
                id BIGSERIAL PRIMARY KEY,
                hash TEXT NOT NULL UNIQUE,
                student_wallet_address TEXT NOT NULL,
                student_name TEXT NOT NULL,
                student_email TEXT NOT NULL,
                university_name TEXT NOT NULL,
                degree_title TEXT NOT NULL,
                graduation_date TEXT NOT NULL,
                pdf_filename TEXT NOT NULL,
                pdf_url TEXT NOT NULL,
                nft_token_id TEXT NOT NULL,
                blockchain_tx_hash TEXT NOT NULL,
                issued_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                verified_count INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS credentials_wallet_lower_idx
                ON credentials (LOWER(student_wallet_address))",
        )
        .execute(&self.pool)
        .await?;

        // Append-only audit log of verification lookups.
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS verifications (
                id BIGSERIAL PRIMARY KEY,
                credential_hash TEXT NOT NULL REFERENCES credentials(hash),
                verifier_info JSONB NOT NULL,
                verified_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS verifications_credential_hash_idx
                ON verifications (credential_hash)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn credential_from_row(row: &PgRow) -> Result<CredentialRecord> {
    Ok(CredentialRecord {
        id: row.try_get("id")?,
        hash: row.try_get("hash")?,
        student_wallet_address: row.try_get("student_wallet_address")?,
        student_name: row.try_get("student_name")?,
        student_email: row.try_get("student_email")?,
        university_name: row.try_get("university_name")?,
        degree_title: row.try_get("degree_title")?,
        graduation_date: row.try_get("graduation_date")?,
        pdf_filename: row.try_get("pdf_filename")?,
        pdf_url: row.try_get("pdf_url")?,
        nft_token_id: row.try_get("nft_token_id")?,
        blockchain_tx_hash: row.try_get("blockchain_tx_hash")?,
        issued_at: row.try_get("issued_at")?,
        verified_count: row.try_get("verified_count")?,
    })
}

fn verification_from_row(row: &PgRow) -> Result<VerificationEntry> {
    let Json(verifier_info): Json<VerifierInfo> = row.try_get("verifier_info")?;
    Ok(VerificationEntry {
        id: row.try_get("id")?,
        credential_hash: row.try_get("credential_hash")?,
        verifier_info,
        verified_at: row.try_get("verified_at")?,
    })
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn hash_exists(&self, hash: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM credentials WHERE hash = $1)")
                .bind(hash)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn insert(&self, credential: NewCredential) -> Result<CredentialRecord, StoreError> {
        let sql = format!(
            "INSERT INTO credentials (
                hash, student_wallet_address, student_name, student_email, university_name,
                degree_title, graduation_date, pdf_filename, pdf_url, nft_token_id, blockchain_tx_hash
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}",
            CREDENTIAL_COLUMNS
        );

        let result = sqlx::query(&sql)
            .bind(&credential.hash)
            .bind(&credential.student_wallet_address)
            .bind(&credential.student_name)
            .bind(&credential.student_email)
            .bind(&credential.university_name)
            .bind(&credential.degree_title)
            .bind(&credential.graduation_date)
            .bind(&credential.pdf_filename)
            .bind(&credential.pdf_url)
            .bind(&credential.nft_token_id)
            .bind(&credential.blockchain_tx_hash)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(row) => Ok(credential_from_row(&row)?),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::Duplicate(credential.hash))
            }
            Err(e) => Err(StoreError::Other(e.into())),
        }
    }

    async fn find_by_hash(&self, hash: &str) -> Result<Option<CredentialRecord>> {
        let sql = format!("SELECT {} FROM credentials WHERE hash = $1", CREDENTIAL_COLUMNS);
        let row = sqlx::query(&sql).bind(hash).fetch_optional(&self.pool).await?;
        row.as_ref().map(credential_from_row).transpose()
    }

    async fn record_verification(
        &self,
        hash: &str,
        info: VerifierInfo,
    ) -> Result<Option<CredentialRecord>> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE credentials SET verified_count = verified_count + 1
             WHERE hash = $1
             RETURNING {}",
            CREDENTIAL_COLUMNS
        );
        let Some(row) = sqlx::query(&sql)
            .bind(hash)
            .fetch_optional(tx.as_mut())
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };
        let record = credential_from_row(&row)?;

        sqlx::query("INSERT INTO verifications (credential_hash, verifier_info) VALUES ($1, $2)")
            .bind(hash)
            .bind(Json(&info))
            .execute(tx.as_mut())
            .await?;

        tx.commit().await?;
        Ok(Some(record))
    }

    async fn list_by_wallet(&self, wallet: &str) -> Result<Vec<CredentialRecord>> {
        let sql = format!(
            "SELECT {} FROM credentials
             WHERE LOWER(student_wallet_address) = LOWER($1)
             ORDER BY issued_at DESC, id DESC",
            CREDENTIAL_COLUMNS
        );
        let rows = sqlx::query(&sql).bind(wallet).fetch_all(&self.pool).await?;
        rows.iter().map(credential_from_row).collect()
    }

    async fn list_verifications(&self, hash: &str) -> Result<Vec<VerificationEntry>> {
        let rows = sqlx::query(
            "SELECT id, credential_hash, verifier_info, verified_at FROM verifications
             WHERE credential_hash = $1
             ORDER BY verified_at DESC, id DESC",
        )
        .bind(hash)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(verification_from_row).collect()
    }
}
