//! Postgres round trip for the credential store.
//!
//! Needs a reachable database in `DATABASE_URL` (a `.env` file works too);
//! without one the test logs and returns early.

use chrono::Utc;
use credential_registry::crypto::hashing::truncated_sha256;
use credential_registry::domain::credential::{NewCredential, VerifierInfo};
use credential_registry::storage::credentials::{
    CredentialStore, PostgresCredentialStore, StoreError,
};

fn credential(hash: &str, wallet: &str, degree: &str) -> NewCredential {
    NewCredential {
        hash: hash.to_string(),
        student_wallet_address: wallet.to_lowercase(),
        student_name: "Ada Lovelace".to_string(),
        student_email: "ada@example.edu".to_string(),
        university_name: "Example University".to_string(),
        degree_title: degree.to_string(),
        graduation_date: "2024-06-01".to_string(),
        pdf_filename: "diploma.pdf".to_string(),
        pdf_url: format!("https://blob.example/credentials/{}-diploma.pdf", hash),
        nft_token_id: format!("NFT_{}", Utc::now().timestamp_millis()),
        blockchain_tx_hash: format!("0x{}", "00".repeat(32)),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_postgres_store_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping Postgres round trip");
        return Ok(());
    };

    let store = PostgresCredentialStore::connect(&database_url, 2).await?;
    store.ping().await?;

    // Unique per run so repeated runs against the same database do not collide.
    let nonce = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let hash_a = truncated_sha256(&format!("pg-a-{}", nonce));
    let hash_b = truncated_sha256(&format!("pg-b-{}", nonce));
    let wallet = format!("0xPgTest{}", nonce);

    assert!(!store.hash_exists(&hash_a).await?);
    let inserted = store.insert(credential(&hash_a, &wallet, "BSc")).await?;
    assert_eq!(inserted.hash, hash_a);
    assert_eq!(inserted.verified_count, 0);
    assert!(store.hash_exists(&hash_a).await?);

    match store.insert(credential(&hash_a, &wallet, "BSc")).await {
        Err(StoreError::Duplicate(h)) => assert_eq!(h, hash_a),
        other => panic!("expected duplicate error, got {:?}", other.map(|r| r.hash)),
    }

    store.insert(credential(&hash_b, &wallet, "MSc")).await?;

    let first = store
        .record_verification(&hash_a, VerifierInfo::now(Some("192.0.2.1".into())))
        .await?
        .expect("credential exists");
    assert_eq!(first.verified_count, 1);
    let second = store
        .record_verification(&hash_a, VerifierInfo::now(None))
        .await?
        .expect("credential exists");
    assert_eq!(second.verified_count, 2);

    let audit = store.list_verifications(&hash_a).await?;
    assert_eq!(audit.len(), 2);
    assert_eq!(audit[1].verifier_info.ip.as_deref(), Some("192.0.2.1"));

    assert!(store
        .record_verification("ZZZZZZZZ", VerifierInfo::now(None))
        .await?
        .is_none());

    let by_wallet = store.list_by_wallet(&wallet.to_uppercase()).await?;
    let hashes: Vec<&str> = by_wallet.iter().map(|c| c.hash.as_str()).collect();
    assert_eq!(hashes, [hash_b.as_str(), hash_a.as_str()]);

    Ok(())
}
