// Derives the public credential hash and the placeholder NFT identifiers.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the SHA-256 digest.
pub const CREDENTIAL_HASH_LEN: usize = 8;

/// Submitted fields that feed the credential digest.
#[derive(Debug, Clone, Copy)]
pub struct DigestInput<'a> {
    pub wallet: &'a str,
    pub email: &'a str,
    pub degree_title: &'a str,
    pub timestamp_millis: i64,
    /// Collision retry counter, 0 on the first derivation.
    pub attempt: u32,
}

impl DigestInput<'_> {
    /// `{wallet}-{email}-{degree}-{millis}`, with `-{attempt}` appended on retries.
    pub fn canonical(&self) -> String {
        let mut input = format!(
            "{}-{}-{}-{}",
            self.wallet, self.email, self.degree_title, self.timestamp_millis
        );
        if self.attempt > 0 {
            input.push('-');
            input.push_str(&self.attempt.to_string());
        }
        input
    }
}

/// Source of public credential hashes.
///
/// The issuance service only depends on this trait so that collisions can be
/// forced in tests with a generator that always returns the same value.
pub trait HashGenerator: Send + Sync {
    fn credential_hash(&self, input: &DigestInput<'_>) -> String;
}

/// SHA-256 over the canonical input, truncated to 8 upper-case hex characters.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256HashGenerator;

impl HashGenerator for Sha256HashGenerator {
    fn credential_hash(&self, input: &DigestInput<'_>) -> String {
        truncated_sha256(&input.canonical())
    }
}

pub fn truncated_sha256(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    hex::encode(digest)[..CREDENTIAL_HASH_LEN].to_uppercase()
}

/// True for exactly 8 characters of upper-case hex.
pub fn is_credential_hash(value: &str) -> bool {
    value.len() == CREDENTIAL_HASH_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
}

/// Display-only token id. Not backed by any ledger.
pub fn nft_token_id(timestamp_millis: i64) -> String {
    format!("NFT_{}", timestamp_millis)
}

/// Display-only transaction hash: `0x` + 32 random bytes in hex.
pub fn placeholder_tx_hash() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("0x{}", hex::encode(bytes))
}
