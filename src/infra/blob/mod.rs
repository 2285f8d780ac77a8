//! Object storage for uploaded credential PDFs.

pub mod http;
pub mod local;
pub mod memory;

pub use http::HttpBlobStore;
pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;

use crate::infra::config::BlobBackend;
use async_trait::async_trait;
use axum::body::Bytes;
use std::sync::Arc;

/// Returned by [`BlobStore::put`] when `pathname` is already taken.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("blob '{0}' already exists")]
pub struct BlobExists(pub String);

/// Where an uploaded object ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub pathname: String,
    /// Public URL recorded on the credential.
    pub url: String,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// Creates `pathname`. Never overwrites: an existing object yields [`BlobExists`].
    async fn put(&self, pathname: &str, content_type: &str, bytes: Bytes)
        -> anyhow::Result<StoredBlob>;

    /// Removes an object by the URL `put` returned.
    async fn delete(&self, url: &str) -> anyhow::Result<()>;
}

/// `credentials/{hash}-{filename}`, with the filename reduced to a safe basename.
pub fn credential_blob_path(hash: &str, original_filename: &str) -> String {
    format!("credentials/{}-{}", hash, sanitize_filename(original_filename))
}

fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "document.pdf".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Builds the configured blob client.
pub fn from_config(backend: &BlobBackend) -> anyhow::Result<Arc<dyn BlobStore>> {
    Ok(match backend {
        BlobBackend::Http { api_url, token } => {
            Arc::new(HttpBlobStore::new(api_url.clone(), token.clone())?)
        }
        BlobBackend::Local {
            dir,
            public_base_url,
        } => Arc::new(LocalBlobStore::new(dir.clone(), public_base_url.clone())),
        BlobBackend::Memory => Arc::new(MemoryBlobStore::new()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_exists_survives_anyhow() {
        let err: anyhow::Error = BlobExists("credentials/X-a.pdf".into()).into();
        assert!(err.is::<BlobExists>());
        assert_eq!(err.to_string(), "blob 'credentials/X-a.pdf' already exists");
    }

    #[test]
    fn blob_path_combines_hash_and_filename() {
        assert_eq!(
            credential_blob_path("0A1B2C3D", "diploma.pdf"),
            "credentials/0A1B2C3D-diploma.pdf"
        );
    }

    #[test]
    fn blob_path_strips_directories_and_odd_characters() {
        assert_eq!(
            credential_blob_path("0A1B2C3D", "../../etc/My Diploma (final).pdf"),
            "credentials/0A1B2C3D-My_Diploma__final_.pdf"
        );
        assert_eq!(
            credential_blob_path("0A1B2C3D", "C:\\Users\\ada\\.pdf"),
            "credentials/0A1B2C3D-pdf"
        );
        assert_eq!(
            credential_blob_path("0A1B2C3D", ""),
            "credentials/0A1B2C3D-document.pdf"
        );
    }
}
