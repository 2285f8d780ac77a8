//! In-memory blob store for tests and demo runs.

use crate::infra::blob::{BlobExists, BlobStore, StoredBlob};
use async_trait::async_trait;
use axum::body::Bytes;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tokio::sync::RwLock;

pub const MEMORY_URL_PREFIX: &str = "memory://";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryObject {
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Default)]
pub struct MemoryBlobStore {
    objects: RwLock<HashMap<String, MemoryObject>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn get(&self, pathname: &str) -> Option<MemoryObject> {
        self.objects.read().await.get(pathname).cloned()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn put(
        &self,
        pathname: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> anyhow::Result<StoredBlob> {
        match self.objects.write().await.entry(pathname.to_string()) {
            Entry::Occupied(_) => return Err(BlobExists(pathname.to_string()).into()),
            Entry::Vacant(slot) => {
                slot.insert(MemoryObject {
                    content_type: content_type.to_string(),
                    bytes,
                });
            }
        }
        Ok(StoredBlob {
            pathname: pathname.to_string(),
            url: format!("{}{}", MEMORY_URL_PREFIX, pathname),
        })
    }

    async fn delete(&self, url: &str) -> anyhow::Result<()> {
        let pathname = url
            .strip_prefix(MEMORY_URL_PREFIX)
            .ok_or_else(|| anyhow::anyhow!("not a memory blob url: {}", url))?;
        self.objects.write().await.remove(pathname);
        Ok(())
    }
}
