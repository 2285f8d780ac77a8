//! Filesystem blob store for local development.
//!
//! Objects are written below `dir` and addressed as `{public_base_url}/{pathname}`;
//! the API server serves `dir` back under `/blobs` when this backend is active.

use crate::infra::blob::{BlobExists, BlobStore, StoredBlob};
use anyhow::Context;
use async_trait::async_trait;
use axum::body::Bytes;
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;

pub struct LocalBlobStore {
    dir: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(dir: PathBuf, public_base_url: String) -> Self {
        Self {
            dir,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn resolve(&self, pathname: &str) -> anyhow::Result<PathBuf> {
        let relative = Path::new(pathname);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || pathname.is_empty() {
            return Err(anyhow::anyhow!("refusing blob path '{}'", pathname));
        }
        Ok(self.dir.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    async fn put(
        &self,
        pathname: &str,
        _content_type: &str,
        bytes: Bytes,
    ) -> anyhow::Result<StoredBlob> {
        let path = self.resolve(pathname)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(BlobExists(pathname.to_string()).into());
            }
            Err(e) => {
                return Err(anyhow::Error::new(e).context(format!("creating {}", path.display())))
            }
        };
        let written = async {
            file.write_all(&bytes).await?;
            file.flush().await
        }
        .await;
        if let Err(e) = written {
            // Created by this call; drop the partial file.
            let _ = tokio::fs::remove_file(&path).await;
            return Err(anyhow::Error::new(e).context(format!("writing {}", path.display())));
        }
        Ok(StoredBlob {
            pathname: pathname.to_string(),
            url: format!("{}/{}", self.public_base_url, pathname),
        })
    }

    async fn delete(&self, url: &str) -> anyhow::Result<()> {
        let pathname = url
            .strip_prefix(&self.public_base_url)
            .map(|p| p.trim_start_matches('/'))
            .ok_or_else(|| anyhow::anyhow!("url {} is not served by this store", url))?;
        let path = self.resolve(pathname)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::new(e).context(format!("removing {}", path.display()))),
        }
    }
}
