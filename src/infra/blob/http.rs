// Client for a Vercel-Blob-style object storage REST API.

use crate::infra::blob::{BlobExists, BlobStore, StoredBlob};
use anyhow::Context;
use async_trait::async_trait;
use axum::body::Bytes;
use serde::Deserialize;

const API_VERSION: &str = "7";

#[derive(Debug, Deserialize)]
struct PutResponse {
    url: String,
    pathname: String,
}

pub struct HttpBlobStore {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl HttpBlobStore {
    pub fn new(api_url: String, token: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("credential-registry/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    fn backend_name(&self) -> &'static str {
        "http"
    }

    async fn put(
        &self,
        pathname: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> anyhow::Result<StoredBlob> {
        let response = self
            .client
            .put(format!("{}/{}", self.api_url, pathname))
            .bearer_auth(&self.token)
            .header("x-api-version", API_VERSION)
            .header("x-content-type", content_type)
            .header("x-add-random-suffix", "0")
            .header("x-allow-overwrite", "0")
            .body(bytes)
            .send()
            .await
            .context("blob upload request failed")?;
        if response.status() == reqwest::StatusCode::CONFLICT {
            return Err(BlobExists(pathname.to_string()).into());
        }
        let response = response
            .error_for_status()
            .context("blob store rejected the upload")?;

        let body: PutResponse = response
            .json()
            .await
            .context("blob store returned an unexpected upload response")?;
        Ok(StoredBlob {
            pathname: body.pathname,
            url: body.url,
        })
    }

    async fn delete(&self, url: &str) -> anyhow::Result<()> {
        self.client
            .post(format!("{}/delete", self.api_url))
            .bearer_auth(&self.token)
            .header("x-api-version", API_VERSION)
            .json(&serde_json::json!({ "urls": [url] }))
            .send()
            .await
            .context("blob delete request failed")?
            .error_for_status()
            .context("blob store rejected the delete")?;
        Ok(())
    }
}
