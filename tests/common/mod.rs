//! Shared harness: runs the real router on an ephemeral port over in-memory stores.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Bytes;
use credential_registry::app::credential_service::IssuanceLimits;
use credential_registry::crypto::hashing::{DigestInput, HashGenerator, Sha256HashGenerator};
use credential_registry::domain::credential::{
    CredentialRecord, NewCredential, VerificationEntry, VerifierInfo,
};
use credential_registry::infra::blob::{BlobStore, MemoryBlobStore, StoredBlob};
use credential_registry::storage::credentials::{
    CredentialStore, MemoryCredentialStore, StoreError,
};
use credential_registry::transport::http::{create_router, AppState};
use credential_registry::{AccreditedDomains, CredentialService};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n1 0 obj << /Type /Catalog >> endobj\n%%EOF\n";

/// Always returns the same hash, to force collisions.
pub struct ConstantHash(pub &'static str);

impl HashGenerator for ConstantHash {
    fn credential_hash(&self, _input: &DigestInput<'_>) -> String {
        self.0.to_string()
    }
}

/// Memory blob store that sleeps before every upload.
pub struct SlowBlobStore {
    pub inner: Arc<MemoryBlobStore>,
    pub delay: Duration,
}

#[async_trait]
impl BlobStore for SlowBlobStore {
    fn backend_name(&self) -> &'static str {
        "slow-memory"
    }

    async fn put(
        &self,
        pathname: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> anyhow::Result<StoredBlob> {
        tokio::time::sleep(self.delay).await;
        self.inner.put(pathname, content_type, bytes).await
    }

    async fn delete(&self, url: &str) -> anyhow::Result<()> {
        self.inner.delete(url).await
    }
}

/// How [`FailingInsertStore`] rejects inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertFailure {
    /// Opaque backend error carrying a secret that must not reach clients.
    Unavailable,
    /// Unique violation on insert, with every pre-upload existence check passing.
    Duplicate,
}

/// Memory credential store whose inserts always fail.
pub struct FailingInsertStore {
    pub inner: Arc<MemoryCredentialStore>,
    pub failure: InsertFailure,
}

#[async_trait]
impl CredentialStore for FailingInsertStore {
    fn backend_name(&self) -> &'static str {
        "failing-memory"
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.inner.ping().await
    }

    async fn hash_exists(&self, hash: &str) -> anyhow::Result<bool> {
        match self.failure {
            InsertFailure::Unavailable => self.inner.hash_exists(hash).await,
            InsertFailure::Duplicate => Ok(false),
        }
    }

    async fn insert(&self, credential: NewCredential) -> Result<CredentialRecord, StoreError> {
        match self.failure {
            InsertFailure::Unavailable => Err(StoreError::Other(anyhow::anyhow!(
                "connection reset by peer (password=hunter2)"
            ))),
            InsertFailure::Duplicate => Err(StoreError::Duplicate(credential.hash)),
        }
    }

    async fn find_by_hash(&self, hash: &str) -> anyhow::Result<Option<CredentialRecord>> {
        self.inner.find_by_hash(hash).await
    }

    async fn record_verification(
        &self,
        hash: &str,
        info: VerifierInfo,
    ) -> anyhow::Result<Option<CredentialRecord>> {
        self.inner.record_verification(hash, info).await
    }

    async fn list_by_wallet(&self, wallet: &str) -> anyhow::Result<Vec<CredentialRecord>> {
        self.inner.list_by_wallet(wallet).await
    }

    async fn list_verifications(&self, hash: &str) -> anyhow::Result<Vec<VerificationEntry>> {
        self.inner.list_verifications(hash).await
    }
}

pub struct TestOptions {
    pub hasher: Arc<dyn HashGenerator>,
    pub limits: IssuanceLimits,
    pub upload_delay: Option<Duration>,
    pub insert_failure: Option<InsertFailure>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            hasher: Arc::new(Sha256HashGenerator),
            limits: IssuanceLimits::default(),
            upload_delay: None,
            insert_failure: None,
        }
    }
}

pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub store: Arc<MemoryCredentialStore>,
    pub blobs: Arc<MemoryBlobStore>,
    server: tokio::task::JoinHandle<()>,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server.abort();
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(TestOptions::default()).await
}

pub async fn spawn_app_with(options: TestOptions) -> TestApp {
    let store = Arc::new(MemoryCredentialStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());

    let credential_store: Arc<dyn CredentialStore> = match options.insert_failure {
        Some(failure) => Arc::new(FailingInsertStore {
            inner: store.clone(),
            failure,
        }),
        None => store.clone(),
    };
    let blob_store: Arc<dyn BlobStore> = match options.upload_delay {
        Some(delay) => Arc::new(SlowBlobStore {
            inner: blobs.clone(),
            delay,
        }),
        None => blobs.clone(),
    };

    let service = CredentialService::new(
        credential_store,
        blob_store,
        options.hasher,
        options.limits,
    );
    let router = create_router(AppState::new(service, AccreditedDomains::defaults()));

    // Bind to an ephemeral port to avoid conflicts between tests.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let port = listener.local_addr().expect("local addr").port();
    let server = tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("test server");
    });

    TestApp {
        base_url: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client"),
        store,
        blobs,
        server,
    }
}

/// Form fields for one issuance; `pdf` is `(filename, mime, bytes)`.
pub struct IssueForm<'a> {
    pub student_wallet: &'a str,
    pub degree_title: &'a str,
    pub pdf: Option<(&'a str, &'a str, Vec<u8>)>,
}

impl<'a> IssueForm<'a> {
    pub fn new(student_wallet: &'a str, degree_title: &'a str) -> Self {
        Self {
            student_wallet,
            degree_title,
            pdf: Some(("diploma.pdf", "application/pdf", PDF_BYTES.to_vec())),
        }
    }

    pub fn with_pdf(mut self, filename: &'a str, mime: &'a str, bytes: Vec<u8>) -> Self {
        self.pdf = Some((filename, mime, bytes));
        self
    }

    pub fn without_pdf(mut self) -> Self {
        self.pdf = None;
        self
    }

    fn into_multipart(self) -> reqwest::multipart::Form {
        let mut form = reqwest::multipart::Form::new()
            .text("studentName", "Ada Lovelace")
            .text("studentEmail", "ada@example.edu")
            .text("studentWallet", self.student_wallet.to_string())
            .text("universityName", "Example University")
            .text("degreeTitle", self.degree_title.to_string())
            .text("graduationDate", "2024-06-01");
        if let Some((filename, mime, bytes)) = self.pdf {
            let part = reqwest::multipart::Part::bytes(bytes)
                .file_name(filename.to_string())
                .mime_str(mime)
                .expect("valid mime");
            form = form.part("pdfFile", part);
        }
        form
    }
}

impl TestApp {
    pub async fn issue(&self, form: IssueForm<'_>) -> (reqwest::StatusCode, serde_json::Value) {
        let response = self
            .client
            .post(format!("{}/api/credentials/issue", self.base_url))
            .multipart(form.into_multipart())
            .send()
            .await
            .expect("issue request");
        let status = response.status();
        (status, response.json().await.expect("issue response json"))
    }

    pub async fn get_json(&self, path_and_query: &str) -> (reqwest::StatusCode, serde_json::Value) {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path_and_query))
            .send()
            .await
            .expect("get request");
        let status = response.status();
        (status, response.json().await.expect("response json"))
    }
}
