//! Centralized configuration (environment variables + defaults).

use crate::domain::accreditation::{AccreditedDomains, DEFAULT_ACCREDITED_DOMAINS};
use anyhow::{anyhow, Context};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BLOB_API_URL: &str = "https://blob.vercel-storage.com";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobBackend {
    /// Vercel-Blob-style REST API authenticated with a bearer token.
    Http { api_url: String, token: String },
    /// Files on local disk, served back under `public_base_url`.
    Local {
        dir: PathBuf,
        public_base_url: String,
    },
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub storage: StorageBackend,
    pub blob: BlobBackend,
    pub max_file_size_bytes: u64,
    pub upload_timeout: Duration,
    pub accredited_domains: AccreditedDomains,
    pub log_format: LogFormat,
}

impl Default for Config {
    /// In-memory backends with the production limits. Handy for tests and demos.
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            storage: StorageBackend::Memory,
            blob: BlobBackend::Memory,
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            upload_timeout: Duration::from_secs(DEFAULT_UPLOAD_TIMEOUT_SECS),
            accredited_domains: AccreditedDomains::defaults(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address like 0.0.0.0:3000")?;

        let storage = match get("STORAGE_BACKEND").as_deref().unwrap_or("postgres") {
            "postgres" => StorageBackend::Postgres {
                database_url: get("DATABASE_URL")
                    .ok_or_else(|| anyhow!("DATABASE_URL must be set"))?,
                max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 5u32)?.max(1),
            },
            "memory" => StorageBackend::Memory,
            other => return Err(anyhow!("unknown STORAGE_BACKEND '{}'", other)),
        };

        let blob = match get("BLOB_BACKEND").as_deref().unwrap_or("http") {
            "http" => BlobBackend::Http {
                api_url: get("BLOB_API_URL")
                    .unwrap_or_else(|| DEFAULT_BLOB_API_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                token: get("BLOB_READ_WRITE_TOKEN")
                    .ok_or_else(|| anyhow!("BLOB_READ_WRITE_TOKEN must be set"))?,
            },
            "local" => BlobBackend::Local {
                dir: PathBuf::from(get("BLOB_LOCAL_DIR").unwrap_or_else(|| "./blobs".to_string())),
                public_base_url: get("BLOB_PUBLIC_BASE_URL")
                    .unwrap_or_else(|| "http://localhost:3000/blobs".to_string())
                    .trim_end_matches('/')
                    .to_string(),
            },
            "memory" => BlobBackend::Memory,
            other => return Err(anyhow!("unknown BLOB_BACKEND '{}'", other)),
        };

        let max_file_size_bytes =
            parse_or(&get, "MAX_FILE_SIZE_BYTES", DEFAULT_MAX_FILE_SIZE_BYTES)?;
        if max_file_size_bytes == 0 {
            return Err(anyhow!("MAX_FILE_SIZE_BYTES must be greater than zero"));
        }

        let upload_timeout = Duration::from_secs(
            parse_or(&get, "UPLOAD_TIMEOUT_SECS", DEFAULT_UPLOAD_TIMEOUT_SECS)?.max(1),
        );

        let accredited_domains = match get("ACCREDITED_DOMAINS") {
            Some(list) => AccreditedDomains::new(list.split(',')),
            None => AccreditedDomains::new(DEFAULT_ACCREDITED_DOMAINS.iter().copied()),
        };

        let log_format = match get("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            bind_addr,
            storage,
            blob,
            max_file_size_bytes,
            upload_timeout,
            accredited_domains,
            log_format,
        })
    }
}

fn parse_or<G, T>(get: &G, key: &str, default: T) -> anyhow::Result<T>
where
    G: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match get(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| anyhow!("{} must be a valid number (got '{}')", key, raw)),
        None => Ok(default),
    }
}
