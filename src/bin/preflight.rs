use axum::body::Bytes;
use chrono::Utc;
use credential_registry::infra::blob;
use credential_registry::infra::config::{BlobBackend, StorageBackend};
use credential_registry::infra::telemetry::{init_tracing, DEFAULT_LOG_FILTER};
use credential_registry::storage::credentials;
use credential_registry::Config;

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--blob-probe]\n\
         \n\
         Requires env vars:\n\
           DATABASE_URL (unless STORAGE_BACKEND=memory)\n\
           BLOB_READ_WRITE_TOKEN (unless BLOB_BACKEND=local|memory)\n\
         \n\
         --blob-probe   upload and delete a small object to prove blob credentials work\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let blob_probe = args.iter().any(|a| a == "--blob-probe");

    // Force-read config (nice error messages if missing)
    let config = Config::from_env()?;
    init_tracing(DEFAULT_LOG_FILTER, config.log_format);

    println!("> Preflight:");
    println!("  BIND_ADDR={}", config.bind_addr);
    match &config.storage {
        StorageBackend::Postgres {
            max_connections, ..
        } => println!("  STORAGE_BACKEND=postgres (max_connections={})", max_connections),
        StorageBackend::Memory => println!("  STORAGE_BACKEND=memory"),
    }
    match &config.blob {
        BlobBackend::Http { api_url, .. } => println!("  BLOB_BACKEND=http ({})", api_url),
        BlobBackend::Local {
            dir,
            public_base_url,
        } => println!(
            "  BLOB_BACKEND=local ({} -> {})",
            dir.display(),
            public_base_url
        ),
        BlobBackend::Memory => println!("  BLOB_BACKEND=memory"),
    }
    println!("  MAX_FILE_SIZE_BYTES={}", config.max_file_size_bytes);
    println!("  UPLOAD_TIMEOUT_SECS={}", config.upload_timeout.as_secs());
    println!(
        "  ACCREDITED_DOMAINS={}",
        config.accredited_domains.list().join(",")
    );

    // Store connectivity + schema
    let store = credentials::from_config(&config.storage)
        .await
        .map_err(|e| anyhow::anyhow!("Credential store unavailable: {:#}", e))?;
    store.ping().await?;
    println!("  Credential store reachable, schema ensured ({}).", store.backend_name());

    // Blob store
    let blobs = blob::from_config(&config.blob)?;
    if blob_probe {
        let pathname = format!("preflight/probe-{}.txt", Utc::now().timestamp_millis());
        let stored = blobs
            .put(&pathname, "text/plain", Bytes::from_static(b"preflight"))
            .await
            .map_err(|e| anyhow::anyhow!("Blob upload probe failed: {:#}", e))?;
        println!("  Blob probe uploaded: {}", stored.url);
        blobs
            .delete(&stored.url)
            .await
            .map_err(|e| anyhow::anyhow!("Blob delete probe failed: {:#}", e))?;
        println!("  Blob probe deleted.");
    } else {
        println!(
            "  Blob store configured ({}); pass --blob-probe to test credentials.",
            blobs.backend_name()
        );
    }

    println!("> Preflight OK.");
    Ok(())
}
