// src/bin/api_server.rs

use credential_registry::infra::config::BlobBackend;
use credential_registry::infra::telemetry::{init_tracing, DEFAULT_LOG_FILTER};
use credential_registry::transport;
use credential_registry::Config;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- Configuration + logging ---
    let config = Config::from_env()?;
    init_tracing(DEFAULT_LOG_FILTER, config.log_format);

    // --- Service Initialization ---
    tracing::info!("initializing credential service");
    let app_state = transport::http::AppState::from_config(&config).await?;
    tracing::info!(
        storage = app_state.credentials.store().backend_name(),
        blob_store = app_state.credentials.blobs().backend_name(),
        max_file_size_bytes = config.max_file_size_bytes,
        upload_timeout_secs = config.upload_timeout.as_secs(),
        accredited_domains = config.accredited_domains.list().len(),
        "credential service initialized"
    );

    // --- API Server Initialization ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let mut app = transport::http::create_router(app_state).merge(
        SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()),
    );
    if let BlobBackend::Local { dir, .. } = &config.blob {
        tracing::info!(dir = %dir.display(), "serving local blobs under /blobs");
        app = app.nest_service("/blobs", ServeDir::new(dir));
    }
    let app = app.layer(cors);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("API server listening on http://{}", config.bind_addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", config.bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("graceful shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received (Ctrl+C)");
}
