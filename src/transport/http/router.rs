use crate::domain::accreditation::AccreditationCheck;
use crate::domain::credential::{CredentialRecord, VerificationEntry, VerifierInfo};
use crate::transport::http::handlers::{
    accreditation, health, issue, verifications, verify, wallet,
};
use crate::transport::http::types::{
    AppState, DomainVerificationRequest, DomainVerificationResponse, ErrorResponse,
    HealthResponse, IssueCredentialForm, IssueCredentialResponse, VerificationHistoryResponse,
    VerifyCredentialResponse, WalletCredentialsResponse,
};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Room for the text fields and multipart framing on top of the PDF ceiling.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        issue::issue_credential_handler,
        verify::verify_credential_handler,
        wallet::wallet_credentials_handler,
        verifications::verification_history_handler,
        accreditation::verify_domain_handler
    ),
    components(schemas(
        CredentialRecord,
        VerificationEntry,
        VerifierInfo,
        AccreditationCheck,
        IssueCredentialForm,
        IssueCredentialResponse,
        VerifyCredentialResponse,
        WalletCredentialsResponse,
        VerificationHistoryResponse,
        DomainVerificationRequest,
        DomainVerificationResponse,
        HealthResponse,
        ErrorResponse
    ))
)]
#[allow(dead_code)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    let max_file_size = app_state.credentials.limits().max_file_size_bytes;
    let body_limit = usize::try_from(max_file_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/api/credentials/issue", post(issue::issue_credential_handler))
        .route("/api/credentials/verify", get(verify::verify_credential_handler))
        .route("/api/credentials/wallet", get(wallet::wallet_credentials_handler))
        .route(
            "/api/credentials/verifications",
            get(verifications::verification_history_handler),
        )
        .route(
            "/api/universities/verify-domain",
            post(accreditation::verify_domain_handler),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
