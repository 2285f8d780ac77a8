use crate::transport::http::error::ApiError;
use crate::transport::http::handlers::common::caller_ip;
use crate::transport::http::types::{AppState, ErrorResponse, HashQuery, VerifyCredentialResponse};
use axum::extract::{ConnectInfo, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use std::net::SocketAddr;

#[utoipa::path(
    get,
    path = "/api/credentials/verify",
    params(HashQuery),
    responses(
        (status = 200, description = "Credential exists; verification recorded", body = VerifyCredentialResponse),
        (status = 400, description = "Missing hash parameter", body = ErrorResponse),
        (status = 404, description = "Credential not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn verify_credential_handler(
    State(state): State<AppState>,
    Query(query): Query<HashQuery>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
) -> Result<Json<VerifyCredentialResponse>, ApiError> {
    let ip = caller_ip(&headers, peer.map(|ConnectInfo(addr)| addr));
    let credential = state
        .credentials
        .verify(query.hash.as_deref().unwrap_or_default(), ip)
        .await
        .map_err(|e| ApiError::from_credential(e, "Failed to verify credential"))?;

    Ok(Json(VerifyCredentialResponse {
        success: true,
        credential,
        message: "Credential verified successfully".to_string(),
    }))
}
