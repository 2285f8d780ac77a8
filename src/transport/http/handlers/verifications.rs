use crate::transport::http::error::ApiError;
use crate::transport::http::types::{AppState, ErrorResponse, HashQuery, VerificationHistoryResponse};
use axum::extract::{Query, State};
use axum::Json;

/// Read-only view of the audit log; does not bump `verified_count`.
#[utoipa::path(
    get,
    path = "/api/credentials/verifications",
    params(HashQuery),
    responses(
        (status = 200, description = "Verification audit rows, newest first", body = VerificationHistoryResponse),
        (status = 400, description = "Missing hash parameter", body = ErrorResponse),
        (status = 404, description = "Credential not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn verification_history_handler(
    State(state): State<AppState>,
    Query(query): Query<HashQuery>,
) -> Result<Json<VerificationHistoryResponse>, ApiError> {
    let (hash, verifications) = state
        .credentials
        .verification_history(query.hash.as_deref().unwrap_or_default())
        .await
        .map_err(|e| ApiError::from_credential(e, "Failed to fetch verification history"))?;

    Ok(Json(VerificationHistoryResponse {
        success: true,
        hash,
        count: verifications.len(),
        verifications,
    }))
}
