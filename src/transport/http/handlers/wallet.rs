use crate::transport::http::error::ApiError;
use crate::transport::http::types::{AppState, ErrorResponse, WalletCredentialsResponse, WalletQuery};
use axum::extract::{Query, State};
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/credentials/wallet",
    params(WalletQuery),
    responses(
        (status = 200, description = "Credentials held by the wallet, newest first", body = WalletCredentialsResponse),
        (status = 400, description = "Missing address parameter", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn wallet_credentials_handler(
    State(state): State<AppState>,
    Query(query): Query<WalletQuery>,
) -> Result<Json<WalletCredentialsResponse>, ApiError> {
    let credentials = state
        .credentials
        .credentials_for_wallet(query.address.as_deref().unwrap_or_default())
        .await
        .map_err(|e| ApiError::from_credential(e, "Failed to fetch credentials"))?;

    Ok(Json(WalletCredentialsResponse {
        success: true,
        count: credentials.len(),
        credentials,
    }))
}
