use crate::transport::http::error::{json_422, ApiError};
use crate::transport::http::types::{
    AppState, DomainVerificationRequest, DomainVerificationResponse, ErrorResponse,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

#[utoipa::path(
    post,
    path = "/api/universities/verify-domain",
    request_body = DomainVerificationRequest,
    responses(
        (status = 200, description = "Accreditation decision", body = DomainVerificationResponse),
        (status = 400, description = "Missing or malformed domain", body = ErrorResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ErrorResponse)
    )
)]
pub async fn verify_domain_handler(
    State(state): State<AppState>,
    payload: Result<Json<DomainVerificationRequest>, JsonRejection>,
) -> Result<Json<DomainVerificationResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| json_422(e, "{ \"domain\": \"mit.edu\" }"))?;

    if request.domain.trim().is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "Please enter university domain",
        ));
    }
    let check = state
        .accredited_domains
        .check(&request.domain)
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::BAD_REQUEST,
                format!("'{}' is not a valid domain", request.domain.trim()),
            )
        })?;

    tracing::info!(domain = %check.domain, accredited = check.accredited, "domain accreditation check");
    let message = if check.accredited {
        "University domain is accredited."
    } else {
        "University domain is not in our accredited institutions list"
    };

    Ok(Json(DomainVerificationResponse {
        success: true,
        domain: check.domain,
        accredited: check.accredited,
        matched: check.matched,
        message: message.to_string(),
    }))
}
