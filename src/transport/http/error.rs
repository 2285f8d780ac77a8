//! Maps service errors to `{ "error": message }` responses.

use crate::domain::error::CredentialError;
use crate::transport::http::types::ErrorResponse;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Client-facing errors keep their own message. Infrastructure failures are
    /// logged and replaced by `internal_message`.
    pub fn from_credential(err: CredentialError, internal_message: &str) -> Self {
        let status = status_for(&err);
        if err.is_internal() {
            tracing::error!(error = %err, "{}", internal_message);
            return Self::new(status, internal_message);
        }
        if status.is_client_error() {
            tracing::debug!(error = %err, status = status.as_u16(), "request rejected");
        }
        Self::new(status, err.to_string())
    }
}

pub fn status_for(err: &CredentialError) -> StatusCode {
    match err {
        CredentialError::MissingFile
        | CredentialError::FileTooLarge { .. }
        | CredentialError::UnsupportedMediaType { .. }
        | CredentialError::MissingField(_)
        | CredentialError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        CredentialError::UploadTimeout => StatusCode::REQUEST_TIMEOUT,
        CredentialError::DuplicateHash(_) => StatusCode::CONFLICT,
        CredentialError::NotFound => StatusCode::NOT_FOUND,
        CredentialError::Store(_) | CredentialError::Blob(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

pub fn json_422(err: JsonRejection, expected: &str) -> ApiError {
    ApiError::new(
        StatusCode::UNPROCESSABLE_ENTITY,
        format!("Invalid JSON body: {} (expected: {})", err.body_text(), expected),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ByteSize;

    #[test]
    fn taxonomy_maps_to_status_codes() {
        let cases = [
            (CredentialError::MissingFile, StatusCode::BAD_REQUEST),
            (
                CredentialError::FileTooLarge { limit: ByteSize(1) },
                StatusCode::BAD_REQUEST,
            ),
            (
                CredentialError::UnsupportedMediaType { content_type: None },
                StatusCode::BAD_REQUEST,
            ),
            (CredentialError::MissingField("studentName"), StatusCode::BAD_REQUEST),
            (CredentialError::UploadTimeout, StatusCode::REQUEST_TIMEOUT),
            (CredentialError::DuplicateHash("X".into()), StatusCode::CONFLICT),
            (CredentialError::NotFound, StatusCode::NOT_FOUND),
            (
                CredentialError::Store(anyhow::anyhow!("db down")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(status_for(&err), expected, "{:?}", err);
        }
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let err = ApiError::from_credential(
            CredentialError::Store(anyhow::anyhow!("password authentication failed")),
            "Failed to verify credential",
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Failed to verify credential");
    }

    #[test]
    fn client_errors_keep_their_message() {
        let err = ApiError::from_credential(CredentialError::NotFound, "unused");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Credential not found");
    }
}
