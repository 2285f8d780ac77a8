use crate::app::credential_service::{IssueRequest, UploadedPdf};
use crate::domain::error::{ByteSize, CredentialError};
use crate::transport::http::error::ApiError;
use crate::transport::http::types::{AppState, ErrorResponse, IssueCredentialForm, IssueCredentialResponse};
use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

const INTERNAL_MESSAGE: &str = "Failed to issue credential. Please try again.";

#[utoipa::path(
    post,
    path = "/api/credentials/issue",
    request_body(content = IssueCredentialForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Credential issued", body = IssueCredentialResponse),
        (status = 400, description = "Missing/oversized/non-PDF file or missing field", body = ErrorResponse),
        (status = 408, description = "Blob upload timed out", body = ErrorResponse),
        (status = 409, description = "Credential hash already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn issue_credential_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<IssueCredentialResponse>, ApiError> {
    let multipart = multipart.map_err(|rejection| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            format!("Invalid multipart form: {}", rejection.body_text()),
        )
    })?;

    let max_file_size = state.credentials.limits().max_file_size_bytes;
    let request = read_issue_form(multipart, max_file_size)
        .await
        .map_err(|e| ApiError::from_credential(e, INTERNAL_MESSAGE))?;

    let record = state
        .credentials
        .issue(request)
        .await
        .map_err(|e| ApiError::from_credential(e, INTERNAL_MESSAGE))?;

    Ok(Json(IssueCredentialResponse::from(record)))
}

/// Collects the form parts. The PDF is read chunk by chunk and abandoned as
/// soon as it crosses `max_file_size`.
async fn read_issue_form(
    mut multipart: Multipart,
    max_file_size: u64,
) -> Result<IssueRequest, CredentialError> {
    let too_large = || CredentialError::FileTooLarge {
        limit: ByteSize(max_file_size),
    };
    let form_error = |err: MultipartError| {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            too_large()
        } else {
            CredentialError::InvalidInput(format!("Invalid multipart form: {}", err.body_text()))
        }
    };

    let mut request = IssueRequest::default();
    while let Some(mut field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().unwrap_or_default().to_string();
        let target = match name.as_str() {
            "pdfFile" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);

                let mut buf: Vec<u8> = Vec::new();
                while let Some(chunk) = field.chunk().await.map_err(form_error)? {
                    if (buf.len() + chunk.len()) as u64 > max_file_size {
                        return Err(too_large());
                    }
                    buf.extend_from_slice(&chunk);
                }

                // Browsers send an empty, unnamed part when no file was chosen.
                if !(filename.is_empty() && buf.is_empty()) {
                    request.pdf = Some(UploadedPdf {
                        filename,
                        content_type,
                        bytes: Bytes::from(buf),
                    });
                }
                continue;
            }
            "studentName" => &mut request.student_name,
            "studentEmail" => &mut request.student_email,
            "studentWallet" => &mut request.student_wallet,
            "universityName" => &mut request.university_name,
            "degreeTitle" => &mut request.degree_title,
            "graduationDate" => &mut request.graduation_date,
            _ => continue,
        };
        *target = field.text().await.map_err(form_error)?;
    }
    Ok(request)
}
