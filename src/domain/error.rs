//! Errors raised by the credential service.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("No PDF file provided")]
    MissingFile,

    #[error("File size must be less than {limit}")]
    FileTooLarge { limit: ByteSize },

    #[error("Only PDF files are allowed")]
    UnsupportedMediaType { content_type: Option<String> },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Any other client-input problem (bad query parameter, malformed form).
    #[error("{0}")]
    InvalidInput(String),

    #[error("File upload timed out. Please try with a smaller file or check your connection.")]
    UploadTimeout,

    #[error("A credential with this information already exists.")]
    DuplicateHash(String),

    #[error("Credential not found")]
    NotFound,

    #[error("credential store failure: {0:#}")]
    Store(#[source] anyhow::Error),

    #[error("blob store failure: {0:#}")]
    Blob(#[source] anyhow::Error),
}

impl CredentialError {
    /// Infrastructure failures whose details must stay in server logs.
    pub fn is_internal(&self) -> bool {
        matches!(self, CredentialError::Store(_) | CredentialError::Blob(_))
    }
}

const MIB: u64 = 1024 * 1024;

/// Upload ceiling, displayed as `10MB` for whole mebibytes and as a byte count otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSize(pub u64);

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 >= MIB && self.0 % MIB == 0 {
            write!(f, "{}MB", self.0 / MIB)
        } else {
            write!(f, "{} bytes", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_message_uses_megabytes_when_whole() {
        let err = CredentialError::FileTooLarge {
            limit: ByteSize(10 * MIB),
        };
        assert_eq!(err.to_string(), "File size must be less than 10MB");
        assert_eq!(ByteSize(1500).to_string(), "1500 bytes");
    }

    #[test]
    fn only_infrastructure_errors_are_internal() {
        assert!(CredentialError::Store(anyhow::anyhow!("boom")).is_internal());
        assert!(CredentialError::Blob(anyhow::anyhow!("boom")).is_internal());
        assert!(!CredentialError::UploadTimeout.is_internal());
        assert!(!CredentialError::NotFound.is_internal());
    }
}
