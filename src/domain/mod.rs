pub mod accreditation;
pub mod credential;
pub mod error;
