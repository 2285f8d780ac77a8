pub mod error;
pub mod router;
pub mod types;
pub mod handlers {
    pub mod accreditation;
    pub mod common;
    pub mod health;
    pub mod issue;
    pub mod verifications;
    pub mod verify;
    pub mod wallet;
}

pub use error::ApiError;
pub use router::{create_router, ApiDoc};
pub use types::AppState;
