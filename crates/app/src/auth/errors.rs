//! Auth service errors.

use thiserror::Error;

use crate::{auth::AdminTokenError, store::StoreError};

#[derive(Debug, Error)]
pub enum AuthServiceError {
    /// Missing, malformed, unknown or revoked token.
    #[error("unauthorized")]
    Unauthorized,

    #[error("token not found")]
    NotFound,

    #[error("storage error")]
    Store(#[from] StoreError),
}

impl From<AdminTokenError> for AuthServiceError {
    fn from(_error: AdminTokenError) -> Self {
        Self::Unauthorized
    }
}
