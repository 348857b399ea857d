//! Agreements service errors.

use prestige::agreements::AgreementError;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AgreementsServiceError {
    #[error("agreement not found")]
    NotFound,

    #[error("booking not found")]
    BookingNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PreconditionFailed(String),

    #[error("storage error")]
    Store(#[from] StoreError),
}

impl From<AgreementError> for AgreementsServiceError {
    fn from(error: AgreementError) -> Self {
        Self::Validation(error.to_string())
    }
}
