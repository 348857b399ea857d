//! Invoices service errors.

use prestige::invoices::InvoiceError;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum InvoicesServiceError {
    #[error("invoice not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PreconditionFailed(String),

    #[error("storage error")]
    Store(#[from] StoreError),
}

impl From<InvoiceError> for InvoicesServiceError {
    fn from(error: InvoiceError) -> Self {
        Self::Validation(error.to_string())
    }
}
