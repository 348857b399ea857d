//! Invoice Errors

use tracing::error;

use prestige_app::domain::invoices::InvoicesServiceError;

use crate::envelope::ApiError;

pub(crate) fn into_api_error(error: InvoicesServiceError) -> ApiError {
    match error {
        InvoicesServiceError::NotFound => ApiError::not_found("Invoice not found"),
        InvoicesServiceError::Validation(message) => ApiError::bad_request(message),
        InvoicesServiceError::PreconditionFailed(message) => ApiError::conflict(message),
        InvoicesServiceError::Store(source) => {
            error!("invoice storage failure: {source}");

            ApiError::internal()
        }
    }
}
