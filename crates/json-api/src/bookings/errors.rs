//! Booking Errors

use tracing::{error, warn};

use prestige_app::domain::bookings::BookingsServiceError;

use crate::envelope::ApiError;

pub(crate) fn into_api_error(error: BookingsServiceError) -> ApiError {
    match error {
        BookingsServiceError::NotFound => ApiError::not_found("Booking not found"),
        BookingsServiceError::Validation(message) => ApiError::bad_request(message),
        BookingsServiceError::PreconditionFailed(message) => ApiError::conflict(message),
        BookingsServiceError::Gateway(gateway) => {
            warn!(code = %gateway.code, "payment gateway rejected booking operation: {}", gateway.message);

            ApiError::payment_required(gateway.message)
        }
        BookingsServiceError::Store(source) => {
            error!("booking storage failure: {source}");

            ApiError::internal()
        }
    }
}
