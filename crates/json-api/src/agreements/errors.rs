//! Agreement Errors

use tracing::error;

use prestige_app::domain::agreements::AgreementsServiceError;

use crate::envelope::ApiError;

pub(crate) fn into_api_error(error: AgreementsServiceError) -> ApiError {
    match error {
        AgreementsServiceError::NotFound => ApiError::not_found("Agreement not found"),
        AgreementsServiceError::BookingNotFound => ApiError::not_found("Booking not found"),
        AgreementsServiceError::Validation(message) => ApiError::bad_request(message),
        AgreementsServiceError::PreconditionFailed(message) => ApiError::conflict(message),
        AgreementsServiceError::Store(source) => {
            error!("agreement storage failure: {source}");

            ApiError::internal()
        }
    }
}
