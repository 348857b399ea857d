//! Settings Errors

use tracing::error;

use prestige_app::domain::settings::SettingsServiceError;

use crate::envelope::ApiError;

pub(crate) fn into_api_error(error: SettingsServiceError) -> ApiError {
    match error {
        SettingsServiceError::Validation(message) => ApiError::bad_request(message),
        SettingsServiceError::PreconditionFailed(message) => ApiError::conflict(message),
        SettingsServiceError::Store(source) => {
            error!("settings storage failure: {source}");

            ApiError::internal()
        }
    }
}
