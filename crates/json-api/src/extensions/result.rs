//! Result helpers that turn infrastructure errors into enveloped API errors.

use std::fmt::Display;

use tracing::{error, warn};

use crate::envelope::ApiError;

pub(crate) trait ResultExt<T> {
    /// Log at error level and answer with a generic 500.
    fn or_500(self, context: &str) -> Result<T, ApiError>;

    /// Log at warn level and answer with a 400 carrying `message`. The
    /// underlying error is never shown to the caller.
    fn or_400(self, message: &str) -> Result<T, ApiError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Display,
{
    fn or_500(self, context: &str) -> Result<T, ApiError> {
        self.map_err(|error| {
            error!("{context}: {error}");

            ApiError::internal()
        })
    }

    fn or_400(self, message: &str) -> Result<T, ApiError> {
        self.map_err(|error| {
            warn!(%error, "{message}");

            ApiError::bad_request(message)
        })
    }
}
