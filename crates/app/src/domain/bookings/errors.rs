//! Bookings service errors.

use prestige::pricing::PricingError;
use thiserror::Error;

use crate::{payments::GatewayError, store::StoreError};

#[derive(Debug, Error)]
pub enum BookingsServiceError {
    #[error("booking not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PreconditionFailed(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("storage error")]
    Store(#[from] StoreError),
}

impl From<PricingError> for BookingsServiceError {
    fn from(error: PricingError) -> Self {
        Self::Validation(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn invalid_range_becomes_validation_error() {
        let error = BookingsServiceError::from(PricingError::InvalidRange {
            start: date(2026, 5, 3),
            end: date(2026, 5, 1),
        });

        assert!(matches!(error, BookingsServiceError::Validation(message) if message.contains("2026-05-01")));
    }

    #[test]
    fn gateway_message_is_passed_through() {
        let error = BookingsServiceError::from(GatewayError::new(
            "card_declined",
            "Your card was declined.",
        ));

        assert_eq!(error.to_string(), "Your card was declined.");
    }
}
