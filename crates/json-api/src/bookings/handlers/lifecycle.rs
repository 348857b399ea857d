//! Booking Lifecycle Handlers
//!
//! `pending -> confirmed -> active -> completed`.

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    bookings::{errors::into_api_error, models::BookingResponse},
    envelope::{self, ApiError, Envelope},
    extensions::*,
    state::State,
};

/// Confirm Booking Handler
///
/// Emails the customer a confirmation when enabled in settings.
#[endpoint(
    tags("bookings"),
    summary = "Confirm Booking",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(name = "bookings.confirm", skip_all, fields(booking_uuid = %*booking), err)]
pub(crate) async fn confirm(
    booking: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<Envelope<BookingResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let booking = state
        .app
        .bookings
        .confirm_booking(booking.into_inner().into())
        .await
        .map_err(into_api_error)?;

    Ok(envelope::ok(booking.into()))
}

/// Start Booking Handler
#[endpoint(
    tags("bookings"),
    summary = "Start Rental",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(name = "bookings.start", skip_all, fields(booking_uuid = %*booking), err)]
pub(crate) async fn start(
    booking: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<Envelope<BookingResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let booking = state
        .app
        .bookings
        .start_booking(booking.into_inner().into())
        .await
        .map_err(into_api_error)?;

    Ok(envelope::ok(booking.into()))
}

/// Complete Booking Handler
#[endpoint(
    tags("bookings"),
    summary = "Complete Rental",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(name = "bookings.complete", skip_all, fields(booking_uuid = %*booking), err)]
pub(crate) async fn complete(
    booking: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<Envelope<BookingResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let booking = state
        .app
        .bookings
        .complete_booking(booking.into_inner().into())
        .await
        .map_err(into_api_error)?;

    Ok(envelope::ok(booking.into()))
}

#[cfg(test)]
mod tests {
    use prestige::bookings::BookingStatus;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::Value;
    use testresult::TestResult;

    use prestige_app::domain::bookings::{
        BookingsServiceError, MockBookingsService, records::BookingUuid,
    };

    use crate::test_helpers::{bookings_service, make_booking};

    use super::*;

    fn make_service(bookings: MockBookingsService) -> Service {
        bookings_service(
            bookings,
            Router::with_path("bookings/{booking}")
                .push(Router::with_path("confirm").post(confirm))
                .push(Router::with_path("start").post(start))
                .push(Router::with_path("complete").post(complete)),
        )
    }

    #[tokio::test]
    async fn test_confirm_returns_confirmed_booking() -> TestResult {
        let uuid = BookingUuid::new();

        let mut confirmed = make_booking(uuid);

        confirmed.status = BookingStatus::Confirmed;

        let mut bookings = MockBookingsService::new();

        bookings
            .expect_confirm_booking()
            .once()
            .withf(move |u| *u == uuid)
            .return_once(move |_| Ok(confirmed));

        let mut res = TestClient::post(format!("http://example.com/bookings/{uuid}/confirm"))
            .send(&make_service(bookings))
            .await;

        let body: Envelope<BookingResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.data.status, "confirmed");
        assert_eq!(body.data.display_status.label, "Deposit Authorized");

        Ok(())
    }

    #[tokio::test]
    async fn test_start_from_pending_returns_409() -> TestResult {
        let uuid = BookingUuid::new();

        let mut bookings = MockBookingsService::new();

        bookings
            .expect_start_booking()
            .once()
            .withf(move |u| *u == uuid)
            .return_once(|_| {
                Err(BookingsServiceError::PreconditionFailed(
                    "cannot move booking from pending to active".to_string(),
                ))
            });

        let mut res = TestClient::post(format!("http://example.com/bookings/{uuid}/start"))
            .send(&make_service(bookings))
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));
        assert_eq!(body["error"], "cannot move booking from pending to active");

        Ok(())
    }

    #[tokio::test]
    async fn test_complete_missing_booking_returns_404() -> TestResult {
        let uuid = BookingUuid::new();

        let mut bookings = MockBookingsService::new();

        bookings
            .expect_complete_booking()
            .once()
            .return_once(|_| Err(BookingsServiceError::NotFound));

        let res = TestClient::post(format!("http://example.com/bookings/{uuid}/complete"))
            .send(&make_service(bookings))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
