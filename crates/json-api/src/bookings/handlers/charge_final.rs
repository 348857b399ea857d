//! Charge Final Payment Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    bookings::{errors::into_api_error, models::BookingResponse},
    envelope::{self, ApiError, Envelope},
    extensions::*,
    observability::record_payment_result,
    state::State,
};

/// Charge Final Payment Handler
///
/// Charges the outstanding balance off-session against the stored card.
#[endpoint(
    tags("bookings"),
    summary = "Charge Final Payment",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(name = "bookings.charge_final", skip_all, fields(booking_uuid = %*booking), err)]
pub(crate) async fn handler(
    booking: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<Envelope<BookingResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let result = state
        .app
        .bookings
        .charge_final_payment(booking.into_inner().into())
        .await;

    record_payment_result("charge_final", &result);

    Ok(envelope::ok(result.map_err(into_api_error)?.into()))
}

#[cfg(test)]
mod tests {
    use prestige::bookings::{BookingStatus, DepositStatus, FinalPaymentStatus};
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::Value;
    use testresult::TestResult;

    use prestige_app::{
        domain::bookings::{BookingsServiceError, MockBookingsService, records::BookingUuid},
        payments::GatewayError,
    };

    use crate::test_helpers::{bookings_service, make_booking};

    use super::*;

    fn make_service(bookings: MockBookingsService) -> Service {
        bookings_service(
            bookings,
            Router::with_path("bookings/{booking}/charge-final").post(handler),
        )
    }

    #[tokio::test]
    async fn test_charge_final_marks_booking_fully_paid() -> TestResult {
        let uuid = BookingUuid::new();

        let mut paid = make_booking(uuid);

        paid.status = BookingStatus::Active;
        paid.payment.deposit_status = DepositStatus::Captured;
        paid.payment.final_status = FinalPaymentStatus::Succeeded;
        paid.payment.final_intent_id = Some("pi_final".to_string());

        let mut bookings = MockBookingsService::new();

        bookings
            .expect_charge_final_payment()
            .once()
            .withf(move |u| *u == uuid)
            .return_once(move |_| Ok(paid));

        let mut res = TestClient::post(format!("http://example.com/bookings/{uuid}/charge-final"))
            .send(&make_service(bookings))
            .await;

        let body: Envelope<BookingResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.data.payment.final_status, "succeeded");
        assert_eq!(body.data.display_status.label, "Fully Paid");

        Ok(())
    }

    #[tokio::test]
    async fn test_charge_final_declined_returns_402() -> TestResult {
        let uuid = BookingUuid::new();

        let mut bookings = MockBookingsService::new();

        bookings
            .expect_charge_final_payment()
            .once()
            .return_once(|_| {
                Err(BookingsServiceError::Gateway(GatewayError::new(
                    "authentication_required",
                    "Your card requires authentication.",
                )))
            });

        let mut res = TestClient::post(format!("http://example.com/bookings/{uuid}/charge-final"))
            .send(&make_service(bookings))
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::PAYMENT_REQUIRED));
        assert_eq!(body["error"], "Your card requires authentication.");

        Ok(())
    }
}
