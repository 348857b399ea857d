//! Update Booking Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use prestige_app::domain::bookings::data::BookingUpdate;

use crate::{
    bookings::{
        errors::into_api_error,
        models::{BookingResponse, Customer},
    },
    envelope::{self, ApiError, Envelope},
    extensions::*,
    state::State,
};

/// Update Booking Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateBookingRequest {
    pub customer: Customer,
    pub notes: Option<String>,
}

impl From<UpdateBookingRequest> for BookingUpdate {
    fn from(request: UpdateBookingRequest) -> Self {
        BookingUpdate {
            customer: request.customer.into(),
            notes: request.notes,
        }
    }
}

/// Update Booking Handler
///
/// Replaces customer contact details and notes. Dates and pricing change only
/// through rescheduling.
#[endpoint(
    tags("bookings"),
    summary = "Update Booking",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(name = "bookings.update", skip_all, fields(booking_uuid = %*booking), err)]
pub(crate) async fn handler(
    booking: PathParam<Uuid>,
    json: JsonBody<UpdateBookingRequest>,
    depot: &mut Depot,
) -> Result<Json<Envelope<BookingResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let booking = state
        .app
        .bookings
        .update_booking(booking.into_inner().into(), json.into_inner().into())
        .await
        .map_err(into_api_error)?;

    tracing::info!("updated booking");

    Ok(envelope::ok(booking.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use prestige_app::domain::bookings::{
        BookingsServiceError, MockBookingsService, records::BookingUuid,
    };

    use crate::test_helpers::{bookings_service, make_booking, make_customer};

    use super::*;

    fn make_service(bookings: MockBookingsService) -> Service {
        bookings_service(bookings, Router::with_path("bookings/{booking}").put(handler))
    }

    fn payload() -> serde_json::Value {
        json!({
            "customer": {
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": "ada@example.com",
                "phone": "+1 555 0100",
                "drivers_license": "D1234567"
            },
            "notes": "VIP"
        })
    }

    #[tokio::test]
    async fn test_update_booking_success() -> TestResult {
        let uuid = BookingUuid::new();

        let mut updated = make_booking(uuid);

        updated.notes = Some("VIP".to_string());

        let mut bookings = MockBookingsService::new();

        bookings
            .expect_update_booking()
            .once()
            .withf(move |u, update| {
                *u == uuid
                    && *update
                        == BookingUpdate {
                            customer: make_customer(),
                            notes: Some("VIP".to_string()),
                        }
            })
            .return_once(move |_, _| Ok(updated));

        let mut res = TestClient::put(format!("http://example.com/bookings/{uuid}"))
            .json(&payload())
            .send(&make_service(bookings))
            .await;

        let body: Envelope<BookingResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.data.notes.as_deref(), Some("VIP"));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_invalid_email_returns_400() -> TestResult {
        let uuid = BookingUuid::new();

        let mut bookings = MockBookingsService::new();

        bookings
            .expect_update_booking()
            .once()
            .return_once(|_, _| {
                Err(BookingsServiceError::Validation(
                    "customer email is invalid".to_string(),
                ))
            });

        let res = TestClient::put(format!("http://example.com/bookings/{uuid}"))
            .json(&payload())
            .send(&make_service(bookings))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
