//! Reschedule Booking Handler

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

use prestige_app::domain::bookings::data::{Reschedule, RescheduleOutcome};

use crate::{
    bookings::{errors::into_api_error, models::BookingResponse},
    envelope::{self, ApiError, Envelope},
    extensions::*,
    state::State,
};

/// Reschedule Booking Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RescheduleBookingRequest {
    /// `YYYY-MM-DD`
    pub start_date: String,

    /// `YYYY-MM-DD`
    pub end_date: String,

    pub reason: String,
}

impl TryFrom<RescheduleBookingRequest> for Reschedule {
    type Error = ApiError;

    fn try_from(request: RescheduleBookingRequest) -> Result<Self, Self::Error> {
        Ok(Reschedule {
            start_date: parse_date("start_date", &request.start_date)?,
            end_date: parse_date("end_date", &request.end_date)?,
            reason: request.reason,
        })
    }
}

/// Booking Rescheduled Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BookingRescheduledResponse {
    pub booking: BookingResponse,

    /// New subtotal less the previous one, in cents
    pub pricing_delta: i64,
}

impl From<RescheduleOutcome> for BookingRescheduledResponse {
    fn from(outcome: RescheduleOutcome) -> Self {
        BookingRescheduledResponse {
            booking: outcome.booking.into(),
            pricing_delta: outcome.pricing_delta,
        }
    }
}

/// Reschedule Booking Handler
///
/// Moves the rental dates, reprices the booking and reports the change.
#[endpoint(
    tags("bookings"),
    summary = "Reschedule Booking",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(name = "bookings.reschedule", skip_all, fields(booking_uuid = %*booking), err)]
pub(crate) async fn handler(
    booking: PathParam<Uuid>,
    json: JsonBody<RescheduleBookingRequest>,
    depot: &mut Depot,
) -> Result<Json<Envelope<BookingRescheduledResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let reschedule = Reschedule::try_from(json.into_inner())?;

    let outcome = state
        .app
        .bookings
        .reschedule_booking(booking.into_inner().into(), reschedule)
        .await
        .map_err(into_api_error)?;

    tracing::info!(pricing_delta = outcome.pricing_delta, "rescheduled booking");

    Ok(envelope::ok(outcome.into()))
}
