//! Cancel Booking Handler

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

use prestige_app::domain::bookings::data::Cancellation;

use crate::{
    bookings::{errors::into_api_error, models::BookingResponse},
    envelope::{self, ApiError, Envelope},
    extensions::*,
    state::State,
};

/// Cancel Booking Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CancelBookingRequest {
    pub reason: String,

    /// Amount to refund out of band, in cents; at most the subtotal
    #[serde(default)]
    pub refund_amount: u64,
}

impl From<CancelBookingRequest> for Cancellation {
    fn from(request: CancelBookingRequest) -> Self {
        Cancellation {
            reason: request.reason,
            refund_amount: request.refund_amount,
        }
    }
}

/// Cancel Booking Handler
#[endpoint(
    tags("bookings"),
    summary = "Cancel Booking",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(name = "bookings.cancel", skip_all, fields(booking_uuid = %*booking), err)]
pub(crate) async fn handler(
    booking: PathParam<Uuid>,
    json: JsonBody<CancelBookingRequest>,
    depot: &mut Depot,
) -> Result<Json<Envelope<BookingResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let booking = state
        .app
        .bookings
        .cancel_booking(booking.into_inner().into(), json.into_inner().into())
        .await
        .map_err(into_api_error)?;

    tracing::info!("cancelled booking");

    Ok(envelope::ok(booking.into()))
}
