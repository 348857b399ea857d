//! Get Booking Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    bookings::{errors::into_api_error, models::BookingResponse},
    envelope::{self, ApiError, Envelope},
    extensions::*,
    state::State,
};

/// Get Booking Handler
#[endpoint(
    tags("bookings"),
    summary = "Get Booking",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    booking: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<Envelope<BookingResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let booking = state
        .app
        .bookings
        .get_booking(booking.into_inner().into())
        .await
        .map_err(into_api_error)?;

    Ok(envelope::ok(booking.into()))
}
