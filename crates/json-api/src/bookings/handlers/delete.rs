//! Delete Booking Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{PathParam, QueryParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    bookings::errors::into_api_error,
    envelope::{self, ApiError, Envelope},
    extensions::*,
    state::State,
};

/// Booking Deleted Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BookingDeletedResponse {
    /// Deleted booking UUID
    pub uuid: Uuid,
}

/// Delete Booking Handler
///
/// Bookings holding captured funds are only removed with `force=true`.
#[endpoint(
    tags("bookings"),
    summary = "Delete Booking",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(name = "bookings.delete", skip_all, fields(booking_uuid = %*booking), err)]
pub(crate) async fn handler(
    booking: PathParam<Uuid>,
    force: QueryParam<bool, false>,
    depot: &mut Depot,
) -> Result<Json<Envelope<BookingDeletedResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let uuid = booking.into_inner();

    state
        .app
        .bookings
        .delete_booking(uuid.into(), force.into_inner().unwrap_or(false))
        .await
        .map_err(into_api_error)?;

    Ok(envelope::ok(BookingDeletedResponse { uuid }))
}
