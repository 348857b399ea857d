//! Deposit Handlers
//!
//! Capture, re-authorize and refresh the deposit hold.

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

/// Capture Deposit Handler
///
/// Requires an authorized deposit.
#[endpoint(
    tags("bookings"),
    summary = "Capture Deposit",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(name = "bookings.capture_deposit", skip_all, fields(booking_uuid = %*booking), err)]
pub(crate) async fn capture(
    booking: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<Envelope<BookingResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let result = state
        .app
        .bookings
        .capture_deposit(booking.into_inner().into())
        .await;

    record_payment_result("capture_deposit", &result);

    Ok(envelope::ok(result.map_err(into_api_error)?.into()))
}

/// Re-authorize Deposit Handler
///
/// Places a fresh hold against the stored card, e.g. after the previous one
/// lapsed or failed.
#[endpoint(
    tags("bookings"),
    summary = "Re-authorize Deposit",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(name = "bookings.reauthorize_deposit", skip_all, fields(booking_uuid = %*booking), err)]
pub(crate) async fn reauthorize(
    booking: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<Envelope<BookingResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let result = state
        .app
        .bookings
        .reauthorize_deposit(booking.into_inner().into())
        .await;

    record_payment_result("reauthorize_deposit", &result);

    Ok(envelope::ok(result.map_err(into_api_error)?.into()))
}

/// Sync Deposit Handler
///
/// Refreshes the deposit status from the payment gateway.
#[endpoint(
    tags("bookings"),
    summary = "Sync Deposit Status",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(name = "bookings.sync_deposit", skip_all, fields(booking_uuid = %*booking), err)]
pub(crate) async fn sync(
    booking: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<Envelope<BookingResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let result = state
        .app
        .bookings
        .sync_deposit(booking.into_inner().into())
        .await;

    record_payment_result("sync_deposit", &result);

    Ok(envelope::ok(result.map_err(into_api_error)?.into()))
}
