//! Booking Adjustment Handler

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

use prestige_app::domain::bookings::data::NewAdjustment;

use crate::{
    bookings::{errors::into_api_error, models::BookingResponse},
    envelope::{self, ApiError, Envelope},
    extensions::*,
    observability::record_payment_result,
    state::State,
};

/// Apply Adjustment Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ApplyAdjustmentRequest {
    /// Cents; positive for a charge, negative for a discount or refund
    pub amount: i64,

    pub memo: String,

    /// Charge or refund through the gateway instead of only recording it
    #[serde(default)]
    pub charge_now: bool,
}

impl From<ApplyAdjustmentRequest> for NewAdjustment {
    fn from(request: ApplyAdjustmentRequest) -> Self {
        NewAdjustment {
            amount: request.amount,
            memo: request.memo,
            charge_now: request.charge_now,
        }
    }
}

/// Apply Adjustment Handler
#[endpoint(
    tags("bookings"),
    summary = "Apply Adjustment",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(
    name = "bookings.apply_adjustment",
    skip_all,
    fields(booking_uuid = %*booking, amount = tracing::field::Empty, charge_now = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    booking: PathParam<Uuid>,
    json: JsonBody<ApplyAdjustmentRequest>,
    depot: &mut Depot,
) -> Result<Json<Envelope<BookingResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let adjustment = NewAdjustment::from(json.into_inner());
    let charge_now = adjustment.charge_now;

    let span = tracing::Span::current();

    span.record("amount", adjustment.amount);
    span.record("charge_now", charge_now);

    let result = state
        .app
        .bookings
        .apply_adjustment(booking.into_inner().into(), adjustment)
        .await;

    if charge_now {
        record_payment_result("adjustment", &result);
    }

    Ok(envelope::ok(result.map_err(into_api_error)?.into()))
}
