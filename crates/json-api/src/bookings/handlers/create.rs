//! Create Booking Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use prestige_app::domain::bookings::data::NewBooking;

use crate::{
    bookings::{
        errors::into_api_error,
        models::{BookingResponse, Car, Customer},
    },
    envelope::{self, ApiError, Envelope},
    extensions::*,
    observability::record_payment_result,
    state::State,
};

/// Create Booking Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateBookingRequest {
    pub customer_id: String,

    /// Stripe customer holding the card on file
    pub stripe_customer_id: String,

    /// Card to authorize; the customer's first card when absent
    pub payment_method_id: Option<String>,

    pub car: Car,

    /// `YYYY-MM-DD`
    pub start_date: String,

    /// `YYYY-MM-DD`, after the start date
    pub end_date: String,

    pub customer: Customer,
    pub notes: Option<String>,
}

impl TryFrom<CreateBookingRequest> for NewBooking {
    type Error = ApiError;

    fn try_from(request: CreateBookingRequest) -> Result<Self, Self::Error> {
        Ok(NewBooking {
            start_date: parse_date("start_date", &request.start_date)?,
            end_date: parse_date("end_date", &request.end_date)?,
            customer_id: request.customer_id,
            stripe_customer_id: request.stripe_customer_id,
            payment_method_id: request.payment_method_id,
            car: request.car.into(),
            customer: request.customer.into(),
            notes: request.notes,
        })
    }
}

/// Create Booking Handler
///
/// Prices the rental and places the deposit hold.
#[endpoint(
    tags("bookings"),
    summary = "Create Booking",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Booking created"),
    ),
)]
#[tracing::instrument(
    name = "bookings.create",
    skip(json, depot, res),
    fields(customer_id = tracing::field::Empty, car_id = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateBookingRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<Envelope<BookingResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let new_booking = NewBooking::try_from(json.into_inner())?;

    let span = tracing::Span::current();

    span.record("customer_id", tracing::field::display(&new_booking.customer_id));
    span.record("car_id", tracing::field::display(&new_booking.car.id));

    let result = state.app.bookings.create_booking(new_booking).await;

    record_payment_result("authorize_deposit", &result);

    let booking = result.map_err(into_api_error)?;

    res.add_header(LOCATION, format!("/bookings/{}", booking.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    tracing::info!(booking_uuid = %booking.uuid, "created booking");

    Ok(envelope::ok(booking.into()))
}
