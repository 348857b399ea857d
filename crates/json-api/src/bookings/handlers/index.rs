//! Booking Index Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use prestige_app::domain::bookings::BookingsServiceError;

use crate::{
    bookings::{errors::into_api_error, models::BookingsResponse},
    envelope::{self, ApiError, Envelope},
    extensions::*,
    state::State,
};

/// Booking Index Handler
///
/// Lists bookings, newest first. Filters are mutually exclusive and checked in
/// order: `payment_intent`, then `from` + `to`, then `customer_id`.
#[endpoint(
    tags("bookings"),
    summary = "List Bookings",
    security(("bearer_auth" = [])),
)]
pub(crate) async fn handler(
    customer_id: QueryParam<String, false>,
    from: QueryParam<String, false>,
    to: QueryParam<String, false>,
    payment_intent: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<Envelope<BookingsResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let bookings = &state.app.bookings;

    if let Some(intent) = payment_intent.into_inner() {
        let found = match bookings.find_by_payment_intent(&intent).await {
            Ok(booking) => vec![booking],
            Err(BookingsServiceError::NotFound) => Vec::new(),
            Err(error) => return Err(into_api_error(error)),
        };

        return Ok(envelope::ok(found.into()));
    }

    let listed = match (from.into_date("from")?, to.into_date("to")?) {
        (Some(from), Some(to)) => bookings.list_bookings_in_range(from, to).await,
        (None, None) => match customer_id.into_inner() {
            Some(customer) => bookings.list_customer_bookings(&customer).await,
            None => bookings.list_bookings().await,
        },
        _ => {
            return Err(ApiError::bad_request(
                "from and to must be given together",
            ));
        }
    }
    .map_err(into_api_error)?;

    Ok(envelope::ok(listed.into()))
}
