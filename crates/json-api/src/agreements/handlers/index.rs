//! Booking Agreements Index Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    agreements::{errors::into_api_error, models::AgreementResponse},
    envelope::{self, ApiError, Envelope},
    extensions::*,
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AgreementsResponse {
    /// Every agreement sent for the booking, newest first
    pub agreements: Vec<AgreementResponse>,
}

/// Booking Agreements Index Handler
#[endpoint(
    tags("agreements"),
    summary = "List Booking Agreements",
    security(("bearer_auth" = [])),
)]
pub(crate) async fn handler(
    booking: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<Envelope<AgreementsResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let agreements = state
        .app
        .agreements
        .list_booking_agreements(booking.into_inner().into())
        .await
        .map_err(into_api_error)?;

    Ok(envelope::ok(AgreementsResponse {
        agreements: agreements.into_iter().map(Into::into).collect(),
    }))
}
