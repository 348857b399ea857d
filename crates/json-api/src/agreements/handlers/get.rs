//! Get Agreement Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    agreements::{errors::into_api_error, models::AgreementResponse},
    envelope::{self, ApiError, Envelope},
    extensions::*,
    state::State,
};

/// Get Agreement Handler
///
/// Pending agreements past their deadline read as `expired`.
#[endpoint(
    tags("agreements"),
    summary = "Get Agreement",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    agreement: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<Envelope<AgreementResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let agreement = state
        .app
        .agreements
        .get_agreement(agreement.into_inner().into())
        .await
        .map_err(into_api_error)?;

    Ok(envelope::ok(agreement.into()))
}
