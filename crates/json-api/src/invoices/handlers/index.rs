//! Invoice Index Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use prestige::invoices::InvoiceStatus;

use crate::{
    envelope::{self, ApiError, Envelope},
    extensions::*,
    invoices::{errors::into_api_error, models::InvoiceResponse},
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct InvoicesResponse {
    /// The list of invoices, newest first
    pub invoices: Vec<InvoiceResponse>,
}

/// Invoice Index Handler
///
/// `status` filters on the status as seen today, so `overdue` includes sent
/// invoices past their due date.
#[endpoint(
    tags("invoices"),
    summary = "List Invoices",
    security(("bearer_auth" = [])),
)]
pub(crate) async fn handler(
    status: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<Envelope<InvoicesResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let status = status
        .into_inner()
        .map(|value| value.parse::<InvoiceStatus>())
        .transpose()
        .map_err(|error| ApiError::bad_request(format!("unknown invoice status: {}", error.0)))?;

    let invoices = state
        .app
        .invoices
        .list_invoices(status)
        .await
        .map_err(into_api_error)?;

    Ok(envelope::ok(InvoicesResponse {
        invoices: invoices.into_iter().map(Into::into).collect(),
    }))
}
