//! Update Invoice Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use uuid::Uuid;

use prestige_app::domain::invoices::data::InvoiceDraft;

use crate::{
    envelope::{self, ApiError, Envelope},
    extensions::*,
    invoices::{
        errors::into_api_error,
        models::{InvoiceRequest, InvoiceResponse},
    },
    state::State,
};

/// Update Invoice Handler
///
/// Replaces the invoice contents and recomputes totals. Paid invoices are
/// locked.
#[endpoint(
    tags("invoices"),
    summary = "Update Invoice",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(name = "invoices.update", skip_all, fields(invoice_uuid = %*invoice), err)]
pub(crate) async fn handler(
    invoice: PathParam<Uuid>,
    json: JsonBody<InvoiceRequest>,
    depot: &mut Depot,
) -> Result<Json<Envelope<InvoiceResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let draft = InvoiceDraft::try_from(json.into_inner())?;

    let invoice = state
        .app
        .invoices
        .update_invoice(invoice.into_inner().into(), draft)
        .await
        .map_err(into_api_error)?;

    tracing::info!(total_amount = invoice.total_amount, "updated invoice");

    Ok(envelope::ok(invoice.into()))
}
