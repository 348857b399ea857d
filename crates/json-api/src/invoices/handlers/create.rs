//! Create Invoice Handler

use std::sync::Arc;

use salvo::{http::header::LOCATION, oapi::extract::JsonBody, prelude::*};

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

/// Create Invoice Handler
///
/// Numbers the invoice and computes its totals. New invoices are drafts.
#[endpoint(
    tags("invoices"),
    summary = "Create Invoice",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Invoice created"),
    ),
)]
#[tracing::instrument(name = "invoices.create", skip_all, err)]
pub(crate) async fn handler(
    json: JsonBody<InvoiceRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<Envelope<InvoiceResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let draft = InvoiceDraft::try_from(json.into_inner())?;

    let invoice = state
        .app
        .invoices
        .create_invoice(draft)
        .await
        .map_err(into_api_error)?;

    res.add_header(LOCATION, format!("/invoices/{}", invoice.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    tracing::info!(invoice_uuid = %invoice.uuid, number = %invoice.number, "created invoice");

    Ok(envelope::ok(invoice.into()))
}
