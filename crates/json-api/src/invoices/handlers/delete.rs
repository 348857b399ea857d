//! Delete Invoice Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    envelope::{self, ApiError, Envelope},
    extensions::*,
    invoices::errors::into_api_error,
    state::State,
};

/// Invoice Deleted Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct InvoiceDeletedResponse {
    /// Deleted invoice UUID
    pub uuid: Uuid,
}

/// Delete Invoice Handler
#[endpoint(
    tags("invoices"),
    summary = "Delete Invoice",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(name = "invoices.delete", skip_all, fields(invoice_uuid = %*invoice), err)]
pub(crate) async fn handler(
    invoice: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<Envelope<InvoiceDeletedResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let uuid = invoice.into_inner();

    state
        .app
        .invoices
        .delete_invoice(uuid.into())
        .await
        .map_err(into_api_error)?;

    Ok(envelope::ok(InvoiceDeletedResponse { uuid }))
}
