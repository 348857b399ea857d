//! Get Invoice Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    envelope::{self, ApiError, Envelope},
    extensions::*,
    invoices::{errors::into_api_error, models::InvoiceResponse},
    state::State,
};

/// Get Invoice Handler
#[endpoint(
    tags("invoices"),
    summary = "Get Invoice",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    invoice: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<Envelope<InvoiceResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let invoice = state
        .app
        .invoices
        .get_invoice(invoice.into_inner().into())
        .await
        .map_err(into_api_error)?;

    Ok(envelope::ok(invoice.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use prestige_app::domain::invoices::{
        InvoicesServiceError, MockInvoicesService, records::InvoiceUuid,
    };

    use crate::test_helpers::{invoices_service, make_invoice};

    use super::*;

    fn make_service(invoices: MockInvoicesService) -> Service {
        invoices_service(invoices, Router::with_path("invoices/{invoice}").get(handler))
    }

    #[tokio::test]
    async fn test_get_returns_invoice() -> TestResult {
        let uuid = InvoiceUuid::new();

        let mut invoices = MockInvoicesService::new();

        invoices
            .expect_get_invoice()
            .once()
            .withf(move |u| *u == uuid)
            .return_once(move |_| Ok(make_invoice(uuid)));

        let mut res = TestClient::get(format!("http://example.com/invoices/{uuid}"))
            .send(&make_service(invoices))
            .await;

        let body: Envelope<InvoiceResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.data.uuid, uuid.into_uuid());

        Ok(())
    }

    #[tokio::test]
    async fn test_get_missing_invoice_returns_404() -> TestResult {
        let uuid = InvoiceUuid::new();

        let mut invoices = MockInvoicesService::new();

        invoices
            .expect_get_invoice()
            .once()
            .return_once(|_| Err(InvoicesServiceError::NotFound));

        let res = TestClient::get(format!("http://example.com/invoices/{uuid}"))
            .send(&make_service(invoices))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
