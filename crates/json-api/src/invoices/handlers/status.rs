//! Invoice Status Handlers
//!
//! `draft -> sent -> paid`, with `overdue` and `cancelled` on the side.

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    envelope::{self, ApiError, Envelope},
    extensions::*,
    invoices::{errors::into_api_error, models::InvoiceResponse},
    state::State,
};

/// Mark Invoice Sent Handler
#[endpoint(
    tags("invoices"),
    summary = "Mark Invoice Sent",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(name = "invoices.send", skip_all, fields(invoice_uuid = %*invoice), err)]
pub(crate) async fn send(
    invoice: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<Envelope<InvoiceResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let invoice = state
        .app
        .invoices
        .mark_invoice_sent(invoice.into_inner().into())
        .await
        .map_err(into_api_error)?;

    Ok(envelope::ok(invoice.into()))
}

/// Mark Invoice Paid Handler
///
/// Paid invoices are final.
#[endpoint(
    tags("invoices"),
    summary = "Mark Invoice Paid",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(name = "invoices.pay", skip_all, fields(invoice_uuid = %*invoice), err)]
pub(crate) async fn pay(
    invoice: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<Envelope<InvoiceResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let invoice = state
        .app
        .invoices
        .mark_invoice_paid(invoice.into_inner().into())
        .await
        .map_err(into_api_error)?;

    Ok(envelope::ok(invoice.into()))
}

/// Mark Invoice Overdue Handler
#[endpoint(
    tags("invoices"),
    summary = "Mark Invoice Overdue",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(name = "invoices.overdue", skip_all, fields(invoice_uuid = %*invoice), err)]
pub(crate) async fn overdue(
    invoice: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<Envelope<InvoiceResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let invoice = state
        .app
        .invoices
        .mark_invoice_overdue(invoice.into_inner().into())
        .await
        .map_err(into_api_error)?;

    Ok(envelope::ok(invoice.into()))
}

/// Cancel Invoice Handler
#[endpoint(
    tags("invoices"),
    summary = "Cancel Invoice",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(name = "invoices.cancel", skip_all, fields(invoice_uuid = %*invoice), err)]
pub(crate) async fn cancel(
    invoice: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<Envelope<InvoiceResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let invoice = state
        .app
        .invoices
        .cancel_invoice(invoice.into_inner().into())
        .await
        .map_err(into_api_error)?;

    Ok(envelope::ok(invoice.into()))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use prestige::invoices::InvoiceStatus;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::Value;
    use testresult::TestResult;

    use prestige_app::domain::invoices::{
        InvoicesServiceError, MockInvoicesService, records::InvoiceUuid,
    };

    use crate::test_helpers::{invoices_service, make_invoice};

    use super::*;

    fn make_service(invoices: MockInvoicesService) -> Service {
        invoices_service(
            invoices,
            Router::with_path("invoices/{invoice}")
                .push(Router::with_path("send").post(send))
                .push(Router::with_path("pay").post(pay))
                .push(Router::with_path("overdue").post(overdue))
                .push(Router::with_path("cancel").post(cancel)),
        )
    }

    #[tokio::test]
    async fn test_send_marks_invoice_sent() -> TestResult {
        let uuid = InvoiceUuid::new();

        let mut sent = make_invoice(uuid);

        sent.status = InvoiceStatus::Sent;
        sent.sent_at = Some(Timestamp::UNIX_EPOCH);

        let mut invoices = MockInvoicesService::new();

        invoices
            .expect_mark_invoice_sent()
            .once()
            .withf(move |u| *u == uuid)
            .return_once(move |_| Ok(sent));

        let mut res = TestClient::post(format!("http://example.com/invoices/{uuid}/send"))
            .send(&make_service(invoices))
            .await;

        let body: Envelope<InvoiceResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.data.status, "sent");
        assert!(body.data.sent_at.is_some(), "sent_at is stamped");

        Ok(())
    }

    #[tokio::test]
    async fn test_pay_cancelled_invoice_returns_409() -> TestResult {
        let uuid = InvoiceUuid::new();

        let mut invoices = MockInvoicesService::new();

        invoices
            .expect_mark_invoice_paid()
            .once()
            .withf(move |u| *u == uuid)
            .return_once(|_| {
                Err(InvoicesServiceError::PreconditionFailed(
                    "cancelled invoices cannot be paid".to_string(),
                ))
            });

        let mut res = TestClient::post(format!("http://example.com/invoices/{uuid}/pay"))
            .send(&make_service(invoices))
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));
        assert_eq!(body["error"], "cancelled invoices cannot be paid");

        Ok(())
    }

    #[tokio::test]
    async fn test_overdue_marks_invoice_overdue() -> TestResult {
        let uuid = InvoiceUuid::new();

        let mut flagged = make_invoice(uuid);

        flagged.status = InvoiceStatus::Overdue;

        let mut invoices = MockInvoicesService::new();

        invoices
            .expect_mark_invoice_overdue()
            .once()
            .return_once(move |_| Ok(flagged));

        let mut res = TestClient::post(format!("http://example.com/invoices/{uuid}/overdue"))
            .send(&make_service(invoices))
            .await;

        let body: Envelope<InvoiceResponse> = res.take_json().await?;

        assert_eq!(body.data.status, "overdue");

        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_missing_invoice_returns_404() -> TestResult {
        let uuid = InvoiceUuid::new();

        let mut invoices = MockInvoicesService::new();

        invoices
            .expect_cancel_invoice()
            .once()
            .return_once(|_| Err(InvoicesServiceError::NotFound));

        let res = TestClient::post(format!("http://example.com/invoices/{uuid}/cancel"))
            .send(&make_service(invoices))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
