//! Active Agreement Handler

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
pub(crate) struct ActiveAgreementResponse {
    /// Newest agreement that was not superseded, if any
    pub agreement: Option<AgreementResponse>,
}

/// Active Agreement Handler
#[endpoint(
    tags("agreements"),
    summary = "Get Active Agreement",
    security(("bearer_auth" = [])),
)]
pub(crate) async fn handler(
    booking: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<Envelope<ActiveAgreementResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let agreement = state
        .app
        .agreements
        .get_active_agreement(booking.into_inner().into())
        .await
        .map_err(into_api_error)?;

    Ok(envelope::ok(ActiveAgreementResponse {
        agreement: agreement.map(Into::into),
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use prestige_app::domain::{
        agreements::{MockAgreementsService, records::AgreementUuid},
        bookings::records::BookingUuid,
    };

    use crate::test_helpers::{agreements_service, make_agreement};

    use super::*;

    fn make_service(agreements: MockAgreementsService) -> Service {
        agreements_service(
            agreements,
            Router::with_path("bookings/{booking}/agreements/active").get(handler),
        )
    }

    #[tokio::test]
    async fn test_active_returns_newest_agreement() -> TestResult {
        let booking = BookingUuid::new();
        let agreement = AgreementUuid::new();

        let mut agreements = MockAgreementsService::new();

        agreements
            .expect_get_active_agreement()
            .once()
            .withf(move |b| *b == booking)
            .return_once(move |_| Ok(Some(make_agreement(agreement, booking))));

        let mut res =
            TestClient::get(format!("http://example.com/bookings/{booking}/agreements/active"))
                .send(&make_service(agreements))
                .await;

        let body: Envelope<ActiveAgreementResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(
            body.data.agreement.map(|active| active.uuid),
            Some(agreement.into_uuid())
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_active_without_agreement_returns_null() -> TestResult {
        let booking = BookingUuid::new();

        let mut agreements = MockAgreementsService::new();

        agreements
            .expect_get_active_agreement()
            .once()
            .return_once(|_| Ok(None));

        let mut res =
            TestClient::get(format!("http://example.com/bookings/{booking}/agreements/active"))
                .send(&make_service(agreements))
                .await;

        let body: Envelope<ActiveAgreementResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.data.agreement.is_none(), "expected no active agreement");

        Ok(())
    }
}
