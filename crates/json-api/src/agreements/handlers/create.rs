//! Send Agreement Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use prestige_app::domain::agreements::data::SendAgreement;

use crate::{
    agreements::{errors::into_api_error, models::AgreementResponse},
    envelope::{self, ApiError, Envelope},
    extensions::*,
    state::State,
};

/// Send Agreement Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SendAgreementRequest {
    /// Email addresses to invite
    pub recipients: Vec<String>,

    /// Signing window in days, 1 to 30; 7 when absent
    pub expiration_days: Option<u32>,

    pub custom_message: Option<String>,
}

impl From<SendAgreementRequest> for SendAgreement {
    fn from(request: SendAgreementRequest) -> Self {
        SendAgreement {
            recipients: request.recipients,
            expiration_days: request.expiration_days,
            custom_message: request.custom_message,
        }
    }
}

/// Send Agreement Handler
///
/// Snapshots the booking into a new agreement and emails the invitation.
/// Earlier pending agreements for the booking are superseded.
#[endpoint(
    tags("agreements"),
    summary = "Send Agreement",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Agreement sent"),
    ),
)]
#[tracing::instrument(name = "agreements.send", skip_all, fields(booking_uuid = %*booking), err)]
pub(crate) async fn handler(
    booking: PathParam<Uuid>,
    json: JsonBody<SendAgreementRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<Envelope<AgreementResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let agreement = state
        .app
        .agreements
        .send_agreement(booking.into_inner().into(), json.into_inner().into())
        .await
        .map_err(into_api_error)?;

    res.add_header(LOCATION, format!("/agreements/{}", agreement.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    tracing::info!(
        agreement_uuid = %agreement.uuid,
        email_sent = agreement.email_sent,
        "sent agreement"
    );

    Ok(envelope::ok(agreement.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use prestige_app::domain::{
        agreements::{AgreementsServiceError, MockAgreementsService, records::AgreementUuid},
        bookings::records::BookingUuid,
    };

    use crate::test_helpers::{agreements_service, make_agreement};

    use super::*;

    fn make_service(agreements: MockAgreementsService) -> Service {
        agreements_service(
            agreements,
            Router::with_path("bookings/{booking}/agreements").post(handler),
        )
    }

    #[tokio::test]
    async fn test_send_agreement_success() -> TestResult {
        let booking = BookingUuid::new();
        let agreement = AgreementUuid::new();

        let mut agreements = MockAgreementsService::new();

        agreements
            .expect_send_agreement()
            .once()
            .withf(move |b, request| {
                *b == booking
                    && *request
                        == SendAgreement {
                            recipients: vec!["ada@example.com".to_string()],
                            expiration_days: Some(3),
                            custom_message: Some("See you soon".to_string()),
                        }
            })
            .return_once(move |_, _| Ok(make_agreement(agreement, booking)));

        let mut res = TestClient::post(format!("http://example.com/bookings/{booking}/agreements"))
            .json(&json!({
                "recipients": ["ada@example.com"],
                "expiration_days": 3,
                "custom_message": "See you soon"
            }))
            .send(&make_service(agreements))
            .await;

        let body: Envelope<AgreementResponse> = res.take_json().await?;
        let location = res.headers().get("location").and_then(|v| v.to_str().ok());

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(location, Some(format!("/agreements/{agreement}").as_str()));
        assert_eq!(body.data.status, "pending");
        assert_eq!(body.data.rental.vehicle, "2024 Lamborghini Huracan EVO");

        Ok(())
    }

    #[tokio::test]
    async fn test_send_agreement_invalid_recipient_returns_400() -> TestResult {
        let booking = BookingUuid::new();

        let mut agreements = MockAgreementsService::new();

        agreements
            .expect_send_agreement()
            .once()
            .return_once(|_, _| {
                Err(AgreementsServiceError::Validation(
                    "invalid recipient email: ada@".to_string(),
                ))
            });

        let mut res = TestClient::post(format!("http://example.com/bookings/{booking}/agreements"))
            .json(&json!({ "recipients": ["ada@"] }))
            .send(&make_service(agreements))
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert_eq!(body["error"], "invalid recipient email: ada@");

        Ok(())
    }
}
