//! Update Notification Settings Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    envelope::{self, ApiError, Envelope},
    extensions::*,
    settings::{
        errors::into_api_error,
        models::{NotificationSettingsResponse, UpdateSettingsRequest},
    },
    state::State,
};

/// Update Notification Settings Handler
///
/// Recipients are trimmed and de-duplicated; an invalid address rejects the
/// whole update.
#[endpoint(
    tags("settings"),
    summary = "Update Notification Settings",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(name = "settings.update", skip_all, err)]
pub(crate) async fn handler(
    json: JsonBody<UpdateSettingsRequest>,
    depot: &mut Depot,
) -> Result<Json<Envelope<NotificationSettingsResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let settings = state
        .app
        .settings
        .update_notification_settings(json.into_inner().into())
        .await
        .map_err(into_api_error)?;

    Ok(envelope::ok(settings.into()))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use prestige_app::domain::settings::{MockSettingsService, SettingsServiceError};

    use crate::test_helpers::{make_settings, settings_service};

    use super::*;

    fn make_service(settings: MockSettingsService) -> Service {
        settings_service(
            settings,
            Router::with_path("settings/notifications").put(handler),
        )
    }

    #[tokio::test]
    async fn test_update_applies_request_defaults() -> TestResult {
        let mut saved = make_settings();

        saved.updated_at = Some(Timestamp::UNIX_EPOCH);

        let mut settings = MockSettingsService::new();

        settings
            .expect_update_notification_settings()
            .once()
            .withf(|update| {
                update.admin_recipients == vec!["ops@prestige.example".to_string()]
                    && update.booking_confirmations
                    && update.agreement_invitations
                    && !update.admin_booking_copies
                    && update.sender_address.is_none()
            })
            .return_once(move |_| Ok(saved));

        let mut res = TestClient::put("http://example.com/settings/notifications")
            .json(&json!({ "admin_recipients": ["ops@prestige.example"] }))
            .send(&make_service(settings))
            .await;

        let body: Envelope<NotificationSettingsResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.data.updated_at.is_some(), "updated_at is stamped");

        Ok(())
    }

    #[tokio::test]
    async fn test_update_invalid_recipient_returns_400() -> TestResult {
        let mut settings = MockSettingsService::new();

        settings
            .expect_update_notification_settings()
            .once()
            .return_once(|_| {
                Err(SettingsServiceError::Validation(
                    "invalid recipient email: not-an-email".to_string(),
                ))
            });

        let mut res = TestClient::put("http://example.com/settings/notifications")
            .json(&json!({ "admin_recipients": ["not-an-email"] }))
            .send(&make_service(settings))
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert_eq!(body["error"], "invalid recipient email: not-an-email");

        Ok(())
    }
}
