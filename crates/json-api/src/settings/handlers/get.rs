//! Get Notification Settings Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    envelope::{self, ApiError, Envelope},
    extensions::*,
    settings::{errors::into_api_error, models::NotificationSettingsResponse},
    state::State,
};

/// Get Notification Settings Handler
#[endpoint(
    tags("settings"),
    summary = "Get Notification Settings",
    security(("bearer_auth" = [])),
)]
pub(crate) async fn handler(
    depot: &mut Depot,
) -> Result<Json<Envelope<NotificationSettingsResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let settings = state
        .app
        .settings
        .get_notification_settings()
        .await
        .map_err(into_api_error)?;

    Ok(envelope::ok(settings.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use prestige_app::domain::settings::{
        MockSettingsService, records::NotificationSettings,
    };

    use crate::test_helpers::{make_settings, settings_service};

    use super::*;

    fn make_service(settings: MockSettingsService) -> Service {
        settings_service(
            settings,
            Router::with_path("settings/notifications").get(handler),
        )
    }

    #[tokio::test]
    async fn test_get_saved_settings() -> TestResult {
        let mut settings = MockSettingsService::new();

        settings
            .expect_get_notification_settings()
            .once()
            .return_once(|| Ok(make_settings()));

        let mut res = TestClient::get("http://example.com/settings/notifications")
            .send(&make_service(settings))
            .await;

        let body: Envelope<NotificationSettingsResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.data.admin_recipients, vec!["ops@prestige.example".to_string()]);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_defaults_when_never_saved() -> TestResult {
        let mut settings = MockSettingsService::new();

        settings
            .expect_get_notification_settings()
            .once()
            .return_once(|| Ok(NotificationSettings::default()));

        let mut res = TestClient::get("http://example.com/settings/notifications")
            .send(&make_service(settings))
            .await;

        let body: Envelope<NotificationSettingsResponse> = res.take_json().await?;

        assert!(body.data.admin_recipients.is_empty());
        assert!(body.data.booking_confirmations);
        assert!(!body.data.admin_booking_copies);
        assert_eq!(body.data.updated_at, None);

        Ok(())
    }
}
