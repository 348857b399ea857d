//! Send Test Notification Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    envelope::{self, ApiError, Envelope},
    extensions::*,
    settings::{errors::into_api_error, models::TestNotificationResponse},
    state::State,
};

/// Send Test Notification Handler
///
/// Emails the configured admin recipients. A rejected delivery is reported in
/// the body, not as an error status.
#[endpoint(
    tags("settings"),
    summary = "Send Test Notification",
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(name = "settings.test_notification", skip_all, err)]
pub(crate) async fn handler(
    depot: &mut Depot,
) -> Result<Json<Envelope<TestNotificationResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let delivered = state
        .app
        .settings
        .send_test_notification()
        .await
        .map_err(into_api_error)?;

    Ok(envelope::ok(TestNotificationResponse { delivered }))
}
