//! State

use std::sync::Arc;

use prestige_app::context::AppContext;

/// Stripe webhook verification settings.
#[derive(Clone)]
pub(crate) struct WebhookSettings {
    pub(crate) secret: Option<String>,
    pub(crate) tolerance_seconds: i64,
}

impl std::fmt::Debug for WebhookSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookSettings")
            .field("secret", &self.secret.as_ref().map(|_secret| "**redacted**"))
            .field("tolerance_seconds", &self.tolerance_seconds)
            .finish()
    }
}

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,
    pub(crate) webhooks: WebhookSettings,
}

impl State {
    #[must_use]
    pub(crate) fn new(app: AppContext, webhooks: WebhookSettings) -> Self {
        Self { app, webhooks }
    }

    #[must_use]
    pub(crate) fn shared(app: AppContext, webhooks: WebhookSettings) -> Arc<Self> {
        Arc::new(Self::new(app, webhooks))
    }
}
