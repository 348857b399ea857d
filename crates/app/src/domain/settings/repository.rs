//! Settings Repository

use std::sync::Arc;

use crate::store::{KvStore, StoreError, get_json, set_json};

use super::records::NotificationSettings;

const NOTIFICATION_SETTINGS_KEY: &str = "settings:notifications";

#[derive(Clone)]
pub(crate) struct SettingsRepository {
    store: Arc<dyn KvStore>,
}

impl SettingsRepository {
    #[must_use]
    pub(crate) fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Stored settings, or the defaults when none were saved yet.
    pub(crate) async fn notification_settings(&self) -> Result<NotificationSettings, StoreError> {
        Ok(get_json(self.store.as_ref(), NOTIFICATION_SETTINGS_KEY)
            .await?
            .unwrap_or_default())
    }

    pub(crate) async fn save_notification_settings(
        &self,
        settings: &NotificationSettings,
    ) -> Result<(), StoreError> {
        set_json(self.store.as_ref(), NOTIFICATION_SETTINGS_KEY, settings).await
    }
}
