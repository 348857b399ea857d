//! Settings service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::info;

use crate::{
    domain::{
        settings::{
            data::NotificationSettingsUpdate, errors::SettingsServiceError,
            records::NotificationSettings, repository::SettingsRepository,
        },
        validation,
    },
    notifications::{Notifier, templates},
    store::KvStore,
};

#[derive(Clone)]
pub struct KvSettingsService {
    repository: SettingsRepository,
    notifier: Arc<dyn Notifier>,
}

impl KvSettingsService {
    #[must_use]
    pub fn new(store: Arc<dyn KvStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repository: SettingsRepository::new(store),
            notifier,
        }
    }
}

fn validate(update: NotificationSettingsUpdate) -> Result<NotificationSettings, String> {
    let mut admin_recipients: Vec<String> = Vec::with_capacity(update.admin_recipients.len());

    for recipient in &update.admin_recipients {
        let recipient = validation::email("admin recipient", recipient)?;

        if !admin_recipients.contains(&recipient) {
            admin_recipients.push(recipient);
        }
    }

    let sender_address = match update.sender_address.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(sender) => Some(validation::email("sender address", sender)?),
    };

    Ok(NotificationSettings {
        admin_recipients,
        sender_address,
        booking_confirmations: update.booking_confirmations,
        agreement_invitations: update.agreement_invitations,
        admin_booking_copies: update.admin_booking_copies,
        updated_at: Some(Timestamp::now()),
    })
}

#[async_trait]
impl SettingsService for KvSettingsService {
    async fn get_notification_settings(&self) -> Result<NotificationSettings, SettingsServiceError> {
        Ok(self.repository.notification_settings().await?)
    }

    async fn update_notification_settings(
        &self,
        update: NotificationSettingsUpdate,
    ) -> Result<NotificationSettings, SettingsServiceError> {
        let settings = validate(update).map_err(SettingsServiceError::Validation)?;

        self.repository.save_notification_settings(&settings).await?;

        info!(
            recipients = settings.admin_recipients.len(),
            "notification settings updated"
        );

        Ok(settings)
    }

    async fn send_test_notification(&self) -> Result<bool, SettingsServiceError> {
        let settings = self.repository.notification_settings().await?;

        if settings.admin_recipients.is_empty() {
            return Err(SettingsServiceError::PreconditionFailed(
                "no admin recipients are configured".to_string(),
            ));
        }

        let message = templates::test_notification(
            settings.admin_recipients,
            settings.sender_address,
            Timestamp::now(),
        );

        Ok(self.notifier.send(message).await)
    }
}

#[automock]
#[async_trait]
pub trait SettingsService: Send + Sync {
    /// Current notification settings, defaults when never saved.
    async fn get_notification_settings(&self) -> Result<NotificationSettings, SettingsServiceError>;

    /// Replace the notification settings.
    async fn update_notification_settings(
        &self,
        update: NotificationSettingsUpdate,
    ) -> Result<NotificationSettings, SettingsServiceError>;

    /// Email the admin recipients a test message. Returns whether it was accepted.
    async fn send_test_notification(&self) -> Result<bool, SettingsServiceError>;
}
