//! Settings Models

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

use prestige_app::domain::settings::{
    data::NotificationSettingsUpdate, records::NotificationSettings,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct NotificationSettingsResponse {
    /// Addresses that receive admin email
    pub admin_recipients: Vec<String>,

    pub sender_address: Option<String>,
    pub booking_confirmations: bool,
    pub agreement_invitations: bool,
    pub admin_booking_copies: bool,

    /// Absent until the settings are first saved
    pub updated_at: Option<String>,
}

impl From<NotificationSettings> for NotificationSettingsResponse {
    fn from(settings: NotificationSettings) -> Self {
        NotificationSettingsResponse {
            admin_recipients: settings.admin_recipients,
            sender_address: settings.sender_address,
            booking_confirmations: settings.booking_confirmations,
            agreement_invitations: settings.agreement_invitations,
            admin_booking_copies: settings.admin_booking_copies,
            updated_at: settings.updated_at.as_ref().map(ToString::to_string),
        }
    }
}

fn enabled() -> bool {
    true
}

/// Update Notification Settings Request
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct UpdateSettingsRequest {
    pub admin_recipients: Vec<String>,

    #[serde(default)]
    pub sender_address: Option<String>,

    #[serde(default = "enabled")]
    pub booking_confirmations: bool,

    #[serde(default = "enabled")]
    pub agreement_invitations: bool,

    #[serde(default)]
    pub admin_booking_copies: bool,
}

impl From<UpdateSettingsRequest> for NotificationSettingsUpdate {
    fn from(request: UpdateSettingsRequest) -> Self {
        NotificationSettingsUpdate {
            admin_recipients: request.admin_recipients,
            sender_address: request.sender_address,
            booking_confirmations: request.booking_confirmations,
            agreement_invitations: request.agreement_invitations,
            admin_booking_copies: request.admin_booking_copies,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct TestNotificationResponse {
    /// Whether the email provider accepted the message
    pub delivered: bool,
}
