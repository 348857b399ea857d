//! Settings Data

/// Replacement notification settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettingsUpdate {
    pub admin_recipients: Vec<String>,
    pub sender_address: Option<String>,
    pub booking_confirmations: bool,
    pub agreement_invitations: bool,
    pub admin_booking_copies: bool,
}
