//! Settings Records

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Who receives admin email and which messages go out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub admin_recipients: Vec<String>,

    /// Sender address; the notifier's default when absent.
    pub sender_address: Option<String>,

    pub booking_confirmations: bool,
    pub agreement_invitations: bool,
    pub admin_booking_copies: bool,
    pub updated_at: Option<Timestamp>,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            admin_recipients: Vec::new(),
            sender_address: None,
            booking_confirmations: true,
            agreement_invitations: true,
            admin_booking_copies: false,
            updated_at: None,
        }
    }
}
