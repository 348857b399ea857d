//! Agreements Data

use prestige::agreements::Acknowledgments;

use crate::domain::agreements::records::{EmergencyContact, LicenseInfo, PersonalInfo};

/// Agreement invitation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendAgreement {
    pub recipients: Vec<String>,

    /// Days until the invitation lapses; 7 when absent.
    pub expiration_days: Option<u32>,

    pub custom_message: Option<String>,
}

/// Customer submission for signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignAgreement {
    pub personal: PersonalInfo,
    pub license: LicenseInfo,
    pub emergency_contact: EmergencyContact,
    pub acknowledgments: Acknowledgments,

    /// Signature image as a base64 `data:image/...` URL.
    pub signature_image: String,

    /// Address the submission came from.
    pub ip_address: Option<String>,
}
