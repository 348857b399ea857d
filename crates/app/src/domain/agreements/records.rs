//! Agreement Records

use jiff::{Timestamp, civil::Date};
use serde::{Deserialize, Serialize};

use prestige::agreements::{Acknowledgments, AgreementStatus};

use crate::{
    domain::bookings::records::{BookingPricing, BookingRecord, BookingUuid, CustomerDetails},
    uuids::{KeyPrefix, TypedUuid},
};

/// Agreement UUID
pub type AgreementUuid = TypedUuid<AgreementRecord>;

/// Vehicle and dates as they stood when the agreement was sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalSnapshot {
    pub car_id: String,
    pub brand: String,
    pub model: String,
    pub year: u16,
    pub start_date: Date,
    pub end_date: Date,
    pub total_days: u32,
}

impl RentalSnapshot {
    #[must_use]
    pub fn vehicle(&self) -> String {
        format!("{} {} {}", self.year, self.brand, self.model)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub date_of_birth: Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseInfo {
    pub number: String,
    pub issuing_state: String,
    pub expiration_date: Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
    pub relationship: String,
}

/// Digital signature captured on signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    /// `data:image/...;base64,...`
    pub image_data_url: String,
    pub signed_at: Timestamp,
    pub ip_address: Option<String>,
}

/// What the customer filled in when signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementSubmission {
    pub personal: PersonalInfo,
    pub license: LicenseInfo,
    pub emergency_contact: EmergencyContact,
    pub acknowledgments: Acknowledgments,
    pub signature: SignatureRecord,
}

/// Agreement Record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementRecord {
    pub uuid: AgreementUuid,
    pub booking_uuid: BookingUuid,

    /// Stored status; never `expired`, see [`AgreementRecord::effective_status`].
    pub status: AgreementStatus,

    pub recipients: Vec<String>,
    pub custom_message: Option<String>,
    pub sent_at: Timestamp,
    pub expires_at: Timestamp,
    pub email_sent: bool,
    pub completed_at: Option<Timestamp>,
    pub customer: CustomerDetails,
    pub rental: RentalSnapshot,
    pub pricing: BookingPricing,
    pub submission: Option<AgreementSubmission>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl KeyPrefix for AgreementRecord {
    const KEY_PREFIX: &'static str = "agreement";
}

impl AgreementRecord {
    /// Snapshot `booking` into a new pending agreement.
    #[must_use]
    pub fn from_booking(
        booking: &BookingRecord,
        recipients: Vec<String>,
        custom_message: Option<String>,
        sent_at: Timestamp,
        expires_at: Timestamp,
    ) -> Self {
        Self {
            uuid: AgreementUuid::new(),
            booking_uuid: booking.uuid,
            status: AgreementStatus::Pending,
            recipients,
            custom_message,
            sent_at,
            expires_at,
            email_sent: false,
            completed_at: None,
            customer: booking.customer.clone(),
            rental: RentalSnapshot {
                car_id: booking.car.id.clone(),
                brand: booking.car.brand.clone(),
                model: booking.car.model.clone(),
                year: booking.car.year,
                start_date: booking.start_date,
                end_date: booking.end_date,
                total_days: booking.pricing.total_days,
            },
            pricing: booking.pricing,
            submission: None,
            created_at: sent_at,
            updated_at: sent_at,
        }
    }

    /// Status as seen at `now`, with expiry applied.
    #[must_use]
    pub fn effective_status(&self, now: Timestamp) -> AgreementStatus {
        self.status.effective(self.expires_at, now)
    }

    /// Copy with the stored status replaced by the effective one.
    #[must_use]
    pub fn at(mut self, now: Timestamp) -> Self {
        self.status = self.effective_status(now);
        self
    }
}
