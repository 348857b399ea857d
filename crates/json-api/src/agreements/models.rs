//! Agreement Models

use std::string::ToString;

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use prestige::agreements::Acknowledgments;
use prestige_app::domain::agreements::records::{
    AgreementRecord, AgreementSubmission, EmergencyContact, LicenseInfo, PersonalInfo,
    RentalSnapshot,
};

use crate::{bookings::models::Customer, envelope::ApiError, extensions::parse_date};

/// Renter's personal details as submitted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct Personal {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,

    /// `YYYY-MM-DD`
    pub date_of_birth: String,
}

impl TryFrom<Personal> for PersonalInfo {
    type Error = ApiError;

    fn try_from(personal: Personal) -> Result<Self, Self::Error> {
        Ok(PersonalInfo {
            date_of_birth: parse_date("date_of_birth", &personal.date_of_birth)?,
            first_name: personal.first_name,
            last_name: personal.last_name,
            email: personal.email,
            phone: personal.phone,
            address: personal.address,
        })
    }
}

impl From<PersonalInfo> for Personal {
    fn from(personal: PersonalInfo) -> Self {
        Personal {
            first_name: personal.first_name,
            last_name: personal.last_name,
            email: personal.email,
            phone: personal.phone,
            address: personal.address,
            date_of_birth: personal.date_of_birth.to_string(),
        }
    }
}

/// Driver's license as submitted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct License {
    pub number: String,
    pub issuing_state: String,

    /// `YYYY-MM-DD`
    pub expiration_date: String,
}

impl TryFrom<License> for LicenseInfo {
    type Error = ApiError;

    fn try_from(license: License) -> Result<Self, Self::Error> {
        Ok(LicenseInfo {
            expiration_date: parse_date("expiration_date", &license.expiration_date)?,
            number: license.number,
            issuing_state: license.issuing_state,
        })
    }
}

impl From<LicenseInfo> for License {
    fn from(license: LicenseInfo) -> Self {
        License {
            number: license.number,
            issuing_state: license.issuing_state,
            expiration_date: license.expiration_date.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct Emergency {
    pub name: String,
    pub phone: String,
    pub relationship: String,
}

impl From<Emergency> for EmergencyContact {
    fn from(contact: Emergency) -> Self {
        EmergencyContact {
            name: contact.name,
            phone: contact.phone,
            relationship: contact.relationship,
        }
    }
}

impl From<EmergencyContact> for Emergency {
    fn from(contact: EmergencyContact) -> Self {
        Emergency {
            name: contact.name,
            phone: contact.phone,
            relationship: contact.relationship,
        }
    }
}

/// Rental terms the renter accepted. All must be `true` to sign.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct Terms {
    #[serde(default)]
    pub terms_and_conditions: bool,
    #[serde(default)]
    pub damage_policy: bool,
    #[serde(default)]
    pub fuel_policy: bool,
    #[serde(default)]
    pub insurance_coverage: bool,
    #[serde(default)]
    pub late_return_policy: bool,
}

impl From<Terms> for Acknowledgments {
    fn from(terms: Terms) -> Self {
        Acknowledgments {
            terms_and_conditions: terms.terms_and_conditions,
            damage_policy: terms.damage_policy,
            fuel_policy: terms.fuel_policy,
            insurance_coverage: terms.insurance_coverage,
            late_return_policy: terms.late_return_policy,
        }
    }
}

impl From<Acknowledgments> for Terms {
    fn from(acknowledgments: Acknowledgments) -> Self {
        Terms {
            terms_and_conditions: acknowledgments.terms_and_conditions,
            damage_policy: acknowledgments.damage_policy,
            fuel_policy: acknowledgments.fuel_policy,
            insurance_coverage: acknowledgments.insurance_coverage,
            late_return_policy: acknowledgments.late_return_policy,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RentalResponse {
    pub car_id: String,

    /// `2024 Lamborghini Huracan EVO`
    pub vehicle: String,

    pub start_date: String,
    pub end_date: String,
    pub total_days: u32,
}

impl From<RentalSnapshot> for RentalResponse {
    fn from(rental: RentalSnapshot) -> Self {
        RentalResponse {
            vehicle: rental.vehicle(),
            car_id: rental.car_id,
            start_date: rental.start_date.to_string(),
            end_date: rental.end_date.to_string(),
            total_days: rental.total_days,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AgreementPricingResponse {
    pub daily_rate: u64,
    pub subtotal: u64,
    pub deposit_amount: u64,
    pub final_amount: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SignatureResponse {
    /// `data:image/...;base64,...`
    pub image: String,
    pub signed_at: String,
    pub ip_address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SubmissionResponse {
    pub personal: Personal,
    pub license: License,
    pub emergency_contact: Emergency,
    pub acknowledgments: Terms,
    pub signature: SignatureResponse,
}

impl From<AgreementSubmission> for SubmissionResponse {
    fn from(submission: AgreementSubmission) -> Self {
        SubmissionResponse {
            personal: submission.personal.into(),
            license: submission.license.into(),
            emergency_contact: submission.emergency_contact.into(),
            acknowledgments: submission.acknowledgments.into(),
            signature: SignatureResponse {
                image: submission.signature.image_data_url,
                signed_at: submission.signature.signed_at.to_string(),
                ip_address: submission.signature.ip_address,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AgreementResponse {
    /// The unique identifier of the agreement
    pub uuid: Uuid,

    pub booking_uuid: Uuid,

    /// `pending`, `completed`, `expired` or `superseded`
    pub status: String,

    pub recipients: Vec<String>,
    pub custom_message: Option<String>,
    pub sent_at: String,
    pub expires_at: String,

    /// Whether the invitation email was accepted for delivery
    pub email_sent: bool,

    pub completed_at: Option<String>,
    pub customer: Customer,
    pub rental: RentalResponse,
    pub pricing: AgreementPricingResponse,
    pub submission: Option<SubmissionResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<AgreementRecord> for AgreementResponse {
    fn from(agreement: AgreementRecord) -> Self {
        AgreementResponse {
            uuid: agreement.uuid.into(),
            booking_uuid: agreement.booking_uuid.into(),
            status: agreement.status.to_string(),
            recipients: agreement.recipients,
            custom_message: agreement.custom_message,
            sent_at: agreement.sent_at.to_string(),
            expires_at: agreement.expires_at.to_string(),
            email_sent: agreement.email_sent,
            completed_at: agreement.completed_at.as_ref().map(ToString::to_string),
            customer: agreement.customer.into(),
            rental: agreement.rental.into(),
            pricing: AgreementPricingResponse {
                daily_rate: agreement.pricing.daily_rate,
                subtotal: agreement.pricing.subtotal,
                deposit_amount: agreement.pricing.deposit_amount,
                final_amount: agreement.pricing.final_amount,
            },
            submission: agreement.submission.map(Into::into),
            created_at: agreement.created_at.to_string(),
            updated_at: agreement.updated_at.to_string(),
        }
    }
}
