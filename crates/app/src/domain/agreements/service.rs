//! Agreements service.

use std::sync::Arc;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use jiff::{Timestamp, tz::TimeZone};
use mockall::automock;
use tracing::{info, warn};

use prestige::{
    agreements::{AgreementStatus, expiration_days, expires_at},
    bookings::BookingStatus,
};

use crate::{
    domain::{
        agreements::{
            data::{SendAgreement, SignAgreement},
            errors::AgreementsServiceError,
            records::{AgreementRecord, AgreementSubmission, AgreementUuid, PersonalInfo, SignatureRecord},
            repository::AgreementsRepository,
        },
        bookings::{records::BookingUuid, repository::BookingsRepository},
        settings::repository::SettingsRepository,
        validation,
    },
    notifications::{Notifier, templates},
    store::KvStore,
};

#[derive(Clone)]
pub struct KvAgreementsService {
    repository: AgreementsRepository,
    bookings: BookingsRepository,
    settings: SettingsRepository,
    notifier: Arc<dyn Notifier>,
}

impl KvAgreementsService {
    #[must_use]
    pub fn new(store: Arc<dyn KvStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repository: AgreementsRepository::new(Arc::clone(&store)),
            bookings: BookingsRepository::new(Arc::clone(&store)),
            settings: SettingsRepository::new(store),
            notifier,
        }
    }

    async fn send_invitation(&self, agreement: &AgreementRecord) -> bool {
        let settings = match self.settings.notification_settings().await {
            Ok(settings) => settings,
            Err(source) => {
                warn!(error = %source, "could not load notification settings; invitation not sent");
                return false;
            }
        };

        if !settings.agreement_invitations {
            info!("agreement invitations are disabled");
            return false;
        }

        let message = templates::agreement_invitation(agreement, settings.sender_address);

        self.notifier.send(message).await
    }
}

fn validate_recipients(recipients: &[String]) -> Result<Vec<String>, String> {
    if recipients.is_empty() {
        return Err("at least one recipient is required".to_string());
    }

    let mut validated: Vec<String> = Vec::with_capacity(recipients.len());

    for recipient in recipients {
        let recipient = validation::email("recipient", recipient)?;

        if !validated.contains(&recipient) {
            validated.push(recipient);
        }
    }

    Ok(validated)
}

fn validate_personal(personal: &PersonalInfo) -> Result<PersonalInfo, String> {
    Ok(PersonalInfo {
        first_name: validation::required("first name", &personal.first_name)?,
        last_name: validation::required("last name", &personal.last_name)?,
        email: validation::email("email", &personal.email)?,
        phone: validation::required("phone", &personal.phone)?,
        address: validation::required("address", &personal.address)?,
        date_of_birth: personal.date_of_birth,
    })
}

/// Accepts `data:image/<type>;base64,<payload>` with a decodable payload.
fn validate_signature_image(image: &str) -> Result<(), String> {
    let Some((header, payload)) = image.trim().split_once(',') else {
        return Err("signature must be a data URL".to_string());
    };

    if !header.starts_with("data:image/") || !header.ends_with(";base64") {
        return Err("signature must be a base64 image data URL".to_string());
    }

    match STANDARD.decode(payload) {
        Ok(bytes) if !bytes.is_empty() => Ok(()),
        Ok(_empty) => Err("signature image is empty".to_string()),
        Err(_invalid) => Err("signature image is not valid base64".to_string()),
    }
}

fn validate_submission(
    submission: SignAgreement,
    signed_at: Timestamp,
) -> Result<AgreementSubmission, String> {
    if !submission.acknowledgments.all_accepted() {
        return Err("every term must be acknowledged before signing".to_string());
    }

    validate_signature_image(&submission.signature_image)?;

    let personal = validate_personal(&submission.personal)?;

    let mut license = submission.license;
    license.number = validation::required("license number", &license.number)?;
    license.issuing_state = validation::required("license issuing state", &license.issuing_state)?;

    let today = signed_at.to_zoned(TimeZone::UTC).date();

    if license.expiration_date < today {
        return Err(format!("driver's license expired on {}", license.expiration_date));
    }

    let mut emergency_contact = submission.emergency_contact;
    emergency_contact.name = validation::required("emergency contact name", &emergency_contact.name)?;
    emergency_contact.phone = validation::required("emergency contact phone", &emergency_contact.phone)?;

    Ok(AgreementSubmission {
        personal,
        license,
        emergency_contact,
        acknowledgments: submission.acknowledgments,
        signature: SignatureRecord {
            image_data_url: submission.signature_image.trim().to_string(),
            signed_at,
            ip_address: submission.ip_address,
        },
    })
}

#[async_trait]
impl AgreementsService for KvAgreementsService {
    #[tracing::instrument(
        name = "agreements.service.send_agreement",
        skip(self, request),
        fields(booking_uuid = %booking),
        err
    )]
    async fn send_agreement(
        &self,
        booking: BookingUuid,
        request: SendAgreement,
    ) -> Result<AgreementRecord, AgreementsServiceError> {
        let recipients =
            validate_recipients(&request.recipients).map_err(AgreementsServiceError::Validation)?;
        let days = expiration_days(request.expiration_days)?;

        let Some(booking) = self.bookings.get_booking(booking).await? else {
            return Err(AgreementsServiceError::BookingNotFound);
        };

        if booking.status == BookingStatus::Cancelled {
            return Err(AgreementsServiceError::PreconditionFailed(
                "agreements cannot be sent for a cancelled booking".to_string(),
            ));
        }

        let now = Timestamp::now();

        for mut prior in self.repository.list_booking_agreements(booking.uuid).await? {
            if prior.status == AgreementStatus::Pending {
                prior.status = AgreementStatus::Superseded;
                prior.updated_at = now;

                self.repository.save_agreement(&prior).await?;

                info!(agreement_uuid = %prior.uuid, "superseded agreement");
            }
        }

        let custom_message = request
            .custom_message
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty());

        let mut agreement = AgreementRecord::from_booking(
            &booking,
            recipients,
            custom_message,
            now,
            expires_at(now, days)?,
        );

        self.repository.create_agreement(&agreement).await?;

        agreement.email_sent = self.send_invitation(&agreement).await;

        if agreement.email_sent {
            self.repository.save_agreement(&agreement).await?;
        } else {
            warn!(agreement_uuid = %agreement.uuid, "agreement invitation was not delivered");
        }

        info!(
            agreement_uuid = %agreement.uuid,
            expires_at = %agreement.expires_at,
            "sent agreement"
        );

        Ok(agreement)
    }

    async fn get_active_agreement(
        &self,
        booking: BookingUuid,
    ) -> Result<Option<AgreementRecord>, AgreementsServiceError> {
        let now = Timestamp::now();

        Ok(self
            .repository
            .list_booking_agreements(booking)
            .await?
            .into_iter()
            .find(|agreement| agreement.status != AgreementStatus::Superseded)
            .map(|agreement| agreement.at(now)))
    }

    async fn get_agreement(
        &self,
        agreement: AgreementUuid,
    ) -> Result<AgreementRecord, AgreementsServiceError> {
        self.repository
            .get_agreement(agreement)
            .await?
            .map(|agreement| agreement.at(Timestamp::now()))
            .ok_or(AgreementsServiceError::NotFound)
    }

    async fn list_booking_agreements(
        &self,
        booking: BookingUuid,
    ) -> Result<Vec<AgreementRecord>, AgreementsServiceError> {
        let now = Timestamp::now();

        Ok(self
            .repository
            .list_booking_agreements(booking)
            .await?
            .into_iter()
            .map(|agreement| agreement.at(now))
            .collect())
    }

    #[tracing::instrument(
        name = "agreements.service.sign_agreement",
        skip(self, submission),
        fields(agreement_uuid = %agreement),
        err
    )]
    async fn sign_agreement(
        &self,
        agreement: AgreementUuid,
        submission: SignAgreement,
    ) -> Result<AgreementRecord, AgreementsServiceError> {
        let Some(mut record) = self.repository.get_agreement(agreement).await? else {
            return Err(AgreementsServiceError::NotFound);
        };

        let now = Timestamp::now();
        let status = record.effective_status(now);

        if status != AgreementStatus::Pending {
            return Err(AgreementsServiceError::PreconditionFailed(format!(
                "agreement is {status} and can no longer be signed"
            )));
        }

        let submission =
            validate_submission(submission, now).map_err(AgreementsServiceError::Validation)?;

        record.status = AgreementStatus::Completed;
        record.completed_at = Some(now);
        record.submission = Some(submission);
        record.updated_at = now;

        self.repository.save_agreement(&record).await?;

        info!(booking_uuid = %record.booking_uuid, "agreement signed");

        Ok(record)
    }
}

#[automock]
#[async_trait]
pub trait AgreementsService: Send + Sync {
    /// Snapshot a booking into a new agreement, superseding pending ones.
    async fn send_agreement(
        &self,
        booking: BookingUuid,
        request: SendAgreement,
    ) -> Result<AgreementRecord, AgreementsServiceError>;

    /// The newest agreement for a booking that was not superseded.
    async fn get_active_agreement(
        &self,
        booking: BookingUuid,
    ) -> Result<Option<AgreementRecord>, AgreementsServiceError>;

    /// Retrieve a single agreement.
    async fn get_agreement(
        &self,
        agreement: AgreementUuid,
    ) -> Result<AgreementRecord, AgreementsServiceError>;

    /// Every agreement sent for a booking, newest first.
    async fn list_booking_agreements(
        &self,
        booking: BookingUuid,
    ) -> Result<Vec<AgreementRecord>, AgreementsServiceError>;

    /// Record the customer's submission and complete the agreement.
    async fn sign_agreement(
        &self,
        agreement: AgreementUuid,
        submission: SignAgreement,
    ) -> Result<AgreementRecord, AgreementsServiceError>;
}
