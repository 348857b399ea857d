//! Agreements Repository
//!
//! Keys:
//! - `agreement:{uuid}`: the full record
//! - `agreements:booking:{booking_uuid}`: agreements sent for a booking

use std::sync::Arc;

use tracing::warn;

use crate::{
    domain::{
        agreements::records::{AgreementRecord, AgreementUuid},
        bookings::records::BookingUuid,
    },
    store::{KvStore, StoreError, get_json, set_json},
};

fn agreement_key(agreement: AgreementUuid) -> String {
    agreement.store_key()
}

fn booking_agreements_key(booking: BookingUuid) -> String {
    format!("agreements:booking:{booking}")
}

#[derive(Clone)]
pub(crate) struct AgreementsRepository {
    store: Arc<dyn KvStore>,
}

impl AgreementsRepository {
    #[must_use]
    pub(crate) fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub(crate) async fn get_agreement(
        &self,
        agreement: AgreementUuid,
    ) -> Result<Option<AgreementRecord>, StoreError> {
        get_json(self.store.as_ref(), &agreement_key(agreement)).await
    }

    pub(crate) async fn create_agreement(&self, agreement: &AgreementRecord) -> Result<(), StoreError> {
        self.save_agreement(agreement).await?;

        self.store
            .set_add(
                &booking_agreements_key(agreement.booking_uuid),
                &agreement.uuid.to_string(),
            )
            .await
    }

    pub(crate) async fn save_agreement(&self, agreement: &AgreementRecord) -> Result<(), StoreError> {
        set_json(self.store.as_ref(), &agreement_key(agreement.uuid), agreement).await
    }

    /// A booking's agreements as stored, newest first.
    pub(crate) async fn list_booking_agreements(
        &self,
        booking: BookingUuid,
    ) -> Result<Vec<AgreementRecord>, StoreError> {
        let set_key = booking_agreements_key(booking);
        let members = self.store.set_members(&set_key).await?;
        let mut agreements = Vec::with_capacity(members.len());

        for member in members {
            let Ok(uuid) = member.parse::<AgreementUuid>() else {
                warn!(set_key, %member, "skipping malformed agreement index entry");
                continue;
            };

            if let Some(agreement) = self.get_agreement(uuid).await? {
                agreements.push(agreement);
            }
        }

        agreements.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.uuid.cmp(&a.uuid)));

        Ok(agreements)
    }
}
