//! Bookings Repository
//!
//! Keys:
//! - `booking:{uuid}`: the full record
//! - `bookings:all`: every booking uuid
//! - `bookings:customer:{customer_id}`: bookings per customer
//! - `booking:intent:{payment_intent_id}`: owning booking uuid

use std::sync::Arc;

use tracing::warn;

use crate::{
    domain::bookings::records::{BookingRecord, BookingUuid},
    store::{KvStore, StoreError, get_json, set_json},
};

const ALL_BOOKINGS_KEY: &str = "bookings:all";

fn booking_key(booking: BookingUuid) -> String {
    booking.store_key()
}

fn customer_key(customer_id: &str) -> String {
    format!("bookings:customer:{customer_id}")
}

fn intent_key(intent_id: &str) -> String {
    format!("booking:intent:{intent_id}")
}

#[derive(Clone)]
pub(crate) struct BookingsRepository {
    store: Arc<dyn KvStore>,
}

impl BookingsRepository {
    #[must_use]
    pub(crate) fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub(crate) async fn get_booking(
        &self,
        booking: BookingUuid,
    ) -> Result<Option<BookingRecord>, StoreError> {
        get_json(self.store.as_ref(), &booking_key(booking)).await
    }

    /// Store a new booking and its indexes.
    pub(crate) async fn create_booking(&self, booking: &BookingRecord) -> Result<(), StoreError> {
        let uuid = booking.uuid.to_string();

        self.save_booking(booking).await?;
        self.store.set_add(ALL_BOOKINGS_KEY, &uuid).await?;
        self.store
            .set_add(&customer_key(&booking.customer_id), &uuid)
            .await?;

        if let Some(intent) = &booking.payment.deposit_intent_id {
            self.index_payment_intent(intent, booking.uuid).await?;
        }

        Ok(())
    }

    /// Overwrite the full record.
    pub(crate) async fn save_booking(&self, booking: &BookingRecord) -> Result<(), StoreError> {
        set_json(self.store.as_ref(), &booking_key(booking.uuid), booking).await
    }

    pub(crate) async fn index_payment_intent(
        &self,
        intent_id: &str,
        booking: BookingUuid,
    ) -> Result<(), StoreError> {
        set_json(self.store.as_ref(), &intent_key(intent_id), &booking).await
    }

    pub(crate) async fn find_by_payment_intent(
        &self,
        intent_id: &str,
    ) -> Result<Option<BookingRecord>, StoreError> {
        let Some(booking) =
            get_json::<BookingUuid>(self.store.as_ref(), &intent_key(intent_id)).await?
        else {
            return Ok(None);
        };

        self.get_booking(booking).await
    }

    /// Every booking, newest first.
    pub(crate) async fn list_bookings(&self) -> Result<Vec<BookingRecord>, StoreError> {
        self.load_set(ALL_BOOKINGS_KEY).await
    }

    /// A customer's bookings, newest first.
    pub(crate) async fn list_customer_bookings(
        &self,
        customer_id: &str,
    ) -> Result<Vec<BookingRecord>, StoreError> {
        self.load_set(&customer_key(customer_id)).await
    }

    /// Remove the record and every index entry pointing at it.
    pub(crate) async fn delete_booking(&self, booking: &BookingRecord) -> Result<bool, StoreError> {
        let uuid = booking.uuid.to_string();

        let intents = booking
            .payment
            .deposit_intent_id
            .iter()
            .chain(booking.payment.final_intent_id.iter())
            .chain(
                booking
                    .payment
                    .adjustments
                    .iter()
                    .filter_map(|adjustment| adjustment.payment_intent_id.as_ref()),
            );

        for intent in intents {
            self.store.delete(&intent_key(intent)).await?;
        }

        self.store
            .set_remove(&customer_key(&booking.customer_id), &uuid)
            .await?;
        self.store.set_remove(ALL_BOOKINGS_KEY, &uuid).await?;

        self.store.delete(&booking_key(booking.uuid)).await
    }

    async fn load_set(&self, set_key: &str) -> Result<Vec<BookingRecord>, StoreError> {
        let members = self.store.set_members(set_key).await?;
        let mut bookings = Vec::with_capacity(members.len());

        for member in members {
            let Ok(uuid) = member.parse::<BookingUuid>() else {
                warn!(set_key, %member, "skipping malformed booking index entry");
                continue;
            };

            // Index entries can outlive a record removed by another session.
            if let Some(booking) = self.get_booking(uuid).await? {
                bookings.push(booking);
            }
        }

        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.uuid.cmp(&a.uuid)));

        Ok(bookings)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{store::MemoryKvStore, test::fixtures};

    use super::*;

    fn repository() -> BookingsRepository {
        BookingsRepository::new(Arc::new(MemoryKvStore::new()))
    }

    #[tokio::test]
    async fn created_booking_is_indexed_by_customer_and_intent() -> TestResult {
        let repository = repository();
        let booking = fixtures::booking()?;

        repository.create_booking(&booking).await?;

        let by_customer = repository
            .list_customer_bookings(&booking.customer_id)
            .await?;
        let by_intent = repository.find_by_payment_intent("pi_deposit").await?;

        assert_eq!(by_customer, vec![booking.clone()]);
        assert_eq!(by_intent, Some(booking));

        Ok(())
    }

    #[tokio::test]
    async fn delete_removes_record_and_indexes() -> TestResult {
        let repository = repository();
        let booking = fixtures::booking()?;

        repository.create_booking(&booking).await?;

        assert!(repository.delete_booking(&booking).await?);
        assert!(repository.get_booking(booking.uuid).await?.is_none());
        assert!(repository.list_bookings().await?.is_empty());
        assert!(repository.find_by_payment_intent("pi_deposit").await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn list_is_newest_first() -> TestResult {
        let repository = repository();
        let older = fixtures::booking()?;
        let newer = BookingRecord {
            uuid: BookingUuid::new(),
            created_at: older.created_at.checked_add(jiff::SignedDuration::from_secs(60))?,
            ..older.clone()
        };

        repository.create_booking(&older).await?;
        repository.create_booking(&newer).await?;

        let listed = repository.list_bookings().await?;

        assert_eq!(
            listed.iter().map(|booking| booking.uuid).collect::<Vec<_>>(),
            vec![newer.uuid, older.uuid]
        );

        Ok(())
    }
}
