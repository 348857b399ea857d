//! Bookings service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::{Timestamp, civil::Date};
use mockall::automock;
use tracing::{Span, error, info, warn};

use prestige::{
    bookings::{BookingStatus, DepositStatus, FinalPaymentStatus},
    pricing::{compute_pricing, pricing_delta},
};

use crate::{
    domain::{
        bookings::{
            data::{BookingUpdate, Cancellation, NewAdjustment, NewBooking, Reschedule, RescheduleOutcome},
            errors::BookingsServiceError,
            records::{
                AdjustmentRecord, AdjustmentStatus, AdjustmentUuid, BookingPricing, BookingRecord,
                BookingUuid, CancellationRecord, CustomerDetails, PaymentRecord, RescheduleRecord,
            },
            repository::BookingsRepository,
        },
        settings::{records::NotificationSettings, repository::SettingsRepository},
        validation,
    },
    notifications::{EmailMessage, Notifier, templates},
    payments::{CustomerCharge, GatewayError, PaymentGateway, PaymentIntent},
    store::KvStore,
};

#[derive(Clone)]
pub struct KvBookingsService {
    repository: BookingsRepository,
    settings: SettingsRepository,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn Notifier>,
}

impl KvBookingsService {
    #[must_use]
    pub fn new(
        store: Arc<dyn KvStore>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            repository: BookingsRepository::new(Arc::clone(&store)),
            settings: SettingsRepository::new(store),
            gateway,
            notifier,
        }
    }

    async fn load(&self, booking: BookingUuid) -> Result<BookingRecord, BookingsServiceError> {
        self.repository
            .get_booking(booking)
            .await?
            .ok_or(BookingsServiceError::NotFound)
    }

    async fn persist(&self, booking: &mut BookingRecord) -> Result<(), BookingsServiceError> {
        booking.updated_at = Timestamp::now();

        self.repository.save_booking(booking).await?;

        Ok(())
    }

    /// Settings for an outbound message; `None` skips the message.
    async fn notification_settings(&self) -> Option<NotificationSettings> {
        match self.settings.notification_settings().await {
            Ok(settings) => Some(settings),
            Err(source) => {
                error!(error = %source, "could not load notification settings");
                None
            }
        }
    }

    async fn notify(&self, booking: BookingUuid, kind: &'static str, message: EmailMessage) {
        if self.notifier.send(message).await {
            info!(booking_uuid = %booking, kind, "notification sent");
        } else {
            warn!(booking_uuid = %booking, kind, "notification was not delivered");
        }
    }

    fn charge_for(booking: &BookingRecord, amount: u64, description: String) -> CustomerCharge {
        CustomerCharge {
            customer: booking.stripe_customer_id.clone(),
            payment_method: booking.payment_method_id.clone(),
            amount,
            description,
            booking_id: booking.uuid.to_string(),
            idempotency_key: None,
        }
    }

    /// Move money for a single adjustment. Returns the intent id and, for
    /// refunds, the refund id. A failure keeps the intent id when the gateway
    /// created one.
    async fn settle_adjustment(
        &self,
        booking: &BookingRecord,
        adjustment: &AdjustmentRecord,
        refund_target: Option<&str>,
    ) -> Result<(String, Option<String>), SettlementFailure> {
        if let Some(intent) = refund_target {
            let refund = self
                .gateway
                .refund(intent, adjustment.amount.unsigned_abs())
                .await
                .map_err(|error| SettlementFailure {
                    error,
                    intent_id: Some(intent.to_string()),
                })?;

            return Ok((intent.to_string(), Some(refund.id)));
        }

        let mut charge = Self::charge_for(
            booking,
            adjustment.amount.unsigned_abs(),
            adjustment.memo.clone(),
        );
        charge.idempotency_key = Some(format!("adjustment-{}", adjustment.uuid));

        let intent = self
            .gateway
            .charge_off_session(charge)
            .await
            .map_err(|error| SettlementFailure {
                error,
                intent_id: None,
            })?;

        if intent.is_succeeded() {
            Ok((intent.id, None))
        } else {
            Err(SettlementFailure {
                error: unsettled(&intent),
                intent_id: Some(intent.id),
            })
        }
    }
}

struct SettlementFailure {
    error: GatewayError,
    intent_id: Option<String>,
}

fn unsettled(intent: &PaymentIntent) -> GatewayError {
    GatewayError::new(
        "payment_not_completed",
        format!("payment {} ended with status {}", intent.id, intent.status),
    )
}

fn transition(
    booking: &mut BookingRecord,
    next: BookingStatus,
) -> Result<(), BookingsServiceError> {
    if !booking.status.can_transition_to(next) {
        return Err(BookingsServiceError::PreconditionFailed(format!(
            "a {} booking cannot become {next}",
            booking.status
        )));
    }

    booking.status = next;

    Ok(())
}

fn validate_customer(customer: &CustomerDetails) -> Result<CustomerDetails, String> {
    Ok(CustomerDetails {
        first_name: validation::required("first name", &customer.first_name)?,
        last_name: validation::required("last name", &customer.last_name)?,
        email: validation::email("email", &customer.email)?,
        phone: validation::required("phone", &customer.phone)?,
        drivers_license: validation::required("driver's license", &customer.drivers_license)?,
    })
}

fn validate_new_booking(booking: &NewBooking) -> Result<(), String> {
    validation::required("customer id", &booking.customer_id)?;
    validation::required("stripe customer id", &booking.stripe_customer_id)?;
    validation::required("car id", &booking.car.id)?;

    if booking.car.daily_price == 0 {
        return Err("daily price must be greater than zero".to_string());
    }

    Ok(())
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|notes| notes.trim().to_string())
        .filter(|notes| !notes.is_empty())
}

/// Apply `amount` to the final amount and running additional charges.
fn apply_to_totals(pricing: &mut BookingPricing, amount: i64) -> Result<(), BookingsServiceError> {
    let final_amount = i64::try_from(pricing.final_amount)
        .ok()
        .and_then(|current| current.checked_add(amount))
        .ok_or_else(|| BookingsServiceError::Validation("adjustment is out of range".to_string()))?;

    pricing.final_amount = u64::try_from(final_amount).map_err(|_negative| {
        BookingsServiceError::Validation(format!(
            "adjustment of {amount} would make the final amount negative"
        ))
    })?;

    pricing.additional_charges = pricing
        .additional_charges
        .checked_add(amount)
        .ok_or_else(|| BookingsServiceError::Validation("adjustment is out of range".to_string()))?;

    Ok(())
}

/// Intent a negative adjustment refunds against: the collected final
/// payment, else the captured deposit.
fn refund_target(payment: &PaymentRecord) -> Result<String, BookingsServiceError> {
    if payment.final_status == FinalPaymentStatus::Succeeded
        && let Some(intent) = &payment.final_intent_id
    {
        return Ok(intent.clone());
    }

    if payment.deposit_status == DepositStatus::Captured
        && let Some(intent) = &payment.deposit_intent_id
    {
        return Ok(intent.clone());
    }

    Err(BookingsServiceError::PreconditionFailed(
        "no collected payment to refund against".to_string(),
    ))
}

#[async_trait]
impl BookingsService for KvBookingsService {
    #[tracing::instrument(
        name = "bookings.service.create_booking",
        skip(self, booking),
        fields(booking_uuid = tracing::field::Empty, customer_id = %booking.customer_id),
        err
    )]
    async fn create_booking(
        &self,
        booking: NewBooking,
    ) -> Result<BookingRecord, BookingsServiceError> {
        validate_new_booking(&booking).map_err(BookingsServiceError::Validation)?;

        let customer = validate_customer(&booking.customer).map_err(BookingsServiceError::Validation)?;
        let pricing = compute_pricing(booking.car.daily_price, booking.start_date, booking.end_date)?;

        let uuid = BookingUuid::new();

        Span::current().record("booking_uuid", tracing::field::display(uuid));

        let intent = self
            .gateway
            .create_payment_intent(CustomerCharge {
                customer: booking.stripe_customer_id.trim().to_string(),
                payment_method: booking.payment_method_id.clone(),
                amount: pricing.deposit_amount,
                description: format!(
                    "Deposit for {} {} ({} to {})",
                    booking.car.brand, booking.car.model, booking.start_date, booking.end_date
                ),
                booking_id: uuid.to_string(),
                idempotency_key: Some(format!("deposit-{uuid}")),
            })
            .await?;

        let deposit_status = DepositStatus::from_intent_status(&intent.status);

        let now = Timestamp::now();

        let record = BookingRecord {
            uuid,
            customer_id: booking.customer_id.trim().to_string(),
            stripe_customer_id: booking.stripe_customer_id.trim().to_string(),
            payment_method_id: booking.payment_method_id.or(intent.payment_method),
            car: booking.car,
            start_date: booking.start_date,
            end_date: booking.end_date,
            pricing: BookingPricing::from_pricing(pricing),
            customer,
            payment: PaymentRecord {
                deposit_intent_id: Some(intent.id),
                deposit_status,
                ..PaymentRecord::default()
            },
            status: BookingStatus::Pending,
            cancellation: None,
            reschedules: Vec::new(),
            notes: normalize_notes(booking.notes),
            created_at: now,
            updated_at: now,
        };

        self.repository.create_booking(&record).await?;

        info!(
            subtotal = record.pricing.subtotal,
            deposit = record.pricing.deposit_amount,
            deposit_status = %record.payment.deposit_status,
            "created booking"
        );

        if let Some(settings) = self.notification_settings().await
            && settings.admin_booking_copies
            && !settings.admin_recipients.is_empty()
        {
            let message = templates::admin_booking_copy(
                &record,
                settings.admin_recipients,
                settings.sender_address,
            );

            self.notify(record.uuid, "admin_booking_copy", message).await;
        }

        Ok(record)
    }

    async fn get_booking(&self, booking: BookingUuid) -> Result<BookingRecord, BookingsServiceError> {
        self.load(booking).await
    }

    async fn list_bookings(&self) -> Result<Vec<BookingRecord>, BookingsServiceError> {
        Ok(self.repository.list_bookings().await?)
    }

    async fn list_customer_bookings(
        &self,
        customer_id: &str,
    ) -> Result<Vec<BookingRecord>, BookingsServiceError> {
        Ok(self.repository.list_customer_bookings(customer_id).await?)
    }

    async fn list_bookings_in_range(
        &self,
        from: Date,
        to: Date,
    ) -> Result<Vec<BookingRecord>, BookingsServiceError> {
        if to <= from {
            return Err(BookingsServiceError::Validation(format!(
                "range end {to} must be after range start {from}"
            )));
        }

        let mut bookings = self.repository.list_bookings().await?;

        bookings.retain(|booking| booking.overlaps(from, to));

        Ok(bookings)
    }

    async fn find_by_payment_intent(
        &self,
        intent_id: &str,
    ) -> Result<BookingRecord, BookingsServiceError> {
        self.repository
            .find_by_payment_intent(intent_id)
            .await?
            .ok_or(BookingsServiceError::NotFound)
    }

    #[tracing::instrument(
        name = "bookings.service.update_booking",
        skip(self, update),
        fields(booking_uuid = %booking),
        err
    )]
    async fn update_booking(
        &self,
        booking: BookingUuid,
        update: BookingUpdate,
    ) -> Result<BookingRecord, BookingsServiceError> {
        let customer = validate_customer(&update.customer).map_err(BookingsServiceError::Validation)?;

        let mut record = self.load(booking).await?;

        record.customer = customer;
        record.notes = normalize_notes(update.notes);

        self.persist(&mut record).await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "bookings.service.confirm_booking",
        skip(self),
        fields(booking_uuid = %booking),
        err
    )]
    async fn confirm_booking(
        &self,
        booking: BookingUuid,
    ) -> Result<BookingRecord, BookingsServiceError> {
        let mut record = self.load(booking).await?;

        transition(&mut record, BookingStatus::Confirmed)?;

        self.persist(&mut record).await?;

        info!("confirmed booking");

        if let Some(settings) = self.notification_settings().await
            && settings.booking_confirmations
        {
            let message = templates::booking_confirmation(&record, settings.sender_address);

            self.notify(record.uuid, "booking_confirmation", message).await;
        }

        Ok(record)
    }

    #[tracing::instrument(
        name = "bookings.service.start_booking",
        skip(self),
        fields(booking_uuid = %booking),
        err
    )]
    async fn start_booking(&self, booking: BookingUuid) -> Result<BookingRecord, BookingsServiceError> {
        let mut record = self.load(booking).await?;

        transition(&mut record, BookingStatus::Active)?;

        self.persist(&mut record).await?;

        info!("rental started");

        Ok(record)
    }

    #[tracing::instrument(
        name = "bookings.service.complete_booking",
        skip(self),
        fields(booking_uuid = %booking),
        err
    )]
    async fn complete_booking(
        &self,
        booking: BookingUuid,
    ) -> Result<BookingRecord, BookingsServiceError> {
        let mut record = self.load(booking).await?;

        transition(&mut record, BookingStatus::Completed)?;

        self.persist(&mut record).await?;

        if record.payment.final_status != FinalPaymentStatus::Succeeded {
            warn!(
                outstanding = record.outstanding_balance(),
                "completed booking with final payment outstanding"
            );
        }

        Ok(record)
    }

    #[tracing::instrument(
        name = "bookings.service.capture_deposit",
        skip(self),
        fields(booking_uuid = %booking),
        err
    )]
    async fn capture_deposit(
        &self,
        booking: BookingUuid,
    ) -> Result<BookingRecord, BookingsServiceError> {
        let mut record = self.load(booking).await?;

        if record.payment.deposit_status != DepositStatus::Authorized {
            return Err(BookingsServiceError::PreconditionFailed(format!(
                "deposit is {}; only an authorized deposit can be captured",
                record.payment.deposit_status
            )));
        }

        let Some(intent_id) = record.payment.deposit_intent_id.clone() else {
            return Err(BookingsServiceError::PreconditionFailed(
                "booking has no deposit payment intent".to_string(),
            ));
        };

        self.gateway.capture(&intent_id, None).await?;

        record.payment.deposit_status = DepositStatus::Captured;

        self.persist(&mut record).await?;

        info!(%intent_id, "captured deposit");

        Ok(record)
    }

    #[tracing::instrument(
        name = "bookings.service.reauthorize_deposit",
        skip(self),
        fields(booking_uuid = %booking),
        err
    )]
    async fn reauthorize_deposit(
        &self,
        booking: BookingUuid,
    ) -> Result<BookingRecord, BookingsServiceError> {
        let mut record = self.load(booking).await?;

        if record.payment.deposit_status == DepositStatus::Captured {
            return Err(BookingsServiceError::PreconditionFailed(
                "deposit has already been captured".to_string(),
            ));
        }

        if record.status.is_terminal() {
            return Err(BookingsServiceError::PreconditionFailed(format!(
                "a {} booking cannot be reauthorized",
                record.status
            )));
        }

        let charge = Self::charge_for(
            &record,
            record.pricing.deposit_amount,
            format!(
                "Deposit reauthorization for {} {}",
                record.car.brand, record.car.model
            ),
        );

        let intent = self.gateway.reauthorize(charge).await?;

        let previous = record.payment.deposit_intent_id.replace(intent.id.clone());

        record.payment.deposit_status = DepositStatus::from_intent_status(&intent.status);

        if record.payment_method_id.is_none() {
            record.payment_method_id = intent.payment_method;
        }

        self.repository
            .index_payment_intent(&intent.id, record.uuid)
            .await?;
        self.persist(&mut record).await?;

        info!(
            previous_intent = previous.as_deref().unwrap_or("none"),
            intent_id = %intent.id,
            deposit_status = %record.payment.deposit_status,
            "reauthorized deposit"
        );

        Ok(record)
    }

    #[tracing::instrument(
        name = "bookings.service.sync_deposit",
        skip(self),
        fields(booking_uuid = %booking),
        err
    )]
    async fn sync_deposit(&self, booking: BookingUuid) -> Result<BookingRecord, BookingsServiceError> {
        let mut record = self.load(booking).await?;

        let Some(intent_id) = record.payment.deposit_intent_id.clone() else {
            return Err(BookingsServiceError::PreconditionFailed(
                "booking has no deposit payment intent".to_string(),
            ));
        };

        let intent = self.gateway.retrieve_payment_intent(&intent_id).await?;

        record.payment.deposit_status = record
            .payment
            .deposit_status
            .advance(DepositStatus::from_intent_status(&intent.status));

        self.persist(&mut record).await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "bookings.service.sync_payment_intent",
        skip(self, intent),
        fields(intent_id = %intent.id, intent_status = %intent.status),
        err
    )]
    async fn sync_payment_intent(
        &self,
        intent: PaymentIntent,
    ) -> Result<Option<BookingRecord>, BookingsServiceError> {
        let Some(mut record) = self.repository.find_by_payment_intent(&intent.id).await? else {
            info!("payment intent does not belong to a booking");
            return Ok(None);
        };

        if record.payment.deposit_intent_id.as_deref() == Some(intent.id.as_str()) {
            record.payment.deposit_status = record
                .payment
                .deposit_status
                .advance(DepositStatus::from_intent_status(&intent.status));
        } else if record.payment.final_intent_id.as_deref() == Some(intent.id.as_str()) {
            record.payment.final_status = record
                .payment
                .final_status
                .advance(FinalPaymentStatus::from_intent_status(&intent.status));
        } else {
            return Ok(Some(record));
        }

        self.persist(&mut record).await?;

        info!(
            booking_uuid = %record.uuid,
            deposit_status = %record.payment.deposit_status,
            final_status = %record.payment.final_status,
            "synced payment intent"
        );

        Ok(Some(record))
    }

    #[tracing::instrument(
        name = "bookings.service.charge_final_payment",
        skip(self),
        fields(booking_uuid = %booking),
        err
    )]
    async fn charge_final_payment(
        &self,
        booking: BookingUuid,
    ) -> Result<BookingRecord, BookingsServiceError> {
        let mut record = self.load(booking).await?;

        if !matches!(record.status, BookingStatus::Confirmed | BookingStatus::Active) {
            return Err(BookingsServiceError::PreconditionFailed(format!(
                "final payment cannot be charged for a {} booking",
                record.status
            )));
        }

        if record.payment.final_status == FinalPaymentStatus::Succeeded {
            return Err(BookingsServiceError::PreconditionFailed(
                "final payment has already been collected".to_string(),
            ));
        }

        let outstanding = record.outstanding_balance();

        let amount = u64::try_from(outstanding).unwrap_or(0);

        if amount == 0 {
            info!(outstanding, "nothing left to collect; final payment settled");

            record.payment.final_status = FinalPaymentStatus::Succeeded;
            self.persist(&mut record).await?;

            return Ok(record);
        }

        let charge = Self::charge_for(
            &record,
            amount,
            format!("Final payment for {} {}", record.car.brand, record.car.model),
        );

        match self.gateway.charge_off_session(charge).await {
            Ok(intent) => {
                record.payment.final_status = if intent.is_succeeded() {
                    FinalPaymentStatus::Succeeded
                } else {
                    FinalPaymentStatus::Failed
                };

                self.repository
                    .index_payment_intent(&intent.id, record.uuid)
                    .await?;
                record.payment.final_intent_id = Some(intent.id);

                self.persist(&mut record).await?;

                info!(amount, final_status = %record.payment.final_status, "charged final payment");

                Ok(record)
            }
            Err(gateway_error) => {
                record.payment.final_status = FinalPaymentStatus::Failed;

                self.persist(&mut record).await?;

                warn!(amount, code = %gateway_error.code, "final payment failed");

                Err(gateway_error.into())
            }
        }
    }

    #[tracing::instrument(
        name = "bookings.service.apply_adjustment",
        skip(self, adjustment),
        fields(
            booking_uuid = %booking,
            amount = adjustment.amount,
            charge_now = adjustment.charge_now
        ),
        err
    )]
    async fn apply_adjustment(
        &self,
        booking: BookingUuid,
        adjustment: NewAdjustment,
    ) -> Result<BookingRecord, BookingsServiceError> {
        if adjustment.amount == 0 {
            return Err(BookingsServiceError::Validation(
                "adjustment amount must not be zero".to_string(),
            ));
        }

        let memo = validation::required("memo", &adjustment.memo)
            .map_err(BookingsServiceError::Validation)?;

        let mut record = self.load(booking).await?;

        if record.status == BookingStatus::Cancelled {
            return Err(BookingsServiceError::PreconditionFailed(
                "a cancelled booking cannot be adjusted".to_string(),
            ));
        }

        // Reject before recording anything if the totals cannot absorb it.
        let mut projected = record.pricing;
        apply_to_totals(&mut projected, adjustment.amount)?;

        if !adjustment.charge_now
            && adjustment.amount > 0
            && record.payment.final_status == FinalPaymentStatus::Succeeded
        {
            return Err(BookingsServiceError::PreconditionFailed(
                "final payment was already collected; charge this adjustment now".to_string(),
            ));
        }

        if !adjustment.charge_now {
            record.payment.adjustments.push(AdjustmentRecord {
                uuid: AdjustmentUuid::new(),
                amount: adjustment.amount,
                memo,
                status: AdjustmentStatus::NotCharged,
                payment_intent_id: None,
                refund_id: None,
                failure_message: None,
                created_at: Timestamp::now(),
            });
            record.pricing = projected;

            self.persist(&mut record).await?;

            info!(final_amount = record.pricing.final_amount, "recorded adjustment");

            return Ok(record);
        }

        let refund_target = if adjustment.amount < 0 {
            Some(refund_target(&record.payment)?)
        } else {
            None
        };

        let entry = AdjustmentRecord {
            uuid: AdjustmentUuid::new(),
            amount: adjustment.amount,
            memo,
            status: AdjustmentStatus::Pending,
            payment_intent_id: None,
            refund_id: None,
            failure_message: None,
            created_at: Timestamp::now(),
        };

        record.payment.adjustments.push(entry.clone());
        self.persist(&mut record).await?;

        let outcome = self
            .settle_adjustment(&record, &entry, refund_target.as_deref())
            .await;

        let Some(stored) = record
            .payment
            .adjustments
            .iter_mut()
            .find(|candidate| candidate.uuid == entry.uuid)
        else {
            return Err(BookingsServiceError::NotFound);
        };

        match outcome {
            Ok((intent_id, refund_id)) => {
                stored.status = AdjustmentStatus::Succeeded;
                stored.payment_intent_id = Some(intent_id.clone());
                stored.refund_id = refund_id;
                record.pricing = projected;

                if refund_target.is_none() {
                    self.repository
                        .index_payment_intent(&intent_id, record.uuid)
                        .await?;
                }

                self.persist(&mut record).await?;

                info!(%intent_id, final_amount = record.pricing.final_amount, "settled adjustment");

                Ok(record)
            }
            Err(SettlementFailure {
                error: gateway_error,
                intent_id,
            }) => {
                stored.status = AdjustmentStatus::Failed;
                stored.failure_message = Some(gateway_error.message.clone());
                stored.payment_intent_id = intent_id;

                self.persist(&mut record).await?;

                warn!(code = %gateway_error.code, "adjustment charge failed");

                Err(gateway_error.into())
            }
        }
    }

    #[tracing::instrument(
        name = "bookings.service.reschedule_booking",
        skip(self, reschedule),
        fields(booking_uuid = %booking),
        err
    )]
    async fn reschedule_booking(
        &self,
        booking: BookingUuid,
        reschedule: Reschedule,
    ) -> Result<RescheduleOutcome, BookingsServiceError> {
        let reason = validation::required("reason", &reschedule.reason)
            .map_err(BookingsServiceError::Validation)?;

        let mut record = self.load(booking).await?;

        if record.status.is_terminal() {
            return Err(BookingsServiceError::PreconditionFailed(format!(
                "a {} booking cannot be rescheduled",
                record.status
            )));
        }

        let previous = record.pricing;
        let next = compute_pricing(previous.daily_rate, reschedule.start_date, reschedule.end_date)?;
        let delta = pricing_delta(&previous.base(), &next)?;

        // A held or collected deposit keeps its amount.
        let deposit_amount = match record.payment.deposit_status {
            DepositStatus::Authorized | DepositStatus::Captured => previous.deposit_amount,
            DepositStatus::Pending | DepositStatus::Failed => next.deposit_amount,
        };

        let final_amount = next
            .subtotal
            .checked_sub(deposit_amount)
            .and_then(|base| i64::try_from(base).ok())
            .and_then(|base| base.checked_add(previous.additional_charges))
            .and_then(|total| u64::try_from(total).ok())
            .ok_or_else(|| {
                BookingsServiceError::Validation(format!(
                    "new dates leave a subtotal of {} below the deposit and adjustments already applied",
                    next.subtotal
                ))
            })?;

        record.pricing = BookingPricing {
            daily_rate: next.daily_rate,
            total_days: next.total_days,
            subtotal: next.subtotal,
            deposit_amount,
            final_amount,
            additional_charges: previous.additional_charges,
        };

        record.reschedules.push(RescheduleRecord {
            previous_start_date: record.start_date,
            previous_end_date: record.end_date,
            new_start_date: reschedule.start_date,
            new_end_date: reschedule.end_date,
            previous_subtotal: previous.subtotal,
            new_subtotal: next.subtotal,
            pricing_delta: delta,
            reason,
            rescheduled_at: Timestamp::now(),
        });

        record.start_date = reschedule.start_date;
        record.end_date = reschedule.end_date;

        self.persist(&mut record).await?;

        info!(pricing_delta = delta, total_days = next.total_days, "rescheduled booking");

        Ok(RescheduleOutcome {
            booking: record,
            pricing_delta: delta,
        })
    }

    #[tracing::instrument(
        name = "bookings.service.cancel_booking",
        skip(self, cancellation),
        fields(booking_uuid = %booking),
        err
    )]
    async fn cancel_booking(
        &self,
        booking: BookingUuid,
        cancellation: Cancellation,
    ) -> Result<BookingRecord, BookingsServiceError> {
        let reason = validation::required("reason", &cancellation.reason)
            .map_err(BookingsServiceError::Validation)?;

        let mut record = self.load(booking).await?;

        if cancellation.refund_amount > record.pricing.subtotal {
            return Err(BookingsServiceError::Validation(format!(
                "refund of {} exceeds the booking subtotal of {}",
                cancellation.refund_amount, record.pricing.subtotal
            )));
        }

        transition(&mut record, BookingStatus::Cancelled)?;

        record.cancellation = Some(CancellationRecord {
            reason,
            refund_amount: cancellation.refund_amount,
            cancelled_at: Timestamp::now(),
        });

        self.persist(&mut record).await?;

        info!(refund_amount = cancellation.refund_amount, "cancelled booking");

        Ok(record)
    }

    #[tracing::instrument(
        name = "bookings.service.delete_booking",
        skip(self),
        fields(booking_uuid = %booking),
        err
    )]
    async fn delete_booking(
        &self,
        booking: BookingUuid,
        force: bool,
    ) -> Result<(), BookingsServiceError> {
        let record = self.load(booking).await?;

        if record.payment.holds_captured_funds() {
            if !force {
                return Err(BookingsServiceError::PreconditionFailed(
                    "booking holds captured funds; pass force to delete it".to_string(),
                ));
            }

            warn!(
                deposit_status = %record.payment.deposit_status,
                final_status = %record.payment.final_status,
                "force deleting booking with captured funds"
            );
        }

        if !self.repository.delete_booking(&record).await? {
            return Err(BookingsServiceError::NotFound);
        }

        info!("deleted booking");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait BookingsService: Send + Sync {
    /// Price a new booking, place the deposit hold and store it as pending.
    async fn create_booking(&self, booking: NewBooking)
    -> Result<BookingRecord, BookingsServiceError>;

    /// Retrieve a single booking.
    async fn get_booking(&self, booking: BookingUuid) -> Result<BookingRecord, BookingsServiceError>;

    /// All bookings, newest first.
    async fn list_bookings(&self) -> Result<Vec<BookingRecord>, BookingsServiceError>;

    /// A customer's bookings, newest first.
    async fn list_customer_bookings(
        &self,
        customer_id: &str,
    ) -> Result<Vec<BookingRecord>, BookingsServiceError>;

    /// Bookings whose rental overlaps `[from, to)`.
    async fn list_bookings_in_range(
        &self,
        from: Date,
        to: Date,
    ) -> Result<Vec<BookingRecord>, BookingsServiceError>;

    /// The booking a deposit, final or adjustment payment intent belongs to.
    async fn find_by_payment_intent(
        &self,
        intent_id: &str,
    ) -> Result<BookingRecord, BookingsServiceError>;

    /// Replace customer contact details and notes.
    async fn update_booking(
        &self,
        booking: BookingUuid,
        update: BookingUpdate,
    ) -> Result<BookingRecord, BookingsServiceError>;

    /// `pending -> confirmed`, then email the customer.
    async fn confirm_booking(&self, booking: BookingUuid)
    -> Result<BookingRecord, BookingsServiceError>;

    /// `confirmed -> active`.
    async fn start_booking(&self, booking: BookingUuid) -> Result<BookingRecord, BookingsServiceError>;

    /// `active -> completed`.
    async fn complete_booking(
        &self,
        booking: BookingUuid,
    ) -> Result<BookingRecord, BookingsServiceError>;

    /// Capture an authorized deposit.
    async fn capture_deposit(&self, booking: BookingUuid)
    -> Result<BookingRecord, BookingsServiceError>;

    /// Place a fresh deposit hold against the stored card.
    async fn reauthorize_deposit(
        &self,
        booking: BookingUuid,
    ) -> Result<BookingRecord, BookingsServiceError>;

    /// Refresh the deposit status from the gateway.
    async fn sync_deposit(&self, booking: BookingUuid) -> Result<BookingRecord, BookingsServiceError>;

    /// Apply a gateway-reported intent to the booking it belongs to, if any.
    async fn sync_payment_intent(
        &self,
        intent: PaymentIntent,
    ) -> Result<Option<BookingRecord>, BookingsServiceError>;

    /// Charge the outstanding balance off-session.
    async fn charge_final_payment(
        &self,
        booking: BookingUuid,
    ) -> Result<BookingRecord, BookingsServiceError>;

    /// Record, and optionally settle, an additional charge or refund.
    async fn apply_adjustment(
        &self,
        booking: BookingUuid,
        adjustment: NewAdjustment,
    ) -> Result<BookingRecord, BookingsServiceError>;

    /// Move the rental dates and reprice.
    async fn reschedule_booking(
        &self,
        booking: BookingUuid,
        reschedule: Reschedule,
    ) -> Result<RescheduleOutcome, BookingsServiceError>;

    /// Cancel a booking that has not completed.
    async fn cancel_booking(
        &self,
        booking: BookingUuid,
        cancellation: Cancellation,
    ) -> Result<BookingRecord, BookingsServiceError>;

    /// Permanently remove a booking and its indexes.
    async fn delete_booking(&self, booking: BookingUuid, force: bool)
    -> Result<(), BookingsServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use testresult::TestResult;

    use crate::{
        notifications::MockNotifier,
        payments::{MockPaymentGateway, Refund},
        store::MemoryKvStore,
        test::fixtures,
    };

    use super::*;

    struct Harness {
        service: KvBookingsService,
        repository: BookingsRepository,
    }

    fn harness(gateway: MockPaymentGateway, notifier: MockNotifier) -> Harness {
        let store: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());

        Harness {
            service: KvBookingsService::new(
                Arc::clone(&store),
                Arc::new(gateway),
                Arc::new(notifier),
            ),
            repository: BookingsRepository::new(store),
        }
    }

    fn quiet_notifier() -> MockNotifier {
        let mut notifier = MockNotifier::new();
        notifier.expect_send().never();
        notifier
    }

    async fn seeded(
        gateway: MockPaymentGateway,
        notifier: MockNotifier,
        booking: &BookingRecord,
    ) -> TestResult<Harness> {
        let harness = harness(gateway, notifier);

        harness.repository.create_booking(booking).await?;

        Ok(harness)
    }

    async fn stored(harness: &Harness, booking: BookingUuid) -> TestResult<BookingRecord> {
        Ok(harness
            .repository
            .get_booking(booking)
            .await?
            .ok_or("booking missing")?)
    }

    #[tokio::test]
    async fn create_booking_prices_and_authorizes_deposit() -> TestResult {
        let mut gateway = MockPaymentGateway::new();

        gateway
            .expect_create_payment_intent()
            .once()
            .withf(|charge| charge.amount == 45_000 && charge.customer == "cus_123")
            .return_once(|_charge| Ok(fixtures::intent("pi_new", "requires_capture", 45_000)));

        let harness = harness(gateway, quiet_notifier());

        let booking = harness
            .service
            .create_booking(fixtures::new_booking())
            .await?;

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.pricing.subtotal, 150_000);
        assert_eq!(booking.pricing.deposit_amount, 45_000);
        assert_eq!(booking.pricing.final_amount, 105_000);
        assert_eq!(booking.payment.deposit_status, DepositStatus::Authorized);
        assert_eq!(booking.payment.deposit_intent_id.as_deref(), Some("pi_new"));

        let found = harness.service.find_by_payment_intent("pi_new").await?;

        assert_eq!(found.uuid, booking.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn create_booking_rejects_inverted_dates_without_gateway_call() -> TestResult {
        let mut gateway = MockPaymentGateway::new();
        gateway.expect_create_payment_intent().never();

        let harness = harness(gateway, quiet_notifier());

        let result = harness
            .service
            .create_booking(NewBooking {
                start_date: date(2026, 5, 4),
                end_date: date(2026, 5, 1),
                ..fixtures::new_booking()
            })
            .await;

        assert!(matches!(result, Err(BookingsServiceError::Validation(_))));

        Ok(())
    }

    #[tokio::test]
    async fn create_booking_stores_nothing_when_gateway_fails() -> TestResult {
        let mut gateway = MockPaymentGateway::new();

        gateway
            .expect_create_payment_intent()
            .once()
            .return_once(|_charge| Err(GatewayError::new("card_declined", "Your card was declined.")));

        let harness = harness(gateway, quiet_notifier());

        let result = harness.service.create_booking(fixtures::new_booking()).await;

        assert!(
            matches!(result, Err(BookingsServiceError::Gateway(ref error)) if error.message == "Your card was declined.")
        );
        assert!(harness.service.list_bookings().await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn create_booking_copies_admins_when_enabled() -> TestResult {
        let mut gateway = MockPaymentGateway::new();

        gateway
            .expect_create_payment_intent()
            .once()
            .return_once(|_charge| Ok(fixtures::intent("pi_new", "requires_confirmation", 45_000)));

        let mut notifier = MockNotifier::new();

        notifier
            .expect_send()
            .once()
            .withf(|message| message.to == vec!["ops@prestige.example".to_string()])
            .return_once(|_message| true);

        let harness = harness(gateway, notifier);

        harness
            .service
            .settings
            .save_notification_settings(&NotificationSettings {
                admin_recipients: vec!["ops@prestige.example".to_string()],
                admin_booking_copies: true,
                ..NotificationSettings::default()
            })
            .await?;

        let booking = harness.service.create_booking(fixtures::new_booking()).await?;

        assert_eq!(booking.payment.deposit_status, DepositStatus::Pending);

        Ok(())
    }

    #[tokio::test]
    async fn confirm_sends_confirmation_and_tolerates_delivery_failure() -> TestResult {
        let booking = fixtures::booking()?;
        let email = booking.customer.email.clone();

        let mut notifier = MockNotifier::new();

        notifier
            .expect_send()
            .once()
            .withf(move |message| message.to == vec![email.clone()])
            .return_once(|_message| false);

        let harness = seeded(MockPaymentGateway::new(), notifier, &booking).await?;

        let confirmed = harness.service.confirm_booking(booking.uuid).await?;

        assert_eq!(confirmed.status, BookingStatus::Confirmed);
        assert_eq!(stored(&harness, booking.uuid).await?.status, BookingStatus::Confirmed);

        Ok(())
    }

    #[tokio::test]
    async fn confirm_requires_pending_booking() -> TestResult {
        let booking = BookingRecord {
            status: BookingStatus::Active,
            ..fixtures::booking()?
        };

        let harness = seeded(MockPaymentGateway::new(), quiet_notifier(), &booking).await?;

        let result = harness.service.confirm_booking(booking.uuid).await;

        assert!(matches!(result, Err(BookingsServiceError::PreconditionFailed(_))));

        Ok(())
    }

    #[tokio::test]
    async fn lifecycle_runs_through_to_completion() -> TestResult {
        let booking = BookingRecord {
            status: BookingStatus::Confirmed,
            ..fixtures::booking()?
        };

        let harness = seeded(MockPaymentGateway::new(), quiet_notifier(), &booking).await?;

        harness.service.start_booking(booking.uuid).await?;
        let completed = harness.service.complete_booking(booking.uuid).await?;

        assert_eq!(completed.status, BookingStatus::Completed);

        let result = harness
            .service
            .cancel_booking(
                booking.uuid,
                Cancellation {
                    reason: "too late".to_string(),
                    refund_amount: 0,
                },
            )
            .await;

        assert!(matches!(result, Err(BookingsServiceError::PreconditionFailed(_))));

        Ok(())
    }

    #[tokio::test]
    async fn missing_booking_is_not_found() -> TestResult {
        let harness = harness(MockPaymentGateway::new(), quiet_notifier());

        let result = harness.service.get_booking(BookingUuid::new()).await;

        assert!(matches!(result, Err(BookingsServiceError::NotFound)));

        Ok(())
    }

    #[tokio::test]
    async fn capture_requires_authorized_deposit() -> TestResult {
        let mut booking = fixtures::booking()?;
        booking.payment.deposit_status = DepositStatus::Pending;

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_capture().never();

        let harness = seeded(gateway, quiet_notifier(), &booking).await?;

        let result = harness.service.capture_deposit(booking.uuid).await;

        assert!(matches!(result, Err(BookingsServiceError::PreconditionFailed(_))));
        assert_eq!(stored(&harness, booking.uuid).await?, booking);

        Ok(())
    }

    #[tokio::test]
    async fn capture_marks_deposit_captured() -> TestResult {
        let booking = fixtures::booking()?;

        let mut gateway = MockPaymentGateway::new();

        gateway
            .expect_capture()
            .once()
            .withf(|intent, amount| intent == "pi_deposit" && amount.is_none())
            .return_once(|_intent, _amount| Ok(fixtures::intent("pi_deposit", "succeeded", 45_000)));

        let harness = seeded(gateway, quiet_notifier(), &booking).await?;

        let captured = harness.service.capture_deposit(booking.uuid).await?;

        assert_eq!(captured.payment.deposit_status, DepositStatus::Captured);

        Ok(())
    }

    #[tokio::test]
    async fn failed_capture_leaves_deposit_authorized() -> TestResult {
        let booking = fixtures::booking()?;

        let mut gateway = MockPaymentGateway::new();

        gateway
            .expect_capture()
            .once()
            .return_once(|_intent, _amount| {
                Err(GatewayError::new(
                    "payment_intent_unexpected_state",
                    "This PaymentIntent could not be captured because it has a status of canceled.",
                ))
            });

        let harness = seeded(gateway, quiet_notifier(), &booking).await?;

        let result = harness.service.capture_deposit(booking.uuid).await;

        assert!(matches!(
            result,
            Err(BookingsServiceError::Gateway(ref error)) if error.message.contains("status of canceled")
        ));
        assert_eq!(
            stored(&harness, booking.uuid).await?.payment.deposit_status,
            DepositStatus::Authorized
        );

        Ok(())
    }

    #[tokio::test]
    async fn reauthorize_replaces_deposit_intent() -> TestResult {
        let mut booking = fixtures::booking()?;
        booking.payment.deposit_status = DepositStatus::Failed;

        let mut gateway = MockPaymentGateway::new();

        gateway
            .expect_reauthorize()
            .once()
            .withf(|charge| charge.amount == 45_000 && charge.payment_method.as_deref() == Some("pm_card"))
            .return_once(|_charge| Ok(fixtures::intent("pi_fresh", "requires_capture", 45_000)));

        let harness = seeded(gateway, quiet_notifier(), &booking).await?;

        let reauthorized = harness.service.reauthorize_deposit(booking.uuid).await?;

        assert_eq!(reauthorized.payment.deposit_intent_id.as_deref(), Some("pi_fresh"));
        assert_eq!(reauthorized.payment.deposit_status, DepositStatus::Authorized);
        assert_eq!(
            harness.service.find_by_payment_intent("pi_fresh").await?.uuid,
            booking.uuid
        );

        Ok(())
    }

    #[tokio::test]
    async fn reauthorize_refuses_captured_deposit() -> TestResult {
        let mut booking = fixtures::booking()?;
        booking.payment.deposit_status = DepositStatus::Captured;

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_reauthorize().never();

        let harness = seeded(gateway, quiet_notifier(), &booking).await?;

        let result = harness.service.reauthorize_deposit(booking.uuid).await;

        assert!(matches!(result, Err(BookingsServiceError::PreconditionFailed(_))));

        Ok(())
    }

    #[tokio::test]
    async fn sync_deposit_maps_gateway_status() -> TestResult {
        let booking = fixtures::booking()?;

        let mut gateway = MockPaymentGateway::new();

        gateway
            .expect_retrieve_payment_intent()
            .once()
            .withf(|intent| intent == "pi_deposit")
            .return_once(|_intent| Ok(fixtures::intent("pi_deposit", "canceled", 45_000)));

        let harness = seeded(gateway, quiet_notifier(), &booking).await?;

        let synced = harness.service.sync_deposit(booking.uuid).await?;

        assert_eq!(synced.payment.deposit_status, DepositStatus::Failed);

        Ok(())
    }

    #[tokio::test]
    async fn webhook_intent_updates_owning_booking() -> TestResult {
        let mut booking = fixtures::booking()?;
        booking.payment.deposit_status = DepositStatus::Pending;

        let harness = seeded(MockPaymentGateway::new(), quiet_notifier(), &booking).await?;

        let synced = harness
            .service
            .sync_payment_intent(fixtures::intent("pi_deposit", "requires_capture", 45_000))
            .await?;

        assert_eq!(
            synced.map(|booking| booking.payment.deposit_status),
            Some(DepositStatus::Authorized)
        );

        let unknown = harness
            .service
            .sync_payment_intent(fixtures::intent("pi_unknown", "succeeded", 10))
            .await?;

        assert!(unknown.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn late_authorization_report_keeps_captured_deposit() -> TestResult {
        let mut booking = fixtures::booking()?;
        booking.payment.deposit_status = DepositStatus::Captured;

        let harness = seeded(MockPaymentGateway::new(), quiet_notifier(), &booking).await?;

        let synced = harness
            .service
            .sync_payment_intent(fixtures::intent("pi_deposit", "requires_capture", 45_000))
            .await?;

        assert_eq!(
            synced.map(|booking| booking.payment.deposit_status),
            Some(DepositStatus::Captured)
        );
        assert_eq!(
            stored(&harness, booking.uuid).await?.payment.deposit_status,
            DepositStatus::Captured
        );

        let deleted = harness.service.delete_booking(booking.uuid, false).await;

        assert!(matches!(deleted, Err(BookingsServiceError::PreconditionFailed(_))));

        Ok(())
    }

    #[tokio::test]
    async fn late_report_keeps_succeeded_final_payment() -> TestResult {
        let mut booking = fixtures::booking()?;
        booking.status = BookingStatus::Active;
        booking.payment.deposit_status = DepositStatus::Captured;
        booking.payment.final_intent_id = Some("pi_final".to_string());
        booking.payment.final_status = FinalPaymentStatus::Succeeded;

        let harness = seeded(MockPaymentGateway::new(), quiet_notifier(), &booking).await?;

        harness
            .repository
            .index_payment_intent("pi_final", booking.uuid)
            .await?;

        let synced = harness
            .service
            .sync_payment_intent(fixtures::intent("pi_final", "requires_payment_method", 105_000))
            .await?;

        assert_eq!(
            synced.map(|booking| booking.payment.final_status),
            Some(FinalPaymentStatus::Succeeded)
        );

        Ok(())
    }

    #[tokio::test]
    async fn sync_deposit_does_not_regress_captured_deposit() -> TestResult {
        let mut booking = fixtures::booking()?;
        booking.payment.deposit_status = DepositStatus::Captured;

        let mut gateway = MockPaymentGateway::new();

        gateway
            .expect_retrieve_payment_intent()
            .once()
            .return_once(|_intent| Ok(fixtures::intent("pi_deposit", "requires_capture", 45_000)));

        let harness = seeded(gateway, quiet_notifier(), &booking).await?;

        let synced = harness.service.sync_deposit(booking.uuid).await?;

        assert_eq!(synced.payment.deposit_status, DepositStatus::Captured);

        Ok(())
    }

    #[tokio::test]
    async fn unchanged_intent_status_keeps_deposit_status_from_create() -> TestResult {
        for status in ["requires_payment_method", "requires_confirmation", "requires_capture"] {
            let mut gateway = MockPaymentGateway::new();

            gateway
                .expect_create_payment_intent()
                .once()
                .return_once(move |_charge| Ok(fixtures::intent("pi_new", status, 45_000)));
            gateway
                .expect_retrieve_payment_intent()
                .once()
                .return_once(move |_intent| Ok(fixtures::intent("pi_new", status, 45_000)));

            let harness = harness(gateway, quiet_notifier());

            let created = harness.service.create_booking(fixtures::new_booking()).await?;

            let webhook = harness
                .service
                .sync_payment_intent(fixtures::intent("pi_new", status, 45_000))
                .await?
                .map(|booking| booking.payment.deposit_status);

            let synced = harness.service.sync_deposit(created.uuid).await?;

            assert_eq!(webhook, Some(created.payment.deposit_status), "webhook with {status}");
            assert_eq!(
                synced.payment.deposit_status, created.payment.deposit_status,
                "sync with {status}"
            );
        }

        Ok(())
    }

    #[tokio::test]
    async fn uncharged_adjustment_moves_final_amount_without_gateway() -> TestResult {
        let booking = fixtures::booking()?;

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_charge_off_session().never();
        gateway.expect_refund().never();

        let harness = seeded(gateway, quiet_notifier(), &booking).await?;

        let adjusted = harness
            .service
            .apply_adjustment(
                booking.uuid,
                NewAdjustment {
                    amount: 100,
                    memo: "fee".to_string(),
                    charge_now: false,
                },
            )
            .await?;

        assert_eq!(adjusted.pricing.final_amount, 105_100);
        assert_eq!(adjusted.pricing.additional_charges, 100);
        assert_eq!(adjusted.payment.adjustments.len(), 1);
        assert_eq!(
            adjusted.payment.adjustments.first().map(|entry| entry.status),
            Some(AdjustmentStatus::NotCharged)
        );

        Ok(())
    }

    #[tokio::test]
    async fn charged_refund_settles_against_captured_deposit() -> TestResult {
        let mut booking = fixtures::booking()?;
        booking.payment.deposit_status = DepositStatus::Captured;

        let mut gateway = MockPaymentGateway::new();

        gateway
            .expect_refund()
            .once()
            .withf(|intent, amount| intent == "pi_deposit" && *amount == 50)
            .return_once(|intent, amount| {
                Ok(Refund {
                    id: "re_1".to_string(),
                    status: "succeeded".to_string(),
                    amount,
                    payment_intent: Some(intent.to_string()),
                })
            });

        let harness = seeded(gateway, quiet_notifier(), &booking).await?;

        let adjusted = harness
            .service
            .apply_adjustment(
                booking.uuid,
                NewAdjustment {
                    amount: -50,
                    memo: "refund".to_string(),
                    charge_now: true,
                },
            )
            .await?;

        let entry = adjusted.payment.adjustments.first().ok_or("no adjustment")?;

        assert_eq!(entry.status, AdjustmentStatus::Succeeded);
        assert_eq!(entry.refund_id.as_deref(), Some("re_1"));
        assert_eq!(adjusted.pricing.final_amount, 104_950);

        Ok(())
    }

    #[tokio::test]
    async fn failed_charge_records_failure_and_keeps_totals() -> TestResult {
        let booking = fixtures::booking()?;

        let mut gateway = MockPaymentGateway::new();

        gateway
            .expect_charge_off_session()
            .once()
            .withf(|charge| charge.amount == 2_500 && charge.description == "Late return")
            .return_once(|_charge| Err(GatewayError::new("card_declined", "Your card was declined.")));

        let harness = seeded(gateway, quiet_notifier(), &booking).await?;

        let result = harness
            .service
            .apply_adjustment(
                booking.uuid,
                NewAdjustment {
                    amount: 2_500,
                    memo: "Late return".to_string(),
                    charge_now: true,
                },
            )
            .await;

        assert!(matches!(result, Err(BookingsServiceError::Gateway(_))));

        let after = stored(&harness, booking.uuid).await?;
        let entry = after.payment.adjustments.first().ok_or("no adjustment")?;

        assert_eq!(after.pricing.final_amount, 105_000);
        assert_eq!(after.pricing.additional_charges, 0);
        assert_eq!(entry.status, AdjustmentStatus::Failed);
        assert_eq!(entry.failure_message.as_deref(), Some("Your card was declined."));

        Ok(())
    }

    #[tokio::test]
    async fn incomplete_charge_keeps_intent_reference() -> TestResult {
        let booking = fixtures::booking()?;

        let mut gateway = MockPaymentGateway::new();

        gateway
            .expect_charge_off_session()
            .once()
            .return_once(|_charge| Ok(fixtures::intent("pi_adjust", "requires_action", 2_500)));

        let harness = seeded(gateway, quiet_notifier(), &booking).await?;

        let result = harness
            .service
            .apply_adjustment(
                booking.uuid,
                NewAdjustment {
                    amount: 2_500,
                    memo: "Late return".to_string(),
                    charge_now: true,
                },
            )
            .await;

        assert!(matches!(result, Err(BookingsServiceError::Gateway(_))));

        let after = stored(&harness, booking.uuid).await?;
        let entry = after.payment.adjustments.first().ok_or("no adjustment")?;

        assert_eq!(entry.status, AdjustmentStatus::Failed);
        assert_eq!(entry.payment_intent_id.as_deref(), Some("pi_adjust"));
        assert_eq!(after.pricing.final_amount, 105_000);

        Ok(())
    }

    #[tokio::test]
    async fn uncollectable_adjustment_after_final_payment_is_refused() -> TestResult {
        let mut booking = fixtures::booking()?;
        booking.status = BookingStatus::Active;
        booking.payment.final_intent_id = Some("pi_final".to_string());
        booking.payment.final_status = FinalPaymentStatus::Succeeded;

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_charge_off_session().never();

        let harness = seeded(gateway, quiet_notifier(), &booking).await?;

        let result = harness
            .service
            .apply_adjustment(
                booking.uuid,
                NewAdjustment {
                    amount: 2_500,
                    memo: "Fuel".to_string(),
                    charge_now: false,
                },
            )
            .await;

        assert!(matches!(result, Err(BookingsServiceError::PreconditionFailed(_))));

        let after = stored(&harness, booking.uuid).await?;

        assert!(after.payment.adjustments.is_empty());
        assert_eq!(after.pricing.final_amount, 105_000);

        Ok(())
    }

    #[tokio::test]
    async fn refund_without_collected_payment_is_refused() -> TestResult {
        let booking = fixtures::booking()?;

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_refund().never();

        let harness = seeded(gateway, quiet_notifier(), &booking).await?;

        let result = harness
            .service
            .apply_adjustment(
                booking.uuid,
                NewAdjustment {
                    amount: -50,
                    memo: "goodwill".to_string(),
                    charge_now: true,
                },
            )
            .await;

        assert!(matches!(result, Err(BookingsServiceError::PreconditionFailed(_))));
        assert!(stored(&harness, booking.uuid).await?.payment.adjustments.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn adjustment_cannot_drive_final_amount_negative() -> TestResult {
        let booking = fixtures::booking()?;
        let harness = seeded(MockPaymentGateway::new(), quiet_notifier(), &booking).await?;

        let result = harness
            .service
            .apply_adjustment(
                booking.uuid,
                NewAdjustment {
                    amount: -105_001,
                    memo: "too generous".to_string(),
                    charge_now: false,
                },
            )
            .await;

        assert!(matches!(result, Err(BookingsServiceError::Validation(_))));

        Ok(())
    }

    #[tokio::test]
    async fn final_charge_collects_balance_net_of_settled_adjustments() -> TestResult {
        let mut booking = BookingRecord {
            status: BookingStatus::Active,
            ..fixtures::booking()?
        };
        booking.pricing.final_amount = 107_500;
        booking.pricing.additional_charges = 2_500;
        booking.payment.adjustments.push(AdjustmentRecord {
            uuid: AdjustmentUuid::new(),
            amount: 2_500,
            memo: "Detailing".to_string(),
            status: AdjustmentStatus::Succeeded,
            payment_intent_id: Some("pi_detailing".to_string()),
            refund_id: None,
            failure_message: None,
            created_at: booking.created_at,
        });

        let mut gateway = MockPaymentGateway::new();

        gateway
            .expect_charge_off_session()
            .once()
            .withf(|charge| charge.amount == 105_000)
            .return_once(|_charge| Ok(fixtures::intent("pi_final", "succeeded", 105_000)));

        let harness = seeded(gateway, quiet_notifier(), &booking).await?;

        let charged = harness.service.charge_final_payment(booking.uuid).await?;

        assert_eq!(charged.payment.final_status, FinalPaymentStatus::Succeeded);
        assert_eq!(charged.payment.final_intent_id.as_deref(), Some("pi_final"));

        Ok(())
    }

    #[tokio::test]
    async fn final_charge_requires_confirmed_or_active() -> TestResult {
        let booking = fixtures::booking()?;

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_charge_off_session().never();

        let harness = seeded(gateway, quiet_notifier(), &booking).await?;

        let result = harness.service.charge_final_payment(booking.uuid).await;

        assert!(matches!(result, Err(BookingsServiceError::PreconditionFailed(_))));

        Ok(())
    }

    #[tokio::test]
    async fn reschedule_reports_delta_and_keeps_authorized_deposit() -> TestResult {
        let booking = fixtures::booking()?;
        let harness = seeded(MockPaymentGateway::new(), quiet_notifier(), &booking).await?;

        let outcome = harness
            .service
            .reschedule_booking(
                booking.uuid,
                Reschedule {
                    start_date: date(2026, 5, 1),
                    end_date: date(2026, 5, 6),
                    reason: "flight moved".to_string(),
                },
            )
            .await?;

        assert_eq!(outcome.pricing_delta, 100_000);
        assert_eq!(outcome.booking.pricing.subtotal, 250_000);
        assert_eq!(outcome.booking.pricing.deposit_amount, 45_000);
        assert_eq!(outcome.booking.pricing.final_amount, 205_000);
        assert_eq!(outcome.booking.status, BookingStatus::Pending);
        assert_eq!(outcome.booking.reschedules.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn reschedule_refuses_cancelled_booking() -> TestResult {
        let booking = BookingRecord {
            status: BookingStatus::Cancelled,
            ..fixtures::booking()?
        };

        let harness = seeded(MockPaymentGateway::new(), quiet_notifier(), &booking).await?;

        let result = harness
            .service
            .reschedule_booking(
                booking.uuid,
                Reschedule {
                    start_date: date(2026, 6, 1),
                    end_date: date(2026, 6, 3),
                    reason: "new plans".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(BookingsServiceError::PreconditionFailed(_))));

        Ok(())
    }

    #[tokio::test]
    async fn cancel_records_reason_and_refund() -> TestResult {
        let booking = fixtures::booking()?;

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_refund().never();

        let harness = seeded(gateway, quiet_notifier(), &booking).await?;

        let cancelled = harness
            .service
            .cancel_booking(
                booking.uuid,
                Cancellation {
                    reason: "customer request".to_string(),
                    refund_amount: 45_000,
                },
            )
            .await?;

        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert_eq!(
            cancelled.cancellation.map(|cancellation| cancellation.refund_amount),
            Some(45_000)
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_with_captured_funds_requires_force() -> TestResult {
        let mut booking = fixtures::booking()?;
        booking.payment.deposit_status = DepositStatus::Captured;

        let harness = seeded(MockPaymentGateway::new(), quiet_notifier(), &booking).await?;

        let refused = harness.service.delete_booking(booking.uuid, false).await;

        assert!(matches!(refused, Err(BookingsServiceError::PreconditionFailed(_))));

        harness.service.delete_booking(booking.uuid, true).await?;

        assert!(matches!(
            harness.service.get_booking(booking.uuid).await,
            Err(BookingsServiceError::NotFound)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn range_query_returns_overlapping_rentals() -> TestResult {
        let booking = fixtures::booking()?;
        let harness = seeded(MockPaymentGateway::new(), quiet_notifier(), &booking).await?;

        let overlapping = harness
            .service
            .list_bookings_in_range(date(2026, 5, 3), date(2026, 5, 10))
            .await?;
        let disjoint = harness
            .service
            .list_bookings_in_range(date(2026, 5, 4), date(2026, 5, 10))
            .await?;

        assert_eq!(overlapping.len(), 1);
        assert!(disjoint.is_empty(), "return day does not overlap");

        Ok(())
    }
}
