//! Booking Records

use jiff::{Timestamp, civil::Date};
use serde::{Deserialize, Serialize};

use prestige::{
    bookings::{BookingStatus, DepositStatus, DisplayStatus, FinalPaymentStatus, display_status},
    pricing::Pricing,
};

use crate::uuids::{KeyPrefix, TypedUuid};

/// Booking UUID
pub type BookingUuid = TypedUuid<BookingRecord>;

/// Adjustment UUID
pub type AdjustmentUuid = TypedUuid<AdjustmentRecord>;

/// Car details copied onto the booking when it is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarSnapshot {
    pub id: String,
    pub brand: String,
    pub model: String,
    pub year: u16,
    pub daily_price: u64,
}

/// Customer contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub drivers_license: String,
}

impl CustomerDetails {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Booking pricing, in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingPricing {
    pub daily_rate: u64,
    pub total_days: u32,
    pub subtotal: u64,
    pub deposit_amount: u64,

    /// Balance after the deposit, moved by applied adjustments.
    pub final_amount: u64,

    /// Net of all applied adjustments.
    pub additional_charges: i64,
}

impl BookingPricing {
    #[must_use]
    pub const fn from_pricing(pricing: Pricing) -> Self {
        Self {
            daily_rate: pricing.daily_rate,
            total_days: pricing.total_days,
            subtotal: pricing.subtotal,
            deposit_amount: pricing.deposit_amount,
            final_amount: pricing.final_amount,
            additional_charges: 0,
        }
    }

    /// The date-derived pricing, before adjustments.
    #[must_use]
    pub const fn base(&self) -> Pricing {
        Pricing {
            daily_rate: self.daily_rate,
            total_days: self.total_days,
            subtotal: self.subtotal,
            deposit_amount: self.deposit_amount,
            final_amount: self.subtotal.saturating_sub(self.deposit_amount),
        }
    }
}

/// Settlement state of a single adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentStatus {
    /// Bookkeeping only; no money moved.
    NotCharged,

    /// Recorded, gateway call in flight.
    Pending,

    /// Charged or refunded through the gateway.
    Succeeded,

    /// The gateway call failed; totals were not moved.
    Failed,
}

impl AdjustmentStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotCharged => "not_charged",
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    /// Whether the adjustment counts towards the booking totals.
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::NotCharged | Self::Succeeded)
    }
}

/// An additional charge (positive) or discount/refund (negative).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentRecord {
    pub uuid: AdjustmentUuid,
    pub amount: i64,
    pub memo: String,
    pub status: AdjustmentStatus,
    pub payment_intent_id: Option<String>,
    pub refund_id: Option<String>,
    pub failure_message: Option<String>,
    pub created_at: Timestamp,
}

/// Payment sub-record owned by a booking.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub deposit_intent_id: Option<String>,
    pub deposit_status: DepositStatus,
    pub final_intent_id: Option<String>,
    pub final_status: FinalPaymentStatus,
    pub adjustments: Vec<AdjustmentRecord>,
}

impl PaymentRecord {
    /// Net amount of adjustments already settled through the gateway.
    #[must_use]
    pub fn settled_adjustments(&self) -> i64 {
        self.adjustments
            .iter()
            .filter(|adjustment| adjustment.status == AdjustmentStatus::Succeeded)
            .map(|adjustment| adjustment.amount)
            .sum()
    }

    /// Whether the booking currently holds collected money.
    #[must_use]
    pub fn holds_captured_funds(&self) -> bool {
        self.deposit_status == DepositStatus::Captured
            || self.final_status == FinalPaymentStatus::Succeeded
    }
}

/// Why and when a booking was cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationRecord {
    pub reason: String,

    /// Amount to refund out of band.
    pub refund_amount: u64,

    pub cancelled_at: Timestamp,
}

/// One change of rental dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescheduleRecord {
    pub previous_start_date: Date,
    pub previous_end_date: Date,
    pub new_start_date: Date,
    pub new_end_date: Date,
    pub previous_subtotal: u64,
    pub new_subtotal: u64,
    pub pricing_delta: i64,
    pub reason: String,
    pub rescheduled_at: Timestamp,
}

/// Booking Record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub uuid: BookingUuid,
    pub customer_id: String,
    pub stripe_customer_id: String,
    pub payment_method_id: Option<String>,
    pub car: CarSnapshot,
    pub start_date: Date,
    pub end_date: Date,
    pub pricing: BookingPricing,
    pub customer: CustomerDetails,
    pub payment: PaymentRecord,
    pub status: BookingStatus,
    pub cancellation: Option<CancellationRecord>,
    pub reschedules: Vec<RescheduleRecord>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl KeyPrefix for BookingRecord {
    const KEY_PREFIX: &'static str = "booking";
}

impl BookingRecord {
    /// Consolidated label for admin views.
    #[must_use]
    pub const fn display_status(&self) -> DisplayStatus {
        display_status(
            self.status,
            self.payment.deposit_status,
            self.payment.final_status,
        )
    }

    /// Balance still to collect: the final amount less adjustments that
    /// already moved money on their own.
    #[must_use]
    pub fn outstanding_balance(&self) -> i64 {
        i64::try_from(self.pricing.final_amount)
            .unwrap_or(i64::MAX)
            .saturating_sub(self.payment.settled_adjustments())
    }

    /// Whether the rental overlaps the half-open range `[from, to)`.
    #[must_use]
    pub fn overlaps(&self, from: Date, to: Date) -> bool {
        self.start_date < to && self.end_date > from
    }
}
