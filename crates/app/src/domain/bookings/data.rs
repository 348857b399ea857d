//! Bookings Data

use jiff::civil::Date;

use crate::domain::bookings::records::{BookingRecord, CarSnapshot, CustomerDetails};

/// New Booking Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub customer_id: String,
    pub stripe_customer_id: String,
    pub payment_method_id: Option<String>,
    pub car: CarSnapshot,
    pub start_date: Date,
    pub end_date: Date,
    pub customer: CustomerDetails,
    pub notes: Option<String>,
}

/// Booking Update Data
///
/// Replaces the customer contact details and admin notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingUpdate {
    pub customer: CustomerDetails,
    pub notes: Option<String>,
}

/// New Adjustment Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAdjustment {
    /// Positive for a charge, negative for a discount or refund.
    pub amount: i64,
    pub memo: String,

    /// Move money through the gateway instead of only recording it.
    pub charge_now: bool,
}

/// Reschedule Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reschedule {
    pub start_date: Date,
    pub end_date: Date,
    pub reason: String,
}

/// Cancellation Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cancellation {
    pub reason: String,
    pub refund_amount: u64,
}

/// A rescheduled booking and the change in its subtotal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RescheduleOutcome {
    pub booking: BookingRecord,
    pub pricing_delta: i64,
}
