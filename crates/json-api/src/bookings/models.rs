//! Booking Models

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use prestige_app::domain::bookings::records::{
    AdjustmentRecord, BookingRecord, CancellationRecord, CarSnapshot, CustomerDetails,
    PaymentRecord, RescheduleRecord,
};

/// Car details as booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct Car {
    pub id: String,
    pub brand: String,
    pub model: String,
    pub year: u16,

    /// Daily price in cents
    pub daily_price: u64,
}

impl From<Car> for CarSnapshot {
    fn from(car: Car) -> Self {
        CarSnapshot {
            id: car.id,
            brand: car.brand,
            model: car.model,
            year: car.year,
            daily_price: car.daily_price,
        }
    }
}

impl From<CarSnapshot> for Car {
    fn from(car: CarSnapshot) -> Self {
        Car {
            id: car.id,
            brand: car.brand,
            model: car.model,
            year: car.year,
            daily_price: car.daily_price,
        }
    }
}

/// Customer contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub drivers_license: String,
}

impl From<Customer> for CustomerDetails {
    fn from(customer: Customer) -> Self {
        CustomerDetails {
            first_name: customer.first_name,
            last_name: customer.last_name,
            email: customer.email,
            phone: customer.phone,
            drivers_license: customer.drivers_license,
        }
    }
}

impl From<CustomerDetails> for Customer {
    fn from(customer: CustomerDetails) -> Self {
        Customer {
            first_name: customer.first_name,
            last_name: customer.last_name,
            email: customer.email,
            phone: customer.phone,
            drivers_license: customer.drivers_license,
        }
    }
}

/// Booking pricing in cents.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PricingResponse {
    pub daily_rate: u64,
    pub total_days: u32,
    pub subtotal: u64,
    pub deposit_amount: u64,

    /// Balance after the deposit, including applied adjustments
    pub final_amount: u64,

    /// Net of applied adjustments
    pub additional_charges: i64,

    /// Final amount less adjustments already settled through the gateway
    pub outstanding_balance: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AdjustmentResponse {
    pub uuid: Uuid,

    /// Positive for a charge, negative for a refund
    pub amount: i64,

    pub memo: String,

    /// `not_charged`, `pending`, `succeeded` or `failed`
    pub status: String,

    pub payment_intent_id: Option<String>,
    pub refund_id: Option<String>,
    pub failure_message: Option<String>,
    pub created_at: String,
}

impl From<AdjustmentRecord> for AdjustmentResponse {
    fn from(adjustment: AdjustmentRecord) -> Self {
        AdjustmentResponse {
            uuid: adjustment.uuid.into(),
            amount: adjustment.amount,
            memo: adjustment.memo,
            status: adjustment.status.as_str().to_string(),
            payment_intent_id: adjustment.payment_intent_id,
            refund_id: adjustment.refund_id,
            failure_message: adjustment.failure_message,
            created_at: adjustment.created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentResponse {
    pub deposit_intent_id: Option<String>,
    pub deposit_status: String,
    pub final_intent_id: Option<String>,
    pub final_status: String,
    pub adjustments: Vec<AdjustmentResponse>,
}

impl From<PaymentRecord> for PaymentResponse {
    fn from(payment: PaymentRecord) -> Self {
        PaymentResponse {
            deposit_intent_id: payment.deposit_intent_id,
            deposit_status: payment.deposit_status.to_string(),
            final_intent_id: payment.final_intent_id,
            final_status: payment.final_status.to_string(),
            adjustments: payment.adjustments.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DisplayStatusResponse {
    pub label: String,
    pub sublabel: String,

    /// `info`, `warning`, `success`, `danger` or `muted`
    pub tone: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CancellationResponse {
    pub reason: String,
    pub refund_amount: u64,
    pub cancelled_at: String,
}

impl From<CancellationRecord> for CancellationResponse {
    fn from(cancellation: CancellationRecord) -> Self {
        CancellationResponse {
            reason: cancellation.reason,
            refund_amount: cancellation.refund_amount,
            cancelled_at: cancellation.cancelled_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RescheduleResponse {
    pub previous_start_date: String,
    pub previous_end_date: String,
    pub new_start_date: String,
    pub new_end_date: String,
    pub previous_subtotal: u64,
    pub new_subtotal: u64,
    pub pricing_delta: i64,
    pub reason: String,
    pub rescheduled_at: String,
}

impl From<RescheduleRecord> for RescheduleResponse {
    fn from(reschedule: RescheduleRecord) -> Self {
        RescheduleResponse {
            previous_start_date: reschedule.previous_start_date.to_string(),
            previous_end_date: reschedule.previous_end_date.to_string(),
            new_start_date: reschedule.new_start_date.to_string(),
            new_end_date: reschedule.new_end_date.to_string(),
            previous_subtotal: reschedule.previous_subtotal,
            new_subtotal: reschedule.new_subtotal,
            pricing_delta: reschedule.pricing_delta,
            reason: reschedule.reason,
            rescheduled_at: reschedule.rescheduled_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BookingResponse {
    /// The unique identifier of the booking
    pub uuid: Uuid,

    pub customer_id: String,
    pub stripe_customer_id: String,
    pub payment_method_id: Option<String>,
    pub car: Car,

    /// First rental day, `YYYY-MM-DD`
    pub start_date: String,

    /// Return day, `YYYY-MM-DD`
    pub end_date: String,

    pub pricing: PricingResponse,
    pub customer: Customer,
    pub payment: PaymentResponse,

    /// `pending`, `confirmed`, `active`, `completed` or `cancelled`
    pub status: String,

    /// Consolidated label for admin views
    pub display_status: DisplayStatusResponse,

    pub cancellation: Option<CancellationResponse>,
    pub reschedules: Vec<RescheduleResponse>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<BookingRecord> for BookingResponse {
    fn from(booking: BookingRecord) -> Self {
        let display = booking.display_status();
        let outstanding_balance = booking.outstanding_balance();

        BookingResponse {
            uuid: booking.uuid.into(),
            customer_id: booking.customer_id,
            stripe_customer_id: booking.stripe_customer_id,
            payment_method_id: booking.payment_method_id,
            car: booking.car.into(),
            start_date: booking.start_date.to_string(),
            end_date: booking.end_date.to_string(),
            pricing: PricingResponse {
                daily_rate: booking.pricing.daily_rate,
                total_days: booking.pricing.total_days,
                subtotal: booking.pricing.subtotal,
                deposit_amount: booking.pricing.deposit_amount,
                final_amount: booking.pricing.final_amount,
                additional_charges: booking.pricing.additional_charges,
                outstanding_balance,
            },
            customer: booking.customer.into(),
            payment: booking.payment.into(),
            status: booking.status.to_string(),
            display_status: DisplayStatusResponse {
                label: display.label.to_string(),
                sublabel: display.sublabel.to_string(),
                tone: display.tone.as_str().to_string(),
            },
            cancellation: booking.cancellation.map(Into::into),
            reschedules: booking.reschedules.into_iter().map(Into::into).collect(),
            notes: booking.notes,
            created_at: booking.created_at.to_string(),
            updated_at: booking.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BookingsResponse {
    /// The list of bookings
    pub bookings: Vec<BookingResponse>,
}

impl From<Vec<BookingRecord>> for BookingsResponse {
    fn from(bookings: Vec<BookingRecord>) -> Self {
        BookingsResponse {
            bookings: bookings.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use prestige::bookings::{BookingStatus, DepositStatus, FinalPaymentStatus};
    use prestige_app::domain::bookings::records::BookingUuid;

    use crate::test_helpers::make_booking;

    use super::*;

    #[test]
    fn response_carries_display_status_and_balance() {
        let mut booking = make_booking(BookingUuid::new());

        booking.status = BookingStatus::Confirmed;
        booking.payment.deposit_status = DepositStatus::Captured;
        booking.payment.final_status = FinalPaymentStatus::Pending;

        let response = BookingResponse::from(booking);

        assert_eq!(response.status, "confirmed");
        assert_eq!(response.display_status.label, "Final Payment Due");
        assert_eq!(response.display_status.tone, "warning");
        assert_eq!(response.pricing.outstanding_balance, 105_000);
        assert_eq!(response.start_date, "2026-05-01");
    }
}
