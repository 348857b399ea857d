//! Consolidated booking display status
//!
//! Admin views show a single label for a booking derived from its lifecycle
//! status together with both payment statuses. The mapping is a fixed
//! decision table evaluated top to bottom; the first matching row wins.

use serde::Serialize;

use super::{BookingStatus, DepositStatus, FinalPaymentStatus};

/// Visual emphasis for a display status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// Neutral, informational.
    Info,

    /// Needs admin attention soon.
    Warning,

    /// Settled.
    Success,

    /// A payment failed.
    Danger,

    /// No further action possible.
    Muted,
}

impl Tone {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Success => "success",
            Self::Danger => "danger",
            Self::Muted => "muted",
        }
    }
}

/// Human label for a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayStatus {
    /// Headline label.
    pub label: &'static str,

    /// Secondary explanation.
    pub sublabel: &'static str,

    /// Visual emphasis.
    pub tone: Tone,
}

const fn row(label: &'static str, sublabel: &'static str, tone: Tone) -> DisplayStatus {
    DisplayStatus {
        label,
        sublabel,
        tone,
    }
}

/// Project booking and payment statuses onto a single display status.
#[must_use]
pub const fn display_status(
    status: BookingStatus,
    deposit: DepositStatus,
    final_payment: FinalPaymentStatus,
) -> DisplayStatus {
    use BookingStatus as B;
    use DepositStatus as D;
    use FinalPaymentStatus as F;

    match (status, deposit, final_payment) {
        (B::Cancelled, _, _) => row("Cancelled", "Booking was cancelled", Tone::Muted),
        (_, D::Failed, _) => row(
            "Payment Failed",
            "Deposit authorization failed",
            Tone::Danger,
        ),
        (_, _, F::Failed) => row("Payment Failed", "Final payment failed", Tone::Danger),
        (B::Completed, _, F::Succeeded) => row("Completed", "Fully paid", Tone::Success),
        (B::Completed, _, F::Pending) => {
            row("Completed", "Final payment outstanding", Tone::Warning)
        }
        (B::Pending, D::Pending, _) => row(
            "Pending Payment",
            "Awaiting deposit authorization",
            Tone::Warning,
        ),
        (B::Pending, D::Authorized, _) => {
            row("Awaiting Confirmation", "Deposit authorized", Tone::Info)
        }
        (B::Pending, D::Captured, _) => {
            row("Awaiting Confirmation", "Deposit captured", Tone::Info)
        }
        (B::Confirmed | B::Active, _, F::Succeeded) => row(
            "Fully Paid",
            "Deposit and final payment received",
            Tone::Success,
        ),
        (B::Confirmed, D::Pending, F::Pending) => row(
            "Pending Payment",
            "Awaiting deposit authorization",
            Tone::Warning,
        ),
        (B::Confirmed, D::Authorized, F::Pending) => row(
            "Deposit Authorized",
            "Capture deposit before pickup",
            Tone::Info,
        ),
        (B::Confirmed, D::Captured, F::Pending) => {
            row("Final Payment Due", "Deposit captured", Tone::Warning)
        }
        (B::Active, D::Pending, F::Pending) => {
            row("Active Rental", "Deposit not yet authorized", Tone::Info)
        }
        (B::Active, D::Authorized, F::Pending) => row(
            "Active Rental",
            "Deposit authorized, not captured",
            Tone::Info,
        ),
        (B::Active, D::Captured, F::Pending) => {
            row("Final Payment Due", "Rental in progress", Tone::Warning)
        }
    }
}
