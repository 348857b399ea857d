//! Booking and payment statuses

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A status string did not name a known status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown status: {0}")]
pub struct ParseStatusError(pub String);

/// Lifecycle state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Created, awaiting admin confirmation.
    Pending,

    /// Confirmed by an admin, vehicle not yet collected.
    Confirmed,

    /// Vehicle is with the customer.
    Active,

    /// Vehicle returned, rental closed.
    Completed,

    /// Cancelled before completion.
    Cancelled,
}

impl BookingStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled bookings accept no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether the lifecycle permits moving from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Confirmed, Self::Active)
                | (Self::Active, Self::Completed)
                | (
                    Self::Pending | Self::Confirmed | Self::Active,
                    Self::Cancelled
                )
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = ParseStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// State of the deposit payment intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositStatus {
    /// No usable authorization yet.
    #[default]
    Pending,

    /// Funds are held and can be captured.
    Authorized,

    /// Funds have been collected.
    Captured,

    /// Authorization failed or was canceled.
    Failed,
}

impl DepositStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Authorized => "authorized",
            Self::Captured => "captured",
            Self::Failed => "failed",
        }
    }

    /// Map a payment intent status string reported by the gateway.
    #[must_use]
    pub fn from_intent_status(status: &str) -> Self {
        match status {
            "requires_capture" => Self::Authorized,
            "succeeded" => Self::Captured,
            "canceled" | "requires_payment_method" => Self::Failed,
            _ => Self::Pending,
        }
    }

    const fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Authorized => 1,
            Self::Captured | Self::Failed => 2,
        }
    }

    /// Status after a gateway report arrives. Reports may arrive out of
    /// order, so the status never moves backwards and `Captured` is final.
    #[must_use]
    pub const fn advance(self, reported: Self) -> Self {
        match (self, reported) {
            (Self::Captured, _) | (_, Self::Captured) => Self::Captured,
            _ if reported.rank() >= self.rank() => reported,
            _ => self,
        }
    }
}

impl fmt::Display for DepositStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of the final (balance) payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalPaymentStatus {
    /// Balance not yet collected.
    #[default]
    Pending,

    /// Balance collected.
    Succeeded,

    /// The last collection attempt failed.
    Failed,
}

impl FinalPaymentStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    /// Map a payment intent status string reported by the gateway.
    #[must_use]
    pub fn from_intent_status(status: &str) -> Self {
        match status {
            "succeeded" => Self::Succeeded,
            "canceled" | "requires_payment_method" => Self::Failed,
            _ => Self::Pending,
        }
    }

    /// Status after a gateway report arrives. `Succeeded` is final and a
    /// failure is not undone by a stale in-flight report.
    #[must_use]
    pub const fn advance(self, reported: Self) -> Self {
        match (self, reported) {
            (Self::Succeeded, _) | (_, Self::Succeeded) => Self::Succeeded,
            (Self::Failed, Self::Pending) => Self::Failed,
            _ => reported,
        }
    }
}

impl fmt::Display for FinalPaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
