//! Rental agreements
//!
//! Status and expiry rules for agreements sent to customers for signing.
//! Expiry is never stored; a pending agreement whose deadline has passed
//! reads as expired.

use std::fmt;

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Days an agreement stays open when the sender does not say otherwise.
pub const DEFAULT_EXPIRATION_DAYS: u32 = 7;

/// Longest allowed signing window, in days.
pub const MAX_EXPIRATION_DAYS: u32 = 30;

/// Errors from agreement rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AgreementError {
    /// Requested window is outside `1..=30` days.
    #[error("expiration must be between 1 and {MAX_EXPIRATION_DAYS} days, got {0}")]
    ExpirationDays(u32),

    /// The deadline could not be represented.
    #[error("agreement deadline out of range")]
    Deadline,
}

/// Lifecycle state of an agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementStatus {
    /// Sent, awaiting signature.
    #[default]
    Pending,

    /// Signed by the customer.
    Completed,

    /// Deadline passed while pending. Computed on read only.
    Expired,

    /// Replaced by a newer agreement for the same booking.
    Superseded,
}

impl AgreementStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Expired => "expired",
            Self::Superseded => "superseded",
        }
    }

    /// Status as seen at `now`.
    #[must_use]
    pub fn effective(self, expires_at: Timestamp, now: Timestamp) -> Self {
        match self {
            Self::Pending if now >= expires_at => Self::Expired,
            other => other,
        }
    }
}

impl fmt::Display for AgreementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the requested signing window, applying the default.
///
/// # Errors
///
/// Returns [`AgreementError::ExpirationDays`] outside `1..=30`.
pub fn expiration_days(requested: Option<u32>) -> Result<u32, AgreementError> {
    let days = requested.unwrap_or(DEFAULT_EXPIRATION_DAYS);

    if (1..=MAX_EXPIRATION_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(AgreementError::ExpirationDays(days))
    }
}

/// Deadline for an agreement sent at `sent_at` with a window of `days`.
///
/// # Errors
///
/// Returns [`AgreementError::Deadline`] if the result overflows.
pub fn expires_at(sent_at: Timestamp, days: u32) -> Result<Timestamp, AgreementError> {
    let window = SignedDuration::from_hours(i64::from(days) * 24);

    sent_at
        .checked_add(window)
        .map_err(|_overflow| AgreementError::Deadline)
}

/// Term acknowledgments the customer must accept before signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Acknowledgments {
    /// Rental terms and conditions.
    pub terms_and_conditions: bool,

    /// Damage and liability policy.
    pub damage_policy: bool,

    /// Fuel and mileage policy.
    pub fuel_policy: bool,

    /// Insurance coverage and excess.
    pub insurance_coverage: bool,

    /// Late return fees.
    pub late_return_policy: bool,
}

impl Acknowledgments {
    /// Whether every term was accepted.
    #[must_use]
    pub const fn all_accepted(&self) -> bool {
        self.terms_and_conditions
            && self.damage_policy
            && self.fuel_policy
            && self.insurance_coverage
            && self.late_return_policy
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn default_window_is_a_week() -> TestResult {
        assert_eq!(expiration_days(None)?, 7);
        assert_eq!(expiration_days(Some(30))?, 30);

        Ok(())
    }

    #[test]
    fn window_bounds_are_enforced() {
        assert_eq!(expiration_days(Some(0)), Err(AgreementError::ExpirationDays(0)));
        assert_eq!(
            expiration_days(Some(31)),
            Err(AgreementError::ExpirationDays(31))
        );
    }

    #[test]
    fn pending_agreement_expires_at_deadline() -> TestResult {
        let sent_at: Timestamp = "2026-03-01T12:00:00Z".parse()?;
        let deadline = expires_at(sent_at, 7)?;

        assert_eq!(deadline, "2026-03-08T12:00:00Z".parse::<Timestamp>()?);
        assert_eq!(
            AgreementStatus::Pending.effective(deadline, sent_at),
            AgreementStatus::Pending
        );
        assert_eq!(
            AgreementStatus::Pending.effective(deadline, deadline),
            AgreementStatus::Expired
        );

        Ok(())
    }

    #[test]
    fn signed_agreements_never_expire() -> TestResult {
        let deadline: Timestamp = "2026-03-08T12:00:00Z".parse()?;
        let later: Timestamp = "2026-04-01T00:00:00Z".parse()?;

        assert_eq!(
            AgreementStatus::Completed.effective(deadline, later),
            AgreementStatus::Completed
        );
        assert_eq!(
            AgreementStatus::Superseded.effective(deadline, later),
            AgreementStatus::Superseded
        );

        Ok(())
    }

    #[test]
    fn every_acknowledgment_is_required() {
        let mut acks = Acknowledgments {
            terms_and_conditions: true,
            damage_policy: true,
            fuel_policy: true,
            insurance_coverage: true,
            late_return_policy: true,
        };

        assert!(acks.all_accepted());

        acks.fuel_policy = false;

        assert!(!acks.all_accepted());
    }
}
