//! Rental Pricing

use jiff::{Unit, civil::Date};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Share of the subtotal collected up front as a deposit, in percent.
pub const DEPOSIT_PERCENT: i64 = 30;

/// Errors that can occur while pricing a rental.
#[derive(Debug, Error)]
pub enum PricingError {
    /// The return date is not after the pickup date.
    #[error("end date {end} must be after start date {start}")]
    InvalidRange {
        /// Requested pickup date.
        start: Date,
        /// Requested return date.
        end: Date,
    },

    /// The number of days between the dates could not be computed.
    #[error("could not compute rental length")]
    Span(#[from] jiff::Error),

    /// An amount exceeded the representable range.
    #[error("rental amount overflowed")]
    Overflow,
}

/// Pricing breakdown for a rental, all amounts in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    /// Per-day rate the rental was priced at.
    pub daily_rate: u64,

    /// Number of rental days.
    pub total_days: u32,

    /// `total_days * daily_rate`.
    pub subtotal: u64,

    /// Deposit collected up front.
    pub deposit_amount: u64,

    /// Remainder due after the deposit.
    pub final_amount: u64,
}

/// Price a rental of `daily_rate` per day between two calendar dates.
///
/// # Errors
///
/// - [`PricingError::InvalidRange`]: `end_date` is on or before `start_date`.
/// - [`PricingError::Overflow`]: the subtotal does not fit the amount type.
pub fn compute_pricing(
    daily_rate: u64,
    start_date: Date,
    end_date: Date,
) -> Result<Pricing, PricingError> {
    let total_days = rental_days(start_date, end_date)?;

    let subtotal = daily_rate
        .checked_mul(u64::from(total_days))
        .ok_or(PricingError::Overflow)?;

    let deposit_amount = deposit_for(subtotal)?;

    Ok(Pricing {
        daily_rate,
        total_days,
        subtotal,
        deposit_amount,
        final_amount: subtotal - deposit_amount,
    })
}

/// Whole days between two calendar dates.
///
/// # Errors
///
/// Returns [`PricingError::InvalidRange`] when `end_date <= start_date`.
pub fn rental_days(start_date: Date, end_date: Date) -> Result<u32, PricingError> {
    if end_date <= start_date {
        return Err(PricingError::InvalidRange {
            start: start_date,
            end: end_date,
        });
    }

    let span = start_date.until((Unit::Day, end_date))?;

    u32::try_from(span.get_days()).map_err(|_negative| PricingError::Overflow)
}

/// Deposit owed for a subtotal: 30%, rounded half away from zero.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the result cannot be represented.
pub fn deposit_for(subtotal: u64) -> Result<u64, PricingError> {
    let applied = Decimal::from(subtotal)
        .checked_mul(Decimal::new(DEPOSIT_PERCENT, 2))
        .ok_or(PricingError::Overflow)?;

    applied
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or(PricingError::Overflow)
}

/// Signed change in subtotal when moving from `previous` to `next`.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if either subtotal exceeds `i64`.
pub fn pricing_delta(previous: &Pricing, next: &Pricing) -> Result<i64, PricingError> {
    let previous = i64::try_from(previous.subtotal).map_err(|_too_large| PricingError::Overflow)?;
    let next = i64::try_from(next.subtotal).map_err(|_too_large| PricingError::Overflow)?;

    next.checked_sub(previous).ok_or(PricingError::Overflow)
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn three_day_rental_at_500() -> TestResult {
        let pricing = compute_pricing(500, date(2026, 3, 1), date(2026, 3, 4))?;

        assert_eq!(pricing.total_days, 3);
        assert_eq!(pricing.subtotal, 1500);
        assert_eq!(pricing.deposit_amount, 450);
        assert_eq!(pricing.final_amount, 1050);

        Ok(())
    }

    #[test]
    fn deposit_rounds_half_away_from_zero() -> TestResult {
        // 30% of 5 is 1.5
        assert_eq!(deposit_for(5)?, 2);
        // 30% of 1 is 0.3
        assert_eq!(deposit_for(1)?, 0);

        Ok(())
    }

    #[test]
    fn same_day_range_is_invalid() {
        let result = compute_pricing(500, date(2026, 3, 1), date(2026, 3, 1));

        assert!(
            matches!(result, Err(PricingError::InvalidRange { .. })),
            "expected InvalidRange, got {result:?}"
        );
    }

    #[test]
    fn reversed_range_is_invalid() {
        let result = compute_pricing(500, date(2026, 3, 5), date(2026, 3, 1));

        assert!(
            matches!(result, Err(PricingError::InvalidRange { .. })),
            "expected InvalidRange, got {result:?}"
        );
    }

    #[test]
    fn range_across_month_boundary() -> TestResult {
        assert_eq!(rental_days(date(2026, 2, 27), date(2026, 3, 2))?, 3);

        Ok(())
    }

    #[test]
    fn subtotal_overflow_is_reported() {
        let result = compute_pricing(u64::MAX, date(2026, 3, 1), date(2026, 3, 3));

        assert!(
            matches!(result, Err(PricingError::Overflow)),
            "expected Overflow, got {result:?}"
        );
    }

    #[test]
    fn delta_for_extended_rental() -> TestResult {
        let before = compute_pricing(500, date(2026, 3, 1), date(2026, 3, 4))?;
        let after = compute_pricing(500, date(2026, 3, 1), date(2026, 3, 6))?;

        assert_eq!(pricing_delta(&before, &after)?, 1000);
        assert_eq!(pricing_delta(&after, &before)?, -1000);

        Ok(())
    }
}
