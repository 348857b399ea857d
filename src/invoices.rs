//! Invoices
//!
//! Totals, numbering and the invoice status machine. Invoices are
//! independent of bookings; they carry their own customer snapshot and line
//! items.

use std::{fmt, str::FromStr};

use jiff::civil::Date;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bookings::ParseStatusError;

/// Errors that can occur while computing invoice totals.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvoiceError {
    /// A line item has a zero quantity.
    #[error("line item {index} has zero quantity")]
    ZeroQuantity {
        /// Position of the offending item.
        index: usize,
    },

    /// The tax rate is negative or above 100%.
    #[error("tax rate {0} must be between 0 and 100")]
    TaxRate(Decimal),

    /// An amount exceeded the representable range.
    #[error("invoice amount overflowed")]
    Overflow,
}

/// Stored invoice status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Being prepared, not yet sent to the customer.
    #[default]
    Draft,

    /// Sent to the customer, awaiting payment.
    Sent,

    /// Settled. Paid invoices are immutable.
    Paid,

    /// Sent and past its due date.
    Overdue,

    /// Voided.
    Cancelled,
}

impl InvoiceStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }

    /// Status as seen on `today`: a sent invoice past its due date reads as
    /// overdue.
    #[must_use]
    pub fn effective(self, due_date: Date, today: Date) -> Self {
        match self {
            Self::Sent if today > due_date => Self::Overdue,
            other => other,
        }
    }

    /// Paid invoices reject every mutation.
    #[must_use]
    pub const fn is_locked(self) -> bool {
        matches!(self, Self::Paid)
    }

    /// Whether an invoice in this status may be marked sent.
    #[must_use]
    pub const fn can_send(self) -> bool {
        matches!(self, Self::Draft | Self::Sent | Self::Overdue)
    }

    /// Whether an invoice in this status may be marked paid.
    #[must_use]
    pub const fn can_pay(self) -> bool {
        matches!(self, Self::Draft | Self::Sent | Self::Overdue)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = ParseStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "draft" => Ok(Self::Draft),
            "sent" => Ok(Self::Sent),
            "paid" => Ok(Self::Paid),
            "overdue" => Ok(Self::Overdue),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// A billable line before totals are computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemInput {
    /// What is being billed.
    pub description: String,

    /// Number of units.
    pub quantity: u32,

    /// Price per unit, in minor units.
    pub unit_price: u64,
}

/// A billable line with its computed amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// What is being billed.
    pub description: String,

    /// Number of units.
    pub quantity: u32,

    /// Price per unit, in minor units.
    pub unit_price: u64,

    /// `quantity * unit_price`.
    pub amount: u64,
}

/// Computed invoice totals, in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Line items with their amounts.
    pub items: Vec<LineItem>,

    /// Sum of line item amounts.
    pub subtotal: u64,

    /// Discount applied before tax.
    pub discount_amount: u64,

    /// Tax on the discounted subtotal.
    pub tax_amount: u64,

    /// Amount due.
    pub total_amount: u64,
}

/// Compute line amounts and totals.
///
/// The discount is taken off before tax and the taxable base never drops
/// below zero, so an oversized discount yields a zero total.
///
/// # Errors
///
/// - [`InvoiceError::ZeroQuantity`]: a line has no units.
/// - [`InvoiceError::TaxRate`]: the rate is outside `0..=100`.
/// - [`InvoiceError::Overflow`]: an amount does not fit the amount type.
pub fn compute_totals(
    items: Vec<LineItemInput>,
    tax_rate: Decimal,
    discount_amount: u64,
) -> Result<InvoiceTotals, InvoiceError> {
    if tax_rate.is_sign_negative() || tax_rate > Decimal::ONE_HUNDRED {
        return Err(InvoiceError::TaxRate(tax_rate));
    }

    let mut subtotal: u64 = 0;
    let mut lines = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        if item.quantity == 0 {
            return Err(InvoiceError::ZeroQuantity { index });
        }

        let amount = item
            .unit_price
            .checked_mul(u64::from(item.quantity))
            .ok_or(InvoiceError::Overflow)?;

        subtotal = subtotal.checked_add(amount).ok_or(InvoiceError::Overflow)?;

        lines.push(LineItem {
            description: item.description,
            quantity: item.quantity,
            unit_price: item.unit_price,
            amount,
        });
    }

    let taxable = subtotal.saturating_sub(discount_amount);
    let tax_amount = tax_on(taxable, tax_rate)?;
    let total_amount = taxable
        .checked_add(tax_amount)
        .ok_or(InvoiceError::Overflow)?;

    Ok(InvoiceTotals {
        items: lines,
        subtotal,
        discount_amount,
        tax_amount,
        total_amount,
    })
}

fn tax_on(taxable: u64, tax_rate: Decimal) -> Result<u64, InvoiceError> {
    let Some(applied) = Decimal::from(taxable).checked_mul(tax_rate) else {
        return Err(InvoiceError::Overflow);
    };

    let Some(scaled) = applied.checked_div(Decimal::ONE_HUNDRED) else {
        return Err(InvoiceError::Overflow);
    };

    scaled
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or(InvoiceError::Overflow)
}

/// Format an invoice number: `INV-YYYYMMDD-NNNN`.
///
/// Sequences above 9999 widen the numeric suffix rather than wrap.
#[must_use]
pub fn invoice_number(issued_on: Date, sequence: u64) -> String {
    format!("INV-{}-{sequence:04}", issued_on.strftime("%Y%m%d"))
}
