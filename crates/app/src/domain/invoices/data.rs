//! Invoices Data

use jiff::civil::Date;
use rust_decimal::Decimal;

use prestige::invoices::LineItemInput;

use crate::domain::invoices::records::{DepositRequirement, InvoiceCustomer};

/// Invoice contents, used for both create and full update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDraft {
    pub customer: InvoiceCustomer,
    pub items: Vec<LineItemInput>,
    pub tax_rate: Decimal,
    pub discount_amount: u64,
    pub deposit: DepositRequirement,

    /// Today when absent.
    pub issue_date: Option<Date>,

    pub due_date: Date,
    pub notes: Option<String>,
}
