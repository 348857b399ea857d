//! Invoice Records

use jiff::{Timestamp, civil::Date};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use prestige::invoices::{InvoiceStatus, LineItem};

use crate::uuids::{KeyPrefix, TypedUuid};

/// Invoice UUID
pub type InvoiceUuid = TypedUuid<InvoiceRecord>;

/// Who the invoice is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceCustomer {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Up-front payment requested before the invoice is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DepositRequirement {
    pub required: bool,
    pub amount: u64,
}

/// Invoice Record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub uuid: InvoiceUuid,

    /// `INV-YYYYMMDD-NNNN`
    pub number: String,

    pub customer: InvoiceCustomer,
    pub items: Vec<LineItem>,

    /// Percent, e.g. `8.25`.
    pub tax_rate: Decimal,

    pub discount_amount: u64,
    pub subtotal: u64,
    pub tax_amount: u64,
    pub total_amount: u64,
    pub deposit: DepositRequirement,
    pub issue_date: Date,
    pub due_date: Date,
    pub notes: Option<String>,
    pub status: InvoiceStatus,
    pub sent_at: Option<Timestamp>,
    pub paid_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl KeyPrefix for InvoiceRecord {
    const KEY_PREFIX: &'static str = "invoice";
}

impl InvoiceRecord {
    /// Copy with the stored status replaced by the one seen on `today`.
    #[must_use]
    pub fn at(mut self, today: Date) -> Self {
        self.status = self.status.effective(self.due_date, today);
        self
    }
}
