//! Invoice Models

use std::{str::FromStr, string::ToString};

use rust_decimal::Decimal;
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use prestige::invoices::{LineItem, LineItemInput};
use prestige_app::domain::invoices::{
    data::InvoiceDraft,
    records::{DepositRequirement, InvoiceCustomer, InvoiceRecord},
};

use crate::{envelope::ApiError, extensions::parse_date};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct BillTo {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl From<BillTo> for InvoiceCustomer {
    fn from(customer: BillTo) -> Self {
        InvoiceCustomer {
            name: customer.name,
            email: customer.email,
            phone: customer.phone,
            address: customer.address,
        }
    }
}

impl From<InvoiceCustomer> for BillTo {
    fn from(customer: InvoiceCustomer) -> Self {
        BillTo {
            name: customer.name,
            email: customer.email,
            phone: customer.phone,
            address: customer.address,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct LineItemRequest {
    pub description: String,
    pub quantity: u32,

    /// Cents
    pub unit_price: u64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct Deposit {
    #[serde(default)]
    pub required: bool,

    /// Cents, between 1 and the invoice total when required
    #[serde(default)]
    pub amount: u64,
}

/// Invoice contents, used to create and to replace an invoice.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct InvoiceRequest {
    pub customer: BillTo,
    pub items: Vec<LineItemRequest>,

    /// Percent as a decimal string, e.g. `"8.25"`
    #[serde(default)]
    pub tax_rate: Option<String>,

    /// Cents
    #[serde(default)]
    pub discount_amount: u64,

    #[serde(default)]
    pub deposit: Deposit,

    /// `YYYY-MM-DD`; today when absent
    pub issue_date: Option<String>,

    /// `YYYY-MM-DD`
    pub due_date: String,

    pub notes: Option<String>,
}

impl TryFrom<InvoiceRequest> for InvoiceDraft {
    type Error = ApiError;

    fn try_from(request: InvoiceRequest) -> Result<Self, Self::Error> {
        let tax_rate = match request.tax_rate.as_deref().map(str::trim) {
            None | Some("") => Decimal::ZERO,
            Some(rate) => Decimal::from_str(rate).map_err(|_parse| {
                ApiError::bad_request("tax_rate must be a decimal number")
            })?,
        };

        Ok(InvoiceDraft {
            customer: request.customer.into(),
            items: request
                .items
                .into_iter()
                .map(|item| LineItemInput {
                    description: item.description,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                })
                .collect(),
            tax_rate,
            discount_amount: request.discount_amount,
            deposit: DepositRequirement {
                required: request.deposit.required,
                amount: request.deposit.amount,
            },
            issue_date: request
                .issue_date
                .as_deref()
                .map(|value| parse_date("issue_date", value))
                .transpose()?,
            due_date: parse_date("due_date", &request.due_date)?,
            notes: request.notes,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct LineItemResponse {
    pub description: String,
    pub quantity: u32,
    pub unit_price: u64,

    /// Quantity times unit price
    pub amount: u64,
}

impl From<LineItem> for LineItemResponse {
    fn from(item: LineItem) -> Self {
        LineItemResponse {
            description: item.description,
            quantity: item.quantity,
            unit_price: item.unit_price,
            amount: item.amount,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct InvoiceResponse {
    /// The unique identifier of the invoice
    pub uuid: Uuid,

    /// `INV-YYYYMMDD-NNNN`
    pub number: String,

    pub customer: BillTo,
    pub items: Vec<LineItemResponse>,

    /// Percent as a decimal string
    pub tax_rate: String,

    pub discount_amount: u64,
    pub subtotal: u64,
    pub tax_amount: u64,
    pub total_amount: u64,
    pub deposit: Deposit,
    pub issue_date: String,
    pub due_date: String,
    pub notes: Option<String>,

    /// `draft`, `sent`, `paid`, `overdue` or `cancelled`
    pub status: String,

    pub sent_at: Option<String>,
    pub paid_at: Option<String>,
    pub cancelled_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<InvoiceRecord> for InvoiceResponse {
    fn from(invoice: InvoiceRecord) -> Self {
        InvoiceResponse {
            uuid: invoice.uuid.into(),
            number: invoice.number,
            customer: invoice.customer.into(),
            items: invoice.items.into_iter().map(Into::into).collect(),
            tax_rate: invoice.tax_rate.normalize().to_string(),
            discount_amount: invoice.discount_amount,
            subtotal: invoice.subtotal,
            tax_amount: invoice.tax_amount,
            total_amount: invoice.total_amount,
            deposit: Deposit {
                required: invoice.deposit.required,
                amount: invoice.deposit.amount,
            },
            issue_date: invoice.issue_date.to_string(),
            due_date: invoice.due_date.to_string(),
            notes: invoice.notes,
            status: invoice.status.to_string(),
            sent_at: invoice.sent_at.as_ref().map(ToString::to_string),
            paid_at: invoice.paid_at.as_ref().map(ToString::to_string),
            cancelled_at: invoice.cancelled_at.as_ref().map(ToString::to_string),
            created_at: invoice.created_at.to_string(),
            updated_at: invoice.updated_at.to_string(),
        }
    }
}
