//! Invoices service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::{Timestamp, civil::Date, tz::TimeZone};
use mockall::automock;
use rust_decimal::Decimal;
use tracing::info;

use prestige::invoices::{InvoiceStatus, InvoiceTotals, compute_totals, invoice_number};

use crate::{
    domain::{
        invoices::{
            data::InvoiceDraft,
            errors::InvoicesServiceError,
            records::{DepositRequirement, InvoiceCustomer, InvoiceRecord, InvoiceUuid},
            repository::InvoicesRepository,
        },
        validation,
    },
    store::KvStore,
};

#[derive(Clone)]
pub struct KvInvoicesService {
    repository: InvoicesRepository,
}

impl KvInvoicesService {
    #[must_use]
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            repository: InvoicesRepository::new(store),
        }
    }

    /// Load a stored invoice, refusing paid ones.
    async fn load_unlocked(
        &self,
        invoice: InvoiceUuid,
    ) -> Result<InvoiceRecord, InvoicesServiceError> {
        let Some(record) = self.repository.get_invoice(invoice).await? else {
            return Err(InvoicesServiceError::NotFound);
        };

        if record.status.is_locked() {
            return Err(InvoicesServiceError::PreconditionFailed(format!(
                "invoice {} is paid and can no longer change",
                record.number
            )));
        }

        Ok(record)
    }

    async fn set_status(
        &self,
        mut record: InvoiceRecord,
        status: InvoiceStatus,
    ) -> Result<InvoiceRecord, InvoicesServiceError> {
        let now = Timestamp::now();

        match status {
            InvoiceStatus::Sent => record.sent_at = Some(now),
            InvoiceStatus::Paid => record.paid_at = Some(now),
            InvoiceStatus::Cancelled => record.cancelled_at = Some(now),
            InvoiceStatus::Draft | InvoiceStatus::Overdue => {}
        }

        record.status = status;
        record.updated_at = now;

        self.repository.save_invoice(&record).await?;

        info!(invoice_number = %record.number, %status, "invoice status changed");

        Ok(record.at(today()))
    }
}

fn today() -> Date {
    Timestamp::now().to_zoned(TimeZone::UTC).date()
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

struct ValidatedDraft {
    customer: InvoiceCustomer,
    totals: InvoiceTotals,
    tax_rate: Decimal,
    deposit: DepositRequirement,
    issue_date: Date,
    due_date: Date,
    notes: Option<String>,
}

fn validate(draft: InvoiceDraft, today: Date) -> Result<ValidatedDraft, InvoicesServiceError> {
    let customer = InvoiceCustomer {
        name: validation::required("customer name", &draft.customer.name)
            .map_err(InvoicesServiceError::Validation)?,
        email: validation::email("customer email", &draft.customer.email)
            .map_err(InvoicesServiceError::Validation)?,
        phone: optional(draft.customer.phone),
        address: optional(draft.customer.address),
    };

    if draft.items.is_empty() {
        return Err(InvoicesServiceError::Validation(
            "an invoice needs at least one line item".to_string(),
        ));
    }

    let mut items = draft.items;

    for item in &mut items {
        item.description = validation::required("line item description", &item.description)
            .map_err(InvoicesServiceError::Validation)?;
    }

    let issue_date = draft.issue_date.unwrap_or(today);

    if draft.due_date < issue_date {
        return Err(InvoicesServiceError::Validation(format!(
            "due date {} is before issue date {issue_date}",
            draft.due_date
        )));
    }

    let totals = compute_totals(items, draft.tax_rate, draft.discount_amount)?;

    let deposit = if draft.deposit.required {
        if draft.deposit.amount == 0 || draft.deposit.amount > totals.total_amount {
            return Err(InvoicesServiceError::Validation(format!(
                "deposit must be between 1 and the invoice total of {}",
                totals.total_amount
            )));
        }

        draft.deposit
    } else {
        DepositRequirement::default()
    };

    Ok(ValidatedDraft {
        customer,
        totals,
        tax_rate: draft.tax_rate,
        deposit,
        issue_date,
        due_date: draft.due_date,
        notes: optional(draft.notes),
    })
}

#[async_trait]
impl InvoicesService for KvInvoicesService {
    #[tracing::instrument(
        name = "invoices.service.create_invoice",
        skip(self, draft),
        fields(invoice_number = tracing::field::Empty),
        err
    )]
    async fn create_invoice(&self, draft: InvoiceDraft) -> Result<InvoiceRecord, InvoicesServiceError> {
        let today = today();
        let draft = validate(draft, today)?;

        let sequence = self.repository.next_number(draft.issue_date).await?;
        let number = invoice_number(draft.issue_date, sequence);

        tracing::Span::current().record("invoice_number", tracing::field::display(&number));

        let now = Timestamp::now();

        let record = InvoiceRecord {
            uuid: InvoiceUuid::new(),
            number,
            customer: draft.customer,
            items: draft.totals.items,
            tax_rate: draft.tax_rate,
            discount_amount: draft.totals.discount_amount,
            subtotal: draft.totals.subtotal,
            tax_amount: draft.totals.tax_amount,
            total_amount: draft.totals.total_amount,
            deposit: draft.deposit,
            issue_date: draft.issue_date,
            due_date: draft.due_date,
            notes: draft.notes,
            status: InvoiceStatus::Draft,
            sent_at: None,
            paid_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        };

        self.repository.create_invoice(&record).await?;

        info!(total = record.total_amount, "created invoice");

        Ok(record)
    }

    async fn get_invoice(&self, invoice: InvoiceUuid) -> Result<InvoiceRecord, InvoicesServiceError> {
        self.repository
            .get_invoice(invoice)
            .await?
            .map(|record| record.at(today()))
            .ok_or(InvoicesServiceError::NotFound)
    }

    async fn list_invoices(
        &self,
        status: Option<InvoiceStatus>,
    ) -> Result<Vec<InvoiceRecord>, InvoicesServiceError> {
        let today = today();

        Ok(self
            .repository
            .list_invoices()
            .await?
            .into_iter()
            .map(|record| record.at(today))
            .filter(|record| status.is_none_or(|status| record.status == status))
            .collect())
    }

    #[tracing::instrument(
        name = "invoices.service.update_invoice",
        skip(self, draft),
        fields(invoice_uuid = %invoice),
        err
    )]
    async fn update_invoice(
        &self,
        invoice: InvoiceUuid,
        draft: InvoiceDraft,
    ) -> Result<InvoiceRecord, InvoicesServiceError> {
        let mut record = self.load_unlocked(invoice).await?;
        let draft = validate(draft, today())?;

        record.customer = draft.customer;
        record.items = draft.totals.items;
        record.tax_rate = draft.tax_rate;
        record.discount_amount = draft.totals.discount_amount;
        record.subtotal = draft.totals.subtotal;
        record.tax_amount = draft.totals.tax_amount;
        record.total_amount = draft.totals.total_amount;
        record.deposit = draft.deposit;
        record.issue_date = draft.issue_date;
        record.due_date = draft.due_date;
        record.notes = draft.notes;
        record.updated_at = Timestamp::now();

        self.repository.save_invoice(&record).await?;

        Ok(record.at(today()))
    }

    #[tracing::instrument(
        name = "invoices.service.delete_invoice",
        skip(self),
        fields(invoice_uuid = %invoice),
        err
    )]
    async fn delete_invoice(&self, invoice: InvoiceUuid) -> Result<(), InvoicesServiceError> {
        let record = self.load_unlocked(invoice).await?;

        if !self.repository.delete_invoice(record.uuid).await? {
            return Err(InvoicesServiceError::NotFound);
        }

        info!(invoice_number = %record.number, "deleted invoice");

        Ok(())
    }

    async fn mark_invoice_sent(
        &self,
        invoice: InvoiceUuid,
    ) -> Result<InvoiceRecord, InvoicesServiceError> {
        let record = self.load_unlocked(invoice).await?;

        if !record.status.can_send() {
            return Err(InvoicesServiceError::PreconditionFailed(format!(
                "a {} invoice cannot be sent",
                record.status
            )));
        }

        self.set_status(record, InvoiceStatus::Sent).await
    }

    async fn mark_invoice_paid(
        &self,
        invoice: InvoiceUuid,
    ) -> Result<InvoiceRecord, InvoicesServiceError> {
        let record = self.load_unlocked(invoice).await?;

        if !record.status.can_pay() {
            return Err(InvoicesServiceError::PreconditionFailed(format!(
                "a {} invoice cannot be paid",
                record.status
            )));
        }

        self.set_status(record, InvoiceStatus::Paid).await
    }

    async fn mark_invoice_overdue(
        &self,
        invoice: InvoiceUuid,
    ) -> Result<InvoiceRecord, InvoicesServiceError> {
        let record = self.load_unlocked(invoice).await?;

        if record.status != InvoiceStatus::Sent {
            return Err(InvoicesServiceError::PreconditionFailed(format!(
                "only a sent invoice can become overdue, this one is {}",
                record.status
            )));
        }

        self.set_status(record, InvoiceStatus::Overdue).await
    }

    async fn cancel_invoice(&self, invoice: InvoiceUuid) -> Result<InvoiceRecord, InvoicesServiceError> {
        let record = self.load_unlocked(invoice).await?;

        if record.status == InvoiceStatus::Cancelled {
            return Err(InvoicesServiceError::PreconditionFailed(
                "invoice is already cancelled".to_string(),
            ));
        }

        self.set_status(record, InvoiceStatus::Cancelled).await
    }
}

#[automock]
#[async_trait]
pub trait InvoicesService: Send + Sync {
    /// Number, total and store a new draft invoice.
    async fn create_invoice(&self, draft: InvoiceDraft) -> Result<InvoiceRecord, InvoicesServiceError>;

    /// Retrieve a single invoice.
    async fn get_invoice(&self, invoice: InvoiceUuid) -> Result<InvoiceRecord, InvoicesServiceError>;

    /// All invoices, newest first, optionally only those in `status`.
    async fn list_invoices(
        &self,
        status: Option<InvoiceStatus>,
    ) -> Result<Vec<InvoiceRecord>, InvoicesServiceError>;

    /// Replace the contents of an unpaid invoice and recompute its totals.
    async fn update_invoice(
        &self,
        invoice: InvoiceUuid,
        draft: InvoiceDraft,
    ) -> Result<InvoiceRecord, InvoicesServiceError>;

    /// Remove an unpaid invoice.
    async fn delete_invoice(&self, invoice: InvoiceUuid) -> Result<(), InvoicesServiceError>;

    /// Mark an invoice as sent to the customer.
    async fn mark_invoice_sent(
        &self,
        invoice: InvoiceUuid,
    ) -> Result<InvoiceRecord, InvoicesServiceError>;

    /// Mark an invoice as settled. Paid invoices are final.
    async fn mark_invoice_paid(
        &self,
        invoice: InvoiceUuid,
    ) -> Result<InvoiceRecord, InvoicesServiceError>;

    /// Flag a sent invoice as overdue ahead of its due date passing.
    async fn mark_invoice_overdue(
        &self,
        invoice: InvoiceUuid,
    ) -> Result<InvoiceRecord, InvoicesServiceError>;

    /// Void an unpaid invoice.
    async fn cancel_invoice(&self, invoice: InvoiceUuid) -> Result<InvoiceRecord, InvoicesServiceError>;
}
