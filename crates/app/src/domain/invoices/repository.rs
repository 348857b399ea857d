//! Invoices Repository
//!
//! Keys:
//! - `invoice:{uuid}`: the full record
//! - `invoices:all`: every invoice uuid
//! - sequence `invoice:{YYYYMMDD}`: per-day invoice numbering

use std::sync::Arc;

use jiff::civil::Date;
use tracing::warn;

use crate::{
    domain::invoices::records::{InvoiceRecord, InvoiceUuid},
    store::{KvStore, StoreError, get_json, set_json},
};

const ALL_INVOICES_KEY: &str = "invoices:all";

fn invoice_key(invoice: InvoiceUuid) -> String {
    invoice.store_key()
}

#[derive(Clone)]
pub(crate) struct InvoicesRepository {
    store: Arc<dyn KvStore>,
}

impl InvoicesRepository {
    #[must_use]
    pub(crate) fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub(crate) async fn next_number(&self, issue_date: Date) -> Result<u64, StoreError> {
        self.store
            .next_sequence(&format!("invoice:{}", issue_date.strftime("%Y%m%d")))
            .await
    }

    pub(crate) async fn get_invoice(
        &self,
        invoice: InvoiceUuid,
    ) -> Result<Option<InvoiceRecord>, StoreError> {
        get_json(self.store.as_ref(), &invoice_key(invoice)).await
    }

    pub(crate) async fn create_invoice(&self, invoice: &InvoiceRecord) -> Result<(), StoreError> {
        self.save_invoice(invoice).await?;

        self.store
            .set_add(ALL_INVOICES_KEY, &invoice.uuid.to_string())
            .await
    }

    pub(crate) async fn save_invoice(&self, invoice: &InvoiceRecord) -> Result<(), StoreError> {
        set_json(self.store.as_ref(), &invoice_key(invoice.uuid), invoice).await
    }

    pub(crate) async fn delete_invoice(&self, invoice: InvoiceUuid) -> Result<bool, StoreError> {
        self.store
            .set_remove(ALL_INVOICES_KEY, &invoice.to_string())
            .await?;

        self.store.delete(&invoice_key(invoice)).await
    }

    /// Every invoice as stored, newest first.
    pub(crate) async fn list_invoices(&self) -> Result<Vec<InvoiceRecord>, StoreError> {
        let members = self.store.set_members(ALL_INVOICES_KEY).await?;
        let mut invoices = Vec::with_capacity(members.len());

        for member in members {
            let Ok(uuid) = member.parse::<InvoiceUuid>() else {
                warn!(%member, "skipping malformed invoice index entry");
                continue;
            };

            if let Some(invoice) = self.get_invoice(uuid).await? {
                invoices.push(invoice);
            }
        }

        invoices.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.uuid.cmp(&a.uuid)));

        Ok(invoices)
    }
}
