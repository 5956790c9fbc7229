//! Invoice mutations and numbering.

use chrono::{Datelike, Local};
use serde::Serialize;
use uuid::Uuid;

use crate::backend::tables;
use crate::errors::AppError;
use crate::models::{CreateInvoiceRequest, Invoice, UpdateInvoiceRequest};
use crate::state::AppState;

#[derive(Serialize)]
struct InvoiceRow<'a> {
    invoice_number: String,
    #[serde(flatten)]
    request: &'a CreateInvoiceRequest,
}

impl AppState {
    /// Create an invoice and reload the snapshot.
    ///
    /// The invoice number is derived from the held snapshot's invoice count
    /// and the current local year. The scheme is count-based, not
    /// sequence-based: two creates racing against the same snapshot count
    /// produce a colliding number.
    pub async fn create_invoice(
        &self,
        request: &CreateInvoiceRequest,
    ) -> Result<Invoice, AppError> {
        let sequence = self.snapshot().invoices.len() + 1;
        let row = InvoiceRow {
            invoice_number: invoice_number(Local::now().year(), sequence),
            request,
        };
        let invoice: Invoice = self.backend.insert(tables::INVOICES, &row).await?;
        self.reload().await;
        Ok(invoice)
    }

    /// Update an invoice and reload the snapshot.
    pub async fn update_invoice(
        &self,
        id: Uuid,
        changes: &UpdateInvoiceRequest,
    ) -> Result<Invoice, AppError> {
        let invoice: Invoice = self.backend.update(tables::INVOICES, id, changes).await?;
        self.reload().await;
        Ok(invoice)
    }
}

/// Format an invoice number from year and sequence, e.g. `INV-2026-0042`.
pub(crate) fn invoice_number(year: i32, sequence: usize) -> String {
    format!("INV-{}-{:04}", year, sequence)
}
