//! Invoice model and request bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ClientRef, JobRef};

/// Invoice status as stored by the backend.
///
/// "Overdue" also exists as a derived view over sent invoices with a past
/// due date; nothing transitions stored rows to `Overdue` automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Overdue,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Paid => "paid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(InvoiceStatus::Draft),
            "sent" => Some(InvoiceStatus::Sent),
            "overdue" => Some(InvoiceStatus::Overdue),
            "paid" => Some(InvoiceStatus::Paid),
            _ => None,
        }
    }
}

/// An invoice raised against a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub invoice_number: String,
    pub total_amount: f64,
    pub status: InvoiceStatus,
    pub due_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    /// Job title embedded by the invoices read query.
    #[serde(default, rename = "jobs", skip_serializing_if = "Option::is_none")]
    pub job: Option<JobRef>,
    /// Client name embedded by the invoices read query.
    #[serde(default, rename = "clients", skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientRef>,
}

/// Request body for creating a new invoice.
///
/// The invoice number is not part of the request; the façade derives it from
/// the snapshot count and the current year.
#[derive(Debug, Clone, Serialize)]
pub struct CreateInvoiceRequest {
    pub total_amount: f64,
    pub status: InvoiceStatus,
    pub due_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,
}

/// Request body for updating an existing invoice. Unset fields are left as-is.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateInvoiceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InvoiceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,
}
