//! The in-memory aggregate of the four business collections.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Client, Communication, Invoice, InvoiceStatus, Job};

/// The in-process aggregate of all business data.
///
/// Fully replaced on every reload, never merged incrementally. The four
/// collections are fetched independently, so nothing guarantees they are
/// mutually consistent at a single instant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusinessSnapshot {
    pub jobs: Vec<Job>,
    pub clients: Vec<Client>,
    pub invoices: Vec<Invoice>,
    pub communications: Vec<Communication>,
}

/// Collection totals shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardCounts {
    pub jobs: usize,
    pub clients: usize,
    pub invoices: usize,
}

impl BusinessSnapshot {
    /// Jobs whose scheduled date falls on the same calendar day as `now`,
    /// evaluated in the offset `now` carries.
    pub fn jobs_today(&self, now: DateTime<FixedOffset>) -> Vec<Job> {
        let today = now.date_naive();
        self.jobs
            .iter()
            .filter(|job| job.scheduled_date.with_timezone(&now.timezone()).date_naive() == today)
            .cloned()
            .collect()
    }

    /// Invoices that count as overdue: status is stored as `overdue`, or
    /// status is `sent` with a due date strictly before `now`.
    pub fn overdue_invoices(&self, now: DateTime<FixedOffset>) -> Vec<Invoice> {
        self.invoices
            .iter()
            .filter(|inv| {
                inv.status == InvoiceStatus::Overdue
                    || (inv.status == InvoiceStatus::Sent && inv.due_date < now)
            })
            .cloned()
            .collect()
    }

    /// Per-client job counts, in first-encountered order over the job list.
    pub fn client_job_counts(&self) -> Vec<(Uuid, usize)> {
        let mut counts: Vec<(Uuid, usize)> = Vec::new();
        for job in &self.jobs {
            let Some(client_id) = job.client_id else { continue };
            match counts.iter_mut().find(|(id, _)| *id == client_id) {
                Some((_, n)) => *n += 1,
                None => counts.push((client_id, 1)),
            }
        }
        counts
    }

    /// Look up a client by id.
    pub fn client(&self, id: Uuid) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    pub fn dashboard_counts(&self) -> DashboardCounts {
        DashboardCounts {
            jobs: self.jobs.len(),
            clients: self.clients.len(),
            invoices: self.invoices.len(),
        }
    }
}
