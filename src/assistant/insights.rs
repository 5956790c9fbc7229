//! Proactive insight generation.
//!
//! Up to three advisories derived from the snapshot, in fixed priority
//! order: schedule load, then overdue invoices, then repeat-client upsell.
//! Recomputed on demand, never persisted.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::actions::QuickAction;
use crate::models::{BusinessSnapshot, Client, Invoice, InvoiceStatus, Job};

/// A day with strictly more jobs than this gets a route-optimization nudge.
const BUSY_DAY_JOBS: usize = 2;
/// Jobs a client needs before they count as an upsell candidate.
const REPEAT_CLIENT_JOBS: usize = 3;
/// Hard cap on advisories per generation.
const MAX_INSIGHTS: usize = 3;

/// Insight categories, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    ScheduleOptimization,
    InvoiceFollowUp,
    ClientOpportunity,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::ScheduleOptimization => "schedule_optimization",
            InsightKind::InvoiceFollowUp => "invoice_follow_up",
            InsightKind::ClientOpportunity => "client_opportunity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightPriority {
    Low,
    Medium,
    High,
}

/// Payload carried by an insight for its follow-up action.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum InsightData {
    Jobs { jobs: Vec<Job> },
    Invoices { invoices: Vec<Invoice> },
    Client { client: Client, job_count: usize },
}

/// A proactively generated advisory with a suggested follow-up action.
#[derive(Debug, Clone, Serialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub priority: InsightPriority,
    pub message: String,
    pub action: QuickAction,
    pub data: InsightData,
}

/// Generate up to three advisories from the snapshot.
pub fn proactive_insights(
    snapshot: &BusinessSnapshot,
    now: DateTime<FixedOffset>,
) -> Vec<Insight> {
    let mut insights = Vec::new();

    let today_jobs = snapshot.jobs_today(now);
    if today_jobs.len() > BUSY_DAY_JOBS {
        insights.push(Insight {
            kind: InsightKind::ScheduleOptimization,
            priority: InsightPriority::Medium,
            message: format!(
                "You have {} jobs scheduled for today. Would you like me to optimize your route to save travel time?",
                today_jobs.len()
            ),
            action: QuickAction::OptimizeSchedule,
            data: InsightData::Jobs { jobs: today_jobs },
        });
    }

    // Only invoices still marked sent count here; the broader overdue view
    // also admits rows stored as overdue.
    let past_due: Vec<Invoice> = snapshot
        .invoices
        .iter()
        .filter(|inv| inv.status == InvoiceStatus::Sent && inv.due_date < now)
        .cloned()
        .collect();
    if !past_due.is_empty() {
        let total: f64 = past_due.iter().map(|inv| inv.total_amount).sum();
        insights.push(Insight {
            kind: InsightKind::InvoiceFollowUp,
            priority: InsightPriority::High,
            message: format!(
                "You have {} overdue invoices totaling ${}. Should I send follow-up reminders?",
                past_due.len(),
                total
            ),
            action: QuickAction::SendInvoiceReminders,
            data: InsightData::Invoices { invoices: past_due },
        });
    }

    let repeat = snapshot
        .client_job_counts()
        .into_iter()
        .find(|(_, count)| *count >= REPEAT_CLIENT_JOBS);
    if let Some((client_id, job_count)) = repeat {
        if let Some(client) = snapshot.client(client_id) {
            insights.push(Insight {
                kind: InsightKind::ClientOpportunity,
                priority: InsightPriority::Low,
                message: format!(
                    "{} has had {} successful jobs. They might be interested in a maintenance package or referral program.",
                    client.name, job_count
                ),
                action: QuickAction::CreateClientProposal,
                data: InsightData::Client {
                    client: client.clone(),
                    job_count,
                },
            });
        }
    }

    insights.truncate(MAX_INSIGHTS);
    insights
}
