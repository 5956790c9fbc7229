//! Keyword intent dispatcher.
//!
//! An ordered list of (predicate, handler) rules evaluated first-match-wins
//! over the lowercased message. The ordering is a priority policy: changing
//! it changes which intent wins for a message matching several rules.

use std::panic::{catch_unwind, AssertUnwindSafe};

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::models::{BusinessSnapshot, Client, Invoice, Job};

/// Fixed intent tags produced by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    DisplayJobs,
    DisplayClients,
    DisplayInvoices,
    General,
    Error,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::DisplayJobs => "display_jobs",
            Intent::DisplayClients => "display_clients",
            Intent::DisplayInvoices => "display_invoices",
            Intent::General => "general",
            Intent::Error => "error",
        }
    }
}

/// Structured payload attached to an assistant reply.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ReplyData {
    Jobs { jobs: Vec<Job>, filter: JobFilter },
    Clients { clients: Vec<Client> },
    Invoices { invoices: Vec<Invoice> },
}

/// Filter description echoed alongside a job payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilter {
    pub time_filter: &'static str,
}

/// A classified reply: intent tag, human-readable summary, optional payload.
#[derive(Debug, Clone, Serialize)]
pub struct AssistantReply {
    pub intent: Intent,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ReplyData>,
}

impl AssistantReply {
    /// The uniform reply for a handler that blew up.
    pub fn error() -> Self {
        Self {
            intent: Intent::Error,
            summary: "I encountered an error processing your request. Please try again."
                .to_string(),
            data: None,
        }
    }
}

struct RuleCtx<'a> {
    snapshot: &'a BusinessSnapshot,
    now: DateTime<FixedOffset>,
}

struct Rule {
    matches: fn(&str) -> bool,
    handle: fn(&RuleCtx<'_>) -> AssistantReply,
}

/// Rule order is load-bearing: a message mentioning both scheduling and
/// invoices is answered with jobs.
const RULES: &[Rule] = &[
    Rule {
        matches: |m| m.contains("schedule") || m.contains("jobs today"),
        handle: todays_jobs,
    },
    Rule {
        matches: |m| m.contains("clients"),
        handle: all_clients,
    },
    Rule {
        matches: |m| m.contains("invoice"),
        handle: invoice_review,
    },
];

/// Classify a free-text message against the current snapshot.
///
/// Pure and total: a panicking handler is caught and converted to the
/// `error` intent; nothing propagates to the caller.
pub fn dispatch(
    input: &str,
    snapshot: &BusinessSnapshot,
    now: DateTime<FixedOffset>,
) -> AssistantReply {
    let message = input.to_lowercase();
    let ctx = RuleCtx { snapshot, now };
    match catch_unwind(AssertUnwindSafe(|| run_rules(&message, &ctx))) {
        Ok(reply) => reply,
        Err(_) => {
            tracing::error!("Assistant handler panicked on: {}", input);
            AssistantReply::error()
        }
    }
}

fn run_rules(message: &str, ctx: &RuleCtx<'_>) -> AssistantReply {
    for rule in RULES {
        if (rule.matches)(message) {
            return (rule.handle)(ctx);
        }
    }
    general(ctx)
}

fn todays_jobs(ctx: &RuleCtx<'_>) -> AssistantReply {
    let jobs = ctx.snapshot.jobs_today(ctx.now);
    AssistantReply {
        intent: Intent::DisplayJobs,
        summary: format!("Found {} jobs scheduled for today", jobs.len()),
        data: Some(ReplyData::Jobs {
            jobs,
            filter: JobFilter {
                time_filter: "today",
            },
        }),
    }
}

fn all_clients(ctx: &RuleCtx<'_>) -> AssistantReply {
    let clients = ctx.snapshot.clients.clone();
    AssistantReply {
        intent: Intent::DisplayClients,
        summary: format!("Here are your {} clients", clients.len()),
        data: Some(ReplyData::Clients { clients }),
    }
}

fn invoice_review(ctx: &RuleCtx<'_>) -> AssistantReply {
    let overdue = ctx.snapshot.overdue_invoices(ctx.now);
    let (summary, invoices) = if overdue.is_empty() {
        (
            "All invoices are up to date".to_string(),
            ctx.snapshot.invoices.clone(),
        )
    } else {
        (format!("Found {} overdue invoices", overdue.len()), overdue)
    };
    AssistantReply {
        intent: Intent::DisplayInvoices,
        summary,
        data: Some(ReplyData::Invoices { invoices }),
    }
}

fn general(_ctx: &RuleCtx<'_>) -> AssistantReply {
    AssistantReply {
        intent: Intent::General,
        summary: "I can help you manage your trade business. Ask me about your schedule, \
                  clients, invoices, or any specific tasks you need help with."
            .to_string(),
        data: None,
    }
}
