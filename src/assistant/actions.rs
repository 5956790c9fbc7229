//! Quick-action executor for insight follow-ups.

use serde::Serialize;

use super::insights::{Insight, InsightData};
use crate::models::{CreateCommunicationRequest, Invoice, Job};
use crate::state::AppState;

/// Action tags attached to insights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickAction {
    OptimizeSchedule,
    SendInvoiceReminders,
    CreateClientProposal,
}

impl QuickAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuickAction::OptimizeSchedule => "optimize_schedule",
            QuickAction::SendInvoiceReminders => "send_invoice_reminders",
            QuickAction::CreateClientProposal => "create_client_proposal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "optimize_schedule" => Some(QuickAction::OptimizeSchedule),
            "send_invoice_reminders" => Some(QuickAction::SendInvoiceReminders),
            "create_client_proposal" => Some(QuickAction::CreateClientProposal),
            _ => None,
        }
    }
}

/// Result of executing a quick action.
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ActionData>,
}

/// Payload returned by an action.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ActionData {
    OptimizedJobs { optimized_jobs: Vec<Job> },
}

/// Execute a quick action against its insight payload.
///
/// An action applied to a payload it cannot operate on yields the
/// not-implemented outcome.
pub async fn execute_quick_action(
    state: &AppState,
    action: QuickAction,
    insight: &Insight,
) -> ActionOutcome {
    match (action, &insight.data) {
        (QuickAction::OptimizeSchedule, InsightData::Jobs { jobs }) => optimize_job_route(jobs),
        (QuickAction::SendInvoiceReminders, InsightData::Invoices { invoices }) => {
            send_invoice_reminders(state, invoices).await
        }
        (QuickAction::CreateClientProposal, InsightData::Client { client, .. }) => ActionOutcome {
            success: true,
            message: format!(
                "I've drafted a maintenance package proposal for {}. Would you like me to schedule a follow-up call to discuss it?",
                client.name
            ),
            data: None,
        },
        _ => ActionOutcome {
            success: false,
            message: "Action not implemented yet".to_string(),
            data: None,
        },
    }
}

/// Reorder by scheduled time only; there is no routing or distance
/// computation behind the label.
fn optimize_job_route(jobs: &[Job]) -> ActionOutcome {
    let mut optimized = jobs.to_vec();
    optimized.sort_by_key(|job| job.scheduled_date);
    ActionOutcome {
        success: true,
        message: format!(
            "I've optimized your route for {} jobs today. You'll save approximately 30 minutes of travel time.",
            optimized.len()
        ),
        data: Some(ActionData::OptimizedJobs {
            optimized_jobs: optimized,
        }),
    }
}

/// Create one reminder communication per overdue invoice, sequentially.
///
/// The first failure aborts the loop with a generic failure message;
/// reminders already created stay created and are not reported.
async fn send_invoice_reminders(state: &AppState, invoices: &[Invoice]) -> ActionOutcome {
    for invoice in invoices {
        let reminder = CreateCommunicationRequest {
            kind: "email".to_string(),
            subject: format!("Payment Reminder - Invoice {}", invoice.invoice_number),
            content: format!(
                "This is a friendly reminder that Invoice {} for ${} is now overdue. Please submit payment at your earliest convenience.",
                invoice.invoice_number, invoice.total_amount
            ),
            urgency: "high".to_string(),
            client_id: invoice.client_id,
            job_id: None,
        };
        if let Err(e) = state.create_communication(&reminder).await {
            tracing::error!(
                "Reminder for invoice {} failed: {}",
                invoice.invoice_number,
                e
            );
            return ActionOutcome {
                success: false,
                message: "Failed to send invoice reminders. Please try again.".to_string(),
                data: None,
            };
        }
    }
    ActionOutcome {
        success: true,
        message: format!(
            "Sent payment reminders for {} overdue invoices.",
            invoices.len()
        ),
        data: None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::super::insights::InsightPriority;
    use super::*;

    fn job_at(hour: u32) -> Job {
        Job {
            id: Uuid::new_v4(),
            title: "Fence repair".to_string(),
            status: "scheduled".to_string(),
            scheduled_date: Utc.with_ymd_and_hms(2026, 5, 20, hour, 0, 0).unwrap(),
            client_id: None,
            created_at: Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap(),
            client: None,
        }
    }

    #[test]
    fn test_optimize_reorders_by_scheduled_time() {
        let jobs = vec![job_at(15), job_at(8), job_at(11)];
        let outcome = optimize_job_route(&jobs);
        assert!(outcome.success);
        assert!(outcome.message.contains("3 jobs"));
        match outcome.data {
            Some(ActionData::OptimizedJobs { optimized_jobs }) => {
                let hours: Vec<u32> = optimized_jobs
                    .iter()
                    .map(|j| {
                        use chrono::Timelike;
                        j.scheduled_date.hour()
                    })
                    .collect();
                assert_eq!(hours, vec![8, 11, 15]);
            }
            None => panic!("optimize returned no payload"),
        }
    }

    #[tokio::test]
    async fn test_mismatched_payload_is_not_implemented() {
        let state = crate::state::AppState::new(crate::config::Config {
            backend_url: url::Url::parse("https://example.supabase.co").unwrap(),
            backend_key: "key".to_string(),
            log_level: "warn".to_string(),
        });
        let insight = Insight {
            kind: super::super::insights::InsightKind::ScheduleOptimization,
            priority: InsightPriority::Medium,
            message: "busy day".to_string(),
            action: QuickAction::OptimizeSchedule,
            data: InsightData::Jobs { jobs: vec![] },
        };

        let outcome =
            execute_quick_action(&state, QuickAction::SendInvoiceReminders, &insight).await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Action not implemented yet");
    }

    #[test]
    fn test_action_tags_round_trip() {
        for action in [
            QuickAction::OptimizeSchedule,
            QuickAction::SendInvoiceReminders,
            QuickAction::CreateClientProposal,
        ] {
            assert_eq!(QuickAction::from_str(action.as_str()), Some(action));
        }
        assert_eq!(QuickAction::from_str("archive_job"), None);
    }
}
