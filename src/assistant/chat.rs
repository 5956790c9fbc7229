//! Chat session over the intent dispatcher.
//!
//! Holds the transcript in memory and persists one conversation row per
//! exchange so future tooling can learn from usage.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use super::dispatcher::{dispatch, AssistantReply, Intent, ReplyData};
use crate::backend::tables;
use crate::errors::AppError;
use crate::state::AppState;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A single message in the chat transcript.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ReplyData>,
    pub timestamp: DateTime<Utc>,
}

/// Conversation row persisted for every exchange.
#[derive(Serialize)]
struct ConversationRecord<'a> {
    user_message: &'a str,
    ai_response: String,
    tool_used: &'static str,
    context_data: serde_json::Value,
}

/// An in-memory chat transcript bound to the assistant.
#[derive(Debug)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    pub mode: String,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            mode: "assistant".to_string(),
        }
    }

    /// The transcript so far.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Dispatch a user message and append both sides of the exchange.
    ///
    /// The conversation row is persisted best-effort: a rejected insert is
    /// logged and does not disturb the reply.
    pub async fn send(&mut self, state: &AppState, input: &str) -> ChatMessage {
        let content = input.trim().to_string();
        self.messages.push(ChatMessage {
            id: Uuid::new_v4(),
            role: ChatRole::User,
            content: content.clone(),
            intent: None,
            data: None,
            timestamp: Utc::now(),
        });

        let snapshot = state.snapshot();
        let reply = dispatch(&content, &snapshot, Local::now().fixed_offset());

        if let Err(e) = log_conversation(state, &content, &reply, &self.mode).await {
            tracing::warn!("Conversation log rejected: {}", e);
        }

        let message = ChatMessage {
            id: Uuid::new_v4(),
            role: ChatRole::Assistant,
            content: reply.summary.clone(),
            intent: Some(reply.intent),
            data: reply.data,
            timestamp: Utc::now(),
        };
        self.messages.push(message.clone());
        message
    }
}

async fn log_conversation(
    state: &AppState,
    user_message: &str,
    reply: &AssistantReply,
    mode: &str,
) -> Result<(), AppError> {
    let snapshot = state.snapshot();
    let record = ConversationRecord {
        user_message,
        ai_response: serde_json::to_string(reply)?,
        tool_used: reply.intent.as_str(),
        context_data: json!({
            "job_count": snapshot.jobs.len(),
            "client_count": snapshot.clients.len(),
            "invoice_count": snapshot.invoices.len(),
            "mode": mode,
        }),
    };
    state
        .backend
        .insert_minimal(tables::AI_CONVERSATIONS, &record)
        .await
}
