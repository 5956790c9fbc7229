//! Communication model and request body.
//!
//! Communications are append-only: the façade exposes no update or delete.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ClientRef, JobRef};

/// A logged outbound communication (email, call, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Communication {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub subject: String,
    pub content: String,
    pub urgency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    /// Client name embedded by the communications read query.
    #[serde(default, rename = "clients", skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientRef>,
    /// Job title embedded by the communications read query.
    #[serde(default, rename = "jobs", skip_serializing_if = "Option::is_none")]
    pub job: Option<JobRef>,
}

/// Request body for creating a new communication.
#[derive(Debug, Clone, Serialize)]
pub struct CreateCommunicationRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub subject: String,
    pub content: String,
    pub urgency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<Uuid>,
}
