//! Job model and request bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ClientContact;

/// A scheduled piece of work for a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    /// Free-form status; the backend does not enforce a closed set.
    pub status: String,
    pub scheduled_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    /// Contact columns embedded by the jobs-with-client read query.
    #[serde(default, rename = "clients", skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientContact>,
}

/// The `jobs(title)` join columns embedded in other records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRef {
    pub title: String,
}

/// Request body for creating a new job.
#[derive(Debug, Clone, Serialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub status: String,
    pub scheduled_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,
}

/// Request body for updating an existing job. Unset fields are left as-is.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateJobRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,
}
