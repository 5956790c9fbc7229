//! Client for the hosted backend service.
//!
//! The hosted service owns persistence, relational reads and authentication;
//! this module speaks its REST contract and is the only place that knows it.
//! The read queries are a fixed contract: table, embedded join columns and
//! the descending creation-time order clause.

mod session;

pub use session::*;

use parking_lot::RwLock;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::{Client, Communication, Invoice, Job};

/// Collection names as constants to avoid stringly-typed tables.
pub mod tables {
    pub const JOBS: &str = "jobs";
    pub const CLIENTS: &str = "clients";
    pub const INVOICES: &str = "invoices";
    pub const COMMUNICATIONS: &str = "communications";
    pub const AI_CONVERSATIONS: &str = "ai_conversations";
}

/// Client for the hosted backend's data and auth planes.
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
    session: RwLock<Option<Session>>,
    session_tx: watch::Sender<Option<Session>>,
}

impl BackendClient {
    /// Build a client from configuration.
    pub fn new(config: &Config) -> Self {
        let (session_tx, _) = watch::channel(None);
        Self {
            http: reqwest::Client::new(),
            base_url: config.backend_url.as_str().trim_end_matches('/').to_string(),
            service_key: config.backend_key.clone(),
            session: RwLock::new(None),
            session_tx,
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Attach the service key and bearer token. Requests carry the session's
    /// access token when signed in and fall back to the service key.
    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        let bearer = self
            .session
            .read()
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| self.service_key.clone());
        builder.header("apikey", &self.service_key).bearer_auth(bearer)
    }

    // ==================== READ QUERIES ====================

    /// Jobs with their client contact, newest first.
    pub async fn fetch_jobs(&self) -> Result<Vec<Job>, AppError> {
        self.select(tables::JOBS, "*,clients(name,email,phone)").await
    }

    /// All clients, newest first.
    pub async fn fetch_clients(&self) -> Result<Vec<Client>, AppError> {
        self.select(tables::CLIENTS, "*").await
    }

    /// Invoices with their job title and client name, newest first.
    pub async fn fetch_invoices(&self) -> Result<Vec<Invoice>, AppError> {
        self.select(tables::INVOICES, "*,jobs(title),clients(name)").await
    }

    /// Communications with their client name and job title, newest first.
    pub async fn fetch_communications(&self) -> Result<Vec<Communication>, AppError> {
        self.select(tables::COMMUNICATIONS, "*,clients(name),jobs(title)")
            .await
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        columns: &str,
    ) -> Result<Vec<T>, AppError> {
        let response = self
            .authed(self.http.get(self.rest_url(table)))
            .query(&[("select", columns), ("order", "created_at.desc")])
            .send()
            .await?;
        read_json(response).await
    }

    // ==================== MUTATIONS ====================

    /// Insert a row and return the created record.
    pub async fn insert<T, B>(&self, table: &str, row: &B) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .authed(self.http.post(self.rest_url(table)))
            .header("Prefer", "return=representation")
            .json(&[row])
            .send()
            .await?;
        let mut rows: Vec<T> = read_json(response).await?;
        if rows.is_empty() {
            return Err(AppError::Backend(format!(
                "Insert into {} returned no rows",
                table
            )));
        }
        Ok(rows.remove(0))
    }

    /// Insert a row without asking for the created record back.
    pub async fn insert_minimal<B>(&self, table: &str, row: &B) -> Result<(), AppError>
    where
        B: Serialize + ?Sized,
    {
        let response = self
            .authed(self.http.post(self.rest_url(table)))
            .header("Prefer", "return=minimal")
            .json(&[row])
            .send()
            .await?;
        expect_success(response).await?;
        Ok(())
    }

    /// Patch a row by id and return the updated record.
    pub async fn update<T, B>(&self, table: &str, id: Uuid, changes: &B) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .authed(self.http.patch(self.rest_url(table)))
            .query(&[("id", format!("eq.{}", id).as_str())])
            .header("Prefer", "return=representation")
            .json(changes)
            .send()
            .await?;
        let mut rows: Vec<T> = read_json(response).await?;
        if rows.is_empty() {
            return Err(AppError::Backend(format!(
                "No {} row matched id {}",
                table, id
            )));
        }
        Ok(rows.remove(0))
    }

    /// Delete a row by id.
    pub async fn delete(&self, table: &str, id: Uuid) -> Result<(), AppError> {
        let response = self
            .authed(self.http.delete(self.rest_url(table)))
            .query(&[("id", format!("eq.{}", id).as_str())])
            .send()
            .await?;
        expect_success(response).await?;
        Ok(())
    }
}

/// Deserialize a success body, or surface the service's rejection.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let response = expect_success(response).await?;
    Ok(response.json().await?)
}

async fn expect_success(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(rejection(status, &body))
}

/// Map a non-success response, preferring the service's own `message` field
/// when the body carries one.
fn rejection(status: StatusCode, body: &str) -> AppError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        AppError::Auth(format!("{}: {}", status, message))
    } else {
        AppError::Backend(format!("{}: {}", status, message))
    }
}
