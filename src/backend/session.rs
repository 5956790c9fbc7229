//! Session lifecycle against the hosted auth service.
//!
//! Sign-in is delegated to the service's identity endpoints; this module
//! holds the current session and broadcasts session-change events to
//! subscribers.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use url::Url;
use uuid::Uuid;

use super::BackendClient;
use crate::errors::AppError;

/// An authenticated session issued by the hosted auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: AuthUser,
}

/// The signed-in user as reported by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

impl BackendClient {
    fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, endpoint)
    }

    /// Sign in with email and password, store the resulting session and
    /// notify subscribers.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AppError> {
        let response = self
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.service_key)
            .json(&PasswordGrant { email, password })
            .send()
            .await?;
        let session: Session = super::read_json(response).await.map_err(|e| match e {
            AppError::Backend(msg) => AppError::Auth(msg),
            other => other,
        })?;
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    /// URL that starts a sign-in flow with a third-party identity provider.
    ///
    /// The embedding UI drives the browser flow and hands the resulting
    /// session back through [`BackendClient::restore_session`].
    pub fn authorize_url(
        &self,
        provider: &str,
        redirect_to: Option<&str>,
    ) -> Result<Url, AppError> {
        let mut params = vec![("provider", provider)];
        if let Some(redirect) = redirect_to {
            params.push(("redirect_to", redirect));
        }
        Url::parse_with_params(&self.auth_url("authorize"), &params)
            .map_err(|e| AppError::Config(format!("Invalid backend URL: {}", e)))
    }

    /// Adopt a session obtained out of band (e.g. from an identity-provider
    /// redirect) and notify subscribers.
    pub fn restore_session(&self, session: Session) {
        self.set_session(Some(session));
    }

    /// Sign out of the current session and notify subscribers.
    pub async fn sign_out(&self) -> Result<(), AppError> {
        if let Some(session) = self.current_session() {
            let response = self
                .http
                .post(self.auth_url("logout"))
                .header("apikey", &self.service_key)
                .bearer_auth(&session.access_token)
                .send()
                .await?;
            super::expect_success(response).await?;
        }
        self.set_session(None);
        Ok(())
    }

    /// The session currently held, if any.
    pub fn current_session(&self) -> Option<Session> {
        self.session.read().clone()
    }

    /// Subscribe to session-change events.
    pub fn subscribe_sessions(&self) -> watch::Receiver<Option<Session>> {
        self.session_tx.subscribe()
    }

    fn set_session(&self, session: Option<Session>) {
        *self.session.write() = session.clone();
        self.session_tx.send_replace(session);
    }
}
