//! Shared application state: configuration, backend client, the business
//! snapshot, and view selection.
//!
//! The snapshot cell is only ever written by the aggregator's full replace;
//! all other components read through [`AppState::snapshot`].

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::task::JoinHandle;

use crate::backend::BackendClient;
use crate::config::Config;
use crate::errors::AppError;
use crate::models::BusinessSnapshot;

/// Which top-level view the UI is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppView {
    #[default]
    Chat,
    Dashboard,
    Jobs,
    Clients,
    Invoices,
}

impl AppView {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppView::Chat => "chat",
            AppView::Dashboard => "dashboard",
            AppView::Jobs => "jobs",
            AppView::Clients => "clients",
            AppView::Invoices => "invoices",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "chat" => Some(AppView::Chat),
            "dashboard" => Some(AppView::Dashboard),
            "jobs" => Some(AppView::Jobs),
            "clients" => Some(AppView::Clients),
            "invoices" => Some(AppView::Invoices),
            _ => None,
        }
    }
}

/// Application state shared across all components.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub backend: Arc<BackendClient>,
    snapshot: Arc<RwLock<Arc<BusinessSnapshot>>>,
    view: Arc<RwLock<AppView>>,
}

impl AppState {
    /// Build the application state from configuration.
    pub fn new(config: Config) -> Self {
        let backend = Arc::new(BackendClient::new(&config));
        Self {
            config: Arc::new(config),
            backend,
            snapshot: Arc::new(RwLock::new(Arc::new(BusinessSnapshot::default()))),
            view: Arc::new(RwLock::new(AppView::default())),
        }
    }

    /// The snapshot as of the last successful reload.
    pub fn snapshot(&self) -> Arc<BusinessSnapshot> {
        self.snapshot.read().clone()
    }

    /// Reload the snapshot from the backend.
    ///
    /// Issues the four read queries concurrently and replaces the snapshot in
    /// a single write once all four settle. If any query is rejected the
    /// whole reload is abandoned and the previous snapshot is retained:
    /// stale-but-consistent over inconsistent-but-fresh. No retry, no
    /// timeout. A reload already in flight is never cancelled; when reloads
    /// overlap, whichever settles last wins the cell.
    pub async fn reload(&self) {
        if let Err(e) = self.try_reload().await {
            tracing::error!("Snapshot reload failed: {}", e);
        }
    }

    async fn try_reload(&self) -> Result<(), AppError> {
        let (jobs, clients, invoices, communications) = tokio::try_join!(
            self.backend.fetch_jobs(),
            self.backend.fetch_clients(),
            self.backend.fetch_invoices(),
            self.backend.fetch_communications(),
        )?;
        *self.snapshot.write() = Arc::new(BusinessSnapshot {
            jobs,
            clients,
            invoices,
            communications,
        });
        Ok(())
    }

    /// Spawn the task that reloads the snapshot whenever a session-change
    /// event delivers a signed-in session.
    pub fn spawn_session_listener(&self) -> JoinHandle<()> {
        let state = self.clone();
        let mut events = self.backend.subscribe_sessions();
        tokio::spawn(async move {
            while events.changed().await.is_ok() {
                let signed_in = events.borrow_and_update().is_some();
                if signed_in {
                    state.reload().await;
                }
            }
        })
    }

    pub fn current_view(&self) -> AppView {
        *self.view.read()
    }

    pub fn set_view(&self, view: AppView) {
        *self.view.write() = view;
    }
}
