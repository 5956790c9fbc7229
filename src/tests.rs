//! Integration tests against an in-process stub of the hosted backend.
//!
//! The stub implements just enough of the service's REST and auth contract
//! for the real client to talk to it, plus fault injection and request
//! accounting so the reload policies are observable.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Datelike, Local, Utc};
use parking_lot::Mutex;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::assistant::{
    execute_quick_action, proactive_insights, ChatSession, Intent, InsightKind,
};
use crate::config::Config;
use crate::models::{CreateClientRequest, CreateInvoiceRequest, CreateJobRequest, InvoiceStatus, UpdateJobRequest};
use crate::state::AppState;

/// In-memory stand-in for the hosted backend's REST and auth planes.
#[derive(Default)]
struct StubBackend {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    /// Tables whose requests are rejected outright.
    failing: Mutex<HashSet<String>>,
    /// Per-table number of writes allowed before rejections start.
    write_budget: Mutex<HashMap<String, usize>>,
    /// (method, table) per data-plane request.
    hits: Mutex<Vec<(String, String)>>,
}

impl StubBackend {
    fn seed(&self, table: &str, row: Value) {
        self.tables
            .lock()
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    fn rows(&self, table: &str) -> Vec<Value> {
        self.tables.lock().get(table).cloned().unwrap_or_default()
    }

    fn fail(&self, table: &str) {
        self.failing.lock().insert(table.to_string());
    }

    fn allow_writes(&self, table: &str, budget: usize) {
        self.write_budget.lock().insert(table.to_string(), budget);
    }

    fn read_count(&self) -> usize {
        self.hits.lock().iter().filter(|(m, _)| m == "GET").count()
    }

    fn check_write(&self, table: &str) -> bool {
        if self.failing.lock().contains(table) {
            return false;
        }
        let mut budgets = self.write_budget.lock();
        match budgets.get_mut(table) {
            Some(0) => false,
            Some(n) => {
                *n -= 1;
                true
            }
            None => true,
        }
    }
}

fn stub_router(stub: Arc<StubBackend>) -> Router {
    Router::new()
        .route("/auth/v1/token", post(auth_token))
        .route("/auth/v1/logout", post(|| async { StatusCode::NO_CONTENT }))
        .route(
            "/rest/v1/{table}",
            get(select_rows)
                .post(insert_rows)
                .patch(update_rows)
                .delete(delete_rows),
        )
        .with_state(stub)
}

async fn auth_token(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "access_token": format!("stub-token-{}", Uuid::new_v4()),
        "token_type": "bearer",
        "expires_in": 3600,
        "user": { "id": Uuid::new_v4(), "email": body["email"] },
    }))
}

fn stub_failure() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "stub backend failure" })),
    )
        .into_response()
}

async fn select_rows(
    State(stub): State<Arc<StubBackend>>,
    Path(table): Path<String>,
) -> Response {
    stub.hits.lock().push(("GET".to_string(), table.clone()));
    if stub.failing.lock().contains(&table) {
        return stub_failure();
    }
    let mut rows = stub.rows(&table);
    rows.sort_by(|a, b| {
        b["created_at"]
            .as_str()
            .unwrap_or("")
            .cmp(a["created_at"].as_str().unwrap_or(""))
    });
    Json(rows).into_response()
}

async fn insert_rows(
    State(stub): State<Arc<StubBackend>>,
    Path(table): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    stub.hits.lock().push(("POST".to_string(), table.clone()));
    if !stub.check_write(&table) {
        return stub_failure();
    }
    let rows = match body {
        Value::Array(rows) => rows,
        other => vec![other],
    };
    let mut created = Vec::new();
    for mut row in rows {
        let obj = row.as_object_mut().expect("insert body must be an object");
        obj.entry("id").or_insert_with(|| json!(Uuid::new_v4()));
        obj.entry("created_at")
            .or_insert_with(|| json!(Utc::now().to_rfc3339()));
        created.push(row.clone());
        stub.seed(&table, row);
    }
    (StatusCode::CREATED, Json(Value::Array(created))).into_response()
}

async fn update_rows(
    State(stub): State<Arc<StubBackend>>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    Json(changes): Json<Value>,
) -> Response {
    stub.hits.lock().push(("PATCH".to_string(), table.clone()));
    if !stub.check_write(&table) {
        return stub_failure();
    }
    let Some(id) = params.get("id").and_then(|v| v.strip_prefix("eq.")) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "missing id filter" })),
        )
            .into_response();
    };
    let mut tables = stub.tables.lock();
    let rows = tables.entry(table).or_default();
    let mut updated = Vec::new();
    for row in rows.iter_mut() {
        if row["id"].as_str() == Some(id) {
            if let (Some(target), Some(source)) = (row.as_object_mut(), changes.as_object()) {
                for (key, value) in source {
                    target.insert(key.clone(), value.clone());
                }
            }
            updated.push(row.clone());
        }
    }
    Json(updated).into_response()
}

async fn delete_rows(
    State(stub): State<Arc<StubBackend>>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    stub.hits.lock().push(("DELETE".to_string(), table.clone()));
    if !stub.check_write(&table) {
        return stub_failure();
    }
    let Some(id) = params.get("id").and_then(|v| v.strip_prefix("eq.")) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "missing id filter" })),
        )
            .into_response();
    };
    let mut tables = stub.tables.lock();
    if let Some(rows) = tables.get_mut(&table) {
        rows.retain(|row| row["id"].as_str() != Some(id));
    }
    StatusCode::NO_CONTENT.into_response()
}

/// Test fixture: the stub backend plus a real [`AppState`] pointed at it.
struct TestFixture {
    state: AppState,
    stub: Arc<StubBackend>,
}

impl TestFixture {
    async fn new() -> Self {
        let stub = Arc::new(StubBackend::default());
        let router = stub_router(stub.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let config = Config {
            backend_url: url::Url::parse(&format!("http://{}", addr)).unwrap(),
            backend_key: "stub-service-key".to_string(),
            log_level: "warn".to_string(),
        };

        TestFixture {
            state: AppState::new(config),
            stub,
        }
    }

    fn seed_client(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.stub.seed(
            "clients",
            json!({
                "id": id,
                "name": name,
                "email": format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
                "phone": "555-0100",
                "created_at": Utc::now().to_rfc3339(),
            }),
        );
        id
    }

    fn seed_job(&self, title: &str, scheduled: DateTime<Utc>, client_id: Option<Uuid>) -> Uuid {
        let id = Uuid::new_v4();
        self.stub.seed(
            "jobs",
            json!({
                "id": id,
                "title": title,
                "status": "scheduled",
                "scheduled_date": scheduled.to_rfc3339(),
                "client_id": client_id,
                "created_at": Utc::now().to_rfc3339(),
                "clients": client_id.map(|_| json!({ "name": "Seeded", "email": null, "phone": null })),
            }),
        );
        id
    }

    fn seed_invoice(
        &self,
        number: &str,
        status: &str,
        due: DateTime<Utc>,
        amount: f64,
        client_id: Option<Uuid>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.stub.seed(
            "invoices",
            json!({
                "id": id,
                "invoice_number": number,
                "total_amount": amount,
                "status": status,
                "due_date": due.to_rfc3339(),
                "job_id": null,
                "client_id": client_id,
                "created_at": Utc::now().to_rfc3339(),
            }),
        );
        id
    }
}

#[tokio::test]
async fn test_reload_aggregates_all_four_collections() {
    let fixture = TestFixture::new().await;
    let client_id = fixture.seed_client("Acme Builders");
    fixture.seed_job("Roof inspection", Utc::now(), Some(client_id));
    fixture.seed_invoice("INV-2026-0001", "sent", Utc::now(), 300.0, Some(client_id));
    fixture.stub.seed(
        "communications",
        json!({
            "id": Uuid::new_v4(),
            "type": "email",
            "subject": "Quote",
            "content": "Attached.",
            "urgency": "normal",
            "client_id": client_id,
            "job_id": null,
            "created_at": Utc::now().to_rfc3339(),
            "clients": { "name": "Acme Builders" },
        }),
    );

    fixture.state.reload().await;

    let snapshot = fixture.state.snapshot();
    assert_eq!(snapshot.jobs.len(), 1);
    assert_eq!(snapshot.clients.len(), 1);
    assert_eq!(snapshot.invoices.len(), 1);
    assert_eq!(snapshot.communications.len(), 1);
    // Embedded join rows survive the round trip.
    assert_eq!(snapshot.jobs[0].client.as_ref().unwrap().name, "Seeded");
    assert_eq!(
        snapshot.communications[0].client.as_ref().unwrap().name,
        "Acme Builders"
    );
    assert_eq!(snapshot.dashboard_counts().jobs, 1);
}

#[tokio::test]
async fn test_failed_reload_retains_previous_snapshot() {
    let fixture = TestFixture::new().await;
    fixture.seed_client("First Client");
    fixture.state.reload().await;
    assert_eq!(fixture.state.snapshot().clients.len(), 1);

    // New data arrives, but one of the four queries now fails; the whole
    // reload must be abandoned.
    fixture.seed_client("Second Client");
    fixture.stub.fail("invoices");
    fixture.state.reload().await;

    assert_eq!(fixture.state.snapshot().clients.len(), 1);
}

#[tokio::test]
async fn test_sign_in_event_triggers_reload() {
    let fixture = TestFixture::new().await;
    fixture.seed_client("Listener Client");
    let listener = fixture.state.spawn_session_listener();

    let session = fixture
        .state
        .backend
        .sign_in_with_password("owner@example.com", "hunter2")
        .await
        .unwrap();
    assert_eq!(session.user.email.as_deref(), Some("owner@example.com"));
    assert!(fixture.state.backend.current_session().is_some());

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(fixture.state.snapshot().clients.len(), 1);

    fixture.state.backend.sign_out().await.unwrap();
    assert!(fixture.state.backend.current_session().is_none());

    listener.abort();
}

#[tokio::test]
async fn test_successful_mutation_reloads_exactly_once() {
    let fixture = TestFixture::new().await;
    fixture.state.reload().await;
    let reads_before = fixture.stub.read_count();

    let job = fixture
        .state
        .create_job(&CreateJobRequest {
            title: "Install heat pump".to_string(),
            status: "scheduled".to_string(),
            scheduled_date: Utc::now(),
            client_id: None,
        })
        .await
        .unwrap();

    assert_eq!(job.title, "Install heat pump");
    // One reload is four reads, one per collection.
    assert_eq!(fixture.stub.read_count(), reads_before + 4);
    assert_eq!(fixture.state.snapshot().jobs.len(), 1);
}

#[tokio::test]
async fn test_failed_mutation_skips_reload_and_snapshot() {
    let fixture = TestFixture::new().await;
    fixture.state.reload().await;
    let reads_before = fixture.stub.read_count();
    fixture.stub.fail("jobs");

    let result = fixture
        .state
        .create_job(&CreateJobRequest {
            title: "Doomed".to_string(),
            status: "scheduled".to_string(),
            scheduled_date: Utc::now(),
            client_id: None,
        })
        .await;

    assert!(result.is_err());
    assert_eq!(fixture.stub.read_count(), reads_before);
    assert!(fixture.state.snapshot().jobs.is_empty());
}

#[tokio::test]
async fn test_job_update_and_delete() {
    let fixture = TestFixture::new().await;
    let id = fixture.seed_job("Repoint chimney", Utc::now(), None);
    fixture.state.reload().await;

    let updated = fixture
        .state
        .update_job(
            id,
            &UpdateJobRequest {
                status: Some("completed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, "completed");
    assert_eq!(fixture.state.snapshot().jobs[0].status, "completed");

    fixture.state.delete_job(id).await.unwrap();
    assert!(fixture.state.snapshot().jobs.is_empty());
}

#[tokio::test]
async fn test_client_create_and_update() {
    let fixture = TestFixture::new().await;

    let client = fixture
        .state
        .create_client(&CreateClientRequest {
            name: "Seaside Motel".to_string(),
            email: Some("front@seasidemotel.example".to_string()),
            phone: None,
        })
        .await
        .unwrap();
    assert_eq!(fixture.state.snapshot().clients.len(), 1);

    let updated = fixture
        .state
        .update_client(
            client.id,
            &crate::models::UpdateClientRequest {
                phone: Some("555-0199".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.phone.as_deref(), Some("555-0199"));
    assert_eq!(
        fixture.state.snapshot().clients[0].phone.as_deref(),
        Some("555-0199")
    );
}

#[tokio::test]
async fn test_invoice_number_derives_from_snapshot_count() {
    let fixture = TestFixture::new().await;
    let due = Utc::now();
    for n in 1..=3 {
        fixture.seed_invoice(&format!("INV-2026-000{}", n), "paid", due, 100.0, None);
    }
    fixture.state.reload().await;

    let invoice = fixture
        .state
        .create_invoice(&CreateInvoiceRequest {
            total_amount: 480.0,
            status: InvoiceStatus::Draft,
            due_date: due,
            job_id: None,
            client_id: None,
        })
        .await
        .unwrap();

    assert_eq!(
        invoice.invoice_number,
        format!("INV-{}-0004", Local::now().year())
    );
    assert_eq!(fixture.state.snapshot().invoices.len(), 4);
}

#[tokio::test]
async fn test_chat_send_logs_one_conversation_row() {
    let fixture = TestFixture::new().await;
    fixture.seed_client("Chatty Client");
    fixture.state.reload().await;

    let mut chat = ChatSession::new();
    let reply = chat.send(&fixture.state, "Show me my clients").await;

    assert_eq!(reply.intent, Some(Intent::DisplayClients));
    assert_eq!(reply.content, "Here are your 1 clients");
    assert_eq!(chat.messages().len(), 2);

    let logged = fixture.stub.rows("ai_conversations");
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0]["tool_used"], "display_clients");
    assert_eq!(logged[0]["user_message"], "Show me my clients");
    assert_eq!(logged[0]["context_data"]["client_count"], 1);
}

#[tokio::test]
async fn test_chat_survives_conversation_log_failure() {
    let fixture = TestFixture::new().await;
    fixture.stub.fail("ai_conversations");

    let mut chat = ChatSession::new();
    let reply = chat.send(&fixture.state, "good morning").await;

    assert_eq!(reply.intent, Some(Intent::General));
    assert_eq!(chat.messages().len(), 2);
    assert!(fixture.stub.rows("ai_conversations").is_empty());
}

#[tokio::test]
async fn test_invoice_reminders_create_one_communication_each() {
    let fixture = TestFixture::new().await;
    let client_id = fixture.seed_client("Slow Payer");
    let past_due = Utc::now() - chrono::Duration::days(10);
    fixture.seed_invoice("INV-2026-0010", "sent", past_due, 200.0, Some(client_id));
    fixture.seed_invoice("INV-2026-0011", "sent", past_due, 250.0, Some(client_id));
    fixture.state.reload().await;

    let snapshot = fixture.state.snapshot();
    let insights = proactive_insights(&snapshot, Local::now().fixed_offset());
    let insight = insights
        .iter()
        .find(|i| i.kind == InsightKind::InvoiceFollowUp)
        .expect("expected an invoice follow-up insight");

    let outcome = execute_quick_action(&fixture.state, insight.action, insight).await;
    assert!(outcome.success);
    assert_eq!(outcome.message, "Sent payment reminders for 2 overdue invoices.");

    let reminders = fixture.stub.rows("communications");
    assert_eq!(reminders.len(), 2);
    assert!(reminders
        .iter()
        .all(|r| r["urgency"] == "high" && r["type"] == "email"));
    assert!(reminders
        .iter()
        .any(|r| r["subject"] == "Payment Reminder - Invoice INV-2026-0010"));
}

#[tokio::test]
async fn test_reminder_failure_aborts_without_rollback() {
    let fixture = TestFixture::new().await;
    let client_id = fixture.seed_client("Slow Payer");
    let past_due = Utc::now() - chrono::Duration::days(10);
    for n in 0..3 {
        fixture.seed_invoice(
            &format!("INV-2026-002{}", n),
            "sent",
            past_due,
            150.0,
            Some(client_id),
        );
    }
    fixture.state.reload().await;

    let snapshot = fixture.state.snapshot();
    let insights = proactive_insights(&snapshot, Local::now().fixed_offset());
    let insight = insights
        .iter()
        .find(|i| i.kind == InsightKind::InvoiceFollowUp)
        .expect("expected an invoice follow-up insight");

    // First reminder succeeds, the second is rejected mid-loop.
    fixture.stub.allow_writes("communications", 1);
    let outcome = execute_quick_action(&fixture.state, insight.action, insight).await;

    assert!(!outcome.success);
    assert_eq!(
        outcome.message,
        "Failed to send invoice reminders. Please try again."
    );
    assert_eq!(fixture.stub.rows("communications").len(), 1);
}
