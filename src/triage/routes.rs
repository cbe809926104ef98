//! REST endpoints for message triage.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::sync::RwLock;
use tracing::warn;

use crate::store::ThreadStore;
use crate::triage::router::TriageRouter;
use crate::triage::types::{MessagesByThread, TriageRequest};

/// Shared state for triage routes.
#[derive(Clone)]
pub struct TriageRouteState {
    pub router: Arc<TriageRouter>,
    pub history: Arc<RwLock<MessagesByThread>>,
    pub store: Option<Arc<dyn ThreadStore>>,
}

impl TriageRouteState {
    pub fn new(router: Arc<TriageRouter>, store: Option<Arc<dyn ThreadStore>>) -> Self {
        Self {
            router,
            history: Arc::new(RwLock::new(MessagesByThread::new())),
            store,
        }
    }
}

/// POST /api/triage
///
/// Records the incoming message, then triages it. Always 200; failures are
/// reported in the result body.
///
/// Messages the store accepted are not kept in memory; the in-memory map
/// only holds web UI threads, or every thread when no store is configured
/// or the store write failed.
async fn triage(
    State(state): State<TriageRouteState>,
    Json(request): Json<TriageRequest>,
) -> impl IntoResponse {
    let record = request.to_record();

    let persisted = match state.store {
        Some(ref store) if !request.is_web_ui() => {
            match store
                .append_message(&request.thread_id, request.thread_type, &record)
                .await
            {
                Ok(()) => true,
                Err(e) => {
                    warn!(thread_id = %request.thread_id, error = %e, "Failed to persist message");
                    false
                }
            }
        }
        _ => false,
    };

    let snapshot = {
        let mut history = state.history.write().await;
        let mut snapshot = MessagesByThread::new();
        if !persisted {
            let thread = history.entry(request.thread_id.clone()).or_default();
            thread.push(record);
            snapshot.insert(request.thread_id.clone(), thread.clone());
        } else if let Some(thread) = history.get(&request.thread_id) {
            snapshot.insert(request.thread_id.clone(), thread.clone());
        }
        snapshot
    };

    let result = state.router.triage(&request, &snapshot).await;
    Json(result)
}

/// GET /health
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// Build the triage REST routes.
pub fn triage_routes(state: TriageRouteState) -> Router {
    Router::new()
        .route("/api/triage", post(triage))
        .route("/health", get(health))
        .with_state(state)
}
