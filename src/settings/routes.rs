//! REST endpoints for the onboarding flow.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tracing::error;

use crate::settings::model::FlowPayload;
use crate::settings::store::FlowStore;

/// Shared state for settings routes.
#[derive(Clone)]
pub struct SettingsRouteState {
    pub store: Arc<FlowStore>,
}

/// GET /api/onboarding-flow
async fn get_flow(State(state): State<SettingsRouteState>) -> impl IntoResponse {
    Json(FlowPayload {
        flow: state.store.get().await,
    })
}

/// POST /api/onboarding-flow
///
/// Body `{flow: ...}`. Malformed bodies are rejected by the extractor.
async fn save_flow(
    State(state): State<SettingsRouteState>,
    Json(payload): Json<FlowPayload>,
) -> impl IntoResponse {
    match state.store.set(payload.flow).await {
        Ok(()) => Json(serde_json::json!({"success": true})).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to store onboarding flow");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"success": false, "error": e.to_string()})),
            )
                .into_response()
        }
    }
}

/// Build the onboarding flow REST routes.
pub fn settings_routes(store: Arc<FlowStore>) -> Router {
    Router::new()
        .route("/api/onboarding-flow", get(get_flow).post(save_flow))
        .with_state(SettingsRouteState { store })
}
