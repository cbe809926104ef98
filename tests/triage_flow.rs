//! End-to-end triage through the HTTP routes.
//!
//! The LLM is scripted, the messaging vendor is a local Axum server, and the
//! thread store is an in-memory libSQL database. Everything in between is the
//! production wiring.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{Request, StatusCode};
use axum::routing::post;
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;

use thread_triage::channels::{A1BaseClient, MessagingClient};
use thread_triage::config::{AgentProfile, EnvSource, env_keys};
use thread_triage::error::LlmError;
use thread_triage::llm::provider::{CompletionRequest, CompletionResponse, LlmProvider, Role};
use thread_triage::store::{LibSqlThreadStore, ThreadStore};
use thread_triage::triage::{LlmIntentClassifier, TriageRouteState, TriageRouter, triage_routes};
use thread_triage::workflows::{AgentIdentityCard, LlmEmailComposer, LlmReplyWorkflow, Workflows};

/// Answers each kind of prompt with a fixed string.
struct ScriptedLlm {
    intent: &'static str,
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let system = request
            .messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.clone())
            .unwrap_or_default();

        let content = if system.contains("responseType") {
            format!(r#"{{"responseType": "{}"}}"#, self.intent)
        } else if system.contains("\"subject\"") {
            r#"{"subject": "Project update", "body": "Hi team, here is the update."}"#.to_string()
        } else {
            "Happy to help!".to_string()
        };

        Ok(CompletionResponse { content })
    }
}

type Outbox = Arc<Mutex<Vec<(String, Value)>>>;

async fn record_send(
    State(outbox): State<Outbox>,
    Path((kind, _account_id)): Path<(String, String)>,
    axum::Json(body): axum::Json<Value>,
) -> StatusCode {
    outbox.lock().unwrap().push((kind, body));
    StatusCode::OK
}

/// Start a fake messaging vendor, return (base URL, outbox).
async fn start_vendor() -> (String, Outbox) {
    let outbox: Outbox = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/v1/messages/{kind}/{account_id}/send", post(record_send))
        .with_state(Arc::clone(&outbox));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://127.0.0.1:{port}"), outbox)
}

struct App {
    router: Router,
    store: Arc<dyn ThreadStore>,
    outbox: Outbox,
}

async fn build_app(intent: &'static str) -> App {
    let (vendor, outbox) = start_vendor().await;

    let mut vars = HashMap::new();
    for (k, v) in [
        (env_keys::A1BASE_API_KEY, "key"),
        (env_keys::A1BASE_API_SECRET, "secret"),
        (env_keys::A1BASE_ACCOUNT_ID, "acct-1"),
        (env_keys::A1BASE_AGENT_NUMBER, "+15550001111"),
        (env_keys::AGENT_NAME, "Felicie"),
    ] {
        vars.insert(k.to_string(), v.to_string());
    }
    vars.insert(env_keys::A1BASE_API_URL.to_string(), vendor);
    let env: Arc<dyn EnvSource> = Arc::new(vars);

    let llm: Arc<dyn LlmProvider> = Arc::new(ScriptedLlm { intent });
    let messaging: Arc<dyn MessagingClient> = Arc::new(A1BaseClient::new(Arc::clone(&env)));
    let profile = AgentProfile::from_env(env.as_ref());
    let workflows = Workflows {
        identity: Arc::new(AgentIdentityCard::new(profile.clone())),
        email: Arc::new(LlmEmailComposer::new(Arc::clone(&llm))),
        reply: Arc::new(LlmReplyWorkflow::new(
            Arc::clone(&llm),
            Arc::clone(&messaging),
            Arc::clone(&env),
            profile.name,
        )),
    };

    let store: Arc<dyn ThreadStore> = Arc::new(LibSqlThreadStore::new_memory().await.unwrap());
    let router = TriageRouter::new(
        Arc::new(LlmIntentClassifier::new(llm)),
        workflows,
        messaging,
        env,
    )
    .with_store(Arc::clone(&store));

    App {
        router: triage_routes(TriageRouteState::new(
            Arc::new(router),
            Some(Arc::clone(&store)),
        )),
        store,
        outbox,
    }
}

fn request(service: &str, content: &str) -> Request<Body> {
    let body = serde_json::json!({
        "thread_id": "t-1",
        "message_id": format!("m-{content}"),
        "content": content,
        "sender_name": "Alice",
        "sender_number": "+15550002222",
        "thread_type": "individual",
        "timestamp": "2025-01-15T10:00:00Z",
        "service": service
    });
    Request::builder()
        .method("POST")
        .uri("/api/triage")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn call(app: &App, req: Request<Body>) -> Value {
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn identity_card_over_whatsapp() {
    let app = build_app("sendIdentityCard").await;
    let json = call(&app, request("whatsapp", "who are you")).await;

    assert_eq!(json["type"], "identity");
    assert_eq!(json["success"], true);
    assert!(json["message"].as_str().unwrap().contains("Felicie"));
    assert!(json["data"].as_array().unwrap().len() >= 2);
    assert!(app.outbox.lock().unwrap().is_empty());

    let thread = app.store.get_thread("t-1").await.unwrap().unwrap();
    assert_eq!(thread.messages.len(), 1);
}

#[tokio::test]
async fn email_over_whatsapp_sends_one_confirmation() {
    let app = build_app("handleEmailAction").await;
    let json = call(&app, request("whatsapp", "email the team")).await;

    assert_eq!(json["type"], "email");
    assert_eq!(json["data"]["subject"], "Project update");

    let outbox = app.outbox.lock().unwrap();
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].0, "individual");
    assert_eq!(
        outbox[0].1["content"],
        "I've prepared an email with the subject \"Project update\". Would you like me to send it?"
    );
    assert_eq!(outbox[0].1["to"], "+15550002222");
}

#[tokio::test]
async fn email_in_web_ui_is_only_drafted() {
    let app = build_app("handleEmailAction").await;
    let json = call(&app, request("web-ui", "email the team")).await;

    assert_eq!(json["message"], "Email drafted with subject: Project update");
    assert!(app.outbox.lock().unwrap().is_empty());
    assert!(app.store.get_thread("t-1").await.unwrap().is_none());
}

#[tokio::test]
async fn reply_over_whatsapp_is_delivered_by_workflow() {
    let app = build_app("simpleResponse").await;
    let json = call(&app, request("whatsapp", "thanks!")).await;

    assert_eq!(json["type"], "default");
    assert_eq!(json["message"], "Default response sent");

    let outbox = app.outbox.lock().unwrap();
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].1["content"], "Happy to help!");
}

#[tokio::test]
async fn unknown_intent_replies_in_web_ui() {
    let app = build_app("bookFlight").await;
    let json = call(&app, request("web-ui", "book me a flight")).await;

    assert_eq!(json["type"], "default");
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Happy to help!");
    assert!(json.get("data").is_none());
}
