//! Intent classification: decides which workflow handles a message.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::TriageError;
use crate::llm::provider::{ChatMessage, CompletionRequest, LlmProvider};
use crate::llm::extract_json_object;
use crate::triage::types::ThreadMessage;

/// Max tokens for the classification call; the answer is a single tag.
const CLASSIFY_MAX_TOKENS: u32 = 128;

/// Temperature for classification (deterministic-ish).
const CLASSIFY_TEMPERATURE: f32 = 0.1;

/// Tag returned by the classifier.
///
/// Tags this crate has no handler for are kept verbatim in `Other` and are
/// routed exactly like `SimpleResponse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseType {
    SendIdentityCard,
    HandleEmailAction,
    SimpleResponse,
    Other(String),
}

impl ResponseType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::SendIdentityCard => "sendIdentityCard",
            Self::HandleEmailAction => "handleEmailAction",
            Self::SimpleResponse => "simpleResponse",
            Self::Other(tag) => tag,
        }
    }
}

impl From<&str> for ResponseType {
    fn from(tag: &str) -> Self {
        match tag.trim() {
            "sendIdentityCard" => Self::SendIdentityCard,
            "handleEmailAction" => Self::HandleEmailAction,
            "simpleResponse" => Self::SimpleResponse,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for ResponseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a conversation into a response type.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, messages: &[ThreadMessage]) -> Result<ResponseType, TriageError>;
}

/// LLM-backed classifier.
pub struct LlmIntentClassifier {
    llm: Arc<dyn LlmProvider>,
}

impl LlmIntentClassifier {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl IntentClassifier for LlmIntentClassifier {
    async fn classify(&self, messages: &[ThreadMessage]) -> Result<ResponseType, TriageError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(build_classify_system_prompt()),
            ChatMessage::user(build_classify_user_prompt(messages)),
        ])
        .with_temperature(CLASSIFY_TEMPERATURE)
        .with_max_tokens(CLASSIFY_MAX_TOKENS);

        let response = self.llm.complete(request).await?;

        let response_type = parse_classify_response(&response.content).map_err(|e| {
            warn!(
                raw_response = %response.content,
                error = %e,
                "Failed to parse classification response"
            );
            TriageError::Classification(e)
        })?;

        debug!(response_type = %response_type, model = self.llm.model_name(), "Classified intent");
        Ok(response_type)
    }
}

// ── Prompt construction ─────────────────────────────────────────────

fn build_classify_system_prompt() -> String {
    "You route chat messages sent to an AI agent. Read the conversation and decide how the \
     agent should respond to the latest message.\n\n\
     Response types:\n\
     - \"sendIdentityCard\": the user asks who the agent is, wants its identity, credentials \
     or contact card.\n\
     - \"handleEmailAction\": the user wants an email written, drafted or sent.\n\
     - \"simpleResponse\": anything else; a normal conversational reply.\n\n\
     Respond with ONLY a JSON object:\n\
     {\"responseType\": \"...\"}"
        .to_string()
}

fn build_classify_user_prompt(messages: &[ThreadMessage]) -> String {
    let mut prompt = String::with_capacity(512);
    prompt.push_str("Conversation:\n");

    let last = messages.len().saturating_sub(1);
    for (i, msg) in messages.iter().enumerate() {
        let content_preview: String = msg.content.chars().take(500).collect();
        let marker = if i == last { " (latest)" } else { "" };
        prompt.push_str(&format!(
            "[{}]{} {}: {}\n",
            i + 1,
            marker,
            msg.sender_name,
            content_preview
        ));
    }

    prompt
}

// ── Response parsing ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassifyResponse {
    response_type: String,
}

fn parse_classify_response(raw: &str) -> Result<ResponseType, String> {
    let json_str = extract_json_object(raw);
    let response: ClassifyResponse =
        serde_json::from_str(&json_str).map_err(|e| format!("JSON parse error: {e}"))?;
    Ok(ResponseType::from(response.response_type.as_str()))
}
