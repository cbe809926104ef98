//! Email drafting workflow.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::WorkflowError;
use crate::llm::extract_json_object;
use crate::llm::provider::{ChatMessage, CompletionRequest, LlmProvider};
use crate::triage::types::{EmailDraft, ThreadMessage};
use crate::workflows::{EmailWorkflow, render_conversation};

const EMAIL_MAX_TOKENS: u32 = 1024;
const EMAIL_TEMPERATURE: f32 = 0.4;

/// Drafts an email with an LLM.
pub struct LlmEmailComposer {
    llm: Arc<dyn LlmProvider>,
}

impl LlmEmailComposer {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl EmailWorkflow for LlmEmailComposer {
    async fn construct_email(
        &self,
        messages: &[ThreadMessage],
    ) -> Result<EmailDraft, WorkflowError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(build_email_system_prompt()),
            ChatMessage::user(format!(
                "Conversation:\n{}\nDraft the email the user is asking for.",
                render_conversation(messages)
            )),
        ])
        .with_temperature(EMAIL_TEMPERATURE)
        .with_max_tokens(EMAIL_MAX_TOKENS);

        let response = self.llm.complete(request).await?;
        let draft = parse_email_response(&response.content).map_err(|reason| {
            warn!(raw_response = %response.content, error = %reason, "Unusable email draft");
            WorkflowError::Failed {
                workflow: "email".into(),
                reason,
            }
        })?;

        info!(subject = %draft.subject, "Email drafted");
        Ok(draft)
    }
}

fn build_email_system_prompt() -> String {
    "You write emails on behalf of the user you are chatting with. Use the conversation to \
     work out the recipient, purpose and tone.\n\n\
     Respond with ONLY a JSON object:\n\
     {\"subject\": \"...\", \"body\": \"...\"}"
        .to_string()
}

#[derive(Debug, Deserialize)]
struct EmailResponse {
    #[serde(default)]
    subject: String,
    #[serde(default)]
    body: String,
}

fn parse_email_response(raw: &str) -> Result<EmailDraft, String> {
    let json_str = extract_json_object(raw);
    let response: EmailResponse =
        serde_json::from_str(&json_str).map_err(|e| format!("JSON parse error: {e}"))?;

    let subject = response.subject.trim();
    if subject.is_empty() {
        return Err("email draft requires a subject".into());
    }

    Ok(EmailDraft {
        subject: subject.to_string(),
        body: response.body,
    })
}
