//! Triage router. Classifies the latest message of a thread and hands it to
//! the matching workflow.
//!
//! Flow:
//! 1. History selection (in-memory map or persistent store)
//! 2. Normalization
//! 3. Intent classification
//! 4. Dispatch to identity, email or reply workflow
//!
//! The router sends at most one message itself: the email confirmation.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::channels::{IndividualMessage, MessagingClient, WHATSAPP_SERVICE};
use crate::config::{EnvSource, MessagingIdentity};
use crate::error::TriageError;
use crate::store::ThreadStore;
use crate::triage::history::{normalize, select_history};
use crate::triage::intent::{IntentClassifier, ResponseType};
use crate::triage::types::{EmailDraft, MessagesByThread, ThreadMessage, TriageRequest, TriageResult};
use crate::workflows::Workflows;

/// Message returned when an error carries no text.
const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// Message returned after the reply workflow delivered on the channel.
const REPLY_SENT: &str = "Default response sent";

/// Routes a message to the identity, email or reply workflow.
pub struct TriageRouter {
    classifier: Arc<dyn IntentClassifier>,
    workflows: Workflows,
    messaging: Arc<dyn MessagingClient>,
    store: Option<Arc<dyn ThreadStore>>,
    env: Arc<dyn EnvSource>,
}

impl TriageRouter {
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        workflows: Workflows,
        messaging: Arc<dyn MessagingClient>,
        env: Arc<dyn EnvSource>,
    ) -> Self {
        Self {
            classifier,
            workflows,
            messaging,
            store: None,
            env,
        }
    }

    /// Use a persistent thread store for non web-UI history.
    pub fn with_store(mut self, store: Arc<dyn ThreadStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Triage one message. Never fails: errors become a failed default
    /// result carrying the error text.
    pub async fn triage(
        &self,
        request: &TriageRequest,
        messages_by_thread: &MessagesByThread,
    ) -> TriageResult {
        info!(
            thread_id = %request.thread_id,
            service = %request.service,
            "Triaging message"
        );

        match self.try_triage(request, messages_by_thread).await {
            Ok(result) => result,
            Err(e) => {
                error!(thread_id = %request.thread_id, error = %e, "Triage failed");
                failure_result(e.to_string())
            }
        }
    }

    async fn try_triage(
        &self,
        request: &TriageRequest,
        messages_by_thread: &MessagesByThread,
    ) -> Result<TriageResult, TriageError> {
        let (source, records) =
            select_history(request, messages_by_thread, self.store.as_deref()).await?;
        debug!(
            thread_id = %request.thread_id,
            source = source.as_str(),
            count = records.len(),
            "History selected"
        );

        let messages = normalize(&records, request);
        let response_type = self.classifier.classify(&messages).await?;
        info!(
            thread_id = %request.thread_id,
            response_type = %response_type,
            "Intent classified"
        );

        match response_type {
            ResponseType::SendIdentityCard => self.send_identity_card(request, &messages).await,
            ResponseType::HandleEmailAction => self.handle_email(request, &messages).await,
            ResponseType::SimpleResponse | ResponseType::Other(_) => {
                self.simple_response(request, &messages).await
            }
        }
    }

    async fn send_identity_card(
        &self,
        request: &TriageRequest,
        messages: &[ThreadMessage],
    ) -> Result<TriageResult, TriageError> {
        let last = messages.last().ok_or_else(|| TriageError::EmptyHistory {
            thread_id: request.thread_id.clone(),
        })?;

        let lines = self
            .workflows
            .identity
            .verify_identity(
                &last.content,
                request.thread_type,
                &request.thread_id,
                &request.sender_number,
            )
            .await?;

        info!(thread_id = %request.thread_id, lines = lines.len(), "Identity card built");
        Ok(TriageResult::identity(lines))
    }

    async fn handle_email(
        &self,
        request: &TriageRequest,
        messages: &[ThreadMessage],
    ) -> Result<TriageResult, TriageError> {
        let draft = self.workflows.email.construct_email(messages).await?;

        if request.is_web_ui() {
            info!(thread_id = %request.thread_id, "Email drafted for web UI");
            return Ok(TriageResult::email(
                format!("Email drafted with subject: {}", draft.subject),
                draft,
            ));
        }

        let confirmation = email_confirmation(&draft);
        let identity = MessagingIdentity::resolve(self.env.as_ref())?;
        self.messaging
            .send_individual(
                &identity.account_id,
                &IndividualMessage {
                    content: confirmation.clone(),
                    from: identity.agent_number,
                    to: request.sender_number.clone(),
                    service: WHATSAPP_SERVICE.to_string(),
                },
            )
            .await?;

        info!(
            thread_id = %request.thread_id,
            to = %request.sender_number,
            "Email confirmation sent"
        );
        Ok(TriageResult::email(confirmation, draft))
    }

    async fn simple_response(
        &self,
        request: &TriageRequest,
        messages: &[ThreadMessage],
    ) -> Result<TriageResult, TriageError> {
        let reply = self
            .workflows
            .reply
            .default_reply(
                messages,
                request.thread_type,
                &request.thread_id,
                &request.sender_number,
                &request.service,
            )
            .await?;

        if request.is_web_ui() {
            Ok(TriageResult::reply(reply))
        } else {
            Ok(TriageResult::reply(REPLY_SENT))
        }
    }
}

fn failure_result(error_text: String) -> TriageResult {
    if error_text.trim().is_empty() {
        TriageResult::failed(UNKNOWN_ERROR)
    } else {
        TriageResult::failed(error_text)
    }
}

fn email_confirmation(draft: &EmailDraft) -> String {
    format!(
        "I've prepared an email with the subject \"{}\". Would you like me to send it?",
        draft.subject
    )
}
