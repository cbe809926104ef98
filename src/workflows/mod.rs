//! Workflows the triage router dispatches to.
//!
//! Each workflow is a trait so the router can be exercised without an LLM
//! or a messaging vendor. Reference implementations:
//! - [`AgentIdentityCard`]: identity card lines from the agent profile
//! - [`LlmEmailComposer`]: subject/body draft from the conversation
//! - [`LlmReplyWorkflow`]: conversational reply, delivered on the channel

pub mod email;
pub mod identity;
pub mod reply;

pub use email::LlmEmailComposer;
pub use identity::AgentIdentityCard;
pub use reply::LlmReplyWorkflow;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::WorkflowError;
use crate::triage::types::{EmailDraft, ThreadMessage, ThreadType};

/// Produces the lines of the agent's identity card.
#[async_trait]
pub trait IdentityWorkflow: Send + Sync {
    async fn verify_identity(
        &self,
        message: &str,
        thread_type: ThreadType,
        thread_id: &str,
        sender_number: &str,
    ) -> Result<Vec<String>, WorkflowError>;
}

/// Drafts an email from the conversation.
#[async_trait]
pub trait EmailWorkflow: Send + Sync {
    async fn construct_email(&self, messages: &[ThreadMessage])
    -> Result<EmailDraft, WorkflowError>;
}

/// Generates the default conversational reply.
///
/// Outside the web UI the implementation delivers the reply itself.
#[async_trait]
pub trait ReplyWorkflow: Send + Sync {
    async fn default_reply(
        &self,
        messages: &[ThreadMessage],
        thread_type: ThreadType,
        thread_id: &str,
        sender_number: &str,
        service: &str,
    ) -> Result<String, WorkflowError>;
}

/// The workflow set a router dispatches to.
#[derive(Clone)]
pub struct Workflows {
    pub identity: Arc<dyn IdentityWorkflow>,
    pub email: Arc<dyn EmailWorkflow>,
    pub reply: Arc<dyn ReplyWorkflow>,
}

/// Render a conversation for workflow prompts.
pub(crate) fn render_conversation(messages: &[ThreadMessage]) -> String {
    let mut out = String::with_capacity(messages.len() * 64);
    for msg in messages {
        let name = if msg.sender_name.is_empty() {
            msg.sender_number.as_str()
        } else {
            msg.sender_name.as_str()
        };
        out.push_str(&format!("{}: {}\n", name, msg.content));
    }
    out
}
