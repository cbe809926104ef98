//! Default conversational reply.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::channels::{GroupMessage, IndividualMessage, MessagingClient, WHATSAPP_SERVICE};
use crate::config::{EnvSource, MessagingIdentity};
use crate::error::{ChannelError, WorkflowError};
use crate::llm::provider::{ChatMessage, CompletionRequest, LlmProvider};
use crate::triage::types::{ThreadMessage, ThreadType, WEB_UI_SERVICE};
use crate::workflows::{ReplyWorkflow, render_conversation};

const REPLY_MAX_TOKENS: u32 = 1024;
const REPLY_TEMPERATURE: f32 = 0.7;

/// Generates a reply with an LLM and, outside the web UI, sends it.
pub struct LlmReplyWorkflow {
    llm: Arc<dyn LlmProvider>,
    messaging: Arc<dyn MessagingClient>,
    env: Arc<dyn EnvSource>,
    agent_name: String,
}

impl LlmReplyWorkflow {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        messaging: Arc<dyn MessagingClient>,
        env: Arc<dyn EnvSource>,
        agent_name: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            messaging,
            env,
            agent_name: agent_name.into(),
        }
    }

    async fn deliver(
        &self,
        reply: &str,
        thread_type: ThreadType,
        thread_id: &str,
        sender_number: &str,
    ) -> Result<(), ChannelError> {
        let identity = MessagingIdentity::resolve(self.env.as_ref())?;
        match thread_type {
            ThreadType::Individual => {
                self.messaging
                    .send_individual(
                        &identity.account_id,
                        &IndividualMessage {
                            content: reply.to_string(),
                            from: identity.agent_number,
                            to: sender_number.to_string(),
                            service: WHATSAPP_SERVICE.to_string(),
                        },
                    )
                    .await
            }
            ThreadType::Group => {
                self.messaging
                    .send_group(
                        &identity.account_id,
                        &GroupMessage {
                            content: reply.to_string(),
                            from: identity.agent_number,
                            thread_id: thread_id.to_string(),
                            service: WHATSAPP_SERVICE.to_string(),
                        },
                    )
                    .await
            }
        }
    }
}

#[async_trait]
impl ReplyWorkflow for LlmReplyWorkflow {
    async fn default_reply(
        &self,
        messages: &[ThreadMessage],
        thread_type: ThreadType,
        thread_id: &str,
        sender_number: &str,
        service: &str,
    ) -> Result<String, WorkflowError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(format!(
                "You are {}, a helpful AI agent chatting over {}. Reply to the latest \
                 message in a friendly, concise way. Respond with the reply text only.",
                self.agent_name,
                match thread_type {
                    ThreadType::Individual => "a direct message",
                    ThreadType::Group => "a group chat",
                }
            )),
            ChatMessage::user(render_conversation(messages)),
        ])
        .with_temperature(REPLY_TEMPERATURE)
        .with_max_tokens(REPLY_MAX_TOKENS);

        let response = self.llm.complete(request).await?;
        let reply = response.content.trim().to_string();
        if reply.is_empty() {
            return Err(WorkflowError::Failed {
                workflow: "reply".into(),
                reason: "model returned an empty reply".into(),
            });
        }

        if service == WEB_UI_SERVICE {
            debug!(thread_id = thread_id, "Reply returned to web UI");
            return Ok(reply);
        }

        self.deliver(&reply, thread_type, thread_id, sender_number)
            .await?;
        info!(thread_id = thread_id, thread_type = %thread_type, "Reply delivered");
        Ok(reply)
    }
}
