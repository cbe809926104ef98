//! Outbound messaging to chat channels.

pub mod a1base;

pub use a1base::A1BaseClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChannelError;

/// Channel identifier used for every outbound message.
pub const WHATSAPP_SERVICE: &str = "whatsapp";

/// A message to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualMessage {
    pub content: String,
    pub from: String,
    pub to: String,
    pub service: String,
}

/// A message to a group thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMessage {
    pub content: String,
    pub from: String,
    pub thread_id: String,
    pub service: String,
}

/// Messaging vendor client. Pure I/O, no business logic.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Send a direct message on behalf of `account_id`.
    async fn send_individual(
        &self,
        account_id: &str,
        message: &IndividualMessage,
    ) -> Result<(), ChannelError>;

    /// Send a message into a group thread on behalf of `account_id`.
    async fn send_group(&self, account_id: &str, message: &GroupMessage)
    -> Result<(), ChannelError>;
}
