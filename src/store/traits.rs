//! Async interface for persistent thread history.

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::triage::types::{MessageRecord, ThreadType};

/// A persisted thread with its messages in insertion order.
#[derive(Debug, Clone)]
pub struct StoredThread {
    pub id: String,
    pub thread_type: ThreadType,
    pub messages: Vec<MessageRecord>,
}

/// Backend-agnostic thread history store.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// Fetch a thread and all of its messages. `None` if the thread is unknown.
    async fn get_thread(&self, thread_id: &str) -> Result<Option<StoredThread>, DatabaseError>;

    /// Append a message, creating the thread if needed.
    async fn append_message(
        &self,
        thread_id: &str,
        thread_type: ThreadType,
        message: &MessageRecord,
    ) -> Result<(), DatabaseError>;
}
