//! History selection for a triage call.

use tracing::debug;

use crate::error::DatabaseError;
use crate::store::ThreadStore;
use crate::triage::types::{MessageRecord, MessagesByThread, ThreadMessage, TriageRequest};

/// Messages kept from the persistent store.
pub const RECENT_HISTORY_LIMIT: usize = 10;

/// Where the history for a call came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySource {
    Store,
    Memory,
}

impl HistorySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Store => "store",
            Self::Memory => "memory",
        }
    }
}

/// Pick the records for this request.
///
/// The web UI always reads the in-memory map. Other services read the store
/// when one is configured and it holds a non-empty thread; a store error is
/// returned, not treated as a miss.
pub async fn select_history(
    request: &TriageRequest,
    in_memory: &MessagesByThread,
    store: Option<&dyn ThreadStore>,
) -> Result<(HistorySource, Vec<MessageRecord>), DatabaseError> {
    if !request.is_web_ui() {
        if let Some(store) = store {
            if let Some(thread) = store.get_thread(&request.thread_id).await? {
                if !thread.messages.is_empty() {
                    let mut messages = thread.messages;
                    let skip = messages.len().saturating_sub(RECENT_HISTORY_LIMIT);
                    messages.drain(..skip);
                    return Ok((HistorySource::Store, messages));
                }
            }
            debug!(thread_id = %request.thread_id, "Thread not in store, using in-memory history");
        }
    }

    let messages = in_memory
        .get(&request.thread_id)
        .cloned()
        .unwrap_or_default();
    Ok((HistorySource::Memory, messages))
}

/// Normalize records into the shape the classifier and workflows consume.
pub fn normalize(records: &[MessageRecord], request: &TriageRequest) -> Vec<ThreadMessage> {
    records
        .iter()
        .map(|r| ThreadMessage::from_record(r, &request.thread_id, request.thread_type))
        .collect()
}
