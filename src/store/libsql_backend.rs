//! libSQL `ThreadStore` backed by a local file or an in-memory database.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::{StoredThread, ThreadStore};
use crate::triage::types::{MessageContent, MessageRecord, MessageType, ThreadType};

/// libSQL thread store.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlThreadStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlThreadStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let store = Self::from_database(db)?;
        migrations::run_migrations(&store.conn).await?;
        info!(path = %path.display(), "Thread store opened");
        Ok(store)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let store = Self::from_database(db)?;
        migrations::run_migrations(&store.conn).await?;
        Ok(store)
    }

    fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }
}

// ── Helper functions ────────────────────────────────────────────────

fn thread_type_to_str(thread_type: ThreadType) -> &'static str {
    match thread_type {
        ThreadType::Individual => "individual",
        ThreadType::Group => "group",
    }
}

fn str_to_thread_type(s: &str) -> ThreadType {
    match s {
        "group" => ThreadType::Group,
        _ => ThreadType::Individual,
    }
}

/// Convert `Option<String>` to libsql Value.
fn opt_text_owned(s: Option<String>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s),
        None => libsql::Value::Null,
    }
}

fn encode_message_type(t: Option<MessageType>) -> Result<Option<String>, DatabaseError> {
    t.map(|t| serde_json::to_string(&t))
        .transpose()
        .map_err(|e| DatabaseError::Serialization(format!("message_type: {e}")))
}

fn encode_message_content(c: Option<&MessageContent>) -> Result<Option<String>, DatabaseError> {
    c.map(serde_json::to_string)
        .transpose()
        .map_err(|e| DatabaseError::Serialization(format!("message_content: {e}")))
}

const MESSAGE_COLUMNS: &str =
    "message_id, content, sender_number, sender_name, timestamp, message_type, message_content";

fn row_to_record(row: &libsql::Row) -> Result<MessageRecord, DatabaseError> {
    let get_text = |idx: i32| -> Result<String, DatabaseError> {
        row.get::<String>(idx)
            .map_err(|e| DatabaseError::Query(format!("row parse (column {idx}): {e}")))
    };

    let message_type = match row.get::<String>(5).ok() {
        Some(raw) => Some(
            serde_json::from_str::<MessageType>(&raw)
                .map_err(|e| DatabaseError::Serialization(format!("message_type: {e}")))?,
        ),
        None => None,
    };
    let message_content = match row.get::<String>(6).ok() {
        Some(raw) => Some(
            serde_json::from_str::<MessageContent>(&raw)
                .map_err(|e| DatabaseError::Serialization(format!("message_content: {e}")))?,
        ),
        None => None,
    };

    Ok(MessageRecord {
        message_id: get_text(0)?,
        content: get_text(1)?,
        sender_number: get_text(2)?,
        sender_name: get_text(3)?,
        timestamp: get_text(4)?,
        message_type,
        message_content,
    })
}

// ── Trait implementation ────────────────────────────────────────────

#[async_trait]
impl ThreadStore for LibSqlThreadStore {
    async fn get_thread(&self, thread_id: &str) -> Result<Option<StoredThread>, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                "SELECT thread_type FROM threads WHERE id = ?1",
                params![thread_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_thread: {e}")))?;

        let thread_type = match rows.next().await {
            Ok(Some(row)) => {
                let raw: String = row
                    .get(0)
                    .map_err(|e| DatabaseError::Query(format!("row parse: {e}")))?;
                str_to_thread_type(&raw)
            }
            Ok(None) => return Ok(None),
            Err(e) => return Err(DatabaseError::Query(format!("get_thread: {e}"))),
        };

        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {MESSAGE_COLUMNS} FROM thread_messages WHERE thread_id = ?1 ORDER BY seq ASC"
                ),
                params![thread_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_thread messages: {e}")))?;

        let mut messages = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("get_thread messages: {e}")))?
        {
            messages.push(row_to_record(&row)?);
        }

        debug!(thread_id = thread_id, count = messages.len(), "Thread loaded");
        Ok(Some(StoredThread {
            id: thread_id.to_string(),
            thread_type,
            messages,
        }))
    }

    async fn append_message(
        &self,
        thread_id: &str,
        thread_type: ThreadType,
        message: &MessageRecord,
    ) -> Result<(), DatabaseError> {
        let now = Utc::now().to_rfc3339();

        self.conn
            .execute(
                "INSERT INTO threads (id, thread_type, created_at, last_activity)
                 VALUES (?1, ?2, ?3, ?3)
                 ON CONFLICT (id) DO UPDATE SET last_activity = ?3",
                params![thread_id, thread_type_to_str(thread_type), now.clone()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("ensure thread: {e}")))?;

        let id = Uuid::new_v4().to_string();
        self.conn
            .execute(
                "INSERT INTO thread_messages (id, thread_id, message_id, content, sender_number,
                    sender_name, timestamp, message_type, message_content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    id.clone(),
                    thread_id,
                    message.message_id.clone(),
                    message.content.clone(),
                    message.sender_number.clone(),
                    message.sender_name.clone(),
                    message.timestamp.clone(),
                    opt_text_owned(encode_message_type(message.message_type)?),
                    opt_text_owned(encode_message_content(message.message_content.as_ref())?),
                    now,
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("append_message: {e}")))?;

        debug!(id = %id, thread_id = thread_id, "Message appended to thread");
        Ok(())
    }
}
