//! Schema versioning for the thread store.
//!
//! Applied versions are recorded in `schema_version`. Opening a store applies
//! whatever is newer than the recorded maximum, in order.

use libsql::Connection;
use tracing::{debug, info};

use crate::error::DatabaseError;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// Append only.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "thread_history",
    sql: r#"
        CREATE TABLE IF NOT EXISTS threads (
            id TEXT PRIMARY KEY,
            thread_type TEXT NOT NULL,
            created_at TEXT NOT NULL,
            last_activity TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS thread_messages (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            thread_id TEXT NOT NULL REFERENCES threads(id) ON DELETE CASCADE,
            message_id TEXT NOT NULL,
            content TEXT NOT NULL,
            sender_number TEXT NOT NULL,
            sender_name TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            message_type TEXT,
            message_content TEXT,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_thread_messages_thread
            ON thread_messages(thread_id, seq);
    "#,
}];

/// Bring the schema up to the latest version.
pub async fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .await
    .map_err(|e| DatabaseError::Migration(format!("schema_version table: {e}")))?;

    let applied = current_version(conn).await?;
    let pending = MIGRATIONS.iter().filter(|m| m.version > applied);

    for migration in pending {
        apply(conn, migration).await?;
    }

    debug!(version = current_version(conn).await?, "Thread store schema ready");
    Ok(())
}

async fn apply(conn: &Connection, migration: &Migration) -> Result<(), DatabaseError> {
    info!(
        version = migration.version,
        name = migration.name,
        "Applying thread store migration"
    );

    let fail = |e: libsql::Error| {
        DatabaseError::Migration(format!(
            "V{} {}: {e}",
            migration.version, migration.name
        ))
    };

    conn.execute_batch(migration.sql).await.map_err(fail)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, name) VALUES (?1, ?2)",
        libsql::params![migration.version, migration.name],
    )
    .await
    .map_err(fail)?;
    Ok(())
}

/// Highest applied version; 0 on a fresh database.
async fn current_version(conn: &Connection) -> Result<i64, DatabaseError> {
    let read_err = |e: libsql::Error| DatabaseError::Migration(format!("schema version: {e}"));

    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM schema_version", ())
        .await
        .map_err(read_err)?;

    match rows.next().await.map_err(read_err)? {
        Some(row) => row.get::<i64>(0).map_err(read_err),
        None => Ok(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn fresh_conn() -> Connection {
        libsql::Builder::new_local(":memory:")
            .build()
            .await
            .unwrap()
            .connect()
            .unwrap()
    }

    async fn table_exists(conn: &Connection, table: &str) -> bool {
        let mut rows = conn
            .query(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                libsql::params![table],
            )
            .await
            .unwrap();
        let count: i64 = rows.next().await.unwrap().unwrap().get(0).unwrap();
        count == 1
    }

    #[tokio::test]
    async fn fresh_database_gets_thread_tables() {
        let conn = fresh_conn().await;
        assert!(current_version(&conn).await.is_err());

        run_migrations(&conn).await.unwrap();
        assert!(table_exists(&conn, "threads").await);
        assert!(table_exists(&conn, "thread_messages").await);
        assert_eq!(current_version(&conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn rerun_is_a_no_op() {
        let conn = fresh_conn().await;
        run_migrations(&conn).await.unwrap();
        run_migrations(&conn).await.unwrap();

        let mut rows = conn
            .query("SELECT COUNT(*), MAX(name) FROM schema_version", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 1);
        assert_eq!(row.get::<String>(1).unwrap(), "thread_history");
    }
}
