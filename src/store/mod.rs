//! Persistent thread history.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlThreadStore;
pub use traits::{StoredThread, ThreadStore};
