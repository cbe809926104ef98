//! Error types for thread-triage.

use std::time::Duration;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Outbound messaging errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to send message on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Channel {name} rejected the request with status {status}: {body}")]
    Rejected {
        name: String,
        status: u16,
        body: String,
    },

    #[error("Channel configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the identity, email and reply workflows.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Workflow {workflow} failed: {reason}")]
    Failed { workflow: String, reason: String },

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Delivery failed: {0}")]
    Delivery(#[from] ChannelError),
}

/// Triage errors. Never escape `TriageRouter::triage`; they become a failed
/// default result carrying the error text.
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("History lookup failed: {0}")]
    History(#[from] DatabaseError),

    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("No messages in thread {thread_id}")]
    EmptyHistory { thread_id: String },

    #[error("{0}")]
    Workflow(#[from] WorkflowError),

    #[error("{0}")]
    Channel(#[from] ChannelError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

/// Settings sync errors. Never escape `SettingsSync::load` / `save`.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Status(u16),

    #[error("Invalid settings URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
