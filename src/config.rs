//! Configuration types.
//!
//! Everything here is derived from environment variables. Values used on the
//! request path (messaging identity, settings base URL) are resolved at call
//! time through an [`EnvSource`] and never cached.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::ConfigError;

/// Environment variable names.
pub mod env_keys {
    pub const A1BASE_API_KEY: &str = "A1BASE_API_KEY";
    pub const A1BASE_API_SECRET: &str = "A1BASE_API_SECRET";
    pub const A1BASE_ACCOUNT_ID: &str = "A1BASE_ACCOUNT_ID";
    pub const A1BASE_AGENT_NUMBER: &str = "A1BASE_AGENT_NUMBER";
    pub const A1BASE_API_URL: &str = "A1BASE_API_URL";
    pub const AUTH_SERVICE_URL: &str = "AUTH_SERVICE_URL";
    pub const DEPLOYMENT_HOST: &str = "DEPLOYMENT_HOST";
    pub const AGENT_NAME: &str = "AGENT_NAME";
    pub const AGENT_VERIFICATION_URL: &str = "AGENT_VERIFICATION_URL";
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
    pub const TRIAGE_MODEL: &str = "TRIAGE_MODEL";
    pub const TRIAGE_DB_PATH: &str = "TRIAGE_DB_PATH";
    pub const TRIAGE_FLOW_PATH: &str = "TRIAGE_FLOW_PATH";
    pub const TRIAGE_PORT: &str = "TRIAGE_PORT";
}

/// Fallback base URL for settings requests outside an interactive context.
pub const LOCAL_BASE_URL: &str = "http://localhost:3000";

/// Source of configuration variables.
pub trait EnvSource: Send + Sync {
    /// Look up a variable. Empty values count as unset.
    fn var(&self, key: &str) -> Option<String>;

    /// Look up a required variable.
    fn require(&self, key: &str) -> Result<String, ConfigError> {
        self.var(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }
}

/// Reads the process environment on every lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.trim().is_empty()).cloned()
    }
}

/// Account and sender number the agent speaks as on the messaging channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagingIdentity {
    pub account_id: String,
    pub agent_number: String,
}

impl MessagingIdentity {
    /// Resolve from the environment. Called per send, not at startup.
    pub fn resolve(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        Ok(Self {
            account_id: env.require(env_keys::A1BASE_ACCOUNT_ID)?,
            agent_number: env.require(env_keys::A1BASE_AGENT_NUMBER)?,
        })
    }
}

/// Absolute base URL for settings requests made outside an interactive context.
///
/// Checks the auth-service URL, then the deployment host (served over https),
/// then falls back to localhost.
pub fn resolve_settings_base(env: &dyn EnvSource) -> String {
    if let Some(url) = env.var(env_keys::AUTH_SERVICE_URL) {
        return url.trim_end_matches('/').to_string();
    }
    if let Some(host) = env.var(env_keys::DEPLOYMENT_HOST) {
        return format!("https://{}", host.trim_end_matches('/'));
    }
    LOCAL_BASE_URL.to_string()
}

/// Public identity of the agent, shown on its identity card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentProfile {
    pub name: String,
    pub number: Option<String>,
    pub verification_url: Option<String>,
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self {
            name: "A1 Agent".to_string(),
            number: None,
            verification_url: None,
        }
    }
}

impl AgentProfile {
    pub fn from_env(env: &dyn EnvSource) -> Self {
        let defaults = Self::default();
        Self {
            name: env.var(env_keys::AGENT_NAME).unwrap_or(defaults.name),
            number: env.var(env_keys::A1BASE_AGENT_NUMBER),
            verification_url: env.var(env_keys::AGENT_VERIFICATION_URL),
        }
    }
}

/// Settings for the HTTP server binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// libSQL history database. `None` keeps history in memory only.
    pub db_path: Option<PathBuf>,
    /// File backing the onboarding flow store.
    pub flow_path: PathBuf,
    pub model: Option<String>,
}

impl ServerConfig {
    pub fn from_env(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let port = match env.var(env_keys::TRIAGE_PORT) {
            Some(raw) => raw.parse().map_err(|e| ConfigError::InvalidValue {
                key: env_keys::TRIAGE_PORT.to_string(),
                message: format!("{e}"),
            })?,
            None => 3000,
        };

        Ok(Self {
            port,
            db_path: env.var(env_keys::TRIAGE_DB_PATH).map(PathBuf::from),
            flow_path: env
                .var(env_keys::TRIAGE_FLOW_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data/onboarding-flow.json")),
            model: env.var(env_keys::TRIAGE_MODEL),
        })
    }
}
