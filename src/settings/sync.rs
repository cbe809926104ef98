//! Load and save the onboarding flow against the settings endpoint.
//!
//! Neither call fails: `load` falls back to the injected default flow and
//! `save` reports `false`. Load is bounded by a timeout; save is not.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::{EnvSource, resolve_settings_base};
use crate::error::SettingsError;
use crate::settings::context::{InteractiveContext, Notifier};
use crate::settings::model::{FlowPayload, FlowPayloadRef, OnboardingFlow};

/// Path of the settings endpoint, relative to the base URL.
pub const FLOW_ENDPOINT: &str = "/api/onboarding-flow";

/// Upper bound on a load, request and body parse included.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(2);

const LOAD_FAILED_NOTICE: &str = "Failed to load onboarding flow settings";
const SAVE_FAILED_NOTICE: &str = "Failed to save to server";

/// Client for the remote onboarding flow store.
pub struct SettingsSync {
    client: reqwest::Client,
    context: Arc<dyn InteractiveContext>,
    notifier: Arc<dyn Notifier>,
    env: Arc<dyn EnvSource>,
    default_flow: OnboardingFlow,
    load_timeout: Duration,
}

impl SettingsSync {
    pub fn new(
        client: reqwest::Client,
        context: Arc<dyn InteractiveContext>,
        notifier: Arc<dyn Notifier>,
        env: Arc<dyn EnvSource>,
        default_flow: OnboardingFlow,
    ) -> Self {
        Self {
            client,
            context,
            notifier,
            env,
            default_flow,
            load_timeout: DEFAULT_LOAD_TIMEOUT,
        }
    }

    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    /// Fetch the stored flow, or a copy of the default on any failure.
    pub async fn load(&self) -> OnboardingFlow {
        match self.try_load().await {
            Ok(flow) => {
                info!(mode = %flow.mode, "Loaded onboarding flow");
                flow
            }
            Err(e) => {
                warn!(error = %e, "Failed to load onboarding flow, using default");
                if self.context.is_interactive() {
                    self.notifier.warn(LOAD_FAILED_NOTICE);
                }
                self.default_flow.clone()
            }
        }
    }

    /// Store the flow. `true` only when the endpoint accepted it.
    ///
    /// Unlike `load`, a failure notifies whether or not the context is
    /// interactive.
    pub async fn save(&self, flow: &OnboardingFlow) -> bool {
        match self.try_save(flow).await {
            Ok(()) => {
                info!("Saved onboarding flow");
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to save onboarding flow");
                self.notifier.error(SAVE_FAILED_NOTICE);
                false
            }
        }
    }

    /// Absolute endpoint URL for the current context. Read on every call.
    pub fn endpoint(&self) -> Result<reqwest::Url, SettingsError> {
        let base = match self.context.page_origin() {
            Some(origin) if self.context.is_interactive() => {
                origin.trim_end_matches('/').to_string()
            }
            _ => resolve_settings_base(self.env.as_ref()),
        };
        let raw = format!("{base}{FLOW_ENDPOINT}");
        reqwest::Url::parse(&raw).map_err(|e| SettingsError::InvalidUrl(format!("{raw}: {e}")))
    }

    async fn try_load(&self) -> Result<OnboardingFlow, SettingsError> {
        let url = self.endpoint()?;
        debug!(url = %url, timeout_ms = self.load_timeout.as_millis() as u64, "Loading onboarding flow");

        let exchange = async {
            let resp = self.client.get(url).send().await?;
            let status = resp.status();
            if !status.is_success() {
                return Err(SettingsError::Status(status.as_u16()));
            }
            let payload: FlowPayload = resp.json().await?;
            Ok(payload.flow)
        };

        tokio::time::timeout(self.load_timeout, exchange)
            .await
            .map_err(|_| SettingsError::Timeout(self.load_timeout))?
    }

    async fn try_save(&self, flow: &OnboardingFlow) -> Result<(), SettingsError> {
        let url = self.endpoint()?;
        let resp = self
            .client
            .post(url)
            .json(&FlowPayloadRef { flow })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SettingsError::Status(status.as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::config::env_keys;
    use crate::settings::context::{PageContext, ServerContext, TracingNotifier};

    fn sync_with(context: Arc<dyn InteractiveContext>, env: HashMap<String, String>) -> SettingsSync {
        SettingsSync::new(
            reqwest::Client::new(),
            context,
            Arc::new(TracingNotifier),
            Arc::new(env),
            OnboardingFlow::default(),
        )
    }

    #[test]
    fn interactive_context_uses_page_origin() {
        let mut env = HashMap::new();
        env.insert(env_keys::AUTH_SERVICE_URL.to_string(), "https://auth.example.com".to_string());
        let sync = sync_with(Arc::new(PageContext::new("https://app.example.com/")), env);
        assert_eq!(
            sync.endpoint().unwrap().as_str(),
            "https://app.example.com/api/onboarding-flow"
        );
    }

    #[test]
    fn server_context_uses_environment() {
        let mut env = HashMap::new();
        env.insert(env_keys::DEPLOYMENT_HOST.to_string(), "triage.example.dev".to_string());
        let sync = sync_with(Arc::new(ServerContext), env);
        assert_eq!(
            sync.endpoint().unwrap().as_str(),
            "https://triage.example.dev/api/onboarding-flow"
        );
    }

    #[test]
    fn server_context_defaults_to_localhost() {
        let sync = sync_with(Arc::new(ServerContext), HashMap::new());
        assert_eq!(
            sync.endpoint().unwrap().as_str(),
            "http://localhost:3000/api/onboarding-flow"
        );
    }

    #[test]
    fn unparseable_base_is_an_error() {
        let mut env = HashMap::new();
        env.insert(env_keys::AUTH_SERVICE_URL.to_string(), "not a url".to_string());
        let sync = sync_with(Arc::new(ServerContext), env);
        assert!(matches!(sync.endpoint(), Err(SettingsError::InvalidUrl(_))));
    }

    #[test]
    fn default_timeout_is_two_seconds() {
        let sync = sync_with(Arc::new(ServerContext), HashMap::new());
        assert_eq!(sync.load_timeout, Duration::from_secs(2));
        let sync = sync.with_load_timeout(Duration::from_millis(50));
        assert_eq!(sync.load_timeout, Duration::from_millis(50));
    }
}
