//! Server-side onboarding flow store backing `/api/onboarding-flow`.

use std::path::{Path, PathBuf};

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::SettingsError;
use crate::settings::model::OnboardingFlow;

/// Holds the current flow in memory, optionally persisted to a JSON file.
pub struct FlowStore {
    flow: RwLock<Option<OnboardingFlow>>,
    path: Option<PathBuf>,
    default_flow: OnboardingFlow,
}

impl FlowStore {
    /// In-memory only.
    pub fn in_memory(default_flow: OnboardingFlow) -> Self {
        Self {
            flow: RwLock::new(None),
            path: None,
            default_flow,
        }
    }

    /// File-backed. A missing or unreadable file starts from the default.
    pub async fn open(path: impl Into<PathBuf>, default_flow: OnboardingFlow) -> Self {
        let path = path.into();
        let flow = read_flow_file(&path).await;
        Self {
            flow: RwLock::new(flow),
            path: Some(path),
            default_flow,
        }
    }

    /// The stored flow, or the default when nothing has been stored.
    pub async fn get(&self) -> OnboardingFlow {
        self.flow
            .read()
            .await
            .clone()
            .unwrap_or_else(|| self.default_flow.clone())
    }

    /// Replace the stored flow, writing the file first when file-backed.
    pub async fn set(&self, flow: OnboardingFlow) -> Result<(), SettingsError> {
        if let Some(ref path) = self.path {
            let json = serde_json::to_string_pretty(&flow)?;
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
            tokio::fs::write(path, json).await?;
            debug!(path = %path.display(), "Onboarding flow written");
        }

        *self.flow.write().await = Some(flow);
        Ok(())
    }
}

async fn read_flow_file(path: &Path) -> Option<OnboardingFlow> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No onboarding flow file, using default");
            return None;
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read onboarding flow file");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(flow) => {
            info!(path = %path.display(), "Loaded onboarding flow file");
            Some(flow)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Corrupt onboarding flow file, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::model::FlowMode;

    fn legacy_flow() -> OnboardingFlow {
        OnboardingFlow {
            mode: FlowMode::Legacy,
            enabled: false,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn empty_store_returns_default() {
        let store = FlowStore::in_memory(OnboardingFlow::default());
        assert_eq!(store.get().await, OnboardingFlow::default());
    }

    #[tokio::test]
    async fn set_replaces_flow() {
        let store = FlowStore::in_memory(OnboardingFlow::default());
        store.set(legacy_flow()).await.unwrap();
        assert_eq!(store.get().await.mode, FlowMode::Legacy);
    }

    #[tokio::test]
    async fn file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("flow.json");

        let store = FlowStore::open(&path, OnboardingFlow::default()).await;
        assert!(store.get().await.enabled);
        store.set(legacy_flow()).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n  \"enabled\": false"));

        let reopened = FlowStore::open(&path, OnboardingFlow::default()).await;
        let flow = reopened.get().await;
        assert_eq!(flow.mode, FlowMode::Legacy);
        assert!(!flow.enabled);
    }

    #[tokio::test]
    async fn corrupt_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flow.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FlowStore::open(&path, OnboardingFlow::default()).await;
        assert_eq!(store.get().await, OnboardingFlow::default());
    }
}
