//! Capabilities the settings sync needs from its host.

use tracing::{error, warn};

/// Whether the caller runs inside an interactive page, and where that page
/// is served from.
pub trait InteractiveContext: Send + Sync {
    /// Origin of the hosting page, e.g. `https://app.example.com`.
    fn page_origin(&self) -> Option<String>;

    fn is_interactive(&self) -> bool {
        self.page_origin().is_some()
    }
}

/// Headless process. Settings requests use the environment-derived base.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerContext;

impl InteractiveContext for ServerContext {
    fn page_origin(&self) -> Option<String> {
        None
    }
}

/// Interactive caller served from a known origin.
#[derive(Debug, Clone)]
pub struct PageContext {
    origin: String,
}

impl PageContext {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
        }
    }
}

impl InteractiveContext for PageContext {
    fn page_origin(&self) -> Option<String> {
        Some(self.origin.clone())
    }
}

/// User-facing notifications.
pub trait Notifier: Send + Sync {
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Emits notifications as log events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn warn(&self, message: &str) {
        warn!(notification = message, "User notification");
    }

    fn error(&self, message: &str) {
        error!(notification = message, "User notification");
    }
}
