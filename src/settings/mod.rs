//! Onboarding flow settings.
//!
//! `SettingsSync` is the client half: it loads and saves the flow against
//! `<base>/api/onboarding-flow`. `FlowStore` plus `settings_routes` is the
//! server half that answers those requests.

pub mod context;
pub mod model;
pub mod routes;
pub mod store;
pub mod sync;

pub use context::{InteractiveContext, Notifier, PageContext, ServerContext, TracingNotifier};
pub use model::{AgenticSettings, FlowMessage, FlowMode, FlowPayload, LegacySettings, OnboardingFlow, UserField};
pub use routes::settings_routes;
pub use store::FlowStore;
pub use sync::{DEFAULT_LOAD_TIMEOUT, FLOW_ENDPOINT, SettingsSync};
