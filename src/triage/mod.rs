//! Message triage.
//!
//! A triage call picks the thread history, classifies the latest message
//! into a response type and dispatches to the identity, email or reply
//! workflow. The web UI (`service == "web-ui"`) reads in-memory history and
//! gets results back in the response; every other service reads the
//! persistent store and is answered on the messaging channel.

pub mod history;
pub mod intent;
pub mod router;
pub mod routes;
pub mod types;

pub use intent::{IntentClassifier, LlmIntentClassifier, ResponseType};
pub use router::TriageRouter;
pub use routes::{TriageRouteState, triage_routes};
pub use types::{
    EmailDraft, MessageContent, MessageRecord, MessageType, MessagesByThread, ThreadMessage,
    ThreadType, TriageData, TriageKind, TriageRequest, TriageResult, WEB_UI_SERVICE,
};
