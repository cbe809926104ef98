//! Onboarding flow settings model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How onboarding is driven.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FlowMode {
    /// The agent runs a free-form conversation to collect user fields.
    #[default]
    Agentic,
    /// A fixed script of messages.
    Legacy,
}

impl std::fmt::Display for FlowMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Agentic => write!(f, "agentic"),
            Self::Legacy => write!(f, "legacy"),
        }
    }
}

/// One scripted message of the legacy flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlowMessage {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub wait_for_response: bool,
    /// User field the reply to this message fills in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collect_user_info: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LegacySettings {
    #[serde(default)]
    pub messages: Vec<FlowMessage>,
}

/// A user field the agentic flow collects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserField {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AgenticSettings {
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default)]
    pub user_fields: Vec<UserField>,
    #[serde(default)]
    pub final_message: String,
}

/// The onboarding flow settings object.
///
/// Fields this process does not know about are kept in `extra` and written
/// back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OnboardingFlow {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub mode: FlowMode,
    #[serde(default)]
    pub legacy_settings: LegacySettings,
    #[serde(default)]
    pub agentic_settings: AgenticSettings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for OnboardingFlow {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: FlowMode::Agentic,
            legacy_settings: LegacySettings {
                messages: vec![
                    FlowMessage {
                        id: "welcome".into(),
                        text: "Hi! I'm your new AI assistant. Before we start, I'd like to \
                               get to know you a little."
                            .into(),
                        wait_for_response: false,
                        collect_user_info: None,
                    },
                    FlowMessage {
                        id: "name".into(),
                        text: "What's your name?".into(),
                        wait_for_response: true,
                        collect_user_info: Some("name".into()),
                    },
                    FlowMessage {
                        id: "email".into(),
                        text: "What email address should I use to reach you?".into(),
                        wait_for_response: true,
                        collect_user_info: Some("email".into()),
                    },
                ],
            },
            agentic_settings: AgenticSettings {
                system_prompt: "You are onboarding a new user. Be warm and brief, and collect \
                                the fields listed below one at a time."
                    .into(),
                user_fields: vec![
                    UserField {
                        id: "name".into(),
                        label: "Full name".into(),
                        required: true,
                        description: "The user's full name".into(),
                    },
                    UserField {
                        id: "email".into(),
                        label: "Email address".into(),
                        required: true,
                        description: "Where the user wants to receive email".into(),
                    },
                    UserField {
                        id: "business_type".into(),
                        label: "Business type".into(),
                        required: false,
                        description: "What kind of business the user runs".into(),
                    },
                ],
                final_message: "Thanks! You're all set.".into(),
            },
            extra: Map::new(),
        }
    }
}

/// Wire envelope for `/api/onboarding-flow`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowPayload {
    pub flow: OnboardingFlow,
}

/// Borrowing form of [`FlowPayload`] for requests.
#[derive(Debug, Serialize)]
pub(crate) struct FlowPayloadRef<'a> {
    pub flow: &'a OnboardingFlow,
}
