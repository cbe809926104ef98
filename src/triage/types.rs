//! Shared types for message triage.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Service name of the browser chat UI. Every other value is treated as a
/// generic messaging channel.
pub const WEB_UI_SERVICE: &str = "web-ui";

/// In-memory thread history, keyed by thread id.
pub type MessagesByThread = HashMap<String, Vec<MessageRecord>>;

// ── Thread kind ─────────────────────────────────────────────────────

/// Whether a thread is a one-to-one chat or a group chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadType {
    Individual,
    Group,
}

impl fmt::Display for ThreadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Individual => write!(f, "individual"),
            Self::Group => write!(f, "group"),
        }
    }
}

// ── Message payloads ────────────────────────────────────────────────

/// Kind of chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    #[default]
    Text,
    RichText,
    Image,
    Video,
    Audio,
    Location,
    Reaction,
    GroupInvite,
    #[serde(other)]
    UnsupportedMessageType,
}

/// Type-specific message payload. Which fields are set depends on the
/// message type: text, coordinates, a quoted message, a reaction, group
/// invite details, or an error description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quoted_message_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quoted_message_sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction: Option<String>,
    #[serde(
        default,
        rename = "groupName",
        skip_serializing_if = "Option::is_none"
    )]
    pub group_name: Option<String>,
    #[serde(
        default,
        rename = "inviteCode",
        skip_serializing_if = "Option::is_none"
    )]
    pub invite_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MessageContent {
    /// Plain-text payload.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

// ── History records ─────────────────────────────────────────────────

/// A message as stored in thread history, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub message_id: String,
    pub content: String,
    pub sender_number: String,
    pub sender_name: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<MessageType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_content: Option<MessageContent>,
}

/// A normalized message, the shape handed to the classifier and workflows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub message_id: String,
    pub content: String,
    pub sender_number: String,
    pub sender_name: String,
    pub thread_id: String,
    pub thread_type: ThreadType,
    pub timestamp: String,
    pub message_type: MessageType,
    pub message_content: MessageContent,
}

impl ThreadMessage {
    /// Normalize a history record. A missing type means text; a missing
    /// payload becomes the raw content as text.
    pub fn from_record(record: &MessageRecord, thread_id: &str, thread_type: ThreadType) -> Self {
        Self {
            message_id: record.message_id.clone(),
            content: record.content.clone(),
            sender_number: record.sender_number.clone(),
            sender_name: record.sender_name.clone(),
            thread_id: thread_id.to_string(),
            thread_type,
            timestamp: record.timestamp.clone(),
            message_type: record.message_type.unwrap_or_default(),
            message_content: record
                .message_content
                .clone()
                .unwrap_or_else(|| MessageContent::text(&record.content)),
        }
    }
}

// ── Triage request ──────────────────────────────────────────────────

/// The triggering message plus routing metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageRequest {
    pub thread_id: String,
    pub message_id: String,
    pub content: String,
    #[serde(default)]
    pub message_type: MessageType,
    #[serde(default)]
    pub message_content: MessageContent,
    pub sender_name: String,
    pub sender_number: String,
    pub thread_type: ThreadType,
    pub timestamp: String,
    pub service: String,
}

impl TriageRequest {
    pub fn is_web_ui(&self) -> bool {
        self.service == WEB_UI_SERVICE
    }

    /// The triggering message as a history record.
    pub fn to_record(&self) -> MessageRecord {
        MessageRecord {
            message_id: self.message_id.clone(),
            content: self.content.clone(),
            sender_number: self.sender_number.clone(),
            sender_name: self.sender_name.clone(),
            timestamp: self.timestamp.clone(),
            message_type: Some(self.message_type),
            message_content: Some(self.message_content.clone()),
        }
    }
}

// ── Triage result ───────────────────────────────────────────────────

/// Outcome category of a triage call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriageKind {
    Identity,
    Default,
    Email,
}

/// Subject/body pair produced by the email workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailDraft {
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

/// Structured payload of a triage result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TriageData {
    Lines(Vec<String>),
    Email(EmailDraft),
}

/// Result of a triage call. Fields are private so the `data` shape always
/// matches `type`: identity carries lines, email carries a draft, default
/// carries nothing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriageResult {
    #[serde(rename = "type")]
    kind: TriageKind,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<TriageData>,
}

impl TriageResult {
    pub fn identity(lines: Vec<String>) -> Self {
        Self {
            kind: TriageKind::Identity,
            success: true,
            message: Some(lines.join("\n")),
            data: Some(TriageData::Lines(lines)),
        }
    }

    pub fn email(message: impl Into<String>, draft: EmailDraft) -> Self {
        Self {
            kind: TriageKind::Email,
            success: true,
            message: Some(message.into()),
            data: Some(TriageData::Email(draft)),
        }
    }

    pub fn reply(message: impl Into<String>) -> Self {
        Self {
            kind: TriageKind::Default,
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            kind: TriageKind::Default,
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn kind(&self) -> TriageKind {
        self.kind
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn data(&self) -> Option<&TriageData> {
        self.data.as_ref()
    }
}
