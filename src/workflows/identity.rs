//! Identity card workflow.

use async_trait::async_trait;
use tracing::info;

use crate::config::AgentProfile;
use crate::error::WorkflowError;
use crate::triage::types::ThreadType;
use crate::workflows::IdentityWorkflow;

/// Builds identity card lines from a static agent profile.
pub struct AgentIdentityCard {
    profile: AgentProfile,
}

impl AgentIdentityCard {
    pub fn new(profile: AgentProfile) -> Self {
        Self { profile }
    }
}

#[async_trait]
impl IdentityWorkflow for AgentIdentityCard {
    async fn verify_identity(
        &self,
        message: &str,
        thread_type: ThreadType,
        thread_id: &str,
        sender_number: &str,
    ) -> Result<Vec<String>, WorkflowError> {
        info!(
            thread_id = thread_id,
            thread_type = %thread_type,
            sender = sender_number,
            trigger_chars = message.len(),
            "Building identity card"
        );

        let mut lines = Vec::with_capacity(4);
        lines.push(match thread_type {
            ThreadType::Individual => format!("Hi! I'm {}, an AI agent.", self.profile.name),
            ThreadType::Group => format!("Hi everyone! I'm {}, an AI agent.", self.profile.name),
        });
        if let Some(ref number) = self.profile.number {
            lines.push(format!("You can reach me directly at {number}."));
        }
        match self.profile.verification_url {
            Some(ref url) => lines.push(format!("You can verify my identity here: {url}")),
            None => lines.push("My identity is registered with my messaging provider.".to_string()),
        }

        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn full_profile_card() {
        let card = AgentIdentityCard::new(AgentProfile {
            name: "Felicie".into(),
            number: Some("+15550001111".into()),
            verification_url: Some("https://verify.example.com/felicie".into()),
        });
        let lines = card
            .verify_identity("who are you", ThreadType::Individual, "t-1", "+15550002222")
            .await
            .unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Felicie"));
        assert!(lines[1].contains("+15550001111"));
        assert!(lines[2].contains("https://verify.example.com/felicie"));
    }

    #[tokio::test]
    async fn group_greeting_and_minimal_profile() {
        let card = AgentIdentityCard::new(AgentProfile::default());
        let lines = card
            .verify_identity("who is this bot", ThreadType::Group, "g-1", "+15550002222")
            .await
            .unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Hi everyone!"));
    }
}
