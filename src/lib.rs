//! Thread triage: routes chat messages to the workflow that should answer
//! them, and syncs the onboarding flow settings.

pub mod channels;
pub mod config;
pub mod error;
pub mod llm;
pub mod settings;
pub mod store;
pub mod triage;
pub mod workflows;
