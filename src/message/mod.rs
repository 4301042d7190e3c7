//! Commit message generation
//!
//! A single [MessageGenerator] interface with two strategies:
//!
//! - [LocalMessageGenerator]: deterministic template built from change counts
//! - [RemoteMessageGenerator]: chat-completion request, falling back to the
//!   local template on any failure
//!
//! The strategy is picked once by [select_generator] from credential
//! presence, never re-decided per call.

pub mod local;
pub mod remote;

pub use local::LocalMessageGenerator;
pub use remote::RemoteMessageGenerator;

use crate::boundary::BoundaryWarning;
use crate::config::MessageConfig;
use crate::domain::{ChangeEntry, SemanticVersion};

/// Turns a change set and a target version into a commit message.
pub trait MessageGenerator {
    /// Always returns a non-empty message; failures degrade, never propagate.
    fn generate(&self, changes: &[ChangeEntry], version: &SemanticVersion) -> String;

    /// Short name shown to the operator ("remote" or "local").
    fn kind(&self) -> &'static str;

    /// Warning raised by the most recent [generate](MessageGenerator::generate)
    /// call, cleared once taken.
    fn take_warning(&self) -> Option<BoundaryWarning> {
        None
    }
}

/// Pick the message strategy for this run.
///
/// A present, non-blank credential selects the remote generator; anything
/// else selects the local template.
pub fn select_generator(
    config: &MessageConfig,
    project_name: &str,
    credential: Option<String>,
) -> Box<dyn MessageGenerator> {
    match credential.filter(|key| !key.trim().is_empty()) {
        Some(key) => Box::new(RemoteMessageGenerator::new(
            config.clone(),
            project_name.to_string(),
            key,
        )),
        None => Box::new(LocalMessageGenerator),
    }
}

/// Read the credential named by the configuration from the environment.
pub fn credential_from_env(config: &MessageConfig) -> Option<String> {
    std::env::var(&config.api_key_env)
        .ok()
        .filter(|key| !key.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_local_without_credential() {
        let generator = select_generator(&MessageConfig::default(), "demo", None);
        assert_eq!(generator.kind(), "local");
    }

    #[test]
    fn test_select_local_with_blank_credential() {
        let generator =
            select_generator(&MessageConfig::default(), "demo", Some("   ".to_string()));
        assert_eq!(generator.kind(), "local");
    }

    #[test]
    fn test_select_remote_with_credential() {
        let generator =
            select_generator(&MessageConfig::default(), "demo", Some("sk-test".to_string()));
        assert_eq!(generator.kind(), "remote");
    }
}
