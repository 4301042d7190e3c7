//! Release states and the pure transition function between them.

use crate::domain::SemanticVersion;
use crate::error::{ReleaseError, Result};
use crate::release::execute::{ExecutionStep, ReleaseReport};

/// The version a release will publish and whether it republishes an
/// existing tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseDecision {
    pub target_version: SemanticVersion,
    pub is_override: bool,
}

impl ReleaseDecision {
    pub fn new(target_version: SemanticVersion) -> Self {
        ReleaseDecision {
            target_version,
            is_override: false,
        }
    }

    pub fn overriding(target_version: SemanticVersion) -> Self {
        ReleaseDecision {
            target_version,
            is_override: true,
        }
    }
}

/// Why a release ended without publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    Cancelled,
    NoReleaseTags,
    ExecutionFailed { step: ExecutionStep, detail: String },
}

impl From<AbortReason> for ReleaseError {
    fn from(reason: AbortReason) -> Self {
        match reason {
            AbortReason::Cancelled => ReleaseError::Cancelled,
            AbortReason::NoReleaseTags => ReleaseError::NoReleaseTags,
            AbortReason::ExecutionFailed { step, detail } => {
                ReleaseError::execution(step.name(), detail)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseState {
    SelectingBumpClass,
    SelectingOverrideVersion,
    ConfirmingRelease { candidate: SemanticVersion },
    /// The candidate's tag already exists.
    ConfirmingOverride { candidate: SemanticVersion },
    PreviewingChanges { decision: ReleaseDecision },
    GeneratingMessage { decision: ReleaseDecision },
    Executing { decision: ReleaseDecision, message: String },
    Done(ReleaseReport),
    Aborted(AbortReason),
}

/// Inputs that move the release forward.
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseEvent {
    BumpSelected(SemanticVersion),
    OverrideRequested,
    OverrideVersionSelected(SemanticVersion),
    NoReleaseTags,
    TagConflict,
    /// Proceed with a free tag, or override a conflicting one.
    Confirmed,
    ChooseDifferentVersion,
    Cancelled,
    PreviewRendered,
    MessageAccepted(String),
    Executed(ReleaseReport),
    ExecutionFailed { step: ExecutionStep, detail: String },
}

impl ReleaseState {
    pub fn name(&self) -> &'static str {
        match self {
            ReleaseState::SelectingBumpClass => "SelectingBumpClass",
            ReleaseState::SelectingOverrideVersion => "SelectingOverrideVersion",
            ReleaseState::ConfirmingRelease { .. } => "ConfirmingRelease",
            ReleaseState::ConfirmingOverride { .. } => "ConfirmingOverride",
            ReleaseState::PreviewingChanges { .. } => "PreviewingChanges",
            ReleaseState::GeneratingMessage { .. } => "GeneratingMessage",
            ReleaseState::Executing { .. } => "Executing",
            ReleaseState::Done(_) => "Done",
            ReleaseState::Aborted(_) => "Aborted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ReleaseState::Done(_) | ReleaseState::Aborted(_))
    }

    /// Apply an event.
    ///
    /// Cancellation is accepted in every non-terminal state. Any other pair
    /// not listed below is an [ReleaseError::InvalidTransition].
    pub fn next(self, event: ReleaseEvent) -> Result<ReleaseState> {
        use ReleaseEvent as E;
        use ReleaseState as S;

        let next = match (self, event) {
            (state, E::Cancelled) if !state.is_terminal() => S::Aborted(AbortReason::Cancelled),

            (S::SelectingBumpClass, E::BumpSelected(candidate)) => {
                S::ConfirmingRelease { candidate }
            }
            (S::SelectingBumpClass, E::OverrideRequested) => S::SelectingOverrideVersion,

            (S::SelectingOverrideVersion, E::OverrideVersionSelected(version)) => {
                S::PreviewingChanges {
                    decision: ReleaseDecision::overriding(version),
                }
            }
            (S::SelectingOverrideVersion, E::NoReleaseTags) => {
                S::Aborted(AbortReason::NoReleaseTags)
            }

            (S::ConfirmingRelease { candidate }, E::TagConflict) => {
                S::ConfirmingOverride { candidate }
            }
            (S::ConfirmingRelease { candidate }, E::Confirmed) => S::PreviewingChanges {
                decision: ReleaseDecision::new(candidate),
            },

            (S::ConfirmingOverride { candidate }, E::Confirmed) => S::PreviewingChanges {
                decision: ReleaseDecision::overriding(candidate),
            },
            (S::ConfirmingOverride { .. }, E::ChooseDifferentVersion) => S::SelectingBumpClass,

            (S::PreviewingChanges { decision }, E::PreviewRendered) => {
                S::GeneratingMessage { decision }
            }

            (S::GeneratingMessage { decision }, E::MessageAccepted(message)) => {
                S::Executing { decision, message }
            }

            (S::Executing { .. }, E::Executed(report)) => S::Done(report),
            (S::Executing { .. }, E::ExecutionFailed { step, detail }) => {
                S::Aborted(AbortReason::ExecutionFailed { step, detail })
            }

            (state, event) => {
                return Err(ReleaseError::InvalidTransition(format!(
                    "{:?} in state {}",
                    event,
                    state.name()
                )))
            }
        };
        Ok(next)
    }
}
