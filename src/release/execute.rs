//! The ordered repository mutations of a release.

use std::fmt;
use std::path::Path;

use tracing::{info, warn};

use crate::boundary::BoundaryWarning;
use crate::domain::{ReleaseTag, SemanticVersion, TagPattern};
use crate::git::Repository;
use crate::release::state::ReleaseDecision;
use crate::version_store::VersionStore;

/// One mutation step, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStep {
    DeleteExistingTag,
    WriteManifest,
    Commit,
    CreateTag,
    Push,
}

impl ExecutionStep {
    /// Short identifier reported when the step fails.
    pub fn name(&self) -> &'static str {
        match self {
            ExecutionStep::DeleteExistingTag => "delete-tag",
            ExecutionStep::WriteManifest => "manifest",
            ExecutionStep::Commit => "commit",
            ExecutionStep::CreateTag => "tag",
            ExecutionStep::Push => "push",
        }
    }

    /// Fatal steps stop the release; the others only warn.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ExecutionStep::Commit | ExecutionStep::CreateTag | ExecutionStep::Push
        )
    }

    /// Steps a decision runs. Tag deletion only happens when overriding.
    pub fn plan(decision: &ReleaseDecision) -> Vec<ExecutionStep> {
        let mut steps = Vec::with_capacity(5);
        if decision.is_override {
            steps.push(ExecutionStep::DeleteExistingTag);
        }
        steps.extend([
            ExecutionStep::WriteManifest,
            ExecutionStep::Commit,
            ExecutionStep::CreateTag,
            ExecutionStep::Push,
        ]);
        steps
    }
}

impl fmt::Display for ExecutionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExecutionStep::DeleteExistingTag => "Deleting existing tag",
            ExecutionStep::WriteManifest => "Updating manifest version",
            ExecutionStep::Commit => "Committing changes",
            ExecutionStep::CreateTag => "Creating release tag",
            ExecutionStep::Push => "Pushing to remote",
        };
        write!(f, "{}", label)
    }
}

/// Outcome of a finished release.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseReport {
    pub tag: String,
    pub version: SemanticVersion,
    pub is_override: bool,
    pub manifest_updated: bool,
    pub dry_run: bool,
    /// Non-fatal problems hit along the way.
    pub warnings: Vec<BoundaryWarning>,
}

impl ReleaseReport {
    /// Report for a run that stopped short of mutating anything.
    pub fn dry_run(tag: String, decision: &ReleaseDecision) -> Self {
        ReleaseReport {
            tag,
            version: decision.target_version,
            is_override: decision.is_override,
            manifest_updated: false,
            dry_run: true,
            warnings: Vec::new(),
        }
    }
}

/// A fatal step failure, with the warnings raised by the steps before it.
#[derive(Debug, Clone, PartialEq)]
pub struct StepFailure {
    pub step: ExecutionStep,
    pub detail: String,
    pub warnings: Vec<BoundaryWarning>,
}

impl ReleaseReport {
    fn failed(self, step: ExecutionStep, detail: impl Into<String>) -> StepFailure {
        StepFailure {
            step,
            detail: detail.into(),
            warnings: self.warnings,
        }
    }
}

/// Runs the planned steps against a repository, short-circuiting on the
/// first fatal failure. Nothing already done is rolled back.
pub struct Executor<'a, R: Repository + ?Sized> {
    pub repo: &'a R,
    pub store: &'a VersionStore,
    pub tag_pattern: &'a TagPattern,
    pub manifest_target: &'a Path,
    pub branch: &'a str,
    pub remote: &'a str,
}

impl<R: Repository + ?Sized> Executor<'_, R> {
    /// Execute `decision`; `on_step` is called before each step starts.
    pub fn run(
        &self,
        decision: &ReleaseDecision,
        message: &str,
        mut on_step: impl FnMut(ExecutionStep),
    ) -> Result<ReleaseReport, StepFailure> {
        let version = decision.target_version;
        let tag = ReleaseTag::for_version(self.tag_pattern, &version);
        let mut report = ReleaseReport {
            tag: tag.name.clone(),
            version,
            is_override: decision.is_override,
            manifest_updated: false,
            dry_run: false,
            warnings: Vec::new(),
        };

        for step in ExecutionStep::plan(decision) {
            on_step(step);
            match step {
                ExecutionStep::DeleteExistingTag => {
                    if !self.repo.delete_tag(&tag.name) {
                        let warning = BoundaryWarning::TagDeletionIncomplete {
                            tag: tag.name.clone(),
                        };
                        warn!("{}", warning);
                        report.warnings.push(warning);
                    }
                }
                ExecutionStep::WriteManifest => {
                    report.manifest_updated = self.store.write_version(self.manifest_target, &version);
                    if !report.manifest_updated {
                        let warning = BoundaryWarning::ManifestNotUpdated {
                            path: self.manifest_target.display().to_string(),
                            version: version.to_string(),
                        };
                        warn!("{}", warning);
                        report.warnings.push(warning);
                    }
                }
                ExecutionStep::Commit => {
                    if !self.repo.commit(message) {
                        return Err(report.failed(step, "could not commit the working tree"));
                    }
                }
                ExecutionStep::CreateTag => {
                    if !self.repo.create_annotated_tag(&tag.name, &tag.annotation_message) {
                        return Err(
                            report.failed(step, format!("could not create tag '{}'", tag.name))
                        );
                    }
                }
                ExecutionStep::Push => {
                    if !self.repo.push(self.branch, true) {
                        return Err(report.failed(
                            step,
                            format!(
                                "could not push '{}' and tags to '{}'",
                                self.branch, self.remote
                            ),
                        ));
                    }
                }
            }
        }

        info!(tag = %report.tag, version = %report.version, "release published");
        Ok(report)
    }
}
