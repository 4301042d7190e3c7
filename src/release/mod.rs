//! Interactive release orchestration.
//!
//! A release is a finite state machine (see [state]) driven by
//! [ReleaseOrchestrator]. Every operator decision happens before the
//! `Executing` state, so backing out of any prompt leaves the repository
//! untouched.

pub mod execute;
pub mod state;

pub use execute::{ExecutionStep, Executor, ReleaseReport, StepFailure};
pub use state::{AbortReason, ReleaseDecision, ReleaseEvent, ReleaseState};

use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::Config;
use crate::domain::{BumpClass, ChangeEntry, ChangeSummary, SemanticVersion, TagPattern};
use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use crate::interaction::{Interaction, Panel, Table};
use crate::message::MessageGenerator;
use crate::version_store::{CurrentVersion, VersionStore};

/// Existing versions listed before "show more".
const OVERRIDE_PAGE_SIZE: usize = 10;
/// Change entries listed in the preview table.
const PREVIEW_LIMIT: usize = 15;
/// Commits shown in the welcome summary.
const RECENT_COMMITS: usize = 5;

/// Settings for one release run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseOptions {
    pub project_name: String,
    pub branch: String,
    pub remote: String,
    pub manifest_target: PathBuf,
    pub tag_pattern: TagPattern,
    /// Run every decision but skip all repository mutations.
    pub dry_run: bool,
}

impl ReleaseOptions {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(ReleaseOptions {
            project_name: config.project_name.clone(),
            branch: config.repository.branch.clone(),
            remote: config.repository.remote.clone(),
            manifest_target: config.manifest.target.clone(),
            tag_pattern: config.tag_pattern()?,
            dry_run: false,
        })
    }
}

/// Facts gathered once before the state machine starts.
struct ReleaseContext {
    changes: Vec<ChangeEntry>,
    current: SemanticVersion,
}

pub struct ReleaseOrchestrator<'a, R: Repository + ?Sized> {
    repo: &'a R,
    store: &'a VersionStore,
    generator: &'a dyn MessageGenerator,
    ui: &'a mut dyn Interaction,
    options: ReleaseOptions,
}

impl<'a, R: Repository + ?Sized> ReleaseOrchestrator<'a, R> {
    pub fn new(
        repo: &'a R,
        store: &'a VersionStore,
        generator: &'a dyn MessageGenerator,
        ui: &'a mut dyn Interaction,
        options: ReleaseOptions,
    ) -> Self {
        ReleaseOrchestrator {
            repo,
            store,
            generator,
            ui,
            options,
        }
    }

    /// Run a release to completion.
    ///
    /// Returns the report of a finished (or dry-run) release. An aborted
    /// release is returned as the matching [ReleaseError].
    pub fn run(&mut self) -> Result<ReleaseReport> {
        let context = self.prepare()?;
        let mut state = ReleaseState::SelectingBumpClass;

        loop {
            state = match state {
                ReleaseState::Done(report) => return Ok(report),
                ReleaseState::Aborted(reason) => {
                    info!(reason = ?reason, "release aborted");
                    return Err(reason.into());
                }
                current => {
                    let event = match self.handle(&current, &context) {
                        Ok(event) => event,
                        Err(ReleaseError::Cancelled) => ReleaseEvent::Cancelled,
                        Err(e) => {
                            self.ui.clear_progress();
                            return Err(e);
                        }
                    };
                    debug!(state = current.name(), event = ?event, "transition");
                    current.next(event)?
                }
            };
        }
    }

    /// Gate on pending changes and a parseable current version.
    fn prepare(&mut self) -> Result<ReleaseContext> {
        self.ui.report_progress("Inspecting working tree");
        let changes = self.repo.uncommitted_changes();
        if changes.is_empty() {
            self.ui.clear_progress();
            return Err(ReleaseError::NoPendingChanges);
        }

        let current = self.store.current_version(self.repo);
        let recent = self.repo.recent_commits(RECENT_COMMITS);
        self.ui.clear_progress();
        let parsed = current.parse()?;

        self.show_welcome(&current, &changes);
        if !recent.is_empty() {
            let table = recent.iter().fold(
                Table::new("Recent commits", ["Hash", "Date", "Author", "Subject"]),
                |table, commit| {
                    table.row([
                        commit.hash.as_str(),
                        commit.date.as_str(),
                        commit.author.as_str(),
                        commit.subject.as_str(),
                    ])
                },
            );
            self.ui.show_table(&table);
        }

        Ok(ReleaseContext {
            changes,
            current: parsed,
        })
    }

    fn show_welcome(&mut self, current: &CurrentVersion, changes: &[ChangeEntry]) {
        let summary = ChangeSummary::from_changes(changes);
        let mut body = format!(
            "Project: {}\nBranch: {} -> {}\nCurrent version: {} (from {})\nPending changes: {} ({} modified, {} added, {} deleted)",
            self.options.project_name,
            self.options.branch,
            self.options.remote,
            current.raw,
            current.source,
            summary.total(),
            summary.modified,
            summary.added,
            summary.deleted,
        );
        body.push_str(&format!("\nCommit messages: {}", self.generator.kind()));
        if self.options.dry_run {
            body.push_str("\nDry run: no changes will be made");
        }
        self.ui.show_panel(&Panel::info("Release", body));
    }

    fn handle(&mut self, state: &ReleaseState, context: &ReleaseContext) -> Result<ReleaseEvent> {
        match state {
            ReleaseState::SelectingBumpClass => self.select_bump_class(context.current),
            ReleaseState::SelectingOverrideVersion => self.select_override_version(),
            ReleaseState::ConfirmingRelease { candidate } => {
                self.confirm_release(context.current, *candidate)
            }
            ReleaseState::ConfirmingOverride { candidate } => self.confirm_override(*candidate),
            ReleaseState::PreviewingChanges { .. } => {
                self.preview_changes(&context.changes);
                Ok(ReleaseEvent::PreviewRendered)
            }
            ReleaseState::GeneratingMessage { decision } => {
                self.generate_message(&context.changes, decision)
            }
            ReleaseState::Executing { decision, message } => Ok(self.execute(decision, message)),
            ReleaseState::Done(_) | ReleaseState::Aborted(_) => Err(ReleaseError::InvalidTransition(
                format!("no event for terminal state {}", state.name()),
            )),
        }
    }

    fn select_bump_class(&mut self, current: SemanticVersion) -> Result<ReleaseEvent> {
        let mut candidates = Vec::with_capacity(BumpClass::ARITHMETIC.len());
        let mut options = Vec::with_capacity(BumpClass::ARITHMETIC.len() + 1);
        for class in BumpClass::ARITHMETIC {
            let next = self.store.bump(&current, class)?;
            options.push(format!(
                "{:<8} {} -> {}  ({})",
                class.to_string(),
                current,
                next,
                class.description()
            ));
            candidates.push(next);
        }
        options.push(format!(
            "{:<8} ({})",
            BumpClass::Override.to_string(),
            BumpClass::Override.description()
        ));

        let choice = self.ui.choose_one("Select release type", &options, 0)?;
        Ok(match candidates.get(choice) {
            Some(next) => ReleaseEvent::BumpSelected(*next),
            None => ReleaseEvent::OverrideRequested,
        })
    }

    fn select_override_version(&mut self) -> Result<ReleaseEvent> {
        let versions = self.repo.existing_release_tags(&self.options.tag_pattern);
        if versions.is_empty() {
            self.ui.show_panel(&Panel::warning(
                "No release tags",
                format!(
                    "No tags matching '{}' were found, there is nothing to override",
                    self.options.tag_pattern.glob()
                ),
            ));
            return Ok(ReleaseEvent::NoReleaseTags);
        }

        let labels: Vec<String> = versions
            .iter()
            .map(|version| self.options.tag_pattern.format(version))
            .collect();

        let prompt = "Select the version to republish";
        if labels.len() > OVERRIDE_PAGE_SIZE {
            let mut page: Vec<String> = labels[..OVERRIDE_PAGE_SIZE].to_vec();
            page.push(format!(
                "show more ({} more)",
                labels.len() - OVERRIDE_PAGE_SIZE
            ));
            let choice = self.ui.choose_one(prompt, &page, 0)?;
            if choice < OVERRIDE_PAGE_SIZE {
                return Ok(ReleaseEvent::OverrideVersionSelected(versions[choice]));
            }
        }

        let choice = self.ui.choose_one(prompt, &labels, 0)?;
        versions
            .get(choice)
            .map(|version| ReleaseEvent::OverrideVersionSelected(*version))
            .ok_or_else(|| ReleaseError::interaction(format!("selection {} out of range", choice)))
    }

    fn confirm_release(
        &mut self,
        current: SemanticVersion,
        candidate: SemanticVersion,
    ) -> Result<ReleaseEvent> {
        let tag = self.options.tag_pattern.format(&candidate);
        if self.repo.tag_exists(&tag) {
            debug!(tag = %tag, "candidate tag already exists");
            return Ok(ReleaseEvent::TagConflict);
        }

        let mut table = Table::new("Release summary", ["Item", "Value"])
            .row(["Project", self.options.project_name.as_str()])
            .row(["Current version".to_string(), current.to_string()])
            .row(["New version".to_string(), candidate.to_string()])
            .row(["Tag", tag.as_str()])
            .row(["Branch", self.options.branch.as_str()])
            .row([
                "Time".to_string(),
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            ]);
        if self.options.dry_run {
            table = table.row(["Mode", "dry run"]);
        }
        self.ui.show_table(&table);

        let options = ["proceed".to_string(), "cancel".to_string()];
        match self.ui.choose_one("Proceed with release?", &options, 0)? {
            0 => Ok(ReleaseEvent::Confirmed),
            _ => Ok(ReleaseEvent::Cancelled),
        }
    }

    fn confirm_override(&mut self, candidate: SemanticVersion) -> Result<ReleaseEvent> {
        let tag = self.options.tag_pattern.format(&candidate);
        self.ui.show_panel(&Panel::warning(
            "Tag already exists",
            format!(
                "Tag '{}' already exists. Overriding deletes it locally and on '{}' before tagging again.",
                tag, self.options.remote
            ),
        ));

        let options = [
            format!("override {}", tag),
            "cancel".to_string(),
            "choose a different version".to_string(),
        ];
        match self.ui.choose_one("How should the existing tag be handled?", &options, 1)? {
            0 => Ok(ReleaseEvent::Confirmed),
            2 => Ok(ReleaseEvent::ChooseDifferentVersion),
            _ => Ok(ReleaseEvent::Cancelled),
        }
    }

    fn preview_changes(&mut self, changes: &[ChangeEntry]) {
        let mut table = changes.iter().take(PREVIEW_LIMIT).fold(
            Table::new(
                format!("Changes to commit ({})", changes.len()),
                ["Status", "Path"],
            ),
            |table, change| table.row([change.status.label(), change.path.as_str()]),
        );
        if changes.len() > PREVIEW_LIMIT {
            table = table.row([
                "...".to_string(),
                format!("{} more", changes.len() - PREVIEW_LIMIT),
            ]);
        }
        self.ui.show_table(&table);
    }

    fn generate_message(
        &mut self,
        changes: &[ChangeEntry],
        decision: &ReleaseDecision,
    ) -> Result<ReleaseEvent> {
        self.ui.report_progress(&format!(
            "Generating commit message ({})",
            self.generator.kind()
        ));
        let generated = self.generator.generate(changes, &decision.target_version);
        self.ui.clear_progress();

        if let Some(warning) = self.generator.take_warning() {
            self.ui
                .show_panel(&Panel::warning("Message generation", warning.to_string()));
        }
        self.ui.show_panel(&Panel::info("Commit message", generated.as_str()));

        let options = ["accept".to_string(), "edit".to_string()];
        if self.ui.choose_one("Use this commit message?", &options, 0)? == 0 {
            return Ok(ReleaseEvent::MessageAccepted(generated));
        }

        let edited = self.ui.enter_text("Commit message", &generated)?;
        let message = if edited.trim().is_empty() {
            generated
        } else {
            edited.trim().to_string()
        };
        Ok(ReleaseEvent::MessageAccepted(message))
    }

    fn execute(&mut self, decision: &ReleaseDecision, message: &str) -> ReleaseEvent {
        let plan = ExecutionStep::plan(decision);
        let tag = self.options.tag_pattern.format(&decision.target_version);

        if self.options.dry_run {
            let body = plan
                .iter()
                .map(|step| {
                    let note = if step.is_fatal() { "" } else { " (warning only)" };
                    format!("skip: {}{}", step, note)
                })
                .collect::<Vec<_>>()
                .join("\n");
            self.ui.show_panel(&Panel::info("Dry run", body));
            return ReleaseEvent::Executed(ReleaseReport::dry_run(tag, decision));
        }

        let executor = Executor {
            repo: self.repo,
            store: self.store,
            tag_pattern: &self.options.tag_pattern,
            manifest_target: &self.options.manifest_target,
            branch: &self.options.branch,
            remote: &self.options.remote,
        };
        let ui = &mut *self.ui;
        let result = executor.run(decision, message, |step| ui.report_progress(&step.to_string()));
        ui.clear_progress();

        match result {
            Ok(report) => {
                for warning in &report.warnings {
                    ui.show_panel(&Panel::warning("Warning", warning.to_string()));
                }
                let mut body = format!("Published {} ({})", report.tag, report.version);
                if report.is_override {
                    body.push_str("\nExisting tag was replaced");
                }
                ui.show_panel(&Panel::success("Release complete", body));
                ReleaseEvent::Executed(report)
            }
            Err(StepFailure {
                step,
                detail,
                warnings,
            }) => {
                for warning in &warnings {
                    ui.show_panel(&Panel::warning("Warning", warning.to_string()));
                }
                ui.show_panel(&Panel::error(
                    "Release failed",
                    format!(
                        "Step '{}' failed: {}\nSteps already completed were not rolled back.",
                        step.name(),
                        detail
                    ),
                ));
                ReleaseEvent::ExecutionFailed { step, detail }
            }
        }
    }
}
