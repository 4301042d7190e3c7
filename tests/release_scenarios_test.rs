// tests/release_scenarios_test.rs
use std::fs;
use std::path::PathBuf;

use git_release::domain::{ChangeEntry, ChangeStatus, SemanticVersion, TagPattern};
use git_release::git::{MockRepository, RepoCall, RepoOp};
use git_release::interaction::{Answer, ScriptedInteraction};
use git_release::message::LocalMessageGenerator;
use git_release::release::{ReleaseOptions, ReleaseOrchestrator, ReleaseReport};
use git_release::version_store::VersionStore;
use git_release::{ReleaseError, Result};
use tempfile::TempDir;

fn project(version: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("Cargo.toml"),
        format!("[package]\nname = \"demo\"\nversion = \"{}\"\n", version),
    )
    .unwrap();
    dir
}

fn manifest(dir: &TempDir) -> String {
    fs::read_to_string(dir.path().join("Cargo.toml")).unwrap()
}

fn one_change() -> Vec<ChangeEntry> {
    vec![ChangeEntry::new(ChangeStatus::Modified, "src/main.rs")]
}

fn run_release(
    repo: &MockRepository,
    dir: &TempDir,
    ui: &mut ScriptedInteraction,
    dry_run: bool,
) -> Result<ReleaseReport> {
    let store = VersionStore::new(dir.path(), vec![PathBuf::from("Cargo.toml")]);
    let generator = LocalMessageGenerator;
    let options = ReleaseOptions {
        project_name: "demo".to_string(),
        branch: "master".to_string(),
        remote: "origin".to_string(),
        manifest_target: PathBuf::from("Cargo.toml"),
        tag_pattern: TagPattern::default(),
        dry_run,
    };
    ReleaseOrchestrator::new(repo, &store, &generator, ui, options).run()
}

fn push() -> RepoCall {
    RepoCall::Push {
        branch: "master".to_string(),
        with_tags: true,
    }
}

#[test]
fn test_first_patch_release() {
    let dir = project("0.1.0");
    let repo = MockRepository::new().with_changes(one_change());
    let mut ui = ScriptedInteraction::choosing(["patch", "proceed", "accept"]);

    let report = run_release(&repo, &dir, &mut ui, false).unwrap();

    assert_eq!(report.tag, "v0.1.1");
    assert_eq!(report.version, SemanticVersion::new(0, 1, 1));
    assert!(!report.is_override);
    assert!(report.manifest_updated);
    assert!(!report.dry_run);

    let calls = repo.calls();
    assert_eq!(calls.len(), 3);
    let RepoCall::Commit { message } = &calls[0] else {
        panic!("expected commit first, got {:?}", calls[0]);
    };
    assert!(message.starts_with("release: publish v0.1.1"));
    assert!(message.contains("- Modified files: 1"));
    assert_eq!(
        calls[1],
        RepoCall::CreateTag {
            name: "v0.1.1".to_string(),
            message: "Release version 0.1.1".to_string()
        }
    );
    assert_eq!(calls[2], push());

    assert!(manifest(&dir).contains("version = \"0.1.1\""));
    assert_eq!(ui.remaining(), 0);
    assert!(ui.panel_titles().contains(&"Release complete"));
}

#[test]
fn test_patch_after_existing_tag_has_no_conflict() {
    let dir = project("1.0.0");
    let repo = MockRepository::new()
        .with_changes(one_change())
        .with_tags(["v1.0.0"])
        .with_latest_tag("v1.0.0");
    let mut ui = ScriptedInteraction::choosing(["patch", "proceed", "accept"]);

    let report = run_release(&repo, &dir, &mut ui, false).unwrap();

    assert_eq!(report.tag, "v1.0.1");
    assert!(!ui.panel_titles().contains(&"Tag already exists"));
    assert_eq!(repo.tag_names(), vec!["v1.0.0", "v1.0.1"]);
}

#[test]
fn test_override_republishes_existing_version() {
    let dir = project("1.0.0");
    let repo = MockRepository::new()
        .with_changes(one_change())
        .with_tags(["v0.9.0", "v1.0.0"])
        .with_latest_tag("v1.0.0");
    let mut ui = ScriptedInteraction::choosing(["override", "v0.9.0", "accept"]);

    let report = run_release(&repo, &dir, &mut ui, false).unwrap();

    assert_eq!(report.tag, "v0.9.0");
    assert!(report.is_override);

    let calls = repo.calls();
    assert_eq!(
        calls[0],
        RepoCall::DeleteTag {
            name: "v0.9.0".to_string()
        }
    );
    assert!(matches!(calls[1], RepoCall::Commit { .. }));
    assert_eq!(
        calls[2],
        RepoCall::CreateTag {
            name: "v0.9.0".to_string(),
            message: "Release version 0.9.0".to_string()
        }
    );
    assert_eq!(calls[3], push());
    assert!(manifest(&dir).contains("version = \"0.9.0\""));
    // no separate confirmation after picking the version
    assert!(!ui.prompts.iter().any(|p| p == "Proceed with release?"));
}

#[test]
fn test_no_changes_aborts_before_any_prompt() {
    let dir = project("0.1.0");
    let repo = MockRepository::new();
    let mut ui = ScriptedInteraction::default();

    let err = run_release(&repo, &dir, &mut ui, false).unwrap_err();

    assert!(matches!(err, ReleaseError::NoPendingChanges));
    assert_ne!(err.exit_code(), 0);
    assert!(ui.prompts.is_empty());
    assert!(repo.calls().is_empty());
    assert_eq!(manifest(&dir), "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n");
}

#[test]
fn test_existing_candidate_tag_enters_conflict_flow() {
    let dir = project("1.2.2");
    let repo = MockRepository::new()
        .with_changes(one_change())
        .with_tags(["v1.2.2", "v1.2.3"])
        .with_latest_tag("v1.2.2");
    let mut ui = ScriptedInteraction::choosing(["patch", "cancel"]);

    let err = run_release(&repo, &dir, &mut ui, false).unwrap_err();

    assert!(matches!(err, ReleaseError::Cancelled));
    assert_eq!(err.exit_code(), 130);
    assert!(ui.panel_titles().contains(&"Tag already exists"));
    assert!(repo.calls().is_empty());
}

#[test]
fn test_conflict_default_is_cancel() {
    let dir = project("1.2.2");
    let repo = MockRepository::new()
        .with_changes(one_change())
        .with_tags(["v1.2.3"])
        .with_latest_tag("v1.2.2");
    let mut ui = ScriptedInteraction::choosing(["patch"]).then(Answer::Default);

    assert!(matches!(
        run_release(&repo, &dir, &mut ui, false),
        Err(ReleaseError::Cancelled)
    ));
}

#[test]
fn test_conflict_override_deletes_then_recreates() {
    let dir = project("1.2.2");
    let repo = MockRepository::new()
        .with_changes(one_change())
        .with_tags(["v1.2.3"])
        .with_latest_tag("v1.2.2");
    let mut ui = ScriptedInteraction::choosing(["patch", "override", "accept"]);

    let report = run_release(&repo, &dir, &mut ui, false).unwrap();

    assert!(report.is_override);
    assert_eq!(
        repo.calls()[0],
        RepoCall::DeleteTag {
            name: "v1.2.3".to_string()
        }
    );
    assert_eq!(repo.tag_names(), vec!["v1.2.3"]);
}

#[test]
fn test_conflict_choose_different_version() {
    let dir = project("1.2.2");
    let repo = MockRepository::new()
        .with_changes(one_change())
        .with_tags(["v1.2.3"])
        .with_latest_tag("v1.2.2");
    let mut ui =
        ScriptedInteraction::choosing(["patch", "choose", "minor", "proceed", "accept"]);

    let report = run_release(&repo, &dir, &mut ui, false).unwrap();

    assert_eq!(report.tag, "v1.3.0");
    assert!(!report.is_override);
    assert!(!repo
        .calls()
        .iter()
        .any(|call| matches!(call, RepoCall::DeleteTag { .. })));
}

#[test]
fn test_plain_release_never_deletes_tags() {
    let dir = project("2.0.0");
    let repo = MockRepository::new()
        .with_changes(one_change())
        .with_tags(["v2.0.0"])
        .with_latest_tag("v2.0.0");
    let mut ui = ScriptedInteraction::choosing(["major", "proceed", "accept"]);

    let report = run_release(&repo, &dir, &mut ui, false).unwrap();

    assert_eq!(report.tag, "v3.0.0");
    assert!(!repo
        .calls()
        .iter()
        .any(|call| matches!(call, RepoCall::DeleteTag { .. })));
}

#[test]
fn test_override_without_tags_aborts() {
    let dir = project("0.1.0");
    let repo = MockRepository::new()
        .with_changes(one_change())
        .with_tags(["nightly"]);
    let mut ui = ScriptedInteraction::choosing(["override"]);

    let err = run_release(&repo, &dir, &mut ui, false).unwrap_err();

    assert!(matches!(err, ReleaseError::NoReleaseTags));
    assert_eq!(err.exit_code(), 2);
    assert!(repo.calls().is_empty());
}

#[test]
fn test_override_list_shows_more_on_request() {
    let dir = project("12.0.0");
    let tags: Vec<String> = (1..=12).map(|major| format!("v{}.0.0", major)).collect();
    let repo = MockRepository::new()
        .with_changes(one_change())
        .with_tags(tags)
        .with_latest_tag("v12.0.0");
    let mut ui = ScriptedInteraction::choosing(["override", "show more", "v1.0.0", "accept"]);

    let report = run_release(&repo, &dir, &mut ui, false).unwrap();

    assert_eq!(report.tag, "v1.0.0");
    assert_eq!(
        ui.prompts
            .iter()
            .filter(|p| p.as_str() == "Select the version to republish")
            .count(),
        2
    );
}

#[test]
fn test_dry_run_makes_no_changes() {
    let dir = project("0.1.0");
    let repo = MockRepository::new().with_changes(one_change());
    let mut ui = ScriptedInteraction::choosing(["minor", "proceed", "accept"]);

    let report = run_release(&repo, &dir, &mut ui, true).unwrap();

    assert!(report.dry_run);
    assert_eq!(report.tag, "v0.2.0");
    assert!(repo.calls().is_empty());
    assert!(manifest(&dir).contains("version = \"0.1.0\""));
    assert!(ui.panel_titles().contains(&"Dry run"));
    assert_eq!(ui.remaining(), 0);
}

#[test]
fn test_push_failure_reports_step() {
    let dir = project("0.1.0");
    let repo = MockRepository::new()
        .with_changes(one_change())
        .failing(RepoOp::Push);
    let mut ui = ScriptedInteraction::choosing(["patch", "proceed", "accept"]);

    let err = run_release(&repo, &dir, &mut ui, false).unwrap_err();

    match &err {
        ReleaseError::ExecutionFailed { step, .. } => assert_eq!(step, "push"),
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(err.exit_code(), 1);
    // commit and tag are left in place
    assert_eq!(repo.calls().len(), 3);
    assert_eq!(repo.tag_names(), vec!["v0.1.1"]);
    assert!(ui.panel_titles().contains(&"Release failed"));
}

#[test]
fn test_commit_failure_stops_before_tagging() {
    let dir = project("0.1.0");
    let repo = MockRepository::new()
        .with_changes(one_change())
        .failing(RepoOp::Commit);
    let mut ui = ScriptedInteraction::choosing(["patch", "proceed", "accept"]);

    let err = run_release(&repo, &dir, &mut ui, false).unwrap_err();

    assert!(matches!(
        err,
        ReleaseError::ExecutionFailed { ref step, .. } if step == "commit"
    ));
    assert!(repo.tag_names().is_empty());
}

#[test]
fn test_failure_panel_keeps_earlier_warnings() {
    let dir = project("1.0.0");
    let repo = MockRepository::new()
        .with_changes(one_change())
        .with_tags(["v0.9.0", "v1.0.0"])
        .with_latest_tag("v1.0.0")
        .failing(RepoOp::DeleteTag);
    let mut ui = ScriptedInteraction::choosing(["override", "v0.9.0", "accept"]);

    let err = run_release(&repo, &dir, &mut ui, false).unwrap_err();

    assert!(matches!(
        err,
        ReleaseError::ExecutionFailed { ref step, .. } if step == "tag"
    ));
    let titles = ui.panel_titles();
    let warning = titles.iter().position(|t| *t == "Warning").unwrap();
    let failed = titles.iter().position(|t| *t == "Release failed").unwrap();
    assert!(warning < failed);
    assert!(ui.panels[warning].body.contains("v0.9.0"));
}

#[test]
fn test_edited_message_is_committed() {
    let dir = project("0.1.0");
    let repo = MockRepository::new().with_changes(one_change());
    let mut ui = ScriptedInteraction::choosing(["patch", "proceed", "edit"])
        .then(Answer::Text("feat: ship the thing\n".to_string()));

    run_release(&repo, &dir, &mut ui, false).unwrap();

    assert_eq!(
        repo.calls()[0],
        RepoCall::Commit {
            message: "feat: ship the thing".to_string()
        }
    );
}

#[test]
fn test_empty_edit_keeps_generated_message() {
    let dir = project("0.1.0");
    let repo = MockRepository::new().with_changes(one_change());
    let mut ui = ScriptedInteraction::choosing(["patch", "proceed", "edit"])
        .then(Answer::Text("   ".to_string()));

    run_release(&repo, &dir, &mut ui, false).unwrap();

    let RepoCall::Commit { message } = &repo.calls()[0] else {
        panic!("expected commit");
    };
    assert!(message.starts_with("release: publish v0.1.1"));
}

#[test]
fn test_cancel_at_confirmation() {
    let dir = project("0.1.0");
    let repo = MockRepository::new().with_changes(one_change());
    let mut ui = ScriptedInteraction::choosing(["patch", "cancel"]);

    assert!(matches!(
        run_release(&repo, &dir, &mut ui, false),
        Err(ReleaseError::Cancelled)
    ));
    assert!(repo.calls().is_empty());
}

#[test]
fn test_interrupted_prompt_aborts_cleanly() {
    let dir = project("0.1.0");
    let repo = MockRepository::new().with_changes(one_change());
    let mut ui = ScriptedInteraction::choosing(["patch"]).then(Answer::Cancel);

    assert!(matches!(
        run_release(&repo, &dir, &mut ui, false),
        Err(ReleaseError::Cancelled)
    ));
    assert!(repo.calls().is_empty());
}

#[test]
fn test_unparseable_current_version_aborts() {
    let dir = project("0.1.0");
    let repo = MockRepository::new()
        .with_changes(one_change())
        .with_latest_tag("nightly");
    let mut ui = ScriptedInteraction::default();

    let err = run_release(&repo, &dir, &mut ui, false).unwrap_err();

    assert!(matches!(err, ReleaseError::Version(_)));
    assert_eq!(err.exit_code(), 4);
    assert!(ui.prompts.is_empty());
}

#[test]
fn test_preview_truncates_long_change_lists() {
    let dir = project("0.1.0");
    let changes: Vec<ChangeEntry> = (0..20)
        .map(|i| ChangeEntry::new(ChangeStatus::Added, format!("docs/page_{}.md", i)))
        .collect();
    let repo = MockRepository::new().with_changes(changes);
    let mut ui = ScriptedInteraction::choosing(["patch", "proceed", "accept"]);

    run_release(&repo, &dir, &mut ui, false).unwrap();

    let preview = ui
        .tables
        .iter()
        .find(|table| table.title.starts_with("Changes to commit"))
        .unwrap();
    assert_eq!(preview.title, "Changes to commit (20)");
    assert_eq!(preview.rows.len(), 16);
    assert_eq!(preview.rows[15], vec!["...".to_string(), "5 more".to_string()]);
}
