//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the repository
//! operations a release needs, with a real implementation and a mock for
//! testing.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The concrete
//! implementations include:
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: An in-memory implementation that records every mutation
//!
//! Queries map failures to empty results and mutations map failures to
//! `false`; the release orchestrator decides which of those are fatal.

pub mod mock;
pub mod repository;

pub use mock::{MockRepository, RepoCall, RepoOp};
pub use repository::Git2Repository;

use crate::domain::{ChangeEntry, SemanticVersion, TagPattern};

/// One line of recent history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    /// The commit hash (first 8 characters)
    pub hash: String,
    /// First line of the commit message
    pub subject: String,
    /// The commit author
    pub author: String,
    /// Author date as YYYY-MM-DD
    pub date: String,
}

/// Repository operations used by a release.
///
/// All calls are synchronous and each maps to a single repository operation.
/// The release process is single-threaded, so implementors need not be `Sync`.
pub trait Repository {
    /// Working-tree changes (staged, unstaged and untracked) in status order.
    fn uncommitted_changes(&self) -> Vec<ChangeEntry>;

    /// The `count` most recent commits reachable from HEAD, newest first.
    fn recent_commits(&self, count: usize) -> Vec<CommitSummary>;

    /// Name of the nearest tag reachable from HEAD, if any.
    fn latest_reachable_tag(&self) -> Option<String>;

    /// Names of all tags matching a glob such as `v*`.
    fn list_tags(&self, glob: &str) -> Vec<String>;

    /// Whether a tag with exactly this name exists.
    fn tag_exists(&self, name: &str) -> bool;

    /// Stage the entire working tree and commit it on HEAD.
    fn commit(&self, message: &str) -> bool;

    /// Create an annotated tag on HEAD. Fails if the tag exists.
    fn create_annotated_tag(&self, name: &str, message: &str) -> bool;

    /// Best-effort deletion of the local tag and the same-named remote ref.
    ///
    /// A tag missing on either side is not an error. Returns `false` only
    /// when a deletion was attempted and failed.
    fn delete_tag(&self, name: &str) -> bool;

    /// Push `branch`, then (when `with_tags`) every local tag.
    fn push(&self, branch: &str, with_tags: bool) -> bool;

    /// Existing release versions, newest first.
    ///
    /// Tags that match the pattern's glob but do not parse as a version are
    /// dropped. Duplicates collapse, so the order is strictly descending.
    fn existing_release_tags(&self, pattern: &TagPattern) -> Vec<SemanticVersion> {
        let mut versions: Vec<SemanticVersion> = self
            .list_tags(&pattern.glob())
            .iter()
            .filter_map(|tag| {
                let parsed = pattern.parse(tag);
                if parsed.is_none() {
                    tracing::debug!(
                        "{}",
                        crate::boundary::BoundaryWarning::UnparsableTag { tag: tag.clone() }
                    );
                }
                parsed
            })
            .collect();

        versions.sort_by(|a, b| b.cmp(a));
        versions.dedup();
        versions
    }
}

/// Minimal glob matcher for tag listings: `*` matches any run of characters.
pub(crate) fn glob_matches(glob: &str, name: &str) -> bool {
    let parts: Vec<&str> = glob.split('*').collect();
    if parts.len() == 1 {
        return glob == name;
    }

    let first = parts[0];
    let last = parts[parts.len() - 1];
    if !name.starts_with(first) || name.len() < first.len() + last.len() || !name.ends_with(last) {
        return false;
    }

    let mut rest = &name[first.len()..name.len() - last.len()];
    for middle in &parts[1..parts.len() - 1] {
        match rest.find(middle) {
            Some(pos) => rest = &rest[pos + middle.len()..],
            None => return false,
        }
    }
    true
}
