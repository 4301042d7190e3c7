use crate::domain::ChangeEntry;
use crate::git::{glob_matches, CommitSummary, Repository};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashSet};

/// A mutation observed by [MockRepository], in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoCall {
    Commit { message: String },
    CreateTag { name: String, message: String },
    DeleteTag { name: String },
    Push { branch: String, with_tags: bool },
}

/// Mutating operations that can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepoOp {
    Commit,
    CreateTag,
    DeleteTag,
    Push,
}

/// Mock repository for testing without actual git operations
///
/// Tags behave like a real repository: creating an existing tag fails and
/// deleting a tag removes it. Every mutation is recorded.
#[derive(Debug, Default)]
pub struct MockRepository {
    changes: Vec<ChangeEntry>,
    commits: Vec<CommitSummary>,
    latest_tag: Option<String>,
    tags: RefCell<BTreeSet<String>>,
    failing: HashSet<RepoOp>,
    calls: RefCell<Vec<RepoCall>>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the working-tree changes
    pub fn with_changes(mut self, changes: Vec<ChangeEntry>) -> Self {
        self.changes = changes;
        self
    }

    /// Set the working-tree changes from short-form status output
    pub fn with_status_output(mut self, output: &str) -> Self {
        self.changes = output
            .lines()
            .filter_map(ChangeEntry::parse_short_line)
            .collect();
        self
    }

    /// Add tags
    pub fn with_tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags
            .borrow_mut()
            .extend(tags.into_iter().map(Into::into));
        self
    }

    /// Set the tag reported as nearest to HEAD
    pub fn with_latest_tag(mut self, name: impl Into<String>) -> Self {
        self.latest_tag = Some(name.into());
        self
    }

    /// Set recent history, newest first
    pub fn with_commits(mut self, commits: Vec<CommitSummary>) -> Self {
        self.commits = commits;
        self
    }

    /// Make an operation report failure
    pub fn failing(mut self, op: RepoOp) -> Self {
        self.failing.insert(op);
        self
    }

    /// All mutations performed so far
    pub fn calls(&self) -> Vec<RepoCall> {
        self.calls.borrow().clone()
    }

    /// Current tag names, sorted
    pub fn tag_names(&self) -> Vec<String> {
        self.tags.borrow().iter().cloned().collect()
    }

    fn record(&self, call: RepoCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Repository for MockRepository {
    fn uncommitted_changes(&self) -> Vec<ChangeEntry> {
        self.changes.clone()
    }

    fn recent_commits(&self, count: usize) -> Vec<CommitSummary> {
        self.commits.iter().take(count).cloned().collect()
    }

    fn latest_reachable_tag(&self) -> Option<String> {
        self.latest_tag.clone()
    }

    fn list_tags(&self, glob: &str) -> Vec<String> {
        self.tags
            .borrow()
            .iter()
            .filter(|name| glob_matches(glob, name))
            .cloned()
            .collect()
    }

    fn tag_exists(&self, name: &str) -> bool {
        self.tags.borrow().contains(name)
    }

    fn commit(&self, message: &str) -> bool {
        self.record(RepoCall::Commit {
            message: message.to_string(),
        });
        !self.failing.contains(&RepoOp::Commit)
    }

    fn create_annotated_tag(&self, name: &str, message: &str) -> bool {
        self.record(RepoCall::CreateTag {
            name: name.to_string(),
            message: message.to_string(),
        });
        if self.failing.contains(&RepoOp::CreateTag) {
            return false;
        }
        self.tags.borrow_mut().insert(name.to_string())
    }

    fn delete_tag(&self, name: &str) -> bool {
        self.record(RepoCall::DeleteTag {
            name: name.to_string(),
        });
        if self.failing.contains(&RepoOp::DeleteTag) {
            return false;
        }
        self.tags.borrow_mut().remove(name);
        true
    }

    fn push(&self, branch: &str, with_tags: bool) -> bool {
        self.record(RepoCall::Push {
            branch: branch.to_string(),
            with_tags,
        });
        !self.failing.contains(&RepoOp::Push)
    }
}
