use crate::domain::{ChangeEntry, ChangeStatus};
use crate::error::{ReleaseError, Result};
use crate::git::CommitSummary;
use chrono::{TimeZone, Utc};
use git2::{
    Cred, CredentialType, DescribeFormatOptions, DescribeOptions, IndexAddOption, PushOptions,
    RemoteCallbacks, Repository as Git2Repo, Sort, Status, StatusOptions,
};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Upper bound on credential callbacks per remote operation; libgit2 keeps
/// asking while the offered credential is refused.
const MAX_CREDENTIAL_ATTEMPTS: usize = 4;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
    remote: String,
}

impl Git2Repository {
    /// Open or discover a git repository, pushing to `origin`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository {
            repo,
            remote: "origin".to_string(),
        })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository {
            repo,
            remote: "origin".to_string(),
        }
    }

    /// Use a different remote for pushes and remote tag deletion
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    /// Root of the working tree
    pub fn workdir(&self) -> Option<PathBuf> {
        self.repo.workdir().map(Path::to_path_buf)
    }

    fn try_commit(&self, message: &str) -> Result<git2::Oid> {
        let mut index = self.repo.index()?;
        // add_all picks up new and modified files, update_all stages deletions
        index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"], None)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let signature = self.repo.signature()?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e.into()),
        };

        if let Some(parent) = &parent {
            if parent.tree_id() == tree_id {
                return Err(git2::Error::from_str("nothing to commit, working tree clean").into());
            }
        }

        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;
        Ok(oid)
    }

    fn try_create_annotated_tag(&self, name: &str, message: &str) -> Result<git2::Oid> {
        let head = self.repo.head()?.peel_to_commit()?;
        let signature = self.repo.signature()?;
        let oid = self
            .repo
            .tag(name, head.as_object(), &signature, message, false)
            .map_err(|e| ReleaseError::tag(format!("Cannot create tag '{}': {}", name, e)))?;
        Ok(oid)
    }

    /// Push refspecs to the configured remote.
    ///
    /// Returns the references the remote refused; transport failures are errors.
    fn push_refspecs(&self, refspecs: &[String]) -> Result<Vec<(String, String)>> {
        let mut remote = self.repo.find_remote(&self.remote).map_err(|e| {
            ReleaseError::remote(format!("Cannot find remote '{}': {}", self.remote, e))
        })?;

        let rejected = RefCell::new(Vec::new());
        let mut callbacks = self.remote_callbacks();
        callbacks.push_update_reference(|refname, status| {
            if let Some(status) = status {
                rejected
                    .borrow_mut()
                    .push((refname.to_string(), status.to_string()));
            }
            Ok(())
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspec_strs: Vec<&str> = refspecs.iter().map(|s| s.as_str()).collect();
        remote
            .push(&refspec_strs, Some(&mut push_options))
            .map_err(|e| match e.class() {
                git2::ErrorClass::Net => {
                    ReleaseError::remote(format!("Network error during push: {}", e))
                }
                git2::ErrorClass::Reference => {
                    ReleaseError::remote(format!("Reference error during push: {}", e))
                }
                _ => ReleaseError::remote(format!("Push failed: {}", e)),
            })?;

        drop(push_options);
        Ok(rejected.into_inner())
    }

    /// Credential chain for remote operations.
    ///
    /// Tries the SSH agent, then the usual key files in `~/.ssh`, then the
    /// configured git credential helper, then libgit2's default credential.
    fn remote_callbacks<'a>(&self) -> RemoteCallbacks<'a> {
        let git_config = self.repo.config().ok();
        let attempts = Cell::new(0usize);

        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |url, username_from_url, allowed_types| {
            attempts.set(attempts.get() + 1);
            if attempts.get() > MAX_CREDENTIAL_ATTEMPTS {
                return Err(git2::Error::from_str("authentication failed"));
            }

            let username = username_from_url.unwrap_or("git");

            if allowed_types.contains(CredentialType::SSH_KEY) {
                if attempts.get() == 1 {
                    if let Ok(cred) = Cred::ssh_key_from_agent(username) {
                        return Ok(cred);
                    }
                }

                if let Some(home) = dirs::home_dir() {
                    for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                        let path = home.join(".ssh").join(key);
                        if path.exists() {
                            if let Ok(cred) = Cred::ssh_key(username, None, &path, None) {
                                return Ok(cred);
                            }
                        }
                    }
                }
            }

            if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
                if let Some(config) = git_config.as_ref() {
                    if let Ok(cred) = Cred::credential_helper(config, url, username_from_url) {
                        return Ok(cred);
                    }
                }
            }

            Cred::default()
        });

        callbacks
    }
}

/// Two-column short status code for a git2 status entry (`"M "`, `"??"`, ...)
fn short_code(status: Status) -> String {
    if status.is_conflicted() {
        return "UU".to_string();
    }
    if status.is_wt_new() && !status.is_index_new() {
        return "??".to_string();
    }

    let index = if status.is_index_new() {
        'A'
    } else if status.is_index_modified() {
        'M'
    } else if status.is_index_deleted() {
        'D'
    } else if status.is_index_renamed() {
        'R'
    } else if status.is_index_typechange() {
        'T'
    } else {
        ' '
    };

    let worktree = if status.is_wt_modified() {
        'M'
    } else if status.is_wt_deleted() {
        'D'
    } else if status.is_wt_renamed() {
        'R'
    } else if status.is_wt_typechange() {
        'T'
    } else {
        ' '
    };

    format!("{}{}", index, worktree)
}

impl super::Repository for Git2Repository {
    fn uncommitted_changes(&self) -> Vec<ChangeEntry> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .renames_head_to_index(true);

        let statuses = match self.repo.statuses(Some(&mut opts)) {
            Ok(statuses) => statuses,
            Err(e) => {
                warn!(error = %e, "cannot read repository status");
                return Vec::new();
            }
        };

        statuses
            .iter()
            .filter_map(|entry| {
                let status = entry.status();
                if status.is_ignored() || status == Status::CURRENT {
                    return None;
                }

                let renamed_to = entry
                    .head_to_index()
                    .and_then(|delta| delta.new_file().path())
                    .map(|p| p.to_string_lossy().into_owned());
                let path = match renamed_to {
                    Some(new_path) if status.is_index_renamed() => new_path,
                    _ => entry.path()?.to_string(),
                };

                Some(ChangeEntry::new(
                    ChangeStatus::from_short_code(&short_code(status)),
                    path,
                ))
            })
            .collect()
    }

    fn recent_commits(&self, count: usize) -> Vec<CommitSummary> {
        let walk = || -> Result<Vec<CommitSummary>> {
            let mut revwalk = self.repo.revwalk()?;
            revwalk.set_sorting(Sort::TIME)?;
            revwalk.push_head()?;

            let mut commits = Vec::new();
            for oid in revwalk.take(count) {
                let commit = self.repo.find_commit(oid?)?;
                let author = commit.author();
                let date = Utc
                    .timestamp_opt(author.when().seconds(), 0)
                    .single()
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                let hash = commit.id().to_string();

                commits.push(CommitSummary {
                    hash: hash[..8.min(hash.len())].to_string(),
                    subject: commit.summary().unwrap_or("(empty message)").to_string(),
                    author: author.name().unwrap_or("unknown").to_string(),
                    date,
                });
            }
            Ok(commits)
        };

        walk().unwrap_or_else(|e| {
            debug!(error = %e, "cannot read recent commits");
            Vec::new()
        })
    }

    fn latest_reachable_tag(&self) -> Option<String> {
        let mut options = DescribeOptions::new();
        options.describe_tags();

        let describe = self.repo.describe(&options).ok()?;
        let mut format = DescribeFormatOptions::new();
        format.abbreviated_size(0);

        describe.format(Some(&format)).ok()
    }

    fn list_tags(&self, glob: &str) -> Vec<String> {
        match self.repo.tag_names(Some(glob)) {
            Ok(tags) => tags.iter().flatten().map(|s| s.to_string()).collect(),
            Err(e) => {
                warn!(error = %e, glob, "cannot list tags");
                Vec::new()
            }
        }
    }

    fn tag_exists(&self, name: &str) -> bool {
        let reference_name = format!("refs/tags/{}", name);

        match self.repo.find_reference(&reference_name) {
            Ok(_) => true,
            Err(e) if e.code() == git2::ErrorCode::NotFound => false,
            Err(e) => {
                warn!(error = %e, tag = name, "cannot look up tag");
                false
            }
        }
    }

    #[instrument(skip(self, message))]
    fn commit(&self, message: &str) -> bool {
        match self.try_commit(message) {
            Ok(oid) => {
                info!(commit = %oid, "committed working tree");
                true
            }
            Err(e) => {
                warn!(error = %e, "commit failed");
                false
            }
        }
    }

    #[instrument(skip(self, message))]
    fn create_annotated_tag(&self, name: &str, message: &str) -> bool {
        match self.try_create_annotated_tag(name, message) {
            Ok(_) => {
                info!(name, "created annotated tag");
                true
            }
            Err(e) => {
                warn!(error = %e, "tag creation failed");
                false
            }
        }
    }

    #[instrument(skip(self))]
    fn delete_tag(&self, name: &str) -> bool {
        let mut complete = true;

        if self.tag_exists(name) {
            match self.repo.tag_delete(name) {
                Ok(()) => info!(name, "deleted local tag"),
                Err(e) => {
                    warn!(error = %e, name, "cannot delete local tag");
                    complete = false;
                }
            }
        } else {
            debug!(name, "no local tag to delete");
        }

        match self.push_refspecs(&[format!(":refs/tags/{}", name)]) {
            Ok(rejected) if rejected.is_empty() => info!(name, "deleted remote tag"),
            // a remote without the tag refuses the delete, which is fine
            Ok(rejected) => debug!(?rejected, "remote tag not deleted"),
            Err(e) => {
                warn!(error = %e, name, "cannot delete remote tag");
                complete = false;
            }
        }

        complete
    }

    #[instrument(skip(self))]
    fn push(&self, branch: &str, with_tags: bool) -> bool {
        let branch_spec = format!("refs/heads/{0}:refs/heads/{0}", branch);
        match self.push_refspecs(&[branch_spec]) {
            Ok(rejected) if rejected.is_empty() => info!(branch, remote = %self.remote, "pushed branch"),
            Ok(rejected) => {
                warn!(?rejected, "remote rejected branch push");
                return false;
            }
            Err(e) => {
                warn!(error = %e, "branch push failed");
                return false;
            }
        }

        if !with_tags {
            return true;
        }

        let tag_specs: Vec<String> = self
            .list_tags("*")
            .iter()
            .map(|tag| format!("refs/tags/{0}:refs/tags/{0}", tag))
            .collect();
        if tag_specs.is_empty() {
            return true;
        }

        match self.push_refspecs(&tag_specs) {
            Ok(rejected) if rejected.is_empty() => {
                info!(count = tag_specs.len(), "pushed tags");
                true
            }
            Ok(rejected) => {
                warn!(?rejected, "remote rejected tag push");
                false
            }
            Err(e) => {
                warn!(error = %e, "tag push failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_code() {
        assert_eq!(short_code(Status::WT_NEW), "??");
        assert_eq!(short_code(Status::INDEX_NEW), "A ");
        assert_eq!(short_code(Status::WT_MODIFIED), " M");
        assert_eq!(short_code(Status::INDEX_MODIFIED | Status::WT_MODIFIED), "MM");
        assert_eq!(short_code(Status::WT_DELETED), " D");
        assert_eq!(short_code(Status::INDEX_RENAMED), "R ");
        assert_eq!(short_code(Status::CONFLICTED), "UU");
    }

    #[test]
    fn test_open_outside_repository_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        // a fresh temp dir is not inside any repository unless TMPDIR is
        if Git2Repo::discover(dir.path()).is_err() {
            assert!(Git2Repository::open(dir.path()).is_err());
        }
    }
}
