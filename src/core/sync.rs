//! Keeps the changed, staged and unpushed views consistent after each mutation.
//!
//! The [`Synchronizer`] holds no repository state. Every operation receives the
//! repository and the views the caller currently shows, runs one mutating git command,
//! then re-reads the lists that command can affect in a fixed order and returns the new
//! views.
//!
//! # Failure model
//! - a failed mutating step returns `Err` with git's text; nothing is refreshed and the
//!   caller keeps what it has
//! - a failed refresh after a successful mutation is logged and the prior list is kept
//! - multi-step sequences are not rolled back
//!
//! # Ordering
//! Mutating operations take the per-repository [`MutationGate`] permit for their whole
//! sequence, so two of them never interleave on the same repository.

use crate::core::config::DeskConfig;
use crate::core::error::{GitDeckError, Result};
use crate::core::gate::MutationGate;
use crate::core::git::GitBridge;
use crate::core::log_parser::CommitRecord;
use crate::core::outcome::{self, CommitOutcome, PullOutcome, PushOutcome};
use crate::core::runner::{CommandRunner, ProcessRunner};
use crate::core::state::{CommitScope, FileStatusEntry, RepositoryHandle, WorkingState};

#[derive(Debug, Clone, PartialEq)]
pub struct CommitReport {
    pub outcome: CommitOutcome,
    pub working: WorkingState,
    /// `None` when the unpushed list could not be read.
    pub unpushed: Option<Vec<CommitRecord>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PushReport {
    pub output: String,
    pub remote_hash: Option<String>,
    pub unpushed: Option<Vec<CommitRecord>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PullReport {
    pub outcome: PullOutcome,
    pub working: WorkingState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchReport {
    pub output: Vec<String>,
    pub working: WorkingState,
}

pub struct Synchronizer<R: CommandRunner = ProcessRunner> {
    bridge: GitBridge<R>,
    gate: MutationGate,
}

impl Synchronizer<ProcessRunner> {
    pub fn from_config(config: &DeskConfig) -> Self {
        Self::new(
            GitBridge::from_config(config),
            MutationGate::new(config.serialize_mutations),
        )
    }
}

impl<R: CommandRunner> Synchronizer<R> {
    pub fn new(bridge: GitBridge<R>, gate: MutationGate) -> Self {
        Self { bridge, gate }
    }

    pub fn bridge(&self) -> &GitBridge<R> {
        &self.bridge
    }

    /// Re-read both views.
    pub async fn refresh(&self, repo: &RepositoryHandle, prior: &WorkingState) -> WorkingState {
        let changed = self.refresh_changed(repo, &prior.changed).await;
        let staged = self.refresh_staged(repo, &prior.staged).await;
        WorkingState { changed, staged }
    }

    /// Unstaged modifications followed by untracked files.
    pub async fn refresh_changed(
        &self,
        repo: &RepositoryHandle,
        prior: &[FileStatusEntry],
    ) -> Vec<FileStatusEntry> {
        let changed = match self.bridge.list_changed_files(repo).await {
            Ok(changed) => changed,
            Err(e) => return keep_prior("changed", prior, e),
        };
        let untracked = match self.bridge.list_untracked_files(repo).await {
            Ok(untracked) => untracked,
            Err(e) => return keep_prior("untracked", prior, e),
        };

        let mut entries = changed;
        for entry in untracked {
            if !entries.iter().any(|known| known.path == entry.path) {
                entries.push(entry);
            }
        }
        log::debug!("{} changed files in {repo}", entries.len());
        entries
    }

    pub async fn refresh_staged(
        &self,
        repo: &RepositoryHandle,
        prior: &[FileStatusEntry],
    ) -> Vec<FileStatusEntry> {
        match self.bridge.list_staged_files(repo).await {
            Ok(staged) => {
                log::debug!("{} staged files in {repo}", staged.len());
                staged
            }
            Err(e) => keep_prior("staged", prior, e),
        }
    }

    async fn refresh_unpushed(&self, repo: &RepositoryHandle) -> Option<Vec<CommitRecord>> {
        match self
            .bridge
            .get_commit_log(repo, CommitScope::LocalUnpushed, "")
            .await
        {
            Ok(commits) => Some(commits),
            Err(e) => {
                log::warn!("Keeping previous unpushed commits: {e}");
                None
            }
        }
    }

    pub async fn stage_file(
        &self,
        repo: &RepositoryHandle,
        prior: &WorkingState,
        path: &str,
    ) -> Result<WorkingState> {
        let _permit = self.gate.acquire(repo).await;
        self.bridge
            .stage_file(repo, path)
            .await
            .map_err(|e| file_action("stage", path, e))?;

        let staged = self.refresh_staged(repo, &prior.staged).await;
        let changed = self.refresh_changed(repo, &prior.changed).await;
        Ok(WorkingState { changed, staged })
    }

    pub async fn unstage_file(
        &self,
        repo: &RepositoryHandle,
        prior: &WorkingState,
        path: &str,
    ) -> Result<WorkingState> {
        let _permit = self.gate.acquire(repo).await;
        self.bridge
            .unstage_file(repo, path)
            .await
            .map_err(|e| file_action("unstage", path, e))?;

        Ok(self.refresh(repo, prior).await)
    }

    pub async fn stage_all(
        &self,
        repo: &RepositoryHandle,
        prior: &WorkingState,
    ) -> Result<WorkingState> {
        let _permit = self.gate.acquire(repo).await;
        self.bridge.stage_all(repo).await?;

        let changed = self.refresh_changed(repo, &prior.changed).await;
        let staged = self.refresh_staged(repo, &prior.staged).await;
        let changed = self.refresh_changed(repo, &changed).await;
        Ok(WorkingState { changed, staged })
    }

    pub async fn unstage_all(
        &self,
        repo: &RepositoryHandle,
        prior: &WorkingState,
    ) -> Result<WorkingState> {
        let _permit = self.gate.acquire(repo).await;
        self.bridge.unstage_all(repo).await?;
        Ok(self.refresh(repo, prior).await)
    }

    /// Discard a file's changes, unstaging it first when the prior view shows it staged.
    ///
    /// A file git does not track (including one that was only just unstaged) is deleted
    /// with `clean` instead of restored. That is decided from a fresh untracked listing.
    pub async fn revert_file(
        &self,
        repo: &RepositoryHandle,
        prior: &WorkingState,
        path: &str,
    ) -> Result<WorkingState> {
        let _permit = self.gate.acquire(repo).await;
        if prior.is_staged(path) {
            self.bridge
                .unstage_file(repo, path)
                .await
                .map_err(|e| file_action("unstage", path, e))?;
        }

        let untracked = self
            .bridge
            .list_untracked_files(repo)
            .await
            .map_err(|e| file_action("revert", path, e))?;
        if untracked.iter().any(|entry| entry.path == path) {
            log::debug!("{path} is untracked, removing it");
            self.bridge
                .remove_untracked_file(repo, path)
                .await
                .map_err(|e| file_action("revert", path, e))?;
        } else {
            self.bridge
                .revert_file(repo, path)
                .await
                .map_err(|e| file_action("revert", path, e))?;
        }

        Ok(self.refresh(repo, prior).await)
    }

    pub async fn revert_all(
        &self,
        repo: &RepositoryHandle,
        prior: &WorkingState,
    ) -> Result<WorkingState> {
        let _permit = self.gate.acquire(repo).await;
        self.bridge.revert_all(repo).await?;
        Ok(self.refresh(repo, prior).await)
    }

    /// Commit the index and classify the result.
    ///
    /// `NoChanges` and `NothingToCommit` are answers, not errors; only `Committed`
    /// should clear the message the user typed.
    pub async fn commit(
        &self,
        repo: &RepositoryHandle,
        prior: &WorkingState,
        message: &str,
        username: Option<&str>,
    ) -> Result<CommitReport> {
        let _permit = self.gate.acquire(repo).await;
        if let Some(name) = username {
            self.bridge.configure_username(repo, name).await?;
        }

        let last_line = self.bridge.commit(repo, message).await?;
        let outcome = outcome::classify_commit(&last_line);
        log::debug!("Commit in {repo} classified as {outcome:?}");

        let working = self.refresh(repo, prior).await;
        let unpushed = self.refresh_unpushed(repo).await;
        Ok(CommitReport {
            outcome,
            working,
            unpushed,
        })
    }

    pub async fn switch_branch<F>(
        &self,
        repo: &RepositoryHandle,
        prior: &WorkingState,
        branch: &str,
        on_progress: F,
    ) -> Result<SwitchReport>
    where
        F: FnMut(u8) + Send,
    {
        let _permit = self.gate.acquire(repo).await;
        let output = self
            .bridge
            .switch_branch_with_progress(repo, branch, on_progress)
            .await?;
        let working = self.refresh(repo, prior).await;
        Ok(SwitchReport { output, working })
    }

    /// Push, then read the new remote head of `branch` and what is still unpushed.
    pub async fn push(&self, repo: &RepositoryHandle, branch: &str) -> Result<PushReport> {
        let _permit = self.gate.acquire(repo).await;
        let lines = self.bridge.push(repo).await?;
        let output = match outcome::classify_push(&lines) {
            PushOutcome::Pushed { output } => output,
            PushOutcome::Failed { message } => {
                return Err(GitDeckError::tool_failure("git push", message));
            }
        };

        let remote_hash = match self.bridge.get_latest_remote_commit_hash(repo, branch).await {
            Ok(hash) => hash,
            Err(e) => {
                log::warn!("Could not read remote head of {branch}: {e}");
                None
            }
        };
        let unpushed = self.refresh_unpushed(repo).await;
        Ok(PushReport {
            output,
            remote_hash,
            unpushed,
        })
    }

    pub async fn pull(&self, repo: &RepositoryHandle, prior: &WorkingState) -> Result<PullReport> {
        let _permit = self.gate.acquire(repo).await;
        let lines = self.bridge.pull(repo).await?;
        let outcome = outcome::classify_pull(&lines);
        if let PullOutcome::Failed { message } = &outcome {
            return Err(GitDeckError::tool_failure("git pull", message.clone()));
        }

        let working = self.refresh(repo, prior).await;
        Ok(PullReport { outcome, working })
    }
}

fn keep_prior(view: &str, prior: &[FileStatusEntry], err: GitDeckError) -> Vec<FileStatusEntry> {
    log::warn!("Keeping previous {view} list: {err}");
    prior.to_vec()
}

/// Attach the file to git's own failure text. Launch errors pass through untouched.
fn file_action(action: &str, path: &str, err: GitDeckError) -> GitDeckError {
    match err {
        GitDeckError::ToolFailure { message, .. } => {
            GitDeckError::file_action_failed(action, path, message)
        }
        other => other,
    }
}
