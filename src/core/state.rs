//! Repository handles, working-state views and the application state container.
//!
//! The core modules are stateless: the synchronizer takes the previous
//! [`WorkingState`] and hands back a new one. [`AppState`] is where a front-end keeps
//! everything it displays, and every change to it goes through a named method so the
//! transitions stay easy to follow.
//!
//! # Public API
//! - [`RepositoryHandle`]: the working directory every git invocation runs in
//! - [`FileStatusEntry`]: one file reported by git as changed, staged or untracked
//! - [`BranchSet`]: local and remote branch names
//! - [`WorkingState`]: the changed and staged views
//! - [`AppState`]: the front-end state with reducer-style mutation methods

use crate::core::ignore::DirectoryNode;
use crate::core::log_parser::CommitRecord;
use crate::core::outcome::{CommitOutcome, PullSummary};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Path of a repository's working directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryHandle(PathBuf);

impl RepositoryHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Last component of the path, used as the display name.
    pub fn name(&self) -> String {
        self.0
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.0.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for RepositoryHandle {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

impl From<&Path> for RepositoryHandle {
    fn from(path: &Path) -> Self {
        Self(path.to_path_buf())
    }
}

impl fmt::Display for RepositoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileStatusEntry {
    pub name: String,
    /// Repository-relative, forward slashes, exactly as git printed it.
    pub path: String,
}

impl FileStatusEntry {
    pub fn from_tool_path(path: &str) -> Self {
        let path = path.trim().replace('\\', "/");
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        Self { name, path }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchSet {
    pub local: Vec<String>,
    pub remote: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingState {
    /// Unstaged modifications plus untracked files.
    pub changed: Vec<FileStatusEntry>,
    pub staged: Vec<FileStatusEntry>,
}

impl WorkingState {
    pub fn is_staged(&self, path: &str) -> bool {
        self.staged.iter().any(|entry| entry.path == path)
    }

    pub fn is_clean(&self) -> bool {
        self.changed.is_empty() && self.staged.is_empty()
    }
}

/// Which commit list a log request fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitScope {
    /// Commits not yet on the push target.
    LocalUnpushed,
    /// Commits on the remote-tracking branch.
    Remote,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub repository: Option<RepositoryHandle>,
    pub working: WorkingState,
    pub files: Vec<DirectoryNode>,
    pub branch: Option<String>,
    pub branches: BranchSet,
    pub local_commits: Vec<CommitRecord>,
    pub remote_commits: Vec<CommitRecord>,
    pub remote_hash: Option<String>,
    pub commit_draft: String,
    pub last_commit_message: Option<String>,
    pub pull_summary: Option<PullSummary>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a repository. Everything shown for the previous one is dropped.
    pub fn open_repository(&mut self, handle: RepositoryHandle) {
        log::debug!("Opening repository {handle}");
        *self = Self {
            repository: Some(handle),
            ..Self::default()
        };
    }

    pub fn close_repository(&mut self) {
        *self = Self::default();
    }

    pub fn apply_working_state(&mut self, working: WorkingState) {
        self.working = working;
    }

    pub fn set_commit_draft(&mut self, draft: impl Into<String>) {
        self.commit_draft = draft.into();
    }

    /// Record a commit attempt. Only a real commit consumes the draft.
    pub fn apply_commit(&mut self, outcome: &CommitOutcome) {
        if outcome.clears_draft() {
            self.last_commit_message = Some(std::mem::take(&mut self.commit_draft));
        }
    }

    pub fn set_branch(&mut self, branch: impl Into<String>) {
        self.branch = Some(branch.into());
    }

    pub fn set_branches(&mut self, branches: BranchSet) {
        self.branches = branches;
    }

    pub fn set_commits(&mut self, scope: CommitScope, commits: Vec<CommitRecord>) {
        match scope {
            CommitScope::LocalUnpushed => self.set_local_commits(commits),
            CommitScope::Remote => self.set_remote_commits(commits),
        }
    }

    pub fn set_local_commits(&mut self, commits: Vec<CommitRecord>) {
        self.local_commits = commits;
    }

    pub fn set_remote_commits(&mut self, commits: Vec<CommitRecord>) {
        self.remote_commits = commits;
    }

    pub fn set_remote_hash(&mut self, hash: Option<String>) {
        self.remote_hash = hash;
    }

    pub fn set_pull_summary(&mut self, summary: Option<PullSummary>) {
        self.pull_summary = summary;
    }

    pub fn set_files(&mut self, files: Vec<DirectoryNode>) {
        self.files = files;
    }

    /// Show a previously persisted view until the first refresh completes.
    pub fn restore_from_cache(&mut self, files: Vec<DirectoryNode>, working: WorkingState) {
        self.files = files;
        self.working = working;
    }
}
