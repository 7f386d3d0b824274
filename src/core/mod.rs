//! Core functionality for git-deck.
//!
//! This module holds the git orchestration layers (runner, bridge, synchronizer), the
//! text parsers and classifiers they rely on, the ignore-rule filter, and the ambient
//! pieces shared by the CLI: config, cache, error types and output formatting.

pub mod cache;
pub mod command_init;
pub mod config;
pub mod dirs;
pub mod error;
pub mod file_status;
pub mod gate;
pub mod git;
pub mod ignore;
pub mod log_parser;
pub mod outcome;
pub mod output;
pub mod runner;
pub mod state;
pub mod sync;

// === Error handling ===
pub use error::{GitDeckError, Result};

// === Process runner ===
// Async subprocess execution with per-line listeners
pub use runner::{
    CommandResult, CommandRunner, Invocation, OutputLine, OutputListeners, ProcessRunner, Stream,
};

// === Git operations ===
pub use git::{Contributor, GitBridge};

// === Output classification ===
// One text heuristic per git operation whose meaning depends on wording
pub use outcome::{
    CommitOutcome, PullOutcome, PullSummary, PushOutcome, RepositoryCheck,
};

// === Commit log ===
pub use log_parser::{commit_log, parse_commit_line, CommitLog, CommitRecord};

// === Working-state synchronization ===
pub use gate::MutationGate;
pub use sync::{CommitReport, PullReport, PushReport, SwitchReport, Synchronizer};

// === State ===
pub use state::{
    AppState, BranchSet, CommitScope, FileStatusEntry, RepositoryHandle, WorkingState,
};

// === File tree ===
pub use file_status::FileStatus;
pub use ignore::{DirectoryNode, FsIgnoreSource, IgnoreRuleSet, IgnoreSource};

// === Persistence ===
pub use cache::CacheStore;
pub use config::DeskConfig;

// === Command initialization ===
pub use command_init::{CommandContext, CommandInit};

// === Output formatting ===
pub use output::{print_detail, print_error, print_info, print_section_header, print_success};
