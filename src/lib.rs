//! git-deck - the orchestration core of a desktop git client.
//!
//! The library drives the `git` executable as a subprocess, parses its text output into
//! typed data and keeps the changed, staged and unpushed views of a repository in step
//! with each mutation. A small CLI in `main.rs` exercises it end to end.
//!
//! # Public API
//! The main public interface is re-exported from the [`core`] module:
//! - Process runner and git bridge
//! - Working-state synchronizer and mutation gate
//! - Commit log parsing and outcome classification
//! - Ignore-rule filtering of directory trees
//! - Application state, cache and configuration

pub mod commands;
pub mod core;

pub use core::{
    AppState,
    BranchSet,
    CacheStore,
    CommandResult,
    CommandRunner,
    CommitOutcome,
    CommitRecord,
    CommitScope,
    DeskConfig,
    DirectoryNode,
    FileStatus,
    FileStatusEntry,
    GitBridge,
    GitDeckError,
    IgnoreRuleSet,
    Invocation,
    MutationGate,
    OutputListeners,
    ProcessRunner,
    PullOutcome,
    RepositoryHandle,
    Result,
    Synchronizer,
    WorkingState,
};
