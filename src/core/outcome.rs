//! Text heuristics that turn git's output into success or failure.
//!
//! git is inconsistent about exit codes and streams: `git commit` with nothing staged
//! exits non-zero with its explanation on stdout, `git switch` reports success on stderr,
//! and `git push` mixes progress with errors. Every operation whose meaning depends on
//! matching that text has exactly one `classify_*` function here, so the heuristics can be
//! tested in isolation and swapped if git's wording changes.

use crate::core::runner::CommandResult;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Shown when `git status` reports the folder is not inside a repository.
pub const NOT_A_REPOSITORY_MESSAGE: &str = "Folder is not a git repository";

static FATAL_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(fatal|error):|not a git repository")
        .expect("Should compile: FATAL_LINE_RE")
});

static NOT_A_REPOSITORY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)not a git repository").expect("Should compile: NOT_A_REPOSITORY_RE")
});

static SWITCH_ERROR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^error:(.+?)aborting").expect("Should compile: SWITCH_ERROR_RE")
});

static PROGRESS_PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)%").expect("Should compile: PROGRESS_PERCENT_RE"));

static NO_CHANGES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)no changes").expect("Should compile: NO_CHANGES_RE"));

static NOTHING_TO_COMMIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)nothing to commit").expect("Should compile: NOTHING_TO_COMMIT_RE")
});

static PULL_STAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d+) files? changed(?:, (\d+) insertions?\(\+\))?(?:, (\d+) deletions?\(-\))?",
    )
    .expect("Should compile: PULL_STAT_RE")
});

static PULL_CHANGES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)Fast-forward\s(.+?)\s\d+ files? changed")
        .expect("Should compile: PULL_CHANGES_RE")
});

/// Result of probing a directory with `git status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryCheck {
    pub is_repository: bool,
    pub error_message: Option<String>,
}

/// Meaning of the last line `git commit` printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitOutcome {
    /// git said "no changes added to commit": edits exist but nothing is staged.
    NoChanges,
    /// git said "nothing to commit".
    NothingToCommit,
    Committed { summary: String },
}

impl CommitOutcome {
    /// Only a real commit consumes the message the user typed.
    pub fn clears_draft(&self) -> bool {
        matches!(self, CommitOutcome::Committed { .. })
    }

    pub fn is_noop(&self) -> bool {
        !self.clears_draft()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PushOutcome {
    Pushed { output: String },
    Failed { message: String },
}

/// Diffstat of a pull that brought in changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullSummary {
    /// Per-file lines between "Fast-forward" and the totals, if git printed them.
    pub changes: String,
    pub files_changed: u32,
    pub insertions: u32,
    pub deletions: u32,
}

impl PullSummary {
    pub fn describe(&self) -> String {
        format!(
            "{} files changed, {} insertions (+), {} deletions (-)",
            self.files_changed, self.insertions, self.deletions
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PullOutcome {
    UpToDate,
    Updated(PullSummary),
    Failed { message: String },
}

/// Whether a stderr line is a real failure rather than git's informational chatter.
pub fn is_fatal_line(line: &str) -> bool {
    FATAL_LINE_RE.is_match(line)
}

/// First fatal stderr text of a result, joined with the lines after it.
pub fn fatal_stderr(result: &CommandResult) -> Option<String> {
    let start = result.stderr.iter().position(|line| is_fatal_line(line))?;
    Some(result.stderr[start..].join("\n").trim().to_string())
}

/// `git status`: any stdout means a repository; the "not a git repository" marker means
/// not one; any other stderr is tolerated.
pub fn classify_repository_check(result: &CommandResult) -> RepositoryCheck {
    if !result.stdout.is_empty() {
        return RepositoryCheck {
            is_repository: true,
            error_message: None,
        };
    }

    if result
        .stderr
        .iter()
        .any(|line| NOT_A_REPOSITORY_RE.is_match(line))
    {
        return RepositoryCheck {
            is_repository: false,
            error_message: Some(NOT_A_REPOSITORY_MESSAGE.to_string()),
        };
    }

    if !result.stderr.is_empty() {
        log::debug!(
            "Treating directory as a repository despite stderr: {}",
            result.stderr_text()
        );
    }
    RepositoryCheck {
        is_repository: true,
        error_message: None,
    }
}

/// `git commit`: look for git's own no-op wording in the last output line.
pub fn classify_commit(last_line: &str) -> CommitOutcome {
    if NO_CHANGES_RE.is_match(last_line) {
        CommitOutcome::NoChanges
    } else if NOTHING_TO_COMMIT_RE.is_match(last_line) {
        CommitOutcome::NothingToCommit
    } else {
        CommitOutcome::Committed {
            summary: last_line.trim().to_string(),
        }
    }
}

/// `git push`: failed when the combined output mentions "fatal" anywhere.
pub fn classify_push(lines: &[String]) -> PushOutcome {
    let output = lines.join("\n").trim().to_string();
    if output.to_lowercase().contains("fatal") {
        PushOutcome::Failed { message: output }
    } else {
        PushOutcome::Pushed { output }
    }
}

/// `git pull`: failed when the combined output starts with a fatal/error envelope,
/// up to date when git says so, otherwise updated with the parsed diffstat.
pub fn classify_pull(lines: &[String]) -> PullOutcome {
    let output = lines.join("\n").trim().to_string();
    let lowered = output.to_lowercase();
    if lowered.starts_with("fatal") || lowered.starts_with("error") {
        return PullOutcome::Failed { message: output };
    }
    if lowered.contains("already up to date") {
        return PullOutcome::UpToDate;
    }
    PullOutcome::Updated(parse_pull_summary(&output))
}

/// Extract the diffstat of a pull. Missing numbers stay zero.
pub fn parse_pull_summary(output: &str) -> PullSummary {
    let mut summary = PullSummary::default();

    if let Some(caps) = PULL_STAT_RE.captures(output) {
        let number = |idx: usize| {
            caps.get(idx)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .unwrap_or(0)
        };
        summary.files_changed = number(1);
        summary.insertions = number(2);
        summary.deletions = number(3);
    } else {
        log::warn!("Pull output had no diffstat");
    }

    if let Some(caps) = PULL_CHANGES_RE.captures(output) {
        summary.changes = caps[1].trim().to_string();
    }

    summary
}

/// `git switch` failure text: the part between a leading `error:` and `aborting`,
/// or the whole stderr when that envelope is absent.
pub fn classify_switch_failure(stderr_text: &str) -> String {
    let trimmed = stderr_text.trim();
    match SWITCH_ERROR_RE.captures(trimmed) {
        Some(caps) => caps[1].trim().to_string(),
        None => trimmed.to_string(),
    }
}

/// Progress percentage of an `Updating files: NN% (x/y)` line from `git switch --progress`.
pub fn switch_progress(line: &str) -> Option<u8> {
    if !line.trim_start().starts_with("Updating") {
        return None;
    }
    Some(
        PROGRESS_PERCENT_RE
            .captures(line)
            .and_then(|caps| caps[1].parse::<u8>().ok())
            .unwrap_or(0),
    )
}
