//! Typed git operations built on the process runner.
//!
//! [`GitBridge`] owns a [`CommandRunner`] and the name of the git executable. Each
//! operation builds one argv, runs it in the repository's working directory and turns
//! the text git printed into typed data.
//!
//! # Output policy
//! - stdout is the payload
//! - stderr is collected and only treated as a failure when it carries a fatal marker
//!   (see [`outcome::is_fatal_line`]) or the operation checks the exit code
//! - output that cannot be parsed degrades to an empty or partial result with a warning
//! - tool failures keep git's own text, nothing is retried
//!
//! The bridge never interprets commit, push or pull output; those classifications live
//! in [`crate::core::outcome`] and are applied by the synchronizer.

use crate::core::config::DeskConfig;
use crate::core::error::{GitDeckError, Result};
use crate::core::log_parser::{commit_log, CommitRecord, LOG_DATE_FORMAT, LOG_PRETTY_FORMAT};
use crate::core::outcome::{self, RepositoryCheck};
use crate::core::runner::{
    CommandResult, CommandRunner, Invocation, OutputListeners, ProcessRunner,
};
use crate::core::state::{BranchSet, CommitScope, FileStatusEntry, RepositoryHandle};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_GIT_PROGRAM: &str = "git";

/// Revision range of commits that have not reached the push target yet.
const UNPUSHED_RANGE: &str = "@{push}..";

const SHORT_HASH_FORMAT: &str = "--pretty=format:\"%h\"";

/// `-c` value that makes git print non-ASCII paths as-is instead of C-quoting them.
const UNQUOTED_PATHS: &str = "core.quotepath=false";

/// One author line of `git shortlog -sne`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub commits: u32,
    pub name: String,
    pub email: Option<String>,
}

pub struct GitBridge<R: CommandRunner = ProcessRunner> {
    runner: R,
    program: String,
}

impl GitBridge<ProcessRunner> {
    pub fn new() -> Self {
        Self::with_runner(ProcessRunner::new())
    }

    pub fn from_config(config: &DeskConfig) -> Self {
        let runner = match config.command_timeout() {
            Some(limit) => ProcessRunner::with_timeout(limit),
            None => ProcessRunner::new(),
        };
        Self::with_runner(runner).with_program(&config.git_program)
    }
}

impl Default for GitBridge<ProcessRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> GitBridge<R> {
    pub fn with_runner(runner: R) -> Self {
        Self {
            runner,
            program: DEFAULT_GIT_PROGRAM.to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn invocation(&self, cwd: &Path, args: &[&str]) -> Invocation {
        Invocation::new(&self.program, args.iter().copied(), cwd)
    }

    /// Run one command. Only spawn failures and timeouts are errors here.
    async fn exec_with(
        &self,
        cwd: &Path,
        args: &[&str],
        listeners: OutputListeners<'_>,
    ) -> Result<CommandResult> {
        let invocation = self.invocation(cwd, args);
        let result = self.runner.run(&invocation, listeners).await?;
        if result.timed_out {
            return Err(GitDeckError::timed_out(
                invocation.display(),
                self.runner.timeout().unwrap_or_default(),
            ));
        }
        Ok(result)
    }

    async fn exec(&self, repo: &RepositoryHandle, args: &[&str]) -> Result<CommandResult> {
        self.exec_with(repo.path(), args, OutputListeners::new())
            .await
    }

    /// Run one command and fail on a non-zero exit.
    async fn exec_checked(&self, repo: &RepositoryHandle, args: &[&str]) -> Result<CommandResult> {
        let result = self.exec(repo, args).await?;
        if !result.success() {
            return Err(self.failure(args, &result));
        }
        Ok(result)
    }

    /// Run a listing command and fail only on a fatal stderr marker.
    async fn exec_listing(
        &self,
        repo: &RepositoryHandle,
        args: &[&str],
    ) -> Result<CommandResult> {
        let result = self.exec(repo, args).await?;
        if let Some(message) = outcome::fatal_stderr(&result) {
            return Err(GitDeckError::tool_failure(self.display(args), message));
        }
        if !result.success() {
            log::warn!(
                "`{}` exited with {:?} without a fatal marker, using its stdout",
                self.display(args),
                result.exit_code
            );
        }
        Ok(result)
    }

    fn display(&self, args: &[&str]) -> String {
        format!("{} {}", self.program, args.join(" "))
    }

    fn failure(&self, args: &[&str], result: &CommandResult) -> GitDeckError {
        let message = outcome::fatal_stderr(result)
            .or_else(|| Some(result.stderr_text()).filter(|text| !text.is_empty()))
            .unwrap_or_else(|| match result.exit_code {
                Some(code) => format!("{} exited with code {code}", self.display(args)),
                None => format!("{} was terminated", self.display(args)),
            });
        GitDeckError::tool_failure(self.display(args), message)
    }

    /// Probe a directory with `git status`.
    pub async fn check_repository(&self, repo: &RepositoryHandle) -> Result<RepositoryCheck> {
        let result = self.exec(repo, &["status"]).await?;
        Ok(outcome::classify_repository_check(&result))
    }

    pub async fn list_changed_files(&self, repo: &RepositoryHandle) -> Result<Vec<FileStatusEntry>> {
        let result = self
            .exec_listing(repo, &["-c", UNQUOTED_PATHS, "diff", "--name-only"])
            .await?;
        Ok(parse_name_list(&result.stdout))
    }

    pub async fn list_staged_files(&self, repo: &RepositoryHandle) -> Result<Vec<FileStatusEntry>> {
        let result = self
            .exec_listing(repo, &["-c", UNQUOTED_PATHS, "diff", "--name-only", "--cached"])
            .await?;
        Ok(parse_name_list(&result.stdout))
    }

    pub async fn list_untracked_files(
        &self,
        repo: &RepositoryHandle,
    ) -> Result<Vec<FileStatusEntry>> {
        let result = self
            .exec_listing(
                repo,
                &["-c", UNQUOTED_PATHS, "ls-files", "--others", "--exclude-standard"],
            )
            .await?;
        Ok(parse_name_list(&result.stdout))
    }

    pub async fn stage_file(&self, repo: &RepositoryHandle, path: &str) -> Result<()> {
        self.exec_checked(repo, &["add", "--", path]).await?;
        Ok(())
    }

    pub async fn unstage_file(&self, repo: &RepositoryHandle, path: &str) -> Result<()> {
        self.exec_checked(repo, &["restore", "--staged", "--", path])
            .await?;
        Ok(())
    }

    pub async fn stage_all(&self, repo: &RepositoryHandle) -> Result<()> {
        self.exec_checked(repo, &["add", "."]).await?;
        Ok(())
    }

    pub async fn unstage_all(&self, repo: &RepositoryHandle) -> Result<()> {
        self.exec_checked(repo, &["reset", "HEAD"]).await?;
        Ok(())
    }

    /// Commit the index and return the last line git printed on either stream.
    ///
    /// The exit code is ignored: "nothing to commit" exits non-zero and is still a
    /// meaningful answer. Use [`outcome::classify_commit`] on the returned line.
    pub async fn commit(&self, repo: &RepositoryHandle, message: &str) -> Result<String> {
        let result = self.exec(repo, &["commit", "-m", message]).await?;
        Ok(result.last_line().trim().to_string())
    }

    /// Discard working-tree changes of one file.
    pub async fn revert_file(&self, repo: &RepositoryHandle, path: &str) -> Result<()> {
        self.exec_checked(repo, &["restore", "--", path]).await?;
        Ok(())
    }

    pub async fn remove_untracked(&self, repo: &RepositoryHandle) -> Result<()> {
        self.exec_checked(repo, &["clean", "-f"]).await?;
        Ok(())
    }

    /// Delete one untracked file.
    pub async fn remove_untracked_file(&self, repo: &RepositoryHandle, path: &str) -> Result<()> {
        self.exec_checked(repo, &["clean", "-f", "--", path]).await?;
        Ok(())
    }

    /// Remove untracked files, then restore every tracked one.
    pub async fn revert_all(&self, repo: &RepositoryHandle) -> Result<()> {
        self.remove_untracked(repo).await?;
        self.exec_checked(repo, &["restore", "."]).await?;
        Ok(())
    }

    /// Every trimmed line `git push` printed, both streams in arrival order.
    pub async fn push(&self, repo: &RepositoryHandle) -> Result<Vec<String>> {
        let result = self.exec(repo, &["push"]).await?;
        Ok(trimmed_lines(&result))
    }

    pub async fn pull(&self, repo: &RepositoryHandle) -> Result<Vec<String>> {
        let result = self.exec(repo, &["pull"]).await?;
        Ok(trimmed_lines(&result))
    }

    pub async fn fetch(&self, repo: &RepositoryHandle) -> Result<Vec<String>> {
        let result = self.exec_checked(repo, &["fetch"]).await?;
        Ok(trimmed_lines(&result))
    }

    pub async fn switch_branch(&self, repo: &RepositoryHandle, branch: &str) -> Result<Vec<String>> {
        self.switch_branch_with_progress(repo, branch, |_| {}).await
    }

    /// Switch branches, reporting the "Updating files" percentage as git prints it.
    pub async fn switch_branch_with_progress<F>(
        &self,
        repo: &RepositoryHandle,
        branch: &str,
        mut on_progress: F,
    ) -> Result<Vec<String>>
    where
        F: FnMut(u8) + Send,
    {
        let args = ["switch", branch, "--progress"];
        let listeners = OutputListeners::new().on_stderr(|line| {
            if let Some(percent) = outcome::switch_progress(line) {
                on_progress(percent);
            }
        });
        let result = self.exec_with(repo.path(), &args, listeners).await?;

        if result.success() {
            return Ok(trimmed_lines(&result));
        }
        let stderr = outcome::fatal_stderr(&result).unwrap_or_else(|| result.stderr_text());
        let message = outcome::classify_switch_failure(&stderr);
        Err(GitDeckError::tool_failure(self.display(&args), message))
    }

    pub async fn branch_list(&self, repo: &RepositoryHandle) -> Result<BranchSet> {
        let result = self.exec_listing(repo, &["branch", "-a"]).await?;
        Ok(parse_branch_list(&result.stdout))
    }

    pub async fn current_branch(&self, repo: &RepositoryHandle) -> Result<Option<String>> {
        let result = self
            .exec_listing(repo, &["branch", "--show-current"])
            .await?;
        Ok(first_non_empty(&result.stdout))
    }

    /// Commits not yet pushed, or the commits of `origin/<branch>`.
    ///
    /// git fails when there is no push target or remote-tracking branch; that is logged
    /// and reported as an empty list.
    pub async fn get_commit_log(
        &self,
        repo: &RepositoryHandle,
        scope: CommitScope,
        branch: &str,
    ) -> Result<Vec<CommitRecord>> {
        let range = log_range(scope, branch);
        let args = ["log", range.as_str(), LOG_PRETTY_FORMAT, LOG_DATE_FORMAT];
        let result = self.exec(repo, &args).await?;

        if let Some(message) = outcome::fatal_stderr(&result) {
            log::warn!("Commit log for {range} unavailable: {message}");
        }

        let records: Vec<CommitRecord> = commit_log(&result.stdout).collect();
        log::debug!("Parsed {} commits for {range}", records.len());
        Ok(records)
    }

    pub async fn get_latest_remote_commit_hash(
        &self,
        repo: &RepositoryHandle,
        branch: &str,
    ) -> Result<Option<String>> {
        self.latest_hash(repo, &log_range(CommitScope::Remote, branch))
            .await
    }

    pub async fn get_latest_local_commit_hash(
        &self,
        repo: &RepositoryHandle,
    ) -> Result<Option<String>> {
        self.latest_hash(repo, UNPUSHED_RANGE).await
    }

    async fn latest_hash(&self, repo: &RepositoryHandle, range: &str) -> Result<Option<String>> {
        let result = self
            .exec(repo, &["log", range, SHORT_HASH_FORMAT, "-1"])
            .await?;
        if let Some(message) = outcome::fatal_stderr(&result) {
            log::warn!("No commit hash for {range}: {message}");
            return Ok(None);
        }
        Ok(first_non_empty(&result.stdout).map(|hash| hash.trim_matches('"').to_string()))
    }

    /// Number of commits reachable from any ref. Unparsable output counts as zero.
    pub async fn commit_count(&self, repo: &RepositoryHandle) -> Result<u64> {
        let result = self
            .exec_listing(repo, &["rev-list", "--count", "--all"])
            .await?;
        let text = first_non_empty(&result.stdout).unwrap_or_default();
        Ok(text.parse::<u64>().unwrap_or_else(|_| {
            log::warn!("Unexpected commit count output: {text:?}");
            0
        }))
    }

    pub async fn configure_username(&self, repo: &RepositoryHandle, name: &str) -> Result<()> {
        self.exec_checked(repo, &["config", "user.name", name])
            .await?;
        Ok(())
    }

    pub async fn replace_username(&self, repo: &RepositoryHandle, name: &str) -> Result<()> {
        self.exec_checked(repo, &["config", "--replace-all", "user.name", name])
            .await?;
        Ok(())
    }

    /// Configured `user.name`, or `None` when git has none.
    pub async fn get_username(&self, repo: &RepositoryHandle) -> Result<Option<String>> {
        self.config_value(repo, "user.name").await
    }

    pub async fn remote_origin(&self, repo: &RepositoryHandle) -> Result<Option<String>> {
        self.config_value(repo, "remote.origin.url").await
    }

    async fn config_value(&self, repo: &RepositoryHandle, key: &str) -> Result<Option<String>> {
        // `git config --get` exits 1 for a missing key and prints nothing.
        let result = self.exec_listing(repo, &["config", "--get", key]).await?;
        Ok(first_non_empty(&result.stdout))
    }

    pub async fn contributors(&self, repo: &RepositoryHandle) -> Result<Vec<Contributor>> {
        let result = self
            .exec_listing(repo, &["shortlog", "-sne", "HEAD"])
            .await?;
        Ok(result
            .stdout
            .iter()
            .filter_map(|line| parse_contributor(line))
            .collect())
    }

    pub async fn last_commit_message(&self, repo: &RepositoryHandle) -> Result<String> {
        let result = self.exec_checked(repo, &["log", "-1", "--pretty=%B"]).await?;
        Ok(result.stdout.join("\n").trim().to_string())
    }

    pub async fn toplevel(&self, repo: &RepositoryHandle) -> Result<PathBuf> {
        let result = self
            .exec_checked(repo, &["rev-parse", "--show-toplevel"])
            .await?;
        first_non_empty(&result.stdout)
            .map(PathBuf::from)
            .ok_or_else(|| GitDeckError::not_a_repository(outcome::NOT_A_REPOSITORY_MESSAGE))
    }

    /// Move HEAD back one commit, keeping its changes staged.
    pub async fn undo_last_commit(&self, repo: &RepositoryHandle) -> Result<()> {
        self.exec_checked(repo, &["reset", "--soft", "HEAD^"])
            .await?;
        Ok(())
    }

    /// Clone `url` into a new directory under `parent` and return its handle.
    pub async fn clone_repository<F>(
        &self,
        parent: &Path,
        url: &str,
        mut on_line: F,
    ) -> Result<RepositoryHandle>
    where
        F: FnMut(&str) + Send,
    {
        let args = ["clone", "--progress", url];
        let listeners = OutputListeners::new().on_stderr(|line| on_line(line));
        let result = self.exec_with(parent, &args, listeners).await?;
        if !result.success() {
            return Err(self.failure(&args, &result));
        }
        Ok(RepositoryHandle::new(parent.join(repository_name_from_url(url))))
    }

    pub async fn version(&self, cwd: &Path) -> Result<String> {
        let result = self
            .exec_with(cwd, &["--version"], OutputListeners::new())
            .await?;
        if !result.success() {
            return Err(self.failure(&["--version"], &result));
        }
        Ok(first_non_empty(&result.stdout).unwrap_or_default())
    }

    /// Turn off TLS certificate checks for every repository of the current user.
    ///
    /// Only call this when the user enabled `disable_ssl_verify` in the config.
    pub async fn disable_ssl_verification(&self, repo: &RepositoryHandle) -> Result<()> {
        log::warn!("Disabling http.sslVerify globally");
        self.exec_checked(repo, &["config", "--global", "http.sslVerify", "false"])
            .await?;
        Ok(())
    }
}

fn log_range(scope: CommitScope, branch: &str) -> String {
    match scope {
        CommitScope::LocalUnpushed => UNPUSHED_RANGE.to_string(),
        CommitScope::Remote => format!("origin/{branch}"),
    }
}

fn trimmed_lines(result: &CommandResult) -> Vec<String> {
    result
        .combined()
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

fn first_non_empty(lines: &[String]) -> Option<String> {
    lines
        .iter()
        .map(|line| line.trim())
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// One entry per non-empty line of a `--name-only` style listing.
pub fn parse_name_list<S: AsRef<str>>(lines: &[S]) -> Vec<FileStatusEntry> {
    lines
        .iter()
        .map(|line| line.as_ref().trim())
        .filter(|line| !line.is_empty())
        .map(FileStatusEntry::from_tool_path)
        .collect()
}

/// Split `git branch -a` output into sorted, deduplicated local and remote names.
///
/// The symbolic `remotes/origin/HEAD -> origin/main` line is not a branch and is dropped.
pub fn parse_branch_list<S: AsRef<str>>(lines: &[S]) -> BranchSet {
    let mut branches = BranchSet::default();

    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() || line.contains(" -> ") {
            continue;
        }

        let name = line.trim_start_matches(['*', '+']).trim();
        match strip_prefix_ignore_case(name, "remotes/") {
            Some(remote) => branches.remote.push(remote.to_string()),
            None => branches.local.push(name.to_string()),
        }
    }

    for list in [&mut branches.local, &mut branches.remote] {
        list.sort();
        list.dedup();
    }
    branches
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

fn parse_contributor(line: &str) -> Option<Contributor> {
    let (count, who) = line.trim().split_once('\t')?;
    let commits = count.trim().parse().ok()?;
    let (name, email) = match who.rsplit_once(" <") {
        Some((name, email)) => (name, Some(email.trim_end_matches('>').to_string())),
        None => (who, None),
    };
    Some(Contributor {
        commits,
        name: name.trim().to_string(),
        email,
    })
}

/// Directory name `git clone` creates for a URL.
pub fn repository_name_from_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    let last = url.rsplit(['/', ':']).next().unwrap_or(url);
    last.strip_suffix(".git").unwrap_or(last).to_string()
}
