//! Temporary git repositories for integration tests
//!
//! Every helper shells out to the real `git` binary, the same one the bridge drives.

#![allow(dead_code)]

use assert_cmd::Command;
use git_deck::core::error::Result;
use git_deck::RepositoryHandle;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test repository setup result. The TempDir must be kept alive for the duration of
/// the test to prevent cleanup.
pub struct TestRepo {
    pub temp_dir: TempDir,
    pub path: PathBuf,
}

impl TestRepo {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn handle(&self) -> RepositoryHandle {
        RepositoryHandle::new(&self.path)
    }
}

/// Run git in `repo_path` and return its stdout.
pub fn git(repo_path: &Path, args: &[&str]) -> Result<String> {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Fresh repository on branch `main` with a local identity configured.
pub fn setup_test_repo() -> Result<TestRepo> {
    let temp_dir = TempDir::new()?;
    let repo_path = temp_dir.path().to_path_buf();

    git(&repo_path, &["init"])?;
    git(&repo_path, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
    git(&repo_path, &["config", "user.name", "Test User"])?;
    git(&repo_path, &["config", "user.email", "test@example.com"])?;
    git(&repo_path, &["config", "commit.gpgsign", "false"])?;

    Ok(TestRepo {
        temp_dir,
        path: repo_path,
    })
}

/// Repository with "initial.txt" committed.
pub fn setup_test_repo_with_initial_commit() -> Result<TestRepo> {
    let repo = setup_test_repo()?;

    create_file(&repo.path, "initial.txt", "initial content\n")?;
    git_add(&repo.path, "initial.txt")?;
    git_commit(&repo.path, "Initial commit")?;

    Ok(repo)
}

/// Write a file, creating parent directories as needed.
pub fn create_file(repo_path: &Path, filename: &str, content: &str) -> Result<()> {
    let path = repo_path.join(filename);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

pub fn git_add(repo_path: &Path, filename: &str) -> Result<()> {
    git(repo_path, &["add", filename])?;
    Ok(())
}

pub fn git_commit(repo_path: &Path, message: &str) -> Result<()> {
    git(repo_path, &["commit", "-m", message])?;
    Ok(())
}

pub fn git_branch(repo_path: &Path, name: &str) -> Result<()> {
    git(repo_path, &["branch", name])?;
    Ok(())
}

/// Bare repository wired up as `origin` of `repo`, with `main` pushed and tracked.
pub fn add_origin(repo: &TestRepo) -> Result<TempDir> {
    let remote_dir = TempDir::new()?;
    git(remote_dir.path(), &["init", "--bare"])?;
    git(remote_dir.path(), &["symbolic-ref", "HEAD", "refs/heads/main"])?;
    let remote = remote_dir.path().to_string_lossy().into_owned();
    git(&repo.path, &["remote", "add", "origin", &remote])?;
    git(&repo.path, &["push", "-u", "origin", "main"])?;
    Ok(remote_dir)
}

/// The binary under test with config and cache isolated in `home`.
pub fn git_deck(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("git-deck").expect("git-deck binary should be built");
    cmd.env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_CACHE_HOME", home.join("cache"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}
