//! Predefined repository states shared by several test files

#![allow(dead_code)]

use super::repository::*;
use git_deck::core::error::Result;

/// Committed `src/a.txt` and `src/b.txt`, then `src/a.txt` modified and
/// `notes.txt` left untracked.
pub fn create_modified_repo() -> Result<TestRepo> {
    let repo = setup_test_repo()?;

    create_file(&repo.path, "src/a.txt", "a\n")?;
    create_file(&repo.path, "src/b.txt", "b\n")?;
    git_add(&repo.path, ".")?;
    git_commit(&repo.path, "Initial commit")?;

    create_file(&repo.path, "src/a.txt", "a changed\n")?;
    create_file(&repo.path, "notes.txt", "draft\n")?;

    Ok(repo)
}

/// Repository with an ignore file, an ignored build folder and an ignored log file.
pub fn create_repo_with_ignored_files() -> Result<TestRepo> {
    let repo = setup_test_repo_with_initial_commit()?;

    create_file(&repo.path, ".gitignore", "target/\n*.log\n")?;
    create_file(&repo.path, "target/debug/app", "binary")?;
    create_file(&repo.path, "debug.log", "noise")?;
    create_file(&repo.path, "src/main.rs", "fn main() {}\n")?;

    Ok(repo)
}
