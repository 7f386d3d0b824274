use crate::commands::status::report_working_state;
use crate::core::{command_init::CommandInit, error::Result, print_success};
use std::path::PathBuf;

pub async fn execute_revert(repo_arg: Option<PathBuf>, paths: Vec<String>) -> Result<()> {
    let ctx = CommandInit::initialize(repo_arg).await?;
    let mut working = ctx.current_working_state().await;
    for path in &paths {
        working = ctx.sync.revert_file(&ctx.repo, &working, path).await?;
    }

    report_working_state(&ctx, &working);
    print_success(&format!("Reverted {} file(s)", paths.len()));
    Ok(())
}

/// Remove untracked files and discard every tracked change.
pub async fn execute_revert_all(repo_arg: Option<PathBuf>) -> Result<()> {
    let ctx = CommandInit::initialize(repo_arg).await?;
    let prior = ctx.current_working_state().await;
    let working = ctx.sync.revert_all(&ctx.repo, &prior).await?;

    report_working_state(&ctx, &working);
    print_success("Reverted all changes");
    Ok(())
}
