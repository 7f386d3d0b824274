use crate::commands::status::report_working_state;
use crate::core::{command_init::CommandInit, error::Result, print_success};
use std::path::PathBuf;

pub async fn execute_stage(repo_arg: Option<PathBuf>, paths: Vec<String>) -> Result<()> {
    let ctx = CommandInit::initialize(repo_arg).await?;
    let mut working = ctx.current_working_state().await;
    for path in &paths {
        working = ctx.sync.stage_file(&ctx.repo, &working, path).await?;
    }

    report_working_state(&ctx, &working);
    print_success(&format!("Staged {} file(s)", paths.len()));
    Ok(())
}

pub async fn execute_unstage(repo_arg: Option<PathBuf>, paths: Vec<String>) -> Result<()> {
    let ctx = CommandInit::initialize(repo_arg).await?;
    let mut working = ctx.current_working_state().await;
    for path in &paths {
        working = ctx.sync.unstage_file(&ctx.repo, &working, path).await?;
    }

    report_working_state(&ctx, &working);
    print_success(&format!("Unstaged {} file(s)", paths.len()));
    Ok(())
}

pub async fn execute_stage_all(repo_arg: Option<PathBuf>) -> Result<()> {
    let ctx = CommandInit::initialize(repo_arg).await?;
    let prior = ctx.current_working_state().await;
    let working = ctx.sync.stage_all(&ctx.repo, &prior).await?;

    report_working_state(&ctx, &working);
    print_success("Staged all changes");
    Ok(())
}

pub async fn execute_unstage_all(repo_arg: Option<PathBuf>) -> Result<()> {
    let ctx = CommandInit::initialize(repo_arg).await?;
    let prior = ctx.current_working_state().await;
    let working = ctx.sync.unstage_all(&ctx.repo, &prior).await?;

    report_working_state(&ctx, &working);
    print_success("Unstaged all changes");
    Ok(())
}
