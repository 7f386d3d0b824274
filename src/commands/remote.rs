use crate::commands::status::report_working_state;
use crate::core::{
    command_init::CommandInit,
    error::Result,
    outcome::PullOutcome,
    print_detail, print_info, print_success,
};
use std::path::PathBuf;

pub async fn execute_push(repo_arg: Option<PathBuf>) -> Result<()> {
    let ctx = CommandInit::initialize(repo_arg).await?;
    let branch = ctx.current_branch().await?;
    let report = ctx.sync.push(&ctx.repo, &branch).await?;

    let mut state = ctx.cached_state();
    state.set_branch(branch.as_str());
    state.set_remote_hash(report.remote_hash);
    let unpushed_known = report.unpushed.is_some();
    if let Some(unpushed) = report.unpushed {
        state.set_local_commits(unpushed);
    }

    print_success(&format!("Pushed {branch}"));
    if !report.output.is_empty() {
        print_detail(&report.output);
    }
    if let Some(hash) = &state.remote_hash {
        print_detail(&format!("origin/{branch} is now at {hash}"));
    }
    if unpushed_known {
        print_detail(&format!(
            "{} commit(s) still unpushed",
            state.local_commits.len()
        ));
    }
    Ok(())
}

pub async fn execute_pull(repo_arg: Option<PathBuf>) -> Result<()> {
    let ctx = CommandInit::initialize(repo_arg).await?;
    let mut state = ctx.cached_state();
    let prior = ctx.current_working_state().await;
    let report = ctx.sync.pull(&ctx.repo, &prior).await?;

    state.set_pull_summary(match &report.outcome {
        PullOutcome::Updated(summary) => Some(summary.clone()),
        PullOutcome::UpToDate | PullOutcome::Failed { .. } => None,
    });
    state.apply_working_state(report.working);

    match (&report.outcome, &state.pull_summary) {
        (PullOutcome::Failed { message }, _) => print_info(message),
        (_, Some(summary)) => {
            print_success(&summary.describe());
            if !summary.changes.is_empty() {
                print_detail(&summary.changes);
            }
        }
        (_, None) => print_info("Already up to date"),
    }
    report_working_state(&ctx, &state.working);
    Ok(())
}
