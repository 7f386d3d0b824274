use crate::commands::status::report_working_state;
use crate::core::{
    command_init::CommandInit,
    error::Result,
    outcome::CommitOutcome,
    print_detail, print_info, print_success,
    state::AppState,
};
use std::path::PathBuf;

pub async fn execute_commit(
    repo_arg: Option<PathBuf>,
    message: String,
    username: Option<String>,
) -> Result<()> {
    let ctx = CommandInit::initialize(repo_arg).await?;
    let username = username.or_else(|| ctx.config.default_username.clone());

    let mut state = AppState::new();
    state.open_repository(ctx.repo.clone());
    state.set_commit_draft(message);

    let prior = ctx.current_working_state().await;
    let report = ctx
        .sync
        .commit(&ctx.repo, &prior, &state.commit_draft, username.as_deref())
        .await?;

    state.apply_commit(&report.outcome);
    state.apply_working_state(report.working);
    if let Some(unpushed) = report.unpushed {
        state.set_local_commits(unpushed);
    }

    report_working_state(&ctx, &state.working);
    match &report.outcome {
        CommitOutcome::NoChanges => {
            print_info("No changes added to commit. Stage files first.");
        }
        CommitOutcome::NothingToCommit => print_info("Nothing to commit"),
        CommitOutcome::Committed { summary } => {
            print_success("Committed");
            print_detail(summary);
            if !state.local_commits.is_empty() {
                print_detail(&format!(
                    "{} commit(s) waiting to be pushed",
                    state.local_commits.len()
                ));
            }
        }
    }
    Ok(())
}
