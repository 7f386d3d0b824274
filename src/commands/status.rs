use crate::core::{
    command_init::{CommandContext, CommandInit},
    error::Result,
    file_status::FileStatus,
    output::print_file_line,
    print_info, print_section_header,
    state::WorkingState,
};
use std::path::PathBuf;

/// Show the staged and changed views. With `cached`, show the last persisted views
/// without asking git.
pub async fn execute_status(repo_arg: Option<PathBuf>, cached: bool) -> Result<()> {
    let ctx = CommandInit::initialize(repo_arg).await?;
    let mut state = ctx.cached_state();
    if cached {
        print_info("Cached views, run without --cached to refresh");
        print_working_state(&state.working);
        return Ok(());
    }

    let working = ctx.sync.refresh(&ctx.repo, &state.working).await;
    state.apply_working_state(working);
    report_working_state(&ctx, &state.working);
    Ok(())
}

/// Print the staged and changed sections, or a single line for a clean tree.
pub fn print_working_state(working: &WorkingState) {
    if working.is_clean() {
        print_info("Nothing to commit, working tree clean");
        return;
    }

    if !working.staged.is_empty() {
        print_section_header("Staged files");
        for entry in &working.staged {
            print_file_line(FileStatus::Staged, &entry.path);
        }
    }

    if !working.changed.is_empty() {
        print_section_header("Changed files");
        for entry in &working.changed {
            print_file_line(FileStatus::Changed, &entry.path);
        }
    }
    println!();
}

/// Print the views a mutation returned and persist them for the next command.
pub(crate) fn report_working_state(ctx: &CommandContext, working: &WorkingState) {
    print_working_state(working);
    ctx.store_working_state(working);
}
