use crate::commands::status::report_working_state;
use crate::core::{
    command_init::CommandInit, error::Result, print_info, print_section_header, print_success,
};
use colored::*;
use std::io::Write;
use std::path::PathBuf;

pub async fn execute_branches(repo_arg: Option<PathBuf>) -> Result<()> {
    let ctx = CommandInit::initialize(repo_arg).await?;
    let mut state = ctx.cached_state();
    state.set_branches(ctx.sync.bridge().branch_list(&ctx.repo).await?);
    if let Some(current) = ctx.sync.bridge().current_branch(&ctx.repo).await? {
        state.set_branch(current);
    }
    let branches = &state.branches;

    if branches.local.is_empty() && branches.remote.is_empty() {
        print_info("No branches found. Make your first commit to create one.");
        return Ok(());
    }

    print_section_header("Local branches");
    for name in &branches.local {
        if state.branch.as_deref() == Some(name.as_str()) {
            println!(
                "{}{}{} {}",
                "[".bright_black(),
                "*".white(),
                "]".bright_black(),
                name.blue()
            );
        } else {
            println!("    {}", name.white());
        }
    }

    if !branches.remote.is_empty() {
        print_section_header("Remote branches");
        for name in &branches.remote {
            println!("    {}", name.bright_black());
        }
    }
    println!();
    Ok(())
}

pub async fn execute_switch(repo_arg: Option<PathBuf>, branch: String) -> Result<()> {
    let ctx = CommandInit::initialize(repo_arg).await?;
    let prior = ctx.current_working_state().await;

    let report = ctx
        .sync
        .switch_branch(&ctx.repo, &prior, &branch, |percent| {
            print!("\rUpdating files: {percent:>3}%");
            let _ = std::io::stdout().flush();
        })
        .await?;

    report_working_state(&ctx, &report.working);
    print_success(&format!("Switched to {}", branch.blue()));
    Ok(())
}
