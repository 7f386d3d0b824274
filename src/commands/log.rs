use crate::core::{
    command_init::CommandInit,
    error::Result,
    output::print_commit_line,
    print_info, print_section_header,
    state::CommitScope,
};
use std::path::PathBuf;

/// Show unpushed commits, or the commits of the remote-tracking branch with `remote`.
pub async fn execute_log(repo_arg: Option<PathBuf>, remote: bool) -> Result<()> {
    let ctx = CommandInit::initialize(repo_arg).await?;
    let branch = ctx.current_branch().await?;
    let scope = if remote {
        CommitScope::Remote
    } else {
        CommitScope::LocalUnpushed
    };

    let commits = ctx
        .sync
        .bridge()
        .get_commit_log(&ctx.repo, scope, &branch)
        .await?;

    if commits.is_empty() {
        match scope {
            CommitScope::LocalUnpushed => print_info("No unpushed commits"),
            CommitScope::Remote => print_info(&format!("No commits on origin/{branch}")),
        }
        return Ok(());
    }

    match scope {
        CommitScope::LocalUnpushed => print_section_header("Unpushed commits"),
        CommitScope::Remote => print_section_header(&format!("origin/{branch}")),
    }
    for commit in &commits {
        print_commit_line(commit);
    }
    println!();
    Ok(())
}

pub async fn execute_count(repo_arg: Option<PathBuf>) -> Result<()> {
    let ctx = CommandInit::initialize(repo_arg).await?;
    let count = ctx.sync.bridge().commit_count(&ctx.repo).await?;
    println!("{count}");
    Ok(())
}
