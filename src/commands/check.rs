use crate::core::{
    command_init::resolve_repository,
    config::DeskConfig,
    error::{GitDeckError, Result},
    git::GitBridge,
    print_success,
};
use std::path::PathBuf;

/// Report whether the directory is a git repository.
pub async fn execute_check(repo_arg: Option<PathBuf>) -> Result<()> {
    let config = DeskConfig::load_or_create()?;
    let repo = resolve_repository(repo_arg)?;
    let bridge = GitBridge::from_config(&config);

    let check = bridge.check_repository(&repo).await?;
    if !check.is_repository {
        return Err(GitDeckError::not_a_repository(
            check.error_message.unwrap_or_default(),
        ));
    }

    print_success(&format!("{} is a git repository", repo.name()));
    Ok(())
}
