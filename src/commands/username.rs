use crate::core::{command_init::CommandInit, error::Result, print_info, print_success};
use std::path::PathBuf;

/// Show `user.name`, or replace it when a new name is given.
pub async fn execute_username(repo_arg: Option<PathBuf>, name: Option<String>) -> Result<()> {
    let ctx = CommandInit::initialize(repo_arg).await?;
    let bridge = ctx.sync.bridge();

    match name {
        Some(name) => {
            bridge.replace_username(&ctx.repo, &name).await?;
            print_success(&format!("user.name set to {name}"));
        }
        None => match bridge.get_username(&ctx.repo).await? {
            Some(current) => println!("{current}"),
            None => print_info("user.name is not set"),
        },
    }
    Ok(())
}
