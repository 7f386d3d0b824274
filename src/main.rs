use clap::{Parser, Subcommand};
use git_deck::commands::*;
use git_deck::core::{error::Result, print_error};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "git-deck")]
#[command(about = "Stage, commit and sync git repositories from the terminal")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Repository directory (defaults to the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    repo: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether the directory is a git repository
    Check,
    /// Show changed and staged files
    Status {
        /// Show the views saved by the last run without asking git
        #[arg(long)]
        cached: bool,
    },
    /// Show the file tree without ignored entries
    Tree {
        /// Show the tree saved by the last run without reading the disk
        #[arg(long)]
        cached: bool,
    },
    /// Stage files
    Stage {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Unstage files
    Unstage {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Stage every change
    StageAll,
    /// Unstage everything
    UnstageAll,
    /// Discard changes to files
    Revert {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Remove untracked files and discard all changes
    RevertAll,
    /// Commit staged changes
    Commit {
        /// Commit message
        #[arg(short, long)]
        message: String,
        /// Set user.name before committing
        #[arg(long)]
        username: Option<String>,
    },
    /// Push the current branch
    Push,
    /// Pull the current branch
    Pull,
    /// List local and remote branches
    Branches,
    /// Switch to another branch
    Switch { branch: String },
    /// Show unpushed commits
    Log {
        /// Show the remote-tracking branch instead
        #[arg(long)]
        remote: bool,
    },
    /// Count commits across all refs
    Count,
    /// Show or replace user.name
    Username { name: Option<String> },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli).await {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let repo = cli.repo;
    match cli.command {
        Commands::Check => execute_check(repo).await,
        Commands::Status { cached } => execute_status(repo, cached).await,
        Commands::Tree { cached } => execute_tree(repo, cached).await,
        Commands::Stage { paths } => execute_stage(repo, paths).await,
        Commands::Unstage { paths } => execute_unstage(repo, paths).await,
        Commands::StageAll => execute_stage_all(repo).await,
        Commands::UnstageAll => execute_unstage_all(repo).await,
        Commands::Revert { paths } => execute_revert(repo, paths).await,
        Commands::RevertAll => execute_revert_all(repo).await,
        Commands::Commit { message, username } => execute_commit(repo, message, username).await,
        Commands::Push => execute_push(repo).await,
        Commands::Pull => execute_pull(repo).await,
        Commands::Branches => execute_branches(repo).await,
        Commands::Switch { branch } => execute_switch(repo, branch).await,
        Commands::Log { remote } => execute_log(repo, remote).await,
        Commands::Count => execute_count(repo).await,
        Commands::Username { name } => execute_username(repo, name).await,
    }
}
