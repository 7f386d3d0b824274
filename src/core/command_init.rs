//! Shared setup for every subcommand that works inside a repository.
//!
//! [`CommandInit::initialize`] resolves the repository directory, loads the config,
//! checks the directory really is a repository and, when the user opted in, turns off
//! TLS verification. The resulting [`CommandContext`] carries the synchronizer and the
//! cache so commands only deal with their own operation.

use crate::core::{
    cache::CacheStore,
    config::DeskConfig,
    error::{GitDeckError, Result},
    state::{AppState, RepositoryHandle, WorkingState},
    sync::Synchronizer,
};
use std::env;
use std::path::PathBuf;

pub struct CommandContext {
    pub config: DeskConfig,
    pub repo: RepositoryHandle,
    pub sync: Synchronizer,
    pub cache: CacheStore,
}

impl CommandContext {
    /// The last persisted views, shown until a refresh replaces them.
    pub fn cached_working_state(&self) -> WorkingState {
        self.cache.load_working_state(&self.repo)
    }

    /// Fresh views, falling back to the cached ones for any list git fails to produce.
    pub async fn current_working_state(&self) -> WorkingState {
        self.sync
            .refresh(&self.repo, &self.cached_working_state())
            .await
    }

    /// Application state for this repository, seeded with whatever the cache holds.
    pub fn cached_state(&self) -> AppState {
        let mut state = AppState::new();
        state.open_repository(self.repo.clone());
        let files = self.cache.load_file_list(&self.repo).unwrap_or_else(|e| {
            log::debug!("No cached file list for {}: {e}", self.repo);
            Vec::new()
        });
        state.restore_from_cache(files, self.cached_working_state());
        state
    }

    pub fn store_working_state(&self, working: &WorkingState) {
        self.cache.save_working_state(&self.repo, working);
    }

    /// Branch used for remote commit queries, `main` when HEAD is detached.
    pub async fn current_branch(&self) -> Result<String> {
        Ok(self
            .sync
            .bridge()
            .current_branch(&self.repo)
            .await?
            .unwrap_or_else(|| {
                log::warn!("No current branch in {}, assuming main", self.repo);
                "main".to_string()
            }))
    }
}

pub struct CommandInit;

impl CommandInit {
    /// Resolve `--repo` (or the current directory) into a ready-to-use context.
    pub async fn initialize(repo_arg: Option<PathBuf>) -> Result<CommandContext> {
        let config = DeskConfig::load_or_create()?;
        let repo = resolve_repository(repo_arg)?;
        let sync = Synchronizer::from_config(&config);

        let check = sync.bridge().check_repository(&repo).await?;
        if !check.is_repository {
            return Err(GitDeckError::not_a_repository(
                check.error_message.unwrap_or_default(),
            ));
        }

        if config.disable_ssl_verify {
            sync.bridge().disable_ssl_verification(&repo).await?;
        }

        log::debug!("Initialized command context for {repo}");
        Ok(CommandContext {
            config,
            repo,
            sync,
            cache: CacheStore::open()?,
        })
    }
}

pub fn resolve_repository(repo_arg: Option<PathBuf>) -> Result<RepositoryHandle> {
    let path = match repo_arg {
        Some(path) => path,
        None => env::current_dir()?,
    };
    if !path.is_dir() {
        return Err(GitDeckError::not_a_repository(format!(
            "{} does not exist or is not a directory",
            path.display()
        )));
    }
    Ok(RepositoryHandle::new(path))
}
