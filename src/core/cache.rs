//! Persisted per-repository views shown before the first refresh completes.
//!
//! Three independent JSON files live under `<cache dir>/<md5 of repo path>/`:
//! the filtered file tree, the changed list and the staged list. Each is written on its
//! own, so a failure to write one does not affect the others.

use crate::core::dirs::get_cache_directory;
use crate::core::error::{GitDeckError, Result};
use crate::core::ignore::DirectoryNode;
use crate::core::state::{FileStatusEntry, RepositoryHandle, WorkingState};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const FILE_LIST_FILE: &str = "fileList.json";
pub const DIFF_LIST_FILE: &str = "diffList.json";
pub const STAGED_LIST_FILE: &str = "stagedList.json";

#[derive(Debug, Clone)]
pub struct CacheStore {
    base_dir: PathBuf,
}

impl CacheStore {
    /// Store rooted at the platform cache directory.
    pub fn open() -> Result<Self> {
        Ok(Self::with_base_dir(get_cache_directory()?))
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn repository_dir(&self, repo: &RepositoryHandle) -> PathBuf {
        let repo_hash = format!(
            "{:x}",
            md5::compute(repo.path().to_string_lossy().as_bytes())
        );
        self.base_dir.join(repo_hash)
    }

    pub fn save_file_list(&self, repo: &RepositoryHandle, files: &[DirectoryNode]) -> Result<()> {
        self.save(repo, FILE_LIST_FILE, files)
    }

    pub fn save_diff_list(
        &self,
        repo: &RepositoryHandle,
        entries: &[FileStatusEntry],
    ) -> Result<()> {
        self.save(repo, DIFF_LIST_FILE, entries)
    }

    pub fn save_staged_list(
        &self,
        repo: &RepositoryHandle,
        entries: &[FileStatusEntry],
    ) -> Result<()> {
        self.save(repo, STAGED_LIST_FILE, entries)
    }

    /// Write both views, logging rather than failing on individual write errors.
    pub fn save_working_state(&self, repo: &RepositoryHandle, working: &WorkingState) {
        if let Err(e) = self.save_diff_list(repo, &working.changed) {
            log::warn!("Cache save failed for changed list: {e}");
        }
        if let Err(e) = self.save_staged_list(repo, &working.staged) {
            log::warn!("Cache save failed for staged list: {e}");
        }
    }

    pub fn load_file_list(&self, repo: &RepositoryHandle) -> Result<Vec<DirectoryNode>> {
        self.load(repo, FILE_LIST_FILE)
    }

    pub fn load_diff_list(&self, repo: &RepositoryHandle) -> Result<Vec<FileStatusEntry>> {
        self.load(repo, DIFF_LIST_FILE)
    }

    pub fn load_staged_list(&self, repo: &RepositoryHandle) -> Result<Vec<FileStatusEntry>> {
        self.load(repo, STAGED_LIST_FILE)
    }

    /// Whatever was cached for the repository. Missing or unreadable files give empty lists.
    pub fn load_working_state(&self, repo: &RepositoryHandle) -> WorkingState {
        WorkingState {
            changed: self.load_diff_list(repo).unwrap_or_else(|e| {
                log::debug!("No cached changed list: {e}");
                Vec::new()
            }),
            staged: self.load_staged_list(repo).unwrap_or_else(|e| {
                log::debug!("No cached staged list: {e}");
                Vec::new()
            }),
        }
    }

    fn save<T: Serialize + ?Sized>(
        &self,
        repo: &RepositoryHandle,
        file_name: &str,
        value: &T,
    ) -> Result<()> {
        let cache_dir = self.repository_dir(repo);

        if let Err(e) = fs::create_dir_all(&cache_dir) {
            log::error!(
                "Failed to create cache directory '{}': {}",
                cache_dir.display(),
                e
            );
            return Err(GitDeckError::cache_directory_creation_failed(&cache_dir, e));
        }

        let cache_file = cache_dir.join(file_name);
        let json = serde_json::to_string_pretty(value).map_err(|e| {
            log::error!("Failed to serialize cache data: {e}");
            GitDeckError::cache_serialization_failed(e)
        })?;

        if let Err(e) = fs::write(&cache_file, json) {
            log::error!(
                "Failed to write cache file '{}': {}",
                cache_file.display(),
                e
            );
            return Err(GitDeckError::cache_write_failed(&cache_file, e));
        }

        log::debug!("Cached {}", cache_file.display());
        Ok(())
    }

    fn load<T: DeserializeOwned>(&self, repo: &RepositoryHandle, file_name: &str) -> Result<T> {
        let cache_file = self.repository_dir(repo).join(file_name);
        read_cache_file(&cache_file)
    }
}

fn read_cache_file<T: DeserializeOwned>(cache_file: &Path) -> Result<T> {
    if !cache_file.exists() {
        log::debug!("Cache file does not exist: {}", cache_file.display());
        return Err(GitDeckError::cache_file_not_found(cache_file));
    }

    let content = fs::read_to_string(cache_file).map_err(|e| {
        log::error!(
            "Failed to read cache file '{}': {}",
            cache_file.display(),
            e
        );
        GitDeckError::cache_read_failed(cache_file, e)
    })?;

    serde_json::from_str(&content).map_err(|e| {
        log::error!(
            "Failed to parse cache file '{}': {}",
            cache_file.display(),
            e
        );
        GitDeckError::cache_parse_failed(cache_file, e)
    })
}
