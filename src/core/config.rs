use crate::core::dirs::get_config_directory;
use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DeskConfig {
    /// Executable every bridge operation spawns.
    pub git_program: String,
    /// Kill git invocations that run longer than this. Unset means wait forever.
    pub command_timeout_secs: Option<u64>,
    /// Run at most one mutating git command per repository at a time.
    pub serialize_mutations: bool,
    /// Issue `git config --global http.sslVerify false` when a repository is opened.
    pub disable_ssl_verify: bool,
    /// Author name configured before each commit, when set.
    pub default_username: Option<String>,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            git_program: "git".to_string(),
            command_timeout_secs: None,
            serialize_mutations: true,
            disable_ssl_verify: false,
            default_username: None,
        }
    }
}

impl DeskConfig {
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_in(&get_config_directory()?)
    }

    pub fn load_or_create_in(config_dir: &Path) -> Result<Self> {
        let config_file = config_dir.join(CONFIG_FILE_NAME);

        if config_file.exists() {
            let content = std::fs::read_to_string(&config_file)?;
            Ok(serde_json::from_str(&content)?)
        } else {
            log::debug!("Creating default config at {}", config_file.display());
            let config = Self::default();
            config.save_in(config_dir)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_in(&get_config_directory()?)
    }

    pub fn save_in(&self, config_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(config_dir)?;

        let config_file = config_dir.join(CONFIG_FILE_NAME);
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_file, content)?;

        Ok(())
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs.map(Duration::from_secs)
    }
}
