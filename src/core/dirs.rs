use crate::core::error::Result;
use std::path::PathBuf;

const APP_DIR_NAME: &str = "git-deck";

pub fn get_config_directory() -> Result<PathBuf> {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::home_dir().unwrap_or_default().join(".config")),
        "macos" => dirs::home_dir()
            .unwrap_or_default()
            .join("Library/Application Support"),
        _ => dirs::config_dir().unwrap_or_default(),
    };

    Ok(base.join(APP_DIR_NAME))
}

pub fn get_cache_directory() -> Result<PathBuf> {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::home_dir().unwrap_or_default().join(".cache")),
        "macos" => dirs::home_dir().unwrap_or_default().join("Library/Caches"),
        _ => dirs::cache_dir().unwrap_or_default(),
    };

    Ok(base.join(APP_DIR_NAME))
}
