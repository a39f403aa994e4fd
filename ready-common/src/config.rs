//! Configuration loading and root folder resolution

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8891;

/// Database file name inside the root folder
const DATABASE_FILE: &str = "readycheck.db";

/// Optional catalog override file inside the root folder
const CATALOG_FILE: &str = "categories.json";

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `READYCHECK_ROOT` environment variable
/// 3. `root_folder` key in the platform config.toml
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var("READYCHECK_ROOT") {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(root_folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Ensure the root folder exists on disk
pub fn ensure_root_folder(root: &Path) -> Result<()> {
    std::fs::create_dir_all(root)?;
    Ok(())
}

/// Path of the SQLite database inside the root folder
pub fn database_path(root: &Path) -> PathBuf {
    root.join(DATABASE_FILE)
}

/// Path of the optional catalog override inside the root folder
pub fn catalog_path(root: &Path) -> PathBuf {
    root.join(CATALOG_FILE)
}

/// Get configuration file path for the platform
fn locate_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/readycheck/config.toml first, then /etc/readycheck/config.toml
        if let Some(path) = dirs::config_dir().map(|d| d.join("readycheck").join("config.toml")) {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/readycheck/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("readycheck").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    }
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("readycheck"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/readycheck"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("readycheck"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/readycheck"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("readycheck"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\readycheck"))
    } else {
        PathBuf::from("./readycheck_data")
    }
}
