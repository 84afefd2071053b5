//! Per-OS locations for the settings file and the database.
//!
//! `LINKSHELF_CONFIG_DIR` and `LINKSHELF_DATA_DIR` override the defaults.
//!
//! | OS      | config                                    | data                       |
//! |---------|-------------------------------------------|----------------------------|
//! | Linux   | `$XDG_CONFIG_HOME/linkshelf`              | `$XDG_DATA_HOME/linkshelf` |
//! | macOS   | `~/Library/Application Support/Linkshelf` | same as config             |
//! | Windows | `%APPDATA%\Linkshelf`                     | same as config             |

use std::env;
use std::path::PathBuf;

pub const CONFIG_DIR_ENV: &str = "LINKSHELF_CONFIG_DIR";
pub const DATA_DIR_ENV: &str = "LINKSHELF_DATA_DIR";

#[cfg(any(target_os = "macos", target_os = "windows"))]
const APP_DIR: &str = "Linkshelf";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const APP_DIR: &str = "linkshelf";

fn home_dir() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir())
}

/// Value of `var` if it is set and non-empty.
fn env_dir(var: &str) -> Option<PathBuf> {
    env::var(var).ok().filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// Directory holding `settings.json`.
pub fn get_config_dir() -> PathBuf {
    if let Some(dir) = env_dir(CONFIG_DIR_ENV) {
        return dir;
    }
    #[cfg(target_os = "macos")]
    {
        home_dir().join("Library").join("Application Support").join(APP_DIR)
    }
    #[cfg(target_os = "windows")]
    {
        env_dir("APPDATA").unwrap_or_else(home_dir).join(APP_DIR)
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        env_dir("XDG_CONFIG_HOME")
            .unwrap_or_else(|| home_dir().join(".config"))
            .join(APP_DIR)
    }
}

/// Directory holding `linkshelf.db`.
pub fn get_data_dir() -> PathBuf {
    if let Some(dir) = env_dir(DATA_DIR_ENV) {
        return dir;
    }
    #[cfg(any(target_os = "macos", target_os = "windows"))]
    {
        get_config_dir()
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        env_dir("XDG_DATA_HOME")
            .unwrap_or_else(|| home_dir().join(".local").join("share"))
            .join(APP_DIR)
    }
}
