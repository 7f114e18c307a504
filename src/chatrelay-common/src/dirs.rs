//! Application home directory resolution.
//!
//! The home directory defaults to `~/.chatrelay` and can be overridden with
//! the `CHATRELAY_HOME` environment variable.

use std::path::{Path, PathBuf};

/// Environment variable overriding the home directory.
pub const CHATRELAY_HOME_ENV: &str = "CHATRELAY_HOME";

/// Home directory name under the user's home.
pub const HOME_DIR_NAME: &str = ".chatrelay";

/// Configuration file name inside the home directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Resolve the home directory from an optional override value.
///
/// Relative overrides are resolved against the current directory so config
/// files never land somewhere unexpected.
pub fn chatrelay_home(override_value: Option<&str>) -> Option<PathBuf> {
    match override_value.filter(|v| !v.is_empty()) {
        Some(value) => {
            let path = PathBuf::from(value);
            if path.is_relative() {
                std::env::current_dir().ok().map(|cwd| cwd.join(path))
            } else {
                Some(path)
            }
        }
        None => dirs::home_dir().map(|home| home.join(HOME_DIR_NAME)),
    }
}

/// Path of the config file inside `home`.
pub fn config_file_path(home: &Path) -> PathBuf {
    home.join(CONFIG_FILE)
}
