use std::{env, io::Error, path::PathBuf};

use super::{BASE_PATH_ENV, CONFIG_DIR_NAME};

/// Utility struct for managing configuration file paths
///
/// All configuration files live in a single `configs` directory under the
/// application base path.
pub struct ConfigPaths;

impl ConfigPaths {
    /// Returns the application base path
    ///
    /// Uses `YAML_CONFIG_BASE_PATH` when it is set and non-empty, otherwise
    /// the current working directory.
    ///
    /// # Errors
    /// Returns an error if the environment variable is unset and the current
    /// directory cannot be determined
    pub fn base_path() -> Result<PathBuf, Error> {
        match env::var(BASE_PATH_ENV) {
            Ok(base) if !base.trim().is_empty() => Ok(PathBuf::from(base)),
            _ => env::current_dir(),
        }
    }

    /// Returns the directory configuration files are loaded from
    ///
    /// # Errors
    /// Returns an error if the base path cannot be determined
    pub fn config_dir() -> Result<PathBuf, Error> {
        Ok(Self::base_path()?.join(CONFIG_DIR_NAME))
    }

    /// Get the application log directory
    ///
    /// Creates the directory if it doesn't exist.
    ///
    /// # Errors
    /// Returns error if directory cannot be created
    pub fn log_dir() -> Result<PathBuf, Error> {
        let log_dir = Self::base_path()?.join("logs");

        if !log_dir.exists() {
            std::fs::create_dir_all(&log_dir)?;
        }

        Ok(log_dir)
    }
}
