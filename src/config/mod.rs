//! Locations and naming conventions for configuration files.
//!
//! Configuration is read from `<base>/configs/<name>.yaml` (or `.yml`), where
//! `<base>` defaults to the working directory. Cache entries for every loaded
//! file share the [`CONFIG_KEY_PREFIX`] namespace in the shared container.

mod paths;

pub use paths::ConfigPaths;

/// Namespace prefix for configuration entries in the shared container.
pub const CONFIG_KEY_PREFIX: &str = "Config_";

/// File name (without extension) loaded when none is given.
pub const DEFAULT_CONFIG_NAME: &str = "config";

/// Sub-directory of the base path holding configuration files.
pub const CONFIG_DIR_NAME: &str = "configs";

/// Extensions tried, in order, when locating a configuration file.
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Environment variable overriding the application base path.
pub const BASE_PATH_ENV: &str = "YAML_CONFIG_BASE_PATH";
