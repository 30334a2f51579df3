use std::{
    fmt,
    path::{Path, PathBuf},
    result,
};

use thiserror::Error;

/// Error types for reading and parsing configuration files.
///
/// These are raised by the YAML source when a file cannot be located,
/// read, or parsed into a configuration tree.
#[derive(Error, Debug)]
pub enum YamlConfigError {
    /// No file with a supported extension exists for the configured name
    #[error("config file '{name}' not found in '{dir}'")]
    ConfigFileNotFound {
        /// File name without extension
        name: String,
        /// Directory that was searched
        dir: PathBuf,
    },

    /// I/O operation error
    #[error("I/O error on '{path}': {details}")]
    IoError {
        /// Path where I/O error occurred
        path: PathBuf,
        /// I/O error details
        details: String,
    },

    /// YAML parsing error with location context
    #[error("failed to parse YAML at '{location}': {details}")]
    YamlParseError {
        /// Location of YAML being parsed (file path or "string")
        location: String,
        /// Parse error details
        details: String,
    },

    /// The document parsed, but its root is a scalar or a sequence
    #[error("configuration root in '{location}' must be a mapping, found {found}")]
    NotAMapping {
        /// Location of the offending document
        location: String,
        /// Kind of value found at the root
        found: &'static str,
    },
}

/// A specialized `Result` type for configuration source operations.
pub type Result<T> = result::Result<T, YamlConfigError>;

impl YamlConfigError {
    /// Creates a YAML parsing error with optional file path context.
    ///
    /// # Arguments
    ///
    /// * `error` - The underlying parsing error
    /// * `path` - Optional path to the file that failed to parse
    pub fn yaml_parse(error: impl fmt::Display, path: Option<&Path>) -> Self {
        YamlConfigError::YamlParseError {
            location: location_of(path),
            details: error.to_string(),
        }
    }

    /// Creates an I/O error bound to the file it happened on.
    pub fn io(error: impl fmt::Display, path: &Path) -> Self {
        YamlConfigError::IoError {
            path: path.to_path_buf(),
            details: error.to_string(),
        }
    }
}

pub(crate) fn location_of(path: Option<&Path>) -> String {
    match path {
        Some(p) => {
            let clean_path = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
            clean_path.to_string_lossy().to_string()
        }
        None => "string".to_string(),
    }
}
