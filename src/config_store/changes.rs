use std::{path::PathBuf, time::Instant};

use super::ValueKind;
use crate::core::YamlConfigError;

/// Notification that the cache was invalidated after a file change.
#[derive(Debug, Clone, PartialEq)]
pub struct ReloadEvent {
    /// File whose change triggered the invalidation
    pub path: PathBuf,
    /// Number of cache entries evicted
    pub evicted: usize,
    /// When the invalidation happened
    pub timestamp: Instant,
}

/// Errors that can occur during configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A cached value was requested as a different type than it was cached as.
    #[error("Type mismatch at {key}: cached as {found}, requested as {expected}")]
    TypeMismatch {
        /// The key that was requested
        key: String,
        /// The kind the caller asked for
        expected: ValueKind,
        /// The kind already in the cache
        found: ValueKind,
    },

    /// The configuration file could not be loaded when the store was created.
    #[error("failed to load configuration '{name}': {source}")]
    InitialLoad {
        /// File name (without extension) that was requested
        name: String,
        /// Underlying source error
        #[source]
        source: YamlConfigError,
    },

    /// The configuration directory could not be determined
    #[error("failed to resolve configuration directory: {details}")]
    ConfigDirError {
        /// Error details
        details: String,
    },

    /// Failed to initialize file watcher
    #[error("failed to initialize file watcher: {details}")]
    FileWatcherInitError {
        /// File watcher initialization error details
        details: String,
    },

    /// Error occurred while watching a specific file
    #[error("file watcher error for '{path}': {details}")]
    FileWatchError {
        /// Path being watched when error occurred
        path: PathBuf,
        /// File watcher error details
        details: String,
    },
}
