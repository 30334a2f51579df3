use thiserror::Error;

use crate::config_store::{ConfigError, ValueKind};

/// Errors that can occur during CLI command execution.
#[derive(Error, Debug)]
pub enum CliError {
    /// An error occurred in the configuration store.
    ///
    /// This wraps load failures, type mismatches and watch failures.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A value could not be rendered as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Waiting for the interrupt signal failed.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Type alias for command execution results.
///
/// Commands return the text to print on success.
pub type CommandResult = Result<String, CliError>;

/// Value types accepted by `--as`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ValueType {
    /// Untyped YAML value
    Raw,
    /// String value
    String,
    /// Boolean value
    Bool,
    /// Platform-width integer
    Int,
    /// 32-bit integer
    Int32,
    /// 64-bit integer
    Int64,
    /// Floating point value
    Float64,
    /// Time span such as `1m30s`
    Duration,
    /// List of strings
    StringSlice,
}

impl From<ValueType> for ValueKind {
    fn from(value: ValueType) -> Self {
        match value {
            ValueType::Raw => Self::Raw,
            ValueType::String => Self::String,
            ValueType::Bool => Self::Bool,
            ValueType::Int => Self::Int,
            ValueType::Int32 => Self::Int32,
            ValueType::Int64 => Self::Int64,
            ValueType::Float64 => Self::Float64,
            ValueType::Duration => Self::Duration,
            ValueType::StringSlice => Self::StringSlice,
        }
    }
}
