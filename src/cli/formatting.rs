//! Formatting utilities for CLI output.
//!
//! Provides consistent formatting for configuration values and styled
//! messages for the command line.

use serde_yaml::Value;

use crate::config_store::CachedValue;

/// ANSI color codes for terminal output
pub struct Colors;

impl Colors {
    /// Reset all formatting
    pub const RESET: &'static str = "\x1b[0m";
    /// Bold text
    pub const BOLD: &'static str = "\x1b[1m";
    /// Dim text
    pub const DIM: &'static str = "\x1b[2m";
    /// Red color
    pub const RED: &'static str = "\x1b[31m";
    /// Cyan color
    pub const CYAN: &'static str = "\x1b[36m";
}

/// Formats configuration keys with styling
pub fn format_key(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::CYAN, text, Colors::RESET)
}

/// Formats descriptions with muted styling
pub fn format_description(text: &str) -> String {
    format!("{}{}{}", Colors::DIM, text, Colors::RESET)
}

/// Formats error messages with red styling
pub fn format_error(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::RED, text, Colors::RESET)
}

/// Formats a cached configuration value for human-readable CLI output.
///
/// # Examples
///
/// ```
/// use yaml_config::{cli::formatting::format_value, config_store::CachedValue};
///
/// assert_eq!(format_value(&CachedValue::String("svc".to_string())), "\"svc\"");
/// assert_eq!(format_value(&CachedValue::Int(8080)), "8080");
/// ```
pub fn format_value(value: &CachedValue) -> String {
    match value {
        CachedValue::Raw(raw) => format_yaml_value(raw),
        CachedValue::String(s) => format!("\"{s}\""),
        CachedValue::Bool(b) => b.to_string(),
        CachedValue::Int(i) => i.to_string(),
        CachedValue::Int32(i) => i.to_string(),
        CachedValue::Int64(i) => i.to_string(),
        CachedValue::Float64(f) => f.to_string(),
        CachedValue::Duration(d) => format!("{d:?}"),
        CachedValue::StringSlice(items) => format!("[{}]", items.join(", ")),
    }
}

/// Formats a YAML value for human-readable CLI output.
///
/// Complex types like sequences and mappings show their size rather than
/// full contents.
pub fn format_yaml_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => format!("\"{s}\""),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Sequence(items) => format!("[{}]", items.len()),
        Value::Mapping(mapping) => format!("{{{}}}", mapping.len()),
        Value::Tagged(tagged) => format!("{} {}", tagged.tag, format_yaml_value(&tagged.value)),
    }
}
