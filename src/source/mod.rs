//! YAML configuration source.
//!
//! Locates a configuration file by name inside a directory, parses it into an
//! owned tree, and answers dotted-key lookups against that tree. The
//! [`cast`] functions turn looked-up values into typed results and
//! [`FileWatcher`] reports changes to the file on disk.

pub mod cast;
mod file_watcher;
mod path_ops;

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde_yaml::Value;
use tracing::{debug, instrument};

pub use file_watcher::{FileEvent, FileEventKind, FileWatcher};

use crate::{
    config::SUPPORTED_EXTENSIONS,
    core::{Result, YamlConfigError, location_of},
};

/// A single YAML configuration file and its parsed contents.
///
/// Cloning produces a deep copy of the parsed tree; later reloads of either
/// copy never affect the other.
#[derive(Debug, Clone)]
pub struct YamlSource {
    config_dir: PathBuf,
    config_name: String,
    config_file: Option<PathBuf>,
    tree: Value,
}

impl YamlSource {
    /// Creates an unloaded source for `<config_dir>/<config_name>.{yaml,yml}`.
    ///
    /// Call [`YamlSource::read_file`] to load it.
    pub fn new(config_dir: impl Into<PathBuf>, config_name: impl Into<String>) -> Self {
        Self {
            config_dir: config_dir.into(),
            config_name: config_name.into(),
            config_file: None,
            tree: Value::Null,
        }
    }

    /// Points the source at a different file name in the same directory.
    ///
    /// The current tree is kept until the next successful [`YamlSource::read_file`].
    pub fn set_config_name(&mut self, config_name: impl Into<String>) {
        self.config_name = config_name.into();
        self.config_file = None;
    }

    /// File name (without extension) this source reads
    pub fn config_name(&self) -> &str {
        &self.config_name
    }

    /// Directory searched for the configuration file
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path of the file last located by [`YamlSource::read_file`]
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Locates, reads and parses the configuration file.
    ///
    /// The in-memory tree is replaced only if every step succeeds, so a
    /// failed read leaves the previous contents in place.
    ///
    /// # Errors
    /// * `YamlConfigError::ConfigFileNotFound` - no file with a supported extension exists
    /// * `YamlConfigError::IoError` - the file exists but cannot be read
    /// * `YamlConfigError::YamlParseError` - the file is not valid YAML
    /// * `YamlConfigError::NotAMapping` - the document root is not a mapping
    #[instrument(skip(self), fields(name = %self.config_name))]
    pub fn read_file(&mut self) -> Result<()> {
        let path = self.find_config_file()?;
        let content = fs::read_to_string(&path).map_err(|e| YamlConfigError::io(e, &path))?;
        let tree = parse_tree(&content, Some(&path))?;

        debug!(path = %path.display(), "configuration file loaded");

        self.tree = tree;
        self.config_file = Some(path);

        Ok(())
    }

    /// Looks up a dotted key, returning `None` when any segment is missing.
    pub fn get(&self, key: &str) -> Option<&Value> {
        path_ops::navigate_path(&self.tree, key)
    }

    /// The whole parsed tree
    pub fn tree(&self) -> &Value {
        &self.tree
    }

    fn find_config_file(&self) -> Result<PathBuf> {
        SUPPORTED_EXTENSIONS
            .iter()
            .map(|ext| self.config_dir.join(format!("{}.{ext}", self.config_name)))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| YamlConfigError::ConfigFileNotFound {
                name: self.config_name.clone(),
                dir: self.config_dir.clone(),
            })
    }
}

/// Parses YAML text into a configuration tree.
///
/// An empty document is an empty mapping.
///
/// # Errors
/// Returns an error if the text is not YAML or its root is not a mapping.
pub fn parse_tree(content: &str, path: Option<&Path>) -> Result<Value> {
    let tree: Value =
        serde_yaml::from_str(content).map_err(|e| YamlConfigError::yaml_parse(e, path))?;

    match path_ops::untag(&tree) {
        Value::Null => Ok(Value::Mapping(serde_yaml::Mapping::new())),
        Value::Mapping(_) => Ok(tree),
        other => Err(YamlConfigError::NotAMapping {
            location: location_of(path),
            found: kind_name(other),
        }),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
