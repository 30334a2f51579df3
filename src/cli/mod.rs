//! Command-line interface for inspecting configuration files.

/// Output formatting helpers
pub mod formatting;
mod types;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use futures::StreamExt;
use tracing::{debug, instrument};

use crate::config_store::{CachedValue, ConfigStore, create_config};
use formatting::{format_description, format_key, format_value};
pub use types::{CliError, CommandResult, ValueType};

#[derive(Parser, Debug)]
#[command(name = "yaml-config")]
#[command(about = "Read typed values from YAML configuration files")]
/// Top-level command-line arguments
pub struct Cli {
    /// Directory holding the configuration files
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Configuration file name without extension
    #[arg(long, global = true)]
    pub file: Option<String>,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
/// Available commands
pub enum Commands {
    /// Print the value stored under a dotted key
    Get {
        /// Dotted key such as `server.port`
        key: String,

        /// Type to convert the value to
        #[arg(long = "as", value_enum, default_value_t = ValueType::Raw)]
        kind: ValueType,

        /// Print the value as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the value again every time the file changes
    Watch {
        /// Dotted key such as `server.port`
        key: String,

        /// Type to convert the value to
        #[arg(long = "as", value_enum, default_value_t = ValueType::Raw)]
        kind: ValueType,
    },

    /// Print the value from this file and from another file in the same directory
    Compare {
        /// Name of the other file without extension
        other: String,

        /// Dotted key such as `server.port`
        key: String,

        /// Type to convert the value to
        #[arg(long = "as", value_enum, default_value_t = ValueType::Raw)]
        kind: ValueType,
    },
}

impl Cli {
    /// Opens the configuration store the arguments point at.
    ///
    /// Without `--dir` this is the regular start-up path and exits the
    /// process when the file cannot be loaded.
    ///
    /// # Errors
    /// Returns error if the file in an explicit `--dir` cannot be loaded.
    pub fn open_store(&self) -> Result<ConfigStore, CliError> {
        let Some(dir) = &self.dir else {
            return Ok(create_config(self.file.as_deref()));
        };

        let mut builder = ConfigStore::builder().config_dir(dir);
        if let Some(file) = &self.file {
            builder = builder.file_name(file);
        }
        Ok(builder.build()?)
    }
}

/// Runs the parsed command and returns what should be printed last.
///
/// # Errors
/// Returns error if the store cannot be opened, a value has another type
/// cached, or watching fails.
pub async fn run(cli: Cli) -> CommandResult {
    let store = cli.open_store()?;

    match cli.command {
        Commands::Get { key, kind, json } => get(&store, &key, kind, json),
        Commands::Watch { key, kind } => watch(&store, &key, kind).await,
        Commands::Compare { other, key, kind } => compare(&store, &other, &key, kind),
    }
}

#[instrument(skip(store))]
fn get(store: &ConfigStore, key: &str, kind: ValueType, json: bool) -> CommandResult {
    let value = store.get_kind(key, kind.into())?;

    if json {
        return Ok(serde_json::to_string_pretty(&value)?);
    }

    Ok(format_entry(key, &value))
}

#[instrument(skip(store))]
async fn watch(store: &ConfigStore, key: &str, kind: ValueType) -> CommandResult {
    store.start_watching().await?;
    let mut reloads = Box::pin(store.subscribe());

    println!("{}", format_entry(key, &store.get_kind(key, kind.into())?));

    loop {
        tokio::select! {
            reload = reloads.next() => {
                let Some(reload) = reload else {
                    break;
                };
                debug!(evicted = reload.evicted, "reload received");

                let value = store.get_kind(key, kind.into())?;
                println!(
                    "{} {}",
                    format_entry(key, &value),
                    format_description(&format!("({} cached values evicted)", reload.evicted))
                );
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
        }
    }

    Ok(String::new())
}

#[instrument(skip(store))]
fn compare(store: &ConfigStore, other: &str, key: &str, kind: ValueType) -> CommandResult {
    let current = store.get_kind(key, kind.into())?;

    let other_store = store.clone_with_file(other);
    // Clones share the cache namespace.
    other_store.clear_cache();
    let theirs = other_store.get_kind(key, kind.into())?;

    Ok(format!(
        "{}\n{}",
        format_line(&store.config_name(), key, &current),
        format_line(other, key, &theirs)
    ))
}

fn format_entry(key: &str, value: &CachedValue) -> String {
    format!("{} = {}", format_key(key), format_value(value))
}

fn format_line(file: &str, key: &str, value: &CachedValue) -> String {
    format!("{} {}", format_description(&format!("{file}:")), format_entry(key, value))
}
