//! Typed, cached access to YAML configuration files with live reload.
//!
//! Values are read by dotted key, converted to the requested type once and
//! memoized in a process-wide container. Writing the file invalidates the
//! cache so the next read sees the new contents.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use yaml_config::config_store::ConfigStore;
//!
//! # async fn demo() -> Result<(), yaml_config::config_store::ConfigError> {
//! let store = ConfigStore::load(Some("database"))?;
//! store.start_watching().await?;
//!
//! let port = store.get_int("server.port")?;
//! println!("listening on {port}");
//! # Ok(())
//! # }
//! ```

/// Command-line interface for inspecting configuration files.
pub mod cli;

/// Configuration constants and filesystem locations.
pub mod config;

/// Cached configuration store with change tracking.
pub mod config_store;

/// Process-wide key/value container.
pub mod container;

/// Core error types and result aliases.
pub mod core;

/// YAML file loading and value conversion.
pub mod source;

/// Logging setup.
pub mod tracing_config;

pub use config_store::{ConfigStore, create_config};
pub use core::{Result, YamlConfigError};
