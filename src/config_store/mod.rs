//! Cached, typed access to YAML configuration with live invalidation.
//!
//! A [`ConfigStore`] serves typed values by dotted key, memoizing each
//! conversion in a process-wide container under a shared prefix. When the
//! file is written, the whole namespace is evicted once per change; the
//! [`ChangeGate`] collapses the duplicate notifications the file watcher
//! emits for a single save.

mod changes;
mod file_watching;
mod gate;
mod store;
mod value;

#[cfg(test)]
mod tests;

pub use changes::{ConfigError, ReloadEvent};
pub use gate::{ChangeGate, DEFAULT_DEBOUNCE_WINDOW};
pub use store::{ConfigContainer, ConfigStore, ConfigStoreBuilder, create_config, shared_container};
pub use value::{CacheValue, CachedValue, ValueKind};
