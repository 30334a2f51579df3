use std::{
    path::PathBuf,
    process,
    sync::{
        Arc, Mutex, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
        atomic::AtomicBool,
    },
    time::Duration,
};

use serde_yaml::Value;
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument, trace};

use crate::{
    config::{CONFIG_KEY_PREFIX, ConfigPaths, DEFAULT_CONFIG_NAME},
    container::Container,
    source::YamlSource,
};

use super::{CacheValue, CachedValue, ChangeGate, ConfigError, ReloadEvent, ValueKind};

/// Container type holding every cached configuration value
pub type ConfigContainer = Container<CachedValue>;

const RELOAD_CHANNEL_CAPACITY: usize = 16;

static SHARED_CONTAINER: OnceLock<Arc<ConfigContainer>> = OnceLock::new();

/// The process-wide container used by stores that are not given their own.
pub fn shared_container() -> Arc<ConfigContainer> {
    Arc::clone(SHARED_CONTAINER.get_or_init(|| Arc::new(Container::new())))
}

/// Typed, read-through cached access to a YAML configuration file.
///
/// Every accessor checks the shared container for an entry under the
/// configuration key prefix first, and on a miss converts the raw value from
/// the file, caches it, and returns it. All stores in a process share one
/// namespace: two stores bound to different files see whichever value was
/// cached first for a given key.
///
/// Cloning the handle shares everything, including the loaded file. Use
/// [`ConfigStore::clone_with_file`] for an independent copy bound to another
/// file.
#[derive(Clone)]
pub struct ConfigStore {
    source: Arc<RwLock<YamlSource>>,
    container: Arc<ConfigContainer>,
    gate: Arc<ChangeGate>,
    write_guard: Arc<Mutex<()>>,
    pub(super) watching: Arc<AtomicBool>,
    pub(super) reload_sender: broadcast::Sender<ReloadEvent>,
}

impl ConfigStore {
    /// Starts building a store with explicit collaborators
    pub fn builder() -> ConfigStoreBuilder {
        ConfigStoreBuilder::default()
    }

    /// Loads `<config dir>/<file_name>.yaml`, defaulting to `config`.
    ///
    /// Uses the process-wide container and change gate.
    ///
    /// # Errors
    /// * `ConfigError::ConfigDirError` - If the configuration directory cannot be determined
    /// * `ConfigError::InitialLoad` - If the file cannot be found, read or parsed
    pub fn load(file_name: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Self::builder();
        if let Some(name) = file_name {
            builder = builder.file_name(name);
        }
        builder.build()
    }

    fn from_source(
        source: YamlSource,
        container: Arc<ConfigContainer>,
        gate: Arc<ChangeGate>,
        write_guard: Arc<Mutex<()>>,
    ) -> Self {
        let (reload_sender, _) = broadcast::channel(RELOAD_CHANNEL_CAPACITY);

        Self {
            source: Arc::new(RwLock::new(source)),
            container,
            gate,
            write_guard,
            watching: Arc::new(AtomicBool::new(false)),
            reload_sender,
        }
    }

    /// Retrieves the value at `key` as `T`, caching it on first access
    ///
    /// A missing key yields the zero value of `T` and is cached like any other.
    ///
    /// # Arguments
    /// * `key` - Dot-separated path to the configuration field (e.g., "server.port")
    ///
    /// # Errors
    /// * `ConfigError::TypeMismatch` - If `key` is already cached as a different type
    pub fn get<T: CacheValue>(&self, key: &str) -> Result<T, ConfigError> {
        let value = self.get_kind(key, T::KIND)?;

        T::from_cached(value).map_err(|other| ConfigError::TypeMismatch {
            key: key.to_string(),
            expected: T::KIND,
            found: other.kind(),
        })
    }

    /// Retrieves the value at `key` converted to `kind`, caching it on first access
    ///
    /// # Errors
    /// * `ConfigError::TypeMismatch` - If `key` is already cached as a different kind
    pub fn get_kind(&self, key: &str, kind: ValueKind) -> Result<CachedValue, ConfigError> {
        if let Some(cached) = self.cached(key) {
            if cached.kind() != kind {
                return Err(ConfigError::TypeMismatch {
                    key: key.to_string(),
                    expected: kind,
                    found: cached.kind(),
                });
            }
            return Ok(cached);
        }

        let value = {
            let source = self.read_source();
            CachedValue::from_raw(kind, source.get(key))
        };

        self.cache(key, value.clone());
        Ok(value)
    }

    /// Untyped YAML value at `key`, `Null` when absent
    ///
    /// # Errors
    /// * `ConfigError::TypeMismatch` - If `key` is already cached as a different type
    pub fn get_raw(&self, key: &str) -> Result<Value, ConfigError> {
        self.get(key)
    }

    /// String value at `key`
    ///
    /// # Errors
    /// * `ConfigError::TypeMismatch` - If `key` is already cached as a different type
    pub fn get_string(&self, key: &str) -> Result<String, ConfigError> {
        self.get(key)
    }

    /// Boolean value at `key`
    ///
    /// # Errors
    /// * `ConfigError::TypeMismatch` - If `key` is already cached as a different type
    pub fn get_bool(&self, key: &str) -> Result<bool, ConfigError> {
        self.get(key)
    }

    /// Platform-width integer at `key`
    ///
    /// # Errors
    /// * `ConfigError::TypeMismatch` - If `key` is already cached as a different type
    pub fn get_int(&self, key: &str) -> Result<isize, ConfigError> {
        self.get(key)
    }

    /// 32-bit integer at `key`
    ///
    /// # Errors
    /// * `ConfigError::TypeMismatch` - If `key` is already cached as a different type
    pub fn get_int32(&self, key: &str) -> Result<i32, ConfigError> {
        self.get(key)
    }

    /// 64-bit integer at `key`
    ///
    /// # Errors
    /// * `ConfigError::TypeMismatch` - If `key` is already cached as a different type
    pub fn get_int64(&self, key: &str) -> Result<i64, ConfigError> {
        self.get(key)
    }

    /// Floating point value at `key`
    ///
    /// # Errors
    /// * `ConfigError::TypeMismatch` - If `key` is already cached as a different type
    pub fn get_float64(&self, key: &str) -> Result<f64, ConfigError> {
        self.get(key)
    }

    /// Duration at `key`, e.g. `30s` or `1h15m`
    ///
    /// # Errors
    /// * `ConfigError::TypeMismatch` - If `key` is already cached as a different type
    pub fn get_duration(&self, key: &str) -> Result<Duration, ConfigError> {
        self.get(key)
    }

    /// List of strings at `key`
    ///
    /// # Errors
    /// * `ConfigError::TypeMismatch` - If `key` is already cached as a different type
    pub fn get_string_slice(&self, key: &str) -> Result<Vec<String>, ConfigError> {
        self.get(key)
    }

    /// Creates an independent store bound to `file_name` in the same directory
    ///
    /// The loaded file is deep-copied before being re-pointed and re-read, so
    /// nothing done to the clone reaches this store's parsed tree. If the new
    /// file cannot be read the failure is logged and the clone keeps the
    /// copied contents. The clone shares the cache namespace, change gate and
    /// write guard, and is not watching its file until told to.
    #[instrument(skip(self))]
    pub fn clone_with_file(&self, file_name: &str) -> Self {
        let mut source = self.read_source().clone();
        source.set_config_name(file_name);

        if let Err(e) = source.read_file() {
            error!(error = %e, "failed to load cloned configuration, keeping copied contents");
        }

        Self::from_source(
            source,
            Arc::clone(&self.container),
            Arc::clone(&self.gate),
            Arc::clone(&self.write_guard),
        )
    }

    /// Evicts every cached configuration value
    ///
    /// Returns the number of entries removed.
    pub fn clear_cache(&self) -> usize {
        let evicted = self.container.fuzzy_delete(CONFIG_KEY_PREFIX);
        debug!(evicted, "configuration cache cleared");
        evicted
    }

    /// Whether `key` currently has a cached value
    pub fn is_cached(&self, key: &str) -> bool {
        self.container.key_exists(&cache_key(key))
    }

    /// File name (without extension) this store reads
    pub fn config_name(&self) -> String {
        self.read_source().config_name().to_string()
    }

    /// Path of the loaded configuration file
    pub fn config_file(&self) -> Option<PathBuf> {
        self.read_source().config_file().map(PathBuf::from)
    }

    /// The change gate guarding this store's invalidations
    pub fn gate(&self) -> &Arc<ChangeGate> {
        &self.gate
    }

    fn cached(&self, key: &str) -> Option<CachedValue> {
        self.container.get(&cache_key(key))
    }

    /// Stores `value` under `key` unless another caller got there first
    fn cache(&self, key: &str, value: CachedValue) -> bool {
        let _guard = self
            .write_guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let entry_key = cache_key(key);
        if self.container.key_exists(&entry_key) {
            trace!(key, "value cached concurrently");
            return true;
        }

        self.container.set(entry_key, value)
    }

    pub(super) fn read_source(&self) -> RwLockReadGuard<'_, YamlSource> {
        self.source.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn write_source(&self) -> RwLockWriteGuard<'_, YamlSource> {
        self.source.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn cache_key(key: &str) -> String {
    format!("{CONFIG_KEY_PREFIX}{key}")
}

/// Loads the named configuration file, terminating the process on failure
///
/// This is the start-up entry point: a process cannot run without its
/// configuration, so any load error is logged and the process exits with
/// status 1. Use [`ConfigStore::load`] to handle the error instead.
pub fn create_config(file_name: Option<&str>) -> ConfigStore {
    match ConfigStore::load(file_name) {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "configuration initialisation failed");
            eprintln!("{e}");
            process::exit(1);
        }
    }
}

/// Builder for [`ConfigStore`] with injectable collaborators.
///
/// Anything left unset falls back to the process-wide default: the
/// configuration directory from [`ConfigPaths`], the `config` file name,
/// [`shared_container`] and [`ChangeGate::global`].
#[derive(Default)]
pub struct ConfigStoreBuilder {
    config_dir: Option<PathBuf>,
    file_name: Option<String>,
    container: Option<Arc<ConfigContainer>>,
    gate: Option<Arc<ChangeGate>>,
}

impl ConfigStoreBuilder {
    /// Directory to load the file from
    pub fn config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    /// File name without extension
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Container to cache values in
    pub fn container(mut self, container: Arc<ConfigContainer>) -> Self {
        self.container = Some(container);
        self
    }

    /// Gate to debounce change notifications with
    pub fn gate(mut self, gate: Arc<ChangeGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Shorthand for a private gate with the given window
    pub fn debounce_window(self, window: Duration) -> Self {
        self.gate(Arc::new(ChangeGate::with_window(window)))
    }

    /// Reads the configuration file and creates the store
    ///
    /// # Errors
    /// * `ConfigError::ConfigDirError` - If no directory was given and the default cannot be determined
    /// * `ConfigError::InitialLoad` - If the file cannot be found, read or parsed
    pub fn build(self) -> Result<ConfigStore, ConfigError> {
        let config_dir = match self.config_dir {
            Some(dir) => dir,
            None => ConfigPaths::config_dir().map_err(|e| ConfigError::ConfigDirError {
                details: e.to_string(),
            })?,
        };
        let name = self
            .file_name
            .unwrap_or_else(|| DEFAULT_CONFIG_NAME.to_string());

        let mut source = YamlSource::new(config_dir, name.clone());
        source
            .read_file()
            .map_err(|source| ConfigError::InitialLoad { name, source })?;

        info!(
            path = ?source.config_file(),
            "configuration loaded"
        );

        Ok(ConfigStore::from_source(
            source,
            self.container.unwrap_or_else(shared_container),
            self.gate.unwrap_or_else(ChangeGate::global),
            Arc::new(Mutex::new(())),
        ))
    }
}
