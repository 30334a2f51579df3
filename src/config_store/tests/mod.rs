//! Unit tests for config_store module
//! Every store gets its own container and gate; time is passed explicitly.

#![allow(clippy::unwrap_used, clippy::panic)]


use std::{
    fs,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use futures::StreamExt;
use serde_yaml::Value;
use tempfile::TempDir;

use crate::config_store::{
    CachedValue, ChangeGate, ConfigContainer, ConfigError, ConfigStore, ValueKind,
};
use crate::source::{FileEvent, FileEventKind};

const SERVER_CONFIG: &str = r#"
server:
  port: 8080
  name: "svc"
  timeout: 30s
  ratio: 0.75
  hosts: [alpha, beta]
  debug: true
"#;

struct Fixture {
    dir: TempDir,
    store: ConfigStore,
    container: Arc<ConfigContainer>,
    start: Instant,
}

impl Fixture {
    fn new(content: &str) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.yaml"), content).unwrap();

        let container = Arc::new(ConfigContainer::new());
        let start = Instant::now();
        let store = ConfigStore::builder()
            .config_dir(dir.path())
            .container(Arc::clone(&container))
            .gate(Arc::new(ChangeGate::starting_at(Duration::from_secs(1), start)))
            .build()
            .unwrap();

        Self {
            dir,
            store,
            container,
            start,
        }
    }

    fn write_file(&self, name: &str, content: &str) {
        fs::write(self.dir.path().join(name), content).unwrap();
    }

    fn event(&self, kind: FileEventKind) -> FileEvent {
        FileEvent {
            path: self.dir.path().join("config.yaml"),
            kind,
        }
    }

    fn at(&self, millis: u64) -> Instant {
        self.start + Duration::from_millis(millis)
    }
}

#[test]
fn serves_typed_values() {
    let fixture = Fixture::new(SERVER_CONFIG);
    let store = &fixture.store;

    assert_eq!(store.get_int("server.port").unwrap(), 8080);
    assert_eq!(store.get_string("server.name").unwrap(), "svc");
    assert_eq!(
        store.get_duration("server.timeout").unwrap(),
        Duration::from_secs(30)
    );
    assert_eq!(store.get_float64("server.ratio").unwrap(), 0.75);
    assert_eq!(
        store.get_string_slice("server.hosts").unwrap(),
        vec!["alpha", "beta"]
    );
    assert!(store.get_bool("server.debug").unwrap());
}

#[test]
fn distinct_integer_widths_are_distinct_kinds() {
    let fixture = Fixture::new("limits: {small: 7, big: 9000000000, plain: 3}");
    let store = &fixture.store;

    assert_eq!(store.get_int32("limits.small").unwrap(), 7);
    assert_eq!(store.get_int64("limits.big").unwrap(), 9_000_000_000);
    assert_eq!(store.get_int("limits.plain").unwrap(), 3);

    let err = store.get_int64("limits.small").unwrap_err();
    assert!(matches!(
        err,
        ConfigError::TypeMismatch {
            expected: ValueKind::Int64,
            found: ValueKind::Int32,
            ..
        }
    ));
}

#[test]
fn requesting_a_cached_key_as_another_type_is_a_mismatch() {
    let fixture = Fixture::new(SERVER_CONFIG);
    let store = &fixture.store;

    assert_eq!(store.get_int("server.port").unwrap(), 8080);

    match store.get_bool("server.port") {
        Err(ConfigError::TypeMismatch {
            key,
            expected,
            found,
        }) => {
            assert_eq!(key, "server.port");
            assert_eq!(expected, ValueKind::Bool);
            assert_eq!(found, ValueKind::Int);
        }
        other => panic!("expected type mismatch, got {other:?}"),
    }

    assert_eq!(store.get_int("server.port").unwrap(), 8080);
}

#[test]
fn raw_values_pass_through() {
    let fixture = Fixture::new(SERVER_CONFIG);

    let server = fixture.store.get_raw("server").unwrap();
    assert!(server.is_mapping());
    assert_eq!(fixture.store.get_raw("server.missing").unwrap(), Value::Null);
}

#[test]
fn missing_keys_yield_zero_values() {
    let fixture = Fixture::new(SERVER_CONFIG);
    let store = &fixture.store;

    assert_eq!(store.get_string("absent.string").unwrap(), "");
    assert!(!store.get_bool("absent.bool").unwrap());
    assert_eq!(store.get_int64("absent.int").unwrap(), 0);
    assert_eq!(store.get_duration("absent.duration").unwrap(), Duration::ZERO);
    assert!(store.get_string_slice("absent.list").unwrap().is_empty());
    assert!(store.is_cached("absent.string"));
}

#[test]
fn cached_reads_ignore_file_until_invalidated() {
    let fixture = Fixture::new("name: before");
    let store = &fixture.store;

    assert_eq!(store.get_string("name").unwrap(), "before");

    fixture.write_file("config.yaml", "name: after");
    store.write_source().read_file().unwrap();

    assert_eq!(store.get_string("name").unwrap(), "before");
    assert_eq!(store.get_string("name").unwrap(), "before");

    assert_eq!(store.clear_cache(), 1);
    assert_eq!(store.get_string("name").unwrap(), "after");
}

#[test]
fn cache_entries_live_under_the_config_prefix() {
    let fixture = Fixture::new(SERVER_CONFIG);
    fixture.container.set("Session_token", CachedValue::Bool(true));

    fixture.store.get_int("server.port").unwrap();

    assert!(fixture.container.key_exists("Config_server.port"));
    assert_eq!(fixture.store.clear_cache(), 1);
    assert!(fixture.container.key_exists("Session_token"));
}

#[test]
fn write_event_invalidates_cache() {
    let fixture = Fixture::new("name: before");
    let store = &fixture.store;
    assert_eq!(store.get_string("name").unwrap(), "before");

    fixture.write_file("config.yaml", "name: after");
    let reload = store
        .handle_file_event(&fixture.event(FileEventKind::Write), fixture.at(2_000))
        .unwrap();

    assert_eq!(reload.evicted, 1);
    assert_eq!(reload.path, fixture.dir.path().join("config.yaml"));
    assert_eq!(store.get_string("name").unwrap(), "after");
}

#[test]
fn duplicate_notifications_evict_once() {
    let fixture = Fixture::new("name: before");
    let store = &fixture.store;
    store.get_string("name").unwrap();

    fixture.write_file("config.yaml", "name: after");
    let first = store.handle_file_event(&fixture.event(FileEventKind::Write), fixture.at(2_000));
    assert!(first.is_some());

    assert_eq!(store.get_string("name").unwrap(), "after");

    let echo = store.handle_file_event(&fixture.event(FileEventKind::Write), fixture.at(2_300));
    assert!(echo.is_none());
    assert!(store.is_cached("name"));

    let next = store.handle_file_event(&fixture.event(FileEventKind::Write), fixture.at(3_000));
    assert!(next.is_some());
    assert!(!store.is_cached("name"));
}

#[test]
fn notifications_inside_initial_window_are_suppressed() {
    let fixture = Fixture::new("name: before");
    fixture.store.get_string("name").unwrap();

    let early = fixture
        .store
        .handle_file_event(&fixture.event(FileEventKind::Write), fixture.at(500));

    assert!(early.is_none());
    assert!(fixture.store.is_cached("name"));
}

#[test]
fn non_write_events_never_invalidate() {
    let fixture = Fixture::new("name: before");
    let store = &fixture.store;
    store.get_string("name").unwrap();

    for kind in [
        FileEventKind::Create,
        FileEventKind::Remove,
        FileEventKind::Rename,
        FileEventKind::Chmod,
    ] {
        assert!(store.handle_file_event(&fixture.event(kind), fixture.at(2_000)).is_none());
    }
    assert!(store.is_cached("name"));

    let write = store.handle_file_event(&fixture.event(FileEventKind::Write), fixture.at(2_100));
    assert!(write.is_some());
}

#[test]
fn create_event_reloads_source_without_evicting() {
    let fixture = Fixture::new("name: before");
    let store = &fixture.store;
    store.get_string("name").unwrap();

    fixture.write_file("config.yaml", "name: after\nextra: 1");
    store.handle_file_event(&fixture.event(FileEventKind::Create), fixture.at(2_000));

    assert_eq!(store.get_string("name").unwrap(), "before");
    assert_eq!(store.get_int("extra").unwrap(), 1);
}

#[test]
fn clone_does_not_touch_parent_tree() {
    let fixture = Fixture::new("name: parent\nonly_parent: yes-parent");
    fixture.write_file("other.yaml", "name: child\nonly_child: yes-child");
    let parent = &fixture.store;

    let child = parent.clone_with_file("other");
    assert_eq!(child.config_name(), "other");
    assert_eq!(child.config_file(), Some(fixture.dir.path().join("other.yaml")));

    assert_eq!(child.get_string("only_child").unwrap(), "yes-child");
    assert_eq!(parent.get_string("only_parent").unwrap(), "yes-parent");

    fixture.write_file("other.yaml", "name: child-v2");
    child.write_source().read_file().unwrap();
    parent.clear_cache();

    assert_eq!(parent.get_string("name").unwrap(), "parent");
    assert_eq!(parent.get_string("only_child").unwrap(), "");
}

#[test]
fn clones_share_the_cache_namespace() {
    let fixture = Fixture::new("name: parent");
    fixture.write_file("other.yaml", "name: child");

    let child = fixture.store.clone_with_file("other");

    assert_eq!(fixture.store.get_string("name").unwrap(), "parent");
    assert_eq!(child.get_string("name").unwrap(), "parent");

    child.clear_cache();
    assert_eq!(child.get_string("name").unwrap(), "child");
    assert_eq!(fixture.store.get_string("name").unwrap(), "child");
}

#[test]
fn clone_of_missing_file_keeps_copied_contents() {
    let fixture = Fixture::new("name: parent");

    let child = fixture.store.clone_with_file("does-not-exist");

    assert_eq!(child.config_name(), "does-not-exist");
    assert_eq!(child.config_file(), None);
    assert_eq!(child.get_string("name").unwrap(), "parent");
}

#[test]
fn concurrent_misses_populate_each_key_once() {
    let fixture = Fixture::new("a: first\nb: second");

    thread::scope(|scope| {
        for i in 0..32 {
            let store = fixture.store.clone();
            scope.spawn(move || {
                let key = if i % 2 == 0 { "a" } else { "b" };
                let expected = if i % 2 == 0 { "first" } else { "second" };
                for _ in 0..50 {
                    assert_eq!(store.get_string(key).unwrap(), expected);
                }
            });
        }
    });

    assert_eq!(fixture.container.len(), 2);
}

#[test]
fn initial_load_failure_is_an_error() {
    let dir = TempDir::new().unwrap();

    let result = ConfigStore::builder()
        .config_dir(dir.path())
        .file_name("missing")
        .container(Arc::new(ConfigContainer::new()))
        .build();

    assert!(matches!(result, Err(ConfigError::InitialLoad { ref name, .. }) if name == "missing"));
}

#[tokio::test]
async fn subscribers_receive_invalidations() {
    let fixture = Fixture::new("name: before");
    let mut reloads = Box::pin(fixture.store.subscribe());

    fixture.store.get_string("name").unwrap();
    fixture
        .store
        .handle_file_event(&fixture.event(FileEventKind::Write), fixture.at(1_500));

    let reload = reloads.next().await.unwrap();
    assert_eq!(reload.evicted, 1);
    assert_eq!(reload.timestamp, fixture.at(1_500));
}

#[tokio::test]
async fn start_watching_is_idempotent() {
    let fixture = Fixture::new("name: before");

    fixture.store.start_watching().await.unwrap();
    fixture.store.start_watching().await.unwrap();

    assert!(fixture.store.is_watching());
    assert!(fixture.store.clone().is_watching());
    assert!(!fixture.store.clone_with_file("config").is_watching());
}

#[tokio::test]
async fn watching_an_unloaded_clone_fails() {
    let fixture = Fixture::new("name: before");
    let child = fixture.store.clone_with_file("missing");

    let err = child.start_watching().await.unwrap_err();

    assert!(matches!(err, ConfigError::FileWatchError { .. }));
    assert!(!child.is_watching());
}
