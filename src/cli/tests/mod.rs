//! Unit tests for CLI module
//!
//! Tests value formatting and argument parsing.
//! No filesystem or actual command execution.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::time::Duration;

use clap::Parser;
use serde_yaml::Value;

use crate::cli::{
    Cli, Commands, ValueType,
    formatting::{format_value, format_yaml_value},
};
use crate::config_store::{CachedValue, ValueKind};

#[test]
fn format_typed_values() {
    assert_eq!(format_value(&CachedValue::String("svc".to_string())), "\"svc\"");
    assert_eq!(format_value(&CachedValue::Bool(false)), "false");
    assert_eq!(format_value(&CachedValue::Int64(-12)), "-12");
    assert_eq!(format_value(&CachedValue::Float64(2.5)), "2.5");
    assert_eq!(
        format_value(&CachedValue::Duration(Duration::from_millis(1500))),
        "1.5s"
    );
    assert_eq!(
        format_value(&CachedValue::StringSlice(vec![
            "a".to_string(),
            "b".to_string()
        ])),
        "[a, b]"
    );
}

#[test]
fn format_yaml_collections_by_size() {
    let value: Value = serde_yaml::from_str("{a: 1, b: [1, 2, 3]}").unwrap();
    assert_eq!(format_yaml_value(&value), "{2}");

    let value: Value = serde_yaml::from_str("[1, 2, 3]").unwrap();
    assert_eq!(format_yaml_value(&value), "[3]");

    assert_eq!(format_yaml_value(&Value::Null), "null");
}

#[test]
fn value_types_map_to_kinds() {
    assert_eq!(ValueKind::from(ValueType::Raw), ValueKind::Raw);
    assert_eq!(ValueKind::from(ValueType::Int32), ValueKind::Int32);
    assert_eq!(ValueKind::from(ValueType::StringSlice), ValueKind::StringSlice);
}

#[test]
fn parses_get_command() {
    let cli = Cli::try_parse_from([
        "yaml-config",
        "--file",
        "database",
        "get",
        "server.port",
        "--as",
        "int",
    ])
    .unwrap();

    assert_eq!(cli.file.as_deref(), Some("database"));
    match cli.command {
        Commands::Get { key, kind, json } => {
            assert_eq!(key, "server.port");
            assert_eq!(kind, ValueType::Int);
            assert!(!json);
        }
        _ => panic!("expected get command"),
    }
}

#[test]
fn get_defaults_to_raw_values() {
    let cli = Cli::try_parse_from(["yaml-config", "get", "server"]).unwrap();

    assert!(matches!(
        cli.command,
        Commands::Get {
            kind: ValueType::Raw,
            ..
        }
    ));
}

#[test]
fn rejects_unknown_value_types() {
    assert!(Cli::try_parse_from(["yaml-config", "get", "a", "--as", "uuid"]).is_err());
}
