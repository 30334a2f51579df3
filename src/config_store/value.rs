use std::{fmt, time::Duration};

use serde::Serialize;
use serde_yaml::Value;

use crate::source::cast;

/// A typed configuration value as stored in the cache.
///
/// Each variant corresponds to one accessor on the store. Reading an entry
/// back through a different accessor than the one that cached it is a type
/// mismatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CachedValue {
    /// Untyped YAML value
    Raw(Value),
    /// String value
    String(String),
    /// Boolean value
    Bool(bool),
    /// Platform-width integer
    Int(isize),
    /// 32-bit integer
    Int32(i32),
    /// 64-bit integer
    Int64(i64),
    /// Floating point value
    Float64(f64),
    /// Time span
    Duration(Duration),
    /// List of strings
    StringSlice(Vec<String>),
}

impl CachedValue {
    /// The kind of value held
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Raw(_) => ValueKind::Raw,
            Self::String(_) => ValueKind::String,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Int32(_) => ValueKind::Int32,
            Self::Int64(_) => ValueKind::Int64,
            Self::Float64(_) => ValueKind::Float64,
            Self::Duration(_) => ValueKind::Duration,
            Self::StringSlice(_) => ValueKind::StringSlice,
        }
    }

    /// Converts a raw lookup result into a value of the given kind
    pub fn from_raw(kind: ValueKind, raw: Option<&Value>) -> Self {
        match kind {
            ValueKind::Raw => Self::Raw(cast::to_raw(raw)),
            ValueKind::String => Self::String(cast::to_string(raw)),
            ValueKind::Bool => Self::Bool(cast::to_bool(raw)),
            ValueKind::Int => Self::Int(cast::to_isize(raw)),
            ValueKind::Int32 => Self::Int32(cast::to_i32(raw)),
            ValueKind::Int64 => Self::Int64(cast::to_i64(raw)),
            ValueKind::Float64 => Self::Float64(cast::to_f64(raw)),
            ValueKind::Duration => Self::Duration(cast::to_duration(raw)),
            ValueKind::StringSlice => Self::StringSlice(cast::to_string_slice(raw)),
        }
    }
}

/// Names the variants of [`CachedValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
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
    /// Time span
    Duration,
    /// List of strings
    StringSlice,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Raw => "raw",
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::Duration => "duration",
            Self::StringSlice => "string slice",
        };
        f.write_str(name)
    }
}

/// A Rust type that can be served from the configuration cache.
pub trait CacheValue: Sized {
    /// The cache variant this type is stored as
    const KIND: ValueKind;

    /// Unwraps a stored value, handing it back unchanged on a kind mismatch
    fn from_cached(cached: CachedValue) -> Result<Self, CachedValue>;
}

macro_rules! cache_value {
    ($ty:ty, $variant:ident) => {
        impl CacheValue for $ty {
            const KIND: ValueKind = ValueKind::$variant;

            fn from_cached(cached: CachedValue) -> Result<Self, CachedValue> {
                match cached {
                    CachedValue::$variant(value) => Ok(value),
                    other => Err(other),
                }
            }
        }
    };
}

cache_value!(Value, Raw);
cache_value!(String, String);
cache_value!(bool, Bool);
cache_value!(isize, Int);
cache_value!(i32, Int32);
cache_value!(i64, Int64);
cache_value!(f64, Float64);
cache_value!(Duration, Duration);
cache_value!(Vec<String>, StringSlice);
