use serde_yaml::{Mapping, Value};

/// Separator between segments of a dotted key
pub(crate) const KEY_DELIMITER: char = '.';

/// Navigates through a YAML value structure following a dot-separated path
///
/// Mapping keys are matched case-insensitively, preferring an exact match.
/// Numeric segments index into sequences.
///
/// # Arguments
/// * `value` - The root YAML value to navigate from
/// * `path` - Dot-separated path (e.g., "server.port" or "hosts.0.name")
///
/// Returns `None` when any segment is missing; an absent key is not an error.
pub(crate) fn navigate_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }

    let mut current = value;

    for part in path.split(KEY_DELIMITER) {
        current = match untag(current) {
            Value::Mapping(mapping) => lookup_key(mapping, part)?,
            Value::Sequence(sequence) => sequence.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(untag(current))
}

/// Finds `key` in a mapping, first exactly and then ignoring ASCII case
fn lookup_key<'a>(mapping: &'a Mapping, key: &str) -> Option<&'a Value> {
    if let Some(found) = mapping.get(key) {
        return Some(found);
    }

    mapping
        .iter()
        .find(|(candidate, _)| {
            key_text(candidate).is_some_and(|text| text.eq_ignore_ascii_case(key))
        })
        .map(|(_, value)| value)
}

/// Mapping keys may be scalars other than strings (`8080: web`)
fn key_text(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Strips YAML tags (`!custom value`) so lookups see the tagged value
pub(crate) fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}
