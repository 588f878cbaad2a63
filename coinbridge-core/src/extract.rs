//! Null-tolerant readers for heterogeneous venue payloads.
//!
//! Venue JSON is inconsistently populated across fields, market states and
//! API versions: the same field may arrive as a string, a number, `null`,
//! an empty string, or not at all. These helpers read a value if it is
//! present and coercible and return `None` otherwise. They never panic
//! and never error, so a single malformed trade cannot abort a whole
//! batch parse. All "might be missing, might be a different type"
//! handling belongs here, at the boundary, not in business logic.
//!
//! The `_2`/`_n` variants try candidate keys in order and return the
//! first present, non-null value; venues love renaming fields between
//! endpoint generations.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

/// Reads a string field; numbers are stringified, empty strings are absent.
pub fn safe_string(data: &Value, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First present value among two candidate keys, as a string.
pub fn safe_string_2(data: &Value, key1: &str, key2: &str) -> Option<String> {
    safe_string(data, key1).or_else(|| safe_string(data, key2))
}

/// First present value among any number of candidate keys, as a string.
pub fn safe_string_n(data: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| safe_string(data, key))
}

/// Reads a string field lowercased.
pub fn safe_string_lower(data: &Value, key: &str) -> Option<String> {
    safe_string(data, key).map(|s| s.to_lowercase())
}

/// Reads a string field uppercased.
pub fn safe_string_upper(data: &Value, key: &str) -> Option<String> {
    safe_string(data, key).map(|s| s.to_uppercase())
}

/// Reads a decimal field from either string or number form.
///
/// Empty strings are treated as absent; unparseable values are dropped
/// rather than propagated as errors.
pub fn safe_decimal(data: &Value, key: &str) -> Option<Decimal> {
    match data.get(key)? {
        Value::String(s) if !s.is_empty() => Decimal::from_str(s.trim()).ok(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else {
                n.as_f64().and_then(Decimal::from_f64)
            }
        }
        _ => None,
    }
}

/// First present decimal among two candidate keys.
pub fn safe_decimal_2(data: &Value, key1: &str, key2: &str) -> Option<Decimal> {
    safe_decimal(data, key1).or_else(|| safe_decimal(data, key2))
}

/// First present decimal among any number of candidate keys.
pub fn safe_decimal_n(data: &Value, keys: &[&str]) -> Option<Decimal> {
    keys.iter().find_map(|key| safe_decimal(data, key))
}

/// Reads an integer field from either number or string form.
pub fn safe_integer(data: &Value, key: &str) -> Option<i64> {
    match data.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) if !s.is_empty() => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// First present integer among two candidate keys.
pub fn safe_integer_2(data: &Value, key1: &str, key2: &str) -> Option<i64> {
    safe_integer(data, key1).or_else(|| safe_integer(data, key2))
}

/// First present integer among any number of candidate keys.
pub fn safe_integer_n(data: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|key| safe_integer(data, key))
}

/// Reads a boolean field; `"true"`/`"false"` strings coerce.
pub fn safe_bool(data: &Value, key: &str) -> Option<bool> {
    match data.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "true" | "True" | "TRUE" => Some(true),
            "false" | "False" | "FALSE" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Reads a nested object field.
pub fn safe_dict<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
    let value = data.get(key)?;
    value.is_object().then_some(value)
}

/// Reads a nested array field.
pub fn safe_list<'a>(data: &'a Value, key: &str) -> Option<&'a [Value]> {
    data.get(key)?.as_array().map(Vec::as_slice)
}

/// Reads any non-null field verbatim.
pub fn safe_value<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
    let value = data.get(key)?;
    (!value.is_null()).then_some(value)
}

/// Reads a seconds-resolution timestamp field and scales it to
/// milliseconds.
pub fn safe_timestamp(data: &Value, key: &str) -> Option<i64> {
    safe_integer(data, key).map(|secs| secs * 1000)
}

/// Copies a JSON object into the `info` map canonical structures carry.
///
/// Non-object values produce an empty map; the raw payload is still
/// recoverable from the response envelope in that case.
pub fn value_to_hashmap(data: &Value) -> HashMap<String, Value> {
    data.as_object()
        .map(|obj| obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_safe_string_forms() {
        let data = json!({"a": "x", "b": 42, "c": "", "d": null});
        assert_eq!(safe_string(&data, "a"), Some("x".to_string()));
        assert_eq!(safe_string(&data, "b"), Some("42".to_string()));
        assert_eq!(safe_string(&data, "c"), None);
        assert_eq!(safe_string(&data, "d"), None);
        assert_eq!(safe_string(&data, "missing"), None);
    }

    #[test]
    fn test_safe_string_multi_key_order() {
        let data = json!({"second": "2", "first": "1"});
        assert_eq!(
            safe_string_2(&data, "first", "second"),
            Some("1".to_string())
        );
        assert_eq!(
            safe_string_n(&data, &["absent", "second", "first"]),
            Some("2".to_string())
        );
    }

    #[test]
    fn test_safe_decimal_forms() {
        let data = json!({"s": "123.45", "n": 123.45, "i": 7, "empty": "", "junk": "abc"});
        assert_eq!(safe_decimal(&data, "s").unwrap().to_string(), "123.45");
        assert!(safe_decimal(&data, "n").is_some());
        assert_eq!(safe_decimal(&data, "i").unwrap().to_string(), "7");
        assert_eq!(safe_decimal(&data, "empty"), None);
        assert_eq!(safe_decimal(&data, "junk"), None);
    }

    #[test]
    fn test_safe_integer_forms() {
        let data = json!({"n": 1721685896846i64, "s": "1721685896846", "f": 1.5});
        assert_eq!(safe_integer(&data, "n"), Some(1721685896846));
        assert_eq!(safe_integer(&data, "s"), Some(1721685896846));
        assert_eq!(safe_integer(&data, "f"), None);
    }

    #[test]
    fn test_safe_bool() {
        let data = json!({"t": true, "s": "true", "x": "yes"});
        assert_eq!(safe_bool(&data, "t"), Some(true));
        assert_eq!(safe_bool(&data, "s"), Some(true));
        assert_eq!(safe_bool(&data, "x"), None);
    }

    #[test]
    fn test_safe_containers() {
        let data = json!({"d": {"k": 1}, "l": [1, 2], "s": "x"});
        assert!(safe_dict(&data, "d").is_some());
        assert!(safe_dict(&data, "l").is_none());
        assert_eq!(safe_list(&data, "l").unwrap().len(), 2);
        assert!(safe_list(&data, "s").is_none());
    }

    #[test]
    fn test_wrong_shaped_container_never_panics() {
        let list = json!([1, 2, 3]);
        assert_eq!(safe_string(&list, "anything"), None);
        let scalar = json!(42);
        assert_eq!(safe_decimal(&scalar, "anything"), None);
    }

    #[test]
    fn test_safe_timestamp_scales() {
        let data = json!({"ts": 1721685896});
        assert_eq!(safe_timestamp(&data, "ts"), Some(1721685896000));
    }

    #[test]
    fn test_value_to_hashmap() {
        let data = json!({"a": 1, "b": "two"});
        let map = value_to_hashmap(&data);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("b"), Some(&json!("two")));
        assert!(value_to_hashmap(&json!([1])).is_empty());
    }
}
