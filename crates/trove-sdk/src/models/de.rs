//! Lenient deserializers for the quirks of Trove responses.
//!
//! Trove emits numbers as strings in places, collapses single-element arrays
//! into objects (always in XML, sometimes in JSON), and uses `null` where a
//! list is empty.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept an array, a single item, or null.
pub fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        Some(OneOrMany::Many(items)) => Ok(items),
        Some(OneOrMany::One(item)) => Ok(vec![item]),
        None => Ok(Vec::new()),
    }
}

/// Accept a string, number or boolean as an optional string.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(value_to_string))
}

/// Accept a list of strings, a single string, or null.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.into_iter().filter_map(value_to_string).collect(),
        Some(other) => value_to_string(other).into_iter().collect(),
    })
}

/// Accept an unsigned integer or its string form. Garbage becomes `None`.
pub fn opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    })
}

/// Accept a float or its string form.
pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Accept `true`/`false`, `"y"`/`"n"` and `"true"`/`"false"`.
pub fn opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" | "true" | "1" => Some(true),
            "n" | "no" | "false" | "0" => Some(false),
            _ => None,
        },
        Some(Value::Number(n)) => n.as_u64().map(|n| n != 0),
        _ => None,
    })
}

/// Flatten a scalar (or an XML text node object) to a string.
pub(crate) fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(mut map) => ["value", "name", "title"]
            .into_iter()
            .find_map(|k| map.remove(k))
            .and_then(value_to_string),
        Value::Null | Value::Array(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "super::one_or_many")]
        items: Vec<u32>,
        #[serde(default, deserialize_with = "super::opt_u64")]
        count: Option<u64>,
        #[serde(default, deserialize_with = "super::string_list")]
        names: Vec<String>,
        #[serde(default, deserialize_with = "super::opt_bool")]
        flag: Option<bool>,
    }

    #[test]
    fn test_single_item_becomes_vec() {
        let p: Probe = serde_json::from_value(json!({"items": 7})).unwrap();
        assert_eq!(p.items, vec![7]);
    }

    #[test]
    fn test_null_and_missing_become_empty() {
        let p: Probe = serde_json::from_value(json!({"items": null})).unwrap();
        assert!(p.items.is_empty());
        assert!(p.names.is_empty());
        assert!(p.count.is_none());
    }

    #[test]
    fn test_numbers_as_strings() {
        let p: Probe = serde_json::from_value(json!({"count": "1,204"})).unwrap();
        assert_eq!(p.count, Some(1204));
        let p: Probe = serde_json::from_value(json!({"count": "many"})).unwrap();
        assert_eq!(p.count, None);
    }

    #[test]
    fn test_string_list_accepts_scalar_and_text_nodes() {
        let p: Probe = serde_json::from_value(json!({"names": "Lawson, Henry"})).unwrap();
        assert_eq!(p.names, vec!["Lawson, Henry"]);
        let p: Probe =
            serde_json::from_value(json!({"names": [{"value": "a"}, 2, null]})).unwrap();
        assert_eq!(p.names, vec!["a", "2"]);
    }

    #[test]
    fn test_flag_variants() {
        let p: Probe = serde_json::from_value(json!({"flag": "Y"})).unwrap();
        assert_eq!(p.flag, Some(true));
        let p: Probe = serde_json::from_value(json!({"flag": false})).unwrap();
        assert_eq!(p.flag, Some(false));
    }
}
