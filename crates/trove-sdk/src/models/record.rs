//! Typed record wrapper with raw-JSON fallback.
//!
//! Trove records carry far more fields than any typed model can keep up
//! with, and the set changes with `reclevel` and `include`. [`Record`] keeps
//! the typed view for the fields the SDK knows about and the raw JSON for
//! everything else.

use std::ops::{Deref, Index};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A typed record plus the JSON it was decoded from.
#[derive(Debug, Clone)]
pub struct Record<T> {
    typed: T,
    raw: Value,
}

impl<T: DeserializeOwned> Record<T> {
    /// Decode a record from raw JSON, keeping the JSON.
    ///
    /// # Errors
    ///
    /// Returns error if the typed view cannot be decoded.
    pub fn from_value(raw: Value) -> Result<Self, serde_json::Error> {
        let typed = T::deserialize(&raw)?;
        Ok(Self { typed, raw })
    }
}

impl<T> Record<T> {
    /// Typed view.
    #[must_use]
    pub const fn typed(&self) -> &T {
        &self.typed
    }

    /// Raw JSON as returned by the API.
    #[must_use]
    pub const fn raw(&self) -> &Value {
        &self.raw
    }

    /// Consume the wrapper, keeping only the raw JSON.
    #[must_use]
    pub fn into_raw(self) -> Value {
        self.raw
    }

    /// Consume the wrapper, keeping only the typed view.
    #[must_use]
    pub fn into_typed(self) -> T {
        self.typed
    }

    /// Look up a top-level field by its API name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    /// Look up a top-level string field.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.raw.get(key).and_then(Value::as_str)
    }

    /// Look up a nested field with a dotted path (`title.id`, `identifier.0.value`).
    ///
    /// Numeric segments index into arrays.
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        path.split('.').filter(|s| !s.is_empty()).try_fold(&self.raw, |value, segment| {
            match value {
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                Value::Object(map) => map.get(segment),
                _ => None,
            }
        })
    }

    /// Whether the API returned this field at all.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.raw.get(key).is_some()
    }

    /// Field names present in the raw record.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.raw.as_object().into_iter().flat_map(|m| m.keys().map(String::as_str))
    }
}

impl<T> Deref for Record<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.typed
    }
}

impl<T> Index<&str> for Record<T> {
    type Output = Value;

    /// Missing keys yield `Value::Null`, matching `serde_json::Value` indexing.
    fn index(&self, key: &str) -> &Self::Output {
        &self.raw[key]
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Record<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Self::from_value(raw).map_err(serde::de::Error::custom)
    }
}

impl<T> Serialize for Record<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.raw.serialize(serializer)
    }
}
