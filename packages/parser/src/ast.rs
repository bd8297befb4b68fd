use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Ordered key/value mapping backing every object node.
///
/// Key order is preserved for serialization; equality is key-order-insensitive,
/// which is exactly what the round-trip law requires.
pub type ConfigMap = IndexMap<String, ConfigValue>;

/// Dialect-neutral chart configuration tree.
///
/// A configuration is a plain data value: mappings, sequences and scalars.
/// Unknown keys travel through every transform untouched so a document written
/// by a newer upstream generator survives editing.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Mapping(ConfigMap),
    Sequence(Vec<ConfigValue>),
    Scalar(Scalar),
}

/// Leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Str(String),
    Num(f64),
    Bool(bool),
    Null,
}

impl ConfigValue {
    pub fn empty_mapping() -> Self {
        Self::Mapping(ConfigMap::new())
    }

    pub fn null() -> Self {
        Self::Scalar(Scalar::Null)
    }

    pub fn as_mapping(&self) -> Option<&ConfigMap> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut ConfigMap> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Vec<ConfigValue>> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut Vec<ConfigValue>> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Scalar(Scalar::Num(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Scalar(Scalar::Null))
    }

    /// Child lookup on a mapping; `None` for every other shape.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.as_mapping()?.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ConfigValue> {
        self.as_mapping_mut()?.get_mut(key)
    }

    /// Nested lookup, e.g. `config.get_path(&["options", "plugins", "legend"])`.
    pub fn get_path(&self, path: &[&str]) -> Option<&ConfigValue> {
        path.iter().try_fold(self, |value, key| value.get(key))
    }

    /// Inserts on a mapping; returns false (and does nothing) otherwise.
    pub fn set(&mut self, key: &str, value: ConfigValue) -> bool {
        match self.as_mapping_mut() {
            Some(map) => {
                map.insert(key.to_string(), value);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        self.as_mapping_mut()?.shift_remove(key)
    }

    /// Child mapping under `key`, created (or replacing a non-mapping value)
    /// on demand. `None` when `self` is not a mapping.
    pub fn ensure_mapping(&mut self, key: &str) -> Option<&mut ConfigValue> {
        let map = self.as_mapping_mut()?;
        let entry = map
            .entry(key.to_string())
            .or_insert_with(ConfigValue::empty_mapping);
        if entry.as_mapping().is_none() {
            *entry = ConfigValue::empty_mapping();
        }
        Some(entry)
    }

    /// The series container: `series` for the ECharts shape, `data.datasets`
    /// for the Chart.js shape.
    pub fn series_entries(&self) -> Option<&Vec<ConfigValue>> {
        if let Some(series) = self.get("series") {
            return series.as_sequence();
        }
        self.get("data")?.get("datasets")?.as_sequence()
    }

    pub fn series_entries_mut(&mut self) -> Option<&mut Vec<ConfigValue>> {
        if self.get("series").is_some() {
            return self.get_mut("series")?.as_sequence_mut();
        }
        self.get_mut("data")?.get_mut("datasets")?.as_sequence_mut()
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Scalar(Scalar::Str(value.to_string()))
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::Scalar(Scalar::Str(value))
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        Self::Scalar(Scalar::Num(value))
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Scalar(Scalar::Null),
            serde_json::Value::Bool(b) => Self::Scalar(Scalar::Bool(b)),
            serde_json::Value::Number(n) => {
                Self::Scalar(Scalar::Num(n.as_f64().unwrap_or(f64::NAN)))
            }
            serde_json::Value::String(s) => Self::Scalar(Scalar::Str(s)),
            serde_json::Value::Array(items) => {
                Self::Sequence(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Mapping(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Mapping(map) => {
                let mut state = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    state.serialize_entry(key, value)?;
                }
                state.end()
            }
            Self::Sequence(items) => {
                let mut state = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    state.serialize_element(item)?;
                }
                state.end()
            }
            Self::Scalar(Scalar::Str(s)) => serializer.serialize_str(s),
            Self::Scalar(Scalar::Num(n)) => serializer.serialize_f64(*n),
            Self::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
            Self::Scalar(Scalar::Null) => serializer.serialize_unit(),
        }
    }
}
