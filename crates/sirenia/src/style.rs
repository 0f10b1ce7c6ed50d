use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Display options handed to a rendering surface (`fill`, `alpha`, `stroke`, ...).
///
/// A style is a JSON object so hosts can forward whatever their backend understands. Styles never
/// influence geometry; merging one never invalidates a computed layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Style(Map<String, Value>);

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Builds a style from a JSON value; anything other than an object yields an empty style.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key)?.as_f64()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key)?.as_str()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Non-destructive merge: keys from `other` win, nested objects are merged recursively and
    /// keys only present in `self` are kept.
    pub fn merge(&mut self, other: &Style) {
        for (key, in_value) in &other.0 {
            match self.0.get_mut(key) {
                Some(base_value) => deep_merge_value(base_value, in_value),
                None => {
                    self.0.insert(key.clone(), in_value.clone());
                }
            }
        }
    }

    /// `self` merged with `other`, leaving both untouched.
    pub fn merged(&self, other: &Style) -> Style {
        let mut out = self.clone();
        out.merge(other);
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<Map<String, Value>> for Style {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Style {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}
