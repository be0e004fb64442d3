//! The dynamic JSON value shared by the parser, serializer, decoder and encoder.
//!
//! Numbers collapse to a single `f64` case: the parser does not distinguish
//! `1` from `1.0`. Objects keep their keys in insertion order using a plain
//! `Vec<(String, Value)>`, which avoids a hashing dependency and keeps small
//! objects compact. Lookups are linear; objects on the targets this crate
//! is meant for hold a handful of keys.

use crate::error::{EncodeError, EncodeResult};

/// Any JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(f64),
    Bool(bool),
    Array(Vec<Value>),
    Object(Map),
    Null,
}

impl Value {
    /// The tag name reported in type-mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Null => "null",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Merge `incoming` into `self`.
    ///
    /// - a non-object `incoming` replaces `self`;
    /// - a non-object `self` is replaced by an object `incoming`;
    /// - two objects merge key by key, recursing where both sides hold an
    ///   object. Keys present only in `self` are kept.
    pub fn merge(&mut self, incoming: Value) {
        match (self, incoming) {
            (Value::Object(current), Value::Object(incoming)) => current.merge(incoming),
            (slot, incoming) => *slot = incoming,
        }
    }

    /// Like [`merge`](Self::merge), but refuses to replace an object with a
    /// non-object or a non-object with an object.
    ///
    /// The whole incoming tree is checked before anything is written, so on
    /// error `self` is unchanged.
    pub fn merge_strict(&mut self, incoming: Value) -> EncodeResult<()> {
        check_strict(self, &incoming, &mut Vec::new())?;
        self.merge(incoming);
        Ok(())
    }
}

/// Walk the positions `incoming` would write to and report the first one
/// where an object and a non-object meet.
fn check_strict<'a>(
    current: &'a Value,
    incoming: &'a Value,
    path: &mut Vec<&'a str>,
) -> EncodeResult<()> {
    match (current, incoming) {
        (Value::Object(current), Value::Object(incoming)) => {
            for (key, incoming_value) in incoming.iter() {
                if let Some(existing) = current.get(key) {
                    path.push(key);
                    check_strict(existing, incoming_value, path)?;
                    path.pop();
                }
            }
            Ok(())
        }
        (Value::Object(_), _) | (_, Value::Object(_)) => {
            let location = if path.is_empty() {
                "<root>".to_string()
            } else {
                path.join(".")
            };
            Err(EncodeError::TypeMismatch {
                expected: format!("{} at '{}'", current.type_name(), location),
                found: incoming.type_name().to_string(),
            })
        }
        _ => Ok(()),
    }
}

/// Insertion-ordered string-keyed map with unique keys.
///
/// Equality ignores order: two maps are equal when they hold the same key set
/// with equal values.
#[derive(Debug, Clone, Default)]
pub struct Map {
    entries: Vec<(String, Value)>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert `value` under `key`, returning the previous value if the key was
    /// already present. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Merge another map into this one; see [`Value::merge`].
    pub fn merge(&mut self, incoming: Map) {
        for (key, incoming_value) in incoming.entries {
            match self.get_mut(&key) {
                Some(existing) if existing.is_object() && incoming_value.is_object() => {
                    existing.merge(incoming_value);
                }
                Some(existing) => *existing = incoming_value,
                None => self.entries.push((key, incoming_value)),
            }
        }
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|v| v == value))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl IntoIterator for Map {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Number(f64::from(n))
    }
}

macro_rules! value_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Number(n as f64)
                }
            }
        )*
    };
}

value_from_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}
