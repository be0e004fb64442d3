//! Builds a JSON object by repeated typed writes at dotted key paths.
//!
//! Each [`Encoder::encode`] call converts its value through [`ToJsonValue`],
//! wraps it in a single-branch chain of objects (one per key path segment),
//! and merges that chain into the root. Because the merge recurses into
//! objects on both sides, writes that share a prefix accumulate:
//!
//! ```
//! use keypath_json::Encoder;
//! let mut encoder = Encoder::new();
//! encoder.encode(1, "sensor.temp").unwrap();
//! encoder.encode(2, "sensor.humidity").unwrap();
//! assert_eq!(encoder.to_json_string(), r#"{"sensor":{"temp":1,"humidity":2}}"#);
//! ```
//!
//! A failed call leaves everything written before it in place.
//!
//! Nesting is capped at [`Encoder::max_depth`] containers (the root object
//! counts as one), matching the parser's default limit, so everything the
//! encoder produces can be parsed back.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use crate::error::{EncodeError, EncodeResult};
use crate::keypath::KeyPath;
use crate::parser::DEFAULT_MAX_DEPTH;
use crate::serializer::{self, FormatOptions};
use crate::value::{Map, Value};
use tracing::debug;

/// Conversion from a Rust value to exactly one [`Value`] tag.
///
/// Implemented for strings, `bool`, every primitive number type, and
/// string-keyed maps. Arrays and null have no mapping and are rejected with
/// [`EncodeError::UnsupportedType`] when they arrive as a [`Value`].
pub trait ToJsonValue {
    fn to_json_value(&self) -> EncodeResult<Value>;
}

impl<T: ToJsonValue + ?Sized> ToJsonValue for &T {
    fn to_json_value(&self) -> EncodeResult<Value> {
        (**self).to_json_value()
    }
}

impl ToJsonValue for str {
    fn to_json_value(&self) -> EncodeResult<Value> {
        Ok(Value::String(self.to_string()))
    }
}

impl ToJsonValue for String {
    fn to_json_value(&self) -> EncodeResult<Value> {
        Ok(Value::String(self.clone()))
    }
}

impl ToJsonValue for bool {
    fn to_json_value(&self) -> EncodeResult<Value> {
        Ok(Value::Bool(*self))
    }
}

fn finite(n: f64) -> EncodeResult<Value> {
    if n.is_finite() {
        Ok(Value::Number(n))
    } else {
        Err(EncodeError::InvalidValue("non-finite number".to_string()))
    }
}

/// Reject NaN and infinities anywhere inside `value`; the serializer would
/// otherwise write them as `null`.
fn ensure_finite(value: &Value) -> EncodeResult<()> {
    match value {
        Value::Number(n) => finite(*n).map(drop),
        Value::Array(items) => items.iter().try_for_each(ensure_finite),
        Value::Object(map) => map.iter().try_for_each(|(_, v)| ensure_finite(v)),
        Value::String(_) | Value::Bool(_) | Value::Null => Ok(()),
    }
}

/// Fail if `value` holds more than `remaining` levels of nested containers.
/// Stops descending at the limit, so arbitrarily deep input is safe to check.
fn ensure_depth(value: &Value, remaining: usize, limit: usize) -> EncodeResult<()> {
    match value {
        Value::Array(_) | Value::Object(_) if remaining == 0 => Err(EncodeError::InvalidValue(
            format!("value nests deeper than {} levels", limit),
        )),
        Value::Array(items) => items
            .iter()
            .try_for_each(|item| ensure_depth(item, remaining - 1, limit)),
        Value::Object(map) => map
            .iter()
            .try_for_each(|(_, v)| ensure_depth(v, remaining - 1, limit)),
        _ => Ok(()),
    }
}

impl ToJsonValue for f64 {
    fn to_json_value(&self) -> EncodeResult<Value> {
        finite(*self)
    }
}

impl ToJsonValue for f32 {
    fn to_json_value(&self) -> EncodeResult<Value> {
        finite(f64::from(*self))
    }
}

macro_rules! to_json_int_lossless {
    ($($t:ty),*) => {
        $(
            impl ToJsonValue for $t {
                fn to_json_value(&self) -> EncodeResult<Value> {
                    Ok(Value::Number(f64::from(*self)))
                }
            }
        )*
    };
}

to_json_int_lossless!(i8, i16, i32, u8, u16, u32);

/// Integers beyond ±2^53 would silently change value once stored as `f64`.
const MAX_EXACT_INT: i128 = 1 << 53;

macro_rules! to_json_int_checked {
    ($($t:ty),*) => {
        $(
            impl ToJsonValue for $t {
                fn to_json_value(&self) -> EncodeResult<Value> {
                    let wide = *self as i128;
                    if wide.abs() > MAX_EXACT_INT {
                        return Err(EncodeError::InvalidValue(format!(
                            "{} {} is not exactly representable as a JSON number",
                            stringify!($t),
                            self
                        )));
                    }
                    Ok(Value::Number(*self as f64))
                }
            }
        )*
    };
}

to_json_int_checked!(i64, u64, isize, usize);

impl ToJsonValue for Map {
    fn to_json_value(&self) -> EncodeResult<Value> {
        let value = Value::Object(self.clone());
        ensure_finite(&value)?;
        Ok(value)
    }
}

impl<V: ToJsonValue> ToJsonValue for BTreeMap<String, V> {
    fn to_json_value(&self) -> EncodeResult<Value> {
        let mut map = Map::new();
        for (key, value) in self {
            map.insert(key.clone(), value.to_json_value()?);
        }
        Ok(Value::Object(map))
    }
}

impl<V: ToJsonValue, S: BuildHasher> ToJsonValue for HashMap<String, V, S> {
    fn to_json_value(&self) -> EncodeResult<Value> {
        let mut map = Map::new();
        for (key, value) in self {
            map.insert(key.clone(), value.to_json_value()?);
        }
        Ok(Value::Object(map))
    }
}

impl ToJsonValue for Value {
    fn to_json_value(&self) -> EncodeResult<Value> {
        match self {
            Value::Number(n) => finite(*n),
            Value::String(_) | Value::Bool(_) => Ok(self.clone()),
            Value::Object(_) => {
                ensure_finite(self)?;
                Ok(self.clone())
            }
            Value::Array(_) | Value::Null => {
                Err(EncodeError::UnsupportedType(self.type_name().to_string()))
            }
        }
    }
}

/// How a write treats an existing value of a different shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// The incoming value replaces whatever is there.
    #[default]
    Overwrite,
    /// Replacing an object with a non-object (or the reverse) is an
    /// [`EncodeError::TypeMismatch`].
    Strict,
}

/// Types that can write themselves into an [`Encoder`].
pub trait Encodable {
    fn encode(&self, encoder: &mut Encoder) -> EncodeResult<()>;
}

/// Encode `value` into a fresh encoder and serialize the result.
pub fn to_string<E: Encodable + ?Sized>(value: &E) -> EncodeResult<String> {
    let mut encoder = Encoder::new();
    value.encode(&mut encoder)?;
    Ok(encoder.to_json_string())
}

/// Accumulates a JSON object from key-path writes.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoder {
    root: Value,
    policy: MergePolicy,
    max_depth: usize,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    /// An encoder with an empty root object and [`MergePolicy::Overwrite`].
    pub fn new() -> Self {
        Self::with_policy(MergePolicy::default())
    }

    pub fn with_policy(policy: MergePolicy) -> Self {
        Self {
            root: Value::Object(Map::new()),
            policy,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Continue writing into an existing object, e.g. a stored configuration
    /// document that is being updated.
    pub fn with_root(root: Value) -> EncodeResult<Self> {
        if !root.is_object() {
            return Err(EncodeError::InvalidValue(format!(
                "root must be an object, found {}",
                root.type_name()
            )));
        }
        Ok(Self {
            root,
            policy: MergePolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        })
    }

    /// Change the merge policy used by subsequent writes.
    pub fn set_policy(&mut self, policy: MergePolicy) {
        self.policy = policy;
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Change the nesting limit used by subsequent writes. Keep it at or
    /// below the reader's [`ParserConfig::max_depth`](crate::ParserConfig)
    /// for the output to parse back.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    /// Maximum number of nested objects a write may produce, root included.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Write `value` at `key_path`, merging with what is already there.
    pub fn encode<T: ToJsonValue>(&mut self, value: T, key_path: &str) -> EncodeResult<()> {
        let path = self.key_path(key_path)?;
        let value = value.to_json_value()?;
        self.merge_chain(&path, value)
    }

    /// Write a top-level field. Shorthand for [`encode`](Self::encode) with
    /// a single-segment path.
    pub fn encode_key<T: ToJsonValue>(&mut self, value: T, key: &str) -> EncodeResult<()> {
        self.encode(value, key)
    }

    /// Like [`encode`](Self::encode), but `None` is an
    /// [`EncodeError::MissingValue`].
    pub fn encode_required<T: ToJsonValue>(
        &mut self,
        value: Option<T>,
        key_path: &str,
    ) -> EncodeResult<()> {
        match value {
            Some(value) => self.encode(value, key_path),
            None => Err(EncodeError::MissingValue(key_path.to_string())),
        }
    }

    /// Write the raw value `R` an enum maps to. The counterpart of
    /// [`Decoder::decode_enum`](crate::Decoder::decode_enum).
    pub fn encode_enum<T, R>(&mut self, value: T, key_path: &str) -> EncodeResult<()>
    where
        R: From<T> + ToJsonValue,
    {
        self.encode(R::from(value), key_path)
    }

    /// Encode an [`Encodable`] into its own object and merge that object
    /// under `key_path`. Nothing is written if `value` fails to encode.
    pub fn encode_nested<E: Encodable + ?Sized>(
        &mut self,
        value: &E,
        key_path: &str,
    ) -> EncodeResult<()> {
        let path = self.key_path(key_path)?;
        let mut nested = Encoder::with_policy(self.policy);
        nested.max_depth = self.max_depth;
        value.encode(&mut nested)?;
        self.merge_chain(&path, nested.into_value())
    }

    /// Split and validate `key_path`. Each segment adds one level of nesting,
    /// so a path longer than the depth limit is rejected up front.
    fn key_path<'a>(&self, key_path: &'a str) -> EncodeResult<KeyPath<'a>> {
        let path = KeyPath::parse(key_path)
            .ok_or_else(|| EncodeError::InvalidKeyPath(key_path.to_string()))?;
        let depth = path.segments().len();
        if depth > self.max_depth {
            return Err(EncodeError::InvalidKeyPath(format!(
                "{} segments exceed the depth limit of {}",
                depth, self.max_depth
            )));
        }
        Ok(path)
    }

    /// Wrap `value` in one object per path segment, leaf first, then merge
    /// the chain into the root.
    fn merge_chain(&mut self, path: &KeyPath<'_>, value: Value) -> EncodeResult<()> {
        // the root plus one object per parent segment already hold the leaf
        ensure_depth(&value, self.max_depth - path.segments().len(), self.max_depth)?;
        let mut leaf = Map::new();
        leaf.insert(path.leaf(), value);
        let mut chain = Value::Object(leaf);
        for segment in path.parents().iter().rev() {
            let mut parent = Map::new();
            parent.insert(*segment, chain);
            chain = Value::Object(parent);
        }
        self.merge_root(chain, &path.segments().join("."))
    }

    fn merge_root(&mut self, chain: Value, key_path: &str) -> EncodeResult<()> {
        debug!(key_path, policy = ?self.policy, "merging encoded value");
        match self.policy {
            MergePolicy::Overwrite => {
                self.root.merge(chain);
                Ok(())
            }
            MergePolicy::Strict => self.root.merge_strict(chain),
        }
    }

    /// The tree built so far. Always an object.
    pub fn value(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    /// Serialize the tree as compact JSON with default options.
    pub fn to_json_string(&self) -> String {
        serializer::serialize(&self.root)
    }

    pub fn to_json_string_with(&self, options: &FormatOptions) -> String {
        serializer::serialize_with(&self.root, options)
    }
}
