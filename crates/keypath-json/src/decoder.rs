//! Typed, key-path addressed reads from a parsed JSON object.
//!
//! A [`Decoder`] owns an immutable [`Value`] whose root is an object. Fields
//! are read with [`Decoder::decode`], which walks a dotted key path and
//! converts the value found there through [`FromJsonValue`]. Whether a missing
//! field is fatal is left to the caller: [`Decoder::decode_optional`] turns a
//! missing key into `None`.
//!
//! # Integer narrowing
//!
//! All numbers are stored as `f64`. Integer targets accept a number only when
//! it has no fractional part and lies inside the target's range; anything else
//! is a [`DecodeError::TypeMismatch`] rather than a silent truncation.

use crate::error::{DecodeError, DecodeResult, SyntaxError, SyntaxErrorKind};
use crate::keypath::KeyPath;
use crate::number;
use crate::parser;
use crate::serializer;
use crate::value::Value;
use tracing::trace;

/// Conversion from a borrowed [`Value`] into a Rust type.
pub trait FromJsonValue: Sized {
    /// Type name reported as `expected` in mismatch errors.
    const EXPECTED: &'static str;

    fn from_json_value(value: &Value) -> DecodeResult<Self>;
}

fn mismatch<T: FromJsonValue>(value: &Value) -> DecodeError {
    DecodeError::TypeMismatch {
        expected: T::EXPECTED.to_string(),
        found: describe(value),
    }
}

/// A short description of a value for error messages: the tag, plus the
/// number itself for numbers.
fn describe(value: &Value) -> String {
    match value {
        Value::Number(n) => {
            let mut out = String::from("number ");
            number::write_number(*n, number::MAX_PRECISION, &mut out);
            out
        }
        other => other.type_name().to_string(),
    }
}

impl FromJsonValue for String {
    const EXPECTED: &'static str = "string";

    fn from_json_value(value: &Value) -> DecodeResult<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl FromJsonValue for bool {
    const EXPECTED: &'static str = "bool";

    fn from_json_value(value: &Value) -> DecodeResult<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl FromJsonValue for f64 {
    const EXPECTED: &'static str = "number";

    fn from_json_value(value: &Value) -> DecodeResult<Self> {
        match value {
            Value::Number(n) => Ok(*n),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl FromJsonValue for f32 {
    const EXPECTED: &'static str = "number";

    fn from_json_value(value: &Value) -> DecodeResult<Self> {
        match value {
            Value::Number(n) => Ok(*n as f32),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

macro_rules! from_json_int {
    ($($t:ty),*) => {
        $(
            impl FromJsonValue for $t {
                const EXPECTED: &'static str = stringify!($t);

                fn from_json_value(value: &Value) -> DecodeResult<Self> {
                    match value {
                        // MAX as f64 rounds up to a power of two for 64-bit types,
                        // and adding one is then absorbed: `<` is the exact bound
                        Value::Number(n)
                            if n.fract() == 0.0
                                && *n >= <$t>::MIN as f64
                                && *n < <$t>::MAX as f64 + 1.0 =>
                        {
                            Ok(*n as $t)
                        }
                        other => Err(mismatch::<Self>(other)),
                    }
                }
            }
        )*
    };
}

from_json_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromJsonValue for Value {
    const EXPECTED: &'static str = "value";

    fn from_json_value(value: &Value) -> DecodeResult<Self> {
        Ok(value.clone())
    }
}

/// Types that can rebuild themselves from a [`Decoder`].
///
/// ```
/// use keypath_json::{Decodable, DecodeResult, Decoder};
///
/// struct Reading { temp: f64, unit: String }
///
/// impl Decodable for Reading {
///     fn decode(decoder: &Decoder) -> DecodeResult<Self> {
///         Ok(Self {
///             temp: decoder.decode("sensor.temp")?,
///             unit: decoder.decode("sensor.unit")?,
///         })
///     }
/// }
///
/// let reading: Reading =
///     keypath_json::from_str(r#"{"sensor":{"temp":21.5,"unit":"C"}}"#).unwrap();
/// assert_eq!(reading.temp, 21.5);
/// assert_eq!(reading.unit, "C");
/// ```
pub trait Decodable: Sized {
    fn decode(decoder: &Decoder) -> DecodeResult<Self>;
}

/// Parse `text` and decode a `T` from its root object.
pub fn from_str<T: Decodable>(text: &str) -> DecodeResult<T> {
    T::decode(&Decoder::parse(text)?)
}

/// Read-only view over a JSON object, addressed by key path.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoder {
    root: Value,
}

impl Decoder {
    /// Wrap `root`, which must be an object.
    pub fn new(root: Value) -> DecodeResult<Self> {
        if !root.is_object() {
            return Err(SyntaxError::detached(SyntaxErrorKind::NotAnObject).into());
        }
        Ok(Self { root })
    }

    /// Parse `text` and wrap the resulting object.
    pub fn parse(text: &str) -> DecodeResult<Self> {
        Self::new(parser::parse(text)?)
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    /// Find the value at `key_path`.
    ///
    /// Every segment but the last must name an object; the last is looked up
    /// in the object reached.
    pub fn lookup_value(&self, key_path: &str) -> DecodeResult<&Value> {
        trace!(key_path, "decoder lookup");
        let path = KeyPath::parse(key_path)
            .ok_or_else(|| DecodeError::InvalidKeyPath(key_path.to_string()))?;

        let mut current = &self.root;
        for (depth, segment) in path.segments().iter().enumerate() {
            current = match current {
                Value::Object(map) => map.get(segment),
                _ => None,
            }
            .ok_or_else(|| DecodeError::MissingKey(path.segments()[..=depth].join(".")))?;
        }
        Ok(current)
    }

    /// Decode the value at `key_path` as a `T`.
    ///
    /// # Example
    /// ```
    /// use keypath_json::Decoder;
    /// let decoder = Decoder::parse(r#"{"wifi":{"ssid":"home","channel":6}}"#).unwrap();
    /// let ssid: String = decoder.decode("wifi.ssid").unwrap();
    /// let channel: u8 = decoder.decode("wifi.channel").unwrap();
    /// assert_eq!((ssid.as_str(), channel), ("home", 6));
    /// ```
    pub fn decode<T: FromJsonValue>(&self, key_path: &str) -> DecodeResult<T> {
        T::from_json_value(self.lookup_value(key_path)?)
    }

    /// Decode a top-level field. Shorthand for [`decode`](Self::decode) with
    /// a single-segment path.
    pub fn decode_key<T: FromJsonValue>(&self, key: &str) -> DecodeResult<T> {
        self.decode(key)
    }

    /// Like [`decode`](Self::decode), but a missing key yields `Ok(None)`.
    pub fn decode_optional<T: FromJsonValue>(&self, key_path: &str) -> DecodeResult<Option<T>> {
        match self.decode(key_path) {
            Ok(value) => Ok(Some(value)),
            Err(DecodeError::MissingKey(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Decode a raw value of type `R` and map it to the enum `T`.
    ///
    /// A raw value with no matching case is
    /// [`DecodeError::InvalidEnumValue`].
    pub fn decode_enum<T, R>(&self, key_path: &str) -> DecodeResult<T>
    where
        T: TryFrom<R>,
        R: FromJsonValue,
    {
        let value = self.lookup_value(key_path)?;
        let raw = R::from_json_value(value)?;
        T::try_from(raw).map_err(|_| {
            DecodeError::InvalidEnumValue(format!(
                "{key_path}: {}",
                serializer::serialize(value)
            ))
        })
    }

    /// A decoder over the object found at `key_path`.
    pub fn scoped(&self, key_path: &str) -> DecodeResult<Decoder> {
        let value = self.lookup_value(key_path)?;
        if !value.is_object() {
            return Err(DecodeError::TypeMismatch {
                expected: "object".to_string(),
                found: describe(value),
            });
        }
        Ok(Decoder {
            root: value.clone(),
        })
    }

    /// Decode a [`Decodable`] from the object found at `key_path`.
    pub fn decode_nested<T: Decodable>(&self, key_path: &str) -> DecodeResult<T> {
        T::decode(&self.scoped(key_path)?)
    }
}
