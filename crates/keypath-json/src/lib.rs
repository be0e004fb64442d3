//! # keypath-json
//!
//! A small JSON value model, parser and key-path encoder/decoder for targets
//! where a general-purpose JSON stack is too heavy. Everything from byte
//! scanning to decimal conversion is implemented here; the only runtime
//! dependencies are `thiserror` for error types and `tracing` for
//! diagnostics.
//!
//! ## Quick start
//!
//! ```rust
//! use keypath_json::{Decoder, Encoder};
//!
//! // Build a document from key-path writes
//! let mut encoder = Encoder::new();
//! encoder.encode(21.5, "sensor.temp").unwrap();
//! encoder.encode("C", "sensor.unit").unwrap();
//! let json = encoder.to_json_string();
//! assert_eq!(json, r#"{"sensor":{"temp":21.5,"unit":"C"}}"#);
//!
//! // Read it back
//! let decoder = Decoder::parse(&json).unwrap();
//! let temp: f64 = decoder.decode("sensor.temp").unwrap();
//! assert_eq!(temp, 21.5);
//! ```
//!
//! ## Modules
//!
//! - [`value`]: `Value` and the insertion-ordered `Map`, plus merge
//! - [`parser`]: text → `Value`
//! - [`serializer`]: `Value` → text
//! - [`decoder`]: typed reads by key path
//! - [`encoder`]: typed writes by key path
//! - [`keypath`]: key path splitting and validation
//! - [`number`]: decimal number parsing and formatting
//! - [`error`]: error types for both directions

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod keypath;
pub mod number;
pub mod parser;
pub mod serializer;
pub mod value;

pub use decoder::{from_str, Decodable, Decoder, FromJsonValue};
pub use encoder::{to_string, Encodable, Encoder, MergePolicy, ToJsonValue};
pub use error::{
    DecodeError, DecodeResult, EncodeError, EncodeResult, SyntaxError, SyntaxErrorKind,
};
pub use keypath::KeyPath;
pub use parser::{parse, Parser, ParserConfig, DEFAULT_MAX_DEPTH};
pub use serializer::{serialize, serialize_with, FormatOptions};
pub use value::{Map, Value};
