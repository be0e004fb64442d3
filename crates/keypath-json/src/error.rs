//! Error types for parsing, decoding and encoding.
//!
//! Two disjoint taxonomies: [`DecodeError`] covers everything on the read path
//! (parser included, via [`DecodeError::InvalidFormat`]) and [`EncodeError`]
//! covers the write path.

use thiserror::Error;

/// Errors produced while parsing text or reading values out of a [`Decoder`].
///
/// [`Decoder`]: crate::Decoder
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// A key path segment was not present in the object being walked.
    #[error("missing key: {0}")]
    MissingKey(String),

    /// The value at a key path has a different tag than the one requested.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// The key path was empty or contained an empty segment.
    #[error("invalid key path: {0}")]
    InvalidKeyPath(String),

    /// A raw value was found but no enum case corresponds to it.
    #[error("invalid enum value: {0}")]
    InvalidEnumValue(String),

    /// The input text is not a well-formed JSON document, or its root is not
    /// an object where one is required.
    #[error("invalid format: {0}")]
    InvalidFormat(#[from] SyntaxError),
}

/// Errors produced while building a value tree with an [`Encoder`].
///
/// [`Encoder`]: crate::Encoder
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    /// The value has a supported type but cannot be represented (NaN,
    /// out-of-range integers, non-object roots).
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// A required value was absent.
    #[error("missing value: {0}")]
    MissingValue(String),

    /// Strict merging found an object and a non-object at the same position.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// The key path was empty or contained an empty segment.
    #[error("invalid key path: {0}")]
    InvalidKeyPath(String),

    /// The value has no mapping to a JSON tag the encoder accepts.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),
}

/// A structural failure detected by the parser, with its position.
///
/// `offset` is a byte offset into the input; `line` and `column` are 1-based
/// and count characters, not bytes.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} at line {line}, column {column}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl SyntaxError {
    /// Build an error for `kind` detected at byte `offset` of `input`.
    pub(crate) fn at(kind: SyntaxErrorKind, input: &str, offset: usize) -> Self {
        let offset = offset.min(input.len());
        let mut line = 1;
        let mut column = 1;
        for ch in input[..floor_char_boundary(input, offset)].chars() {
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Self {
            kind,
            offset,
            line,
            column,
        }
    }

    /// An error that is not tied to a position in any text.
    pub(crate) fn detached(kind: SyntaxErrorKind) -> Self {
        Self {
            kind,
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

/// The distinct reasons a document can be rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),

    /// A structural token was required; the payload names it.
    #[error("expected {0}")]
    Expected(&'static str),

    #[error("unterminated string")]
    UnterminatedString,

    #[error("invalid escape sequence '\\{0}'")]
    InvalidEscape(char),

    #[error("invalid unicode escape")]
    InvalidUnicodeEscape,

    /// A `true`, `false` or `null` keyword was only partially matched.
    #[error("invalid literal")]
    InvalidLiteral,

    #[error("invalid number format: {0}")]
    InvalidNumber(String),

    #[error("unexpected trailing characters")]
    TrailingCharacters,

    #[error("nesting deeper than {0} levels")]
    DepthLimitExceeded(usize),

    #[error("top-level value is not an object")]
    NotAnObject,
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Convenience alias for the read path.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Convenience alias for the write path.
pub type EncodeResult<T> = std::result::Result<T, EncodeError>;
