//! Recursive-descent JSON parser producing a [`Value`].
//!
//! The parser walks the input as bytes. Every structural character in JSON is
//! ASCII, so string contents can be copied as whole UTF-8 runs between escape
//! sequences without decoding individual characters.
//!
//! # Key design decisions
//!
//! - **Whole-input contract**: after the first complete value only whitespace
//!   may follow; a second document is a [`SyntaxErrorKind::TrailingCharacters`]
//!   error.
//! - **Last duplicate wins**: repeated object keys overwrite earlier ones
//!   without an error.
//! - **Bounded nesting**: [`ParserConfig::max_depth`] caps recursion so hostile
//!   input cannot exhaust a small stack.
//! - **Lenient corners**: leading zeros (`007`) and raw control characters
//!   inside strings are accepted, matching what the devices producing these
//!   payloads emit.

use crate::error::{DecodeResult, SyntaxError, SyntaxErrorKind};
use crate::number;
use crate::value::{Map, Value};
use tracing::{debug, trace};

/// Nesting limit shared by [`ParserConfig`] and the
/// [`Encoder`](crate::Encoder), so encoded documents always parse back.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Tunables for [`Parser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum number of nested arrays/objects. The root container is depth 1.
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Parse a complete JSON document with the default configuration.
///
/// # Example
/// ```
/// use keypath_json::{parse, Value};
/// let value = parse(r#"{"on": true}"#).unwrap();
/// assert_eq!(value.as_object().unwrap().get("on"), Some(&Value::Bool(true)));
/// ```
pub fn parse(input: &str) -> DecodeResult<Value> {
    Parser::new(input).parse()
}

/// A single-use cursor over one JSON document.
pub struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
    config: ParserConfig,
}

type ParseResult<T> = std::result::Result<T, SyntaxError>;

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_config(input, ParserConfig::default())
    }

    pub fn with_config(input: &'a str, config: ParserConfig) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            depth: 0,
            config,
        }
    }

    /// Consume the whole input and return the value it holds.
    pub fn parse(mut self) -> DecodeResult<Value> {
        trace!(len = self.input.len(), "parsing JSON document");
        let result = self.parse_document();
        match &result {
            Ok(value) => trace!(root = value.type_name(), "parsed JSON document"),
            Err(err) => debug!(error = %err, "rejected JSON document"),
        }
        result.map_err(Into::into)
    }

    fn parse_document(&mut self) -> ParseResult<Value> {
        let value = self.parse_value()?;
        self.skip_whitespace();
        if self.pos < self.bytes.len() {
            return Err(self.error(SyntaxErrorKind::TrailingCharacters));
        }
        Ok(value)
    }

    fn parse_value(&mut self) -> ParseResult<Value> {
        self.skip_whitespace();
        let Some(c) = self.peek() else {
            return Err(self.error(SyntaxErrorKind::UnexpectedEnd));
        };
        match c {
            b'{' => self.parse_object(),
            b'[' => self.parse_array(),
            b'"' => Ok(Value::String(self.parse_string()?)),
            b't' => self.parse_literal("true", Value::Bool(true)),
            b'f' => self.parse_literal("false", Value::Bool(false)),
            b'n' => self.parse_literal("null", Value::Null),
            b'-' | b'0'..=b'9' => self.parse_number(),
            _ => Err(self.error(SyntaxErrorKind::UnexpectedCharacter(self.current_char()))),
        }
    }

    fn parse_object(&mut self) -> ParseResult<Value> {
        self.enter()?;
        self.pos += 1; // '{'
        let mut map = Map::new();

        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            self.depth -= 1;
            return Ok(Value::Object(map));
        }

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'"') => {}
                Some(_) => return Err(self.error(SyntaxErrorKind::Expected("object key"))),
                None => return Err(self.error(SyntaxErrorKind::UnexpectedEnd)),
            }
            let key = self.parse_string()?;

            self.skip_whitespace();
            self.expect(b':', "':' after object key")?;

            let value = self.parse_value()?;
            map.insert(key, value);

            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => return Err(self.error(SyntaxErrorKind::Expected("',' or '}'"))),
                None => return Err(self.error(SyntaxErrorKind::UnexpectedEnd)),
            }
        }

        self.depth -= 1;
        Ok(Value::Object(map))
    }

    fn parse_array(&mut self) -> ParseResult<Value> {
        self.enter()?;
        self.pos += 1; // '['
        let mut items = Vec::new();

        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.pos += 1;
            self.depth -= 1;
            return Ok(Value::Array(items));
        }

        loop {
            items.push(self.parse_value()?);

            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => return Err(self.error(SyntaxErrorKind::Expected("',' or ']'"))),
                None => return Err(self.error(SyntaxErrorKind::UnexpectedEnd)),
            }
        }

        self.depth -= 1;
        Ok(Value::Array(items))
    }

    /// Parse a quoted string starting at the opening quote.
    fn parse_string(&mut self) -> ParseResult<String> {
        self.pos += 1; // '"'
        let mut out = String::new();

        loop {
            let run_start = self.pos;
            while let Some(c) = self.peek() {
                if c == b'"' || c == b'\\' {
                    break;
                }
                self.pos += 1;
            }
            // run boundaries sit next to ASCII bytes, so they are char boundaries
            out.push_str(&self.input[run_start..self.pos]);

            match self.peek() {
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    self.pos += 1;
                    self.parse_escape(&mut out)?;
                }
                _ => return Err(self.error(SyntaxErrorKind::UnterminatedString)),
            }
        }
    }

    /// Parse the escape sequence following a backslash.
    fn parse_escape(&mut self, out: &mut String) -> ParseResult<()> {
        let Some(c) = self.peek() else {
            return Err(self.error(SyntaxErrorKind::UnterminatedString));
        };
        let unescaped = match c {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{08}',
            b'f' => '\u{0C}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => {
                self.pos += 1;
                return self.parse_unicode_escape(out);
            }
            _ => return Err(self.error(SyntaxErrorKind::InvalidEscape(self.current_char()))),
        };
        self.pos += 1;
        out.push(unescaped);
        Ok(())
    }

    /// Parse the four hex digits of a `\uXXXX` escape.
    fn parse_unicode_escape(&mut self, out: &mut String) -> ParseResult<()> {
        let start = self.pos;
        let mut code: u32 = 0;
        for _ in 0..4 {
            let Some(c) = self.peek() else {
                return Err(self.error(SyntaxErrorKind::UnterminatedString));
            };
            let digit = match c {
                b'0'..=b'9' => c - b'0',
                b'a'..=b'f' => c - b'a' + 10,
                b'A'..=b'F' => c - b'A' + 10,
                _ => return Err(self.error(SyntaxErrorKind::InvalidUnicodeEscape)),
            };
            code = (code << 4) | u32::from(digit);
            self.pos += 1;
        }
        // lone surrogates have no scalar value; pairs are not reassembled
        let ch = char::from_u32(code).ok_or_else(|| {
            SyntaxError::at(SyntaxErrorKind::InvalidUnicodeEscape, self.input, start)
        })?;
        out.push(ch);
        Ok(())
    }

    fn parse_literal(&mut self, keyword: &'static str, value: Value) -> ParseResult<Value> {
        if self.bytes[self.pos..].starts_with(keyword.as_bytes()) {
            self.pos += keyword.len();
            Ok(value)
        } else {
            Err(self.error(SyntaxErrorKind::InvalidLiteral))
        }
    }

    /// Greedily consume `-?digits(.digits)?([eE][+-]?digits)?` and convert it.
    fn parse_number(&mut self) -> ParseResult<Value> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        self.skip_digits();
        if self.peek() == Some(b'.') {
            self.pos += 1;
            self.skip_digits();
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            self.skip_digits();
        }

        let text = &self.input[start..self.pos];
        number::parse_decimal(text).map(Value::Number).ok_or_else(|| {
            SyntaxError::at(
                SyntaxErrorKind::InvalidNumber(text.to_string()),
                self.input,
                start,
            )
        })
    }

    fn enter(&mut self) -> ParseResult<()> {
        if self.depth >= self.config.max_depth {
            return Err(self.error(SyntaxErrorKind::DepthLimitExceeded(self.config.max_depth)));
        }
        self.depth += 1;
        Ok(())
    }

    fn expect(&mut self, byte: u8, what: &'static str) -> ParseResult<()> {
        match self.peek() {
            Some(c) if c == byte => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(self.error(SyntaxErrorKind::Expected(what))),
            None => Err(self.error(SyntaxErrorKind::UnexpectedEnd)),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn skip_digits(&mut self) {
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// The full character at the cursor, for error messages.
    fn current_char(&self) -> char {
        self.input[self.pos..].chars().next().unwrap_or('\0')
    }

    fn error(&self, kind: SyntaxErrorKind) -> SyntaxError {
        SyntaxError::at(kind, self.input, self.pos)
    }
}
