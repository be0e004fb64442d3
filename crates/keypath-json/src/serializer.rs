//! Renders a [`Value`] tree as JSON text.
//!
//! Objects are written in their storage (insertion) order. Numbers go through
//! the hand-written formatter in [`crate::number`]; see there for the exact
//! rendering rules.

use crate::number;
use crate::value::{Map, Value};

/// Output settings for [`serialize_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Fractional digits kept for non-integral numbers (trailing zeros are
    /// trimmed). Clamped to [`number::MAX_PRECISION`].
    pub precision: usize,
    /// Escape quotes, backslashes and control characters in strings and keys.
    /// Disabling this writes string contents verbatim, which can produce
    /// output that does not parse back.
    pub escape_strings: bool,
    /// `Some(n)` pretty-prints with `n` spaces per nesting level; `None`
    /// produces compact output.
    pub indent: Option<usize>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            precision: 6,
            escape_strings: true,
            indent: None,
        }
    }
}

impl FormatOptions {
    /// Default options with pretty-printing at `width` spaces per level.
    pub fn pretty(width: usize) -> Self {
        Self {
            indent: Some(width),
            ..Self::default()
        }
    }
}

/// Serialize `value` as compact JSON with default options.
///
/// # Example
/// ```
/// use keypath_json::{serialize, Map, Value};
/// let mut map = Map::new();
/// map.insert("temp", Value::Number(21.5));
/// assert_eq!(serialize(&Value::Object(map)), r#"{"temp":21.5}"#);
/// ```
pub fn serialize(value: &Value) -> String {
    serialize_with(value, &FormatOptions::default())
}

/// Serialize `value` using `options`.
pub fn serialize_with(value: &Value, options: &FormatOptions) -> String {
    let mut out = String::new();
    write_value(value, options, 0, &mut out);
    out
}

fn write_value(value: &Value, options: &FormatOptions, depth: usize, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => number::write_number(*n, options.precision, out),
        Value::String(s) => write_string(s, options.escape_strings, out),
        Value::Array(items) => write_array(items, options, depth, out),
        Value::Object(map) => write_object(map, options, depth, out),
    }
}

fn write_array(items: &[Value], options: &FormatOptions, depth: usize, out: &mut String) {
    if items.is_empty() {
        out.push_str("[]");
        return;
    }
    out.push('[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_newline(options, depth + 1, out);
        write_value(item, options, depth + 1, out);
    }
    write_newline(options, depth, out);
    out.push(']');
}

fn write_object(map: &Map, options: &FormatOptions, depth: usize, out: &mut String) {
    if map.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push('{');
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_newline(options, depth + 1, out);
        write_string(key, options.escape_strings, out);
        out.push(':');
        if options.indent.is_some() {
            out.push(' ');
        }
        write_value(value, options, depth + 1, out);
    }
    write_newline(options, depth, out);
    out.push('}');
}

/// In pretty mode, start a new line indented for `depth`.
fn write_newline(options: &FormatOptions, depth: usize, out: &mut String) {
    if let Some(width) = options.indent {
        out.push('\n');
        out.push_str(&" ".repeat(width * depth));
    }
}

fn write_string(s: &str, escape: bool, out: &mut String) {
    out.push('"');
    if !escape {
        out.push_str(s);
        out.push('"');
        return;
    }
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if u32::from(c) < 0x20 => {
                const HEX: &[u8; 16] = b"0123456789abcdef";
                let code = u32::from(c) as usize;
                out.push_str("\\u00");
                out.push(char::from(HEX[code >> 4]));
                out.push(char::from(HEX[code & 0xF]));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
