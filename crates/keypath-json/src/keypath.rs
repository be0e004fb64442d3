//! Dotted key paths such as `"sensor.temp"`.
//!
//! A key path addresses a field nested inside objects: each segment names a
//! key one level deeper. Segments are never empty, so `""`, `"a."`, `".a"`
//! and `"a..b"` are all rejected.

/// A validated key path, split on dots.
///
/// For example, `"a.b.c"` becomes `["a", "b", "c"]` and its leaf is `"c"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath<'a> {
    segments: Vec<&'a str>,
}

impl<'a> KeyPath<'a> {
    /// Split and validate `path`. Returns `None` when the path has no
    /// segments or any segment is empty.
    pub fn parse(path: &'a str) -> Option<Self> {
        if path.is_empty() {
            return None;
        }
        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        Some(Self { segments })
    }

    pub fn segments(&self) -> &[&'a str] {
        &self.segments
    }

    /// The final segment.
    pub fn leaf(&self) -> &'a str {
        // parse() guarantees at least one segment
        self.segments[self.segments.len() - 1]
    }

    /// Every segment except the leaf.
    pub fn parents(&self) -> &[&'a str] {
        &self.segments[..self.segments.len() - 1]
    }
}
