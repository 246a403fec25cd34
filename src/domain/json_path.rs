use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// One step of a path query.
///
/// Variant order is significant: derived ordering sorts paths segment by
/// segment with numeric indexes, which the pruner relies on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    /// `.name` or `['name']`
    Key(String),
    /// `[3]`
    Index(usize),
    /// `[*]` or `.*`
    Wildcard,
    /// `..name`
    Descendant(String),
}

impl fmt::Display for Segment {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) if is_plain_key(key) => write!(formatter, ".{key}"),
            Self::Key(key) => write!(formatter, "[{}]", quote(key)),
            Self::Index(index) => write!(formatter, "[{index}]"),
            Self::Wildcard => formatter.write_str("[*]"),
            Self::Descendant(key) if is_plain_key(key) => write!(formatter, "..{key}"),
            Self::Descendant(key) => write!(formatter, "..[{}]", quote(key)),
        }
    }
}

/// Parsed path query rooted at `$` (`$.items[0]['a.b']`, `$..id`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, JsonPathError> {
        let input = input.trim();
        if !input.starts_with('$') {
            return Err(JsonPathError::new(input, "path must start with `$`"));
        }

        let bytes = input.as_bytes();
        let mut cursor = 1;
        let mut segments = Vec::new();

        while cursor < bytes.len() {
            match bytes[cursor] {
                b'.' if bytes.get(cursor + 1) == Some(&b'.') => {
                    cursor += 2;
                    let key = if bytes.get(cursor) == Some(&b'[') {
                        let (key, next) = parse_quoted_key(input, cursor + 1)?;
                        cursor = expect_close(input, next)?;
                        key
                    } else {
                        let (key, next) = parse_identifier(input, cursor)?;
                        cursor = next;
                        key
                    };
                    segments.push(Segment::Descendant(key));
                }
                b'.' => {
                    cursor += 1;
                    if bytes.get(cursor) == Some(&b'*') {
                        segments.push(Segment::Wildcard);
                        cursor += 1;
                        continue;
                    }
                    let (key, next) = parse_identifier(input, cursor)?;
                    segments.push(Segment::Key(key));
                    cursor = next;
                }
                b'[' => {
                    cursor += 1;
                    match bytes.get(cursor) {
                        Some(b'\'' | b'"') => {
                            let (key, next) = parse_quoted_key(input, cursor)?;
                            segments.push(Segment::Key(key));
                            cursor = expect_close(input, next)?;
                        }
                        Some(b'*') => {
                            segments.push(Segment::Wildcard);
                            cursor = expect_close(input, cursor + 1)?;
                        }
                        Some(byte) if byte.is_ascii_digit() => {
                            let index_start = cursor;
                            while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
                                cursor += 1;
                            }
                            let index = input[index_start..cursor].parse::<usize>().map_err(
                                |error| JsonPathError::new(input, format!("invalid index: {error}")),
                            )?;
                            segments.push(Segment::Index(index));
                            cursor = expect_close(input, cursor)?;
                        }
                        _ => {
                            return Err(JsonPathError::new(
                                input,
                                format!("expected quoted key, `*` or index at byte {cursor}"),
                            ));
                        }
                    }
                }
                _ => {
                    return Err(JsonPathError::new(
                        input,
                        format!("expected `.` or `[` at byte {cursor}"),
                    ));
                }
            }
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// A definite path addresses at most one node: no wildcard, no descendant.
    pub fn is_definite(&self) -> bool {
        self.segments
            .iter()
            .all(|segment| matches!(segment, Segment::Key(_) | Segment::Index(_)))
    }

    pub fn has_descendant(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, Segment::Descendant(_)))
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    pub fn ends_with_wildcard(&self) -> bool {
        matches!(self.last(), Some(Segment::Wildcard))
    }

    pub fn push(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    pub fn child(&self, key: impl Into<String>) -> Self {
        self.push(Segment::Key(key.into()))
    }

    pub fn wildcard(&self) -> Self {
        self.push(Segment::Wildcard)
    }

    /// Path with the trailing segment removed; `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.segments.split_last()?;
        Some(Self {
            segments: parent.to_vec(),
        })
    }

    /// Splits into the owning path and the relative property expression used
    /// inside filters: `$.a.b[0]` becomes `$.a` and `@.b[0]`.
    ///
    /// The property starts at the last named segment, so a bracketed key such
    /// as `['a.b']` always stays whole.
    pub fn split_property(&self) -> (Self, String) {
        let split_at = self
            .segments
            .iter()
            .rposition(|segment| matches!(segment, Segment::Key(_) | Segment::Descendant(_)))
            .unwrap_or(0);
        let parent = Self {
            segments: self.segments[..split_at].to_vec(),
        };
        let mut property = String::from("@");
        for segment in &self.segments[split_at..] {
            property.push_str(&segment.to_string());
        }
        (parent, property)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("$")?;
        for segment in &self.segments {
            write!(formatter, "{segment}")?;
        }
        Ok(())
    }
}

impl Serialize for JsonPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid path `{input}`: {reason}")]
pub struct JsonPathError {
    input: String,
    reason: String,
}

impl JsonPathError {
    fn new(input: &str, reason: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Single-quoted string literal for filter expressions.
pub fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for ch in text.chars() {
        if ch == '\'' || ch == '\\' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('\'');
    quoted
}

/// Regex literal for `=~` filters with the `/` delimiter escaped.
pub fn regex_literal(pattern: &str) -> String {
    format!("/({})/", pattern.replace('/', "\\/"))
}

fn is_plain_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|ch| ch.is_alphanumeric() || ch == '_' || ch == '-' || ch == '$' || ch == '@')
}

fn parse_identifier(input: &str, start: usize) -> Result<(String, usize), JsonPathError> {
    let bytes = input.as_bytes();
    let mut cursor = start;
    while cursor < bytes.len() && !matches!(bytes[cursor], b'.' | b'[') {
        if matches!(bytes[cursor], b']' | b'\'' | b'"' | b' ') {
            return Err(JsonPathError::new(
                input,
                format!("unexpected character at byte {cursor}"),
            ));
        }
        cursor += 1;
    }
    if cursor == start {
        return Err(JsonPathError::new(
            input,
            format!("expected field name at byte {start}"),
        ));
    }
    Ok((input[start..cursor].to_string(), cursor))
}

fn parse_quoted_key(input: &str, start: usize) -> Result<(String, usize), JsonPathError> {
    let bytes = input.as_bytes();
    let Some(&delimiter) = bytes.get(start).filter(|byte| matches!(byte, b'\'' | b'"')) else {
        return Err(JsonPathError::new(
            input,
            format!("expected quoted key at byte {start}"),
        ));
    };

    let mut key = String::new();
    let mut chars = input[start + 1..].char_indices();
    let mut escaped = false;
    while let Some((offset, ch)) = chars.next() {
        if escaped {
            key.push(ch);
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }
        if ch == char::from(delimiter) {
            return Ok((key, start + 1 + offset + 1));
        }
        key.push(ch);
    }
    Err(JsonPathError::new(input, "unterminated quoted key"))
}

fn expect_close(input: &str, cursor: usize) -> Result<usize, JsonPathError> {
    if input.as_bytes().get(cursor) == Some(&b']') {
        Ok(cursor + 1)
    } else {
        Err(JsonPathError::new(
            input,
            format!("expected `]` at byte {cursor}"),
        ))
    }
}
