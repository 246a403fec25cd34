use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde_json::{Map, Number};
use thiserror::Error;

pub const REGEX_KEY: &str = "$regex";
pub const OPTIONAL_KEY: &str = "$optional";
pub const TEMPLATE_KEY: &str = "$template";
pub const DEFERRED_KEY: &str = "$deferred";

/// Body document node: plain JSON plus the contract placeholder kinds.
///
/// Placeholders are leaves. Nothing in the crate descends into them even
/// though their wire encoding is a single-key object.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
    /// Value must match the pattern.
    Pattern(RegexPattern),
    /// Value must match the pattern or be absent.
    Optional(RegexPattern),
    /// String with dynamic parts, checked through an equivalent regex.
    Template(Template),
    /// Checked by code supplied elsewhere; never asserted directly.
    Deferred(DeferredValue),
}

impl Value {
    /// Decodes a plain JSON document, turning `$regex`, `$optional`,
    /// `$template` and `$deferred` objects into placeholders.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ValueError> {
        Ok(match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(flag) => Self::Bool(flag),
            serde_json::Value::Number(number) => Self::Number(number),
            serde_json::Value::String(text) => Self::String(text),
            serde_json::Value::Array(items) => Self::Array(
                items
                    .into_iter()
                    .map(Self::from_json)
                    .collect::<Result<_, _>>()?,
            ),
            serde_json::Value::Object(map) => match placeholder_key(&map) {
                Some(key) => decode_placeholder(key, map)?,
                None => Self::Object(
                    map.into_iter()
                        .map(|(key, child)| Ok((key, Self::from_json(child)?)))
                        .collect::<Result<_, ValueError>>()?,
                ),
            },
        })
    }

    /// Renders back to the plain JSON encoding accepted by [`Value::from_json`].
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(flag) => serde_json::Value::Bool(*flag),
            Self::Number(number) => serde_json::Value::Number(number.clone()),
            Self::String(text) => serde_json::Value::String(text.clone()),
            Self::Array(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(key, child)| (key.clone(), child.to_json()))
                    .collect(),
            ),
            Self::Pattern(pattern) => single_entry(REGEX_KEY, pattern.as_str().into()),
            Self::Optional(pattern) => single_entry(OPTIONAL_KEY, pattern.as_str().into()),
            Self::Template(template) => single_entry(
                TEMPLATE_KEY,
                serde_json::Value::Array(template.parts.iter().map(TemplatePart::to_json).collect()),
            ),
            Self::Deferred(deferred) => single_entry(DEFERRED_KEY, deferred.expression.clone().into()),
        }
    }

    pub fn pattern(source: &str) -> Result<Self, ValueError> {
        RegexPattern::new(source).map(Self::Pattern)
    }

    pub fn optional(source: &str) -> Result<Self, ValueError> {
        RegexPattern::new(source).map(Self::Optional)
    }

    pub fn deferred(expression: impl Into<String>) -> Self {
        Self::Deferred(DeferredValue::new(expression))
    }

    /// Anything that is not an array or an object, placeholders included.
    pub fn is_primitive(&self) -> bool {
        !self.is_container()
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Object(_))
    }

    /// String, number or boolean.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::String(_) | Self::Number(_) | Self::Bool(_))
    }

    pub fn is_empty_container(&self) -> bool {
        match self {
            Self::Array(items) => items.is_empty(),
            Self::Object(map) => map.is_empty(),
            _ => false,
        }
    }

    /// Children of a container; empty for leaves.
    pub fn children(&self) -> Vec<&Value> {
        match self {
            Self::Array(items) => items.iter().collect(),
            Self::Object(map) => map.values().collect(),
            _ => Vec::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Pattern(_) => "regex",
            Self::Optional(_) => "optional",
            Self::Template(_) => "template",
            Self::Deferred(_) => "deferred",
        }
    }
}

impl From<serde_json::Number> for Value {
    fn from(number: serde_json::Number) -> Self {
        Self::Number(number)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::String(text.to_string())
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Self::Bool(flag)
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Self::Number(number.into())
    }
}

/// Compiled regular expression that remembers its source.
#[derive(Debug, Clone)]
pub struct RegexPattern {
    regex: Regex,
}

impl RegexPattern {
    pub fn new(source: &str) -> Result<Self, ValueError> {
        let regex = Regex::new(source).map_err(|source_error| ValueError::InvalidPattern {
            pattern: source.to_string(),
            source: source_error,
        })?;
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Pattern accepting either a match or nothing: `(source)?`.
    pub fn optional_source(&self) -> String {
        format!("({})?", self.as_str())
    }
}

impl PartialEq for RegexPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Display for RegexPattern {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    parts: Vec<TemplatePart>,
}

impl Template {
    pub fn new(parts: Vec<TemplatePart>) -> Self {
        Self { parts }
    }

    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Literal(String),
    Dynamic(RegexPattern),
}

impl TemplatePart {
    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Literal(text) => serde_json::Value::String(text.clone()),
            Self::Dynamic(pattern) => single_entry(REGEX_KEY, pattern.as_str().into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredValue {
    expression: String,
}

impl DeferredValue {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }
}

#[derive(Debug, Error)]
pub enum ValueError {
    #[error("invalid regex `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("malformed `{key}` placeholder: {reason}")]
    MalformedPlaceholder { key: &'static str, reason: String },
}

fn placeholder_key(map: &Map<String, serde_json::Value>) -> Option<&'static str> {
    if map.len() != 1 {
        return None;
    }
    let key = map.keys().next()?;
    [REGEX_KEY, OPTIONAL_KEY, TEMPLATE_KEY, DEFERRED_KEY]
        .into_iter()
        .find(|candidate| *candidate == key.as_str())
}

fn decode_placeholder(
    key: &'static str,
    mut map: Map<String, serde_json::Value>,
) -> Result<Value, ValueError> {
    let payload = map.remove(key).unwrap_or(serde_json::Value::Null);
    match key {
        REGEX_KEY => Value::pattern(expect_string(key, &payload)?),
        OPTIONAL_KEY => Value::optional(expect_string(key, &payload)?),
        DEFERRED_KEY => Ok(Value::deferred(expect_string(key, &payload)?)),
        _ => {
            let serde_json::Value::Array(items) = payload else {
                return Err(ValueError::MalformedPlaceholder {
                    key,
                    reason: "expected an array of parts".to_string(),
                });
            };
            let parts = items
                .into_iter()
                .map(decode_template_part)
                .collect::<Result<_, _>>()?;
            Ok(Value::Template(Template::new(parts)))
        }
    }
}

fn decode_template_part(part: serde_json::Value) -> Result<TemplatePart, ValueError> {
    match part {
        serde_json::Value::String(text) => Ok(TemplatePart::Literal(text)),
        serde_json::Value::Object(map) if placeholder_key(&map) == Some(REGEX_KEY) => {
            let source = map.get(REGEX_KEY).unwrap_or(&serde_json::Value::Null);
            RegexPattern::new(expect_string(REGEX_KEY, source)?).map(TemplatePart::Dynamic)
        }
        other => Err(ValueError::MalformedPlaceholder {
            key: TEMPLATE_KEY,
            reason: format!("unsupported template part `{other}`"),
        }),
    }
}

fn expect_string<'a>(
    key: &'static str,
    payload: &'a serde_json::Value,
) -> Result<&'a str, ValueError> {
    payload
        .as_str()
        .ok_or_else(|| ValueError::MalformedPlaceholder {
            key,
            reason: "expected a string".to_string(),
        })
}

fn single_entry(key: &str, value: serde_json::Value) -> serde_json::Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    serde_json::Value::Object(map)
}
