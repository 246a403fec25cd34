use std::fmt;

use serde::{Deserialize, Serialize};

/// Comparison a matcher applies instead of exact equality.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchingType {
    ByEquality,
    ByType,
    ByRegex,
}

impl MatchingType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ByEquality => "by_equality",
            Self::ByType => "by_type",
            Self::ByRegex => "by_regex",
        }
    }
}

impl fmt::Display for MatchingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit override for one body path, supplied by the contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Matcher {
    pub path: String,
    #[serde(rename = "type")]
    pub matching_type: MatchingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_occurrence: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_occurrence: Option<usize>,
}

impl Matcher {
    pub fn by_equality(path: impl Into<String>) -> Self {
        Self::new(path, MatchingType::ByEquality)
    }

    pub fn by_type(path: impl Into<String>, min: Option<usize>, max: Option<usize>) -> Self {
        Self {
            min_occurrence: min,
            max_occurrence: max,
            ..Self::new(path, MatchingType::ByType)
        }
    }

    pub fn by_regex(path: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            value: Some(pattern.into()),
            ..Self::new(path, MatchingType::ByRegex)
        }
    }

    fn new(path: impl Into<String>, matching_type: MatchingType) -> Self {
        Self {
            path: path.into(),
            matching_type,
            value: None,
            min_occurrence: None,
            max_occurrence: None,
        }
    }
}
