use serde::Deserialize;

use crate::domain::matcher::Matcher;
use crate::domain::value::{Value, ValueError};

/// Body section of a contract as read from disk.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ContractBody {
    #[serde(default)]
    pub body: Option<serde_json::Value>,
    #[serde(default)]
    pub matchers: Vec<Matcher>,
}

impl ContractBody {
    /// Decodes the raw body, recognizing placeholder objects.
    pub fn document(&self) -> Result<Option<Value>, ValueError> {
        self.body.clone().map(Value::from_json).transpose()
    }
}
