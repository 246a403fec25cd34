pub mod compile;
pub mod prune;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use serde_json::{Value, json};

use crate::domain::contract::ContractBody;
use crate::io::{self, Format, IoError};

/// Structured command response that carries exit-code mapping and JSON payload.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CommandResponse {
    pub exit_code: i32,
    pub payload: Value,
}

impl CommandResponse {
    pub fn success(payload: Value) -> Self {
        Self {
            exit_code: 0,
            payload,
        }
    }
}

pub(crate) enum CommandError {
    InputUsage(String),
    Matcher(String),
    Internal(String),
}

impl From<CommandError> for CommandResponse {
    fn from(error: CommandError) -> Self {
        let (exit_code, kind, message) = match error {
            CommandError::InputUsage(message) => (3, "input_usage_error", message),
            CommandError::Matcher(message) => (3, "matcher_error", message),
            CommandError::Internal(message) => (1, "internal_error", message),
        };
        Self {
            exit_code,
            payload: json!({
                "error": kind,
                "message": message,
            }),
        }
    }
}

pub(crate) fn serialize_payload<T: Serialize>(
    value: &T,
    what: &str,
) -> Result<Value, CommandError> {
    serde_json::to_value(value)
        .map_err(|err| CommandError::Internal(format!("failed to serialize {what}: {err}")))
}

/// Reads a contract from `path`, or from stdin when the path is absent or `-`.
pub(crate) fn load_contract<R: Read>(
    path: Option<&Path>,
    from: Option<Format>,
    stdin: R,
) -> Result<ContractBody, CommandError> {
    let raw = match contract_file(path) {
        Some(path) => {
            let format = io::resolve_input_format(from, path).map_err(|err| {
                CommandError::InputUsage(format!(
                    "unable to resolve contract format from `{}`: {err}",
                    path.display()
                ))
            })?;
            let file = File::open(path).map_err(|err| {
                CommandError::InputUsage(format!(
                    "failed to open contract file `{}`: {err}",
                    path.display()
                ))
            })?;
            io::reader::read_document(file, format).map_err(map_io_as_input_usage)?
        }
        None => io::reader::read_document(stdin, from.unwrap_or(Format::Json))
            .map_err(map_io_as_input_usage)?,
    };
    serde_json::from_value(raw)
        .map_err(|err| CommandError::InputUsage(format!("invalid contract schema: {err}")))
}

fn contract_file(path: Option<&Path>) -> Option<&Path> {
    path.filter(|path| *path != Path::new("-"))
}

pub(crate) fn map_io_as_input_usage(error: IoError) -> CommandError {
    CommandError::InputUsage(error.to_string())
}
