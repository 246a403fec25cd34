pub mod error;
pub mod format;
pub mod reader;
pub mod writer;

use std::path::Path;

pub use error::IoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

/// Explicit format first, then the file extension.
pub fn resolve_input_format(explicit: Option<Format>, input: &Path) -> Result<Format, IoError> {
    if let Some(format) = explicit {
        return Ok(format);
    }
    format_from_path(input).ok_or_else(|| IoError::UnsupportedPathExtension {
        path: input.to_string_lossy().into_owned(),
    })
}

fn format_from_path(path: &Path) -> Option<Format> {
    let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
    match ext.as_str() {
        "json" => Some(Format::Json),
        "yaml" | "yml" => Some(Format::Yaml),
        _ => None,
    }
}
