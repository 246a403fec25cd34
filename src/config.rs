use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable that can switch array size assertions off process-wide.
pub const ASSERT_ARRAY_SIZE_ENV: &str = "JSONPATHS_ASSERT_ARRAY_SIZE";

/// Compiler settings read from the `[compiler]` table of a TOML file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Emit `size() == n` checks for concrete arrays and the root.
    pub assert_array_size: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            assert_array_size: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    compiler: CompilerConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file `{path}`: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file `{path}`: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid boolean `{raw}` for {name}")]
    InvalidOverride { name: &'static str, raw: String },
}

pub fn load_config(path: &Path) -> Result<CompilerConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    Ok(parsed.compiler)
}

/// Parses the value of [`ASSERT_ARRAY_SIZE_ENV`].
pub fn parse_override(raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidOverride {
            name: ASSERT_ARRAY_SIZE_ENV,
            raw: raw.to_string(),
        }),
    }
}

/// An explicit `false` override always wins over the configured value.
pub fn size_assertions_enabled(config: &CompilerConfig, size_override: Option<bool>) -> bool {
    config.assert_array_size && size_override.unwrap_or(true)
}
