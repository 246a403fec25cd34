use std::io::Read;
use std::path::PathBuf;

use tracing::debug;

use crate::cmd::{CommandError, CommandResponse, load_contract, serialize_payload};
use crate::config::{self, CompilerConfig};
use crate::domain::error::CompileError;
use crate::engine::{self, CompileOptions};
use crate::io::Format;

/// Input arguments for compile command execution API.
#[derive(Debug, Clone, Default)]
pub struct CompileCommandArgs {
    pub contract: Option<PathBuf>,
    pub from: Option<Format>,
    pub config: Option<PathBuf>,
    /// Replaces the configured `assert_array_size` value.
    pub assert_array_size: Option<bool>,
    /// Process-wide switch, usually taken from the environment.
    pub size_override: Option<bool>,
}

pub fn run_with_stdin<R: Read>(args: &CompileCommandArgs, stdin: R) -> CommandResponse {
    match execute(args, stdin) {
        Ok(payload) => CommandResponse::success(payload),
        Err(error) => error.into(),
    }
}

fn execute<R: Read>(args: &CompileCommandArgs, stdin: R) -> Result<serde_json::Value, CommandError> {
    let options = CompileOptions {
        config: resolve_config(args)?,
        size_override: args.size_override,
    };
    let contract = load_contract(args.contract.as_deref(), args.from, stdin)?;
    let body = contract
        .document()
        .map_err(|err| CommandError::InputUsage(format!("invalid contract body: {err}")))?;
    let compiled = engine::compile_body(body.as_ref(), &contract.matchers, options)
        .map_err(map_compile_error)?;
    serialize_payload(&compiled, "compiled body")
}

fn resolve_config(args: &CompileCommandArgs) -> Result<CompilerConfig, CommandError> {
    let mut config = match &args.config {
        Some(path) => config::load_config(path)
            .map_err(|err| CommandError::InputUsage(err.to_string()))?,
        None => CompilerConfig::default(),
    };
    if let Some(enabled) = args.assert_array_size {
        config.assert_array_size = enabled;
    }
    Ok(config)
}

/// Every matcher failure is a `matcher_error`, whether the matcher is
/// misconfigured or its path misses the body.
fn map_compile_error(error: CompileError) -> CommandError {
    let CompileError::Matcher { path, source } = &error;
    debug!(
        path = %path,
        configuration = source.is_configuration(),
        "matcher compilation failed"
    );
    CommandError::Matcher(error.to_string())
}
