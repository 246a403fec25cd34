use std::io::Read;
use std::path::PathBuf;

use crate::cmd::{CommandError, CommandResponse, load_contract};
use crate::engine::prune;
use crate::io::Format;

/// Input arguments for prune command execution API.
#[derive(Debug, Clone, Default)]
pub struct PruneCommandArgs {
    pub contract: Option<PathBuf>,
    pub from: Option<Format>,
}

/// Responds with the contract body after matcher paths have been removed.
pub fn run_with_stdin<R: Read>(args: &PruneCommandArgs, stdin: R) -> CommandResponse {
    match execute(args, stdin) {
        Ok(payload) => CommandResponse::success(payload),
        Err(error) => error.into(),
    }
}

fn execute<R: Read>(args: &PruneCommandArgs, stdin: R) -> Result<serde_json::Value, CommandError> {
    let contract = load_contract(args.contract.as_deref(), args.from, stdin)?;
    let Some(body) = contract
        .document()
        .map_err(|err| CommandError::InputUsage(format!("invalid contract body: {err}")))?
    else {
        return Err(CommandError::InputUsage(
            "contract has no body to prune".to_string(),
        ));
    };
    let pruned = prune::remove_matching_paths(&body, &contract.matchers);
    Ok(pruned.document.to_json())
}
