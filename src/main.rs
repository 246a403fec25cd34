use std::env;
use std::io;
use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand, ValueEnum};
use jsonpaths::cmd::{CommandResponse, compile, prune};
use jsonpaths::config::{self, ASSERT_ARRAY_SIZE_ENV};
use jsonpaths::io::{self as jsonpaths_io, Format};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "jsonpaths",
    version,
    about = "Compile JSON bodies into path assertions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compile a contract body and its matchers into path assertions.
    Compile(CompileArgs),
    /// Print the contract body with matcher paths removed.
    Prune(PruneArgs),
}

#[derive(Debug, clap::Args)]
struct ContractArgs {
    /// Contract file; `-` or omitted reads stdin.
    #[arg(long)]
    contract: Option<PathBuf>,

    #[arg(long, value_enum)]
    from: Option<CliFormat>,
}

#[derive(Debug, clap::Args)]
struct CompileArgs {
    #[command(flatten)]
    source: ContractArgs,

    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, action = clap::ArgAction::Set)]
    assert_array_size: Option<bool>,
}

#[derive(Debug, clap::Args)]
struct PruneArgs {
    #[command(flatten)]
    source: ContractArgs,

    #[arg(long, value_enum)]
    to: Option<CliFormat>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    Json,
    Yaml,
}

impl From<CliFormat> for Format {
    fn from(value: CliFormat) -> Self {
        match value {
            CliFormat::Json => Self::Json,
            CliFormat::Yaml => Self::Yaml,
        }
    }
}

#[derive(Serialize)]
struct CliError<'a> {
    error: &'a str,
    message: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    process::exit(run());
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => return handle_parse_error(error),
    };

    match cli.command {
        Commands::Compile(args) => run_compile(args),
        Commands::Prune(args) => run_prune(args),
    }
}

fn handle_parse_error(error: clap::Error) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{error}");
            0
        }
        _ => {
            emit_error("input_usage_error", error.to_string());
            3
        }
    }
}

fn run_compile(args: CompileArgs) -> i32 {
    let size_override = match env::var(ASSERT_ARRAY_SIZE_ENV) {
        Ok(raw) => match config::parse_override(&raw) {
            Ok(enabled) => Some(enabled),
            Err(error) => {
                emit_error("input_usage_error", error.to_string());
                return 3;
            }
        },
        Err(_) => None,
    };
    let command_args = compile::CompileCommandArgs {
        contract: args.source.contract,
        from: args.source.from.map(Into::into),
        config: args.config,
        assert_array_size: args.assert_array_size,
        size_override,
    };

    let stdin = io::stdin();
    let response = compile::run_with_stdin(&command_args, stdin.lock());
    finish(response, Format::Json, "compile")
}

fn run_prune(args: PruneArgs) -> i32 {
    let output_format = args.to.map(Into::into).unwrap_or(Format::Json);
    let command_args = prune::PruneCommandArgs {
        contract: args.source.contract,
        from: args.source.from.map(Into::into),
    };

    let stdin = io::stdin();
    let response = prune::run_with_stdin(&command_args, stdin.lock());
    finish(response, output_format, "prune")
}

fn finish(response: CommandResponse, format: Format, command: &str) -> i32 {
    match response.exit_code {
        0 => {
            let stdout = io::stdout();
            match jsonpaths_io::writer::write_document(stdout.lock(), format, &response.payload) {
                Ok(()) => 0,
                Err(error) => {
                    emit_error(
                        "internal_error",
                        format!("failed to write {command} output: {error}"),
                    );
                    1
                }
            }
        }
        3 | 1 => {
            if emit_json_stderr(&response.payload) {
                response.exit_code
            } else {
                emit_error(
                    "internal_error",
                    format!("failed to serialize {command} error"),
                );
                1
            }
        }
        other => {
            emit_error(
                "internal_error",
                format!("unexpected {command} exit code: {other}"),
            );
            1
        }
    }
}

fn emit_json_stderr(value: &Value) -> bool {
    match serde_json::to_string(value) {
        Ok(serialized) => {
            eprintln!("{serialized}");
            true
        }
        Err(_) => false,
    }
}

fn emit_error(error: &'static str, message: String) {
    let payload = CliError { error, message };
    match serde_json::to_string(&payload) {
        Ok(serialized) => eprintln!("{serialized}"),
        Err(_) => eprintln!(
            "{{\"error\":\"internal_error\",\"message\":\"failed to serialize error\"}}"
        ),
    }
}
