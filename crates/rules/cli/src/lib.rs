//! rulesc - Command-line interface for the rules policy compiler
//!
//! This CLI lets policy authors:
//! - Compile policy sources into the JSON (or YAML) rule document
//! - Check sources for syntax and attribute errors
//! - Inspect the token stream the lexer produces

use clap::{Parser, Subcommand};
use rules_compiler::Compiler;
use std::ffi::OsString;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod output;

use commands::{check, compile, tokens};
use config::CliConfig;
pub use error::{CliError, CliResult};
pub use output::print_error;

/// rulesc CLI application
#[derive(Parser)]
#[command(name = "rulesc")]
#[command(about = "Compile access policy sources into rule documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "RULESC_CONFIG")]
    config: Option<String>,

    /// Output format (table, json, yaml)
    #[arg(short, long, default_value = "json")]
    output: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Compile a policy source into its rule document
    Compile(compile::CompileArgs),

    /// Validate a policy source without emitting it
    Check(check::CheckArgs),

    /// Print the token stream of a policy source
    Tokens(tokens::TokensArgs),

    /// Show effective configuration
    Config,
}

/// Run using the current process arguments.
pub fn run() -> CliResult<()> {
    run_with_args(std::env::args_os())
}

/// Run using the provided argument iterator.
pub fn run_with_args<I, T>(args: I) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    init_tracing(cli.verbose);

    let config = CliConfig::load(cli.config.as_deref())?;
    let compiler = Compiler::new(config.compiler.clone());

    match cli.command {
        Commands::Compile(args) => compile::execute(args, &compiler, cli.output),
        Commands::Check(args) => check::execute(args, &compiler),
        Commands::Tokens(args) => tokens::execute(args, cli.output),
        Commands::Config => {
            let rendered = match cli.output {
                output::OutputFormat::Table => output::render_toml(&config)?,
                format => output::render_single(&config, format, false)?,
            };
            println!("{}", rendered.trim_end());
            Ok(())
        }
    }
}

/// Install the stderr log subscriber, keeping stdout a clean document.
///
/// Returns false when a subscriber is already installed, as happens when
/// `run_with_args` is called more than once in a process.
fn init_tracing(verbose: bool) -> bool {
    let filter = if verbose { "debug" } else { "warn" };
    let installed = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();

    match installed {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(error = %e, "Tracing subscriber already installed, keeping it");
            false
        }
    }
}
