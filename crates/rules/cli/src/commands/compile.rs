//! `rulesc compile`: emit the compiled policy document

use super::Source;
use crate::error::CliResult;
use crate::output::{self, OutputFormat};
use clap::Args;
use rules_compiler::Compiler;
use std::path::PathBuf;

#[derive(Args)]
pub struct CompileArgs {
    /// Policy source file (stdin when omitted or `-`)
    pub file: Option<PathBuf>,

    /// Write the document to a file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Emit JSON on a single line
    #[arg(long)]
    pub compact: bool,
}

/// Execute compile command
pub fn execute(args: CompileArgs, compiler: &Compiler, format: OutputFormat) -> CliResult<()> {
    let source = Source::read(args.file.as_deref())?;
    let policy = compiler
        .compile(&source.text)
        .map_err(|e| source.error(e))?;

    tracing::info!(
        origin = %source.origin,
        attributes = policy.attributes.len(),
        rules = policy.rules.len(),
        "Compiled policy"
    );

    let mut rendered = output::render_single(&policy, format, args.compact)?;
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }

    match args.out {
        Some(path) => std::fs::write(path, rendered)?,
        None => print!("{}", rendered),
    }
    Ok(())
}
