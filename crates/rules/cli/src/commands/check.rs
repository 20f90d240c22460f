//! `rulesc check`: compile and report without emitting the document

use super::Source;
use std::path::PathBuf;
use crate::error::CliResult;
use crate::output;
use clap::Args;
use rules_compiler::Compiler;

#[derive(Args)]
pub struct CheckArgs {
    /// Policy source file (stdin when omitted or `-`)
    pub file: Option<PathBuf>,
}

/// Execute check command
pub fn execute(args: CheckArgs, compiler: &Compiler) -> CliResult<()> {
    let source = Source::read(args.file.as_deref())?;
    let policy = compiler
        .compile(&source.text)
        .map_err(|e| source.error(e))?;

    output::print_success(&format!(
        "{}: {} {}, {} {}",
        source.origin,
        policy.attributes.len(),
        plural(policy.attributes.len(), "attribute"),
        policy.rules.len(),
        plural(policy.rules.len(), "rule"),
    ));
    Ok(())
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        noun.to_string()
    } else {
        format!("{}s", noun)
    }
}
