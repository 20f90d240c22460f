//! `rulesc tokens`: dump the lexer's token stream

use super::Source;
use std::path::PathBuf;
use crate::error::CliResult;
use crate::output::{self, OutputFormat};
use clap::Args;
use rules_compiler::{Lexer, Token, TokenKind};
use serde::Serialize;
use tabled::Tabled;

#[derive(Args)]
pub struct TokensArgs {
    /// Policy source file (stdin when omitted or `-`)
    pub file: Option<PathBuf>,

    /// Include the trailing end-of-input token
    #[arg(long)]
    pub eof: bool,
}

#[derive(Debug, Serialize, Tabled)]
struct TokenRow {
    line: usize,
    col: usize,
    kind: String,
    text: String,
}

impl From<&Token> for TokenRow {
    fn from(token: &Token) -> Self {
        Self {
            line: token.line,
            col: token.col,
            kind: format!("{:?}", token.kind),
            text: token.text.clone(),
        }
    }
}

/// Execute tokens command
pub fn execute(args: TokensArgs, format: OutputFormat) -> CliResult<()> {
    let source = Source::read(args.file.as_deref())?;
    let tokens = Lexer::new(&source.text)
        .tokenize()
        .map_err(|e| source.error(e))?;

    let rows: Vec<TokenRow> = tokens
        .iter()
        .filter(|t| args.eof || t.kind != TokenKind::Eof)
        .map(TokenRow::from)
        .collect();

    output::print_output(rows, format)
}
