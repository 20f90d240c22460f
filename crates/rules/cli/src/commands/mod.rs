//! Subcommand implementations

pub mod check;
pub mod compile;
pub mod tokens;

use crate::error::{CliError, CliResult};
use rules_compiler::CompileError;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Policy source and a display name for error messages
pub struct Source {
    pub origin: String,
    pub text: String,
}

impl Source {
    /// Read from `path`, or from stdin when the path is absent or `-`
    pub fn read(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(p) if p != Path::new("-") => {
                let text = std::fs::read_to_string(p)?;
                Ok(Self {
                    origin: p.display().to_string(),
                    text,
                })
            }
            _ => {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text)?;
                Ok(Self {
                    origin: "<stdin>".into(),
                    text,
                })
            }
        }
    }

    pub fn error(&self, error: CompileError) -> CliError {
        CliError::Compile {
            origin: self.origin.clone(),
            error,
        }
    }
}

/// Optional input path argument shared by subcommands
pub type InputPath = Option<PathBuf>;
