//! CLI error types

use rules_compiler::CompileError;
use thiserror::Error;

/// CLI error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Policy source failed to compile; `origin` names the file or `<stdin>`
    #[error("{origin}: {error}")]
    Compile {
        origin: String,
        #[source]
        error: CompileError,
    },
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
