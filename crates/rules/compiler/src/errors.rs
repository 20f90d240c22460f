//! Compiler error types

/// Errors that can occur while lexing, parsing or resolving policy source
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("Parse error at line {line}, column {col}: {message}")]
    Parse {
        line: usize,
        col: usize,
        message: String,
    },

    #[error("Unexpected token at line {line}, column {col}: expected {expected}, found '{found}'")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: usize,
        col: usize,
    },

    #[error("Unexpected end of input: expected {0}")]
    UnexpectedEof(String),

    #[error("Invalid number '{text}' at line {line}, column {col}")]
    InvalidNumber {
        text: String,
        line: usize,
        col: usize,
    },

    #[error("Nesting deeper than {limit} levels at line {line}, column {col}")]
    NestingTooDeep {
        limit: usize,
        line: usize,
        col: usize,
    },

    #[error("Policy declares no rules")]
    EmptyPolicy,

    #[error("Unknown attribute: '{0}'")]
    UnknownAttribute(String),

    #[error("Duplicate attribute: '{0}'")]
    DuplicateAttribute(String),

    #[error("Cyclic attribute definition: {0}")]
    CyclicAttribute(String),
}

impl CompileError {
    /// Source position (line, column) of the offending input, when known
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            Self::Parse { line, col, .. }
            | Self::UnexpectedToken { line, col, .. }
            | Self::InvalidNumber { line, col, .. }
            | Self::NestingTooDeep { line, col, .. } => Some((*line, *col)),
            _ => None,
        }
    }
}

/// Result type alias for compiler operations
pub type CompileResult<T> = Result<T, CompileError>;
