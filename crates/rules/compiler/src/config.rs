//! Compiler configuration

use crate::parser::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};

/// Knobs for a [`Compiler`](crate::Compiler)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Maximum nesting of rules, conditions and terms
    pub max_depth: usize,

    /// Accept source that declares no rules
    pub allow_empty: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            allow_empty: false,
        }
    }
}

impl CompilerConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }
}
