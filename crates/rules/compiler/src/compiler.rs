//! Compiler: turns policy source into a CompiledPolicy
//!
//! Runs the lexer and parser, resolves attribute references and
//! packages the result as the document decision engines load.

use crate::config::CompilerConfig;
use crate::errors::{CompileError, CompileResult};
use crate::parser::{ParsedPolicy, Parser};
use crate::resolver;
use rules_types::CompiledPolicy;

/// Compile policy source with the default configuration
pub fn compile(input: &str) -> CompileResult<CompiledPolicy> {
    Compiler::default().compile(input)
}

/// A configured policy compiler. Stateless between calls.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile policy source into a CompiledPolicy
    pub fn compile(&self, input: &str) -> CompileResult<CompiledPolicy> {
        let span = tracing::debug_span!("compile", bytes = input.len());
        let _guard = span.enter();

        let mut parser = Parser::new(input, self.config.max_depth)?;
        tracing::debug!(tokens = parser.token_count(), "Tokenized policy source");

        let parsed = parser.parse_policy()?;
        self.compile_parsed(parsed)
    }

    /// Compile a pre-parsed policy
    fn compile_parsed(&self, parsed: ParsedPolicy) -> CompileResult<CompiledPolicy> {
        if parsed.rules.is_empty() && !self.config.allow_empty {
            return Err(CompileError::EmptyPolicy);
        }

        resolver::resolve(&parsed)?;

        tracing::debug!(
            attributes = parsed.attributes.len(),
            rules = parsed.rules.len(),
            "Policy compiled"
        );

        Ok(CompiledPolicy::new(parsed.attributes, parsed.rules))
    }
}
