//! Rules Compiler
//!
//! Compiles the rules policy language into a [`CompiledPolicy`].
//!
//! # Language
//!
//! ```text
//! # attribute declarations come first
//! user   = request "user"
//! limit  = 100
//! status = GET "http://auth.local/status" user=user
//!
//! # then rules, in order
//! deny when status != "active"
//! if limit > 50 always permit else deny when user = "guest"
//! majority permit {
//!     permit when limit > 10,
//!     deny when limit <= 10,
//!     always permit
//! }
//! ```
//!
//! # Usage
//!
//! ```rust
//! use rules_compiler::compile;
//! use rules_types::{Decision, Rule};
//!
//! let policy = compile("always permit").unwrap();
//! assert!(policy.attributes.is_empty());
//! assert_eq!(policy.rules, vec![Rule::always(Decision::Permit)]);
//! ```

#![deny(unsafe_code)]

mod compiler;
mod config;
mod errors;
mod lexer;
mod parser;
mod resolver;

pub use compiler::{compile, Compiler};
pub use config::CompilerConfig;
pub use errors::{CompileError, CompileResult};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{ParsedPolicy, Parser, DEFAULT_MAX_DEPTH};
pub use resolver::resolve;
pub use rules_types::CompiledPolicy;
