//! Rules Types - policy AST and compiled policy document
//!
//! The rules language describes access decisions as a list of attribute
//! declarations followed by a list of rules. The compiler produces a
//! [`CompiledPolicy`], which serialises to the document consumed by
//! decision engines:
//!
//! ```json
//! {
//!   "attributes": [],
//!   "rules": [{ "type": "always", "decision": "Permit" }]
//! }
//! ```
//!
//! Every node is internally tagged by a `type` field. Attribute references
//! are kept by name; resolution happens in the compiler.

#![deny(unsafe_code)]

mod condition;
mod decision;
mod policy;
mod rule;
mod term;

pub use condition::Condition;
pub use decision::Decision;
pub use policy::{Attribute, CompiledPolicy};
pub use rule::Rule;
pub use term::{Operator, RestMethod, Term, ValueType};
