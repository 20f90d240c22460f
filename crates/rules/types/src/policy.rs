//! The compiled policy document

use crate::rule::Rule;
use crate::term::Term;
use serde::{Deserialize, Serialize};

/// A named value declared at the top of a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: Term,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: Term) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Output of compiling policy source: attribute declarations and rules,
/// both in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompiledPolicy {
    pub attributes: Vec<Attribute>,
    pub rules: Vec<Rule>,
}

impl CompiledPolicy {
    pub fn new(attributes: Vec<Attribute>, rules: Vec<Rule>) -> Self {
        Self { attributes, rules }
    }

    /// Look up an attribute declaration by name
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
