//! Boolean conditions over terms

use crate::term::Term;
use serde::{Deserialize, Serialize};

/// A boolean condition.
///
/// Only equality and ordering are primitive; `!=`, `<`, `<=` and `>=` are
/// expressed through `Not`, `Or` and operand swapping by the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Condition {
    Not { condition: Box<Condition> },
    And { lhs: Box<Condition>, rhs: Box<Condition> },
    Or { lhs: Box<Condition>, rhs: Box<Condition> },
    Equal { lhs: Term, rhs: Term },
    Greater { lhs: Term, rhs: Term },
}

impl Condition {
    #[allow(clippy::should_implement_trait)]
    pub fn not(condition: Condition) -> Self {
        Self::Not {
            condition: Box::new(condition),
        }
    }

    pub fn and(lhs: Condition, rhs: Condition) -> Self {
        Self::And {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn or(lhs: Condition, rhs: Condition) -> Self {
        Self::Or {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn equal(lhs: Term, rhs: Term) -> Self {
        Self::Equal { lhs, rhs }
    }

    pub fn greater(lhs: Term, rhs: Term) -> Self {
        Self::Greater { lhs, rhs }
    }

    pub fn visit_attributes<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        match self {
            Self::Not { condition } => condition.visit_attributes(f),
            Self::And { lhs, rhs } | Self::Or { lhs, rhs } => {
                lhs.visit_attributes(f);
                rhs.visit_attributes(f);
            }
            Self::Equal { lhs, rhs } | Self::Greater { lhs, rhs } => {
                lhs.visit_attributes(f);
                rhs.visit_attributes(f);
            }
        }
    }
}
