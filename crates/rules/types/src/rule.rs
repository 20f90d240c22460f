//! Rules: decision units and their combinators

use crate::condition::Condition;
use crate::decision::Decision;
use serde::{Deserialize, Serialize};

/// A single decision rule.
///
/// Combinators (`majority`, `all`, `any`, `one-of`) hold their sub-rules in
/// source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Rule {
    /// Matches unconditionally
    Always { decision: Decision },
    /// Never matches
    Never {
        #[serde(default)]
        decision: Decision,
    },
    When {
        condition: Condition,
        decision: Decision,
    },
    Branch {
        condition: Condition,
        #[serde(rename = "true")]
        then: Box<Rule>,
        #[serde(rename = "false")]
        otherwise: Box<Rule>,
    },
    Majority { decision: Decision, rules: Vec<Rule> },
    All { decision: Decision, rules: Vec<Rule> },
    Any { decision: Decision, rules: Vec<Rule> },
    /// Exactly one sub-rule may decide
    OneOf { rules: Vec<Rule> },
}

impl Rule {
    pub fn always(decision: Decision) -> Self {
        Self::Always { decision }
    }

    pub fn never() -> Self {
        Self::Never {
            decision: Decision::Undecided,
        }
    }

    pub fn when(condition: Condition, decision: Decision) -> Self {
        Self::When {
            condition,
            decision,
        }
    }

    pub fn branch(condition: Condition, then: Rule, otherwise: Rule) -> Self {
        Self::Branch {
            condition,
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    pub fn majority(decision: Decision, rules: Vec<Rule>) -> Self {
        Self::Majority { decision, rules }
    }

    pub fn all(decision: Decision, rules: Vec<Rule>) -> Self {
        Self::All { decision, rules }
    }

    pub fn any(decision: Decision, rules: Vec<Rule>) -> Self {
        Self::Any { decision, rules }
    }

    pub fn one_of(rules: Vec<Rule>) -> Self {
        Self::OneOf { rules }
    }

    /// Wire tag of this rule
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Always { .. } => "always",
            Self::Never { .. } => "never",
            Self::When { .. } => "when",
            Self::Branch { .. } => "branch",
            Self::Majority { .. } => "majority",
            Self::All { .. } => "all",
            Self::Any { .. } => "any",
            Self::OneOf { .. } => "one-of",
        }
    }

    pub fn visit_attributes<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        match self {
            Self::Always { .. } | Self::Never { .. } => {}
            Self::When { condition, .. } => condition.visit_attributes(f),
            Self::Branch {
                condition,
                then,
                otherwise,
            } => {
                condition.visit_attributes(f);
                then.visit_attributes(f);
                otherwise.visit_attributes(f);
            }
            Self::Majority { rules, .. }
            | Self::All { rules, .. }
            | Self::Any { rules, .. }
            | Self::OneOf { rules } => {
                for rule in rules {
                    rule.visit_attributes(f);
                }
            }
        }
    }
}
