//! Decisions produced by rules

use serde::{Deserialize, Serialize};

/// The effect a rule applies when it matches.
///
/// `Undecided` is what a rule yields when it does not match; it is also the
/// decision carried by `never`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Decision {
    Permit,
    Deny,
    #[default]
    Undecided,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Permit => write!(f, "Permit"),
            Self::Deny => write!(f, "Deny"),
            Self::Undecided => write!(f, "Undecided"),
        }
    }
}
