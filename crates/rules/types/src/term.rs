//! Terms: the value expressions used by attributes and conditions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Binary operators over terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operator {
    Plus,
    Minus,
    Multiply,
    Divide,
    Regex,
}

impl Operator {
    /// Source-level symbol for the operator
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Regex => "~=",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plus => write!(f, "PLUS"),
            Self::Minus => write!(f, "MINUS"),
            Self::Multiply => write!(f, "MULTIPLY"),
            Self::Divide => write!(f, "DIVIDE"),
            Self::Regex => write!(f, "REGEX"),
        }
    }
}

/// Target type of a coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValueType {
    String,
    Number,
}

/// HTTP method used by a REST term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RestMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// A value expression.
///
/// On the wire, literals and references are tagged by kind (`string`,
/// `number`, `attribute`, `request`, `rest`, `coerce`) while binary
/// expressions are tagged by their operator name (`PLUS`, `REGEX`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "TermRepr", from = "TermRepr")]
pub enum Term {
    String(String),
    Number(i64),
    /// Reference to a declared attribute, by name
    Attribute(String),
    /// Value of a request parameter, looked up at evaluation time
    Request(String),
    /// Result of an HTTP call; params map query names to attribute names
    Rest {
        url: String,
        method: RestMethod,
        params: BTreeMap<String, String>,
    },
    Coerce {
        from: Box<Term>,
        to: ValueType,
    },
    Expr {
        lhs: Box<Term>,
        op: Operator,
        rhs: Box<Term>,
    },
}

impl Term {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn number(value: i64) -> Self {
        Self::Number(value)
    }

    pub fn attribute(name: impl Into<String>) -> Self {
        Self::Attribute(name.into())
    }

    pub fn request(key: impl Into<String>) -> Self {
        Self::Request(key.into())
    }

    pub fn coerce(from: Term, to: ValueType) -> Self {
        Self::Coerce {
            from: Box::new(from),
            to,
        }
    }

    pub fn expr(lhs: Term, op: Operator, rhs: Term) -> Self {
        Self::Expr {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        }
    }

    /// Call `f` with every attribute name this term refers to, including
    /// REST parameter bindings.
    pub fn visit_attributes<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        match self {
            Self::String(_) | Self::Number(_) | Self::Request(_) => {}
            Self::Attribute(name) => f(name),
            Self::Rest { params, .. } => params.values().for_each(|name| f(name)),
            Self::Coerce { from, .. } => from.visit_attributes(f),
            Self::Expr { lhs, rhs, .. } => {
                lhs.visit_attributes(f);
                rhs.visit_attributes(f);
            }
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type")]
enum TermRepr {
    #[serde(rename = "string")]
    String { value: String },
    #[serde(rename = "number")]
    Number { value: i64 },
    #[serde(rename = "attribute")]
    Attribute { name: String },
    #[serde(rename = "request")]
    Request { key: String },
    #[serde(rename = "rest")]
    Rest {
        url: String,
        method: RestMethod,
        params: BTreeMap<String, String>,
    },
    #[serde(rename = "coerce")]
    Coerce { from: Box<Term>, to: ValueType },
    #[serde(rename = "PLUS")]
    Plus { lhs: Box<Term>, rhs: Box<Term> },
    #[serde(rename = "MINUS")]
    Minus { lhs: Box<Term>, rhs: Box<Term> },
    #[serde(rename = "MULTIPLY")]
    Multiply { lhs: Box<Term>, rhs: Box<Term> },
    #[serde(rename = "DIVIDE")]
    Divide { lhs: Box<Term>, rhs: Box<Term> },
    #[serde(rename = "REGEX")]
    Regex { lhs: Box<Term>, rhs: Box<Term> },
}

impl From<Term> for TermRepr {
    fn from(term: Term) -> Self {
        match term {
            Term::String(value) => Self::String { value },
            Term::Number(value) => Self::Number { value },
            Term::Attribute(name) => Self::Attribute { name },
            Term::Request(key) => Self::Request { key },
            Term::Rest {
                url,
                method,
                params,
            } => Self::Rest {
                url,
                method,
                params,
            },
            Term::Coerce { from, to } => Self::Coerce { from, to },
            Term::Expr { lhs, op, rhs } => match op {
                Operator::Plus => Self::Plus { lhs, rhs },
                Operator::Minus => Self::Minus { lhs, rhs },
                Operator::Multiply => Self::Multiply { lhs, rhs },
                Operator::Divide => Self::Divide { lhs, rhs },
                Operator::Regex => Self::Regex { lhs, rhs },
            },
        }
    }
}

impl From<TermRepr> for Term {
    fn from(repr: TermRepr) -> Self {
        let expr = |lhs, op, rhs| Term::Expr { lhs, op, rhs };
        match repr {
            TermRepr::String { value } => Term::String(value),
            TermRepr::Number { value } => Term::Number(value),
            TermRepr::Attribute { name } => Term::Attribute(name),
            TermRepr::Request { key } => Term::Request(key),
            TermRepr::Rest {
                url,
                method,
                params,
            } => Term::Rest {
                url,
                method,
                params,
            },
            TermRepr::Coerce { from, to } => Term::Coerce { from, to },
            TermRepr::Plus { lhs, rhs } => expr(lhs, Operator::Plus, rhs),
            TermRepr::Minus { lhs, rhs } => expr(lhs, Operator::Minus, rhs),
            TermRepr::Multiply { lhs, rhs } => expr(lhs, Operator::Multiply, rhs),
            TermRepr::Divide { lhs, rhs } => expr(lhs, Operator::Divide, rhs),
            TermRepr::Regex { lhs, rhs } => expr(lhs, Operator::Regex, rhs),
        }
    }
}
