//! Parser: recursive descent parser for policy source
//!
//! Consumes tokens from the lexer and produces a ParsedPolicy whose
//! attribute references are still unchecked names. The resolver
//! validates them before the compiler hands out a CompiledPolicy.
//!
//! Precedence, loosest first: `or`, `and`, `not`, comparisons, `~=`,
//! `+`/`-`, `*`/`/`, coercions. A `(` where a condition may start is first
//! read as a grouped condition; if that fails, or a term operator follows
//! the closing `)`, the parser rewinds and reads a comparison whose left
//! term is parenthesised.
//!
//! Every recursive descent and every chained binary operator counts
//! against the depth limit, so no tree the parser builds is deeper than
//! `max_depth`.

use crate::errors::{CompileError, CompileResult};
use crate::lexer::{Lexer, Token, TokenKind};
use rules_types::{Attribute, Condition, Decision, Operator, RestMethod, Rule, Term, ValueType};
use std::collections::BTreeMap;

/// Default bound on rule/condition/term nesting
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Parsed policy with unresolved attribute references
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedPolicy {
    /// Attribute declarations, in source order
    pub attributes: Vec<Attribute>,
    /// Top-level rules, in source order
    pub rules: Vec<Rule>,
}

/// Parser for policy source
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    /// Tokenize `input` and prepare a parser over it
    pub fn new(input: &str, max_depth: usize) -> CompileResult<Self> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Self {
            tokens,
            pos: 0,
            depth: 0,
            max_depth,
        })
    }

    /// Parse a whole policy: attribute declarations followed by rules
    pub fn parse(input: &str) -> CompileResult<ParsedPolicy> {
        Self::new(input, DEFAULT_MAX_DEPTH)?.parse_policy()
    }

    /// Parse a single term, e.g. `3 + foo * 6`
    pub fn parse_term(input: &str) -> CompileResult<Term> {
        let mut parser = Self::new(input, DEFAULT_MAX_DEPTH)?;
        let term = parser.term()?;
        parser.expect_end()?;
        Ok(term)
    }

    /// Parse a single condition, e.g. `foo = 1 and bar > 2`
    pub fn parse_condition(input: &str) -> CompileResult<Condition> {
        let mut parser = Self::new(input, DEFAULT_MAX_DEPTH)?;
        let condition = parser.condition()?;
        parser.expect_end()?;
        Ok(condition)
    }

    /// Parse a single rule, e.g. `permit when a = b`
    pub fn parse_rule(input: &str) -> CompileResult<Rule> {
        let mut parser = Self::new(input, DEFAULT_MAX_DEPTH)?;
        let rule = parser.rule()?;
        parser.expect_end()?;
        Ok(rule)
    }

    /// Number of tokens, including the trailing end-of-input marker
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn parse_policy(&mut self) -> CompileResult<ParsedPolicy> {
        let mut policy = ParsedPolicy {
            attributes: Vec::new(),
            rules: Vec::new(),
        };

        while !self.check(TokenKind::Eof) {
            if self.check(TokenKind::Identifier) {
                if !policy.rules.is_empty() {
                    let tok = self.peek();
                    return Err(CompileError::Parse {
                        line: tok.line,
                        col: tok.col,
                        message: format!(
                            "Attribute '{}' declared after rules; declarations must come first",
                            tok.text
                        ),
                    });
                }
                let attribute = self.attribute()?;
                policy.attributes.push(attribute);
            } else {
                let rule = self.rule()?;
                policy.rules.push(rule);
            }
        }

        Ok(policy)
    }

    // ── Declarations ─────────────────────────────────────────────────

    fn attribute(&mut self) -> CompileResult<Attribute> {
        // name = term
        let name = self.expect_identifier()?;
        self.expect(TokenKind::Equals)?;
        let value = self.term()?;
        Ok(Attribute::new(name, value))
    }

    // ── Rules ────────────────────────────────────────────────────────

    fn rule(&mut self) -> CompileResult<Rule> {
        self.nested(|p| match p.peek_kind() {
            TokenKind::Always => {
                p.advance();
                Ok(Rule::always(p.decision()?))
            }
            TokenKind::Never => {
                p.advance();
                Ok(Rule::never())
            }
            TokenKind::Permit | TokenKind::Deny => {
                let decision = p.decision()?;
                p.expect(TokenKind::When)?;
                let condition = p.condition()?;
                Ok(Rule::when(condition, decision))
            }
            TokenKind::If => {
                p.advance();
                let condition = p.condition()?;
                let then = p.rule()?;
                let otherwise = if p.check(TokenKind::Else) {
                    p.advance();
                    p.rule()?
                } else {
                    Rule::never()
                };
                Ok(Rule::branch(condition, then, otherwise))
            }
            TokenKind::Majority => {
                p.advance();
                let decision = p.decision()?;
                Ok(Rule::majority(decision, p.rule_block()?))
            }
            TokenKind::Any => {
                p.advance();
                let decision = p.decision()?;
                Ok(Rule::any(decision, p.rule_block()?))
            }
            TokenKind::All => {
                p.advance();
                let decision = p.decision()?;
                Ok(Rule::all(decision, p.rule_block()?))
            }
            TokenKind::Exclusive => {
                p.advance();
                Ok(Rule::one_of(p.rule_block()?))
            }
            _ => Err(p.unexpected("rule")),
        })
    }

    fn rule_block(&mut self) -> CompileResult<Vec<Rule>> {
        // { rule, rule, ... }
        self.expect(TokenKind::OpenBrace)?;

        let mut rules = vec![self.rule()?];
        while self.check(TokenKind::Comma) {
            self.advance();
            if self.check(TokenKind::CloseBrace) {
                break;
            }
            rules.push(self.rule()?);
        }

        self.expect(TokenKind::CloseBrace)?;
        Ok(rules)
    }

    fn decision(&mut self) -> CompileResult<Decision> {
        match self.peek_kind() {
            TokenKind::Permit => {
                self.advance();
                Ok(Decision::Permit)
            }
            TokenKind::Deny => {
                self.advance();
                Ok(Decision::Deny)
            }
            _ => Err(self.unexpected("decision (permit or deny)")),
        }
    }

    // ── Conditions ───────────────────────────────────────────────────

    fn condition(&mut self) -> CompileResult<Condition> {
        self.nested(|p| {
            let mut lhs = p.conjunction()?;
            while p.check(TokenKind::Or) {
                p.deepen()?;
                p.advance();
                let rhs = p.conjunction()?;
                lhs = Condition::or(lhs, rhs);
            }
            Ok(lhs)
        })
    }

    fn conjunction(&mut self) -> CompileResult<Condition> {
        self.scoped(|p| {
            let mut lhs = p.negation()?;
            while p.check(TokenKind::And) {
                p.deepen()?;
                p.advance();
                let rhs = p.negation()?;
                lhs = Condition::and(lhs, rhs);
            }
            Ok(lhs)
        })
    }

    fn negation(&mut self) -> CompileResult<Condition> {
        match self.peek_kind() {
            TokenKind::Not => {
                self.advance();
                let inner = self.nested(|p| p.negation())?;
                Ok(Condition::not(inner))
            }
            TokenKind::OpenParen => {
                let start = self.pos;
                match self.grouped_condition() {
                    Ok(inner) => Ok(inner),
                    Err(err @ CompileError::NestingTooDeep { .. }) => Err(err),
                    Err(group_err) => {
                        self.pos = start;
                        self.comparison()
                            .map_err(|term_err| furthest(group_err, term_err))
                    }
                }
            }
            _ => self.comparison(),
        }
    }

    fn grouped_condition(&mut self) -> CompileResult<Condition> {
        // ( condition ) not followed by anything that extends a term
        self.expect(TokenKind::OpenParen)?;
        let inner = self.condition()?;
        self.expect(TokenKind::CloseParen)?;
        if continues_term(self.peek_kind()) {
            return Err(self.unexpected("end of condition"));
        }
        Ok(inner)
    }

    fn comparison(&mut self) -> CompileResult<Condition> {
        let lhs = self.term()?;
        let op = self.peek_kind();
        let condition = match op {
            TokenKind::Equals => {
                self.advance();
                Condition::equal(lhs, self.term()?)
            }
            TokenKind::NotEquals => {
                self.advance();
                Condition::not(Condition::equal(lhs, self.term()?))
            }
            TokenKind::Greater => {
                self.advance();
                Condition::greater(lhs, self.term()?)
            }
            TokenKind::Less => {
                self.advance();
                Condition::greater(self.term()?, lhs)
            }
            TokenKind::GreaterEq => {
                self.advance();
                let rhs = self.term()?;
                Condition::or(
                    Condition::equal(lhs.clone(), rhs.clone()),
                    Condition::greater(lhs, rhs),
                )
            }
            TokenKind::LessEq => {
                self.advance();
                let rhs = self.term()?;
                Condition::or(
                    Condition::equal(lhs.clone(), rhs.clone()),
                    Condition::greater(rhs, lhs),
                )
            }
            _ => return Err(self.unexpected("comparison operator")),
        };
        Ok(condition)
    }

    // ── Terms ────────────────────────────────────────────────────────

    fn term(&mut self) -> CompileResult<Term> {
        self.nested(|p| {
            let lhs = p.sum()?;
            if p.check(TokenKind::Match) {
                p.advance();
                let rhs = p.sum()?;
                return Ok(Term::expr(lhs, Operator::Regex, rhs));
            }
            Ok(lhs)
        })
    }

    fn sum(&mut self) -> CompileResult<Term> {
        self.scoped(|p| {
            let mut lhs = p.product()?;
            loop {
                let op = match p.peek_kind() {
                    TokenKind::Plus => Operator::Plus,
                    TokenKind::Minus => Operator::Minus,
                    _ => break,
                };
                p.deepen()?;
                p.advance();
                let rhs = p.product()?;
                lhs = Term::expr(lhs, op, rhs);
            }
            Ok(lhs)
        })
    }

    fn product(&mut self) -> CompileResult<Term> {
        self.scoped(|p| {
            let mut lhs = p.unary()?;
            loop {
                let op = match p.peek_kind() {
                    TokenKind::Star => Operator::Multiply,
                    TokenKind::Slash => Operator::Divide,
                    _ => break,
                };
                p.deepen()?;
                p.advance();
                let rhs = p.unary()?;
                lhs = Term::expr(lhs, op, rhs);
            }
            Ok(lhs)
        })
    }

    fn unary(&mut self) -> CompileResult<Term> {
        let to = match self.peek_kind() {
            TokenKind::StringType => ValueType::String,
            TokenKind::NumberType => ValueType::Number,
            _ => return self.primary(),
        };
        self.advance();
        let from = self.nested(|p| p.unary())?;
        Ok(Term::coerce(from, to))
    }

    fn primary(&mut self) -> CompileResult<Term> {
        match self.peek_kind() {
            TokenKind::StringLiteral => Ok(Term::String(self.advance().text.clone())),
            TokenKind::NumberLiteral => {
                let tok = self.advance().clone();
                let value = tok
                    .text
                    .parse::<i64>()
                    .map_err(|_| CompileError::InvalidNumber {
                        text: tok.text.clone(),
                        line: tok.line,
                        col: tok.col,
                    })?;
                Ok(Term::Number(value))
            }
            TokenKind::Identifier => Ok(Term::Attribute(self.advance().text.clone())),
            TokenKind::Request => {
                self.advance();
                let key = self.expect(TokenKind::StringLiteral)?.text;
                Ok(Term::Request(key))
            }
            TokenKind::Get => self.rest(RestMethod::Get),
            TokenKind::Post => self.rest(RestMethod::Post),
            TokenKind::Put => self.rest(RestMethod::Put),
            TokenKind::Delete => self.rest(RestMethod::Delete),
            TokenKind::OpenParen => {
                self.advance();
                let inner = self.term()?;
                self.expect(TokenKind::CloseParen)?;
                Ok(inner)
            }
            _ => Err(self.unexpected("term")),
        }
    }

    fn rest(&mut self, method: RestMethod) -> CompileResult<Term> {
        // METHOD "url" name=Attr, name=Attr
        self.advance();
        let url = self.expect(TokenKind::StringLiteral)?;

        // The first parameter must share the URL's line; a `name =` on a
        // later line is the next declaration.
        let mut params = BTreeMap::new();
        if self.starts_param(0) && self.peek().line == url.line {
            loop {
                let name = self.expect(TokenKind::Identifier)?;
                self.expect(TokenKind::Equals)?;
                let attribute = self.expect_identifier()?;
                if params.insert(name.text.clone(), attribute).is_some() {
                    return Err(CompileError::Parse {
                        line: name.line,
                        col: name.col,
                        message: format!("Duplicate REST parameter '{}'", name.text),
                    });
                }

                // A comma only continues the list when another `name=` follows;
                // otherwise it belongs to an enclosing rule list.
                if self.check(TokenKind::Comma) && self.starts_param(1) {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        Ok(Term::Rest {
            url: url.text,
            method,
            params,
        })
    }

    fn starts_param(&self, offset: usize) -> bool {
        self.peek_kind_at(offset) == TokenKind::Identifier
            && self.peek_kind_at(offset + 1) == TokenKind::Equals
    }

    // ── Helpers ──────────────────────────────────────────────────────

    /// Run `f` one level deeper
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> CompileResult<T>) -> CompileResult<T> {
        self.scoped(|p| {
            p.deepen()?;
            f(p)
        })
    }

    /// Run `f`, restoring the depth it started at however `f` returns
    fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> CompileResult<T>) -> CompileResult<T> {
        let base = self.depth;
        let result = f(self);
        self.depth = base;
        result
    }

    fn deepen(&mut self) -> CompileResult<()> {
        if self.depth >= self.max_depth {
            let tok = self.peek();
            return Err(CompileError::NestingTooDeep {
                limit: self.max_depth,
                line: tok.line,
                col: tok.col,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn advance(&mut self) -> &Token {
        let idx = self.pos.min(self.tokens.len() - 1);
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        &self.tokens[idx]
    }

    fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
        if self.check(kind) {
            Ok(self.advance().clone())
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    fn expect_identifier(&mut self) -> CompileResult<String> {
        Ok(self.expect(TokenKind::Identifier)?.text)
    }

    fn expect_end(&self) -> CompileResult<()> {
        if self.check(TokenKind::Eof) {
            Ok(())
        } else {
            Err(self.unexpected("end of input"))
        }
    }

    fn unexpected(&self, expected: &str) -> CompileError {
        let tok = self.peek();
        if tok.kind == TokenKind::Eof {
            CompileError::UnexpectedEof(expected.to_string())
        } else {
            CompileError::UnexpectedToken {
                expected: expected.to_string(),
                found: tok.text.clone(),
                line: tok.line,
                col: tok.col,
            }
        }
    }
}

/// Tokens that extend a term, so cannot follow a complete condition
fn continues_term(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Equals
            | TokenKind::NotEquals
            | TokenKind::Greater
            | TokenKind::GreaterEq
            | TokenKind::Less
            | TokenKind::LessEq
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Match
    )
}

/// Of two failed readings, report the one that got further. End of input
/// counts as furthest; ties go to `first`.
fn furthest(first: CompileError, second: CompileError) -> CompileError {
    match (first.position(), second.position()) {
        (None, _) => first,
        (_, None) => second,
        (Some(a), Some(b)) if b > a => second,
        _ => first,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(value: &str) -> Term {
        Term::string(value)
    }

    fn n(value: i64) -> Term {
        Term::number(value)
    }

    fn a(name: &str) -> Term {
        Term::attribute(name)
    }

    // ── Terms ────────────────────────────────────────────────────────

    #[test]
    fn test_term_literals() {
        assert_eq!(Parser::parse_term("\"foo\"").unwrap(), s("foo"));
        assert_eq!(Parser::parse_term("123").unwrap(), n(123));
        assert_eq!(Parser::parse_term("foo").unwrap(), a("foo"));
    }

    #[test]
    fn test_term_arithmetic() {
        assert_eq!(
            Parser::parse_term("1 + 2").unwrap(),
            Term::expr(n(1), Operator::Plus, n(2))
        );
        assert_eq!(
            Parser::parse_term("9 - 5").unwrap(),
            Term::expr(n(9), Operator::Minus, n(5))
        );
        assert_eq!(
            Parser::parse_term("foo * 7").unwrap(),
            Term::expr(a("foo"), Operator::Multiply, n(7))
        );
        assert_eq!(
            Parser::parse_term("100 / 5").unwrap(),
            Term::expr(n(100), Operator::Divide, n(5))
        );
    }

    #[test]
    fn test_term_precedence() {
        assert_eq!(
            Parser::parse_term("3 + foo * 6").unwrap(),
            Term::expr(
                n(3),
                Operator::Plus,
                Term::expr(a("foo"), Operator::Multiply, n(6))
            )
        );
    }

    #[test]
    fn test_term_left_associative() {
        assert_eq!(
            Parser::parse_term("10 - 3 - 2").unwrap(),
            Term::expr(
                Term::expr(n(10), Operator::Minus, n(3)),
                Operator::Minus,
                n(2)
            )
        );
    }

    #[test]
    fn test_term_parenthesised() {
        assert_eq!(
            Parser::parse_term("foo * (1 + 2)").unwrap(),
            Term::expr(a("foo"), Operator::Multiply, Term::expr(n(1), Operator::Plus, n(2)))
        );
    }

    #[test]
    fn test_term_regex() {
        assert_eq!(
            Parser::parse_term("email ~= \".*@example.com\"").unwrap(),
            Term::expr(a("email"), Operator::Regex, s(".*@example.com"))
        );
    }

    #[test]
    fn test_term_coercion() {
        assert_eq!(
            Parser::parse_term("string 3").unwrap(),
            Term::coerce(n(3), ValueType::String)
        );
        assert_eq!(
            Parser::parse_term("number request \"age\"").unwrap(),
            Term::coerce(Term::request("age"), ValueType::Number)
        );
    }

    #[test]
    fn test_term_request() {
        assert_eq!(
            Parser::parse_term("request \"A.B.C\"").unwrap(),
            Term::request("A.B.C")
        );
    }

    #[test]
    fn test_term_rest() {
        let mut params = BTreeMap::new();
        params.insert("user".to_string(), "UserName".to_string());
        params.insert("pass".to_string(), "Password".to_string());

        assert_eq!(
            Parser::parse_term("GET \"http://foo.bar\" user=UserName, pass=Password").unwrap(),
            Term::Rest {
                url: "http://foo.bar".into(),
                method: RestMethod::Get,
                params,
            }
        );
    }

    #[test]
    fn test_term_rest_without_params() {
        assert_eq!(
            Parser::parse_term("DELETE \"http://foo.bar/1\"").unwrap(),
            Term::Rest {
                url: "http://foo.bar/1".into(),
                method: RestMethod::Delete,
                params: BTreeMap::new(),
            }
        );
    }

    #[test]
    fn test_rest_params_start_on_url_line() {
        let parsed = Parser::parse(
            "z = 1\nstatus = GET \"http://x\"\ny = z\npermit when y = 1",
        )
        .unwrap();
        assert_eq!(parsed.attributes.len(), 3);
        assert_eq!(
            parsed.attributes[1].value,
            Term::Rest {
                url: "http://x".into(),
                method: RestMethod::Get,
                params: BTreeMap::new(),
            }
        );
        assert_eq!(parsed.attributes[2].value, a("z"));
    }

    #[test]
    fn test_rest_params_continue_after_comma_on_next_line() {
        let term = Parser::parse_term("PUT \"http://x\" a=B,\n    c=D").unwrap();
        match term {
            Term::Rest { params, .. } => assert_eq!(params.len(), 2),
            other => panic!("expected REST term, got {:?}", other),
        }
    }

    #[test]
    fn test_term_rest_duplicate_param() {
        let err = Parser::parse_term("POST \"http://x\" a=B, a=C").unwrap_err();
        assert!(matches!(err, CompileError::Parse { col: 22, .. }));
    }

    #[test]
    fn test_term_number_overflow() {
        let err = Parser::parse_term("99999999999999999999").unwrap_err();
        assert!(matches!(err, CompileError::InvalidNumber { .. }));
    }

    #[test]
    fn test_term_trailing_input() {
        assert!(Parser::parse_term("1 2").is_err());
    }

    // ── Conditions ───────────────────────────────────────────────────

    #[test]
    fn test_condition_equal_and_greater() {
        assert_eq!(
            Parser::parse_condition("foo = bar").unwrap(),
            Condition::equal(a("foo"), a("bar"))
        );
        assert_eq!(
            Parser::parse_condition("foo > \"bar\"").unwrap(),
            Condition::greater(a("foo"), s("bar"))
        );
    }

    #[test]
    fn test_condition_desugared_operators() {
        assert_eq!(
            Parser::parse_condition("99 != 99").unwrap(),
            Condition::not(Condition::equal(n(99), n(99)))
        );
        assert_eq!(
            Parser::parse_condition("foo < bar").unwrap(),
            Condition::greater(a("bar"), a("foo"))
        );
        assert_eq!(
            Parser::parse_condition("a <= b").unwrap(),
            Condition::or(
                Condition::equal(a("a"), a("b")),
                Condition::greater(a("b"), a("a"))
            )
        );
        assert_eq!(
            Parser::parse_condition("a >= b").unwrap(),
            Condition::or(
                Condition::equal(a("a"), a("b")),
                Condition::greater(a("a"), a("b"))
            )
        );
    }

    #[test]
    fn test_condition_not() {
        assert_eq!(
            Parser::parse_condition("not a = b").unwrap(),
            Condition::not(Condition::equal(a("a"), a("b")))
        );
    }

    #[test]
    fn test_condition_and() {
        assert_eq!(
            Parser::parse_condition("foo = 1 and bar = 2").unwrap(),
            Condition::and(
                Condition::equal(a("foo"), n(1)),
                Condition::equal(a("bar"), n(2))
            )
        );
    }

    #[test]
    fn test_condition_and_binds_tighter_than_or() {
        assert_eq!(
            Parser::parse_condition("a = 1 or b = 2 and c = 3").unwrap(),
            Condition::or(
                Condition::equal(a("a"), n(1)),
                Condition::and(
                    Condition::equal(a("b"), n(2)),
                    Condition::equal(a("c"), n(3))
                )
            )
        );
    }

    #[test]
    fn test_condition_grouping() {
        assert_eq!(
            Parser::parse_condition("(a = 1 or b = 2) and c = 3").unwrap(),
            Condition::and(
                Condition::or(
                    Condition::equal(a("a"), n(1)),
                    Condition::equal(a("b"), n(2))
                ),
                Condition::equal(a("c"), n(3))
            )
        );
    }

    #[test]
    fn test_condition_missing_operator() {
        let err = Parser::parse_condition("foo bar").unwrap_err();
        assert_eq!(
            err,
            CompileError::UnexpectedToken {
                expected: "comparison operator".into(),
                found: "bar".into(),
                line: 1,
                col: 5,
            }
        );
    }

    #[test]
    fn test_condition_parenthesised_term() {
        assert_eq!(
            Parser::parse_condition("(a + 1) > 2").unwrap(),
            Condition::greater(Term::expr(a("a"), Operator::Plus, n(1)), n(2))
        );
        assert_eq!(
            Parser::parse_condition("(a) = 1").unwrap(),
            Condition::equal(a("a"), n(1))
        );
        assert_eq!(
            Parser::parse_condition("((a + 1) * 2) != b").unwrap(),
            Condition::not(Condition::equal(
                Term::expr(Term::expr(a("a"), Operator::Plus, n(1)), Operator::Multiply, n(2)),
                a("b")
            ))
        );
    }

    #[test]
    fn test_condition_parenthesised_term_after_not() {
        assert_eq!(
            Parser::parse_condition("not (a + 1) > 2 and ((b = 1))").unwrap(),
            Condition::and(
                Condition::not(Condition::greater(
                    Term::expr(a("a"), Operator::Plus, n(1)),
                    n(2)
                )),
                Condition::equal(a("b"), n(1))
            )
        );
    }

    #[test]
    fn test_condition_group_error_reported() {
        let err = Parser::parse_condition("(foo bar)").unwrap_err();
        assert_eq!(
            err,
            CompileError::UnexpectedToken {
                expected: "comparison operator".into(),
                found: "bar".into(),
                line: 1,
                col: 6,
            }
        );
    }

    #[test]
    fn test_chained_operators_count_towards_depth() {
        let mut parser = Parser::new("permit when a = 1 or a = 1", 4).unwrap();
        assert!(parser.parse_policy().is_ok());

        let mut parser = Parser::new("permit when a = 1 or a = 1 or a = 1", 4).unwrap();
        assert!(matches!(
            parser.parse_policy(),
            Err(CompileError::NestingTooDeep { limit: 4, .. })
        ));

        let mut parser = Parser::new("x = 1 + 2 + 3", 3).unwrap();
        assert!(parser.parse_policy().is_ok());

        let mut parser = Parser::new("x = 1 + 2 + 3 + 4", 3).unwrap();
        assert_eq!(
            parser.parse_policy().unwrap_err(),
            CompileError::NestingTooDeep {
                limit: 3,
                line: 1,
                col: 15,
            }
        );
    }

    #[test]
    fn test_depth_restored_after_chain() {
        // Each rule starts from the same depth however long the previous chain was
        let input = "permit when a = 1 and a = 1\npermit when a = 1 and a = 1";
        let mut parser = Parser::new(input, 4).unwrap();
        assert_eq!(parser.parse_policy().unwrap().rules.len(), 2);
    }

    // ── Rules ────────────────────────────────────────────────────────

    #[test]
    fn test_rule_always() {
        assert_eq!(
            Parser::parse_rule("always permit").unwrap(),
            Rule::always(Decision::Permit)
        );
        assert_eq!(
            Parser::parse_rule("always deny").unwrap(),
            Rule::always(Decision::Deny)
        );
    }

    #[test]
    fn test_rule_never() {
        assert_eq!(Parser::parse_rule("never").unwrap(), Rule::never());
    }

    #[test]
    fn test_rule_when() {
        assert_eq!(
            Parser::parse_rule("permit when abc = \"def\"").unwrap(),
            Rule::when(Condition::equal(a("abc"), s("def")), Decision::Permit)
        );
        assert_eq!(
            Parser::parse_rule("deny when 23 > 22").unwrap(),
            Rule::when(Condition::greater(n(23), n(22)), Decision::Deny)
        );
    }

    #[test]
    fn test_rule_one_leg_branch() {
        assert_eq!(
            Parser::parse_rule("if \"abc\" = \"def\" always deny").unwrap(),
            Rule::branch(
                Condition::equal(s("abc"), s("def")),
                Rule::always(Decision::Deny),
                Rule::never()
            )
        );
    }

    #[test]
    fn test_rule_two_leg_branch() {
        assert_eq!(
            Parser::parse_rule("if 2 > 1 always permit else always deny").unwrap(),
            Rule::branch(
                Condition::greater(n(2), n(1)),
                Rule::always(Decision::Permit),
                Rule::always(Decision::Deny)
            )
        );
    }

    #[test]
    fn test_rule_combinators() {
        let children = vec![Rule::always(Decision::Permit), Rule::always(Decision::Deny)];

        assert_eq!(
            Parser::parse_rule("majority permit { always permit, always deny }").unwrap(),
            Rule::majority(Decision::Permit, children.clone())
        );
        assert_eq!(
            Parser::parse_rule("any permit { always permit, always deny }").unwrap(),
            Rule::any(Decision::Permit, children.clone())
        );
        assert_eq!(
            Parser::parse_rule("all deny { always permit, always deny }").unwrap(),
            Rule::all(Decision::Deny, children)
        );
    }

    #[test]
    fn test_rule_exclusive() {
        assert_eq!(
            Parser::parse_rule("exclusive { always permit, deny when a = b }").unwrap(),
            Rule::one_of(vec![
                Rule::always(Decision::Permit),
                Rule::when(Condition::equal(a("a"), a("b")), Decision::Deny),
            ])
        );
    }

    #[test]
    fn test_rule_block_trailing_comma() {
        assert_eq!(
            Parser::parse_rule("any deny { always deny, }").unwrap(),
            Rule::any(Decision::Deny, vec![Rule::always(Decision::Deny)])
        );
    }

    #[test]
    fn test_rule_block_empty_rejected() {
        assert!(Parser::parse_rule("any deny { }").is_err());
    }

    #[test]
    fn test_rule_rest_param_comma_inside_block() {
        let rule = Parser::parse_rule(
            "exclusive { permit when GET \"http://x\" u=User = \"ok\", always deny }",
        )
        .unwrap();

        match rule {
            Rule::OneOf { rules } => assert_eq!(rules.len(), 2),
            other => panic!("expected one-of, got {:?}", other),
        }
    }

    #[test]
    fn test_rule_complex() {
        let input = r#"
            if foo = "bar"
              exclusive {
                permit when a > b,
                deny when a <= b
              }
            else
              always deny
        "#;

        assert_eq!(
            Parser::parse_rule(input).unwrap(),
            Rule::branch(
                Condition::equal(a("foo"), s("bar")),
                Rule::one_of(vec![
                    Rule::when(Condition::greater(a("a"), a("b")), Decision::Permit),
                    Rule::when(
                        Condition::or(
                            Condition::equal(a("a"), a("b")),
                            Condition::greater(a("b"), a("a"))
                        ),
                        Decision::Deny
                    ),
                ]),
                Rule::always(Decision::Deny)
            )
        );
    }

    #[test]
    fn test_rule_bad_decision() {
        let err = Parser::parse_rule("always maybe").unwrap_err();
        assert_eq!(
            err,
            CompileError::UnexpectedToken {
                expected: "decision (permit or deny)".into(),
                found: "maybe".into(),
                line: 1,
                col: 8,
            }
        );
    }

    #[test]
    fn test_rule_truncated() {
        assert_eq!(
            Parser::parse_rule("permit when").unwrap_err(),
            CompileError::UnexpectedEof("term".into())
        );
    }

    // ── Policies ─────────────────────────────────────────────────────

    #[test]
    fn test_policy_with_attributes() {
        let input = r#"
            foo = "foo"
            bar = request "bar"

            any permit {
                permit when foo = bar,
                permit when foo = 123
            }
        "#;

        let parsed = Parser::parse(input).unwrap();
        assert_eq!(
            parsed.attributes,
            vec![
                Attribute::new("foo", s("foo")),
                Attribute::new("bar", Term::request("bar")),
            ]
        );
        assert_eq!(
            parsed.rules,
            vec![Rule::any(
                Decision::Permit,
                vec![
                    Rule::when(Condition::equal(a("foo"), a("bar")), Decision::Permit),
                    Rule::when(Condition::equal(a("foo"), n(123)), Decision::Permit),
                ]
            )]
        );
    }

    #[test]
    fn test_policy_multiple_rules() {
        let parsed = Parser::parse("always permit\nnever\ndeny when 1 = 2").unwrap();
        assert_eq!(parsed.rules.len(), 3);
        assert!(parsed.attributes.is_empty());
    }

    #[test]
    fn test_policy_attribute_after_rule_rejected() {
        let err = Parser::parse("always permit\nfoo = 1").unwrap_err();
        assert!(matches!(err, CompileError::Parse { line: 2, col: 1, .. }));
    }

    #[test]
    fn test_keyword_cannot_name_attribute() {
        assert!(Parser::parse("permit = 1").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let input = format!("{}a = 1{}", "(".repeat(200), ")".repeat(200));
        let err = Parser::parse_condition(&input).unwrap_err();
        assert!(matches!(
            err,
            CompileError::NestingTooDeep {
                limit: DEFAULT_MAX_DEPTH,
                ..
            }
        ));
    }

    #[test]
    fn test_custom_depth() {
        let mut parser = Parser::new("if 1 = 1 if 2 = 2 always permit", 3).unwrap();
        assert!(matches!(
            parser.parse_policy(),
            Err(CompileError::NestingTooDeep { limit: 3, .. })
        ));

        let mut parser = Parser::new("always permit", 1).unwrap();
        assert_eq!(parser.parse_policy().unwrap().rules.len(), 1);
    }
}
