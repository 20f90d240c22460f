//! Lexer: tokenizes policy source
//!
//! Produces a stream of tokens that the parser consumes.
//! Handles keywords, identifiers, string literals, numbers,
//! comparison and arithmetic operators, and structural tokens.

use crate::errors::{CompileError, CompileResult};

/// A token produced by the lexer
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The raw text of the token (unescaped contents for string literals)
    pub text: String,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub col: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            col,
        }
    }
}

/// Token types
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    // Rule keywords
    Always,
    Never,
    Permit,
    Deny,
    When,
    If,
    Else,
    Majority,
    Any,
    All,
    Exclusive,

    // Condition keywords
    Not,
    And,
    Or,

    // Term keywords
    Request,
    StringType,
    NumberType,
    Get,
    Post,
    Put,
    Delete,

    // Identifiers and literals
    Identifier,
    StringLiteral,
    NumberLiteral,

    // Operators
    Equals,
    NotEquals,
    Greater,
    GreaterEq,
    Less,
    LessEq,
    Plus,
    Minus,
    Star,
    Slash,
    Match, // ~=

    // Structural
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    Comma,

    // End of input
    Eof,
}

impl TokenKind {
    /// Keyword lookup; `None` for plain identifiers
    pub fn keyword(text: &str) -> Option<Self> {
        let kind = match text {
            "always" => Self::Always,
            "never" => Self::Never,
            "permit" => Self::Permit,
            "deny" => Self::Deny,
            "when" => Self::When,
            "if" => Self::If,
            "else" => Self::Else,
            "majority" => Self::Majority,
            "any" => Self::Any,
            "all" => Self::All,
            "exclusive" => Self::Exclusive,
            "not" => Self::Not,
            "and" => Self::And,
            "or" => Self::Or,
            "request" => Self::Request,
            "string" => Self::StringType,
            "number" => Self::NumberType,
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            _ => return None,
        };
        Some(kind)
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Always => write!(f, "always"),
            Self::Never => write!(f, "never"),
            Self::Permit => write!(f, "permit"),
            Self::Deny => write!(f, "deny"),
            Self::When => write!(f, "when"),
            Self::If => write!(f, "if"),
            Self::Else => write!(f, "else"),
            Self::Majority => write!(f, "majority"),
            Self::Any => write!(f, "any"),
            Self::All => write!(f, "all"),
            Self::Exclusive => write!(f, "exclusive"),
            Self::Not => write!(f, "not"),
            Self::And => write!(f, "and"),
            Self::Or => write!(f, "or"),
            Self::Request => write!(f, "request"),
            Self::StringType => write!(f, "string"),
            Self::NumberType => write!(f, "number"),
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
            Self::Identifier => write!(f, "identifier"),
            Self::StringLiteral => write!(f, "string literal"),
            Self::NumberLiteral => write!(f, "number"),
            Self::Equals => write!(f, "="),
            Self::NotEquals => write!(f, "!="),
            Self::Greater => write!(f, ">"),
            Self::GreaterEq => write!(f, ">="),
            Self::Less => write!(f, "<"),
            Self::LessEq => write!(f, "<="),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::Slash => write!(f, "/"),
            Self::Match => write!(f, "~="),
            Self::OpenBrace => write!(f, "{{"),
            Self::CloseBrace => write!(f, "}}"),
            Self::OpenParen => write!(f, "("),
            Self::CloseParen => write!(f, ")"),
            Self::Comma => write!(f, ","),
            Self::Eof => write!(f, "end of input"),
        }
    }
}

/// Lexer for policy source
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Lexer {
    /// Create a new lexer from input text
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Tokenize the entire input. The last token is always `Eof`.
    pub fn tokenize(&mut self) -> CompileResult<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();

            if self.pos >= self.input.len() {
                tokens.push(Token::new(TokenKind::Eof, "", self.line, self.col));
                break;
            }

            let token = self.next_token()?;
            tokens.push(token);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> CompileResult<Token> {
        let ch = self.input[self.pos];
        let line = self.line;
        let col = self.col;

        let single = |kind: TokenKind| Token::new(kind, ch.to_string(), line, col);

        match ch {
            '{' => Ok(self.take(1, single(TokenKind::OpenBrace))),
            '}' => Ok(self.take(1, single(TokenKind::CloseBrace))),
            '(' => Ok(self.take(1, single(TokenKind::OpenParen))),
            ')' => Ok(self.take(1, single(TokenKind::CloseParen))),
            ',' => Ok(self.take(1, single(TokenKind::Comma))),
            '+' => Ok(self.take(1, single(TokenKind::Plus))),
            '-' => Ok(self.take(1, single(TokenKind::Minus))),
            '*' => Ok(self.take(1, single(TokenKind::Star))),
            '/' => Ok(self.take(1, single(TokenKind::Slash))),
            '=' => Ok(self.take(1, single(TokenKind::Equals))),
            '!' if self.peek_at(1) == Some('=') => {
                Ok(self.take(2, Token::new(TokenKind::NotEquals, "!=", line, col)))
            }
            '~' if self.peek_at(1) == Some('=') => {
                Ok(self.take(2, Token::new(TokenKind::Match, "~=", line, col)))
            }
            '>' if self.peek_at(1) == Some('=') => {
                Ok(self.take(2, Token::new(TokenKind::GreaterEq, ">=", line, col)))
            }
            '<' if self.peek_at(1) == Some('=') => {
                Ok(self.take(2, Token::new(TokenKind::LessEq, "<=", line, col)))
            }
            '>' => Ok(self.take(1, single(TokenKind::Greater))),
            '<' => Ok(self.take(1, single(TokenKind::Less))),
            '"' => self.read_string_literal(),
            c if c.is_ascii_digit() => Ok(self.read_number()),
            c if c.is_ascii_alphabetic() || c == '_' => Ok(self.read_identifier_or_keyword()),
            _ => Err(CompileError::Parse {
                line,
                col,
                message: format!("Unexpected character: '{}'", ch),
            }),
        }
    }

    fn take(&mut self, width: usize, token: Token) -> Token {
        for _ in 0..width {
            self.advance();
        }
        token
    }

    fn read_string_literal(&mut self) -> CompileResult<Token> {
        let line = self.line;
        let col = self.col;
        self.advance(); // skip opening quote

        let mut text = String::new();
        while self.pos < self.input.len() && self.input[self.pos] != '"' {
            if self.input[self.pos] == '\\' {
                let escaped = match self.peek_at(1) {
                    Some('"') => '"',
                    Some('\\') => '\\',
                    Some('n') => '\n',
                    Some('t') => '\t',
                    Some(other) => {
                        return Err(CompileError::Parse {
                            line: self.line,
                            col: self.col,
                            message: format!("Unknown escape sequence: '\\{}'", other),
                        })
                    }
                    None => {
                        self.advance();
                        break;
                    }
                };
                self.advance();
                text.push(escaped);
            } else {
                text.push(self.input[self.pos]);
            }
            self.advance();
        }

        if self.pos >= self.input.len() {
            return Err(CompileError::Parse {
                line,
                col,
                message: "Unterminated string literal".into(),
            });
        }

        self.advance(); // skip closing quote
        Ok(Token::new(TokenKind::StringLiteral, text, line, col))
    }

    fn read_number(&mut self) -> Token {
        let line = self.line;
        let col = self.col;
        let mut text = String::new();

        while self.pos < self.input.len() && self.input[self.pos].is_ascii_digit() {
            text.push(self.input[self.pos]);
            self.advance();
        }

        Token::new(TokenKind::NumberLiteral, text, line, col)
    }

    fn read_identifier_or_keyword(&mut self) -> Token {
        let line = self.line;
        let col = self.col;
        let mut text = String::new();

        while self.pos < self.input.len()
            && (self.input[self.pos].is_ascii_alphanumeric() || self.input[self.pos] == '_')
        {
            text.push(self.input[self.pos]);
            self.advance();
        }

        let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Identifier);
        Token::new(kind, text, line, col)
    }

    fn skip_whitespace_and_comments(&mut self) {
        while self.pos < self.input.len() {
            let ch = self.input[self.pos];
            if ch.is_whitespace() {
                self.advance();
            } else if ch == '#' || (ch == '/' && self.peek_at(1) == Some('/')) {
                // Line comment
                while self.pos < self.input.len() && self.input[self.pos] != '\n' {
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn advance(&mut self) {
        if self.pos < self.input.len() {
            if self.input[self.pos] == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
            self.pos += 1;
        }
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }
}
