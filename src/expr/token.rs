//! Tokenizer for the restricted arithmetic grammar.
//!
//! Accepts exactly the characters the closed grammar needs: digits, the
//! operator set, parentheses, commas, whitespace, and identifier characters
//! for the two allow-listed function names. Everything else (quotes,
//! brackets, dots outside numeric literals) is rejected here, before any
//! structure is built.

use super::ExprError;

/// A single lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    LParen,
    RParen,
    Comma,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "number {n}"),
            Self::Ident(name) => write!(f, "identifier '{name}'"),
            Self::Plus => write!(f, "'+'"),
            Self::Minus => write!(f, "'-'"),
            Self::Star => write!(f, "'*'"),
            Self::StarStar => write!(f, "'**'"),
            Self::Slash => write!(f, "'/'"),
            Self::LParen => write!(f, "'('"),
            Self::RParen => write!(f, "')'"),
            Self::Comma => write!(f, "','"),
        }
    }
}

struct Scanner<'src> {
    src: &'src str,
    bytes: &'src [u8],
    pos: usize,
}

impl<'src> Scanner<'src> {
    fn new(src: &'src str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, ch: u8) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume a digit run, allowing single underscores between digits
    /// (`1_000`). A run never opens with an underscore, so the fraction of
    /// `1._5` stays unconsumed; dangling underscores are left for the
    /// caller to reject.
    fn digits(&mut self) {
        let mut seen_digit = false;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                seen_digit = true;
                self.bump();
            } else if ch == b'_'
                && seen_digit
                && self.peek_at(1).is_some_and(|c| c.is_ascii_digit())
            {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// Scan a numeric literal: integer part, optional fraction, optional
    /// exponent. Either side of the dot may be empty (`.5`, `5.`) but an
    /// exponent marker must be followed by at least one digit.
    fn number(&mut self) -> Result<Token, ExprError> {
        let start = self.pos;
        self.digits();
        if self.eat(b'.') {
            self.digits();
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.bump();
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.bump();
            }
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err(ExprError::Syntax(format!(
                    "malformed number literal '{}'",
                    &self.src[start..self.pos]
                )));
            }
            self.digits();
        }
        let text = self.src[start..self.pos].replace('_', "");
        let value = text
            .parse::<f64>()
            .map_err(|_| ExprError::Syntax(format!("malformed number literal '{text}'")))?;
        Ok(Token::Number(value))
    }

    fn ident(&mut self) -> Token {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                self.bump();
            } else {
                break;
            }
        }
        Token::Ident(self.src[start..self.pos].to_string())
    }

    /// The character at the current position, decoded from the source so
    /// multi-byte input reports cleanly. Positions only ever sit on char
    /// boundaries because every accepted byte is ASCII.
    fn current_char(&self) -> char {
        self.src[self.pos..].chars().next().unwrap_or('\u{fffd}')
    }
}

/// Tokenize `src` into a flat token stream.
pub fn tokenize(src: &str) -> Result<Vec<Token>, ExprError> {
    let mut scanner = Scanner::new(src);
    let mut tokens = Vec::new();
    while let Some(ch) = scanner.peek() {
        match ch {
            b' ' | b'\t' | b'\r' | b'\n' => scanner.bump(),
            b'0'..=b'9' => tokens.push(scanner.number()?),
            b'.' if scanner.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                tokens.push(scanner.number()?);
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => tokens.push(scanner.ident()),
            b'+' => {
                scanner.bump();
                tokens.push(Token::Plus);
            }
            b'-' => {
                scanner.bump();
                tokens.push(Token::Minus);
            }
            b'*' => {
                scanner.bump();
                if scanner.eat(b'*') {
                    tokens.push(Token::StarStar);
                } else {
                    tokens.push(Token::Star);
                }
            }
            b'/' => {
                scanner.bump();
                tokens.push(Token::Slash);
            }
            b'(' => {
                scanner.bump();
                tokens.push(Token::LParen);
            }
            b')' => {
                scanner.bump();
                tokens.push(Token::RParen);
            }
            b',' => {
                scanner.bump();
                tokens.push(Token::Comma);
            }
            _ => {
                return Err(ExprError::UnexpectedChar {
                    ch: scanner.current_char(),
                    pos: scanner.pos,
                });
            }
        }
    }
    Ok(tokens)
}
