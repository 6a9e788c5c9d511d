// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Beat expressions.
//!
//! Note positions and lengths may be written as small arithmetic
//! expressions such as `"9 + 1/3"` so that tuplets and offsets stay exact
//! in the stored text. The grammar is deliberately tiny:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/') unary)*
//! unary  := ('+' | '-') unary | atom
//! atom   := number | '(' expr ')'
//! ```
//!
//! There are no variables and no function calls. Nesting of parentheses
//! and unary signs is limited to [`MAX_DEPTH`] levels.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Deepest nesting of parentheses and unary signs accepted
pub const MAX_DEPTH: usize = 256;

/// Errors produced while evaluating a beat expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("Invalid expression '{input}': unexpected character '{found}' at position {position}")]
    UnexpectedChar {
        input: String,
        found: char,
        position: usize,
    },

    #[error("Invalid expression '{input}': unexpected end of input")]
    UnexpectedEnd { input: String },

    #[error("Invalid expression '{input}': unexpected '{found}' at position {position}")]
    UnexpectedToken {
        input: String,
        found: String,
        position: usize,
    },

    #[error("Invalid expression '{input}': bad number '{literal}'")]
    BadNumber { input: String, literal: String },

    #[error("Invalid expression: division by zero")]
    DivisionByZero,

    #[error("Invalid expression '{input}': result is not a finite number")]
    NotFinite { input: String },

    #[error("Invalid expression '{input}': nested deeper than {max} levels")]
    TooDeep { input: String, max: usize },
}

/// A position or length in beats, either literal or deferred
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BeatValue {
    /// Plain number of beats
    Number(f64),
    /// Arithmetic expression evaluated on demand
    Expr(String),
}

impl BeatValue {
    /// Evaluate to a number of beats
    pub fn evaluate(&self) -> Result<f64, ExprError> {
        match self {
            BeatValue::Number(value) if value.is_finite() => Ok(*value),
            BeatValue::Number(value) => Err(ExprError::NotFinite {
                input: value.to_string(),
            }),
            BeatValue::Expr(text) => evaluate(text),
        }
    }
}

impl From<f64> for BeatValue {
    fn from(value: f64) -> Self {
        BeatValue::Number(value)
    }
}

impl From<i32> for BeatValue {
    fn from(value: i32) -> Self {
        BeatValue::Number(value as f64)
    }
}

impl From<&str> for BeatValue {
    fn from(text: &str) -> Self {
        BeatValue::Expr(text.to_string())
    }
}

impl From<String> for BeatValue {
    fn from(text: String) -> Self {
        BeatValue::Expr(text)
    }
}

impl fmt::Display for BeatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BeatValue::Number(value) => write!(f, "{}", value),
            BeatValue::Expr(text) => write!(f, "{}", text),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, ExprError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let ch = chars[pos];
        let token = match ch {
            c if c.is_whitespace() => {
                pos += 1;
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            c if c.is_ascii_digit() || c == '.' => {
                let start = pos;
                while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '.') {
                    pos += 1;
                }
                let literal: String = chars[start..pos].iter().collect();
                let value = literal.parse::<f64>().map_err(|_| ExprError::BadNumber {
                    input: input.to_string(),
                    literal: literal.clone(),
                })?;
                tokens.push((Token::Number(value), start));
                continue;
            }
            other => {
                return Err(ExprError::UnexpectedChar {
                    input: input.to_string(),
                    found: other,
                    position: pos,
                })
            }
        };
        tokens.push((token, pos));
        pos += 1;
    }

    Ok(tokens)
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<(Token, usize)>,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        self.pos += 1;
        token
    }

    fn unexpected(&self) -> ExprError {
        match self.tokens.get(self.pos) {
            Some((token, position)) => ExprError::UnexpectedToken {
                input: self.input.to_string(),
                found: token.to_string(),
                position: *position,
            },
            None => ExprError::UnexpectedEnd {
                input: self.input.to_string(),
            },
        }
    }

    fn nested<F>(&mut self, parse: F) -> Result<f64, ExprError>
    where
        F: FnOnce(&mut Self) -> Result<f64, ExprError>,
    {
        if self.depth >= MAX_DEPTH {
            return Err(ExprError::TooDeep {
                input: self.input.to_string(),
                max: MAX_DEPTH,
            });
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn expr(&mut self) -> Result<f64, ExprError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.next();
                    value += self.term()?;
                }
                Some(Token::Minus) => {
                    self.next();
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64, ExprError> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.next();
                    value *= self.unary()?;
                }
                Some(Token::Slash) => {
                    self.next();
                    let divisor = self.unary()?;
                    if divisor == 0.0 {
                        return Err(ExprError::DivisionByZero);
                    }
                    value /= divisor;
                }
                _ => return Ok(value),
            }
        }
    }

    fn unary(&mut self) -> Result<f64, ExprError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.next();
                Ok(-self.nested(Self::unary)?)
            }
            Some(Token::Plus) => {
                self.next();
                self.nested(Self::unary)
            }
            _ => self.atom(),
        }
    }

    fn atom(&mut self) -> Result<f64, ExprError> {
        match self.peek() {
            Some(Token::Number(n)) => {
                let n = *n;
                self.next();
                Ok(n)
            }
            Some(Token::LParen) => {
                self.next();
                let value = self.nested(Self::expr)?;
                match self.peek() {
                    Some(Token::RParen) => {
                        self.next();
                        Ok(value)
                    }
                    _ => Err(self.unexpected()),
                }
            }
            _ => Err(self.unexpected()),
        }
    }
}

/// Evaluate a beat expression to a number
pub fn evaluate(input: &str) -> Result<f64, ExprError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        input,
        tokens,
        pos: 0,
        depth: 0,
    };

    let value = parser.expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(parser.unexpected());
    }
    if !value.is_finite() {
        return Err(ExprError::NotFinite {
            input: input.to_string(),
        });
    }
    Ok(value)
}
