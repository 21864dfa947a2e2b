//! @ai:module:intent Tokenize arithmetic expressions against a fixed allow-list
//! @ai:module:layer application
//! @ai:module:public_api tokenize, Token, TokenKind
//! @ai:module:depends_on ast, error
//! @ai:module:stateless true

use crate::ast::Number;
use crate::error::{Error, Result};

/// Upper bound on expression length in bytes.
pub const MAX_EXPRESSION_LEN: usize = 4096;

/// @ai:intent Kinds of tokens the grammar knows about
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    Number(Number),
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    LParen,
    RParen,
}

/// @ai:intent A token with its byte offset in the source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// @ai:intent Split an expression into tokens, rejecting any character outside the grammar
/// @ai:pre expression is untrusted text
/// @ai:post every returned token is a numeric literal, an operator or a parenthesis
/// @ai:effects pure
/// @ai:example ("2*(3+4)") -> 7 tokens
pub fn tokenize(expression: &str) -> Result<Vec<Token>> {
    if expression.len() > MAX_EXPRESSION_LEN {
        return Err(Error::invalid(format!(
            "expression longer than {} bytes",
            MAX_EXPRESSION_LEN
        )));
    }

    let bytes = expression.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];

        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        let start = pos;
        let kind = match c {
            b'+' => {
                pos += 1;
                TokenKind::Plus
            }
            b'-' => {
                pos += 1;
                TokenKind::Minus
            }
            b'*' if bytes.get(pos + 1) == Some(&b'*') => {
                pos += 2;
                TokenKind::DoubleStar
            }
            b'*' => {
                pos += 1;
                TokenKind::Star
            }
            b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                pos += 2;
                TokenKind::DoubleSlash
            }
            b'/' => {
                pos += 1;
                TokenKind::Slash
            }
            b'%' => {
                pos += 1;
                TokenKind::Percent
            }
            b'(' => {
                pos += 1;
                TokenKind::LParen
            }
            b')' => {
                pos += 1;
                TokenKind::RParen
            }
            b'0'..=b'9' | b'.' => {
                let (number, end) = lex_number(expression, pos)?;
                pos = end;
                TokenKind::Number(number)
            }
            _ => {
                let ch = expression[pos..].chars().next().unwrap_or('?');
                return Err(Error::invalid(format!(
                    "unexpected character {:?} at offset {}",
                    ch, pos
                )));
            }
        };

        tokens.push(Token {
            kind,
            offset: start,
        });
    }

    Ok(tokens)
}

/// @ai:intent Lex one decimal integer or float literal starting at `start`
/// @ai:effects pure
fn lex_number(source: &str, start: usize) -> Result<(Number, usize)> {
    let bytes = source.as_bytes();
    let mut pos = start;

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let int_part = &source[int_start..pos];

    let mut frac_part: Option<&str> = None;
    if pos < bytes.len() && bytes[pos] == b'.' {
        pos += 1;
        let frac_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        frac_part = Some(&source[frac_start..pos]);
    }

    if int_part.is_empty() && frac_part.map_or(true, str::is_empty) {
        return Err(Error::invalid(format!("stray '.' at offset {}", start)));
    }

    let mut exponent: Option<&str> = None;
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut look = pos + 1;
        if look < bytes.len() && (bytes[look] == b'+' || bytes[look] == b'-') {
            look += 1;
        }
        let digits_start = look;
        while look < bytes.len() && bytes[look].is_ascii_digit() {
            look += 1;
        }
        if look > digits_start {
            exponent = Some(&source[pos + 1..look]);
            pos = look;
        }
    }

    // "2x", "1j", "0x10", "1.2.3" and similar are not arithmetic
    if pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_' || bytes[pos] == b'.') {
        return Err(Error::invalid(format!(
            "malformed numeric literal {:?} at offset {}",
            &source[start..=pos],
            start
        )));
    }

    let literal = &source[start..pos];

    if frac_part.is_none() && exponent.is_none() {
        if int_part.len() > 1 && int_part.starts_with('0') && int_part.bytes().any(|b| b != b'0') {
            return Err(Error::invalid(format!(
                "leading zeros are not permitted in integer literal {:?}",
                literal
            )));
        }
        let number = match int_part.parse::<i128>() {
            Ok(i) => Number::Int(i),
            Err(_) => Number::Float(parse_float(int_part, "0", None, literal)?),
        };
        return Ok((number, pos));
    }

    let int_digits = if int_part.is_empty() { "0" } else { int_part };
    let frac_digits = match frac_part {
        Some(f) if !f.is_empty() => f,
        _ => "0",
    };
    let value = parse_float(int_digits, frac_digits, exponent, literal)?;
    Ok((Number::Float(value), pos))
}

/// @ai:intent Parse normalized float components
/// @ai:effects pure
fn parse_float(int_digits: &str, frac_digits: &str, exponent: Option<&str>, literal: &str) -> Result<f64> {
    let normalized = match exponent {
        Some(exp) => format!("{}.{}e{}", int_digits, frac_digits, exp),
        None => format!("{}.{}", int_digits, frac_digits),
    };

    let value: f64 = normalized
        .parse()
        .map_err(|_| Error::invalid(format!("malformed numeric literal {:?}", literal)))?;

    if !value.is_finite() {
        return Err(Error::invalid(format!("numeric literal {:?} is out of range", literal)));
    }
    Ok(value)
}
