//! @ai:module:intent Parse token streams into arithmetic expression trees
//! @ai:module:layer application
//! @ai:module:public_api parse_expression
//! @ai:module:depends_on lexer, ast, error
//! @ai:module:stateless true

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::{Error, Result};
use crate::lexer::{tokenize, Token, TokenKind};

/// Maximum nesting of parentheses, unary signs and exponents.
pub const MAX_DEPTH: usize = 256;

/// @ai:intent Parse an arithmetic expression into an AST
/// @ai:pre expression is untrusted text
/// @ai:post the tree only contains Literal, Binary and Unary nodes
/// @ai:effects pure
/// @ai:example ("-2**2") -> Unary(Neg, Binary(Pow, 2, 2))
pub fn parse_expression(expression: &str) -> Result<Expr> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(Error::invalid("empty expression"));
    }

    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expr()?;

    if let Some(token) = parser.peek() {
        return Err(Error::invalid(format!(
            "unexpected {} at offset {}",
            describe(&token.kind),
            token.offset
        )));
    }

    Ok(expr)
}

/// Recursive descent over:
///
/// ```text
/// expr   := term (('+' | '-') term)*
/// term   := factor (('*' | '/' | '//' | '%') factor)*
/// factor := ('+' | '-') factor | power
/// power  := atom ['**' factor]
/// atom   := NUMBER | '(' expr ')'
/// ```
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(Error::invalid(format!(
                "expression nested deeper than {} levels",
                MAX_DEPTH
            )));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn expr(&mut self) -> Result<Expr> {
        let mut lhs = self.term()?;

        while let Some(token) = self.peek() {
            let op = match token.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::binary(op, lhs, rhs);
        }

        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr> {
        let mut lhs = self.factor()?;

        while let Some(token) = self.peek() {
            let op = match token.kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::DoubleSlash => BinaryOp::FloorDiv,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.factor()?;
            lhs = Expr::binary(op, lhs, rhs);
        }

        Ok(lhs)
    }

    fn factor(&mut self) -> Result<Expr> {
        let op = match self.peek().map(|t| t.kind) {
            Some(TokenKind::Plus) => Some(UnaryOp::Plus),
            Some(TokenKind::Minus) => Some(UnaryOp::Neg),
            _ => None,
        };

        match op {
            Some(op) => {
                self.pos += 1;
                self.enter()?;
                let operand = self.factor();
                self.leave();
                Ok(Expr::unary(op, operand?))
            }
            None => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr> {
        let base = self.atom()?;

        if matches!(self.peek().map(|t| t.kind), Some(TokenKind::DoubleStar)) {
            self.pos += 1;
            self.enter()?;
            let exponent = self.factor();
            self.leave();
            return Ok(Expr::binary(BinaryOp::Pow, base, exponent?));
        }

        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr> {
        let token = self
            .advance()
            .ok_or_else(|| Error::invalid("unexpected end of expression"))?;

        match token.kind {
            TokenKind::Number(n) => Ok(Expr::Literal(n)),
            TokenKind::LParen => {
                self.enter()?;
                let inner = self.expr();
                self.leave();
                let inner = inner?;

                match self.advance() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(Error::invalid(format!(
                        "expected ')' but found {} at offset {}",
                        describe(&other.kind),
                        other.offset
                    ))),
                    None => Err(Error::invalid(format!(
                        "unclosed '(' at offset {}",
                        token.offset
                    ))),
                }
            }
            other => Err(Error::invalid(format!(
                "unexpected {} at offset {}",
                describe(&other),
                token.offset
            ))),
        }
    }
}

/// @ai:intent Human-readable token description for error messages
/// @ai:effects pure
fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Number(n) => format!("number {}", n),
        TokenKind::Plus => "'+'".to_string(),
        TokenKind::Minus => "'-'".to_string(),
        TokenKind::Star => "'*'".to_string(),
        TokenKind::DoubleStar => "'**'".to_string(),
        TokenKind::Slash => "'/'".to_string(),
        TokenKind::DoubleSlash => "'//'".to_string(),
        TokenKind::Percent => "'%'".to_string(),
        TokenKind::LParen => "'('".to_string(),
        TokenKind::RParen => "')'".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_respects_precedence() {
        let expr = parse_expression("1 + 2 * 3").unwrap();
        assert_eq!(expr.to_string(), "(1 + (2 * 3))");
    }

    #[test]
    fn test_parse_left_associative_subtraction() {
        let expr = parse_expression("10 - 4 - 2").unwrap();
        assert_eq!(expr.to_string(), "((10 - 4) - 2)");
    }

    #[test]
    fn test_parse_power_is_right_associative_and_binds_over_unary() {
        assert_eq!(parse_expression("2**3**2").unwrap().to_string(), "(2 ** (3 ** 2))");
        assert_eq!(parse_expression("-2**2").unwrap().to_string(), "(-(2 ** 2))");
        assert_eq!(parse_expression("2**-1").unwrap().to_string(), "(2 ** (-1))");
    }

    #[test]
    fn test_parse_rejects_incomplete_input() {
        for src in ["", "   ", "1 +", "(1 + 2", "1 + 2)", "()", "* 3", "4 4"] {
            assert!(parse_expression(src).is_err(), "accepted {:?}", src);
        }
    }

    #[test]
    fn test_parse_rejects_excessive_nesting() {
        let deep = format!("{}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert!(parse_expression(&deep).is_err());

        let ok = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert!(parse_expression(&ok).is_ok());

        let signs = format!("{}1", "-".repeat(MAX_DEPTH + 1));
        assert!(parse_expression(&signs).is_err());
    }
}
