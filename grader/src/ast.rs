//! @ai:module:intent Expression tree and numeric value types for arithmetic expressions
//! @ai:module:layer domain
//! @ai:module:public_api Expr, BinaryOp, UnaryOp, Number
//! @ai:module:stateless true

use serde_json::Value;
use std::fmt;

/// @ai:intent Numeric value produced by literals and evaluation
///            Integers stay exact until they overflow, then become floats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i128),
    Float(f64),
}

/// Largest magnitude an f64 may have and still truncate into an i128.
pub(crate) const I128_F64_LIMIT: f64 = 1.7e38;

impl Number {
    /// @ai:intent Widen the number to a float
    /// @ai:effects pure
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// @ai:intent Check whether the value is exactly equal to an integer
    /// @ai:effects pure
    /// @ai:example (Float(24.0), 24) -> true
    /// @ai:example (Float(24.5), 24) -> false
    pub fn equals_integer(&self, other: i128) -> bool {
        match *self {
            Number::Int(i) => i == other,
            Number::Float(f) => {
                f.is_finite() && f.fract() == 0.0 && f.abs() < I128_F64_LIMIT && f as i128 == other
            }
        }
    }

    /// @ai:intent Convert to a JSON number, falling back to float for very large integers
    /// @ai:effects pure
    pub fn to_json(&self) -> Value {
        match *self {
            Number::Int(i) => match i64::try_from(i) {
                Ok(small) => Value::from(small),
                Err(_) => Value::from(i as f64),
            },
            Number::Float(f) => Value::from(f),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 => {
                write!(f, "{:.1}", x)
            }
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

/// @ai:intent Binary arithmetic operators accepted by the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

impl BinaryOp {
    /// @ai:intent Source symbol of the operator
    /// @ai:effects pure
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
        }
    }
}

/// @ai:intent Unary arithmetic operators accepted by the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Neg,
}

impl UnaryOp {
    /// @ai:intent Source symbol of the operator
    /// @ai:effects pure
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Neg => "-",
        }
    }
}

/// @ai:intent Closed set of expression nodes; nothing outside this enum can be evaluated
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Number),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
}

impl Expr {
    /// @ai:intent Build a binary node
    /// @ai:effects pure
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// @ai:intent Build a unary node
    /// @ai:effects pure
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(n) => write!(f, "{}", n),
            Expr::Binary { op, lhs, rhs } => write!(f, "({} {} {})", lhs, op.symbol(), rhs),
            Expr::Unary { op, operand } => write!(f, "({}{})", op.symbol(), operand),
        }
    }
}
