//! @ai:module:intent Evaluate arithmetic expressions from untrusted model output
//! @ai:module:layer application
//! @ai:module:public_api evaluate, evaluate_expr
//! @ai:module:depends_on parser, ast, error
//! @ai:module:stateless true

use crate::ast::{BinaryOp, Expr, Number, UnaryOp};
use crate::error::{Error, Result};
use crate::parser::parse_expression;

/// @ai:intent Parse and evaluate an arithmetic expression
/// @ai:pre expression is untrusted text
/// @ai:post Ok only for pure arithmetic over numeric literals with + - * / // % ** and unary + -
/// @ai:effects pure
/// @ai:example ("(10-4)*(9-2)") -> Int(42)
/// @ai:example ("7/2") -> Float(3.5)
pub fn evaluate(expression: &str) -> Result<Number> {
    let expr = parse_expression(expression)?;
    evaluate_expr(&expr)
}

/// @ai:intent Walk an expression tree and compute its value
/// @ai:effects pure
pub fn evaluate_expr(expr: &Expr) -> Result<Number> {
    let value = match expr {
        Expr::Literal(n) => *n,
        Expr::Binary { op, lhs, rhs } => {
            let left = evaluate_expr(lhs)?;
            let right = evaluate_expr(rhs)?;
            apply_binary(*op, left, right)?
        }
        Expr::Unary { op, operand } => apply_unary(*op, evaluate_expr(operand)?),
    };

    match value {
        Number::Float(f) if f.is_nan() => Err(Error::invalid("result is not a real number")),
        Number::Float(f) if f.is_infinite() => Err(Error::invalid("numeric overflow")),
        _ => Ok(value),
    }
}

/// @ai:intent Apply a unary operator
/// @ai:effects pure
fn apply_unary(op: UnaryOp, value: Number) -> Number {
    match (op, value) {
        (UnaryOp::Plus, v) => v,
        (UnaryOp::Neg, Number::Int(i)) => match i.checked_neg() {
            Some(n) => Number::Int(n),
            None => Number::Float(-(i as f64)),
        },
        (UnaryOp::Neg, Number::Float(f)) => Number::Float(-f),
    }
}

/// @ai:intent Apply a binary operator, staying in integers while exact
/// @ai:effects pure
fn apply_binary(op: BinaryOp, lhs: Number, rhs: Number) -> Result<Number> {
    match (lhs, rhs) {
        (Number::Int(a), Number::Int(b)) => int_binary(op, a, b),
        (a, b) => float_binary(op, a.as_f64(), b.as_f64()).map(Number::Float),
    }
}

fn int_binary(op: BinaryOp, a: i128, b: i128) -> Result<Number> {
    let exact = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        BinaryOp::Div => {
            if b == 0 {
                return Err(division_by_zero());
            }
            return Ok(Number::Float(a as f64 / b as f64));
        }
        BinaryOp::FloorDiv => {
            if b == 0 {
                return Err(division_by_zero());
            }
            floor_div_int(a, b)
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(division_by_zero());
            }
            Some(floor_mod_int(a, b))
        }
        BinaryOp::Pow => {
            if b < 0 {
                if a == 0 {
                    return Err(Error::invalid("zero cannot be raised to a negative power"));
                }
                return Ok(Number::Float((a as f64).powf(b as f64)));
            }
            u32::try_from(b).ok().and_then(|exp| a.checked_pow(exp))
        }
    };

    match exact {
        Some(value) => Ok(Number::Int(value)),
        None => float_binary(op, a as f64, b as f64).map(Number::Float),
    }
}

fn float_binary(op: BinaryOp, a: f64, b: f64) -> Result<f64> {
    match op {
        BinaryOp::Add => Ok(a + b),
        BinaryOp::Sub => Ok(a - b),
        BinaryOp::Mul => Ok(a * b),
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(division_by_zero());
            }
            Ok(a / b)
        }
        BinaryOp::FloorDiv => {
            if b == 0.0 {
                return Err(division_by_zero());
            }
            Ok(float_divmod(a, b).0)
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                return Err(division_by_zero());
            }
            Ok(float_divmod(a, b).1)
        }
        BinaryOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err(Error::invalid("zero cannot be raised to a negative power"));
            }
            if a < 0.0 && b.fract() != 0.0 {
                return Err(Error::invalid("negative base with fractional exponent"));
            }
            let value = a.powf(b);
            if value.is_infinite() && a.is_finite() && b.is_finite() {
                return Err(Error::invalid("numeric overflow"));
            }
            Ok(value)
        }
    }
}

fn division_by_zero() -> Error {
    Error::invalid("division by zero")
}

/// Integer division rounding toward negative infinity.
fn floor_div_int(a: i128, b: i128) -> Option<i128> {
    let q = a.checked_div(b)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q.checked_sub(1)
    } else {
        Some(q)
    }
}

/// Remainder carrying the sign of the divisor.
fn floor_mod_int(a: i128, b: i128) -> i128 {
    match a.checked_rem(b) {
        Some(r) if r != 0 && ((r < 0) != (b < 0)) => r + b,
        Some(r) => r,
        None => 0,
    }
}

/// Floor quotient and divisor-signed remainder for floats.
fn float_divmod(a: f64, b: f64) -> (f64, f64) {
    let mut m = a % b;
    let mut div = (a - m) / b;

    if m != 0.0 {
        if (b < 0.0) != (m < 0.0) {
            m += b;
            div -= 1.0;
        }
    } else {
        m = 0.0f64.copysign(b);
    }

    let floordiv = if div != 0.0 {
        let mut f = div.floor();
        if div - f > 0.5 {
            f += 1.0;
        }
        f
    } else {
        0.0f64.copysign(a / b)
    };

    (floordiv, m)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(src: &str) -> i128 {
        match evaluate(src).unwrap() {
            Number::Int(i) => i,
            other => panic!("{} evaluated to non-integer {:?}", src, other),
        }
    }

    fn float(src: &str) -> f64 {
        match evaluate(src).unwrap() {
            Number::Float(f) => f,
            other => panic!("{} evaluated to non-float {:?}", src, other),
        }
    }

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(int("(10-4)*(9-2)"), 42);
        assert_eq!(int("4+9+10+2"), 25);
        assert_eq!(int("2**10"), 1024);
        assert_eq!(int("-3 + +5"), 2);
    }

    #[test]
    fn test_true_division_is_float() {
        assert_eq!(float("7/2"), 3.5);
        assert_eq!(float("8/2"), 4.0);
    }

    #[test]
    fn test_floor_division_and_modulo_follow_divisor_sign() {
        assert_eq!(int("7//2"), 3);
        assert_eq!(int("-7//2"), -4);
        assert_eq!(int("7//-2"), -4);
        assert_eq!(int("-7%3"), 2);
        assert_eq!(int("7%-3"), -2);
        assert_eq!(float("7.5//2"), 3.0);
        assert_eq!(float("-7.5%2"), 0.5);
        assert_eq!(float("7.5%-2"), -0.5);
    }

    #[test]
    fn test_power_semantics() {
        assert_eq!(int("-2**2"), -4);
        assert_eq!(float("2**-1"), 0.5);
        assert_eq!(float("4**0.5"), 2.0);
    }

    #[test]
    fn test_arithmetic_errors_are_invalid_expressions() {
        for src in ["1/0", "1//0", "1%0", "1.0/0", "0**-1", "(-8)**(1/3)", "10.0**400"] {
            assert!(
                matches!(evaluate(src), Err(Error::InvalidExpression(_))),
                "accepted {:?}",
                src
            );
        }
    }

    #[test]
    fn test_integer_overflow_falls_back_to_float() {
        let value = evaluate("10**30 * 10**30").unwrap();
        assert!(matches!(value, Number::Float(f) if (f - 1e60).abs() < 1e45));
    }

    #[test]
    fn test_rejects_code_injection() {
        for src in [
            "__import__('os').system('echo hi')",
            "open('/etc/passwd').read()",
            "(lambda: 1)()",
            "[x for x in range(3)]",
            "1 if 1 else 2",
            "not 1",
            "1 == 1",
            "~1",
            "a",
        ] {
            assert!(
                matches!(evaluate(src), Err(Error::InvalidExpression(_))),
                "accepted {:?}",
                src
            );
        }
    }
}
