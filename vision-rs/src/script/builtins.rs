//! Arithmetic, logical and comparison builtins.
//!
//! Each operator takes one number per data section and yields a number.
//! Logical and comparison operators yield `1` or `0`.

use crate::error::{Error, Result};

/// Every math operator name.
pub const MATH_OPERATORS: &[&str] = &["+", "-", "*", "/", "%", "&", "|", "!", "<", ">=", "=", "<>", ">", "<="];

/// Number of data sections `name` takes, or `None` if it is not an operator.
pub fn math_arity(name: &str) -> Option<usize> {
    match name {
        "!" => Some(1),
        "+" | "-" | "*" | "/" | "%" | "&" | "|" | "<" | ">=" | "=" | "<>" | ">" | "<=" => Some(2),
        _ => None,
    }
}

/// Apply the operator `name`.
///
/// Returns `None` if `name` is not an operator.  The caller checks the arity
/// first; missing operands read as `0`.
pub fn call_math(name: &str, operands: &[f64]) -> Option<Result<f64>> {
    let a = operands.first().copied().unwrap_or(0.0);
    let b = operands.get(1).copied().unwrap_or(0.0);
    Some(Ok(match name {
        "+" => a + b,
        "-" => a - b,
        "*" => a * b,
        "/" => {
            if b == 0.0 {
                return Some(Err(Error::DivisionByZero));
            }
            a / b
        }
        "%" => {
            if b == 0.0 {
                return Some(Err(Error::DivisionByZero));
            }
            a % b
        }
        "&" => truth(a != 0.0 && b != 0.0),
        "|" => truth(a != 0.0 || b != 0.0),
        "!" => truth(a == 0.0),
        "<" => truth(a < b),
        ">=" => truth(a >= b),
        "=" => truth(a == b),
        "<>" => truth(a != b),
        ">" => truth(a > b),
        "<=" => truth(a <= b),
        _ => return None,
    }))
}

fn truth(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn math(name: &str, operands: &[f64]) -> f64 {
        call_math(name, operands).unwrap().unwrap()
    }

    #[test]
    fn arithmetic() {
        assert_eq!(math("+", &[2.0, 3.0]), 5.0);
        assert_eq!(math("-", &[2.0, 3.0]), -1.0);
        assert_eq!(math("*", &[2.5, 4.0]), 10.0);
        assert_eq!(math("/", &[1.0, 4.0]), 0.25);
        assert_eq!(math("%", &[7.5, 2.0]), 1.5);
        assert_eq!(math("%", &[-7.0, 3.0]), -1.0);
    }

    #[test]
    fn division_by_zero() {
        for op in ["/", "%"] {
            let err = call_math(op, &[1.0, 0.0]).unwrap().unwrap_err();
            assert_eq!(err.to_string(), "Division by zero.");
        }
    }

    #[test]
    fn logic_yields_zero_or_one() {
        assert_eq!(math("&", &[2.0, 3.0]), 1.0);
        assert_eq!(math("&", &[2.0, 0.0]), 0.0);
        assert_eq!(math("|", &[0.0, 0.0]), 0.0);
        assert_eq!(math("|", &[0.0, -1.0]), 1.0);
        assert_eq!(math("!", &[0.0]), 1.0);
        assert_eq!(math("!", &[5.0]), 0.0);
    }

    #[test]
    fn comparisons() {
        assert_eq!(math("<", &[1.0, 2.0]), 1.0);
        assert_eq!(math(">=", &[1.0, 2.0]), 0.0);
        assert_eq!(math("=", &[2.0, 2.0]), 1.0);
        assert_eq!(math("<>", &[2.0, 2.0]), 0.0);
        assert_eq!(math(">", &[3.0, 2.0]), 1.0);
        assert_eq!(math("<=", &[3.0, 2.0]), 0.0);
        assert_eq!(math("=", &[f64::NAN, f64::NAN]), 0.0);
    }

    #[test]
    fn arities_cover_every_operator() {
        for op in MATH_OPERATORS {
            assert!(math_arity(op).is_some(), "{op}");
        }
        assert_eq!(math_arity("!"), Some(1));
        assert_eq!(math_arity("def"), None);
        assert!(call_math("def", &[]).is_none());
    }
}
