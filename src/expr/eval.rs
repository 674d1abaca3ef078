//! Tree-walking evaluator over IEEE-754 doubles.
//!
//! Division by zero and zero to a negative power are reported as errors;
//! overflow and invalid operations follow IEEE semantics instead, so `inf`
//! and `NaN` flow through to the caller as ordinary values.

use super::ExprError;
use super::parser::{BinOp, Expr, Func};

/// Evaluate a parsed expression.
///
/// Operator chains like `1 + 1 + 1 + ...` nest on the left without bound
/// (the parser only depth-caps parenthesized and unary structure), so the
/// left spine is walked with an explicit stack. Right subtrees are capped
/// by the parser and evaluated recursively.
pub(crate) fn eval(expr: &Expr) -> Result<f64, ExprError> {
    let mut pending = Vec::new();
    let mut node = expr;
    let mut value = loop {
        match node {
            Expr::Binary { op, left, right } => {
                pending.push((*op, right.as_ref()));
                node = left;
            }
            Expr::Number(value) => break *value,
            Expr::Neg(operand) => break -eval(operand)?,
            Expr::Call { func, args } => break call(*func, args)?,
        }
    };
    while let Some((op, right)) = pending.pop() {
        let rhs = eval(right)?;
        value = apply(op, value, rhs)?;
    }
    Ok(value)
}

fn apply(op: BinOp, lhs: f64, rhs: f64) -> Result<f64, ExprError> {
    match op {
        BinOp::Add => Ok(lhs + rhs),
        BinOp::Sub => Ok(lhs - rhs),
        BinOp::Mul => Ok(lhs * rhs),
        BinOp::Div => {
            if rhs == 0.0 {
                Err(ExprError::DivisionByZero)
            } else {
                Ok(lhs / rhs)
            }
        }
        BinOp::Pow => {
            if lhs == 0.0 && rhs < 0.0 {
                Err(ExprError::ZeroToNegativePower)
            } else {
                Ok(lhs.powf(rhs))
            }
        }
    }
}

fn call(func: Func, args: &[Expr]) -> Result<f64, ExprError> {
    match func {
        Func::Abs => match args {
            [operand] => Ok(eval(operand)?.abs()),
            _ => Err(ExprError::Arity {
                func: "abs",
                expected: "exactly 1 argument",
                got: args.len(),
            }),
        },
        Func::Round => match args {
            [operand] => Ok(eval(operand)?.round_ties_even()),
            [operand, digits] => {
                let value = eval(operand)?;
                let digits = eval(digits)?;
                round_to(value, digits)
            }
            _ => Err(ExprError::Arity {
                func: "round",
                expected: "1 or 2 arguments",
                got: args.len(),
            }),
        },
    }
}

/// `round(value, digits)` with ties to even at the requested decimal place.
fn round_to(value: f64, digits: f64) -> Result<f64, ExprError> {
    if !digits.is_finite() || digits.fract() != 0.0 {
        return Err(ExprError::NonIntegralDigits);
    }
    if !value.is_finite() {
        return Ok(value);
    }
    // Below 10^-308 the nearest representable grid point is zero for every
    // finite double, and the scale factor itself stops being representable.
    if digits < -308.0 {
        return Ok(f64::copysign(0.0, value));
    }
    let scale = 10f64.powi(digits as i32);
    let scaled = value * scale;
    if !scaled.is_finite() {
        // The requested precision is finer than one ulp of the value, so
        // the value is already exact at that many digits.
        return Ok(value);
    }
    Ok(scaled.round_ties_even() / scale)
}

#[cfg(test)]
mod tests {
    use super::super::parser::parse;
    use super::*;

    fn eval_str(src: &str) -> Result<f64, ExprError> {
        eval(&parse(src)?)
    }

    fn value(src: &str) -> f64 {
        eval_str(src).unwrap()
    }

    #[test]
    fn arithmetic_follows_precedence() {
        assert_eq!(value("1 + 2 * 3"), 7.0);
        assert_eq!(value("(1 + 2) * 3"), 9.0);
        assert_eq!(value("10 - 4 - 3"), 3.0);
        assert_eq!(value("7 / 2"), 3.5);
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert_eq!(eval_str("1 / 0"), Err(ExprError::DivisionByZero));
        assert_eq!(eval_str("1 / (2 - 2)"), Err(ExprError::DivisionByZero));
    }

    #[test]
    fn power_binds_tighter_than_negation() {
        assert_eq!(value("-2 ** 2"), -4.0);
        assert_eq!(value("(-2) ** 2"), 4.0);
    }

    #[test]
    fn power_accepts_signed_exponents() {
        assert_eq!(value("2 ** -1"), 0.5);
        assert_eq!(value("2 ** 3 ** 2"), 512.0);
        assert_eq!(value("0 ** 0"), 1.0);
    }

    #[test]
    fn zero_to_negative_power_is_an_error() {
        assert_eq!(eval_str("0 ** -1"), Err(ExprError::ZeroToNegativePower));
        assert_eq!(
            eval_str("(1 - 1) ** -2"),
            Err(ExprError::ZeroToNegativePower)
        );
    }

    #[test]
    fn overflow_and_invalid_operations_flow_through() {
        assert_eq!(value("2 ** 10000"), f64::INFINITY);
        assert_eq!(value("-2 ** 10000"), f64::NEG_INFINITY);
        assert!(value("(-1) ** 0.5").is_nan());
    }

    #[test]
    fn abs_takes_exactly_one_argument() {
        assert_eq!(value("abs(-3.5)"), 3.5);
        assert_eq!(value("abs(2 - 5)"), 3.0);
        assert_eq!(
            eval_str("abs()"),
            Err(ExprError::Arity {
                func: "abs",
                expected: "exactly 1 argument",
                got: 0,
            })
        );
        assert_eq!(
            eval_str("abs(1, 2)"),
            Err(ExprError::Arity {
                func: "abs",
                expected: "exactly 1 argument",
                got: 2,
            })
        );
    }

    #[test]
    fn round_ties_to_even() {
        assert_eq!(value("round(0.5)"), 0.0);
        assert_eq!(value("round(1.5)"), 2.0);
        assert_eq!(value("round(2.5)"), 2.0);
        assert_eq!(value("round(-2.5)"), -2.0);
        assert_eq!(value("round(2.6)"), 3.0);
    }

    #[test]
    fn round_honors_digit_count() {
        assert_eq!(value("round(2.675, 2)"), 2.67);
        assert_eq!(value("round(3.14159, 3)"), 3.142);
        assert_eq!(value("round(1250, -2)"), 1200.0);
        assert_eq!(value("round(2.5, 0)"), 2.0);
    }

    #[test]
    fn round_rejects_fractional_digit_counts() {
        assert_eq!(eval_str("round(1.5, 0.5)"), Err(ExprError::NonIntegralDigits));
        assert_eq!(
            eval_str("round(1.5, 1 / 3)"),
            Err(ExprError::NonIntegralDigits)
        );
    }

    #[test]
    fn round_saturates_at_extreme_digit_counts() {
        assert_eq!(value("round(123.456, 400)"), 123.456);
        assert_eq!(value("round(123.456, -400)"), 0.0);
        assert_eq!(value("round(123.456, 10)"), 123.456);
    }

    #[test]
    fn round_arity_is_checked() {
        assert_eq!(
            eval_str("round()"),
            Err(ExprError::Arity {
                func: "round",
                expected: "1 or 2 arguments",
                got: 0,
            })
        );
        assert_eq!(
            eval_str("round(1, 2, 3)"),
            Err(ExprError::Arity {
                func: "round",
                expected: "1 or 2 arguments",
                got: 3,
            })
        );
    }

    #[test]
    fn calls_nest() {
        assert_eq!(value("abs(round(-2.675, 2))"), 2.67);
        assert_eq!(value("round(abs(-2.5), 0)"), 2.0);
    }

    #[test]
    fn long_flat_chains_evaluate_without_deep_recursion() {
        let src = vec!["1"; 10_000].join(" + ");
        assert_eq!(value(&src), 10_000.0);
    }
}
