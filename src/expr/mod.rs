//! Sandboxed arithmetic evaluation.
//!
//! The grammar is closed: numeric literals, `+ - * / **`, parentheses, and
//! calls to the allow-listed `abs` and `round`. There are no variables, no
//! strings, no attribute access, and no way to name anything outside the
//! allow list, so untrusted model output can be evaluated without touching
//! an interpreter. `**` is right-associative and binds tighter than unary
//! minus (`-2 ** 2` is `-4`), and `round` rounds ties to even.

mod eval;
mod parser;
mod token;

use thiserror::Error;

/// Why an expression failed to produce a number.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    /// The source was empty or all whitespace.
    #[error("empty expression")]
    Empty,
    /// A character outside the grammar's alphabet.
    #[error("unexpected character '{ch}' at byte {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    /// Tokens in an order the grammar does not admit.
    #[error("syntax error: {0}")]
    Syntax(String),
    /// An identifier that is not on the allow list.
    #[error("name '{0}' is not defined")]
    UnknownName(String),
    /// A call with the wrong number of arguments.
    #[error("{func}() takes {expected} ({got} given)")]
    Arity {
        func: &'static str,
        expected: &'static str,
        got: usize,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("zero cannot be raised to a negative power")]
    ZeroToNegativePower,
    /// `round` was given a fractional or non-finite digit count.
    #[error("round() digit count must be a whole number")]
    NonIntegralDigits,
    /// Parenthesis, sign, or call nesting past the depth budget.
    #[error("expression nests too deeply")]
    TooDeep,
}

/// Parse and evaluate `source`, returning its numeric value.
///
/// # Errors
///
/// Returns an [`ExprError`] when the source does not conform to the
/// grammar or the arithmetic itself is undefined (division by zero, zero
/// raised to a negative power, a bad `round` digit count).
pub fn evaluate(source: &str) -> Result<f64, ExprError> {
    let tree = parser::parse(source)?;
    eval::eval(&tree)
}
