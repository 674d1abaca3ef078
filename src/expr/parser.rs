//! Recursive-descent parser for the restricted arithmetic grammar.
//!
//! Precedence (lowest → highest):
//! 4. `+`, `-` (binary)
//! 3. `*`, `/`
//! 2. unary `-`, `+`
//! 1. `**` (right-associative; binds tighter than unary on its left and
//!    admits a signed exponent on its right: `-2**2 == -4`, `2**-1 == 0.5`)
//! 0. literals, calls, `(...)`
//!
//! Identifiers are legal only as call heads, and only the two allow-listed
//! names resolve. The grammar has no other names, no attribute access, and
//! no statements, so there is nothing to escape into.

use super::ExprError;
use super::token::{Token, tokenize};

/// Nesting budget for parenthesized, unary, and call structure. Keeps
/// adversarial input from exhausting the parse/eval stack.
pub(crate) const MAX_DEPTH: u32 = 64;

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Number(f64),
    Neg(Box<Expr>),
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        func: Func,
        args: Vec<Expr>,
    },
}

// Teardown must not recurse per node: a flat `1 + 1 + ...` chain parses
// to a left spine as deep as the input is long, and the derived drop glue
// would unwind it one stack frame per term. Children are detached onto a
// worklist instead, so any tree drops in constant stack.
impl Drop for Expr {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.detach_children(&mut pending);
        }
    }
}

impl Expr {
    /// Replace every child with a leaf, handing the subtrees to `pending`.
    fn detach_children(&mut self, pending: &mut Vec<Expr>) {
        match self {
            Expr::Number(_) => {}
            Expr::Neg(operand) => {
                pending.push(std::mem::replace(operand.as_mut(), Expr::Number(0.0)));
            }
            Expr::Binary { left, right, .. } => {
                pending.push(std::mem::replace(left.as_mut(), Expr::Number(0.0)));
                pending.push(std::mem::replace(right.as_mut(), Expr::Number(0.0)));
            }
            Expr::Call { args, .. } => pending.append(args),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// The entire callable surface of the sandbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Func {
    Abs,
    Round,
}

impl Func {
    fn resolve(name: &str) -> Option<Self> {
        match name {
            "abs" => Some(Self::Abs),
            "round" => Some(Self::Round),
            _ => None,
        }
    }
}

/// Parse `src` into an expression tree.
pub(crate) fn parse(src: &str) -> Result<Expr, ExprError> {
    let tokens = tokenize(src)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.parse_expr()?;
    if let Some(trailing) = parser.peek() {
        return Err(ExprError::Syntax(format!("unexpected {trailing}")));
    }
    Ok(expr)
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: u32,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, context: &str) -> Result<(), ExprError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.unexpected(context))
        }
    }

    fn unexpected(&self, context: &str) -> ExprError {
        match self.peek() {
            Some(token) => ExprError::Syntax(format!("expected {context}, found {token}")),
            None => ExprError::Syntax(format!("expected {context}, found end of expression")),
        }
    }

    /// Expression entry point; every nested re-entry (parens, call
    /// arguments) passes through here and counts against the depth budget.
    fn parse_expr(&mut self) -> Result<Expr, ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            self.depth -= 1;
            return Err(ExprError::TooDeep);
        }
        let result = self.parse_add();
        self.depth -= 1;
        result
    }

    /// `add := mul (("+" | "-") mul)*`
    fn parse_add(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_mul()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_mul()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// `mul := unary (("*" | "/") unary)*`
    fn parse_mul(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// `unary := ("+" | "-") unary | power`. Sign chains recurse, so they
    /// count against the depth budget too.
    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            self.depth -= 1;
            return Err(ExprError::TooDeep);
        }
        let result = match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                self.parse_unary().map(|operand| Expr::Neg(Box::new(operand)))
            }
            Some(Token::Plus) => {
                // Unary plus is the identity on numbers.
                self.pos += 1;
                self.parse_unary()
            }
            _ => self.parse_power(),
        };
        self.depth -= 1;
        result
    }

    /// `power := primary ("**" unary)?`. The recursion into `unary` makes
    /// `**` right-associative and lets the exponent carry its own sign.
    fn parse_power(&mut self) -> Result<Expr, ExprError> {
        let base = self.parse_primary()?;
        if self.eat(&Token::StarStar) {
            let exponent = self.parse_unary()?;
            return Ok(Expr::Binary {
                op: BinOp::Pow,
                left: Box::new(base),
                right: Box::new(exponent),
            });
        }
        Ok(base)
    }

    /// `primary := NUMBER | IDENT "(" args ")" | "(" expr ")"`
    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        match self.advance().cloned() {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::LParen) => {
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => {
                let Some(func) = Func::resolve(&name) else {
                    return Err(ExprError::UnknownName(name));
                };
                self.expect(&Token::LParen, &format!("'(' after '{name}'"))?;
                let args = self.parse_args()?;
                Ok(Expr::Call { func, args })
            }
            Some(token) => Err(ExprError::Syntax(format!(
                "expected a value, found {token}"
            ))),
            None => Err(ExprError::Syntax(
                "expected a value, found end of expression".into(),
            )),
        }
    }

    /// `args := [ expr ("," expr)* ]`. Consumes the closing paren. Empty
    /// argument lists parse; arity is enforced at evaluation.
    fn parse_args(&mut self) -> Result<Vec<Expr>, ExprError> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(&Token::RParen, "')' to close the argument list")?;
            return Ok(args);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(value: f64) -> Box<Expr> {
        Box::new(Expr::Number(value))
    }

    #[test]
    fn addition_is_left_associative() {
        let expr = parse("1 - 2 + 3").unwrap();
        assert_eq!(
            expr,
            Expr::Binary {
                op: BinOp::Add,
                left: Box::new(Expr::Binary {
                    op: BinOp::Sub,
                    left: num(1.0),
                    right: num(2.0),
                }),
                right: num(3.0),
            }
        );
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = parse("1 + 2 * 3").unwrap();
        assert_eq!(
            expr,
            Expr::Binary {
                op: BinOp::Add,
                left: num(1.0),
                right: Box::new(Expr::Binary {
                    op: BinOp::Mul,
                    left: num(2.0),
                    right: num(3.0),
                }),
            }
        );
    }

    #[test]
    fn power_is_right_associative() {
        let expr = parse("2 ** 3 ** 2").unwrap();
        assert_eq!(
            expr,
            Expr::Binary {
                op: BinOp::Pow,
                left: num(2.0),
                right: Box::new(Expr::Binary {
                    op: BinOp::Pow,
                    left: num(3.0),
                    right: num(2.0),
                }),
            }
        );
    }

    #[test]
    fn negation_applies_outside_power() {
        let expr = parse("-2 ** 2").unwrap();
        assert_eq!(
            expr,
            Expr::Neg(Box::new(Expr::Binary {
                op: BinOp::Pow,
                left: num(2.0),
                right: num(2.0),
            }))
        );
    }

    #[test]
    fn exponent_may_carry_a_sign() {
        let expr = parse("2 ** -1").unwrap();
        assert_eq!(
            expr,
            Expr::Binary {
                op: BinOp::Pow,
                left: num(2.0),
                right: Box::new(Expr::Neg(num(1.0))),
            }
        );
    }

    #[test]
    fn unary_plus_is_dropped() {
        assert_eq!(parse("+5").unwrap(), Expr::Number(5.0));
    }

    #[test]
    fn call_with_two_arguments() {
        let expr = parse("round(2.5, 1)").unwrap();
        assert_eq!(
            expr,
            Expr::Call {
                func: Func::Round,
                args: vec![Expr::Number(2.5), Expr::Number(1.0)],
            }
        );
    }

    #[test]
    fn empty_argument_list_parses() {
        let expr = parse("abs()").unwrap();
        assert_eq!(
            expr,
            Expr::Call {
                func: Func::Abs,
                args: Vec::new(),
            }
        );
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(
            parse("__import__(1)"),
            Err(ExprError::UnknownName("__import__".into()))
        );
        assert_eq!(parse("x + 1"), Err(ExprError::UnknownName("x".into())));
    }

    #[test]
    fn bare_function_name_is_rejected() {
        assert!(matches!(parse("abs"), Err(ExprError::Syntax(_))));
        assert!(matches!(parse("abs + 1"), Err(ExprError::Syntax(_))));
    }

    #[test]
    fn unbalanced_parens_are_rejected() {
        assert!(matches!(parse("(1 + 2"), Err(ExprError::Syntax(_))));
        assert!(matches!(parse("1 + 2)"), Err(ExprError::Syntax(_))));
        assert!(matches!(parse("()"), Err(ExprError::Syntax(_))));
    }

    #[test]
    fn trailing_operator_is_rejected() {
        assert!(matches!(parse("2 **"), Err(ExprError::Syntax(_))));
        assert!(matches!(parse("1 +"), Err(ExprError::Syntax(_))));
    }

    #[test]
    fn adjacent_values_are_rejected() {
        assert!(matches!(parse("1 2"), Err(ExprError::Syntax(_))));
    }

    #[test]
    fn empty_input_is_its_own_error() {
        assert_eq!(parse(""), Err(ExprError::Empty));
        assert_eq!(parse("   "), Err(ExprError::Empty));
    }

    #[test]
    fn nesting_within_budget_parses() {
        let depth = 30;
        let src = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert!(parse(&src).is_ok());
    }

    #[test]
    fn paren_bomb_is_rejected() {
        let depth = 10_000;
        let src = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(parse(&src), Err(ExprError::TooDeep));
    }

    #[test]
    fn sign_chain_bomb_is_rejected() {
        let src = format!("{}1", "-".repeat(10_000));
        assert_eq!(parse(&src), Err(ExprError::TooDeep));
    }
}
