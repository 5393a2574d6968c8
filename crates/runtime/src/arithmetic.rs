//! Relational and arithmetic lifts over ordinal tokens
//!
//! Each operator works in two forms:
//!
//! - binary: `( a b -- a op b )`
//! - partially applied: `ArithOp::Add.with(p)` is `( x -- x op p )`, a unary
//!   operation usable as a pipeline stage or predicate
//!
//! Operands must be integers or rationals; anything else produces an
//! `InvalidOperands` error token. See `tokflow_core::ordinal` for overflow
//! and promotion rules.

use crate::eval::fail;
use crate::op::Op;
use std::cmp::Ordering;
use tokflow_core::{Arity, Bundle, ErrorKind, Ordinal, Token, zero_of};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl ArithOp {
    pub fn name(self) -> &'static str {
        match self {
            ArithOp::Lt => "less",
            ArithOp::Le => "less_eq",
            ArithOp::Gt => "greater",
            ArithOp::Ge => "greater_eq",
            ArithOp::Eq => "equal",
            ArithOp::Add => "add",
            ArithOp::Sub => "sub",
            ArithOp::Mul => "mul",
            ArithOp::Div => "div",
            ArithOp::Mod => "mod",
        }
    }

    /// Binary operation
    pub fn op(self) -> Op {
        Op::arith(self)
    }

    /// Unary operation with `operand` fixed on the right
    pub fn with(self, operand: Token) -> Op {
        Op::arith_with(self, operand)
    }

    fn apply(self, lhs: Ordinal, rhs: Ordinal) -> Result<Token, ErrorKind> {
        let ordering = || lhs.compare(&rhs);
        match self {
            ArithOp::Lt => Ok(Token::Bool(ordering() == Ordering::Less)),
            ArithOp::Le => Ok(Token::Bool(ordering() != Ordering::Greater)),
            ArithOp::Gt => Ok(Token::Bool(ordering() == Ordering::Greater)),
            ArithOp::Ge => Ok(Token::Bool(ordering() != Ordering::Less)),
            ArithOp::Eq => Ok(Token::Bool(ordering() == Ordering::Equal)),
            ArithOp::Add => lhs.add(rhs).map(Ordinal::into_token),
            ArithOp::Sub => lhs.sub(rhs).map(Ordinal::into_token),
            ArithOp::Mul => lhs.mul(rhs).map(Ordinal::into_token),
            ArithOp::Div => lhs.div(rhs).map(Ordinal::into_token),
            ArithOp::Mod => lhs.rem(rhs).map(Ordinal::into_token),
        }
    }
}

pub(crate) fn arith(op: ArithOp, operand: Option<&Token>, args: &[Token]) -> Bundle {
    let name = op.name();
    let (lhs, rhs) = match (operand, args) {
        (Some(fixed), [x]) => (x, fixed),
        (None, [a, b]) => (a, b),
        (Some(_), _) => {
            return fail(name, ErrorKind::wrong_arity(Arity::Exactly(1), args.len()), args);
        }
        (None, _) => {
            return fail(name, ErrorKind::wrong_arity(Arity::Exactly(2), args.len()), args);
        }
    };

    let (Some(lhs), Some(rhs)) = (Ordinal::from_token(lhs), Ordinal::from_token(rhs)) else {
        return fail(name, ErrorKind::InvalidOperands, args);
    };

    match op.apply(lhs, rhs) {
        Ok(token) => Bundle::from(token),
        Err(kind) => fail(name, kind, args),
    }
}

/// True iff the single input is the zero of its kind
pub(crate) fn is_zero(args: &[Token]) -> Bundle {
    match args {
        [token] => Bundle::from(Token::Bool(zero_of(token).is_some_and(|zero| zero == *token))),
        _ => fail(
            "is_zero",
            ErrorKind::wrong_arity(Arity::Exactly(1), args.len()),
            args,
        ),
    }
}

fn ordinal_pair(name: &str, args: &[Token]) -> Result<(Ordinal, Ordinal), Bundle> {
    let [a, b] = args else {
        return Err(fail(
            name,
            ErrorKind::wrong_arity(Arity::Exactly(2), args.len()),
            args,
        ));
    };
    match (Ordinal::from_token(a), Ordinal::from_token(b)) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(fail(name, ErrorKind::InvalidOperands, args)),
    }
}

/// Repeated modulo reduction down to the zero of the operands' kind
fn euclid(mut t: Ordinal, mut u: Ordinal) -> Result<Ordinal, ErrorKind> {
    loop {
        if u.is_zero() || t == u {
            return Ok(t);
        }
        let r = t.rem(u)?;
        t = u;
        u = r;
    }
}

pub(crate) fn gcd(args: &[Token]) -> Bundle {
    let (t, u) = match ordinal_pair("gcd", args) {
        Ok(pair) => pair,
        Err(error) => return error,
    };
    match euclid(t, u) {
        Ok(g) => Bundle::from(g.into_token()),
        Err(kind) => fail("gcd", kind, args),
    }
}

/// `t * u / gcd(t, u)`
pub(crate) fn lcm(args: &[Token]) -> Bundle {
    let (t, u) = match ordinal_pair("lcm", args) {
        Ok(pair) => pair,
        Err(error) => return error,
    };
    let result = euclid(t, u).and_then(|g| t.mul(u)?.div(g));
    match result {
        Ok(l) => Bundle::from(l.into_token()),
        Err(kind) => fail("lcm", kind, args),
    }
}
