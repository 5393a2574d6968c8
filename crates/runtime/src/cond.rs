//! Control-flow combinators
//!
//! `cond` evaluates its predicate on the input and continues with one of
//! two operations, each applied to the *original* input. The predicate must
//! produce exactly one boolean; anything else turns into a
//! "not a predicate" error token.

use crate::error::EvalError;
use crate::eval::{Evaluator, fail};
use crate::op::Op;
use tokflow_core::{Arity, Bundle, ErrorKind, Token};

pub(crate) fn cond(
    ev: &mut Evaluator<'_>,
    pred: &Op,
    then: &Op,
    otherwise: &Op,
    input: Bundle,
) -> Result<Bundle, EvalError> {
    match ev.predicate("cond", pred, input.clone())? {
        Ok(true) => ev.apply(then, input),
        Ok(false) => ev.apply(otherwise, input),
        Err(error) => Ok(Bundle::from(error)),
    }
}

/// Invert the boolean produced by `pred`, or the input boolean itself
pub(crate) fn not(
    ev: &mut Evaluator<'_>,
    pred: Option<&Op>,
    input: Bundle,
) -> Result<Bundle, EvalError> {
    let verdict = match pred {
        Some(pred) => ev.predicate("not", pred, input)?,
        None => match input.single() {
            Some(Token::Bool(b)) => Ok(*b),
            Some(error @ Token::Error(_)) => Err(error.clone()),
            _ => return Ok(fail("not", ErrorKind::NotAPredicate, input.as_slice())),
        },
    };
    Ok(match verdict {
        Ok(b) => Bundle::from(Token::Bool(!b)),
        Err(error) => Bundle::from(error),
    })
}

pub(crate) fn is(expected: &[Token], input: &Bundle) -> Bundle {
    Bundle::from(Token::Bool(matches_expected(expected, input)))
}

pub(crate) fn isnt(expected: &[Token], input: &Bundle) -> Bundle {
    Bundle::from(Token::Bool(!matches_expected(expected, input)))
}

// Expected tokens go through the same normalization as the input
fn matches_expected(expected: &[Token], input: &Bundle) -> bool {
    Bundle::new(expected.to_vec()) == *input
}

pub(crate) fn same(args: &[Token]) -> Bundle {
    match args {
        [a, b] => Bundle::from(Token::Bool(a == b)),
        _ => fail(
            "same",
            ErrorKind::wrong_arity(Arity::Exactly(2), args.len()),
            args,
        ),
    }
}

/// Apply the operation token at the front to the tokens after it
pub(crate) fn call(ev: &mut Evaluator<'_>, args: &[Token]) -> Result<Bundle, EvalError> {
    let Some((Token::Op(callable), rest)) = args.split_first() else {
        return Ok(fail("call", ErrorKind::NotCallable, args));
    };
    match callable.as_any().downcast_ref::<Op>() {
        Some(op) => ev.apply(op, Bundle::new(rest.to_vec())),
        None => Ok(fail("call", ErrorKind::NotCallable, args)),
    }
}
