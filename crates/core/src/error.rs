//! In-band error tokens
//!
//! Misuse that can be represented as data (wrong arity, a predicate that
//! does not produce a boolean, no matching dispatch pattern, ...) becomes an
//! error token instead of a panic. The token records which operation
//! failed and the inputs it was given, then travels through the rest of
//! the pipeline untouched.
//!
//! # Usage
//!
//! ```ignore
//! if args.len() != 2 {
//!     return ErrorToken::new("zip", ErrorKind::wrong_arity(Arity::Exactly(2), args.len()))
//!         .with_inputs(args)
//!         .into();
//! }
//! ```

use crate::token::Token;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Number of arguments an operation accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "exactly {}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

/// What went wrong
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Operation received the wrong number of tokens
    WrongArity { expected: Arity, found: usize },
    /// Predicate produced something other than a single boolean
    NotAPredicate,
    /// No dispatch pattern of an overload set matched
    NoMatchingPattern,
    /// Token has no constituents to decompose
    NotDecomposable,
    /// Expected an operation token
    NotCallable,
    /// Expected a single non-negative integer
    NotANonNegativeInteger,
    /// Operand kinds do not support the operation
    InvalidOperands,
    DivisionByZero,
    Overflow,
    /// Paired sequences differ in length or family
    LengthMismatch,
    /// Positional access outside the sequence (strict access only)
    IndexOutOfRange,
    /// Raised by user-defined operations
    Custom(String),
}

impl ErrorKind {
    pub fn wrong_arity(expected: Arity, found: usize) -> Self {
        ErrorKind::WrongArity { expected, found }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::WrongArity { expected, found } => {
                write!(f, "expected {} argument(s), got {}", expected, found)
            }
            ErrorKind::NotAPredicate => write!(f, "not a predicate"),
            ErrorKind::NoMatchingPattern => write!(f, "no dispatch pattern matches"),
            ErrorKind::NotDecomposable => write!(f, "not decomposable"),
            ErrorKind::NotCallable => write!(f, "not callable"),
            ErrorKind::NotANonNegativeInteger => write!(f, "not a non-negative integer"),
            ErrorKind::InvalidOperands => write!(f, "invalid operands"),
            ErrorKind::DivisionByZero => write!(f, "division by zero"),
            ErrorKind::Overflow => write!(f, "arithmetic overflow"),
            ErrorKind::LengthMismatch => write!(f, "length mismatch"),
            ErrorKind::IndexOutOfRange => write!(f, "index out of range"),
            ErrorKind::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

/// Payload of an error token
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorToken {
    /// Name of the operation that failed
    pub op: Arc<str>,

    pub kind: ErrorKind,

    /// Tokens the operation was applied to
    pub inputs: Box<[Token]>,
}

impl ErrorToken {
    pub fn new(op: impl Into<Arc<str>>, kind: ErrorKind) -> Self {
        Self {
            op: op.into(),
            kind,
            inputs: Box::new([]),
        }
    }

    /// Attach the offending inputs (builder pattern)
    pub fn with_inputs(mut self, inputs: impl Into<Vec<Token>>) -> Self {
        self.inputs = inputs.into().into_boxed_slice();
        self
    }
}

impl fmt::Display for ErrorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "!error({}: {}", self.op, self.kind)?;
        if !self.inputs.is_empty() {
            write!(f, " on")?;
            for input in self.inputs.iter() {
                write!(f, " {}", input)?;
            }
        }
        write!(f, ")")
    }
}

impl From<ErrorToken> for Token {
    fn from(error: ErrorToken) -> Self {
        tracing::debug!(op = %error.op, kind = %error.kind, "error token produced");
        Token::error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ErrorToken::new("zip", ErrorKind::wrong_arity(Arity::Exactly(2), 3))
            .with_inputs(vec![Token::int(1), Token::int(2), Token::int(3)]);
        assert_eq!(
            err.to_string(),
            "!error(zip: expected exactly 2 argument(s), got 3 on 1 2 3)"
        );
    }

    #[test]
    fn test_error_token_equality() {
        let a: Token = ErrorToken::new("cond", ErrorKind::NotAPredicate).into();
        let b: Token = ErrorToken::new("cond", ErrorKind::NotAPredicate).into();
        let c: Token = ErrorToken::new("not", ErrorKind::NotAPredicate).into();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.is_error());
    }
}
