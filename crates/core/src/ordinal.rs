//! Ordinal tokens: integers and rationals
//!
//! Relational and arithmetic operations are lifted onto tokens that carry
//! an ordinal value. Every ordinal kind defines its own zero, which is what
//! `gcd` recurses down to and what `is_zero` tests against.
//!
//! # Overflow Behavior
//!
//! Integer operations use **wrapping semantics** (`i64::MAX + 1` wraps to
//! `i64::MIN`, `i64::MIN / -1` wraps to `i64::MIN`). Rational operations
//! are checked, since a wrapped numerator or denominator would no longer
//! describe the same number; overflow yields `ErrorKind::Overflow`.
//!
//! Mixing an integer with a rational promotes the integer to `n/1`.

use crate::error::ErrorKind;
use crate::token::Token;
use num_rational::Rational64;
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub, Zero};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordinal {
    Int(i64),
    Ratio(Rational64),
}

impl Ordinal {
    pub fn from_token(token: &Token) -> Option<Ordinal> {
        match token {
            Token::Int(n) => Some(Ordinal::Int(*n)),
            Token::Ratio(r) => Some(Ordinal::Ratio(*r)),
            _ => None,
        }
    }

    pub fn into_token(self) -> Token {
        match self {
            Ordinal::Int(n) => Token::Int(n),
            Ordinal::Ratio(r) => Token::Ratio(r),
        }
    }

    /// Zero of this ordinal's kind
    pub fn zero(&self) -> Ordinal {
        match self {
            Ordinal::Int(_) => Ordinal::Int(0),
            Ordinal::Ratio(_) => Ordinal::Ratio(Rational64::zero()),
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == self.zero()
    }

    fn to_ratio(self) -> Rational64 {
        match self {
            Ordinal::Int(n) => Rational64::from_integer(n),
            Ordinal::Ratio(r) => r,
        }
    }

    /// Compare two ordinals by value
    pub fn compare(&self, other: &Ordinal) -> Ordering {
        match (self, other) {
            (Ordinal::Int(a), Ordinal::Int(b)) => a.cmp(b),
            _ => self.to_ratio().cmp(&other.to_ratio()),
        }
    }

    pub fn add(self, other: Ordinal) -> Result<Ordinal, ErrorKind> {
        match (self, other) {
            (Ordinal::Int(a), Ordinal::Int(b)) => Ok(Ordinal::Int(a.wrapping_add(b))),
            _ => checked(self.to_ratio().checked_add(&other.to_ratio())),
        }
    }

    pub fn sub(self, other: Ordinal) -> Result<Ordinal, ErrorKind> {
        match (self, other) {
            (Ordinal::Int(a), Ordinal::Int(b)) => Ok(Ordinal::Int(a.wrapping_sub(b))),
            _ => checked(self.to_ratio().checked_sub(&other.to_ratio())),
        }
    }

    pub fn mul(self, other: Ordinal) -> Result<Ordinal, ErrorKind> {
        match (self, other) {
            (Ordinal::Int(a), Ordinal::Int(b)) => Ok(Ordinal::Int(a.wrapping_mul(b))),
            _ => checked(self.to_ratio().checked_mul(&other.to_ratio())),
        }
    }

    pub fn div(self, other: Ordinal) -> Result<Ordinal, ErrorKind> {
        if other.is_zero() {
            return Err(ErrorKind::DivisionByZero);
        }
        match (self, other) {
            (Ordinal::Int(a), Ordinal::Int(b)) => Ok(Ordinal::Int(a.wrapping_div(b))),
            _ => checked(self.to_ratio().checked_div(&other.to_ratio())),
        }
    }

    /// Remainder; only defined between integers
    pub fn rem(self, other: Ordinal) -> Result<Ordinal, ErrorKind> {
        match (self, other) {
            (Ordinal::Int(_), Ordinal::Int(0)) => Err(ErrorKind::DivisionByZero),
            (Ordinal::Int(a), Ordinal::Int(b)) => Ok(Ordinal::Int(a.wrapping_rem(b))),
            _ => Err(ErrorKind::InvalidOperands),
        }
    }
}

fn checked(result: Option<Rational64>) -> Result<Ordinal, ErrorKind> {
    result.map(Ordinal::Ratio).ok_or(ErrorKind::Overflow)
}

/// The zero of a token's kind, if its kind has one.
///
/// Booleans count: the zero of a boolean is `false`.
pub fn zero_of(token: &Token) -> Option<Token> {
    match token {
        Token::Bool(_) => Some(Token::Bool(false)),
        _ => Ordinal::from_token(token).map(|o| o.zero().into_token()),
    }
}
