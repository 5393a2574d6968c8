//! Token: what a pipeline talks about
//!
//! A token is an immutable value compared purely by structure. Compound
//! tokens carry further tokens; nothing in a token is ever mutated after
//! construction, so `Arc` sharing makes cloning O(1) for every variant
//! that owns data.
//!
//! # Nesting
//!
//! Three variants hold other tokens, and they mean different things:
//!
//! - `Compound`: a value built from a named constructor (`pair(a, b)`)
//! - `List`: a finished collection, frozen into one value (`listify`)
//! - `Group`: a sub-bundle that is still "flowing" and will be spliced
//!   back into the surrounding sequence by `flatten`
//!
//! A group of exactly one token is that token, so [`Token::group`] never
//! builds a one-element `Group`.

use crate::error::ErrorToken;
use num_rational::Rational64;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// An operation stored as a token.
///
/// The runtime crate implements this for its operation type so that
/// pipelines can pass operations around as data (see `call`).
pub trait Callable: fmt::Debug + Send + Sync {
    /// Name used in diagnostics and error tokens
    fn name(&self) -> &str;

    /// Downcasting hook for the evaluator
    fn as_any(&self) -> &dyn Any;

    /// Structural equality against another callable
    fn same_as(&self, other: &dyn Callable) -> bool;
}

/// Compound value: a constructor tag plus its fields
#[derive(Debug, Clone, PartialEq)]
pub struct Compound {
    /// Constructor name; two compounds share a family iff their tags match
    pub tag: Arc<str>,

    /// Constituents in declaration order
    pub fields: Box<[Token]>,
}

impl Compound {
    pub fn new(tag: impl Into<Arc<str>>, fields: Vec<Token>) -> Self {
        Self {
            tag: tag.into(),
            fields: fields.into_boxed_slice(),
        }
    }
}

/// Token: the unit of data flowing through a pipeline
#[derive(Debug, Clone)]
pub enum Token {
    /// Integer ordinal
    Int(i64),

    /// Boolean; predicates must produce one of these
    Bool(bool),

    /// Rational ordinal, always kept in lowest terms
    Ratio(Rational64),

    /// Opaque atom, equal only to a symbol with the same name
    Sym(Arc<str>),

    /// Value built from a named constructor
    Compound(Arc<Compound>),

    /// List wrapper: a sequence frozen into one value
    List(Arc<[Token]>),

    /// Nested sub-bundle, never of length one
    Group(Arc<[Token]>),

    /// First-class operation
    Op(Arc<dyn Callable>),

    /// Absorbing error sentinel
    Error(Arc<ErrorToken>),
}

/// Shape family of a token, used by dispatch patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Int,
    Bool,
    Ratio,
    Sym,
    Compound,
    List,
    Group,
    Op,
    Error,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Int => "int",
            Kind::Bool => "bool",
            Kind::Ratio => "ratio",
            Kind::Sym => "sym",
            Kind::Compound => "compound",
            Kind::List => "list",
            Kind::Group => "group",
            Kind::Op => "op",
            Kind::Error => "error",
        };
        write!(f, "{}", name)
    }
}

impl Token {
    pub fn int(n: i64) -> Token {
        Token::Int(n)
    }

    pub fn bool(b: bool) -> Token {
        Token::Bool(b)
    }

    /// Create a rational token in lowest terms
    ///
    /// # Panics
    ///
    /// Panics if `den` is zero.
    pub fn ratio(num: i64, den: i64) -> Token {
        Token::Ratio(Rational64::new(num, den))
    }

    pub fn sym(name: impl Into<Arc<str>>) -> Token {
        Token::Sym(name.into())
    }

    pub fn compound(tag: impl Into<Arc<str>>, fields: Vec<Token>) -> Token {
        Token::Compound(Arc::new(Compound::new(tag, fields)))
    }

    pub fn list(items: impl IntoIterator<Item = Token>) -> Token {
        Token::List(items.into_iter().collect())
    }

    /// Wrap a sub-sequence as one element.
    ///
    /// A single token is returned as-is; any other length becomes a `Group`.
    pub fn group(mut items: Vec<Token>) -> Token {
        if items.len() == 1 {
            return items.remove(0);
        }
        Token::Group(items.into())
    }

    pub fn op(callable: Arc<dyn Callable>) -> Token {
        Token::Op(callable)
    }

    pub fn error(error: ErrorToken) -> Token {
        Token::Error(Arc::new(error))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Token::Int(_) => Kind::Int,
            Token::Bool(_) => Kind::Bool,
            Token::Ratio(_) => Kind::Ratio,
            Token::Sym(_) => Kind::Sym,
            Token::Compound(_) => Kind::Compound,
            Token::List(_) => Kind::List,
            Token::Group(_) => Kind::Group,
            Token::Op(_) => Kind::Op,
            Token::Error(_) => Kind::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Token::Error(_))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Token::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Token::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorToken> {
        match self {
            Token::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Constituents of a compound, list or group token.
    ///
    /// This is the only reflection the engine performs: shapes that are not
    /// one of those three variants are opaque and return `None`.
    pub fn decompose(&self) -> Option<&[Token]> {
        match self {
            Token::Compound(c) => Some(&c.fields),
            Token::List(items) | Token::Group(items) => Some(items),
            _ => None,
        }
    }

    /// True if both tokens were built by the same constructor family
    pub fn same_family(&self, other: &Token) -> bool {
        match (self, other) {
            (Token::Compound(a), Token::Compound(b)) => a.tag == b.tag,
            (Token::List(_), Token::List(_)) => true,
            (Token::Group(_), Token::Group(_)) => true,
            _ => false,
        }
    }

    /// Rebuild a token of the same family around new constituents
    pub fn rebuild(&self, fields: Vec<Token>) -> Option<Token> {
        match self {
            Token::Compound(c) => Some(Token::compound(c.tag.clone(), fields)),
            Token::List(_) => Some(Token::list(fields)),
            Token::Group(_) => Some(Token::group(fields)),
            _ => None,
        }
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Token::Int(a), Token::Int(b)) => a == b,
            (Token::Bool(a), Token::Bool(b)) => a == b,
            (Token::Ratio(a), Token::Ratio(b)) => a == b,
            (Token::Sym(a), Token::Sym(b)) => a == b,
            (Token::Compound(a), Token::Compound(b)) => a == b,
            (Token::List(a), Token::List(b)) => a == b,
            (Token::Group(a), Token::Group(b)) => a == b,
            (Token::Op(a), Token::Op(b)) => a.same_as(b.as_ref()),
            (Token::Error(a), Token::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl From<i64> for Token {
    fn from(n: i64) -> Self {
        Token::Int(n)
    }
}

impl From<bool> for Token {
    fn from(b: bool) -> Self {
        Token::Bool(b)
    }
}

impl From<Rational64> for Token {
    fn from(r: Rational64) -> Self {
        Token::Ratio(r)
    }
}

impl From<&str> for Token {
    fn from(name: &str) -> Self {
        Token::sym(name)
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Token], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Int(n) => write!(f, "{}", n),
            Token::Bool(b) => write!(f, "{}", b),
            Token::Ratio(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            Token::Sym(s) => write!(f, ":{}", s),
            Token::Compound(c) => {
                write!(f, "{}(", c.tag)?;
                write_joined(f, &c.fields, ", ")?;
                write!(f, ")")
            }
            Token::List(items) => {
                write!(f, "[")?;
                write_joined(f, items, ", ")?;
                write!(f, "]")
            }
            Token::Group(items) => {
                write!(f, "(")?;
                write_joined(f, items, " ")?;
                write!(f, ")")
            }
            Token::Op(op) => write!(f, "<{}>", op.name()),
            Token::Error(e) => write!(f, "{}", e),
        }
    }
}
