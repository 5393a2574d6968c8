//! Structural dispatch for user-defined operations
//!
//! An overload set maps argument *shapes* to handlers. Each case has a
//! [`Signature`]: one [`Pattern`] per positional argument plus an optional
//! pattern for any further (variadic) arguments.
//!
//! Patterns form a lattice ordered by how much they accept:
//!
//! ```text
//! Any  ⊇  Kind(k)  ⊇  Shape{tag, ..} / Sequence(..)  ⊇  Exact(token)
//! ```
//!
//! Two patterns overlap exactly when one of them contains the other, so
//! two signatures that can both match some input are either ordered (one
//! refines the other, and the more specific one wins) or ambiguous. The
//! ambiguous case is rejected by [`OverloadSetBuilder::build`], which means
//! a successfully built operation always has exactly one best case for any
//! input.
//!
//! The check is conservative. Refinement is decided per signature, not per
//! argument length, so `(int, any)` and `variadic([], int)` are rejected
//! as ambiguous even though the variadic case is the more specific one for
//! every two-argument input both accept. Split such sets into signatures
//! that are ordered as a whole.
//!
//! # Example
//!
//! ```ignore
//! let size = OverloadSet::builder("size")
//!     .case(Signature::new([Pattern::Any]), |_| Bundle::from(Token::int(1)))
//!     .case(Signature::new([Pattern::Kind(Kind::List)]), |args| {
//!         Bundle::from(Token::int(args[0].decompose().map_or(0, |f| f.len()) as i64))
//!     })
//!     .build()?;
//! ```

use crate::error::BuildError;
use crate::op::Op;
use std::fmt;
use std::sync::Arc;
use tokflow_core::{Bundle, ErrorKind, ErrorToken, Kind, Token};
use tracing::{debug, trace};

/// Shape a single argument must have
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Anything at all
    Any,
    /// Any token of the given kind
    Kind(Kind),
    /// Compound built by `tag`, optionally with a fixed number of fields
    Shape { tag: Arc<str>, arity: Option<usize> },
    /// List token, optionally of a fixed length
    Sequence(Option<usize>),
    /// Exactly this token
    Exact(Token),
}

impl Pattern {
    pub fn shape(tag: impl Into<Arc<str>>, arity: usize) -> Pattern {
        Pattern::Shape {
            tag: tag.into(),
            arity: Some(arity),
        }
    }

    pub fn matches(&self, token: &Token) -> bool {
        match self {
            Pattern::Any => true,
            Pattern::Kind(kind) => token.kind() == *kind,
            Pattern::Shape { tag, arity } => match token {
                Token::Compound(c) => {
                    c.tag == *tag && arity.is_none_or(|n| c.fields.len() == n)
                }
                _ => false,
            },
            Pattern::Sequence(len) => match token {
                Token::List(items) => len.is_none_or(|n| items.len() == n),
                _ => false,
            },
            Pattern::Exact(expected) => token == expected,
        }
    }

    /// True if every token `other` matches is also matched by `self`
    pub fn covers(&self, other: &Pattern) -> bool {
        match (self, other) {
            (Pattern::Any, _) => true,
            (_, Pattern::Exact(token)) => self.matches(token),
            (Pattern::Kind(kind), Pattern::Kind(other_kind)) => kind == other_kind,
            (Pattern::Kind(kind), Pattern::Shape { .. }) => *kind == Kind::Compound,
            (Pattern::Kind(kind), Pattern::Sequence(_)) => *kind == Kind::List,
            (
                Pattern::Shape { tag, arity },
                Pattern::Shape {
                    tag: other_tag,
                    arity: other_arity,
                },
            ) => tag == other_tag && (arity.is_none() || arity == other_arity),
            (Pattern::Sequence(len), Pattern::Sequence(other_len)) => {
                len.is_none() || len == other_len
            }
            _ => false,
        }
    }

    pub fn overlaps(&self, other: &Pattern) -> bool {
        self.covers(other) || other.covers(self)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Any => write!(f, "any"),
            Pattern::Kind(kind) => write!(f, "{}", kind),
            Pattern::Shape {
                tag,
                arity: Some(n),
            } => write!(f, "{}/{}", tag, n),
            Pattern::Shape { tag, arity: None } => write!(f, "{}/*", tag),
            Pattern::Sequence(Some(n)) => write!(f, "list/{}", n),
            Pattern::Sequence(None) => write!(f, "list/*"),
            Pattern::Exact(token) => write!(f, "={}", token),
        }
    }
}

/// Shapes of a whole argument list
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    params: Vec<Pattern>,
    rest: Option<Pattern>,
}

impl Signature {
    /// Fixed-arity signature
    pub fn new(params: impl IntoIterator<Item = Pattern>) -> Self {
        Self {
            params: params.into_iter().collect(),
            rest: None,
        }
    }

    /// Signature accepting any number of extra arguments matching `rest`
    pub fn variadic(params: impl IntoIterator<Item = Pattern>, rest: Pattern) -> Self {
        Self {
            params: params.into_iter().collect(),
            rest: Some(rest),
        }
    }

    fn accepts_len(&self, len: usize) -> bool {
        len == self.params.len() || (self.rest.is_some() && len > self.params.len())
    }

    fn at(&self, index: usize) -> Option<&Pattern> {
        self.params.get(index).or(self.rest.as_ref())
    }

    pub fn matches(&self, args: &[Token]) -> bool {
        self.accepts_len(args.len())
            && args
                .iter()
                .enumerate()
                .all(|(i, arg)| self.at(i).is_some_and(|p| p.matches(arg)))
    }

    /// Beyond this length both signatures repeat their variadic tails, so
    /// checking lengths up to it decides every comparison.
    fn horizon(&self, other: &Signature) -> usize {
        self.params.len().max(other.params.len()) + 1
    }

    /// True if every argument list matching `self` also matches `other`
    pub fn refines(&self, other: &Signature) -> bool {
        (0..=self.horizon(other))
            .filter(|&len| self.accepts_len(len))
            .all(|len| {
                other.accepts_len(len)
                    && (0..len).all(|i| match (self.at(i), other.at(i)) {
                        (Some(mine), Some(theirs)) => theirs.covers(mine),
                        _ => false,
                    })
            })
    }

    /// True if some argument list matches both signatures
    pub fn overlaps(&self, other: &Signature) -> bool {
        (0..=self.horizon(other))
            .filter(|&len| self.accepts_len(len) && other.accepts_len(len))
            .any(|len| {
                (0..len).all(|i| match (self.at(i), other.at(i)) {
                    (Some(mine), Some(theirs)) => mine.overlaps(theirs),
                    _ => false,
                })
            })
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        if let Some(rest) = &self.rest {
            if !self.params.is_empty() {
                write!(f, ", ")?;
            }
            write!(f, "{}...", rest)?;
        }
        write!(f, ")")
    }
}

/// Handler invoked with the arguments of a matching call
pub type Handler = Arc<dyn Fn(&[Token]) -> Bundle + Send + Sync>;

struct Case {
    signature: Signature,
    handler: Handler,
}

/// A named set of cases selected by argument shape
pub struct OverloadSet {
    name: Arc<str>,
    cases: Vec<Case>,
}

impl OverloadSet {
    pub fn builder(name: impl Into<Arc<str>>) -> OverloadSetBuilder {
        OverloadSetBuilder {
            name: name.into(),
            cases: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signatures(&self) -> impl Iterator<Item = &Signature> {
        self.cases.iter().map(|c| &c.signature)
    }

    /// Run the most specific case matching `args`
    pub fn dispatch(&self, args: &[Token]) -> Bundle {
        let mut best: Option<&Case> = None;
        for case in self.cases.iter().filter(|c| c.signature.matches(args)) {
            match best {
                Some(current) if !case.signature.refines(&current.signature) => {}
                _ => best = Some(case),
            }
        }

        match best {
            Some(case) => {
                trace!("{}: dispatching to {}", self.name, case.signature);
                (case.handler)(args)
            }
            None => Bundle::from(Token::from(
                ErrorToken::new(self.name.clone(), ErrorKind::NoMatchingPattern).with_inputs(args),
            )),
        }
    }
}

impl fmt::Debug for OverloadSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverloadSet")
            .field("name", &self.name)
            .field(
                "signatures",
                &self.signatures().map(|s| s.to_string()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Collects cases, then validates them into an operation
pub struct OverloadSetBuilder {
    name: Arc<str>,
    cases: Vec<Case>,
}

impl OverloadSetBuilder {
    pub fn case<F>(mut self, signature: Signature, handler: F) -> Self
    where
        F: Fn(&[Token]) -> Bundle + Send + Sync + 'static,
    {
        self.cases.push(Case {
            signature,
            handler: Arc::new(handler),
        });
        self
    }

    /// Check that overlapping cases are strictly ordered and build the operation
    pub fn build(self) -> Result<Op, BuildError> {
        if self.cases.is_empty() {
            return Err(BuildError::NoCases {
                op: self.name.to_string(),
            });
        }

        for (i, first) in self.cases.iter().enumerate() {
            for second in &self.cases[i + 1..] {
                let (a, b) = (&first.signature, &second.signature);
                if !a.overlaps(b) {
                    continue;
                }
                // Equivalent signatures refine each other; unordered ones refine neither
                if a.refines(b) == b.refines(a) {
                    return Err(BuildError::Ambiguous {
                        op: self.name.to_string(),
                        first: a.to_string(),
                        second: b.to_string(),
                    });
                }
            }
        }

        debug!(
            "built overload set '{}' with {} case(s)",
            self.name,
            self.cases.len()
        );
        Ok(Op::Custom(Arc::new(OverloadSet {
            name: self.name,
            cases: self.cases,
        })))
    }
}

/// Lift a unary token function into an operation taking exactly one argument
pub fn lift_unary<F>(name: impl Into<Arc<str>>, f: F) -> Op
where
    F: Fn(&Token) -> Token + Send + Sync + 'static,
{
    single_case(name, Signature::new([Pattern::Any]), move |args| {
        Bundle::from(f(&args[0]))
    })
}

/// Lift a binary token function into an operation taking exactly two arguments
pub fn lift_binary<F>(name: impl Into<Arc<str>>, f: F) -> Op
where
    F: Fn(&Token, &Token) -> Token + Send + Sync + 'static,
{
    single_case(name, Signature::new([Pattern::Any, Pattern::Any]), move |args| {
        Bundle::from(f(&args[0], &args[1]))
    })
}

// A single case can never be ambiguous, so no validation is needed
fn single_case<F>(name: impl Into<Arc<str>>, signature: Signature, handler: F) -> Op
where
    F: Fn(&[Token]) -> Bundle + Send + Sync + 'static,
{
    Op::Custom(Arc::new(OverloadSet {
        name: name.into(),
        cases: vec![Case {
            signature,
            handler: Arc::new(handler),
        }],
    }))
}
