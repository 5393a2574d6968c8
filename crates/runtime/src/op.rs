//! Operations: the pipeline vocabulary
//!
//! An `Op` is a pure, immutable description of a transformation from a
//! bundle to a bundle. Built-in combinators are enum variants; operations
//! that are compositions of other operations (`filter`, `unique`,
//! `find_if`, ...) are plain constructor functions that assemble the same
//! variants, so they need no evaluator support of their own.
//!
//! Operations are cheap to clone (children are `Arc`-shared) and can be
//! shared freely between threads once built.
//!
//! # Example
//!
//! ```ignore
//! // keep the even numbers, then sum them
//! let op = pipe![
//!     Op::filter(pipe![ArithOp::Mod.with(Token::int(2)), Op::is_zero()]),
//!     Op::fold_left(ArithOp::Add.op()),
//! ];
//! let out = run(&op, [1, 2, 3, 4].map(Token::int))?;
//! ```

use crate::arithmetic::ArithOp;
use crate::dispatch::OverloadSet;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tokflow_core::{Callable, Token};

#[derive(Clone)]
pub enum Op {
    /// Input unchanged
    Identity,
    /// Ignore the input and continue with these tokens
    Input(Arc<[Token]>),
    /// Sequential composition, never nested directly inside another pipe
    Pipe(Arc<[Op]>),
    /// Apply every operation to a copy of the input, concatenate results
    Fork(Arc<[Op]>),
    /// Fold a binary operation left to right over the elements
    FoldLeft(Arc<Op>),
    Cond {
        pred: Arc<Op>,
        then: Arc<Op>,
        otherwise: Arc<Op>,
    },
    /// Invert a boolean, or the boolean produced by the inner predicate
    Not(Option<Arc<Op>>),
    Is(Arc<[Token]>),
    Isnt(Arc<[Token]>),
    Same,
    Transform(Arc<Op>),
    Listify,
    Unwrap,
    Construct(Arc<str>),
    Container,
    OnArgs(Arc<Op>),
    Call,
    Reverse,
    Flatten,
    Length,
    MkSeq,
    Zip,
    ZipIndex,
    Unzip,
    UnzipIndex,
    PushFront(Arc<[Token]>),
    PushBack(Arc<[Token]>),
    Get(i64),
    Last,
    Product,
    Rotate(i64),
    AllOf(Arc<Op>),
    AnyOf(Arc<Op>),
    IsZero,
    Sort(Arc<Op>),
    PushOut(Arc<Op>),
    /// Relational or arithmetic lift, optionally with a fixed right operand
    Arith {
        op: ArithOp,
        operand: Option<Token>,
    },
    Gcd,
    Lcm,
    /// User-defined operation selected by structural dispatch
    Custom(Arc<OverloadSet>),
}

// Composition

impl Op {
    pub fn identity() -> Op {
        Op::Identity
    }

    /// Constant stage: discard the input, continue with `tokens`
    pub fn input(tokens: impl IntoIterator<Item = Token>) -> Op {
        Op::Input(tokens.into_iter().collect())
    }

    /// The empty constant
    pub fn nothing() -> Op {
        Op::Input(Arc::from([]))
    }

    /// Sequential composition.
    ///
    /// Nested pipes are spliced in place so composition is associative by
    /// construction; an empty pipe is the identity.
    pub fn pipe(ops: impl IntoIterator<Item = Op>) -> Op {
        let mut stages = Vec::new();
        for op in ops {
            match op {
                Op::Pipe(inner) => stages.extend(inner.iter().cloned()),
                Op::Identity => {}
                other => stages.push(other),
            }
        }
        if stages.is_empty() {
            Op::Identity
        } else {
            Op::Pipe(stages.into())
        }
    }

    pub fn fork(ops: impl IntoIterator<Item = Op>) -> Op {
        Op::Fork(ops.into_iter().collect())
    }

    pub fn fold_left(step: Op) -> Op {
        Op::FoldLeft(Arc::new(step))
    }

    /// `n` copies of the input
    pub fn copy(n: usize) -> Op {
        Op::fork(std::iter::repeat_n(Op::Identity, n))
    }

    /// `ops` applied `n` times in sequence
    pub fn repeat(n: usize, ops: Op) -> Op {
        Op::pipe(std::iter::repeat_n(ops, n))
    }

    /// Apply an operation token to the tokens after it
    pub fn call() -> Op {
        Op::Call
    }

    /// Store this operation in a token
    pub fn into_token(self) -> Token {
        Token::op(Arc::new(self))
    }
}

// Control flow

impl Op {
    pub fn cond(pred: Op, then: Op, otherwise: Op) -> Op {
        Op::Cond {
            pred: Arc::new(pred),
            then: Arc::new(then),
            otherwise: Arc::new(otherwise),
        }
    }

    pub fn if_then(pred: Op, then: Op) -> Op {
        Op::cond(pred, then, Op::Identity)
    }

    /// Compose `ops`, then invert the boolean they produce.
    ///
    /// With no operations this inverts the input itself.
    pub fn not(ops: impl IntoIterator<Item = Op>) -> Op {
        match Op::pipe(ops) {
            Op::Identity => Op::Not(None),
            pred => Op::Not(Some(Arc::new(pred))),
        }
    }

    /// Invert a single boolean input
    pub fn negate() -> Op {
        Op::Not(None)
    }

    /// True iff the bundle equals `expected`, in order and count
    pub fn is(expected: impl IntoIterator<Item = Token>) -> Op {
        Op::Is(expected.into_iter().collect())
    }

    pub fn isnt(expected: impl IntoIterator<Item = Token>) -> Op {
        Op::Isnt(expected.into_iter().collect())
    }

    /// Structural equality of exactly two tokens
    pub fn same() -> Op {
        Op::Same
    }
}

// Structure

impl Op {
    pub fn listify() -> Op {
        Op::Listify
    }

    /// Decompose a single compound or list token into its constituents
    pub fn unwrap() -> Op {
        Op::Unwrap
    }

    pub fn construct(tag: impl Into<Arc<str>>) -> Op {
        Op::Construct(tag.into())
    }

    pub fn container() -> Op {
        Op::Container
    }

    pub fn container_is(tag: impl Into<Arc<str>>) -> Op {
        Op::pipe([Op::Container, Op::is([Token::sym(tag)])])
    }

    /// Run `ops` on the constituents of a single token, rebuild with the same constructor
    pub fn on_args(ops: Op) -> Op {
        Op::OnArgs(Arc::new(ops))
    }
}

// Sequence algorithms

impl Op {
    pub fn transform(f: Op) -> Op {
        Op::Transform(Arc::new(f))
    }

    pub fn reverse() -> Op {
        Op::Reverse
    }

    pub fn flatten() -> Op {
        Op::Flatten
    }

    pub fn length() -> Op {
        Op::Length
    }

    pub fn mkseq() -> Op {
        Op::MkSeq
    }

    pub fn zip() -> Op {
        Op::Zip
    }

    pub fn zip_index() -> Op {
        Op::ZipIndex
    }

    pub fn unzip() -> Op {
        Op::Unzip
    }

    pub fn unzip_index() -> Op {
        Op::UnzipIndex
    }

    pub fn push_front(tokens: impl IntoIterator<Item = Token>) -> Op {
        Op::PushFront(tokens.into_iter().collect())
    }

    pub fn push_back(tokens: impl IntoIterator<Item = Token>) -> Op {
        Op::PushBack(tokens.into_iter().collect())
    }

    pub fn get(index: i64) -> Op {
        Op::Get(index)
    }

    pub fn first() -> Op {
        Op::Get(0)
    }

    pub fn second() -> Op {
        Op::Get(1)
    }

    pub fn third() -> Op {
        Op::Get(2)
    }

    pub fn last() -> Op {
        Op::Last
    }

    pub fn product() -> Op {
        Op::Product
    }

    pub fn rotate(k: i64) -> Op {
        Op::Rotate(k)
    }

    /// One output per index, in index order; repeats allowed
    pub fn swizzle(indices: impl IntoIterator<Item = i64>) -> Op {
        Op::fork(indices.into_iter().map(Op::Get))
    }

    pub fn remove_if(pred: Op) -> Op {
        Op::pipe([
            Op::transform(Op::cond(pred, Op::nothing(), Op::Identity)),
            Op::Flatten,
        ])
    }

    pub fn filter(pred: Op) -> Op {
        Op::remove_if(Op::not([pred]))
    }

    /// Two lists: elements satisfying `pred`, then the rest
    pub fn partition(pred: Op) -> Op {
        Op::pipe([Op::fork([
            Op::pipe([Op::filter(pred.clone()), Op::Listify]),
            Op::pipe([Op::remove_if(pred), Op::Listify]),
        ])])
    }

    pub fn replace_if(pred: Op, f: Op) -> Op {
        Op::transform(Op::if_then(pred, f))
    }

    pub fn all_of(pred: Op) -> Op {
        Op::AllOf(Arc::new(pred))
    }

    pub fn any_of(pred: Op) -> Op {
        Op::AnyOf(Arc::new(pred))
    }

    pub fn none_of(pred: Op) -> Op {
        Op::pipe([Op::any_of(pred), Op::negate()])
    }

    pub fn count_if(pred: Op) -> Op {
        Op::pipe([Op::filter(pred), Op::Length])
    }

    /// `(index, element)` of the first element satisfying `pred`, or nothing
    pub fn find_if(pred: Op) -> Op {
        Op::pipe([
            Op::ZipIndex,
            Op::filter(Op::pipe([Op::Unwrap, Op::second(), pred])),
            // keep the leading match only; no match stays nothing
            Op::push_out(Op::input([Token::bool(true)])),
            Op::transform(Op::Unwrap),
        ])
    }

    /// Stable sort by a binary "less than" predicate
    pub fn sort(less: Op) -> Op {
        Op::Sort(Arc::new(less))
    }

    /// Keep each element, dropping every later one related to it by `pred`
    pub fn push_out(pred: Op) -> Op {
        Op::PushOut(Arc::new(pred))
    }

    /// First occurrence of each structurally-equal element
    pub fn unique() -> Op {
        Op::push_out(Op::Same)
    }

    /// Make elements with equal keys adjacent
    pub fn group_by(key: Op) -> Op {
        Op::sort(Op::pipe([Op::transform(key), Op::not([Op::Same])]))
    }
}

// Ordinals

impl Op {
    pub fn arith(op: ArithOp) -> Op {
        Op::Arith { op, operand: None }
    }

    /// Unary form: `x op operand`
    pub fn arith_with(op: ArithOp, operand: Token) -> Op {
        Op::Arith {
            op,
            operand: Some(operand),
        }
    }

    /// Binary "less than", the usual sort predicate
    pub fn less() -> Op {
        Op::arith(ArithOp::Lt)
    }

    pub fn is_zero() -> Op {
        Op::IsZero
    }

    pub fn gcd() -> Op {
        Op::Gcd
    }

    pub fn lcm() -> Op {
        Op::Lcm
    }
}

impl Op {
    pub fn name(&self) -> &str {
        match self {
            Op::Identity => "identity",
            Op::Input(_) => "input",
            Op::Pipe(_) => "pipe",
            Op::Fork(_) => "fork",
            Op::FoldLeft(_) => "fold_left",
            Op::Cond { .. } => "cond",
            Op::Not(_) => "not",
            Op::Is(_) => "is",
            Op::Isnt(_) => "isnt",
            Op::Same => "same",
            Op::Transform(_) => "transform",
            Op::Listify => "listify",
            Op::Unwrap => "unwrap",
            Op::Construct(_) => "construct",
            Op::Container => "container",
            Op::OnArgs(_) => "on_args",
            Op::Call => "call",
            Op::Reverse => "reverse",
            Op::Flatten => "flatten",
            Op::Length => "length",
            Op::MkSeq => "mkseq",
            Op::Zip => "zip",
            Op::ZipIndex => "zip_index",
            Op::Unzip => "unzip",
            Op::UnzipIndex => "unzip_index",
            Op::PushFront(_) => "push_front",
            Op::PushBack(_) => "push_back",
            Op::Get(_) => "get",
            Op::Last => "last",
            Op::Product => "product",
            Op::Rotate(_) => "rotate",
            Op::AllOf(_) => "all_of",
            Op::AnyOf(_) => "any_of",
            Op::IsZero => "is_zero",
            Op::Sort(_) => "sort",
            Op::PushOut(_) => "push_out",
            Op::Arith { op, .. } => op.name(),
            Op::Gcd => "gcd",
            Op::Lcm => "lcm",
            Op::Custom(set) => set.name(),
        }
    }
}

impl PartialEq for Op {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Op::Identity, Op::Identity) => true,
            (Op::Input(a), Op::Input(b)) => a == b,
            (Op::Pipe(a), Op::Pipe(b)) | (Op::Fork(a), Op::Fork(b)) => a == b,
            (Op::FoldLeft(a), Op::FoldLeft(b))
            | (Op::Transform(a), Op::Transform(b))
            | (Op::OnArgs(a), Op::OnArgs(b))
            | (Op::AllOf(a), Op::AllOf(b))
            | (Op::AnyOf(a), Op::AnyOf(b))
            | (Op::Sort(a), Op::Sort(b))
            | (Op::PushOut(a), Op::PushOut(b)) => a == b,
            (
                Op::Cond {
                    pred: p1,
                    then: t1,
                    otherwise: o1,
                },
                Op::Cond {
                    pred: p2,
                    then: t2,
                    otherwise: o2,
                },
            ) => p1 == p2 && t1 == t2 && o1 == o2,
            (Op::Not(a), Op::Not(b)) => a == b,
            (Op::Is(a), Op::Is(b))
            | (Op::Isnt(a), Op::Isnt(b))
            | (Op::PushFront(a), Op::PushFront(b))
            | (Op::PushBack(a), Op::PushBack(b)) => a == b,
            (Op::Construct(a), Op::Construct(b)) => a == b,
            (Op::Get(a), Op::Get(b)) | (Op::Rotate(a), Op::Rotate(b)) => a == b,
            (
                Op::Arith {
                    op: a,
                    operand: x,
                },
                Op::Arith {
                    op: b,
                    operand: y,
                },
            ) => a == b && x == y,
            // User-defined handlers are closures; identity is the only equality
            (Op::Custom(a), Op::Custom(b)) => Arc::ptr_eq(a, b),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other)
                && self.is_unit(),
        }
    }
}

impl Op {
    fn is_unit(&self) -> bool {
        matches!(
            self,
            Op::Same
                | Op::Listify
                | Op::Unwrap
                | Op::Container
                | Op::Call
                | Op::Reverse
                | Op::Flatten
                | Op::Length
                | Op::MkSeq
                | Op::Zip
                | Op::ZipIndex
                | Op::Unzip
                | Op::UnzipIndex
                | Op::Last
                | Op::Product
                | Op::IsZero
                | Op::Gcd
                | Op::Lcm
        )
    }
}

impl fmt::Debug for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Input(tokens)
            | Op::Is(tokens)
            | Op::Isnt(tokens)
            | Op::PushFront(tokens)
            | Op::PushBack(tokens) => f.debug_tuple(self.name()).field(tokens).finish(),
            Op::Pipe(ops) | Op::Fork(ops) => f.debug_tuple(self.name()).field(ops).finish(),
            Op::FoldLeft(inner)
            | Op::Transform(inner)
            | Op::OnArgs(inner)
            | Op::AllOf(inner)
            | Op::AnyOf(inner)
            | Op::Sort(inner)
            | Op::PushOut(inner) => f.debug_tuple(self.name()).field(inner).finish(),
            Op::Not(inner) => f.debug_tuple("not").field(inner).finish(),
            Op::Cond {
                pred,
                then,
                otherwise,
            } => f
                .debug_struct("cond")
                .field("pred", pred)
                .field("then", then)
                .field("otherwise", otherwise)
                .finish(),
            Op::Construct(tag) => f.debug_tuple("construct").field(tag).finish(),
            Op::Get(n) | Op::Rotate(n) => f.debug_tuple(self.name()).field(n).finish(),
            Op::Arith {
                operand: Some(operand),
                ..
            } => f.debug_tuple(self.name()).field(operand).finish(),
            Op::Custom(set) => fmt::Debug::fmt(set, f),
            _ => f.write_str(self.name()),
        }
    }
}

impl Callable for Op {
    fn name(&self) -> &str {
        Op::name(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn same_as(&self, other: &dyn Callable) -> bool {
        other.as_any().downcast_ref::<Op>() == Some(self)
    }
}

/// Sequential composition of operations: `pipe![a, b, c]`
#[macro_export]
macro_rules! pipe {
    ($($op:expr),* $(,)?) => {
        $crate::Op::pipe([$($op),*])
    };
}

/// Fan-out over operations: `fork![a, b]`
#[macro_export]
macro_rules! fork {
    ($($op:expr),* $(,)?) => {
        $crate::Op::fork([$($op),*])
    };
}
