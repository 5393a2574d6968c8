//! Tokflow Runtime: evaluation engine and combinator library
//!
//! Pipelines are values of type [`Op`], built from combinators and run
//! against an initial bundle of tokens:
//!
//! ```rust,ignore
//! use tokflow_runtime::{ArithOp, Op, Token, pipe, run};
//!
//! let evens_squared = pipe![
//!     Op::filter(pipe![ArithOp::Mod.with(Token::int(2)), Op::is_zero()]),
//!     Op::transform(pipe![Op::copy(2), ArithOp::Mul.op()]),
//! ];
//! let out = run(&evens_squared, (1..=6).map(Token::int))?;
//! // {4 16 36}
//! ```
//!
//! Misuse that can be described as data (wrong arity, a predicate that
//! yields no boolean, no matching dispatch case) becomes an error token in
//! the result. Only exceeding the configured nesting depth aborts a run,
//! and only an ambiguous overload set fails to build.
//!
//! # Modules
//!
//! - `op`: the `Op` type and its constructors
//! - `eval`: `Engine`, `run`, pipe/fork/fold evaluation
//! - `dispatch`: patterns, signatures and user-defined overload sets
//! - `cond`: conditionals, negation, equality, `call`
//! - `list_ops`: map, access, zip, product, rotate, quantifiers
//! - `sort`: stable pivot sort, `push_out`, `unique`, `group_by`
//! - `arithmetic`: relational/arithmetic lifts, `gcd`, `lcm`
//! - `config`: `EngineConfig`

pub mod arithmetic;
mod cond;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod eval;
mod list_ops;
pub mod op;
mod sort;

pub use arithmetic::ArithOp;
pub use config::{ConfigError, DEFAULT_MAX_DEPTH, EngineConfig};
pub use dispatch::{
    Handler, OverloadSet, OverloadSetBuilder, Pattern, Signature, lift_binary, lift_unary,
};
pub use error::{BuildError, EvalError};
pub use eval::{Engine, fold_left, run};
pub use op::Op;

// The token model, so most users need only this crate
pub use tokflow_core::{Arity, Bundle, ErrorKind, ErrorToken, Kind, Token};
