//! Tokflow Core: the value model of a point-free pipeline engine
//!
//! This crate provides the data that flows through pipelines, independent
//! of how pipelines are built or evaluated.
//!
//! Key design principles:
//! - Token: what pipelines talk about (ordinals, symbols, compounds, lists)
//! - Bundle: the ordered working set passed from one stage to the next
//! - ErrorToken: misuse as data, absorbing once produced
//!
//! # Modules
//!
//! - `token`: Token enum, compound values, decomposition
//! - `bundle`: Bundle and singleton transparency
//! - `error`: Error token payload and error kinds
//! - `ordinal`: Integer and rational ordinals with per-kind zeros
//! - `serialize`: Serializable token snapshots

pub mod bundle;
pub mod error;
pub mod ordinal;
pub mod serialize;
pub mod token;

pub use bundle::Bundle;
pub use error::{Arity, ErrorKind, ErrorToken};
pub use ordinal::{Ordinal, zero_of};
pub use serialize::{SerializeError, TokenSerialize, TypedToken};
pub use token::{Callable, Compound, Kind, Token};
