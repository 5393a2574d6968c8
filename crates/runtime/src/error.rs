//! Runtime errors
//!
//! Misuse inside a pipeline is reported in-band as error tokens (see
//! `tokflow_core::error`). The two enums here cover what cannot be data:
//!
//! - `BuildError`: an overload set that would be ambiguous, rejected when
//!   the operation is built rather than when it runs
//! - `EvalError`: evaluation could not finish at all

use std::fmt;

/// Error raised while building an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Two signatures overlap and neither is strictly more specific
    Ambiguous {
        op: String,
        first: String,
        second: String,
    },
    /// Overload set with no signatures at all
    NoCases { op: String },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Ambiguous { op, first, second } => write!(
                f,
                "ambiguous overloads for '{}': {} and {} overlap and neither is more specific",
                op, first, second
            ),
            BuildError::NoCases { op } => write!(f, "overload set '{}' has no cases", op),
        }
    }
}

impl std::error::Error for BuildError {}

/// Error that aborts an evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// Operations nested deeper than the configured limit
    DepthExceeded { limit: usize },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::DepthExceeded { limit } => {
                write!(f, "evaluation exceeded the maximum depth of {}", limit)
            }
        }
    }
}

impl std::error::Error for EvalError {}
