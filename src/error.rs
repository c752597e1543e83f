//! Typed errors for the ambient, boundary-facing layer.
//!
//! The gate-construction hot path never returns these: contract violations there are
//! caught with `debug_assert!`, matching the original `Assert` macro (fatal in debug
//! builds, elided in release). [`GateError`] exists for call sites that sit at a boundary
//! -- chiefly the CLI test harness -- and want to observe a contract violation as a value.

use crate::literal::Literal;

/// A programming-error kind: a contract violation rather than a solver outcome.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    /// The `ILLEGAL` sentinel (or another literal with zero magnitude) was passed where a
    /// legal literal was required.
    #[error("illegal literal passed to gate construction")]
    IllegalLiteral,

    /// A literal's magnitude exceeds the number of variables currently allocated, and it
    /// is not one of the two constants.
    #[error("unknown literal {literal} with {num_vars} variables allocated")]
    UnknownLiteral { literal: Literal, num_vars: u32 },

    /// `value()` was called outside of `SAT` state.
    #[error("expected {expected:?} state to query a value, was in {actual:?}")]
    StateMismatch {
        expected: crate::solver::SolverState,
        actual: crate::solver::SolverState,
    },
}
