//! A circuit-level front-end for an incremental SAT solver.
//!
//! This crate turns Boolean gate expressions -- AND, OR, XOR, MUX, and cardinality
//! constraints -- into CNF clauses fed to an incremental backend, deduplicating
//! structurally identical gates along the way so that building the same sub-expression
//! twice never allocates a second variable or emits a second set of clauses.
//!
//! The entry point is [`Solver`]: allocate literals with `new_var`/`new_vars`, combine
//! them with `make_and`/`make_or`/`make_xor`/`make_mux`/`make_at_most`/`make_at_least`,
//! add any extra clauses directly with `add_clause`, then `assume` and `check`.
//!
//! ```
//! use gatefuse::Solver;
//!
//! let mut solver = Solver::new();
//! let a = solver.new_var();
//! let b = solver.new_var();
//! let c = solver.make_and(a, b);
//! solver.assume(a);
//! solver.assume(-b);
//! assert_eq!(solver.check(), gatefuse::SolverState::Sat);
//! assert!(!solver.value(c));
//! ```

mod ambient;
mod backend;
mod cardinality;
mod error;
mod literal;
mod solver;
mod varmgr;

pub use ambient::{install, mux, uninstall};
pub use error::GateError;
pub use literal::Literal;
pub use solver::{Solver, SolverState};
