//! Adapter onto a concrete incremental SAT backend.
//!
//! [`ClauseBackend`] is the exact shape of §6.2's consumed interface: append a literal,
//! terminate a clause with `0`, push a single-shot assumption, solve, and query a model
//! value. Nothing above this trait ever reaches into a specific solver's types; the only
//! file in the crate that knows about `rustsat`/`rustsat-kissat` is this one, so swapping
//! the backend later is a one-file change.

use rustsat::solvers::{Solve, SolveIncremental, SolverResult};
use rustsat::types::{Clause, Lit as BackendLit, TernaryVal};
use rustsat_kissat::Kissat;

/// The IPASIR-shaped interface the solver façade consumes.
///
/// Literals crossing this boundary are plain signed 32-bit integers in DIMACS form; `0`
/// terminates a clause. Implementations own their handle exclusively and release it on
/// drop.
pub(crate) trait ClauseBackend {
    fn add(&mut self, lit: i32);
    fn assume(&mut self, lit: i32);
    fn solve(&mut self) -> i32;
    fn val(&mut self, var: i32) -> i32;
}

/// A [`ClauseBackend`] backed by the Kissat solver through `rustsat-kissat`.
pub(crate) struct KissatBackend {
    solver: Kissat<'static>,
    building: Vec<BackendLit>,
    assumptions: Vec<BackendLit>,
}

impl Default for KissatBackend {
    fn default() -> Self {
        KissatBackend {
            solver: Kissat::default(),
            building: Vec::new(),
            assumptions: Vec::new(),
        }
    }
}

impl KissatBackend {
    fn to_backend_lit(raw: i32) -> BackendLit {
        debug_assert_ne!(raw, 0, "0 is a clause terminator, not a literal");
        BackendLit::from_ipasir(raw).expect("literal magnitude out of range for the backend")
    }
}

impl ClauseBackend for KissatBackend {
    fn add(&mut self, lit: i32) {
        if lit == 0 {
            let clause: Clause = std::mem::take(&mut self.building).into_iter().collect();
            self.solver
                .add_clause(clause)
                .expect("backend rejected a clause");
            return;
        }
        self.building.push(Self::to_backend_lit(lit));
    }

    fn assume(&mut self, lit: i32) {
        self.assumptions.push(Self::to_backend_lit(lit));
    }

    fn solve(&mut self) -> i32 {
        let assumps = std::mem::take(&mut self.assumptions);
        let result = if assumps.is_empty() {
            Solve::solve(&mut self.solver)
        } else {
            self.solver.solve_assumps(assumps)
        }
        .expect("backend solve call failed");
        match result {
            SolverResult::Sat => 10,
            SolverResult::Unsat => 20,
            SolverResult::Interrupted => 30,
        }
    }

    fn val(&mut self, var: i32) -> i32 {
        debug_assert!(var > 0, "val() takes a variable index, not a literal");
        let lit = Self::to_backend_lit(var);
        match self.solver.lit_val(lit).expect("no model available") {
            TernaryVal::True => var,
            TernaryVal::False => -var,
            TernaryVal::DontCare => var,
        }
    }
}
