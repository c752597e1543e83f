//! The solver façade: Tseitin clause emission, the assumption/solve state machine, and
//! the backend's lifetime.

use log::{debug, info, trace};

use crate::backend::{ClauseBackend, KissatBackend};
use crate::error::GateError;
use crate::literal::Literal;
use crate::varmgr::VariableManager;

/// The three-valued lifecycle of the backing solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverState {
    /// Accepting clauses and gate constructions; no solve outcome is current.
    Input,
    /// The last `check()` found the current clause set satisfiable.
    Sat,
    /// The last `check()` found the current clause set unsatisfiable.
    Unsat,
}

/// Owns the backend clause interface and mediates every gate construction, clause
/// addition, and solve query against it.
pub struct Solver {
    vars: VariableManager,
    state: SolverState,
    num_clauses: u32,
    backend: Box<dyn ClauseBackend>,
}

impl Default for Solver {
    fn default() -> Self {
        Solver::new()
    }
}

impl Solver {
    /// Construct a fresh solver with an empty clause set, in `INPUT` state.
    pub fn new() -> Solver {
        Solver {
            vars: VariableManager::new(),
            state: SolverState::Input,
            num_clauses: 0,
            backend: Box::new(KissatBackend::default()),
        }
    }

    /// Number of variables allocated so far.
    pub fn num_vars(&self) -> u32 {
        self.vars.num_vars()
    }

    /// Number of clauses committed to the backend so far.
    pub fn num_clauses(&self) -> u32 {
        self.num_clauses
    }

    /// The current lifecycle state.
    pub fn state(&self) -> SolverState {
        self.state
    }

    /// Allocate and return a single fresh variable.
    pub fn new_var(&mut self) -> Literal {
        self.vars.new_var()
    }

    /// Allocate `n` consecutive fresh variables, returning the first one.
    pub fn new_vars(&mut self, n: u32) -> Literal {
        self.vars.new_vars(n as i32)
    }

    fn check_literal(&self, l: Literal) {
        debug_assert!(l.is_legal(), "illegal literal {l}");
        debug_assert!(self.vars.is_known(l), "unknown literal {l}");
    }

    /// A fallible sibling of the literal checks every gate builder does internally with
    /// `debug_assert!`. Meant for boundary call sites -- the CLI test harness, foreign
    /// bindings -- that would rather observe a contract violation as a value than abort.
    pub fn try_check_literal(&self, l: Literal) -> Result<(), GateError> {
        if !l.is_legal() {
            return Err(GateError::IllegalLiteral);
        }
        if !self.vars.is_known(l) {
            return Err(GateError::UnknownLiteral {
                literal: l,
                num_vars: self.num_vars(),
            });
        }
        Ok(())
    }

    /// A fallible sibling of [`Solver::value`] for the same boundary call sites.
    pub fn try_value(&mut self, lit: Literal) -> Result<bool, GateError> {
        if self.state != SolverState::Sat {
            return Err(GateError::StateMismatch {
                expected: SolverState::Sat,
                actual: self.state,
            });
        }
        self.try_check_literal(lit)?;
        Ok(self.value(lit))
    }

    // ------------------------------------------------------------- clauses

    /// Add a clause, given as any iterable of literals (an array literal, a `Vec`, a
    /// slice's `iter().copied()`, ...). If any literal is `ONE` the clause is a tautology
    /// and is dropped without touching the backend or the state. `ZERO` literals are
    /// skipped. Every literal must be legal and known.
    pub fn add_clause(&mut self, literals: impl IntoIterator<Item = Literal>) {
        let literals: Vec<Literal> = literals.into_iter().collect();
        for &l in &literals {
            self.check_literal(l);
        }
        if literals.iter().any(|&l| l == Literal::ONE) {
            trace!("clause eliminated: tautology");
            return;
        }
        debug!("adding clause: {literals:?}");
        for &l in &literals {
            if l != Literal::ZERO {
                trace!("  pushing literal {l}");
                self.backend.add(l.as_raw());
            }
        }
        self.backend.add(0);
        self.num_clauses += 1;
        self.state = SolverState::Input;
    }

    /// A single-shot assumption, consumed by the next [`Solver::check`]. `ONE` is a no-op;
    /// `ZERO` is encoded as an inconsistent pair of assumptions on a throwaway fresh
    /// variable, forcing the next solve to UNSAT without adding any clause.
    pub fn assume(&mut self, lit: Literal) {
        self.check_literal(lit);
        if lit == Literal::ONE {
            return;
        }
        if lit == Literal::ZERO {
            debug!("assuming false (forcing unsat via a throwaway variable)");
            let v = self.vars.new_var();
            self.backend.assume(v.as_raw());
            self.backend.assume((-v).as_raw());
            return;
        }
        debug!("assuming {lit}");
        self.backend.assume(lit.as_raw());
    }

    /// Run the backend's solve routine, consuming any pending assumptions, and update
    /// (and return) the lifecycle state.
    pub fn check(&mut self) -> SolverState {
        let code = self.backend.solve();
        self.state = match code {
            10 => SolverState::Sat,
            20 => SolverState::Unsat,
            _ => SolverState::Input,
        };
        info!("check() -> {:?}", self.state);
        self.state
    }

    /// The value assigned to `lit` under the current model. Only defined in `SAT` state.
    pub fn value(&mut self, lit: Literal) -> bool {
        debug_assert_eq!(
            self.state,
            SolverState::Sat,
            "value() requires SAT state, was in {:?}",
            self.state
        );
        self.check_literal(lit);
        if lit == Literal::ZERO {
            return false;
        }
        if lit == Literal::ONE {
            return true;
        }
        let raw = lit.abs().as_raw();
        let signed = self.backend.val(raw);
        (signed > 0) != lit.is_negated()
    }

    // ---------------------------------------------------------------- AND

    /// `AND(a, b)`, simplified or cached where possible, Tseitin-encoded otherwise.
    pub fn make_and(&mut self, a: Literal, b: Literal) -> Literal {
        self.check_literal(a);
        self.check_literal(b);
        let simplified = self.vars.simplify_and(a, b);
        if simplified != Literal::ILLEGAL {
            return simplified;
        }
        let c = self.vars.new_var();
        self.add_clause([a, -c]);
        self.add_clause([b, -c]);
        self.add_clause([-a, -b, c]);
        self.vars.register_and(a, b, c);
        c
    }

    /// Variadic AND. Empty input is `ONE`; a single input passes through; two inputs go
    /// through the pairwise, cached path. Larger inputs get one fresh output variable and
    /// a "big AND" encoding, uncached (see `network::gates` teacher precedent for
    /// n-ary gates that don't participate in structural hashing).
    pub fn make_and_n(&mut self, ins: &[Literal]) -> Literal {
        for &x in ins {
            self.check_literal(x);
        }
        match ins.len() {
            0 => Literal::ONE,
            1 => ins[0],
            2 => self.make_and(ins[0], ins[1]),
            _ => {
                if ins.iter().any(|&x| x == Literal::ZERO) {
                    return Literal::ZERO;
                }
                let r = self.vars.new_var();
                let mut big_clause = Vec::with_capacity(ins.len() + 1);
                for &x in ins {
                    self.add_clause([x, -r]);
                    big_clause.push(-x);
                }
                big_clause.push(r);
                self.add_clause(big_clause);
                r
            }
        }
    }

    // ----------------------------------------------------------------- OR

    /// `OR(a, b) = ¬AND(¬a, ¬b)`.
    pub fn make_or(&mut self, a: Literal, b: Literal) -> Literal {
        -self.make_and(-a, -b)
    }

    /// Variadic OR, by De Morgan over [`Solver::make_and_n`].
    pub fn make_or_n(&mut self, ins: &[Literal]) -> Literal {
        let negated: Vec<Literal> = ins.iter().map(|&x| -x).collect();
        -self.make_and_n(&negated)
    }

    // ---------------------------------------------------------------- XOR

    /// `XOR(a, b)`, simplified or cached where possible, Tseitin-encoded otherwise.
    pub fn make_xor(&mut self, a: Literal, b: Literal) -> Literal {
        self.check_literal(a);
        self.check_literal(b);
        let simplified = self.vars.simplify_xor(a, b);
        if simplified != Literal::ILLEGAL {
            return simplified;
        }
        let c = self.vars.new_var();
        self.add_clause([-a, -b, -c]);
        self.add_clause([a, b, -c]);
        self.add_clause([-a, b, c]);
        self.add_clause([a, -b, c]);
        self.vars.register_xor(a, b, c);
        c
    }

    /// Fan-in of an n-ary XOR reduction round: any 2..=7 positive-polarity, non-constant
    /// literals. Enumerates every assignment and blocks the one combination per
    /// assignment where the output's polarity doesn't match the input parity -- the same
    /// scheme [`Solver::make_xor`] uses for two inputs, generalized.
    const XOR_FANIN: usize = 7;

    fn make_xor_fanin(&mut self, chunk: &[Literal]) -> Literal {
        debug_assert!(chunk.len() >= 2 && chunk.len() <= Self::XOR_FANIN);
        let n = chunk.len();
        let r = self.vars.new_var();
        for mask in 0u32..(1 << n) {
            let mut clause = Vec::with_capacity(n + 1);
            let mut parity = false;
            for (i, &lit) in chunk.iter().enumerate() {
                let bit = (mask >> i) & 1 != 0;
                parity ^= bit;
                clause.push(if bit { -lit } else { lit });
            }
            let wrong_output = !parity;
            clause.push(if wrong_output { -r } else { r });
            self.add_clause(clause);
        }
        r
    }

    /// Variadic XOR. Constants are folded into a running output parity first (`ONE`
    /// inputs flip it, `ZERO` inputs are dropped, negated inputs flip it and contribute
    /// their absolute value); the remaining positive-polarity literals are reduced in
    /// rounds of up to [`Solver::XOR_FANIN`] at a time until one literal survives, which
    /// the accumulated parity is then applied to.
    pub fn make_xor_n(&mut self, ins: &[Literal]) -> Literal {
        for &x in ins {
            self.check_literal(x);
        }
        let mut parity = false;
        let mut rest = Vec::with_capacity(ins.len());
        for &x in ins {
            if x == Literal::ONE {
                parity = !parity;
            } else if x == Literal::ZERO {
                // dropped
            } else if x.is_negated() {
                parity = !parity;
                rest.push(-x);
            } else {
                rest.push(x);
            }
        }
        if rest.is_empty() {
            return if parity { Literal::ONE } else { Literal::ZERO };
        }
        while rest.len() > 1 {
            let mut next = Vec::with_capacity(rest.len().div_ceil(Self::XOR_FANIN));
            for chunk in rest.chunks(Self::XOR_FANIN) {
                if chunk.len() == 1 {
                    next.push(chunk[0]);
                } else {
                    next.push(self.make_xor_fanin(chunk));
                }
            }
            rest = next;
        }
        if parity {
            -rest[0]
        } else {
            rest[0]
        }
    }

    // ---------------------------------------------------------------- MUX

    /// `mux(s, t, e) = if s then t else e`.
    ///
    /// Simplification rules 3-9 of the specification synthesize a sub-gate (OR, AND or
    /// XOR); that's why they live here rather than in [`VariableManager`], which never
    /// emits clauses.
    pub fn make_mux(&mut self, s: Literal, t: Literal, e: Literal) -> Literal {
        self.check_literal(s);
        self.check_literal(t);
        self.check_literal(e);

        let prelude = self.vars.mux_prelude(s, t, e);
        if prelude != Literal::ILLEGAL {
            return prelude;
        }
        if t == Literal::ONE {
            return self.make_or(s, e);
        }
        if t == Literal::ZERO {
            return self.make_and(-s, e);
        }
        if e == Literal::ONE {
            return self.make_or(-s, t);
        }
        if e == Literal::ZERO {
            return self.make_and(s, t);
        }
        if t == -e {
            return self.make_xor(s, e);
        }
        if t == s {
            return self.make_or(s, e);
        }
        if t == -s {
            return self.make_and(-s, e);
        }
        if e == s {
            return self.make_and(s, t);
        }
        if e == -s {
            return self.make_or(-s, t);
        }

        let cached = self.vars.lookup_mux(s, t, e);
        if cached != Literal::ILLEGAL {
            return cached;
        }

        let r = self.vars.new_var();
        self.add_clause([-s, -t, r]);
        self.add_clause([-s, t, -r]);
        self.add_clause([s, -e, r]);
        self.add_clause([s, e, -r]);
        self.add_clause([-t, -e, r]);
        self.add_clause([t, e, -r]);
        self.vars.register_mux(s, t, e, r);
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_assignments(n: usize) -> Vec<Vec<bool>> {
        (0..1u32 << n)
            .map(|mask| (0..n).map(|i| (mask >> i) & 1 != 0).collect())
            .collect()
    }

    #[test]
    fn test_and_gate_correctness() {
        let mut s = Solver::new();
        let a = s.new_var();
        let b = s.new_var();
        let c = s.make_and(a, b);
        for assignment in all_assignments(2) {
            s.assume(if assignment[0] { a } else { -a });
            s.assume(if assignment[1] { b } else { -b });
            assert_eq!(s.check(), SolverState::Sat);
            assert_eq!(s.value(c), assignment[0] && assignment[1]);
        }
    }

    #[test]
    fn test_and_simplification_no_fresh_variable() {
        let mut s = Solver::new();
        let a = s.new_var();
        let before = s.num_vars();
        assert_eq!(s.make_and(a, -a), Literal::ZERO);
        assert_eq!(s.num_vars(), before);
        assert_eq!(s.make_and(a, Literal::ONE), a);
        assert_eq!(s.make_and(Literal::ONE, a), a);
        assert_eq!(s.make_and(a, Literal::ZERO), Literal::ZERO);
        assert_eq!(s.num_vars(), before);
    }

    #[test]
    fn test_and_cache_idempotence() {
        let mut s = Solver::new();
        let a = s.new_var();
        let b = s.new_var();
        let c1 = s.make_and(a, b);
        let clauses_before = s.num_clauses();
        let c2 = s.make_and(a, b);
        let c3 = s.make_and(b, a);
        assert_eq!(c1, c2);
        assert_eq!(c1, c3);
        assert_eq!(s.num_clauses(), clauses_before);
    }

    #[test]
    fn test_or_gate_correctness() {
        let mut s = Solver::new();
        let a = s.new_var();
        let b = s.new_var();
        let c = s.make_or(a, b);
        for assignment in all_assignments(2) {
            s.assume(if assignment[0] { a } else { -a });
            s.assume(if assignment[1] { b } else { -b });
            assert_eq!(s.check(), SolverState::Sat);
            assert_eq!(s.value(c), assignment[0] || assignment[1]);
        }
    }

    #[test]
    fn test_xor_gate_correctness_and_cache() {
        let mut s = Solver::new();
        let a = s.new_var();
        let b = s.new_var();
        let c = s.make_xor(a, b);
        assert_eq!(c, s.make_xor(b, a));
        assert_eq!(c, s.make_xor(-a, -b));
        assert_eq!(-c, s.make_xor(-a, b));
        for assignment in all_assignments(2) {
            s.assume(if assignment[0] { a } else { -a });
            s.assume(if assignment[1] { b } else { -b });
            assert_eq!(s.check(), SolverState::Sat);
            assert_eq!(s.value(c), assignment[0] != assignment[1]);
        }
    }

    #[test]
    fn test_xor_rotated_cache_entries() {
        let mut s = Solver::new();
        let a = s.new_var();
        let b = s.new_var();
        let c = s.make_xor(a, b);
        let clauses_before = s.num_clauses();
        // a ^ c should hit the rotated cache entry and equal b, with no new clauses.
        assert_eq!(s.make_xor(a, c), b);
        assert_eq!(s.num_clauses(), clauses_before);
    }

    #[test]
    fn test_mux_constant_rules() {
        let mut s = Solver::new();
        let t = s.new_var();
        let e = s.new_var();
        assert_eq!(s.make_mux(Literal::ONE, t, e), t);
        assert_eq!(s.make_mux(Literal::ZERO, t, e), e);
        let sel = s.new_var();
        assert_eq!(s.make_mux(sel, t, t), t);
    }

    #[test]
    fn test_mux_derived_gate_identities() {
        let mut s = Solver::new();
        let sel = s.new_var();
        let t = s.new_var();
        let e = s.new_var();
        assert_eq!(s.make_mux(sel, Literal::ONE, e), s.make_or(sel, e));
        assert_eq!(s.make_mux(sel, t, Literal::ZERO), s.make_and(sel, t));
        assert_eq!(s.make_mux(sel, t, -t), -s.make_xor(sel, t));
    }

    #[test]
    fn test_mux_gate_correctness() {
        let mut s = Solver::new();
        let sel = s.new_var();
        let t = s.new_var();
        let e = s.new_var();
        let r = s.make_mux(sel, t, e);
        for assignment in all_assignments(3) {
            s.assume(if assignment[0] { sel } else { -sel });
            s.assume(if assignment[1] { t } else { -t });
            s.assume(if assignment[2] { e } else { -e });
            assert_eq!(s.check(), SolverState::Sat);
            let expected = if assignment[0] { assignment[1] } else { assignment[2] };
            assert_eq!(s.value(r), expected);
        }
    }

    #[test]
    fn test_variadic_and_or() {
        let mut s = Solver::new();
        assert_eq!(s.make_and_n(&[]), Literal::ONE);
        assert_eq!(s.make_or_n(&[]), Literal::ZERO);

        let ins: Vec<Literal> = (0..4).map(|_| s.new_var()).collect();
        let r = s.make_and_n(&ins);
        for assignment in all_assignments(4) {
            for (i, &v) in ins.iter().enumerate() {
                s.assume(if assignment[i] { v } else { -v });
            }
            assert_eq!(s.check(), SolverState::Sat);
            assert_eq!(s.value(r), assignment.iter().all(|&b| b));
        }
    }

    #[test]
    fn test_variadic_and_with_zero_input() {
        let mut s = Solver::new();
        let a = s.new_var();
        let b = s.new_var();
        let before = s.num_vars();
        assert_eq!(s.make_and_n(&[a, b, Literal::ZERO]), Literal::ZERO);
        assert_eq!(s.num_vars(), before);
    }

    #[test]
    fn test_variadic_xor_small() {
        let mut s = Solver::new();
        let ins: Vec<Literal> = (0..4).map(|_| s.new_var()).collect();
        let r = s.make_xor_n(&ins);
        for assignment in all_assignments(4) {
            for (i, &v) in ins.iter().enumerate() {
                s.assume(if assignment[i] { v } else { -v });
            }
            assert_eq!(s.check(), SolverState::Sat);
            let expected = assignment.iter().filter(|&&b| b).count() % 2 == 1;
            assert_eq!(s.value(r), expected);
        }
    }

    #[test]
    fn test_variadic_xor_wide_fanin() {
        // 9 inputs forces two reduction rounds (7 + 2, then a final 2-ary round).
        let mut s = Solver::new();
        let ins: Vec<Literal> = (0..9).map(|_| s.new_var()).collect();
        let r = s.make_xor_n(&ins);
        for _ in 0..20 {
            let assignment: Vec<bool> = (0..9).map(|i| (i * 37 + 5) % 3 == 0).collect();
            for (i, &v) in ins.iter().enumerate() {
                s.assume(if assignment[i] { v } else { -v });
            }
            assert_eq!(s.check(), SolverState::Sat);
            let expected = assignment.iter().filter(|&&b| b).count() % 2 == 1;
            assert_eq!(s.value(r), expected);
        }
    }

    #[test]
    fn test_variadic_xor_constant_folding() {
        let mut s = Solver::new();
        let a = s.new_var();
        assert_eq!(s.make_xor_n(&[a, Literal::ZERO]), a);
        assert_eq!(s.make_xor_n(&[a, Literal::ONE]), -a);
        assert_eq!(s.make_xor_n(&[Literal::ONE, Literal::ONE]), Literal::ZERO);
        assert_eq!(s.make_xor_n(&[]), Literal::ZERO);
    }

    #[test]
    fn test_add_clause_tautology_is_dropped() {
        let mut s = Solver::new();
        let a = s.new_var();
        let before = s.num_clauses();
        s.add_clause([a, Literal::ONE, -a]);
        assert_eq!(s.num_clauses(), before);
    }

    #[test]
    fn test_empty_clause_is_unsat() {
        let mut s = Solver::new();
        s.add_clause([]);
        assert_eq!(s.check(), SolverState::Unsat);
    }

    #[test]
    fn test_clause_addition_resets_to_input() {
        let mut s = Solver::new();
        s.add_clause([]);
        assert_eq!(s.check(), SolverState::Unsat);
        let a = s.new_var();
        s.add_clause([a]);
        assert_eq!(s.state(), SolverState::Input);
    }
}
