//! Operator-overload convenience on top of a thread-local "current solver".
//!
//! Building a small circuit with `solver.make_and(a, b)` everywhere gets noisy. This
//! module lets a literal's `&`, `|`, `^` operators and a free `mux()` function route to
//! whichever [`Solver`] is installed as current on this thread, mirroring the original's
//! global solver pointer with a thread-local instead of process-wide mutable state.
//!
//! Nothing in [`crate::solver`] or [`crate::varmgr`] depends on this module; it's a purely
//! additive convenience layer, off by default, opted into by calling [`install`].

use std::cell::RefCell;

use crate::literal::Literal;
use crate::solver::Solver;

thread_local! {
    static CURRENT: RefCell<Option<Solver>> = const { RefCell::new(None) };
}

/// Install `solver` as the current thread's ambient solver, returning whichever one (if
/// any) was previously installed.
pub fn install(solver: Solver) -> Option<Solver> {
    CURRENT.with(|cell| cell.borrow_mut().replace(solver))
}

/// Remove and return the current thread's ambient solver, if one is installed.
pub fn uninstall() -> Option<Solver> {
    CURRENT.with(|cell| cell.borrow_mut().take())
}

fn with_current<R>(f: impl FnOnce(&mut Solver) -> R) -> R {
    CURRENT.with(|cell| {
        let mut slot = cell.borrow_mut();
        let solver = slot
            .as_mut()
            .expect("no ambient solver installed on this thread; call ambient::install() first");
        f(solver)
    })
}

/// `mux(s, t, e)` against the ambient solver.
pub fn mux(s: Literal, t: Literal, e: Literal) -> Literal {
    with_current(|solver| solver.make_mux(s, t, e))
}

impl std::ops::BitAnd for Literal {
    type Output = Literal;
    fn bitand(self, rhs: Literal) -> Literal {
        with_current(|solver| solver.make_and(self, rhs))
    }
}

impl std::ops::BitOr for Literal {
    type Output = Literal;
    fn bitor(self, rhs: Literal) -> Literal {
        with_current(|solver| solver.make_or(self, rhs))
    }
}

impl std::ops::BitXor for Literal {
    type Output = Literal;
    fn bitxor(self, rhs: Literal) -> Literal {
        with_current(|solver| solver.make_xor(self, rhs))
    }
}
