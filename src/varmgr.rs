//! Fresh-variable allocation, algebraic simplification, and structural-hash caches.
//!
//! This is the "manager" half of the gate-synthesis layer: it never emits clauses and
//! never talks to the backend. It only ever returns [`Literal::ILLEGAL`] (meaning "no
//! simplification applies, and nothing is cached -- go synthesize a fresh gate") or a
//! literal that already denotes the requested gate's value, either because it collapsed
//! algebraically or because an equal gate was built before.
//!
//! The MUX simplification rules that would need to *synthesize* a sub-gate (e.g.
//! `mux(s, ONE, e) = s | e`) are deliberately not implemented here: doing so would need a
//! gate-builder callback, mirroring the virtual dispatch the original C++ uses between its
//! `VarManager` and `Solver` classes. Instead [`crate::solver::Solver::make_mux`] handles
//! those rules itself, falling back to [`VariableManager::mux_prelude`] and
//! [`VariableManager::lookup_mux`] for the purely algebraic parts.

use std::collections::HashMap;

use crate::literal::Literal;

/// Fresh-variable allocation and structural-hash caches for AND, XOR and MUX gates.
#[derive(Debug, Default)]
pub struct VariableManager {
    num_vars: i32,
    and_cache: HashMap<(Literal, Literal), Literal>,
    xor_cache: HashMap<(Literal, Literal), Literal>,
    mux_cache: HashMap<(Literal, Literal, Literal), Literal>,
}

/// Order a pair so the cache key is independent of argument order.
fn ordered_pair(a: Literal, b: Literal) -> (Literal, Literal) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

impl VariableManager {
    pub fn new() -> VariableManager {
        VariableManager::default()
    }

    /// Number of variables allocated so far.
    pub fn num_vars(&self) -> u32 {
        self.num_vars as u32
    }

    /// Allocate `n` consecutive fresh variables, returning the positive literal of the
    /// first one. The caller derives the rest by offsetting the raw representation.
    pub(crate) fn new_vars(&mut self, n: i32) -> Literal {
        debug_assert!(n > 0);
        let first = self.num_vars + 1;
        self.num_vars += n;
        debug_assert!(self.num_vars < i32::MAX, "variable space exhausted");
        Literal::from_var(first)
    }

    pub(crate) fn new_var(&mut self) -> Literal {
        self.new_vars(1)
    }

    /// True if `l` is a constant, or refers to a variable that has actually been
    /// allocated.
    pub(crate) fn is_known(&self, l: Literal) -> bool {
        l.is_const() || l.magnitude() <= self.num_vars
    }

    // ----------------------------------------------------------------- AND

    /// Apply the AND simplification rules, short-circuiting in order; `ILLEGAL` means a
    /// fresh encoding is required.
    pub(crate) fn simplify_and(&self, a: Literal, b: Literal) -> Literal {
        if a == Literal::ZERO || b == Literal::ZERO {
            return Literal::ZERO;
        }
        if a == Literal::ONE {
            return b;
        }
        if b == Literal::ONE {
            return a;
        }
        if a == b {
            return a;
        }
        if a == -b {
            return Literal::ZERO;
        }
        self.lookup_and(a, b)
    }

    fn lookup_and(&self, a: Literal, b: Literal) -> Literal {
        let key = ordered_pair(a, b);
        *self.and_cache.get(&key).unwrap_or(&Literal::ILLEGAL)
    }

    pub(crate) fn register_and(&mut self, a: Literal, b: Literal, c: Literal) {
        let key = ordered_pair(a, b);
        self.and_cache.insert(key, c);
    }

    // ------------------------------------------------------------------ OR
    //
    // OR is realized as NOT(AND(NOT a, NOT b)): the same cache backs both gates, and
    // negation on constant-time integer arithmetic makes the delegation free.

    pub(crate) fn simplify_or(&self, a: Literal, b: Literal) -> Literal {
        let inner = self.simplify_and(-a, -b);
        if inner == Literal::ILLEGAL {
            Literal::ILLEGAL
        } else {
            -inner
        }
    }

    pub(crate) fn register_or(&mut self, a: Literal, b: Literal, c: Literal) {
        self.register_and(-a, -b, -c);
    }

    // ----------------------------------------------------------------- XOR

    pub(crate) fn simplify_xor(&self, a: Literal, b: Literal) -> Literal {
        if a == Literal::ZERO {
            return b;
        }
        if b == Literal::ZERO {
            return a;
        }
        if a == Literal::ONE {
            return -b;
        }
        if b == Literal::ONE {
            return -a;
        }
        if a == b {
            return Literal::ZERO;
        }
        if a == -b {
            return Literal::ONE;
        }
        self.lookup_xor(a, b)
    }

    fn lookup_xor(&self, a: Literal, b: Literal) -> Literal {
        let neg = a.is_negated() ^ b.is_negated();
        let key = ordered_pair(a.abs(), b.abs());
        match self.xor_cache.get(&key) {
            None => Literal::ILLEGAL,
            Some(&c) => {
                if neg {
                    -c
                } else {
                    c
                }
            }
        }
    }

    /// Register `a ^ b = c`, plus the two rotated identities `a ^ c = b` and `b ^ c = a`
    /// that follow from XOR being its own group inverse. This amortizes future
    /// simplification: building `a ^ c` later is a cache hit even though it was never
    /// directly constructed.
    pub(crate) fn register_xor(&mut self, a: Literal, b: Literal, c: Literal) {
        let neg = a.is_negated() ^ b.is_negated() ^ c.is_negated();
        let (a, b, c) = (a.abs(), b.abs(), c.abs());

        let key_ab = ordered_pair(a, b);
        self.xor_cache.insert(key_ab, if neg { -c } else { c });

        let key_ac = ordered_pair(a, c);
        self.xor_cache.insert(key_ac, if neg { -b } else { b });

        let key_cb = ordered_pair(c, b);
        self.xor_cache.insert(key_cb, if neg { -a } else { a });
    }

    // ----------------------------------------------------------------- MUX
    //
    // mux(s, t, e) = if s then t else e = (s & t) | (!s & e)

    /// The purely algebraic prelude of MUX simplification: selector constants, and the
    /// `t == e` collapse. Everything past this needs to synthesize a sub-gate and is
    /// handled one level up, in [`crate::solver::Solver::make_mux`].
    pub(crate) fn mux_prelude(&self, s: Literal, t: Literal, e: Literal) -> Literal {
        if s == Literal::ONE {
            return t;
        }
        if s == Literal::ZERO {
            return e;
        }
        if t == e {
            return t;
        }
        Literal::ILLEGAL
    }

    /// Canonicalize `(s, t, e)` to eliminate MUX's two degrees of freedom (selector
    /// polarity and then-branch polarity), returning the normalized key together with
    /// whether the looked-up result must be negated to answer the original query.
    fn canonical_mux_key(s: Literal, t: Literal, e: Literal) -> ((Literal, Literal, Literal), bool) {
        // mux(!s, t, e) = mux(s, e, t): normalize so the selector is never negated.
        let (s, t, e) = if s.is_negated() {
            (-s, e, t)
        } else {
            (s, t, e)
        };
        // mux(s, !t, !e) = !mux(s, t, e): normalize so the then-branch is never negated.
        let neg = t.is_negated();
        let (t, e) = if neg { (-t, -e) } else { (t, e) };
        ((s, t, e), neg)
    }

    pub(crate) fn lookup_mux(&self, s: Literal, t: Literal, e: Literal) -> Literal {
        let (key, neg) = Self::canonical_mux_key(s, t, e);
        match self.mux_cache.get(&key) {
            None => Literal::ILLEGAL,
            Some(&r) => {
                if neg {
                    -r
                } else {
                    r
                }
            }
        }
    }

    pub(crate) fn register_mux(&mut self, s: Literal, t: Literal, e: Literal, r: Literal) {
        let (key, neg) = Self::canonical_mux_key(s, t, e);
        let r = if neg { -r } else { r };
        self.mux_cache.insert(key, r);
    }
}
