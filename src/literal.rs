//! Signed-integer literal representation
//!
//! A [`Literal`] is a thin wrapper over a signed 32-bit integer, following the same
//! representation an IPASIR-compatible backend uses on the wire: the sign carries polarity,
//! and two sentinel magnitudes stand in for the Boolean constants so that negation never
//! needs to branch.

use std::fmt;
use std::ops::Neg;

/// A literal: a Boolean variable together with a polarity, or one of the two constants.
///
/// Constants are encoded as `±i32::MAX` rather than as out-of-band values, so that
/// `-ZERO == ONE` and `-ONE == ZERO` fall out of plain integer negation, and so that any
/// literal built from a freshly allocated variable has strictly smaller magnitude than
/// either constant (comparisons against a constant are therefore always safe).
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug, Default)]
pub struct Literal(i32);

impl Literal {
    /// Constant false.
    pub const ZERO: Literal = Literal(-i32::MAX);
    /// Constant true.
    pub const ONE: Literal = Literal(i32::MAX);
    /// Sentinel meaning "no such literal". Never legal to pass to clause emission.
    pub const ILLEGAL: Literal = Literal(0);

    /// Build the positive-polarity literal for a 1-indexed variable number.
    ///
    /// `var` must be strictly less than `i32::MAX` so it cannot collide with the constants.
    pub(crate) fn from_var(var: i32) -> Literal {
        debug_assert!(var > 0 && var < i32::MAX, "variable index out of range");
        Literal(var)
    }

    /// The raw signed representation, as it would cross the backend clause interface.
    pub fn as_raw(self) -> i32 {
        self.0
    }

    /// True for every literal except the `ILLEGAL` sentinel: `is_legal(x)` iff `-x != x`.
    pub fn is_legal(self) -> bool {
        -self != self
    }

    /// True for `ZERO` and `ONE`.
    pub fn is_const(self) -> bool {
        self == Literal::ZERO || self == Literal::ONE
    }

    /// True when the literal is negated (i.e. has negative sign).
    pub fn is_negated(self) -> bool {
        self.0 < 0
    }

    /// Absolute value, discarding polarity. `abs(ZERO)` is `ONE` by construction, since
    /// `ZERO` is the one stored with a negative sign.
    pub fn abs(self) -> Literal {
        if self.is_negated() {
            -self
        } else {
            self
        }
    }

    /// The variable magnitude this literal refers to. Only meaningful for non-constant
    /// literals; callers are expected to have ruled out `is_const` first.
    pub(crate) fn magnitude(self) -> i32 {
        self.0.unsigned_abs() as i32
    }

    /// Shift a positive-polarity, non-constant literal's variable index by `delta`.
    ///
    /// Used to address a row of consecutively allocated counter variables (the
    /// at-most-k cardinality encoding) by offset from its first literal.
    pub(crate) fn offset(self, delta: i32) -> Literal {
        debug_assert!(!self.is_negated() && !self.is_const());
        Literal::from_var(self.0 + delta)
    }
}

impl Neg for Literal {
    type Output = Literal;
    fn neg(self) -> Literal {
        Literal(-self.0)
    }
}

impl Neg for &'_ Literal {
    type Output = Literal;
    fn neg(self) -> Literal {
        Literal(-self.0)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Literal::ZERO {
            write!(f, "0")
        } else if *self == Literal::ONE {
            write!(f, "1")
        } else {
            if self.is_negated() {
                write!(f, "!")?;
            }
            write!(f, "v{}", self.abs().0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        let z = Literal::ZERO;
        let o = Literal::ONE;
        assert_eq!(-z, o);
        assert_eq!(-o, z);
        assert!(z.is_const());
        assert!(o.is_const());
        assert!(!z.is_negated());
        assert!(o.is_negated());
        assert_eq!(format!("{z}"), "0");
        assert_eq!(format!("{o}"), "1");
    }

    #[test]
    fn test_illegal() {
        assert!(!Literal::ILLEGAL.is_legal());
        assert!(Literal::ZERO.is_legal());
        assert!(Literal::ONE.is_legal());
    }

    #[test]
    fn test_fresh_variables() {
        for v in 1..10 {
            let l = Literal::from_var(v);
            assert!(l.is_legal());
            assert!(!l.is_const());
            assert!(!l.is_negated());
            assert!((-l).is_negated());
            assert_eq!(l.abs(), l);
            assert_eq!((-l).abs(), l);
            assert_eq!(format!("{l}"), format!("v{v}"));
            assert_eq!(format!("{}", -l), format!("!v{v}"));
        }
    }

    #[test]
    fn test_ordering_is_signed() {
        let a = Literal::from_var(1);
        let b = Literal::from_var(2);
        assert!(a < b);
        assert!(-a < a);
        assert!(-b < -a);
    }
}
