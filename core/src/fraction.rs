use std::{
    fmt,
    ops::{Add, Mul, Neg},
};

use num_rational::Rational64;
use num_traits::{One, Signed, Zero};

/// An exact rational prefactor of a recursion term.
///
/// Terms with the same integral and factors are merged by summing their prefactors, so this
/// must never be a float: contributions that cancel have to reach exactly zero.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fraction(Rational64);

impl Fraction {
    /// Creates `numerator / denominator`. Panics on a zero denominator.
    pub fn new(numerator: i64, denominator: i64) -> Self {
        Self(Rational64::new(numerator, denominator))
    }

    pub fn one() -> Self {
        Self(Rational64::one())
    }

    pub fn zero() -> Self {
        Self(Rational64::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.0.is_one()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    pub fn numerator(&self) -> i64 {
        *self.0.numer()
    }

    pub fn denominator(&self) -> i64 {
        *self.0.denom()
    }

    /// The prefactor as a floating point literal for generated code,
    /// e.g. `2.0`, `0.5` or `1.0 / 3.0`.
    pub fn to_literal(&self) -> String {
        let (numer, denom) = (self.numerator(), self.denominator());

        if denom == 1 {
            return format!("{numer}.0");
        }

        // denominators made only of 2s and 5s have a finite decimal expansion
        let mut rest = denom;
        for prime in [2, 5] {
            while rest % prime == 0 {
                rest /= prime;
            }
        }

        if rest == 1 {
            format!("{}", numer as f64 / denom as f64)
        } else {
            format!("{numer}.0 / {denom}.0")
        }
    }
}

impl From<i64> for Fraction {
    fn from(value: i64) -> Self {
        Self(Rational64::from_integer(value))
    }
}

impl Add for Fraction {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Mul for Fraction {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

impl Neg for Fraction {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
