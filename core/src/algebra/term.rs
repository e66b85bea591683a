use std::fmt;

use itertools::Itertools;
use smallvec::SmallVec;

use crate::{
    factor::Factor,
    fraction::Fraction,
    integral::Integral,
    operator::OperatorComponent,
    tensor::Axis,
};

/// Sorted multiset of factors.
pub type Factors = SmallVec<[Factor; 6]>;

/// A single recursion term: prefactor * factors * integral.
///
/// Terms are values; every shift returns a new term carrying the same prefactor and factors.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Term<const N: usize> {
    integral: Integral<N>,
    prefactor: Fraction,
    factors: Factors,
}

pub type R2CTerm = Term<2>;
pub type R3CTerm = Term<3>;
pub type R4CTerm = Term<4>;

impl<const N: usize> Term<N> {
    /// A unit term referencing `integral`.
    pub fn new(integral: Integral<N>) -> Self {
        Self {
            integral,
            prefactor: Fraction::one(),
            factors: Factors::new(),
        }
    }

    pub fn integral(&self) -> &Integral<N> {
        &self.integral
    }

    pub fn prefactor(&self) -> Fraction {
        self.prefactor
    }

    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    /// Multiplies the term by `factor * fraction`.
    pub fn add(&mut self, factor: Factor, fraction: Fraction) {
        let position = self.factors.partition_point(|f| f <= &factor);
        self.factors.insert(position, factor);
        self.prefactor = self.prefactor * fraction;
    }

    /// Multiplies the prefactor only.
    pub fn scale(&mut self, fraction: Fraction) {
        self.prefactor = self.prefactor * fraction;
    }

    /// Builder form of [`Term::add`].
    pub fn with(mut self, factor: Factor, fraction: Fraction) -> Self {
        self.add(factor, fraction);
        self
    }

    /// Builder form of [`Term::scale`].
    pub fn scaled(mut self, fraction: Fraction) -> Self {
        self.scale(fraction);
        self
    }

    /// Multiplies the term by another term's prefactor and factors.
    pub fn multiply(&mut self, other: &Term<N>) {
        for &factor in other.factors() {
            self.add(factor, Fraction::one());
        }
        self.scale(other.prefactor);
    }

    pub(crate) fn set_prefactor(&mut self, prefactor: Fraction) {
        self.prefactor = prefactor;
    }

    pub fn shift(&self, axis: Axis, value: i32, center: usize) -> Option<Self> {
        Some(self.with_integral(self.integral.shift(axis, value, center)?))
    }

    pub fn shift_prefix(&self, axis: Axis, value: i32, center: usize, clear: bool) -> Option<Self> {
        Some(self.with_integral(self.integral.shift_prefix(axis, value, center, clear)?))
    }

    pub fn shift_operator(&self, axis: Axis, value: i32) -> Option<Self> {
        Some(self.with_integral(self.integral.shift_operator(axis, value)?))
    }

    pub fn shift_order(&self, value: i32) -> Option<Self> {
        Some(self.with_integral(self.integral.shift_order(value)?))
    }

    /// The same term with the integral's operator replaced.
    pub fn replace(&self, operator: OperatorComponent) -> Self {
        self.with_integral(self.integral.replace(operator))
    }

    fn with_integral(&self, integral: Integral<N>) -> Self {
        Self {
            integral,
            prefactor: self.prefactor,
            factors: self.factors.clone(),
        }
    }

    pub fn is_auxiliary(&self, center: usize) -> bool {
        self.integral.is_auxiliary(center)
    }

    /// Angular momentum component of a center along one axis.
    pub fn component(&self, center: usize, axis: Axis) -> u32 {
        self.integral.center(center)[axis]
    }

    /// Distinct factors with their powers, in sorted order.
    pub fn factor_powers(&self) -> Vec<(Factor, u32)> {
        self.factors
            .iter()
            .dedup_with_count()
            .map(|(count, &factor)| (factor, count as u32))
            .collect()
    }

    /// Key under which equal terms merge.
    pub(crate) fn signature(&self) -> (Integral<N>, Factors) {
        (self.integral, self.factors.clone())
    }
}

impl<const N: usize> fmt::Display for Term<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefactor)?;
        for (factor, power) in self.factor_powers() {
            if power == 1 {
                write!(f, " {factor}")?;
            } else {
                write!(f, " {factor}^{power}")?;
            }
        }
        write!(f, " {}", self.integral)
    }
}

#[cfg(test)]
mod tests {
    use super::Term;
    use crate::{
        factor::Factor,
        fraction::Fraction,
        integral::Integral,
        operator::{Operator, OperatorComponent},
        tensor::{Axis, TensorComponent},
    };

    fn overlap(bra: TensorComponent, ket: TensorComponent) -> Term<2> {
        Term::new(Integral::new(
            [bra, ket],
            OperatorComponent::scalar(Operator::Overlap),
        ))
    }

    #[test]
    fn factors_form_a_sorted_multiset() {
        let base = overlap(TensorComponent::zero(), TensorComponent::zero());

        let lhs = base
            .clone()
            .with(Factor::pa(Axis::X), Fraction::one())
            .with(Factor::inv_eta(), Fraction::new(1, 2));
        let rhs = base
            .with(Factor::inv_eta(), Fraction::one())
            .with(Factor::pa(Axis::X), Fraction::new(1, 2));

        assert_eq!(lhs, rhs);
        assert_eq!(lhs.prefactor(), Fraction::new(1, 2));
    }

    #[test]
    fn shifts_keep_coefficients() {
        let term = overlap(TensorComponent::new(1, 0, 0), TensorComponent::zero())
            .with(Factor::pa(Axis::X), Fraction::new(3, 2));

        let shifted = term.shift(Axis::X, -1, 0).unwrap();
        assert_eq!(shifted.prefactor(), Fraction::new(3, 2));
        assert_eq!(shifted.factors(), term.factors());
        assert!(shifted.is_auxiliary(0));

        assert!(term.shift(Axis::Y, -1, 0).is_none());
        assert!(term.shift_order(-1).is_none());
    }

    #[test]
    fn factor_powers_count_repeats() {
        let term = overlap(TensorComponent::zero(), TensorComponent::zero())
            .with(Factor::inv_p(), Fraction::one())
            .with(Factor::rho(), Fraction::one())
            .with(Factor::inv_p(), Fraction::new(-1, 2));

        assert_eq!(
            term.factor_powers(),
            vec![(Factor::inv_p(), 2), (Factor::rho(), 1)]
        );
        assert_eq!(term.to_string(), "-1/2 1/p^2 rho (0|1|0)");
    }
}
