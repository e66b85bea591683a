use crate::{
    algebra::{Dist, R2CDist, R2CTerm},
    error::Result,
    factor::Factor,
    fraction::Fraction,
    operator::{Operator, OperatorComponent},
    tensor::Axis,
};

use super::{
    fixed_point, foreign, is_plain, map_terms, minimal_expansion, OverlapDriver, RecursionDriver,
};

/// Recursion for linear momentum integrals (a|p_e|b).
///
/// Only the real gradient part of p = -i nabla is expanded, the factor (-i)^|e| is left to the
/// consumer. The gradient acts on the ket Gaussian and turns into overlaps of shifted kets.
#[derive(Copy, Clone, Debug, Default)]
pub struct LinearMomentumDriver;

impl LinearMomentumDriver {
    pub fn is_linear_momentum(&self, term: &R2CTerm) -> bool {
        is_plain(term, Operator::LinearMomentum)
    }

    /// (a|d_(e+1_i)|b) = 2 b (a|d_e|b+1_i) - b_i (a|d_e|b-1_i)
    pub fn operator_vrr(&self, term: &R2CTerm, axis: Axis) -> Option<R2CDist> {
        if !self.is_linear_momentum(term) {
            return None;
        }

        let lowered = term.shift_operator(axis, -1)?;
        let mut dist = Dist::new(term.clone());
        if let Some(raised) = lowered.shift(axis, 1, 1) {
            dist.add(raised.with(Factor::exponent(1), Fraction::from(2)));
        }
        if let Some(ket) = lowered.shift(axis, -1, 1) {
            let b = i64::from(lowered.component(1, axis));
            dist.add(ket.scaled(Fraction::from(-b)));
        }
        map_terms(&mut dist, demote);
        Some(dist)
    }

    pub fn apply_operator_vrr(&self, term: &R2CTerm) -> Result<R2CDist> {
        if !self.is_linear_momentum(term) {
            return Err(foreign("linear momentum", term));
        }
        minimal_expansion(term, "linear momentum operator VRR", |t, axis| {
            self.operator_vrr(t, axis)
        })
    }

    pub fn reduce_operator_vrr(&self, dist: &mut R2CDist) -> Result<()> {
        fixed_point(
            dist,
            "linear momentum operator VRR",
            |t| self.is_linear_momentum(t),
            |t| self.apply_operator_vrr(t),
        )
    }
}

/// The gradient of order zero is the overlap.
fn demote(term: R2CTerm) -> R2CTerm {
    let operator = term.integral().operator();
    if operator.operator() == Operator::LinearMomentum && operator.shape().order() == 0 {
        term.replace(OperatorComponent::scalar(Operator::Overlap))
    } else {
        term
    }
}

impl RecursionDriver<2> for LinearMomentumDriver {
    fn operator(&self) -> Operator {
        Operator::LinearMomentum
    }

    fn apply_recursion(&self, dist: &mut R2CDist) -> Result<()> {
        map_terms(dist, demote);
        self.reduce_operator_vrr(dist)?;
        OverlapDriver.apply_recursion(dist)
    }
}

#[cfg(test)]
mod tests {
    use super::LinearMomentumDriver;
    use crate::{
        algebra::Term,
        factor::Factor,
        fraction::Fraction,
        integral::Integral,
        operator::{Operator, OperatorComponent},
        tensor::{Axis, TensorComponent},
    };

    #[test]
    fn gradient_of_p_function() {
        let s = TensorComponent::zero();
        let pz = TensorComponent::unit(Axis::Z);
        let term = Term::new(Integral::new(
            [s, pz],
            OperatorComponent::new(Operator::LinearMomentum, pz, 0),
        ));

        let dist = LinearMomentumDriver.operator_vrr(&term, Axis::Z).unwrap();
        let overlap = OperatorComponent::scalar(Operator::Overlap);

        // 2 b (s|zz) - (s|s)
        assert_eq!(dist.len(), 2);
        assert_eq!(
            dist.terms()[0],
            Term::new(Integral::new([s, TensorComponent::new(0, 0, 2)], overlap))
                .with(Factor::exponent(1), Fraction::from(2))
        );
        assert_eq!(
            dist.terms()[1],
            Term::new(Integral::new([s, s], overlap)).scaled(Fraction::from(-1))
        );
        assert!(LinearMomentumDriver.operator_vrr(&term, Axis::X).is_none());
    }
}
