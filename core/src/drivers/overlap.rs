use crate::{
    algebra::{Dist, R2CDist, R2CTerm},
    error::Result,
    factor::Factor,
    fraction::Fraction,
    operator::Operator,
    tensor::Axis,
};

use super::{add_lowered, fixed_point, foreign, is_plain, minimal_expansion, RecursionDriver};

/// Obara–Saika recursion for overlap integrals (a|b), eq. (A2) of [1].
#[derive(Copy, Clone, Debug, Default)]
pub struct OverlapDriver;

impl OverlapDriver {
    pub fn is_overlap(&self, term: &R2CTerm) -> bool {
        is_plain(term, Operator::Overlap)
    }

    /// (a+1_i|b) = PA_i (a|b) + a_i / (2 eta) (a-1_i|b) + b_i / (2 eta) (a|b-1_i)
    pub fn bra_vrr(&self, term: &R2CTerm, axis: Axis) -> Option<R2CDist> {
        self.vrr(term, axis, 0, Factor::pa(axis))
    }

    /// (a|b+1_i) = PB_i (a|b) + a_i / (2 eta) (a-1_i|b) + b_i / (2 eta) (a|b-1_i)
    pub fn ket_vrr(&self, term: &R2CTerm, axis: Axis) -> Option<R2CDist> {
        self.vrr(term, axis, 1, Factor::pb(axis))
    }

    fn vrr(&self, term: &R2CTerm, axis: Axis, center: usize, distance: Factor) -> Option<R2CDist> {
        if !self.is_overlap(term) {
            return None;
        }

        let lowered = term.shift(axis, -1, center)?;
        let mut dist = Dist::new(term.clone());
        dist.add(lowered.clone().with(distance, Fraction::one()));
        add_lowered(&mut dist, &lowered, axis, &[0, 1], &[Factor::inv_eta()], 1);
        Some(dist)
    }

    pub fn apply_bra_vrr(&self, term: &R2CTerm) -> Result<R2CDist> {
        if !self.is_overlap(term) {
            return Err(foreign("overlap", term));
        }
        minimal_expansion(term, "overlap bra VRR", |t, axis| self.bra_vrr(t, axis))
    }

    pub fn apply_ket_vrr(&self, term: &R2CTerm) -> Result<R2CDist> {
        if !self.is_overlap(term) {
            return Err(foreign("overlap", term));
        }
        minimal_expansion(term, "overlap ket VRR", |t, axis| self.ket_vrr(t, axis))
    }

    pub fn reduce_bra_vrr(&self, dist: &mut R2CDist) -> Result<()> {
        fixed_point(
            dist,
            "overlap bra VRR",
            |t| self.is_overlap(t) && !t.is_auxiliary(0),
            |t| self.apply_bra_vrr(t),
        )
    }

    pub fn reduce_ket_vrr(&self, dist: &mut R2CDist) -> Result<()> {
        fixed_point(
            dist,
            "overlap ket VRR",
            |t| self.is_overlap(t) && !t.is_auxiliary(1),
            |t| self.apply_ket_vrr(t),
        )
    }
}

impl RecursionDriver<2> for OverlapDriver {
    fn operator(&self) -> Operator {
        Operator::Overlap
    }

    fn apply_recursion(&self, dist: &mut R2CDist) -> Result<()> {
        self.reduce_bra_vrr(dist)?;
        self.reduce_ket_vrr(dist)
    }
}

#[cfg(test)]
mod tests {
    use super::OverlapDriver;
    use crate::{
        algebra::{Dist, Term},
        drivers::RecursionDriver,
        error::Error,
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
    fn p_p_bra_step() {
        let px = TensorComponent::unit(Axis::X);
        let s = TensorComponent::zero();
        let term = overlap(px, px);

        let dist = OverlapDriver.bra_vrr(&term, Axis::X).unwrap();
        assert_eq!(dist.len(), 2);
        assert_eq!(
            dist.terms()[0],
            overlap(s, px).with(Factor::pa(Axis::X), Fraction::one())
        );
        assert_eq!(
            dist.terms()[1],
            overlap(s, s).with(Factor::inv_eta(), Fraction::new(1, 2))
        );

        assert!(OverlapDriver.bra_vrr(&term, Axis::Y).is_none());
        assert_eq!(OverlapDriver.apply_bra_vrr(&term).unwrap(), dist);
    }

    #[test]
    fn d_s_expansion() {
        let mut dist = Dist::new(overlap(TensorComponent::new(2, 0, 0), TensorComponent::zero()));
        OverlapDriver.apply_recursion(&mut dist).unwrap();
        dist.simplify();

        // (xx|s) = PA_x^2 (s|s) + 1/2 1/eta (s|s)
        let s = overlap(TensorComponent::zero(), TensorComponent::zero());
        assert_eq!(dist.len(), 2);
        assert!(dist.terms().contains(
            &s.clone()
                .with(Factor::pa(Axis::X), Fraction::one())
                .with(Factor::pa(Axis::X), Fraction::one())
        ));
        assert!(dist
            .terms()
            .contains(&s.with(Factor::inv_eta(), Fraction::new(1, 2))));
    }

    #[test]
    fn foreign_terms_are_rejected() {
        let term = Term::new(Integral::new(
            [TensorComponent::unit(Axis::Z), TensorComponent::zero()],
            OperatorComponent::scalar(Operator::KineticEnergy),
        ));

        assert!(OverlapDriver.bra_vrr(&term, Axis::Z).is_none());
        assert!(matches!(
            OverlapDriver.apply_bra_vrr(&term),
            Err(Error::ForeignTerm { .. })
        ));
    }
}
