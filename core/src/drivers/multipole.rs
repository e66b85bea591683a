use crate::{
    algebra::{Dist, R2CDist, R2CTerm},
    error::Result,
    factor::Factor,
    fraction::Fraction,
    operator::{Operator, OperatorComponent},
    tensor::Axis,
};

use super::{
    add_lowered, fixed_point, foreign, is_plain, map_terms, minimal_expansion, OverlapDriver,
    RecursionDriver,
};

/// Recursion for Cartesian multipole integrals (a|M_e|b) about the origin C, eq. (A5) of [1].
#[derive(Copy, Clone, Debug, Default)]
pub struct MultipoleDriver;

impl MultipoleDriver {
    pub fn is_multipole(&self, term: &R2CTerm) -> bool {
        is_plain(term, Operator::Multipole)
    }

    /// (a+1_i|M_e|b) = PA_i (a|M_e|b) + a_i / (2 eta) (a-1_i|M_e|b) + b_i / (2 eta) (a|M_e|b-1_i)
    ///               + e_i / (2 eta) (a|M_(e-1_i)|b)
    pub fn bra_vrr(&self, term: &R2CTerm, axis: Axis) -> Option<R2CDist> {
        self.vrr(term, axis, 0, Factor::pa(axis))
    }

    /// As [`Self::bra_vrr`] with PB_i.
    pub fn ket_vrr(&self, term: &R2CTerm, axis: Axis) -> Option<R2CDist> {
        self.vrr(term, axis, 1, Factor::pb(axis))
    }

    fn vrr(&self, term: &R2CTerm, axis: Axis, center: usize, distance: Factor) -> Option<R2CDist> {
        if !self.is_multipole(term) {
            return None;
        }

        let lowered = term.shift(axis, -1, center)?;
        let mut dist = Dist::new(term.clone());
        dist.add(lowered.clone().with(distance, Fraction::one()));
        add_lowered(&mut dist, &lowered, axis, &[0, 1], &[Factor::inv_eta()], 1);

        if let Some(moment) = lowered.shift_operator(axis, -1) {
            let e = i64::from(lowered.integral().operator().shape()[axis]);
            dist.add(moment.with(Factor::inv_eta(), Fraction::new(e, 2)));
        }
        map_terms(&mut dist, demote);
        Some(dist)
    }

    /// (0|M_(e+1_i)|0) = PC_i (0|M_e|0) + e_i / (2 eta) (0|M_(e-1_i)|0)
    pub fn operator_vrr(&self, term: &R2CTerm, axis: Axis) -> Option<R2CDist> {
        if !self.is_multipole(term) || !term.is_auxiliary(0) || !term.is_auxiliary(1) {
            return None;
        }

        let lowered = term.shift_operator(axis, -1)?;
        let mut dist = Dist::new(term.clone());
        dist.add(lowered.clone().with(Factor::pc(axis), Fraction::one()));
        if let Some(twice) = lowered.shift_operator(axis, -1) {
            let e = i64::from(lowered.integral().operator().shape()[axis]);
            dist.add(twice.with(Factor::inv_eta(), Fraction::new(e, 2)));
        }
        map_terms(&mut dist, demote);
        Some(dist)
    }

    pub fn apply_bra_vrr(&self, term: &R2CTerm) -> Result<R2CDist> {
        if !self.is_multipole(term) {
            return Err(foreign("multipole", term));
        }
        minimal_expansion(term, "multipole bra VRR", |t, axis| self.bra_vrr(t, axis))
    }

    pub fn apply_ket_vrr(&self, term: &R2CTerm) -> Result<R2CDist> {
        if !self.is_multipole(term) {
            return Err(foreign("multipole", term));
        }
        minimal_expansion(term, "multipole ket VRR", |t, axis| self.ket_vrr(t, axis))
    }

    pub fn apply_operator_vrr(&self, term: &R2CTerm) -> Result<R2CDist> {
        if !self.is_multipole(term) {
            return Err(foreign("multipole", term));
        }
        minimal_expansion(term, "multipole operator VRR", |t, axis| {
            self.operator_vrr(t, axis)
        })
    }

    pub fn reduce_bra_vrr(&self, dist: &mut R2CDist) -> Result<()> {
        fixed_point(
            dist,
            "multipole bra VRR",
            |t| self.is_multipole(t) && !t.is_auxiliary(0),
            |t| self.apply_bra_vrr(t),
        )
    }

    pub fn reduce_ket_vrr(&self, dist: &mut R2CDist) -> Result<()> {
        fixed_point(
            dist,
            "multipole ket VRR",
            |t| self.is_multipole(t) && !t.is_auxiliary(1),
            |t| self.apply_ket_vrr(t),
        )
    }

    pub fn reduce_operator_vrr(&self, dist: &mut R2CDist) -> Result<()> {
        fixed_point(
            dist,
            "multipole operator VRR",
            |t| self.is_multipole(t),
            |t| self.apply_operator_vrr(t),
        )
    }
}

/// The multipole of order zero is the overlap.
fn demote(term: R2CTerm) -> R2CTerm {
    let operator = term.integral().operator();
    if operator.operator() == Operator::Multipole && operator.shape().order() == 0 {
        term.replace(OperatorComponent::scalar(Operator::Overlap))
    } else {
        term
    }
}

impl RecursionDriver<2> for MultipoleDriver {
    fn operator(&self) -> Operator {
        Operator::Multipole
    }

    fn apply_recursion(&self, dist: &mut R2CDist) -> Result<()> {
        map_terms(dist, demote);
        self.reduce_bra_vrr(dist)?;
        self.reduce_ket_vrr(dist)?;
        self.reduce_operator_vrr(dist)?;
        OverlapDriver.apply_recursion(dist)
    }
}

#[cfg(test)]
mod tests {
    use super::MultipoleDriver;
    use crate::{
        algebra::{Dist, Term},
        drivers::RecursionDriver,
        factor::Factor,
        fraction::Fraction,
        integral::Integral,
        operator::{Operator, OperatorComponent},
        tensor::{Axis, TensorComponent},
    };

    fn multipole(bra: TensorComponent, shape: TensorComponent, ket: TensorComponent) -> Term<2> {
        Term::new(Integral::new(
            [bra, ket],
            OperatorComponent::new(Operator::Multipole, shape, 0),
        ))
    }

    #[test]
    fn dipole_of_s_functions() {
        let s = TensorComponent::zero();
        let mut dist = Dist::new(multipole(s, TensorComponent::unit(Axis::Y), s));
        MultipoleDriver.apply_recursion(&mut dist).unwrap();

        // (s|M_y|s) = PC_y (s|s)
        let overlap = Integral::new([s, s], OperatorComponent::scalar(Operator::Overlap));
        assert_eq!(dist.len(), 1);
        assert_eq!(
            dist.terms()[0],
            Term::new(overlap).with(Factor::pc(Axis::Y), Fraction::one())
        );
    }

    #[test]
    fn quadrupole_operator_step() {
        let s = TensorComponent::zero();
        let term = multipole(s, TensorComponent::new(2, 0, 0), s);
        let dist = MultipoleDriver.operator_vrr(&term, Axis::X).unwrap();

        assert_eq!(dist.len(), 2);
        assert_eq!(
            dist.terms()[1].integral().operator(),
            OperatorComponent::scalar(Operator::Overlap)
        );
        assert_eq!(dist.terms()[1].prefactor(), Fraction::new(1, 2));
    }
}
