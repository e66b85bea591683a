use crate::{
    algebra::{Dist, R2CDist, R2CTerm},
    error::Result,
    factor::Factor,
    fraction::Fraction,
    operator::{Operator, OperatorComponent},
    tensor::Axis,
};

use super::{
    add_lowered, fixed_point, foreign, is_plain, minimal_expansion, OverlapDriver,
    RecursionDriver,
};

/// Recursion for kinetic energy integrals (a|T|b), eq. (A11) of [1].
///
/// The kinetic recursion couples to overlap integrals. Once every kinetic term is reduced to
/// (0|T|0), that is rewritten to overlaps as well and the overlap recursion finishes the job.
#[derive(Copy, Clone, Debug, Default)]
pub struct KineticEnergyDriver;

impl KineticEnergyDriver {
    pub fn is_kinetic_energy(&self, term: &R2CTerm) -> bool {
        is_plain(term, Operator::KineticEnergy)
    }

    /// (a+1_i|T|b) = PA_i (a|T|b) + a_i / (2 eta) (a-1_i|T|b) + b_i / (2 eta) (a|T|b-1_i)
    ///             + 2 xi (a+1_i|b) - a_i b / eta (a-1_i|b)
    pub fn bra_vrr(&self, term: &R2CTerm, axis: Axis) -> Option<R2CDist> {
        self.vrr(term, axis, 0, Factor::pa(axis), Factor::b_over_eta())
    }

    /// (a|T|b+1_i) = PB_i (a|T|b) + a_i / (2 eta) (a-1_i|T|b) + b_i / (2 eta) (a|T|b-1_i)
    ///             + 2 xi (a|b+1_i) - b_i a / eta (a|b-1_i)
    pub fn ket_vrr(&self, term: &R2CTerm, axis: Axis) -> Option<R2CDist> {
        self.vrr(term, axis, 1, Factor::pb(axis), Factor::a_over_eta())
    }

    fn vrr(
        &self,
        term: &R2CTerm,
        axis: Axis,
        center: usize,
        distance: Factor,
        ratio: Factor,
    ) -> Option<R2CDist> {
        if !self.is_kinetic_energy(term) {
            return None;
        }

        let lowered = term.shift(axis, -1, center)?;
        let mut dist = Dist::new(term.clone());
        dist.add(lowered.clone().with(distance, Fraction::one()));
        add_lowered(&mut dist, &lowered, axis, &[0, 1], &[Factor::inv_eta()], 1);

        let overlap = OperatorComponent::scalar(Operator::Overlap);
        dist.add(term.replace(overlap).with(Factor::xi(), Fraction::from(2)));
        if let Some(twice) = lowered.shift(axis, -1, center) {
            let n = i64::from(lowered.component(center, axis));
            dist.add(twice.replace(overlap).with(ratio, Fraction::from(-n)));
        }
        Some(dist)
    }

    /// (0|T|0) = 3 xi (0|0) - 2 xi^2 R_AB^2 (0|0)
    pub fn auxiliary(&self, term: &R2CTerm) -> Option<R2CDist> {
        if !self.is_kinetic_energy(term) || !term.is_auxiliary(0) || !term.is_auxiliary(1) {
            return None;
        }

        let overlap = term.replace(OperatorComponent::scalar(Operator::Overlap));
        let mut dist = Dist::new(term.clone());
        dist.add(overlap.clone().with(Factor::xi(), Fraction::from(3)));
        dist.add(
            overlap
                .with(Factor::xi(), Fraction::one())
                .with(Factor::xi(), Fraction::one())
                .with(Factor::ab_squared(), Fraction::from(-2)),
        );
        Some(dist)
    }

    pub fn apply_bra_vrr(&self, term: &R2CTerm) -> Result<R2CDist> {
        if !self.is_kinetic_energy(term) {
            return Err(foreign("kinetic energy", term));
        }
        minimal_expansion(term, "kinetic energy bra VRR", |t, axis| self.bra_vrr(t, axis))
    }

    pub fn apply_ket_vrr(&self, term: &R2CTerm) -> Result<R2CDist> {
        if !self.is_kinetic_energy(term) {
            return Err(foreign("kinetic energy", term));
        }
        minimal_expansion(term, "kinetic energy ket VRR", |t, axis| self.ket_vrr(t, axis))
    }

    pub fn reduce_bra_vrr(&self, dist: &mut R2CDist) -> Result<()> {
        fixed_point(
            dist,
            "kinetic energy bra VRR",
            |t| self.is_kinetic_energy(t) && !t.is_auxiliary(0),
            |t| self.apply_bra_vrr(t),
        )
    }

    pub fn reduce_ket_vrr(&self, dist: &mut R2CDist) -> Result<()> {
        fixed_point(
            dist,
            "kinetic energy ket VRR",
            |t| self.is_kinetic_energy(t) && !t.is_auxiliary(1),
            |t| self.apply_ket_vrr(t),
        )
    }

    pub fn reduce_auxiliary(&self, dist: &mut R2CDist) -> Result<()> {
        fixed_point(
            dist,
            "kinetic energy auxiliary",
            |t| self.is_kinetic_energy(t),
            |t| {
                self.auxiliary(t)
                    .ok_or_else(|| foreign("kinetic energy auxiliary", t))
            },
        )
    }
}

impl RecursionDriver<2> for KineticEnergyDriver {
    fn operator(&self) -> Operator {
        Operator::KineticEnergy
    }

    fn apply_recursion(&self, dist: &mut R2CDist) -> Result<()> {
        self.reduce_bra_vrr(dist)?;
        self.reduce_ket_vrr(dist)?;
        self.reduce_auxiliary(dist)?;
        OverlapDriver.apply_recursion(dist)
    }
}
