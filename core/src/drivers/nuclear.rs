use crate::{
    algebra::{Dist, R2CDist, R2CTerm},
    error::Result,
    factor::Factor,
    fraction::Fraction,
    operator::Operator,
    tensor::Axis,
};

use super::{add_lowered, fixed_point, foreign, is_plain, minimal_expansion, RecursionDriver};

/// Recursion for nuclear potential integrals (a|A|b)^m, eq. (A20) of [1].
///
/// The superscript is the order of the Boys function the (0|A|0)^m base cases are computed
/// from.
#[derive(Copy, Clone, Debug, Default)]
pub struct NuclearPotentialDriver;

impl NuclearPotentialDriver {
    pub fn is_nuclear_potential(&self, term: &R2CTerm) -> bool {
        is_plain(term, Operator::NuclearPotential)
    }

    /// (a+1_i|A|b)^m = PA_i (a|A|b)^m - PC_i (a|A|b)^(m+1)
    ///               + a_i / (2 eta) [(a-1_i|A|b)^m - (a-1_i|A|b)^(m+1)]
    ///               + b_i / (2 eta) [(a|A|b-1_i)^m - (a|A|b-1_i)^(m+1)]
    pub fn bra_vrr(&self, term: &R2CTerm, axis: Axis) -> Option<R2CDist> {
        if !self.is_nuclear_potential(term) {
            return None;
        }
        potential_vrr(term, axis, 0, Factor::pa(axis))
    }

    /// (a|A|b+1_i)^m, as [`Self::bra_vrr`] with PB_i.
    pub fn ket_vrr(&self, term: &R2CTerm, axis: Axis) -> Option<R2CDist> {
        if !self.is_nuclear_potential(term) {
            return None;
        }
        potential_vrr(term, axis, 1, Factor::pb(axis))
    }

    pub fn apply_bra_vrr(&self, term: &R2CTerm) -> Result<R2CDist> {
        if !self.is_nuclear_potential(term) {
            return Err(foreign("nuclear potential", term));
        }
        minimal_expansion(term, "nuclear potential bra VRR", |t, axis| {
            self.bra_vrr(t, axis)
        })
    }

    pub fn apply_ket_vrr(&self, term: &R2CTerm) -> Result<R2CDist> {
        if !self.is_nuclear_potential(term) {
            return Err(foreign("nuclear potential", term));
        }
        minimal_expansion(term, "nuclear potential ket VRR", |t, axis| {
            self.ket_vrr(t, axis)
        })
    }

    pub fn reduce_bra_vrr(&self, dist: &mut R2CDist) -> Result<()> {
        fixed_point(
            dist,
            "nuclear potential bra VRR",
            |t| self.is_nuclear_potential(t) && !t.is_auxiliary(0),
            |t| self.apply_bra_vrr(t),
        )
    }

    pub fn reduce_ket_vrr(&self, dist: &mut R2CDist) -> Result<()> {
        fixed_point(
            dist,
            "nuclear potential ket VRR",
            |t| self.is_nuclear_potential(t) && !t.is_auxiliary(1),
            |t| self.apply_ket_vrr(t),
        )
    }
}

/// The nuclear potential vertical recursion on one center, shared with the electric field
/// driver. Does not check the operator.
pub(crate) fn potential_vrr(
    term: &R2CTerm,
    axis: Axis,
    center: usize,
    distance: Factor,
) -> Option<R2CDist> {
    let lowered = term.shift(axis, -1, center)?;
    let raised = lowered.shift_order(1)?;

    let mut dist = Dist::new(term.clone());
    dist.add(lowered.clone().with(distance, Fraction::one()));
    dist.add(raised.clone().with(Factor::pc(axis), Fraction::from(-1)));
    add_lowered(&mut dist, &lowered, axis, &[0, 1], &[Factor::inv_eta()], 1);
    add_lowered(&mut dist, &raised, axis, &[0, 1], &[Factor::inv_eta()], -1);
    Some(dist)
}

impl RecursionDriver<2> for NuclearPotentialDriver {
    fn operator(&self) -> Operator {
        Operator::NuclearPotential
    }

    fn apply_recursion(&self, dist: &mut R2CDist) -> Result<()> {
        self.reduce_bra_vrr(dist)?;
        self.reduce_ket_vrr(dist)
    }
}
