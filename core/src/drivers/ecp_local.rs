use crate::{
    algebra::{Dist, R2CDist, R2CTerm},
    error::Result,
    factor::Factor,
    fraction::Fraction,
    operator::Operator,
    tensor::Axis,
};

use super::{add_lowered, fixed_point, foreign, is_plain, minimal_expansion, RecursionDriver};

/// Recursion for the local part of an effective core potential, (a|U_L|b).
///
/// The Gaussian radial term of the potential on C combines with the bra and ket Gaussians into
/// one Gaussian of total exponent xi = a + b + c, so the recursion is the overlap recursion
/// about that product center.
#[derive(Copy, Clone, Debug, Default)]
pub struct LocalEcpDriver;

impl LocalEcpDriver {
    pub fn is_local_ecp(&self, term: &R2CTerm) -> bool {
        is_plain(term, Operator::LocalEcp)
    }

    /// (a+1_i|U_L|b) = -b / xi AB_i (a|U_L|b) - c / xi AC_i (a|U_L|b)
    ///               + a_i / (2 xi) (a-1_i|U_L|b) + b_i / (2 xi) (a|U_L|b-1_i)
    pub fn bra_vrr(&self, term: &R2CTerm, axis: Axis) -> Option<R2CDist> {
        if !self.is_local_ecp(term) {
            return None;
        }

        let lowered = term.shift(axis, -1, 0)?;
        let mut dist = Dist::new(term.clone());
        dist.add(
            lowered
                .clone()
                .with(Factor::b_over_xi(), Fraction::from(-1))
                .with(Factor::ab(axis), Fraction::one()),
        );
        dist.add(
            lowered
                .clone()
                .with(Factor::c_over_xi(), Fraction::from(-1))
                .with(Factor::ac(axis), Fraction::one()),
        );
        add_lowered(&mut dist, &lowered, axis, &[0, 1], &[Factor::inv_xi()], 1);
        Some(dist)
    }

    /// (a|U_L|b+1_i) = a / xi AB_i (a|U_L|b) - c / xi BC_i (a|U_L|b)
    ///               + a_i / (2 xi) (a-1_i|U_L|b) + b_i / (2 xi) (a|U_L|b-1_i)
    pub fn ket_vrr(&self, term: &R2CTerm, axis: Axis) -> Option<R2CDist> {
        if !self.is_local_ecp(term) {
            return None;
        }

        let lowered = term.shift(axis, -1, 1)?;
        let mut dist = Dist::new(term.clone());
        dist.add(
            lowered
                .clone()
                .with(Factor::a_over_xi(), Fraction::one())
                .with(Factor::ab(axis), Fraction::one()),
        );
        dist.add(
            lowered
                .clone()
                .with(Factor::c_over_xi(), Fraction::from(-1))
                .with(Factor::bc(axis), Fraction::one()),
        );
        add_lowered(&mut dist, &lowered, axis, &[0, 1], &[Factor::inv_xi()], 1);
        Some(dist)
    }

    pub fn apply_bra_vrr(&self, term: &R2CTerm) -> Result<R2CDist> {
        if !self.is_local_ecp(term) {
            return Err(foreign("local ECP", term));
        }
        minimal_expansion(term, "local ECP bra VRR", |t, axis| self.bra_vrr(t, axis))
    }

    pub fn apply_ket_vrr(&self, term: &R2CTerm) -> Result<R2CDist> {
        if !self.is_local_ecp(term) {
            return Err(foreign("local ECP", term));
        }
        minimal_expansion(term, "local ECP ket VRR", |t, axis| self.ket_vrr(t, axis))
    }

    pub fn reduce_bra_vrr(&self, dist: &mut R2CDist) -> Result<()> {
        fixed_point(
            dist,
            "local ECP bra VRR",
            |t| self.is_local_ecp(t) && !t.is_auxiliary(0),
            |t| self.apply_bra_vrr(t),
        )
    }

    pub fn reduce_ket_vrr(&self, dist: &mut R2CDist) -> Result<()> {
        fixed_point(
            dist,
            "local ECP ket VRR",
            |t| self.is_local_ecp(t) && !t.is_auxiliary(1),
            |t| self.apply_ket_vrr(t),
        )
    }
}

impl RecursionDriver<2> for LocalEcpDriver {
    fn operator(&self) -> Operator {
        Operator::LocalEcp
    }

    fn apply_recursion(&self, dist: &mut R2CDist) -> Result<()> {
        self.reduce_bra_vrr(dist)?;
        self.reduce_ket_vrr(dist)
    }
}
