use std::iter;

use crate::{
    algebra::{Dist, R2CDist, R2CTerm},
    error::Result,
    factor::Factor,
    fraction::Fraction,
    operator::Operator,
    tensor::Axis,
};

use super::{fixed_point, foreign, is_plain, minimal_expansion, with_factors, RecursionDriver};

/// Recursion for the semi-local (projected) part of an effective core potential, (a|U_P^n|b).
///
/// The operator order n indexes the radial integrals the (0|U_P^n|0) base cases are computed
/// from. Lowering a center along axis i, with l its exponent along that axis, expands the
/// angular factor with the coefficients of the Legendre polynomials P_(l-1) and P_(l-2), so
/// every step emits a short series of terms with raised radial order. Each axis is reduced
/// independently of the others, so the order in which axes are stepped does not matter.
#[derive(Copy, Clone, Debug, Default)]
pub struct ProjectedEcpDriver;

impl ProjectedEcpDriver {
    pub fn is_projected_ecp(&self, term: &R2CTerm) -> bool {
        is_plain(term, Operator::ProjectedEcp)
    }

    /// With l = (a+1_i)_i the exponent along the step axis:
    ///
    /// (a+1_i|U_P^n|b) = sum_k (2l - 1) / l c(l-1, k) AC_i xi^-k (a|U_P^(n+l-1-2k)|b)
    ///                 - sum_k (l - 1) / l c(l-2, k) xi^-(k+1) (a-1_i|U_P^(n+l-2-2k)|b)
    pub fn bra_vrr(&self, term: &R2CTerm, axis: Axis) -> Option<R2CDist> {
        if !self.is_projected_ecp(term) {
            return None;
        }
        legendre_vrr(term, axis, 0, Factor::ac(axis))
    }

    /// As [`Self::bra_vrr`] on the ket with BC_i.
    pub fn ket_vrr(&self, term: &R2CTerm, axis: Axis) -> Option<R2CDist> {
        if !self.is_projected_ecp(term) {
            return None;
        }
        legendre_vrr(term, axis, 1, Factor::bc(axis))
    }

    pub fn apply_bra_vrr(&self, term: &R2CTerm) -> Result<R2CDist> {
        if !self.is_projected_ecp(term) {
            return Err(foreign("projected ECP", term));
        }
        minimal_expansion(term, "projected ECP bra VRR", |t, axis| self.bra_vrr(t, axis))
    }

    pub fn apply_ket_vrr(&self, term: &R2CTerm) -> Result<R2CDist> {
        if !self.is_projected_ecp(term) {
            return Err(foreign("projected ECP", term));
        }
        minimal_expansion(term, "projected ECP ket VRR", |t, axis| self.ket_vrr(t, axis))
    }

    pub fn reduce_bra_vrr(&self, dist: &mut R2CDist) -> Result<()> {
        fixed_point(
            dist,
            "projected ECP bra VRR",
            |t| self.is_projected_ecp(t) && !t.is_auxiliary(0),
            |t| self.apply_bra_vrr(t),
        )
    }

    pub fn reduce_ket_vrr(&self, dist: &mut R2CDist) -> Result<()> {
        fixed_point(
            dist,
            "projected ECP ket VRR",
            |t| self.is_projected_ecp(t) && !t.is_auxiliary(1),
            |t| self.apply_ket_vrr(t),
        )
    }
}

fn legendre_vrr(term: &R2CTerm, axis: Axis, center: usize, distance: Factor) -> Option<R2CDist> {
    let l = i64::from(term.component(center, axis));
    let lowered = term.shift(axis, -1, center)?;
    let mut dist = Dist::new(term.clone());

    let coefficients = legendre(l - 1);
    for k in 0..=(l - 1).div_euclid(2) {
        let radial = lowered.shift_order((l - 1 - 2 * k) as i32)?;
        let factors = iter::once(distance)
            .chain(iter::repeat(Factor::inv_xi()).take(k as usize))
            .collect::<Vec<_>>();
        let fraction = Fraction::new(2 * l - 1, l) * coefficients[k as usize];
        dist.add(with_factors(radial, &factors, fraction));
    }

    if let Some(twice) = lowered.shift(axis, -1, center) {
        let coefficients = legendre(l - 2);
        for k in 0..=(l - 2).div_euclid(2) {
            let radial = twice.shift_order((l - 2 - 2 * k) as i32)?;
            let factors = vec![Factor::inv_xi(); k as usize + 1];
            let fraction = Fraction::new(-(l - 1), l) * coefficients[k as usize];
            dist.add(with_factors(radial, &factors, fraction));
        }
    }
    Some(dist)
}

/// Coefficients c(n, k) of x^(n - 2k) in the Legendre polynomial P_n, from Bonnet's recursion
/// (m + 1) P_(m+1) = (2m + 1) x P_m - m P_(m-1). Empty for negative n.
fn legendre(n: i64) -> Vec<Fraction> {
    match n {
        n if n < 0 => return Vec::new(),
        0 => return vec![Fraction::one()],
        _ => {}
    }

    // coefficients indexed by power of x
    let mut previous = vec![Fraction::one()];
    let mut current = vec![Fraction::zero(), Fraction::one()];

    for m in 1..n {
        let mut next = vec![Fraction::zero(); m as usize + 2];
        for (power, &c) in current.iter().enumerate() {
            next[power + 1] = next[power + 1] + c * Fraction::new(2 * m + 1, m + 1);
        }
        for (power, &c) in previous.iter().enumerate() {
            next[power] = next[power] + c * Fraction::new(-m, m + 1);
        }
        previous = std::mem::replace(&mut current, next);
    }

    (0..=n / 2)
        .map(|k| current[(n - 2 * k) as usize])
        .collect()
}

impl RecursionDriver<2> for ProjectedEcpDriver {
    fn operator(&self) -> Operator {
        Operator::ProjectedEcp
    }

    fn apply_recursion(&self, dist: &mut R2CDist) -> Result<()> {
        self.reduce_bra_vrr(dist)?;
        self.reduce_ket_vrr(dist)
    }
}
