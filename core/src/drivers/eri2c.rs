use crate::{
    algebra::{Dist, R2CDist, R2CTerm, Term},
    error::Result,
    factor::Factor,
    fraction::Fraction,
    operator::Operator,
    tensor::Axis,
};

use super::{add_lowered, fixed_point, foreign, is_plain, minimal_expansion, RecursionDriver};

/// Recursion for two-center electron repulsion integrals (a|b)^m, eq. (39) of [1] with a
/// single Gaussian on either side: p = a, q = b, W - P = rho / p (Q - P).
#[derive(Copy, Clone, Debug, Default)]
pub struct TwoCenterRepulsionDriver;

impl TwoCenterRepulsionDriver {
    pub fn is_electron_repulsion(&self, term: &R2CTerm) -> bool {
        is_plain(term, Operator::ElectronRepulsion)
    }

    /// (a+1_i|b)^m = WP_i (a|b)^(m+1) + a_i / (2 p) [(a-1_i|b)^m - rho / p (a-1_i|b)^(m+1)]
    ///             + b_i / (2 (p + q)) (a|b-1_i)^(m+1)
    pub fn bra_vrr(&self, term: &R2CTerm, axis: Axis) -> Option<R2CDist> {
        if !self.is_electron_repulsion(term) {
            return None;
        }

        let lowered = term.shift(axis, -1, 0)?;
        let mut dist = Dist::new(term.clone());
        add_transfer(&mut dist, &lowered, &[], Factor::wp(axis));
        add_repulsion_lowered(&mut dist, &lowered, axis, &[0], Factor::inv_p(), &[1]);
        Some(dist)
    }

    /// (a|b+1_i)^m = WQ_i (a|b)^(m+1) + b_i / (2 q) [(a|b-1_i)^m - rho / q (a|b-1_i)^(m+1)]
    ///             + a_i / (2 (p + q)) (a-1_i|b)^(m+1)
    pub fn ket_vrr(&self, term: &R2CTerm, axis: Axis) -> Option<R2CDist> {
        if !self.is_electron_repulsion(term) {
            return None;
        }

        let lowered = term.shift(axis, -1, 1)?;
        let mut dist = Dist::new(term.clone());
        add_transfer(&mut dist, &lowered, &[], Factor::wq(axis));
        add_repulsion_lowered(&mut dist, &lowered, axis, &[1], Factor::inv_q(), &[0]);
        Some(dist)
    }

    pub fn apply_bra_vrr(&self, term: &R2CTerm) -> Result<R2CDist> {
        if !self.is_electron_repulsion(term) {
            return Err(foreign("electron repulsion", term));
        }
        minimal_expansion(term, "electron repulsion bra VRR", |t, axis| {
            self.bra_vrr(t, axis)
        })
    }

    pub fn apply_ket_vrr(&self, term: &R2CTerm) -> Result<R2CDist> {
        if !self.is_electron_repulsion(term) {
            return Err(foreign("electron repulsion", term));
        }
        minimal_expansion(term, "electron repulsion ket VRR", |t, axis| {
            self.ket_vrr(t, axis)
        })
    }

    pub fn reduce_bra_vrr(&self, dist: &mut R2CDist) -> Result<()> {
        fixed_point(
            dist,
            "electron repulsion bra VRR",
            |t| self.is_electron_repulsion(t) && !t.is_auxiliary(0),
            |t| self.apply_bra_vrr(t),
        )
    }

    pub fn reduce_ket_vrr(&self, dist: &mut R2CDist) -> Result<()> {
        fixed_point(
            dist,
            "electron repulsion ket VRR",
            |t| self.is_electron_repulsion(t) && !t.is_auxiliary(1),
            |t| self.apply_ket_vrr(t),
        )
    }
}

impl RecursionDriver<2> for TwoCenterRepulsionDriver {
    fn operator(&self) -> Operator {
        Operator::ElectronRepulsion
    }

    fn apply_recursion(&self, dist: &mut R2CDist) -> Result<()> {
        self.reduce_bra_vrr(dist)?;
        self.reduce_ket_vrr(dist)
    }
}

/// Adds `distance (..)^m` for each of `distances` and `transfer (..)^(m+1)`, where the second
/// is the W - P or W - Q displacement.
pub(crate) fn add_transfer<const N: usize>(
    dist: &mut Dist<N>,
    lowered: &Term<N>,
    distances: &[Factor],
    transfer: Factor,
) {
    for &distance in distances {
        dist.add(lowered.clone().with(distance, Fraction::one()));
    }
    if let Some(raised) = lowered.shift_order(1) {
        dist.add(raised.with(transfer, Fraction::one()));
    }
}

/// Adds the terms lowering a second index of an electron repulsion VRR:
///
///   n_i / (2 x) [(..n-1_i..)^m - rho / x (..n-1_i..)^(m+1)]  for the centers in `own`,
///   n_i / (2 (p + q)) (..n-1_i..)^(m+1)                      for the centers in `other`,
///
/// with `inverse` = 1 / x the reciprocal exponent of the recursing side.
pub(crate) fn add_repulsion_lowered<const N: usize>(
    dist: &mut Dist<N>,
    lowered: &Term<N>,
    axis: Axis,
    own: &[usize],
    inverse: Factor,
    other: &[usize],
) {
    add_lowered(dist, lowered, axis, own, &[inverse], 1);
    if let Some(raised) = lowered.shift_order(1) {
        add_lowered(dist, &raised, axis, own, &[Factor::rho(), inverse, inverse], -1);
        add_lowered(dist, &raised, axis, other, &[Factor::inv_pq()], 1);
    }
}

#[cfg(test)]
mod tests {
    use super::TwoCenterRepulsionDriver;
    use crate::{
        algebra::{Dist, Term},
        drivers::RecursionDriver,
        factor::Factor,
        integral::Integral,
        operator::{Operator, OperatorComponent},
        tensor::{Axis, TensorComponent},
    };

    fn eri(bra: TensorComponent, ket: TensorComponent, order: u32) -> Term<2> {
        Term::new(Integral::new(
            [bra, ket],
            OperatorComponent::new(Operator::ElectronRepulsion, TensorComponent::zero(), order),
        ))
    }

    #[test]
    fn d_s_bra_step() {
        let dxx = TensorComponent::new(2, 0, 0);
        let px = TensorComponent::unit(Axis::X);
        let s = TensorComponent::zero();

        let dist = TwoCenterRepulsionDriver
            .bra_vrr(&eri(dxx, s, 0), Axis::X)
            .unwrap();

        // WP (x|s)^1, 1/(2p) (s|s)^0, -rho/(2p^2) (s|s)^1
        assert_eq!(dist.len(), 3);
        assert_eq!(*dist.terms()[0].integral(), *eri(px, s, 1).integral());
        assert_eq!(
            dist.terms()[2].factor_powers(),
            vec![(Factor::inv_p(), 2), (Factor::rho(), 1)]
        );
    }

    #[test]
    fn p_p_couples_through_inverse_sum() {
        let px = TensorComponent::unit(Axis::X);
        let s = TensorComponent::zero();
        let mut dist = Dist::new(eri(px, px, 0));
        TwoCenterRepulsionDriver.apply_recursion(&mut dist).unwrap();
        dist.simplify();

        // WP_x WQ_x (s|s)^2 + 1/(2(p+q)) (s|s)^1
        assert_eq!(dist.len(), 2);
        assert!(dist.terms().iter().any(|t| {
            *t.integral() == *eri(s, s, 1).integral() && t.factors() == [Factor::inv_pq()]
        }));
    }
}
