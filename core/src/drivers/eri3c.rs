use crate::{
    algebra::{Dist, GraphDriver, R3CDist, R3CTerm},
    error::Result,
    factor::Factor,
    fraction::Fraction,
    operator::Operator,
    tensor::Axis,
};

use super::{
    eri2c::{add_repulsion_lowered, add_transfer},
    fixed_point, foreign, is_plain, minimal_expansion, RecursionDriver,
};

/// Recursion for three-center electron repulsion integrals (a|cd)^m.
///
/// The ket is transferred to (a|c0) with the horizontal recursion of [2], then the vertical
/// recursion builds the bra and the ket from (0|00)^m.
#[derive(Copy, Clone, Debug, Default)]
pub struct ThreeCenterRepulsionDriver;

impl ThreeCenterRepulsionDriver {
    pub fn is_electron_repulsion(&self, term: &R3CTerm) -> bool {
        is_plain(term, Operator::ElectronRepulsion)
    }

    /// (a|c,d+1_i) = (a|c+1_i,d) + CD_i (a|cd)
    pub fn ket_hrr(&self, term: &R3CTerm, axis: Axis) -> Option<R3CDist> {
        if !self.is_electron_repulsion(term) {
            return None;
        }

        let lowered = term.shift(axis, -1, 2)?;
        let mut dist = Dist::new(term.clone());
        dist.add(lowered.shift(axis, 1, 1)?);
        dist.add(lowered.with(Factor::cd(axis), Fraction::one()));
        Some(dist)
    }

    /// (a+1_i|c0)^m = WP_i (a|c0)^(m+1) + a_i / (2 p) [(a-1_i|c0)^m - rho / p (a-1_i|c0)^(m+1)]
    ///              + c_i / (2 (p + q)) (a|c-1_i,0)^(m+1)
    pub fn bra_vrr(&self, term: &R3CTerm, axis: Axis) -> Option<R3CDist> {
        if !self.is_electron_repulsion(term) || !term.is_auxiliary(2) {
            return None;
        }

        let lowered = term.shift(axis, -1, 0)?;
        let mut dist = Dist::new(term.clone());
        add_transfer(&mut dist, &lowered, &[], Factor::wp(axis));
        add_repulsion_lowered(&mut dist, &lowered, axis, &[0], Factor::inv_p(), &[1]);
        Some(dist)
    }

    /// (a|c+1_i,0)^m = QC_i (a|c0)^m + WQ_i (a|c0)^(m+1)
    ///               + c_i / (2 q) [(a|c-1_i,0)^m - rho / q (a|c-1_i,0)^(m+1)]
    ///               + a_i / (2 (p + q)) (a-1_i|c0)^(m+1)
    pub fn ket_vrr(&self, term: &R3CTerm, axis: Axis) -> Option<R3CDist> {
        if !self.is_electron_repulsion(term) || !term.is_auxiliary(2) {
            return None;
        }

        let lowered = term.shift(axis, -1, 1)?;
        let mut dist = Dist::new(term.clone());
        add_transfer(&mut dist, &lowered, &[Factor::qc(axis)], Factor::wq(axis));
        add_repulsion_lowered(&mut dist, &lowered, axis, &[1], Factor::inv_q(), &[0]);
        Some(dist)
    }

    pub fn apply_ket_hrr(&self, term: &R3CTerm) -> Result<R3CDist> {
        if !self.is_electron_repulsion(term) {
            return Err(foreign("electron repulsion", term));
        }
        minimal_expansion(term, "electron repulsion ket HRR", |t, axis| {
            self.ket_hrr(t, axis)
        })
    }

    pub fn apply_bra_vrr(&self, term: &R3CTerm) -> Result<R3CDist> {
        if !self.is_electron_repulsion(term) {
            return Err(foreign("electron repulsion", term));
        }
        minimal_expansion(term, "electron repulsion bra VRR", |t, axis| {
            self.bra_vrr(t, axis)
        })
    }

    pub fn apply_ket_vrr(&self, term: &R3CTerm) -> Result<R3CDist> {
        if !self.is_electron_repulsion(term) {
            return Err(foreign("electron repulsion", term));
        }
        minimal_expansion(term, "electron repulsion ket VRR", |t, axis| {
            self.ket_vrr(t, axis)
        })
    }

    pub fn reduce_ket_hrr(&self, dist: &mut R3CDist) -> Result<()> {
        fixed_point(
            dist,
            "electron repulsion ket HRR",
            |t| self.is_electron_repulsion(t) && !t.is_auxiliary(2),
            |t| self.apply_ket_hrr(t),
        )
    }

    pub fn reduce_bra_vrr(&self, dist: &mut R3CDist) -> Result<()> {
        fixed_point(
            dist,
            "electron repulsion bra VRR",
            |t| self.is_electron_repulsion(t) && !t.is_auxiliary(0),
            |t| self.apply_bra_vrr(t),
        )
    }

    pub fn reduce_ket_vrr(&self, dist: &mut R3CDist) -> Result<()> {
        fixed_point(
            dist,
            "electron repulsion ket VRR",
            |t| self.is_electron_repulsion(t) && !t.is_auxiliary(1),
            |t| self.apply_ket_vrr(t),
        )
    }
}

impl RecursionDriver<3> for ThreeCenterRepulsionDriver {
    fn operator(&self) -> Operator {
        Operator::ElectronRepulsion
    }

    fn apply_recursion(&self, dist: &mut R3CDist) -> Result<()> {
        self.reduce_ket_hrr(dist)?;
        self.reduce_bra_vrr(dist)?;
        self.reduce_ket_vrr(dist)
    }
}

impl GraphDriver<3> for ThreeCenterRepulsionDriver {
    fn step(&self, term: &R3CTerm) -> Result<Option<R3CDist>> {
        if !self.is_electron_repulsion(term) {
            return Err(foreign("electron repulsion", term));
        }

        let step = if !term.is_auxiliary(2) {
            self.apply_ket_hrr(term)?
        } else if !term.is_auxiliary(0) {
            self.apply_bra_vrr(term)?
        } else if !term.is_auxiliary(1) {
            self.apply_ket_vrr(term)?
        } else {
            return Ok(None);
        };
        Ok(Some(step))
    }
}

#[cfg(test)]
mod tests {
    use super::ThreeCenterRepulsionDriver;
    use crate::{
        algebra::{Graph, Group},
        drivers::{testing, RecursionDriver},
        integral::Integral,
        operator::{Operator, OperatorComponent},
        tensor::tensor_components,
    };

    fn shells(a: u32, c: u32, d: u32) -> Vec<Integral<3>> {
        let operator = OperatorComponent::scalar(Operator::ElectronRepulsion);
        let mut integrals = Vec::new();
        for ta in tensor_components(a) {
            for tc in tensor_components(c) {
                for td in tensor_components(d) {
                    integrals.push(Integral::new([ta, tc, td], operator));
                }
            }
        }
        integrals
    }

    #[test]
    fn flat_recursion_closes() {
        for (a, c, d) in [(0, 0, 0), (1, 0, 1), (2, 1, 1), (1, 2, 2), (3, 1, 0)] {
            let integrals = shells(a, c, d);
            let group = ThreeCenterRepulsionDriver
                .create_recursion(&integrals)
                .unwrap();
            testing::assert_closed(&group, &[Operator::ElectronRepulsion]);
        }
    }

    #[test]
    fn graph_reaches_the_boys_leaves() {
        let graph = Graph::build(
            Group::from_integrals(&shells(1, 1, 1)),
            &ThreeCenterRepulsionDriver,
        )
        .unwrap();

        assert!(graph.is_complete());
        let leaves = (0..graph.len())
            .filter(|&index| graph.children(index).is_empty())
            .collect::<Vec<_>>();
        for leaf in leaves {
            let signature = graph.signature(leaf).unwrap();
            assert_eq!(signature.angular_momentum(), [0, 0, 0]);
        }
        // (P|PP) -> (P|DS), (P|PS) -> ... -> (S|SS)^0..3
        assert!(graph.len() > 4);
    }
}
