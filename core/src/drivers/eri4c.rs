use crate::{
    algebra::{Dist, GraphDriver, R4CDist, R4CTerm},
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

/// Head-Gordon–Pople scheme for four-center electron repulsion integrals (ab|cd)^m [2].
///
/// Horizontal recursions move the angular momentum of B onto A and of D onto C; the vertical
/// recursions of [1] then build (a0|c0)^m from (00|00)^m. Applied flat, the stages run in that
/// order over whole distributions. Applied through a [`crate::algebra::Graph`], every vertex is
/// expanded by a single step of the first stage that applies to it.
#[derive(Copy, Clone, Debug, Default)]
pub struct FourCenterRepulsionDriver;

impl FourCenterRepulsionDriver {
    pub fn is_electron_repulsion(&self, term: &R4CTerm) -> bool {
        is_plain(term, Operator::ElectronRepulsion)
    }

    /// (a,b+1_i|cd) = (a+1_i,b|cd) + AB_i (ab|cd)
    pub fn bra_hrr(&self, term: &R4CTerm, axis: Axis) -> Option<R4CDist> {
        self.hrr(term, axis, 0, Factor::ab(axis))
    }

    /// (ab|c,d+1_i) = (ab|c+1_i,d) + CD_i (ab|cd)
    pub fn ket_hrr(&self, term: &R4CTerm, axis: Axis) -> Option<R4CDist> {
        self.hrr(term, axis, 2, Factor::cd(axis))
    }

    fn hrr(&self, term: &R4CTerm, axis: Axis, center: usize, distance: Factor) -> Option<R4CDist> {
        if !self.is_electron_repulsion(term) {
            return None;
        }

        let lowered = term.shift(axis, -1, center + 1)?;
        let mut dist = Dist::new(term.clone());
        dist.add(lowered.shift(axis, 1, center)?);
        dist.add(lowered.with(distance, Fraction::one()));
        Some(dist)
    }

    /// (a+1_i,0|c0)^m = PA_i (a0|c0)^m + WP_i (a0|c0)^(m+1)
    ///                + a_i / (2 p) [(a-1_i,0|c0)^m - rho / p (a-1_i,0|c0)^(m+1)]
    ///                + c_i / (2 (p + q)) (a0|c-1_i,0)^(m+1)
    pub fn bra_vrr(&self, term: &R4CTerm, axis: Axis) -> Option<R4CDist> {
        if !self.is_transferred(term) {
            return None;
        }

        let lowered = term.shift(axis, -1, 0)?;
        let mut dist = Dist::new(term.clone());
        add_transfer(&mut dist, &lowered, &[Factor::pa(axis)], Factor::wp(axis));
        add_repulsion_lowered(&mut dist, &lowered, axis, &[0], Factor::inv_p(), &[2]);
        Some(dist)
    }

    /// (a0|c+1_i,0)^m = QC_i (a0|c0)^m + WQ_i (a0|c0)^(m+1)
    ///                + c_i / (2 q) [(a0|c-1_i,0)^m - rho / q (a0|c-1_i,0)^(m+1)]
    ///                + a_i / (2 (p + q)) (a-1_i,0|c0)^(m+1)
    pub fn ket_vrr(&self, term: &R4CTerm, axis: Axis) -> Option<R4CDist> {
        if !self.is_transferred(term) {
            return None;
        }

        let lowered = term.shift(axis, -1, 2)?;
        let mut dist = Dist::new(term.clone());
        add_transfer(&mut dist, &lowered, &[Factor::qc(axis)], Factor::wq(axis));
        add_repulsion_lowered(&mut dist, &lowered, axis, &[2], Factor::inv_q(), &[0]);
        Some(dist)
    }

    /// Whether the horizontal recursions are done, i.e. the term is (a0|c0).
    fn is_transferred(&self, term: &R4CTerm) -> bool {
        self.is_electron_repulsion(term) && term.is_auxiliary(1) && term.is_auxiliary(3)
    }

    pub fn apply_bra_hrr(&self, term: &R4CTerm) -> Result<R4CDist> {
        self.apply(term, "electron repulsion bra HRR", |t, axis| self.bra_hrr(t, axis))
    }

    pub fn apply_ket_hrr(&self, term: &R4CTerm) -> Result<R4CDist> {
        self.apply(term, "electron repulsion ket HRR", |t, axis| self.ket_hrr(t, axis))
    }

    pub fn apply_bra_vrr(&self, term: &R4CTerm) -> Result<R4CDist> {
        self.apply(term, "electron repulsion bra VRR", |t, axis| self.bra_vrr(t, axis))
    }

    pub fn apply_ket_vrr(&self, term: &R4CTerm) -> Result<R4CDist> {
        self.apply(term, "electron repulsion ket VRR", |t, axis| self.ket_vrr(t, axis))
    }

    fn apply(
        &self,
        term: &R4CTerm,
        rule: &'static str,
        rewrite: impl Fn(&R4CTerm, Axis) -> Option<R4CDist>,
    ) -> Result<R4CDist> {
        if !self.is_electron_repulsion(term) {
            return Err(foreign("electron repulsion", term));
        }
        minimal_expansion(term, rule, rewrite)
    }

    pub fn reduce_bra_hrr(&self, dist: &mut R4CDist) -> Result<()> {
        fixed_point(
            dist,
            "electron repulsion bra HRR",
            |t| self.is_electron_repulsion(t) && !t.is_auxiliary(1),
            |t| self.apply_bra_hrr(t),
        )
    }

    pub fn reduce_ket_hrr(&self, dist: &mut R4CDist) -> Result<()> {
        fixed_point(
            dist,
            "electron repulsion ket HRR",
            |t| self.is_electron_repulsion(t) && !t.is_auxiliary(3),
            |t| self.apply_ket_hrr(t),
        )
    }

    pub fn reduce_bra_vrr(&self, dist: &mut R4CDist) -> Result<()> {
        fixed_point(
            dist,
            "electron repulsion bra VRR",
            |t| self.is_electron_repulsion(t) && !t.is_auxiliary(0),
            |t| self.apply_bra_vrr(t),
        )
    }

    pub fn reduce_ket_vrr(&self, dist: &mut R4CDist) -> Result<()> {
        fixed_point(
            dist,
            "electron repulsion ket VRR",
            |t| self.is_electron_repulsion(t) && !t.is_auxiliary(2),
            |t| self.apply_ket_vrr(t),
        )
    }
}

impl RecursionDriver<4> for FourCenterRepulsionDriver {
    fn operator(&self) -> Operator {
        Operator::ElectronRepulsion
    }

    fn apply_recursion(&self, dist: &mut R4CDist) -> Result<()> {
        self.reduce_bra_hrr(dist)?;
        self.reduce_ket_hrr(dist)?;
        self.reduce_bra_vrr(dist)?;
        self.reduce_ket_vrr(dist)
    }
}

impl GraphDriver<4> for FourCenterRepulsionDriver {
    fn step(&self, term: &R4CTerm) -> Result<Option<R4CDist>> {
        if !self.is_electron_repulsion(term) {
            return Err(foreign("electron repulsion", term));
        }

        let step = if !term.is_auxiliary(1) {
            self.apply_bra_hrr(term)?
        } else if !term.is_auxiliary(3) {
            self.apply_ket_hrr(term)?
        } else if !term.is_auxiliary(0) {
            self.apply_bra_vrr(term)?
        } else if !term.is_auxiliary(2) {
            self.apply_ket_vrr(term)?
        } else {
            return Ok(None);
        };
        Ok(Some(step))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::FourCenterRepulsionDriver;
    use crate::{
        algebra::{Graph, Group},
        drivers::{testing, RecursionDriver},
        integral::Integral,
        operator::{Operator, OperatorComponent},
        tensor::{tensor_components, TensorComponent},
    };

    fn shells(angular_momentum: [u32; 4], order: u32) -> Vec<Integral<4>> {
        let operator =
            OperatorComponent::new(Operator::ElectronRepulsion, TensorComponent::zero(), order);
        let mut integrals = Vec::new();
        for a in tensor_components(angular_momentum[0]) {
            for b in tensor_components(angular_momentum[1]) {
                for c in tensor_components(angular_momentum[2]) {
                    for d in tensor_components(angular_momentum[3]) {
                        integrals.push(Integral::new([a, b, c, d], operator));
                    }
                }
            }
        }
        integrals
    }

    #[test]
    fn flat_recursion_closes() {
        for angular_momentum in [[0, 0, 0, 0], [1, 0, 1, 0], [1, 1, 0, 0], [1, 1, 1, 1], [2, 1, 1, 0]]
        {
            let integrals = shells(angular_momentum, 0);
            let group = FourCenterRepulsionDriver
                .create_recursion(&integrals)
                .unwrap();
            assert_eq!(group.expansions(), integrals.len());
            testing::assert_closed(&group, &[Operator::ElectronRepulsion]);
        }
    }

    #[test]
    fn pp_pp_graph_has_one_vertex_per_signature() {
        let graph = Graph::build(
            Group::from_integrals(&shells([1, 1, 1, 1], 0)),
            &FourCenterRepulsionDriver,
        )
        .unwrap();
        assert!(graph.is_complete());

        let signatures = (0..graph.len())
            .map(|index| graph.signature(index).unwrap())
            .collect::<BTreeSet<_>>();
        assert_eq!(signatures.len(), graph.len());

        let ps_ds = shells([1, 0, 2, 0], 0)[0].shell();
        let vertex = graph.find(&ps_ds).unwrap();
        assert_eq!(graph.parents(vertex).len(), 2);

        let root = graph.find(&shells([1, 1, 1, 1], 0)[0].shell()).unwrap();
        assert_eq!(root, 0);
        assert!(graph.parents(root).is_empty());
    }

    #[test]
    fn graph_sort_emits_children_first() {
        let graph = Graph::build(
            Group::from_integrals(&shells([1, 0, 1, 1], 0)),
            &FourCenterRepulsionDriver,
        )
        .unwrap();

        let order = graph.sort(true).unwrap();
        let position = |vertex: usize| order.iter().position(|&v| v == vertex).unwrap();
        for vertex in 0..graph.len() {
            for &child in graph.children(vertex) {
                assert!(position(child) < position(vertex));
            }
        }
    }
}
