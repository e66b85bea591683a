use std::{
    collections::{BTreeMap, BTreeSet},
    ops::Index,
};

use crate::{
    factor::Factor,
    integral::{Integral, ShellIntegral},
};

use super::dist::Dist;

/// A group of distributions, one per requested integral component.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Group<const N: usize> {
    dists: Vec<Dist<N>>,
}

pub type R2Group = Group<2>;
pub type R3Group = Group<3>;
pub type R4Group = Group<4>;

impl<const N: usize> Group<N> {
    pub fn new() -> Self {
        Self { dists: Vec::new() }
    }

    /// One empty distribution per integral.
    pub fn from_integrals(integrals: &[Integral<N>]) -> Self {
        Self {
            dists: integrals.iter().copied().map(Dist::from_integral).collect(),
        }
    }

    pub fn add(&mut self, dist: Dist<N>) {
        self.dists.push(dist);
    }

    /// Number of distributions.
    pub fn expansions(&self) -> usize {
        self.dists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dists.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Dist<N>> {
        self.dists.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Dist<N>> {
        self.dists.iter_mut()
    }

    pub fn simplify(&mut self) {
        self.dists.iter_mut().for_each(Dist::simplify);
    }

    pub fn is_auxiliary(&self, center: usize) -> bool {
        self.dists.iter().all(|dist| dist.is_auxiliary(center))
    }

    /// Whether any distribution still awaits its expansion.
    pub fn has_empty(&self) -> bool {
        self.dists.iter().any(Dist::is_empty)
    }

    /// Root integrals in group order.
    pub fn roots(&self) -> impl Iterator<Item = &Integral<N>> {
        self.dists.iter().map(|dist| dist.root().integral())
    }

    /// Whether a distribution with this root integral is present.
    pub fn contains(&self, integral: &Integral<N>) -> bool {
        self.roots().any(|root| root == integral)
    }

    /// Total number of expansion terms across all distributions.
    pub fn terms(&self) -> usize {
        self.dists.iter().map(Dist::len).sum()
    }

    /// Partitions the integrals referenced by all expansions by shell signature, so that each
    /// distinct sub-integral is visited once.
    pub fn split_terms(&self) -> BTreeMap<ShellIntegral<N>, BTreeSet<Integral<N>>> {
        let mut split = BTreeMap::<_, BTreeSet<_>>::new();
        for dist in &self.dists {
            for term in dist.terms() {
                split
                    .entry(term.integral().shell())
                    .or_default()
                    .insert(*term.integral());
            }
        }
        split
    }

    /// Every distinct factor referenced by the expansions.
    pub fn factors(&self) -> BTreeSet<Factor> {
        self.dists
            .iter()
            .flat_map(Dist::terms)
            .flat_map(|term| term.factors().iter().copied())
            .collect()
    }

    /// Whether generated code needs the given factor, e.g. an A - B distance.
    pub fn needs_distances(&self, factor: Factor) -> bool {
        self.factors().contains(&factor)
    }

    pub(crate) fn into_dists(self) -> Vec<Dist<N>> {
        self.dists
    }
}

impl<const N: usize> Index<usize> for Group<N> {
    type Output = Dist<N>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.dists[index]
    }
}

impl<'a, const N: usize> IntoIterator for &'a Group<N> {
    type Item = &'a Dist<N>;
    type IntoIter = std::slice::Iter<'a, Dist<N>>;

    fn into_iter(self) -> Self::IntoIter {
        self.dists.iter()
    }
}

impl<const N: usize> FromIterator<Dist<N>> for Group<N> {
    fn from_iter<I: IntoIterator<Item = Dist<N>>>(iter: I) -> Self {
        Self {
            dists: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Group;
    use crate::{
        algebra::term::Term,
        factor::Factor,
        fraction::Fraction,
        integral::Integral,
        operator::{Operator, OperatorComponent},
        tensor::{Axis, TensorComponent},
    };

    fn eri(a: TensorComponent, c: TensorComponent, order: u32) -> Integral<4> {
        Integral::new(
            [a, TensorComponent::zero(), c, TensorComponent::zero()],
            OperatorComponent::new(Operator::ElectronRepulsion, TensorComponent::zero(), order),
        )
    }

    #[test]
    fn split_terms_groups_by_shell() {
        let px = TensorComponent::unit(Axis::X);
        let py = TensorComponent::unit(Axis::Y);
        let s = TensorComponent::zero();

        let mut group = Group::from_integrals(&[eri(px, px, 0), eri(py, px, 0)]);
        for dist in group.iter_mut() {
            dist.add(Term::new(eri(s, px, 0)).with(Factor::pa(Axis::X), Fraction::one()));
            dist.add(Term::new(eri(s, px, 1)).with(Factor::wp(Axis::X), Fraction::one()));
            dist.add(Term::new(eri(s, s, 1)).with(Factor::inv_pq(), Fraction::new(1, 2)));
        }

        let split = group.split_terms();
        assert_eq!(split.len(), 3);
        assert!(split.values().all(|integrals| integrals.len() == 1));
        assert!(group.needs_distances(Factor::wp(Axis::X)));
        assert!(!group.needs_distances(Factor::ab(Axis::X)));
        assert_eq!(group.expansions(), 2);
        assert_eq!(group.terms(), 6);
    }
}
