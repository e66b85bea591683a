use std::{collections::BTreeSet, fmt};

use crate::integral::Integral;

use super::{arena::TermArena, term::Term};

/// A recursion distribution: the root term and the terms it expands into.
///
/// A distribution starts out empty (no expansion attempted). The expansion, resummed with
/// its factors substituted, equals the root under the recursion relation that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct Dist<const N: usize> {
    root: Term<N>,
    expansion: Option<Vec<Term<N>>>,
}

pub type R2CDist = Dist<2>;
pub type R3CDist = Dist<3>;
pub type R4CDist = Dist<4>;

impl<const N: usize> Dist<N> {
    pub fn new(root: Term<N>) -> Self {
        Self {
            root,
            expansion: None,
        }
    }

    /// A distribution rooted at the unit term of `integral`.
    pub fn from_integral(integral: Integral<N>) -> Self {
        Self::new(Term::new(integral))
    }

    pub fn root(&self) -> &Term<N> {
        &self.root
    }

    /// Expansion terms, empty if no expansion was attempted.
    pub fn terms(&self) -> &[Term<N>] {
        self.expansion.as_deref().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.terms().len()
    }

    /// Whether no expansion has been attempted yet.
    pub fn is_empty(&self) -> bool {
        self.expansion.is_none()
    }

    pub fn add(&mut self, term: Term<N>) {
        self.expansion.get_or_insert_with(Vec::new).push(term);
    }

    /// Replaces the expansion. An empty vector marks the distribution as expanded to nothing.
    pub fn set_expansion(&mut self, terms: Vec<Term<N>>) {
        self.expansion = Some(terms);
    }

    /// Terms a further recursion starts from: the expansion, or the root itself if no
    /// expansion was attempted yet. Leaves the distribution empty.
    pub(crate) fn take_terms(&mut self) -> Vec<Term<N>> {
        match self.expansion.take() {
            Some(terms) => terms,
            None => vec![self.root.clone()],
        }
    }

    pub fn into_terms(self) -> Vec<Term<N>> {
        self.expansion.unwrap_or_default()
    }

    /// Merges terms with identical integral and factors, dropping exact zeros. The first
    /// occurrence of a term fixes its position.
    pub fn simplify(&mut self) {
        if let Some(terms) = self.expansion.take() {
            self.expansion = Some(terms.into_iter().collect::<TermArena<N>>().drain());
        }
    }

    /// Whether the root and all expansion terms need no recursion on `center`.
    pub fn is_auxiliary(&self, center: usize) -> bool {
        self.root.is_auxiliary(center) && self.terms().iter().all(|t| t.is_auxiliary(center))
    }

    /// Distinct integrals referenced by the expansion.
    pub fn integrals(&self) -> BTreeSet<Integral<N>> {
        self.terms().iter().map(|t| *t.integral()).collect()
    }
}

impl<const N: usize> fmt::Display for Dist<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} =", self.root.integral())?;
        for term in self.terms() {
            writeln!(f, "    {term}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Dist;
    use crate::{
        algebra::term::Term,
        factor::Factor,
        fraction::Fraction,
        integral::Integral,
        operator::{Operator, OperatorComponent},
        tensor::{Axis, TensorComponent},
    };

    fn unit(bra: TensorComponent) -> Term<2> {
        Term::new(Integral::new(
            [bra, TensorComponent::zero()],
            OperatorComponent::scalar(Operator::Overlap),
        ))
    }

    #[test]
    fn exact_cancellation_removes_terms() {
        let s = unit(TensorComponent::zero());
        let mut dist = Dist::new(unit(TensorComponent::unit(Axis::X)));

        dist.add(s.clone().with(Factor::inv_eta(), Fraction::new(1, 2)));
        dist.add(s.with(Factor::inv_eta(), Fraction::new(-1, 2)));
        dist.simplify();

        assert!(!dist.is_empty());
        assert_eq!(dist.len(), 0);
    }

    #[test]
    fn simplify_is_idempotent_and_stable() {
        let s = unit(TensorComponent::zero());
        let p = unit(TensorComponent::unit(Axis::Y));
        let mut dist = Dist::new(unit(TensorComponent::new(0, 2, 0)));

        dist.add(p.clone().with(Factor::pa(Axis::Y), Fraction::one()));
        dist.add(s.clone().with(Factor::inv_eta(), Fraction::new(1, 2)));
        dist.add(p.clone().with(Factor::pa(Axis::Y), Fraction::new(2, 3)));
        dist.add(s.clone().with(Factor::inv_eta(), Fraction::new(1, 2)));
        dist.add(p.with(Factor::pb(Axis::Y), Fraction::one()));
        dist.simplify();

        assert_eq!(dist.len(), 3);
        assert_eq!(dist.terms()[0].prefactor(), Fraction::new(5, 3));
        assert_eq!(dist.terms()[1].prefactor(), Fraction::one());
        assert_eq!(dist.terms()[2].factors(), &[Factor::pb(Axis::Y)]);

        let once = dist.clone();
        dist.simplify();
        assert_eq!(dist, once);
    }

    #[test]
    fn auxiliary_checks_root_and_expansion() {
        let mut dist = Dist::new(unit(TensorComponent::zero()));
        assert!(dist.is_auxiliary(0));

        dist.add(unit(TensorComponent::unit(Axis::Z)));
        assert!(!dist.is_auxiliary(0));
        assert!(dist.is_auxiliary(1));
    }
}
