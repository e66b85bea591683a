//! Recursion drivers, one per operator family.
//!
//! Every driver follows the same pattern:
//!   - `is_<family>` tells whether a term belongs to the driver,
//!   - `<side>_vrr(term, axis)` attempts one literature rewrite along one axis,
//!   - `apply_<side>_vrr(term)` keeps the axis yielding the fewest terms,
//!   - `reduce_<side>_vrr(dist)` rewrites a distribution until every term of the family is a
//!     base case on that side, passing terms of other families through untouched.
//!
//! References:
//!
//! [1] Obara, S.; Saika, A. J. Chem. Phys. 84, 3963 (1986).
//! [2] Head-Gordon, M.; Pople, J. A. J. Chem. Phys. 89, 5777 (1988).
//! [3] Helgaker, T.; Jørgensen, P.; Olsen, J. Molecular Electronic-Structure Theory, ch. 9.
pub mod ecp_local;
pub mod ecp_projected;
pub mod electric_field;
pub mod eri2c;
pub mod eri3c;
pub mod eri4c;
pub mod geometric;
pub mod kinetic;
pub mod momentum;
pub mod multipole;
pub mod nuclear;
pub mod overlap;

pub use ecp_local::LocalEcpDriver;
pub use ecp_projected::ProjectedEcpDriver;
pub use electric_field::ElectricFieldDriver;
pub use eri2c::TwoCenterRepulsionDriver;
pub use eri3c::ThreeCenterRepulsionDriver;
pub use eri4c::FourCenterRepulsionDriver;
pub use geometric::GeometricDriver;
pub use kinetic::KineticEnergyDriver;
pub use momentum::LinearMomentumDriver;
pub use multipole::MultipoleDriver;
pub use nuclear::NuclearPotentialDriver;
pub use overlap::OverlapDriver;

use crate::{
    algebra::{arena::TermArena, Dist, Group, Term},
    error::{Error, Result},
    factor::Factor,
    fraction::Fraction,
    integral::Integral,
    operator::Operator,
    tensor::Axis,
};

/// A complete recursion for one operator family over `N`-center integrals.
pub trait RecursionDriver<const N: usize> {
    /// The operator family of the integrals this driver expands.
    fn operator(&self) -> Operator;

    /// Rewrites a distribution until all of its terms are base cases.
    fn apply_recursion(&self, dist: &mut Dist<N>) -> Result<()>;

    /// Builds one fully reduced and simplified distribution per integral.
    fn create_recursion(&self, integrals: &[Integral<N>]) -> Result<Group<N>> {
        check_family(self.operator(), integrals)?;

        let mut group = Group::from_integrals(integrals);
        for dist in group.iter_mut() {
            self.apply_recursion(dist)?;
            dist.simplify();
        }

        log::debug!(
            "{} recursion: {} distributions, {} terms",
            self.operator(),
            group.expansions(),
            group.terms()
        );
        Ok(group)
    }
}

impl<const N: usize, D: RecursionDriver<N> + ?Sized> RecursionDriver<N> for Box<D> {
    fn operator(&self) -> Operator {
        (**self).operator()
    }

    fn apply_recursion(&self, dist: &mut Dist<N>) -> Result<()> {
        (**self).apply_recursion(dist)
    }
}

/// Looks up the two-center recursion of an operator family.
pub fn two_center_driver(operator: Operator) -> Result<Box<dyn RecursionDriver<2>>> {
    let driver: Box<dyn RecursionDriver<2>> = match operator {
        Operator::Overlap => Box::new(OverlapDriver),
        Operator::KineticEnergy => Box::new(KineticEnergyDriver),
        Operator::NuclearPotential => Box::new(NuclearPotentialDriver),
        Operator::ElectricField => Box::new(ElectricFieldDriver),
        Operator::Multipole => Box::new(MultipoleDriver),
        Operator::LinearMomentum => Box::new(LinearMomentumDriver),
        Operator::ElectronRepulsion => Box::new(TwoCenterRepulsionDriver),
        Operator::LocalEcp => Box::new(LocalEcpDriver),
        Operator::ProjectedEcp => Box::new(ProjectedEcpDriver),
    };
    Ok(driver)
}

/// Looks up the three-center recursion of an operator family.
pub fn three_center_driver(operator: Operator) -> Result<ThreeCenterRepulsionDriver> {
    match operator {
        Operator::ElectronRepulsion => Ok(ThreeCenterRepulsionDriver),
        operator => Err(Error::UnsupportedFamily {
            operator,
            centers: 3,
        }),
    }
}

/// Looks up the four-center recursion of an operator family.
pub fn four_center_driver(operator: Operator) -> Result<FourCenterRepulsionDriver> {
    match operator {
        Operator::ElectronRepulsion => Ok(FourCenterRepulsionDriver),
        operator => Err(Error::UnsupportedFamily {
            operator,
            centers: 4,
        }),
    }
}

/// Rejects batches mixing operator families.
pub(crate) fn check_family<const N: usize>(
    expected: Operator,
    integrals: &[Integral<N>],
) -> Result<()> {
    match integrals
        .iter()
        .map(|integral| integral.operator().operator())
        .find(|&operator| operator != expected)
    {
        Some(found) => Err(Error::MixedFamilies { expected, found }),
        None => Ok(()),
    }
}

/// Whether a term has the given operator and carries no geometric derivative.
pub(crate) fn is_plain<const N: usize>(term: &Term<N>, operator: Operator) -> bool {
    let integral = term.integral();
    integral.operator().operator() == operator && integral.prefixes().is_none()
}

pub(crate) fn foreign<const N: usize>(driver: &'static str, term: &Term<N>) -> Error {
    Error::ForeignTerm {
        driver,
        integral: term.integral().to_string(),
    }
}

/// Tries a single-axis rewrite along x, y and z and keeps the one with the fewest terms; ties
/// go to the first axis. Finding no valid axis is a defect in the caller's classification.
pub(crate) fn minimal_expansion<const N: usize>(
    term: &Term<N>,
    rule: &'static str,
    rewrite: impl Fn(&Term<N>, Axis) -> Option<Dist<N>>,
) -> Result<Dist<N>> {
    Axis::ALL
        .into_iter()
        .filter_map(|axis| rewrite(term, axis))
        .min_by_key(Dist::len)
        .ok_or_else(|| Error::NoRewrite {
            rule,
            integral: term.integral().to_string(),
        })
}

/// Rewrites `dist` until no term satisfies `pending`.
///
/// Works in waves over a term arena: equal pending terms are merged before they are rewritten,
/// so every distinct intermediate is expanded once per wave. Terms that are not pending (base
/// cases or terms of other families) are collected unchanged.
pub(crate) fn fixed_point<const N: usize>(
    dist: &mut Dist<N>,
    rule: &'static str,
    pending: impl Fn(&Term<N>) -> bool,
    rewrite: impl Fn(&Term<N>) -> Result<Dist<N>>,
) -> Result<()> {
    let mut done = TermArena::default();
    let mut queue = TermArena::default();

    for term in dist.take_terms() {
        if pending(&term) {
            queue.insert(term);
        } else {
            done.insert(term);
        }
    }

    let mut waves = 0;
    while !queue.is_empty() {
        waves += 1;
        for term in queue.drain() {
            let step = rewrite(&term)?;
            log::trace!("{rule}: {term} -> {} terms", step.len());

            for child in step.into_terms() {
                if pending(&child) {
                    queue.insert(child);
                } else {
                    done.insert(child);
                }
            }
        }
    }

    dist.set_expansion(done.drain());
    if waves > 0 {
        log::trace!(
            "{rule}: {} reduced in {waves} waves to {} terms",
            dist.root().integral(),
            dist.len()
        );
    }
    Ok(())
}

/// Adds the `n_i / 2 * factor * (..-1_i..)` terms for each of `centers`, where `n_i` is the
/// component of `lowered` along `axis` on that center. Used by every Obara–Saika vertical
/// recursion for the terms that lower a second angular momentum index.
pub(crate) fn add_lowered<const N: usize>(
    dist: &mut Dist<N>,
    lowered: &Term<N>,
    axis: Axis,
    centers: &[usize],
    factors: &[Factor],
    sign: i64,
) {
    for &center in centers {
        if let Some(term) = lowered.shift(axis, -1, center) {
            let n = lowered.component(center, axis) as i64;
            dist.add(with_factors(term, factors, Fraction::new(sign * n, 2)));
        }
    }
}

/// Applies `f` to every expansion term, starting from the root if nothing was expanded yet.
pub(crate) fn map_terms<const N: usize>(dist: &mut Dist<N>, f: impl Fn(Term<N>) -> Term<N>) {
    let terms = dist.take_terms().into_iter().map(f).collect();
    dist.set_expansion(terms);
}

/// Multiplies a term by a product of factors and a fraction.
pub(crate) fn with_factors<const N: usize>(
    mut term: Term<N>,
    factors: &[Factor],
    fraction: Fraction,
) -> Term<N> {
    for &factor in factors {
        term.add(factor, Fraction::one());
    }
    term.scale(fraction);
    term
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers shared by the driver tests.
    use std::collections::BTreeMap;

    use super::RecursionDriver;
    use crate::{
        algebra::{Dist, Group, Term},
        factor::Factor,
        fraction::Fraction,
        integral::Integral,
        operator::{Operator, OperatorComponent},
        tensor::{tensor_components, Axis, TensorComponent},
    };

    /// All components of a two-center shell pair.
    pub(crate) fn two_center(
        operator: OperatorComponent,
        bra: u32,
        ket: u32,
    ) -> Vec<Integral<2>> {
        let mut integrals = Vec::new();
        for a in tensor_components(bra) {
            for b in tensor_components(ket) {
                integrals.push(Integral::new([a, b], operator));
            }
        }
        integrals
    }

    /// All components of a two-center shell pair, for every component of the operator shape.
    pub(crate) fn two_center_tensorial(
        operator: Operator,
        operator_order: u32,
        bra: u32,
        ket: u32,
    ) -> Vec<Integral<2>> {
        tensor_components(operator_order)
            .into_iter()
            .flat_map(|shape| two_center(OperatorComponent::new(operator, shape, 0), bra, ket))
            .collect()
    }

    /// Takes the first step of `integral` along every axis `step` accepts, reduces each result
    /// with `driver` and asserts that all of them simplify to the same expansion.
    pub(crate) fn assert_axis_independent(
        driver: &impl RecursionDriver<2>,
        integral: Integral<2>,
        step: impl Fn(&Term<2>, Axis) -> Option<Dist<2>>,
    ) {
        let root = Term::new(integral);
        let expansions = Axis::ALL
            .into_iter()
            .filter_map(|axis| step(&root, axis).map(|dist| (axis, dist)))
            .map(|(axis, mut dist)| {
                driver.apply_recursion(&mut dist).unwrap();
                (axis, collect_terms(&dist))
            })
            .collect::<Vec<_>>();

        assert!(expansions.len() > 1, "{integral} admits a single axis");
        let (first_axis, first) = &expansions[0];
        for (axis, expansion) in &expansions[1..] {
            assert_eq!(
                expansion, first,
                "{integral}: starting along {axis:?} differs from {first_axis:?}"
            );
        }
    }

    /// Prefactors summed per integral and factor powers, zeros dropped.
    fn collect_terms(dist: &Dist<2>) -> BTreeMap<(Integral<2>, Vec<(Factor, u32)>), Fraction> {
        let mut terms = BTreeMap::new();
        for term in dist.terms() {
            let prefactor = terms
                .entry((*term.integral(), term.factor_powers()))
                .or_insert_with(Fraction::zero);
            *prefactor = *prefactor + term.prefactor();
        }
        terms.retain(|_, prefactor| !prefactor.is_zero());
        terms
    }

    /// Asserts every term of every distribution is a base case on all centers and uses one
    /// of the allowed operators.
    pub(crate) fn assert_closed<const N: usize>(group: &Group<N>, allowed: &[Operator]) {
        for dist in group {
            assert!(!dist.is_empty(), "{} was not expanded", dist.root().integral());
            for term in dist.terms() {
                let integral = term.integral();
                for center in 0..N {
                    assert!(
                        integral.is_auxiliary(center),
                        "{integral} is not a base case in the expansion of {}",
                        dist.root().integral()
                    );
                }
                assert!(
                    allowed.contains(&integral.operator().operator()),
                    "unexpected operator in {integral}"
                );
                assert_eq!(integral.operator().shape(), TensorComponent::zero());
                assert!(!term.prefactor().is_zero());
            }
        }
    }
}
