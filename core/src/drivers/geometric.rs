use crate::{
    algebra::{Dist, GraphDriver, Term},
    error::Result,
    fraction::Fraction,
    integral::Integral,
    operator::Operator,
    tensor::Axis,
};

use super::{fixed_point, foreign, map_terms, minimal_expansion, RecursionDriver};

/// Geometric derivatives with respect to the centers of the Gaussians.
///
/// Differentiating a Cartesian Gaussian on center K gives
///
///   d/dK_i G_k = 2 k_exp G_(k+1_i) - k_i G_(k-1_i),
///
/// so derivatives are traded for angular momentum one order at a time. Once no derivative is
/// left, the wrapped driver takes over.
#[derive(Copy, Clone, Debug, Default)]
pub struct GeometricDriver<D> {
    inner: D,
}

impl<D> GeometricDriver<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    /// Whether a term still carries a derivative of nonzero order.
    pub fn is_geometric<const N: usize>(&self, term: &Term<N>) -> bool {
        term.integral()
            .prefixes()
            .orders()
            .is_some_and(|orders| orders.iter().any(|&order| order > 0))
    }

    /// One derivative step along `axis` on `center`.
    pub fn derivative_vrr<const N: usize>(
        &self,
        term: &Term<N>,
        center: usize,
        axis: Axis,
    ) -> Option<Dist<N>> {
        let lowered = term.shift_prefix(axis, -1, center, true)?;
        let mut dist = Dist::new(term.clone());

        dist.add(
            lowered
                .shift(axis, 1, center)?
                .with(Integral::<N>::exponent(center), Fraction::from(2)),
        );
        if let Some(below) = lowered.shift(axis, -1, center) {
            let k = i64::from(lowered.component(center, axis));
            dist.add(below.scaled(Fraction::from(-k)));
        }
        Some(dist)
    }

    /// Steps the derivative on the first differentiated center.
    pub fn apply_derivative_vrr<const N: usize>(&self, term: &Term<N>) -> Result<Dist<N>> {
        let prefixes = term.integral().prefixes();
        let Some(center) = (0..N).find(|&center| prefixes.order(center) > 0) else {
            return Err(foreign("geometric derivative", term));
        };
        minimal_expansion(term, "geometric derivative", |t, axis| {
            self.derivative_vrr(t, center, axis)
        })
    }

    pub fn reduce_derivative_vrr<const N: usize>(&self, dist: &mut Dist<N>) -> Result<()> {
        map_terms(dist, clear_exhausted);
        fixed_point(
            dist,
            "geometric derivative",
            |t| self.is_geometric(t),
            |t| self.apply_derivative_vrr(t),
        )
    }
}

/// Drops a derivative whose orders are all zero.
fn clear_exhausted<const N: usize>(term: Term<N>) -> Term<N> {
    term.shift_prefix(Axis::X, 0, 0, true).unwrap_or(term)
}

impl<const N: usize, D: RecursionDriver<N>> RecursionDriver<N> for GeometricDriver<D> {
    fn operator(&self) -> Operator {
        self.inner.operator()
    }

    fn apply_recursion(&self, dist: &mut Dist<N>) -> Result<()> {
        self.reduce_derivative_vrr(dist)?;
        self.inner.apply_recursion(dist)
    }
}

impl<const N: usize, D: GraphDriver<N>> GraphDriver<N> for GeometricDriver<D> {
    fn step(&self, term: &Term<N>) -> Result<Option<Dist<N>>> {
        if self.is_geometric(term) {
            Ok(Some(self.apply_derivative_vrr(term)?))
        } else {
            self.inner.step(&clear_exhausted(term.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::GeometricDriver;
    use crate::{
        algebra::{Dist, Graph, Group, Term},
        drivers::{testing, FourCenterRepulsionDriver, OverlapDriver, RecursionDriver},
        factor::Factor,
        fraction::Fraction,
        integral::{Integral, Prefixes},
        operator::{Operator, OperatorComponent},
        tensor::{tensor_components, Axis, TensorComponent},
    };

    #[test]
    fn derivative_of_s_overlap() {
        let s = TensorComponent::zero();
        let integral = Integral::new([s, s], OperatorComponent::scalar(Operator::Overlap))
            .with_prefixes(Prefixes::Geometric([TensorComponent::unit(Axis::X), s]));

        let driver = GeometricDriver::new(OverlapDriver);
        let mut dist = Dist::from_integral(integral);
        driver.apply_recursion(&mut dist).unwrap();

        // d/dA_x (s|s) = 2 a (x|s) = 2 a PA_x (s|s)
        let expected = Term::new(Integral::new(
            [s, s],
            OperatorComponent::scalar(Operator::Overlap),
        ))
        .with(Factor::exponent(0), Fraction::from(2))
        .with(Factor::pa(Axis::X), Fraction::one());
        assert_eq!(dist.terms(), &[expected]);
    }

    #[test]
    fn first_derivatives_of_p_p_overlap_close() {
        let mut integrals = Vec::new();
        for derivative in tensor_components(1) {
            let prefixes = Prefixes::Geometric([derivative, TensorComponent::zero()]);
            integrals.extend(
                testing::two_center(OperatorComponent::scalar(Operator::Overlap), 1, 1)
                    .into_iter()
                    .map(|integral| integral.with_prefixes(prefixes)),
            );
        }

        let group = GeometricDriver::new(OverlapDriver)
            .create_recursion(&integrals)
            .unwrap();
        testing::assert_closed(&group, &[Operator::Overlap]);
    }

    #[test]
    fn differentiated_repulsion_graph_completes() {
        let s = TensorComponent::zero();
        let integral = Integral::new(
            [s, s, s, s],
            OperatorComponent::scalar(Operator::ElectronRepulsion),
        )
        .with_prefixes(Prefixes::Geometric([
            TensorComponent::unit(Axis::Y),
            s,
            s,
            s,
        ]));

        let graph = Graph::build(
            Group::from_integrals(&[integral]),
            &GeometricDriver::new(FourCenterRepulsionDriver),
        )
        .unwrap();

        assert!(graph.is_complete());
        for index in 0..graph.len() {
            if graph.children(index).is_empty() {
                let signature = graph.signature(index).unwrap();
                assert_eq!(signature.prefixes(), None);
                assert_eq!(signature.angular_momentum(), [0; 4]);
            }
        }
    }
}
