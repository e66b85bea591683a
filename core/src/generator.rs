//! Generation requests and their dispatch to the recursion drivers.
use std::fmt;

use itertools::Itertools;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    algebra::{Graph, GraphDriver, Group, R2Group},
    drivers::{
        four_center_driver, three_center_driver, two_center_driver, GeometricDriver,
        RecursionDriver,
    },
    error::{Error, Result},
    integral::{Integral, Prefixes},
    listing::RecursionListing,
    operator::{Operator, OperatorComponent},
    tensor::{shell_label, tensor_components, TensorComponent},
};

/// One integral family at fixed angular momenta, e.g. the kinetic energy integrals (p|T|d) or
/// the first geometric derivatives of (ps|ps).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub operator: Operator,
    /// Angular momentum per center, bra centers first.
    pub angular_momentum: Vec<u32>,
    /// Order of the operator's own tensor (field derivative, multipole or momentum order).
    #[serde(default)]
    pub operator_order: u32,
    /// Geometric derivative order per center.
    #[serde(default)]
    pub derivative_orders: Option<Vec<u32>>,
}

impl GenerationRequest {
    pub fn new(operator: Operator, angular_momentum: Vec<u32>) -> Self {
        Self {
            operator,
            angular_momentum,
            operator_order: 0,
            derivative_orders: None,
        }
    }

    pub fn with_operator_order(self, operator_order: u32) -> Self {
        Self {
            operator_order,
            ..self
        }
    }

    pub fn with_derivative_orders(self, derivative_orders: Vec<u32>) -> Self {
        Self {
            derivative_orders: Some(derivative_orders),
            ..self
        }
    }

    pub fn centers(&self) -> usize {
        self.angular_momentum.len()
    }

    /// Whether any center is differentiated.
    pub fn has_derivatives(&self) -> bool {
        self.derivative_orders
            .as_ref()
            .is_some_and(|orders| orders.iter().any(|&order| order > 0))
    }

    pub fn validate(&self) -> Result<()> {
        if !(2..=4).contains(&self.centers()) {
            return Err(Error::InvalidRequest(format!(
                "{} centers requested, expected 2, 3 or 4",
                self.centers()
            )));
        }

        if let Some(orders) = &self.derivative_orders {
            if orders.len() != self.centers() {
                return Err(Error::InvalidRequest(format!(
                    "{} derivative orders given for {} centers",
                    orders.len(),
                    self.centers()
                )));
            }
        }

        if self.operator_order > 0 && !self.operator.is_tensorial() {
            return Err(Error::InvalidRequest(format!(
                "operator {} has no tensor components",
                self.operator
            )));
        }

        Ok(())
    }

    /// Every Cartesian component of the requested integrals: all derivative components, then
    /// all operator components, then all center components.
    pub fn components<const N: usize>(&self) -> Result<Vec<Integral<N>>> {
        self.validate()?;
        if self.centers() != N {
            return Err(Error::InvalidRequest(format!(
                "request has {} centers, expected {N}",
                self.centers()
            )));
        }

        let prefixes = match &self.derivative_orders {
            Some(orders) if self.has_derivatives() => cartesian::<N>(orders)
                .map(Prefixes::Geometric)
                .collect::<Vec<_>>(),
            _ => vec![Prefixes::None],
        };

        let mut integrals = Vec::new();
        for prefix in prefixes {
            for shape in tensor_components(self.operator_order) {
                let operator = OperatorComponent::new(self.operator, shape, 0);
                integrals.extend(
                    cartesian::<N>(&self.angular_momentum)
                        .map(|centers| Integral::new(centers, operator).with_prefixes(prefix)),
                );
            }
        }
        Ok(integrals)
    }
}

/// All combinations of Cartesian components of the given orders.
fn cartesian<const N: usize>(
    orders: &[u32],
) -> impl Iterator<Item = [TensorComponent; N]> + '_ {
    orders
        .iter()
        .map(|&order| tensor_components(order))
        .multi_cartesian_product()
        .map(|components| std::array::from_fn(|index| components[index]))
}

impl fmt::Display for GenerationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shells = self
            .angular_momentum
            .iter()
            .map(|&order| shell_label(order))
            .collect::<String>();
        write!(f, "{} {shells}", self.operator)?;

        if self.operator_order > 0 {
            write!(f, " [{}]", self.operator_order)?;
        }
        if let Some(orders) = self.derivative_orders.as_ref().filter(|_| self.has_derivatives()) {
            write!(f, " d[{}]", orders.iter().join(","))?;
        }
        Ok(())
    }
}

/// Expands a two-center request into one fully reduced distribution per component.
pub fn two_center_group(request: &GenerationRequest) -> Result<R2Group> {
    let integrals = request.components::<2>()?;
    let driver = two_center_driver(request.operator)?;

    if request.has_derivatives() {
        GeometricDriver::new(driver).create_recursion(&integrals)
    } else {
        driver.create_recursion(&integrals)
    }
}

/// Builds the recursion graph of a three-center request.
pub fn three_center_graph(request: &GenerationRequest) -> Result<Graph<3>> {
    let integrals = request.components::<3>()?;
    build_graph(request, &integrals, three_center_driver(request.operator)?)
}

/// Builds the recursion graph of a four-center request.
pub fn four_center_graph(request: &GenerationRequest) -> Result<Graph<4>> {
    let integrals = request.components::<4>()?;
    build_graph(request, &integrals, four_center_driver(request.operator)?)
}

fn build_graph<const N: usize, D: GraphDriver<N>>(
    request: &GenerationRequest,
    integrals: &[Integral<N>],
    driver: D,
) -> Result<Graph<N>> {
    let group = Group::from_integrals(integrals);
    if request.has_derivatives() {
        Graph::build(group, &GeometricDriver::new(driver))
    } else {
        Graph::build(group, &driver)
    }
}

/// Runs one request end to end.
pub fn generate(request: &GenerationRequest) -> Result<RecursionListing> {
    request.validate()?;
    log::debug!("generating {request}");

    match request.centers() {
        2 => Ok(RecursionListing::from_group(request, &two_center_group(request)?)),
        3 => RecursionListing::from_graph(request, &three_center_graph(request)?),
        4 => RecursionListing::from_graph(request, &four_center_graph(request)?),
        centers => Err(Error::InvalidRequest(format!("{centers} centers"))),
    }
}

/// Runs independent requests, in parallel with the `rayon` feature. Results keep the order of
/// the requests.
pub fn generate_all(requests: &[GenerationRequest]) -> Vec<Result<RecursionListing>> {
    #[cfg(feature = "rayon")]
    let results = requests.par_iter().map(generate).collect();
    #[cfg(not(feature = "rayon"))]
    let results = requests.iter().map(generate).collect();

    results
}
