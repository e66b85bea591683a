//! Serialisable view of finished recursions, the form a code emitter consumes.
use std::{collections::BTreeSet, fmt};

use serde::Serialize;

use crate::{
    algebra::{Dist, Graph, Group, Term},
    error::Result,
    factor::Factor,
    generator::GenerationRequest,
    operator::Operator,
};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecursionListing {
    pub request: String,
    pub operator: Operator,
    pub needs_boys_function: bool,
    pub needs_radial_integrals: bool,
    /// Code labels of every factor the expansions reference.
    pub factors: Vec<String>,
    /// Vertices in the order they have to be computed in; two-center listings have exactly one.
    pub vertices: Vec<VertexListing>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VertexListing {
    pub shell: String,
    /// Positions of the vertices this one depends on, all earlier in the listing.
    pub children: Vec<usize>,
    pub distributions: Vec<DistListing>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DistListing {
    pub label: String,
    pub integral: String,
    pub terms: Vec<TermListing>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TermListing {
    /// Prefactor as a floating point literal.
    pub prefactor: String,
    pub factors: Vec<FactorPower>,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FactorPower {
    pub factor: String,
    pub power: u32,
}

impl RecursionListing {
    pub fn from_group<const N: usize>(request: &GenerationRequest, group: &Group<N>) -> Self {
        Self::new(
            request,
            &group.factors(),
            vec![VertexListing::new(group, Vec::new())],
        )
    }

    pub fn from_graph<const N: usize>(
        request: &GenerationRequest,
        graph: &Graph<N>,
    ) -> Result<Self> {
        let order = graph.sort(true)?;

        let mut position = vec![0; graph.len()];
        for (index, &vertex) in order.iter().enumerate() {
            position[vertex] = index;
        }

        let vertices = order
            .iter()
            .map(|&vertex| {
                let children = graph
                    .children(vertex)
                    .iter()
                    .map(|&child| position[child])
                    .collect();
                VertexListing::new(graph.vertex(vertex), children)
            })
            .collect();

        let factors = graph
            .vertices()
            .iter()
            .flat_map(|group| group.factors())
            .collect::<BTreeSet<_>>();

        Ok(Self::new(request, &factors, vertices))
    }

    fn new(
        request: &GenerationRequest,
        factors: &BTreeSet<Factor>,
        vertices: Vec<VertexListing>,
    ) -> Self {
        Self {
            request: request.to_string(),
            operator: request.operator,
            needs_boys_function: request.operator.needs_boys_function(),
            needs_radial_integrals: request.operator.needs_radial_integrals(),
            factors: factors.iter().map(Factor::code_label).collect(),
            vertices,
        }
    }

    /// Total number of expansion terms.
    pub fn terms(&self) -> usize {
        self.vertices
            .iter()
            .flat_map(|vertex| &vertex.distributions)
            .map(|dist| dist.terms.len())
            .sum()
    }
}

impl VertexListing {
    fn new<const N: usize>(group: &Group<N>, children: Vec<usize>) -> Self {
        Self {
            shell: group
                .roots()
                .next()
                .map(|root| root.shell().to_string())
                .unwrap_or_default(),
            children,
            distributions: group.iter().map(DistListing::new).collect(),
        }
    }
}

impl DistListing {
    fn new<const N: usize>(dist: &Dist<N>) -> Self {
        let root = dist.root().integral();
        Self {
            label: root.label(),
            integral: root.to_string(),
            terms: dist.terms().iter().map(TermListing::new).collect(),
        }
    }
}

impl TermListing {
    fn new<const N: usize>(term: &Term<N>) -> Self {
        Self {
            prefactor: term.prefactor().to_literal(),
            factors: term
                .factor_powers()
                .into_iter()
                .map(|(factor, power)| FactorPower {
                    factor: factor.code_label(),
                    power,
                })
                .collect(),
            label: term.integral().label(),
        }
    }
}

impl fmt::Display for RecursionListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "// {}", self.request)?;
        for (index, vertex) in self.vertices.iter().enumerate() {
            if self.vertices.len() > 1 {
                writeln!(f, "// [{index}] {}", vertex.shell)?;
            }
            for dist in &vertex.distributions {
                writeln!(f, "{} =", dist.label)?;
                for term in &dist.terms {
                    write!(f, "    {}", term.prefactor)?;
                    for factor in &term.factors {
                        for _ in 0..factor.power {
                            write!(f, " * {}", factor.factor)?;
                        }
                    }
                    writeln!(f, " * {}", term.label)?;
                }
            }
        }
        Ok(())
    }
}
