use std::collections::{BTreeMap, BTreeSet};

use crate::{
    error::{Error, Result},
    integral::{Integral, ShellIntegral},
};

use super::{dist::Dist, group::Group, term::Term};

/// A recursion that is applied one step at a time while building a [`Graph`].
pub trait GraphDriver<const N: usize> {
    /// One rewrite step of a term, or `None` if the term is a base case.
    fn step(&self, term: &Term<N>) -> Result<Option<Dist<N>>>;
}

/// Directed acyclic graph of recursion groups.
///
/// Every vertex holds the distributions of one shell integral. An edge points from a vertex to
/// a vertex whose integrals its expansions reference, so children have to be computed before
/// their parents.
#[derive(Clone, Debug, Default)]
pub struct Graph<const N: usize> {
    vertices: Vec<Group<N>>,
    edges: Vec<BTreeSet<usize>>,
}

pub type R3Graph = Graph<3>;
pub type R4Graph = Graph<4>;

impl<const N: usize> Graph<N> {
    pub fn new(group: Group<N>) -> Self {
        Self {
            vertices: vec![group],
            edges: vec![BTreeSet::new()],
        }
    }

    /// Expands and reduces `group` until no vertex awaits expansion.
    pub fn build(group: Group<N>, driver: &impl GraphDriver<N>) -> Result<Self> {
        let mut graph = Self::new(group);

        let mut passes = 0;
        while graph.expand(driver)? {
            graph.reduce();
            passes += 1;
            log::trace!("graph pass {passes}: {} vertices", graph.len());
        }

        log::debug!(
            "recursion graph complete after {passes} passes with {} vertices",
            graph.len()
        );
        Ok(graph)
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex(&self, index: usize) -> &Group<N> {
        &self.vertices[index]
    }

    pub fn vertices(&self) -> &[Group<N>] {
        &self.vertices
    }

    pub fn children(&self, index: usize) -> &BTreeSet<usize> {
        &self.edges[index]
    }

    pub fn parents(&self, index: usize) -> BTreeSet<usize> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, children)| children.contains(&index))
            .map(|(parent, _)| parent)
            .collect()
    }

    /// Shell signature shared by the integrals of a vertex.
    pub fn signature(&self, index: usize) -> Option<ShellIntegral<N>> {
        self.vertices[index].roots().next().map(Integral::shell)
    }

    /// Index of the vertex holding the given shell integral.
    pub fn find(&self, signature: &ShellIntegral<N>) -> Option<usize> {
        (0..self.len()).find(|&index| self.signature(index).as_ref() == Some(signature))
    }

    /// Vertices with at least one distribution that has not been expanded yet.
    pub fn orphans(&self) -> Vec<usize> {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, group)| group.has_empty())
            .map(|(index, _)| index)
            .collect()
    }

    /// Whether all vertices are expanded.
    pub fn is_complete(&self) -> bool {
        self.vertices.iter().all(|group| !group.has_empty())
    }

    /// Expands every pending distribution by one step. The integrals the new expansions
    /// reference become new vertices, one per shell signature and parent. Returns whether
    /// anything was expanded.
    pub fn expand(&mut self, driver: &impl GraphDriver<N>) -> Result<bool> {
        let orphans = self.orphans();
        if orphans.is_empty() {
            return Ok(false);
        }

        for parent in orphans {
            let mut expanded = Group::new();

            for dist in self.vertices[parent].iter_mut().filter(|d| d.is_empty()) {
                let Some(step) = driver.step(dist.root())? else {
                    dist.set_expansion(Vec::new());
                    continue;
                };

                dist.set_expansion(step.into_terms());
                dist.simplify();
                log::trace!("{dist}");
                expanded.add(dist.clone());
            }

            for integrals in expanded.split_terms().into_values() {
                let integrals = integrals.into_iter().collect::<Vec<_>>();
                self.vertices.push(Group::from_integrals(&integrals));
                self.edges.push(BTreeSet::new());
                self.edges[parent].insert(self.vertices.len() - 1);
            }
        }

        Ok(true)
    }

    /// Merges vertices with identical shell signature. Roots are united, an expanded copy of a
    /// distribution wins over an unexpanded one, and edges are redirected to the survivor.
    pub fn reduce(&mut self) {
        let mut survivors = BTreeMap::<ShellIntegral<N>, usize>::new();
        let mut mapping = Vec::with_capacity(self.vertices.len());
        let mut vertices = Vec::<Group<N>>::with_capacity(self.vertices.len());

        for group in std::mem::take(&mut self.vertices) {
            let signature = group.roots().next().map(Integral::shell);

            match signature.and_then(|signature| survivors.get(&signature).copied()) {
                Some(survivor) => {
                    mapping.push(survivor);
                    merge_into(&mut vertices[survivor], group);
                }
                None => {
                    if let Some(signature) = signature {
                        survivors.insert(signature, vertices.len());
                    }
                    mapping.push(vertices.len());
                    vertices.push(group);
                }
            }
        }

        let mut edges = vec![BTreeSet::new(); vertices.len()];
        for (parent, children) in std::mem::take(&mut self.edges).into_iter().enumerate() {
            for child in children {
                let (parent, child) = (mapping[parent], mapping[child]);
                if parent != child {
                    edges[parent].insert(child);
                }
            }
        }

        self.vertices = vertices;
        self.edges = edges;
    }

    /// Topological order of the vertices. With `child_first`, every vertex comes after all
    /// vertices it depends on, which is the order code has to be emitted in. Fails if the
    /// edges contain a cycle.
    pub fn sort(&self, child_first: bool) -> Result<Vec<usize>> {
        let mut in_degree = vec![0usize; self.len()];
        for children in &self.edges {
            for &child in children {
                in_degree[child] += 1;
            }
        }

        let mut ready = (0..self.len())
            .filter(|&index| in_degree[index] == 0)
            .collect::<BTreeSet<_>>();
        let mut order = Vec::with_capacity(self.len());

        while let Some(index) = ready.pop_first() {
            order.push(index);
            for &child in &self.edges[index] {
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    ready.insert(child);
                }
            }
        }

        if order.len() != self.len() {
            return Err(Error::CyclicGraph {
                vertices: self.len() - order.len(),
            });
        }

        if child_first {
            order.reverse();
        }
        Ok(order)
    }

    /// Total number of expansion terms over all vertices.
    pub fn terms(&self) -> usize {
        self.vertices.iter().map(Group::terms).sum()
    }
}

fn merge_into<const N: usize>(survivor: &mut Group<N>, group: Group<N>) {
    for dist in group.into_dists() {
        let existing = survivor
            .iter_mut()
            .find(|existing| existing.root().integral() == dist.root().integral());

        match existing {
            Some(existing) if existing.is_empty() && !dist.is_empty() => *existing = dist,
            Some(_) => {}
            None => survivor.add(dist),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{Graph, GraphDriver};
    use crate::{
        algebra::{dist::Dist, group::Group, term::Term},
        error::{Error, Result},
        fraction::Fraction,
        integral::Integral,
        operator::{Operator, OperatorComponent},
        tensor::{Axis, TensorComponent},
    };

    /// Lowers the x component of the bra by one and by two.
    struct Ladder;

    impl GraphDriver<2> for Ladder {
        fn step(&self, term: &Term<2>) -> Result<Option<Dist<2>>> {
            let Some(lower) = term.shift(Axis::X, -1, 0) else {
                return Ok(None);
            };

            let mut dist = Dist::new(term.clone());
            if let Some(lowest) = lower.shift(Axis::X, -1, 0) {
                dist.add(lowest.scaled(Fraction::new(1, 2)));
            }
            dist.add(lower);
            Ok(Some(dist))
        }
    }

    fn integral(x: u32) -> Integral<2> {
        Integral::new(
            [TensorComponent::new(x, 0, 0), TensorComponent::zero()],
            OperatorComponent::scalar(Operator::Overlap),
        )
    }

    #[test]
    fn reduce_merges_shared_children() {
        let graph = Graph::build(Group::from_integrals(&[integral(3)]), &Ladder).unwrap();

        // (x^3) -> (x^2), (x^1); (x^2) -> (x^1), (s); (x^1) -> (s)
        assert_eq!(graph.len(), 4);
        assert!(graph.is_complete());

        let signatures = (0..graph.len())
            .map(|index| graph.signature(index).unwrap())
            .collect::<BTreeSet<_>>();
        assert_eq!(signatures.len(), graph.len());

        let p = graph.find(&integral(1).shell()).unwrap();
        assert_eq!(graph.parents(p).len(), 2);
    }

    #[test]
    fn children_sort_before_parents() {
        let graph = Graph::build(Group::from_integrals(&[integral(4)]), &Ladder).unwrap();
        let order = graph.sort(true).unwrap();

        assert_eq!(order.len(), graph.len());
        for (position, &vertex) in order.iter().enumerate() {
            for child in graph.children(vertex) {
                let child_position = order.iter().position(|v| v == child).unwrap();
                assert!(child_position < position);
            }
        }
        assert_eq!(*order.last().unwrap(), 0);
    }

    #[test]
    fn split_children_come_from_the_new_expansions() {
        let mut graph = Graph::new(Group::from_integrals(&[integral(2)]));
        assert!(graph.expand(&Ladder).unwrap());

        // (x^2) -> (x^1), (s): one child per shell
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.children(0).len(), 2);
        assert_eq!(graph.orphans(), vec![1, 2]);
    }

    #[test]
    fn cycles_are_rejected_by_sort() {
        let graph = Graph {
            vertices: vec![
                Group::from_integrals(&[integral(2)]),
                Group::from_integrals(&[integral(1)]),
                Group::from_integrals(&[integral(0)]),
            ],
            edges: vec![
                BTreeSet::from([1]),
                BTreeSet::from([2]),
                BTreeSet::from([1]),
            ],
        };

        assert_eq!(graph.sort(true), Err(Error::CyclicGraph { vertices: 2 }));
    }
}
