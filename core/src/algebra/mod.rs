//! The recursion algebra: terms, distributions of terms, groups of distributions and the
//! graph of groups used for multi-center integrals.
pub(crate) mod arena;
pub mod dist;
pub mod graph;
pub mod group;
pub mod term;

pub use dist::{Dist, R2CDist, R3CDist, R4CDist};
pub use graph::{Graph, GraphDriver, R3Graph, R4Graph};
pub use group::{Group, R2Group, R3Group, R4Group};
pub use term::{Factors, R2CTerm, R3CTerm, R4CTerm, Term};
