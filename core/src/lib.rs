//! Symbolic Obara–Saika recursions for molecular integrals over Cartesian Gaussians.
//!
//! A request enumerates the Cartesian components of an integral family, the family's driver
//! rewrites every component until only base cases remain, and the resulting distributions
//! (or, for three and four centers, the recursion graph) are read back through
//! [`listing::RecursionListing`].
pub mod algebra;
pub mod config;
pub mod drivers;
pub mod error;
pub mod factor;
pub mod fraction;
pub mod generator;
pub mod integral;
pub mod listing;
pub mod operator;
pub mod tensor;

pub use error::{Error, Result};
pub use generator::{generate, generate_all, GenerationRequest};
