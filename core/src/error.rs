use thiserror::Error;

use crate::operator::Operator;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A term that still needs recursion admits no valid rewrite along any axis. This is a
    /// defect in a recursion rule or in term classification; the expansion is abandoned.
    #[error("no valid {rule} rewrite for {integral}")]
    NoRewrite {
        rule: &'static str,
        integral: String,
    },

    /// A driver was handed a term of another operator family.
    #[error("{driver} driver cannot rewrite {integral}")]
    ForeignTerm {
        driver: &'static str,
        integral: String,
    },

    /// Recursion edges that loop back, so no vertex order satisfies every dependency.
    #[error("recursion graph has a cycle through {vertices} vertices")]
    CyclicGraph { vertices: usize },

    #[error("unknown integral family: {0}")]
    UnknownFamily(String),

    #[error("no {centers}-center recursion for operator {operator}")]
    UnsupportedFamily { operator: Operator, centers: usize },

    #[error("mixed operator families in one request: expected {expected}, found {found}")]
    MixedFamilies { expected: Operator, found: Operator },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

pub type Result<T> = std::result::Result<T, Error>;
