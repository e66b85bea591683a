//! Symbolic multiplicative factors of recursion terms.
//!
//! A factor names a scalar quantity of the primitive integral, such as a displacement
//! component (P - A)_x or a reciprocal exponent 1 / (a + b). It becomes a variable reference
//! in generated code, so every factor carries both a readable name and a code label.
//!
//! Exponent conventions used throughout the drivers:
//!   - a, b, c, d: exponents of the Gaussians on centers A, B, C, D
//!   - eta = a + b, xi = a * b / eta (one-electron integrals)
//!   - p = a + b, q = c + d, rho = p * q / (p + q) (electron repulsion; for two- and
//!     three-center integrals a side with a single Gaussian uses its own exponent)
//!   - for ECP integrals xi denotes the total exponent a + b + c of the three Gaussians
use std::fmt;

use serde::Serialize;

use crate::tensor::Axis;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Factor {
    name: &'static str,
    label: &'static str,
    axis: Option<Axis>,
}

impl Factor {
    pub const fn new(name: &'static str, label: &'static str, axis: Option<Axis>) -> Self {
        Self { name, label, axis }
    }

    const fn scalar(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, None)
    }

    const fn vector(name: &'static str, label: &'static str, axis: Axis) -> Self {
        Self::new(name, label, Some(axis))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn axis(&self) -> Option<Axis> {
        self.axis
    }

    /// Order of the factor: 1 for a directional component, 0 for a scalar.
    pub fn order(&self) -> u32 {
        u32::from(self.axis.is_some())
    }

    /// Variable name in generated code, e.g. `rpa_x` or `fe`.
    pub fn code_label(&self) -> String {
        match self.axis {
            Some(axis) => format!("{}_{}", self.label, axis.label()),
            None => self.label.to_string(),
        }
    }

    /// Whether this factor is a difference of two atomic centers (as opposed to a product
    /// center), i.e. has to be computed from the coordinates of the basis function centers.
    pub fn is_center_distance(&self) -> bool {
        matches!(self.label, "rab" | "rac" | "rbc" | "rcd" | "r2ab")
    }

    // ---- displacements -------------------------------------------------------------------

    /// (P - A)_i
    pub const fn pa(axis: Axis) -> Self {
        Self::vector("PA", "rpa", axis)
    }

    /// (P - B)_i
    pub const fn pb(axis: Axis) -> Self {
        Self::vector("PB", "rpb", axis)
    }

    /// (P - C)_i, C being the operator center
    pub const fn pc(axis: Axis) -> Self {
        Self::vector("PC", "rpc", axis)
    }

    /// (Q - C)_i
    pub const fn qc(axis: Axis) -> Self {
        Self::vector("QC", "rqc", axis)
    }

    /// (W - P)_i
    pub const fn wp(axis: Axis) -> Self {
        Self::vector("WP", "rwp", axis)
    }

    /// (W - Q)_i
    pub const fn wq(axis: Axis) -> Self {
        Self::vector("WQ", "rwq", axis)
    }

    /// (A - B)_i
    pub const fn ab(axis: Axis) -> Self {
        Self::vector("AB", "rab", axis)
    }

    /// (A - C)_i
    pub const fn ac(axis: Axis) -> Self {
        Self::vector("AC", "rac", axis)
    }

    /// (B - C)_i
    pub const fn bc(axis: Axis) -> Self {
        Self::vector("BC", "rbc", axis)
    }

    /// (C - D)_i
    pub const fn cd(axis: Axis) -> Self {
        Self::vector("CD", "rcd", axis)
    }

    /// |A - B|^2
    pub const fn ab_squared() -> Self {
        Self::scalar("|AB|^2", "r2ab")
    }

    // ---- one-electron exponents ----------------------------------------------------------

    /// 1 / eta
    pub const fn inv_eta() -> Self {
        Self::scalar("1/eta", "fe")
    }

    /// eta
    pub const fn eta() -> Self {
        Self::scalar("eta", "fz")
    }

    /// xi = a * b / eta
    pub const fn xi() -> Self {
        Self::scalar("xi", "fx")
    }

    /// a / eta
    pub const fn a_over_eta() -> Self {
        Self::scalar("a/eta", "fae")
    }

    /// b / eta
    pub const fn b_over_eta() -> Self {
        Self::scalar("b/eta", "fbe")
    }

    /// Exponent of the Gaussian on the given center (a, b, c or d).
    pub const fn exponent(center: usize) -> Self {
        match center {
            0 => Self::scalar("a_exp", "fa"),
            1 => Self::scalar("b_exp", "fb"),
            2 => Self::scalar("c_exp", "fc"),
            _ => Self::scalar("d_exp", "fd"),
        }
    }

    // ---- electron repulsion exponents ----------------------------------------------------

    /// 1 / p
    pub const fn inv_p() -> Self {
        Self::scalar("1/p", "fip")
    }

    /// 1 / q
    pub const fn inv_q() -> Self {
        Self::scalar("1/q", "fiq")
    }

    /// 1 / (p + q)
    pub const fn inv_pq() -> Self {
        Self::scalar("1/(p+q)", "fipq")
    }

    /// rho = p * q / (p + q)
    pub const fn rho() -> Self {
        Self::scalar("rho", "frho")
    }

    // ---- ECP exponents -------------------------------------------------------------------

    /// 1 / xi with xi the total exponent
    pub const fn inv_xi() -> Self {
        Self::scalar("1/xi", "fxi")
    }

    /// a / xi
    pub const fn a_over_xi() -> Self {
        Self::scalar("a/xi", "fax")
    }

    /// b / xi
    pub const fn b_over_xi() -> Self {
        Self::scalar("b/xi", "fbx")
    }

    /// c / xi, c being the ECP exponent
    pub const fn c_over_xi() -> Self {
        Self::scalar("c/xi", "fcx")
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.axis {
            Some(axis) => write!(f, "{}_{}", self.name, axis.label()),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Factor;
    use crate::tensor::Axis;

    #[test]
    fn code_labels() {
        assert_eq!(Factor::pa(Axis::Y).code_label(), "rpa_y");
        assert_eq!(Factor::inv_eta().code_label(), "fe");
        assert_eq!(Factor::pa(Axis::Y).order(), 1);
        assert_eq!(Factor::xi().order(), 0);
    }

    #[test]
    fn center_distances() {
        assert!(Factor::ab(Axis::X).is_center_distance());
        assert!(Factor::ab_squared().is_center_distance());
        assert!(!Factor::pa(Axis::X).is_center_distance());
    }
}
