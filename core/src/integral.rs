//! Integral components and their shell-level signatures.
use std::{cmp::Ordering, fmt};

use itertools::Itertools;

use crate::{
    factor::Factor,
    operator::{Operator, OperatorComponent},
    tensor::{shell_label, Axis, TensorComponent},
};

/// Geometric derivative operators attached to the centers of an integral.
///
/// Either no center is differentiated, or every center carries a derivative component (order
/// zero meaning "not differentiated on this center").
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Prefixes<const N: usize> {
    None,
    Geometric([TensorComponent; N]),
}

impl<const N: usize> Prefixes<N> {
    pub fn is_none(&self) -> bool {
        matches!(self, Prefixes::None)
    }

    /// Derivative component on a center, zero when undifferentiated.
    pub fn component(&self, center: usize) -> TensorComponent {
        match self {
            Prefixes::None => TensorComponent::zero(),
            Prefixes::Geometric(components) => components[center],
        }
    }

    pub fn order(&self, center: usize) -> u32 {
        self.component(center).order()
    }

    pub fn orders(&self) -> Option<[u32; N]> {
        match self {
            Prefixes::None => None,
            Prefixes::Geometric(components) => Some(components.map(|c| c.order())),
        }
    }

    /// Shifts the derivative component of one center. With `clear`, a derivative whose orders
    /// all reach zero collapses to [`Prefixes::None`].
    pub fn shift(&self, axis: Axis, value: i32, center: usize, clear: bool) -> Option<Self> {
        let mut components = match self {
            Prefixes::None => [TensorComponent::zero(); N],
            Prefixes::Geometric(components) => *components,
        };
        components[center] = components[center].shift(axis, value)?;

        if clear && components.iter().all(|c| c.order() == 0) {
            Some(Prefixes::None)
        } else {
            Some(Prefixes::Geometric(components))
        }
    }
}

/// One component of an integral over `N` centers.
///
/// The first `N / 2` centers form the bra, the rest the ket: (A|O|B), (A|O|CD) and (AB|O|CD).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Integral<const N: usize> {
    centers: [TensorComponent; N],
    operator: OperatorComponent,
    prefixes: Prefixes<N>,
}

pub type T2CIntegral = Integral<2>;
pub type T3CIntegral = Integral<3>;
pub type T4CIntegral = Integral<4>;

impl<const N: usize> Integral<N> {
    /// Number of bra centers.
    pub const BRA: usize = N / 2;

    pub fn new(centers: [TensorComponent; N], operator: OperatorComponent) -> Self {
        Self {
            centers,
            operator,
            prefixes: Prefixes::None,
        }
    }

    /// Exponent of the Gaussian on a center. Three-center integrals are (A|CD), so their
    /// second and third centers carry the exponents c and d.
    pub fn exponent(center: usize) -> Factor {
        match (N, center) {
            (3, 1) => Factor::exponent(2),
            (3, 2) => Factor::exponent(3),
            _ => Factor::exponent(center),
        }
    }

    pub fn with_prefixes(self, prefixes: Prefixes<N>) -> Self {
        Self { prefixes, ..self }
    }

    pub fn centers(&self) -> &[TensorComponent; N] {
        &self.centers
    }

    pub fn center(&self, index: usize) -> TensorComponent {
        self.centers[index]
    }

    pub fn operator(&self) -> OperatorComponent {
        self.operator
    }

    pub fn prefixes(&self) -> Prefixes<N> {
        self.prefixes
    }

    pub fn shift(&self, axis: Axis, value: i32, center: usize) -> Option<Self> {
        let mut centers = self.centers;
        centers[center] = centers[center].shift(axis, value)?;
        Some(Self { centers, ..*self })
    }

    pub fn shift_prefix(&self, axis: Axis, value: i32, center: usize, clear: bool) -> Option<Self> {
        Some(Self {
            prefixes: self.prefixes.shift(axis, value, center, clear)?,
            ..*self
        })
    }

    pub fn shift_operator(&self, axis: Axis, value: i32) -> Option<Self> {
        Some(Self {
            operator: self.operator.shift(axis, value)?,
            ..*self
        })
    }

    pub fn shift_order(&self, value: i32) -> Option<Self> {
        Some(Self {
            operator: self.operator.shift_order(value)?,
            ..*self
        })
    }

    /// The same integral with a different operator component.
    pub fn replace(&self, operator: OperatorComponent) -> Self {
        Self { operator, ..*self }
    }

    /// Whether no recursion on `center` is needed: zero angular momentum and no derivative.
    pub fn is_auxiliary(&self, center: usize) -> bool {
        self.centers[center].order() == 0 && self.prefixes.order(center) == 0
    }

    /// Total angular momentum over all centers.
    pub fn order(&self) -> u32 {
        self.centers.iter().map(TensorComponent::order).sum()
    }

    /// Unique buffer label, e.g. `s_x_yz` or `g_x_0_a_m1_x_y`.
    pub fn label(&self) -> String {
        let mut parts = Vec::with_capacity(2 * N + 2);

        if let Prefixes::Geometric(components) = &self.prefixes {
            parts.push("g".to_string());
            parts.extend(components.iter().map(TensorComponent::label));
        }
        parts.push(self.operator.label());
        parts.extend(self.centers.iter().map(TensorComponent::label));

        parts.join("_")
    }

    /// Shell-level signature of this component.
    pub fn shell(&self) -> ShellIntegral<N> {
        ShellIntegral {
            angular_momentum: self.centers.map(|c| c.order()),
            operator: self.operator.operator(),
            operator_order: self.operator.shape().order(),
            order: self.operator.order(),
            prefixes: self.prefixes.orders(),
        }
    }
}

impl<const N: usize> Ord for Integral<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        let bra = Self::BRA;

        self.centers[..bra]
            .cmp(&other.centers[..bra])
            .then(self.operator.cmp(&other.operator))
            .then(self.prefixes.cmp(&other.prefixes))
            .then(self.centers[bra..].cmp(&other.centers[bra..]))
    }
}

impl<const N: usize> PartialOrd for Integral<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const N: usize> fmt::Display for Integral<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Prefixes::Geometric(components) = &self.prefixes {
            write!(f, "d[{}]", components.iter().join(","))?;
        }

        let bra = self.centers[..Self::BRA].iter().join(",");
        let ket = self.centers[Self::BRA..].iter().join(",");
        write!(f, "({bra}|{}|{ket})", self.operator)
    }
}

/// Shell-level signature of an integral: the angular momentum on every center together with the
/// operator data. All Cartesian components of one shell integral share a signature.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShellIntegral<const N: usize> {
    angular_momentum: [u32; N],
    operator: Operator,
    operator_order: u32,
    order: u32,
    prefixes: Option<[u32; N]>,
}

impl<const N: usize> ShellIntegral<N> {
    pub fn angular_momentum(&self) -> [u32; N] {
        self.angular_momentum
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn operator_order(&self) -> u32 {
        self.operator_order
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn prefixes(&self) -> Option<[u32; N]> {
        self.prefixes
    }
}

impl<const N: usize> fmt::Display for ShellIntegral<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bra = N / 2;
        let shells = self.angular_momentum.map(shell_label);

        if let Some(prefixes) = self.prefixes {
            write!(f, "d[{}]", prefixes.iter().join(","))?;
        }

        write!(f, "({}|", shells[..bra].iter().collect::<String>())?;
        if self.operator != Operator::ElectronRepulsion {
            write!(f, "{}", self.operator)?;
            if self.operator_order > 0 {
                write!(f, "[{}]", self.operator_order)?;
            }
            write!(f, "|")?;
        }
        write!(f, "{})", shells[bra..].iter().collect::<String>())?;

        if self.order > 0 {
            write!(f, "^{}", self.order)?;
        }
        Ok(())
    }
}
