use std::{cmp::Ordering, fmt, ops::Index};

use serde::{Deserialize, Serialize};

/// A Cartesian axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in the order rewrites are attempted.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn label(self) -> char {
        match self {
            Axis::X => 'x',
            Axis::Y => 'y',
            Axis::Z => 'z',
        }
    }

    #[inline(always)]
    fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<char> for Axis {
    type Error = char;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'x' | 'X' => Ok(Axis::X),
            'y' | 'Y' => Ok(Axis::Y),
            'z' | 'Z' => Ok(Axis::Z),
            other => Err(other),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Cartesian angular momentum (ax, ay, az) on a single center, i.e. the polynomial
/// part x^ax * y^ay * z^az of a Cartesian Gaussian.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TensorComponent([u32; 3]);

impl TensorComponent {
    pub const fn new(ax: u32, ay: u32, az: u32) -> Self {
        Self([ax, ay, az])
    }

    pub const fn zero() -> Self {
        Self([0, 0, 0])
    }

    /// The unit component along an axis.
    pub fn unit(axis: Axis) -> Self {
        let mut shape = [0; 3];
        shape[axis.index()] = 1;
        Self(shape)
    }

    /// Total angular momentum ax + ay + az.
    pub fn order(&self) -> u32 {
        self.0.iter().sum()
    }

    /// Largest single-axis value.
    pub fn maximum(&self) -> u32 {
        self.0.iter().copied().max().unwrap_or(0)
    }

    /// The lowest axis carrying a nonzero value, x for the zero component.
    pub fn primary(&self) -> Axis {
        Axis::ALL
            .into_iter()
            .find(|&axis| self[axis] > 0)
            .unwrap_or(Axis::X)
    }

    /// Repeated axis letters, e.g. "xxy" for (2, 1, 0) and "0" for the zero component.
    pub fn label(&self) -> String {
        if self.order() == 0 {
            return "0".to_string();
        }

        Axis::ALL
            .into_iter()
            .flat_map(|axis| std::iter::repeat(axis.label()).take(self[axis] as usize))
            .collect()
    }

    /// Shifts one axis by `value`. Returns `None` if the result would be negative.
    pub fn shift(&self, axis: Axis, value: i32) -> Option<Self> {
        let shifted = self[axis].checked_add_signed(value)?;
        let mut shape = self.0;
        shape[axis.index()] = shifted;
        Some(Self(shape))
    }
}

impl Index<Axis> for TensorComponent {
    type Output = u32;

    fn index(&self, axis: Axis) -> &Self::Output {
        &self.0[axis.index()]
    }
}

impl Ord for TensorComponent {
    fn cmp(&self, other: &Self) -> Ordering {
        let [ax, ay, _] = self.0;
        let [bx, by, _] = other.0;

        self.order()
            .cmp(&other.order())
            .then(bx.cmp(&ax))
            .then(by.cmp(&ay))
    }
}

impl PartialOrd for TensorComponent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TensorComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// All Cartesian components of the given order, in canonical order:
/// x^n, x^(n-1)y, x^(n-1)z, ..., z^n.
pub fn tensor_components(order: u32) -> Vec<TensorComponent> {
    let mut components = Vec::with_capacity(((order + 1) * (order + 2) / 2) as usize);

    for ax in (0..=order).rev() {
        for ay in (0..=order - ax).rev() {
            components.push(TensorComponent::new(ax, ay, order - ax - ay));
        }
    }

    components
}

/// Spectroscopic letter of an angular momentum shell.
pub fn shell_label(order: u32) -> char {
    const LABELS: [char; 12] = ['S', 'P', 'D', 'F', 'G', 'H', 'I', 'K', 'L', 'M', 'N', 'O'];
    LABELS.get(order as usize).copied().unwrap_or('X')
}
