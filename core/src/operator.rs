use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    tensor::{Axis, TensorComponent},
};

/// The physical operator families integrals can be generated for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Operator {
    Overlap,
    KineticEnergy,
    NuclearPotential,
    ElectricField,
    Multipole,
    LinearMomentum,
    ElectronRepulsion,
    LocalEcp,
    ProjectedEcp,
}

impl Operator {
    pub const ALL: [Operator; 9] = [
        Operator::Overlap,
        Operator::KineticEnergy,
        Operator::NuclearPotential,
        Operator::ElectricField,
        Operator::Multipole,
        Operator::LinearMomentum,
        Operator::ElectronRepulsion,
        Operator::LocalEcp,
        Operator::ProjectedEcp,
    ];

    /// Conventional symbol of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Overlap => "1",
            Operator::KineticEnergy => "T",
            Operator::NuclearPotential => "A",
            Operator::ElectricField => "AG",
            Operator::Multipole => "r",
            Operator::LinearMomentum => "p",
            Operator::ElectronRepulsion => "1/|r-r'|",
            Operator::LocalEcp => "U_L",
            Operator::ProjectedEcp => "U_P",
        }
    }

    /// Short prefix used in buffer labels of generated code.
    pub fn code_label(self) -> &'static str {
        match self {
            Operator::Overlap => "s",
            Operator::KineticEnergy => "t",
            Operator::NuclearPotential => "a",
            Operator::ElectricField => "ag",
            Operator::Multipole => "r",
            Operator::LinearMomentum => "p",
            Operator::ElectronRepulsion => "e",
            Operator::LocalEcp => "ul",
            Operator::ProjectedEcp => "up",
        }
    }

    /// Whether the operator has its own tensorial components.
    pub fn is_tensorial(self) -> bool {
        matches!(
            self,
            Operator::ElectricField | Operator::Multipole | Operator::LinearMomentum
        )
    }

    /// Whether the base case integrals of this family are Boys function values.
    pub fn needs_boys_function(self) -> bool {
        matches!(
            self,
            Operator::NuclearPotential | Operator::ElectricField | Operator::ElectronRepulsion
        )
    }

    /// Whether the base case integrals of this family are ECP radial integrals.
    pub fn needs_radial_integrals(self) -> bool {
        matches!(self, Operator::ProjectedEcp)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let operator = match value.trim() {
            "1" | "overlap" => Operator::Overlap,
            "T" | "kinetic" | "kinetic-energy" => Operator::KineticEnergy,
            "A" | "nuclear" | "nuclear-potential" => Operator::NuclearPotential,
            "AG" | "electric-field" => Operator::ElectricField,
            "r" | "multipole" => Operator::Multipole,
            "p" | "linear-momentum" => Operator::LinearMomentum,
            "1/|r-r'|" | "eri" | "electron-repulsion" => Operator::ElectronRepulsion,
            "U_L" | "local-ecp" => Operator::LocalEcp,
            "U_P" | "projected-ecp" => Operator::ProjectedEcp,
            other => return Err(Error::UnknownFamily(other.to_string())),
        };

        Ok(operator)
    }
}

/// One component of an operator: the operator family, its own tensorial component and the
/// auxiliary index (Boys function order or ECP radial order).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperatorComponent {
    operator: Operator,
    shape: TensorComponent,
    order: u32,
}

impl OperatorComponent {
    pub fn new(operator: Operator, shape: TensorComponent, order: u32) -> Self {
        Self {
            operator,
            shape,
            order,
        }
    }

    /// A scalar operator component with auxiliary order zero.
    pub fn scalar(operator: Operator) -> Self {
        Self::new(operator, TensorComponent::zero(), 0)
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn shape(&self) -> TensorComponent {
        self.shape
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn shift(&self, axis: Axis, value: i32) -> Option<Self> {
        Some(Self {
            shape: self.shape.shift(axis, value)?,
            ..*self
        })
    }

    pub fn shift_order(&self, value: i32) -> Option<Self> {
        Some(Self {
            order: self.order.checked_add_signed(value)?,
            ..*self
        })
    }

    /// Label used in buffer names, e.g. `a`, `ag_xy` or `e_m2`.
    pub fn label(&self) -> String {
        let mut label = self.operator.code_label().to_string();
        if self.shape.order() > 0 {
            label.push('_');
            label.push_str(&self.shape.label());
        }
        if self.order > 0 {
            label.push_str(&format!("_m{}", self.order));
        }
        label
    }
}

impl fmt::Display for OperatorComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.operator)?;
        if self.shape.order() > 0 {
            write!(f, "[{}]", self.shape)?;
        }
        if self.order > 0 {
            write!(f, "^({})", self.order)?;
        }
        Ok(())
    }
}
