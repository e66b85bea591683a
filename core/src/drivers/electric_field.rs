use crate::{
    algebra::{Dist, R2CDist, R2CTerm},
    error::Result,
    factor::Factor,
    fraction::Fraction,
    operator::{Operator, OperatorComponent},
    tensor::{Axis, TensorComponent},
};

use super::{
    fixed_point, foreign, is_plain, map_terms, minimal_expansion, nuclear::potential_vrr,
    NuclearPotentialDriver, RecursionDriver,
};

/// Recursion for electric field integrals (a|A_c|b)^m: derivatives of the nuclear potential
/// with respect to the operator center, c being the derivative component.
///
/// Angular momentum is lowered first, then the field derivative on (0|A_c|0)^m. A field
/// operator whose component reaches order zero is a nuclear potential.
#[derive(Copy, Clone, Debug, Default)]
pub struct ElectricFieldDriver;

impl ElectricFieldDriver {
    pub fn is_electric_field(&self, term: &R2CTerm) -> bool {
        is_plain(term, Operator::ElectricField)
    }

    /// Nuclear potential VRR plus c_i (a|A_(c-1_i)|b)^(m+1).
    pub fn bra_vrr(&self, term: &R2CTerm, axis: Axis) -> Option<R2CDist> {
        self.vrr(term, axis, 0, Factor::pa(axis))
    }

    /// As [`Self::bra_vrr`] with PB_i.
    pub fn ket_vrr(&self, term: &R2CTerm, axis: Axis) -> Option<R2CDist> {
        self.vrr(term, axis, 1, Factor::pb(axis))
    }

    fn vrr(&self, term: &R2CTerm, axis: Axis, center: usize, distance: Factor) -> Option<R2CDist> {
        if !self.is_electric_field(term) {
            return None;
        }

        let mut dist = potential_vrr(term, axis, center, distance)?;
        let c = i64::from(term.integral().operator().shape()[axis]);
        if let Some(field) = term
            .shift(axis, -1, center)
            .and_then(|t| t.shift_operator(axis, -1))
            .and_then(|t| t.shift_order(1))
        {
            dist.add(field.scaled(Fraction::from(c)));
        }
        map_terms(&mut dist, demote);
        Some(dist)
    }

    /// (0|A_(c+1_i)|0)^m = 2 eta PC_i (0|A_c|0)^(m+1) - 2 eta c_i (0|A_(c-1_i)|0)^(m+1)
    pub fn operator_vrr(&self, term: &R2CTerm, axis: Axis) -> Option<R2CDist> {
        if !self.is_electric_field(term) || !term.is_auxiliary(0) || !term.is_auxiliary(1) {
            return None;
        }

        let lowered = term.shift_operator(axis, -1)?.shift_order(1)?;
        let mut dist = Dist::new(term.clone());
        dist.add(
            lowered
                .clone()
                .with(Factor::eta(), Fraction::from(2))
                .with(Factor::pc(axis), Fraction::one()),
        );
        if let Some(twice) = lowered.shift_operator(axis, -1) {
            let c = i64::from(lowered.integral().operator().shape()[axis]);
            dist.add(twice.with(Factor::eta(), Fraction::from(-2 * c)));
        }
        map_terms(&mut dist, demote);
        Some(dist)
    }

    pub fn apply_bra_vrr(&self, term: &R2CTerm) -> Result<R2CDist> {
        if !self.is_electric_field(term) {
            return Err(foreign("electric field", term));
        }
        minimal_expansion(term, "electric field bra VRR", |t, axis| self.bra_vrr(t, axis))
    }

    pub fn apply_ket_vrr(&self, term: &R2CTerm) -> Result<R2CDist> {
        if !self.is_electric_field(term) {
            return Err(foreign("electric field", term));
        }
        minimal_expansion(term, "electric field ket VRR", |t, axis| self.ket_vrr(t, axis))
    }

    pub fn apply_operator_vrr(&self, term: &R2CTerm) -> Result<R2CDist> {
        if !self.is_electric_field(term) {
            return Err(foreign("electric field", term));
        }
        minimal_expansion(term, "electric field operator VRR", |t, axis| {
            self.operator_vrr(t, axis)
        })
    }

    pub fn reduce_bra_vrr(&self, dist: &mut R2CDist) -> Result<()> {
        fixed_point(
            dist,
            "electric field bra VRR",
            |t| self.is_electric_field(t) && !t.is_auxiliary(0),
            |t| self.apply_bra_vrr(t),
        )
    }

    pub fn reduce_ket_vrr(&self, dist: &mut R2CDist) -> Result<()> {
        fixed_point(
            dist,
            "electric field ket VRR",
            |t| self.is_electric_field(t) && !t.is_auxiliary(1),
            |t| self.apply_ket_vrr(t),
        )
    }

    pub fn reduce_operator_vrr(&self, dist: &mut R2CDist) -> Result<()> {
        fixed_point(
            dist,
            "electric field operator VRR",
            |t| self.is_electric_field(t),
            |t| self.apply_operator_vrr(t),
        )
    }
}

/// A field operator of order zero is the nuclear potential of the same Boys order.
fn demote(term: R2CTerm) -> R2CTerm {
    let operator = term.integral().operator();
    if operator.operator() == Operator::ElectricField && operator.shape().order() == 0 {
        term.replace(OperatorComponent::new(
            Operator::NuclearPotential,
            TensorComponent::zero(),
            operator.order(),
        ))
    } else {
        term
    }
}

impl RecursionDriver<2> for ElectricFieldDriver {
    fn operator(&self) -> Operator {
        Operator::ElectricField
    }

    fn apply_recursion(&self, dist: &mut R2CDist) -> Result<()> {
        map_terms(dist, demote);
        self.reduce_bra_vrr(dist)?;
        self.reduce_ket_vrr(dist)?;
        self.reduce_operator_vrr(dist)?;
        NuclearPotentialDriver.apply_recursion(dist)
    }
}

#[cfg(test)]
mod tests {
    use super::ElectricFieldDriver;
    use crate::{
        algebra::{Dist, Term},
        drivers::RecursionDriver,
        integral::Integral,
        operator::{Operator, OperatorComponent},
        tensor::{Axis, TensorComponent},
    };

    fn field(bra: TensorComponent, shape: TensorComponent, ket: TensorComponent) -> Term<2> {
        Term::new(Integral::new(
            [bra, ket],
            OperatorComponent::new(Operator::ElectricField, shape, 0),
        ))
    }

    #[test]
    fn s_s_field_becomes_nuclear_potential() {
        let s = TensorComponent::zero();
        let term = field(s, TensorComponent::unit(Axis::Z), s);

        let dist = ElectricFieldDriver.operator_vrr(&term, Axis::Z).unwrap();
        assert_eq!(dist.len(), 1);
        let operator = dist.terms()[0].integral().operator();
        assert_eq!(operator.operator(), Operator::NuclearPotential);
        assert_eq!(operator.order(), 1);
    }

    #[test]
    fn bra_step_lowers_field_component() {
        let px = TensorComponent::unit(Axis::X);
        let s = TensorComponent::zero();
        let dist = ElectricFieldDriver
            .bra_vrr(&field(px, px, s), Axis::X)
            .unwrap();

        // PA, -PC and the c_x (s|A|s)^1 term
        assert_eq!(dist.len(), 3);
        assert_eq!(
            dist.terms()[2].integral().operator(),
            OperatorComponent::new(Operator::NuclearPotential, TensorComponent::zero(), 1)
        );
    }

    #[test]
    fn scalar_field_requests_reduce_as_nuclear_potential() {
        let px = TensorComponent::unit(Axis::Y);
        let mut dist = Dist::new(field(px, TensorComponent::zero(), px));
        ElectricFieldDriver.apply_recursion(&mut dist).unwrap();

        assert!(dist
            .terms()
            .iter()
            .all(|t| t.integral().operator().operator() == Operator::NuclearPotential));
    }
}
