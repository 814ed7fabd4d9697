//! Number types and physical units.
//!
//! A number type's unit is either written literally, a wildcard, or derived
//! from an arithmetic operator and the types of its operands. Derived units
//! are resolved on demand by [`NumberType::concrete_unit`]; a derivation that
//! cannot be resolved falls back to the empty unit.

use super::Type;
use crate::context::Context;
use crate::{Box, String, ToString, Vec, format};
use alloc::collections::BTreeMap;
use core::fmt;
use ecow::EcoString;
use tracing::warn;

/// A concrete unit: base unit names mapped to nonzero exponents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Unit {
    exponents: BTreeMap<EcoString, i32>,
}

impl Unit {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<EcoString>) -> Self {
        Self {
            exponents: BTreeMap::from([(name.into(), 1)]),
        }
    }

    /// Sums the exponents of repeated names. `None` when an exponent
    /// overflows.
    pub fn from_exponents(exponents: impl IntoIterator<Item = (EcoString, i32)>) -> Option<Self> {
        let mut unit = Self::default();
        for (name, exponent) in exponents {
            unit.add(name, exponent)?;
        }
        Some(unit)
    }

    pub fn is_unitless(&self) -> bool {
        self.exponents.is_empty()
    }

    pub fn exponent(&self, name: &str) -> i32 {
        self.exponents.get(name).copied().unwrap_or(0)
    }

    pub fn product(&self, other: &Unit) -> Option<Unit> {
        let mut unit = self.clone();
        for (name, exponent) in &other.exponents {
            unit.add(name.clone(), *exponent)?;
        }
        Some(unit)
    }

    pub fn quotient(&self, other: &Unit) -> Option<Unit> {
        let mut unit = self.clone();
        for (name, exponent) in &other.exponents {
            unit.add(name.clone(), exponent.checked_neg()?)?;
        }
        Some(unit)
    }

    pub fn power(&self, exponent: i32) -> Option<Unit> {
        let mut exponents = BTreeMap::new();
        for (name, power) in &self.exponents {
            let total = power.checked_mul(exponent)?;
            if total != 0 {
                exponents.insert(name.clone(), total);
            }
        }
        Some(Unit { exponents })
    }

    fn add(&mut self, name: EcoString, exponent: i32) -> Option<()> {
        let total = self.exponent(&name).checked_add(exponent)?;
        if total == 0 {
            self.exponents.remove(&name);
        } else {
            self.exponents.insert(name, total);
        }
        Some(())
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn part(name: &str, exponent: i32) -> String {
            if exponent == 1 {
                name.to_string()
            } else {
                format!("{name}^{exponent}")
            }
        }
        let numerator: Vec<String> = self
            .exponents
            .iter()
            .filter(|(_, exponent)| **exponent > 0)
            .map(|(name, exponent)| part(name, *exponent))
            .collect();
        let denominator: Vec<String> = self
            .exponents
            .iter()
            .filter(|(_, exponent)| **exponent < 0)
            .map(|(name, exponent)| part(name, -exponent))
            .collect();

        if numerator.is_empty() && !denominator.is_empty() {
            write!(f, "1")?;
        }
        write!(f, "{}", numerator.join("·"))?;
        if !denominator.is_empty() {
            write!(f, "/{}", denominator.join("·"))?;
        }
        Ok(())
    }
}

/// The operator a derived unit comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOp {
    /// The unit of the left operand, as for addition and negation.
    Same,
    Product,
    Quotient,
    /// The left unit raised to the derivation's constant exponent.
    Power,
}

/// How to compute a unit from operand types.
#[derive(Debug, Clone, PartialEq)]
pub struct Derivation {
    pub op: UnitOp,
    pub left: Box<Type>,
    pub right: Option<Box<Type>>,
    pub constant: Option<f64>,
}

impl Derivation {
    pub fn concretize(&self, ctx: &Context) -> Unit {
        let Type::Number(left) = self.left.as_ref() else {
            warn!(left = %self.left, "derived unit has a non-number operand");
            return Unit::empty();
        };
        let left = left.concrete_unit(ctx);

        let unit = match self.op {
            UnitOp::Same => Some(left),
            UnitOp::Product | UnitOp::Quotient => {
                let right = match self.right.as_deref() {
                    Some(Type::Number(right)) => right.concrete_unit(ctx),
                    other => {
                        warn!(right = ?other, "derived unit has a non-number operand");
                        return Unit::empty();
                    }
                };
                if self.op == UnitOp::Product {
                    left.product(&right)
                } else {
                    left.quotient(&right)
                }
            }
            UnitOp::Power => match self.constant {
                Some(exponent) if exponent == (exponent as i32) as f64 => {
                    left.power(exponent as i32)
                }
                other => {
                    warn!(exponent = ?other, "derived unit needs a constant integer exponent");
                    return Unit::empty();
                }
            },
        };
        unit.unwrap_or_else(|| {
            warn!(op = ?self.op, "derived unit exponent overflows");
            Unit::empty()
        })
    }
}

/// The unit facet of a number type.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberUnit {
    Literal(Unit),
    /// Matches any unit.
    Wildcard,
    Derived(Derivation),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberType {
    pub unit: NumberUnit,
}

impl NumberType {
    pub fn unitless() -> Self {
        Self::with_unit(Unit::empty())
    }

    pub fn with_unit(unit: Unit) -> Self {
        Self {
            unit: NumberUnit::Literal(unit),
        }
    }

    pub fn wildcard() -> Self {
        Self {
            unit: NumberUnit::Wildcard,
        }
    }

    pub fn derived(op: UnitOp, left: Type, right: Option<Type>, constant: Option<f64>) -> Self {
        Self {
            unit: NumberUnit::Derived(Derivation {
                op,
                left: Box::new(left),
                right: right.map(Box::new),
                constant,
            }),
        }
    }

    pub fn has_derived_unit(&self) -> bool {
        matches!(self.unit, NumberUnit::Derived(_))
    }

    /// The unit this type stands for in `ctx`. Never fails: unresolvable
    /// derivations yield the empty unit.
    pub fn concrete_unit(&self, ctx: &Context) -> Unit {
        match &self.unit {
            NumberUnit::Literal(unit) => unit.clone(),
            NumberUnit::Wildcard => Unit::empty(),
            NumberUnit::Derived(derivation) => derivation.concretize(ctx),
        }
    }

    pub fn accepts(&self, given: &NumberType, ctx: &Context) -> bool {
        if matches!(self.unit, NumberUnit::Wildcard) || matches!(given.unit, NumberUnit::Wildcard) {
            return true;
        }
        self.concrete_unit(ctx) == given.concrete_unit(ctx)
    }
}

impl fmt::Display for NumberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unit {
            NumberUnit::Literal(unit) => write!(f, "#{unit}"),
            NumberUnit::Wildcard => write!(f, "#*"),
            NumberUnit::Derived(derivation) => match derivation.op {
                UnitOp::Same => write!(f, "{}", derivation.left),
                _ => write!(f, "#…"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Context, Lexicon};
    use crate::vec;
    use pretty_assertions::assert_eq;

    fn meters() -> Unit {
        Unit::named("m")
    }

    fn seconds() -> Unit {
        Unit::named("s")
    }

    #[test]
    fn unit_arithmetic() {
        let speed = meters().quotient(&seconds()).unwrap();
        assert_eq!(speed.exponent("m"), 1);
        assert_eq!(speed.exponent("s"), -1);
        assert_eq!(speed.product(&seconds()), Some(meters()));
        assert_eq!(meters().power(2).unwrap().exponent("m"), 2);
        assert!(meters().quotient(&meters()).unwrap().is_unitless());
        assert_eq!(meters().power(0), Some(Unit::empty()));
    }

    #[test]
    fn unit_display() {
        let acceleration = meters().quotient(&seconds().power(2).unwrap()).unwrap();
        assert_eq!(acceleration.to_string(), "m/s^2");
        assert_eq!(Unit::empty().quotient(&seconds()).unwrap().to_string(), "1/s");
        assert_eq!(meters().product(&seconds()).unwrap().to_string(), "m·s");
    }

    #[test]
    fn derived_units_concretize() {
        let lexicon = Lexicon::new();
        let ctx = Context::new(&lexicon);
        let distance = Type::measure(meters());
        let time = Type::measure(seconds());

        let speed = NumberType::derived(UnitOp::Quotient, distance.clone(), Some(time), None);
        assert_eq!(speed.concrete_unit(&ctx), meters().quotient(&seconds()).unwrap());

        let area = NumberType::derived(UnitOp::Power, distance.clone(), None, Some(2.0));
        assert_eq!(area.concrete_unit(&ctx), meters().power(2).unwrap());

        let nested = NumberType::derived(UnitOp::Same, Type::Number(area), None, None);
        assert_eq!(nested.concrete_unit(&ctx), meters().power(2).unwrap());
    }

    #[test]
    fn broken_derivation_falls_back_to_unitless() {
        let lexicon = Lexicon::new();
        let ctx = Context::new(&lexicon);

        let broken = NumberType::derived(UnitOp::Product, Type::text(), Some(Type::number()), None);
        assert_eq!(broken.concrete_unit(&ctx), Unit::empty());

        let fractional =
            NumberType::derived(UnitOp::Power, Type::measure(meters()), None, Some(0.5));
        assert_eq!(fractional.concrete_unit(&ctx), Unit::empty());
    }

    #[test]
    fn exponent_overflow() {
        let lexicon = Lexicon::new();
        let ctx = Context::new(&lexicon);
        let square = meters().power(2).unwrap();

        assert_eq!(square.power(1 << 30), None);
        assert_eq!(Unit::from_exponents(vec![("m".into(), i32::MAX), ("m".into(), 1)]), None);
        let huge = Unit::from_exponents(vec![("s".into(), i32::MIN)]).unwrap();
        assert_eq!(meters().quotient(&huge), None);

        // Analysis keeps going with the empty unit.
        let derived =
            NumberType::derived(UnitOp::Power, Type::measure(square), None, Some(1_073_741_824.0));
        assert_eq!(derived.concrete_unit(&ctx), Unit::empty());
    }

    #[test]
    fn wildcard_accepts_any_unit() {
        let lexicon = Lexicon::new();
        let ctx = Context::new(&lexicon);
        let any = NumberType::wildcard();
        let meters = NumberType::with_unit(meters());

        assert!(any.accepts(&meters, &ctx));
        assert!(!NumberType::unitless().accepts(&meters, &ctx));
        assert_eq!(
            Unit::from_exponents(vec![("m".into(), 1), ("m".into(), -1)]),
            Some(Unit::empty())
        );
    }
}
