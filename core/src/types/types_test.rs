use super::*;
use crate::context::{Context, Definition, Lexicon};
use crate::expr::StructureDefinition;
use crate::{Rc, ToString};
use ecow::EcoString;
use pretty_assertions::assert_eq;

fn meters() -> Type {
    Type::measure(Unit::named("m"))
}

fn seconds() -> Type {
    Type::measure(Unit::named("s"))
}

#[test]
fn test_any_accepts_everything() {
    let lexicon = Lexicon::new();
    let ctx = Context::new(&lexicon);

    assert!(Type::Any.accepts(&Type::text(), &ctx));
    assert!(Type::Boolean.accepts(&Type::Any, &ctx));
}

#[test]
fn test_units_must_match() {
    let lexicon = Lexicon::new();
    let ctx = Context::new(&lexicon);

    assert!(meters().accepts(&meters(), &ctx));
    assert!(!meters().accepts(&seconds(), &ctx));
    assert!(!meters().accepts(&Type::number(), &ctx));
    assert!(Type::Number(NumberType::wildcard()).accepts(&seconds(), &ctx));
}

#[test]
fn test_derived_units() {
    let lexicon = Lexicon::new();
    let ctx = Context::new(&lexicon);

    let speed = NumberType::derived(UnitOp::Quotient, meters(), Some(seconds()), None);
    assert_eq!(
        speed.concrete_unit(&ctx),
        Unit::named("m").quotient(&Unit::named("s")).unwrap()
    );
    let per_second =
        Unit::from_exponents([(EcoString::from("m"), 1), (EcoString::from("s"), -1)]).unwrap();
    assert!(Type::Number(speed).accepts(&Type::measure(per_second), &ctx));

    let area = NumberType::derived(UnitOp::Power, meters(), None, Some(2.0));
    assert_eq!(area.concrete_unit(&ctx).exponent("m"), 2);
}

#[test]
fn test_derived_unit_falls_back_to_unitless() {
    let lexicon = Lexicon::new();
    let ctx = Context::new(&lexicon);

    let broken = NumberType::derived(UnitOp::Product, Type::text(), Some(meters()), None);
    assert_eq!(broken.concrete_unit(&ctx), Unit::empty());

    let fractional = NumberType::derived(UnitOp::Power, meters(), None, Some(0.5));
    assert_eq!(fractional.concrete_unit(&ctx), Unit::empty());
}

#[test]
fn test_unions() {
    let lexicon = Lexicon::new();
    let ctx = Context::new(&lexicon);
    let number_or_text = Type::Union(UnionType {
        members: vec![Type::number(), Type::text()],
    });

    // Every member of a given union must fit.
    assert!(!Type::number().accepts(&number_or_text, &ctx));
    assert!(number_or_text.accepts(&Type::text(), &ctx));
    assert!(number_or_text.accepts(&number_or_text, &ctx));
}

#[test]
fn test_union_of() {
    let lexicon = Lexicon::new();
    let ctx = Context::new(&lexicon);

    assert_eq!(union_of(Vec::new(), &ctx), None);
    assert_eq!(
        union_of([Type::number(), Type::number()], &ctx),
        Some(Type::number())
    );
    assert_eq!(
        union_of([Type::number(), Type::text(), Type::number()], &ctx),
        Some(Type::Union(UnionType {
            members: vec![Type::number(), Type::text()],
        }))
    );
}

#[test]
fn test_lists_of_unknown_items_fit_any_list() {
    let lexicon = Lexicon::new();
    let ctx = Context::new(&lexicon);
    let empty = Type::list(Type::unknown(UnknownReason::NoElements, None));

    assert!(Type::list(Type::number()).accepts(&empty, &ctx));
    assert!(empty.accepts(&Type::list(Type::text()), &ctx));
    assert!(!Type::list(Type::number()).accepts(&Type::list(Type::text()), &ctx));
}

#[test]
fn test_type_variables_are_satisfied() {
    let lexicon = Lexicon::new();
    let ctx = Context::new(&lexicon);

    assert!(Type::variable("T").accepts(&Type::text(), &ctx));
    assert!(Type::number().accepts(&Type::variable("T"), &ctx));
}

#[test]
fn test_names_resolve_to_structures() {
    let cat = Rc::new(StructureDefinition::new("Cat"));
    let dog = Rc::new(StructureDefinition::new("Dog"));
    let mut lexicon = Lexicon::new();
    lexicon.define("Cat".into(), Definition::Structure(cat.clone()));
    lexicon.define("Dog".into(), Definition::Structure(dog));
    let ctx = Context::new(&lexicon);

    assert_eq!(
        Type::name("Cat").resolve_names(&ctx),
        Type::Structure(StructureType::new(cat.clone()))
    );
    assert!(Type::name("Cat").accepts(&Type::Structure(StructureType::new(cat)), &ctx));
    assert!(!Type::name("Cat").accepts(&Type::name("Dog"), &ctx));
    // Unresolvable names only match themselves.
    assert!(Type::name("Bird").accepts(&Type::name("Bird"), &ctx));
}

#[test]
fn test_function_types_are_structural() {
    let lexicon = Lexicon::new();
    let ctx = Context::new(&lexicon);
    let unary = |ty: Type| Type::function(vec![Bind::named("a").typed(ty)], Type::Boolean);

    assert!(unary(Type::number()).accepts(&unary(Type::number()), &ctx));
    assert!(!unary(Type::number()).accepts(&unary(Type::text()), &ctx));
    assert!(!unary(Type::number()).accepts(&Type::function(Vec::new(), Type::Boolean), &ctx));
}

#[test]
fn test_substitute_replaces_variables() {
    let ty = Type::list(Type::variable("T"));
    let substituted = ty.substitute(&mut |name| (name == "T").then(Type::number));
    assert_eq!(substituted, Type::list(Type::number()));

    let untouched = ty.substitute(&mut |_| None);
    assert_eq!(untouched, ty);
}

#[test]
fn test_receiver_type_variables() {
    let list = Type::list(Type::text());
    assert_eq!(list.resolve_type_variable(LIST_ITEM), Some(Type::text()));
    assert_eq!(list.resolve_type_variable("Other"), None);
}

#[test]
fn test_display() {
    let cases = [
        (Type::number(), "#"),
        (meters(), "#m"),
        (Type::list(Type::text()), "['']"),
        (Type::Boolean, "?"),
        (Type::unknown(UnknownReason::Cycle, None), "∅"),
        (
            Type::function(
                vec![
                    Bind::named("a").typed(Type::number()),
                    Bind::named("rest").typed(Type::text()).variable_length(),
                ],
                Type::Boolean,
            ),
            "ƒ(a•# …rest•'') ?",
        ),
    ];
    for (ty, expected) in cases {
        assert_eq!(ty.to_string(), expected);
    }
}
