use super::*;
use crate::context::Lexicon;
use crate::expr::{FunctionDefinition, StructureDefinition};
use crate::{String, format};
use pretty_assertions::assert_eq;

fn lexicon(definitions: Vec<Expr>) -> Lexicon {
    Lexicon::collect(&Expr::block(definitions))
}

fn names(conflicts: &[Conflict]) -> Vec<&'static str> {
    conflicts.iter().map(Conflict::name).collect()
}

fn as_evaluate(expr: &Expr) -> &Evaluate {
    match expr {
        Expr::Evaluate(evaluate) => evaluate,
        other => panic!("expected an evaluation, got {}", other.kind_name()),
    }
}

fn describe(slot: &Slot<'_>) -> String {
    match slot {
        Slot::Given(value) => format!("given {}", value.describe()),
        Slot::Default(value) => format!("default {}", value.describe()),
        Slot::Missing(input) => format!("missing {}", input.primary_name()),
        Slot::Rest(values) => format!("rest {}", values.len()),
    }
}

/// ƒ f(a•# b•'': "b") a
fn f() -> FunctionDefinition {
    FunctionDefinition::new("f")
        .with_input(Bind::named("a").typed(Type::number()))
        .with_input(
            Bind::named("b")
                .typed(Type::text())
                .with_value(Expr::text("\"b\"")),
        )
        .with_body(Expr::reference("a"))
}

fn named(name: &str, value: Expr) -> Expr {
    Expr::bind(Bind::named(name).with_value(value))
}

#[test]
fn test_matching_call_has_no_conflicts() {
    let lexicon = lexicon(vec![Expr::function(f())]);
    let ctx = Context::new(&lexicon);

    let positional = Expr::evaluate(
        Expr::reference("f"),
        vec![Expr::number(1.0), Expr::text("\"x\"")],
    );
    let by_name = Expr::evaluate(
        Expr::reference("f"),
        vec![Expr::number(1.0), named("b", Expr::text("\"x\""))],
    );
    let defaulted = Expr::evaluate(Expr::reference("f"), vec![Expr::number(1.0)]);

    assert_eq!(names(&positional.conflicts(&ctx)), Vec::<&str>::new());
    assert_eq!(names(&by_name.conflicts(&ctx)), Vec::<&str>::new());
    assert_eq!(names(&defaulted.conflicts(&ctx)), Vec::<&str>::new());
}

#[test]
fn test_missing_input() {
    let lexicon = lexicon(vec![Expr::function(f())]);
    let ctx = Context::new(&lexicon);

    let call = Expr::evaluate(Expr::reference("f"), Vec::new());
    let conflicts = call.conflicts(&ctx);
    assert_eq!(names(&conflicts), vec!["MissingInput"]);
    assert!(conflicts[0].implicates(call.id()));
}

#[test]
fn test_missing_last_of_several_inputs() {
    // ƒ g(a•# b•# c•#) a
    let c = Bind::named("c").typed(Type::number());
    let c_id = c.id;
    let g = FunctionDefinition::new("g")
        .with_input(Bind::named("a").typed(Type::number()))
        .with_input(Bind::named("b").typed(Type::number()))
        .with_input(c)
        .with_body(Expr::reference("a"));
    let lexicon = lexicon(vec![Expr::function(g)]);
    let ctx = Context::new(&lexicon);

    let call = Expr::evaluate(
        Expr::reference("g"),
        vec![Expr::number(1.0), Expr::number(2.0)],
    );
    let conflicts = call.conflicts(&ctx);
    assert_eq!(names(&conflicts), vec!["MissingInput"]);
    assert_eq!(conflicts[0].kind, ConflictKind::MissingInput { name: "c".into() });
    assert_eq!(conflicts[0].primary.nodes.as_slice(), &[call.id()]);
    assert_eq!(
        conflicts[0].secondary.as_ref().map(|secondary| secondary.nodes.as_slice()),
        Some(&[c_id][..])
    );
}

#[test]
fn test_named_input_in_required_position() {
    let lexicon = lexicon(vec![Expr::function(f())]);
    let ctx = Context::new(&lexicon);

    let call = Expr::evaluate(Expr::reference("f"), vec![named("z", Expr::number(1.0))]);
    assert_eq!(names(&call.conflicts(&ctx)), vec!["UnexpectedInput"]);
}

#[test]
fn test_incompatible_input() {
    let lexicon = lexicon(vec![Expr::function(f())]);
    let ctx = Context::new(&lexicon);

    let text = Expr::text("\"one\"");
    let call = Expr::evaluate(Expr::reference("f"), vec![text.clone()]);
    let conflicts = call.conflicts(&ctx);
    assert_eq!(names(&conflicts), vec!["IncompatibleInput"]);
    assert!(conflicts[0].implicates(text.id()));
}

#[test]
fn test_leftover_inputs() {
    let lexicon = lexicon(vec![Expr::function(f())]);
    let ctx = Context::new(&lexicon);

    let call = Expr::evaluate(
        Expr::reference("f"),
        vec![
            Expr::number(1.0),
            Expr::text("\"x\""),
            Expr::number(2.0),
            Expr::number(3.0),
        ],
    );
    let conflicts = call.conflicts(&ctx);
    assert_eq!(names(&conflicts), vec!["UnexpectedInputs"]);
    assert_eq!(conflicts[0].kind, ConflictKind::UnexpectedInputs { count: 2 });
}

#[test]
fn test_not_callable() {
    let lexicon = Lexicon::new();
    let ctx = Context::new(&lexicon);

    let call = Expr::evaluate(Expr::number(1.0), Vec::new());
    assert_eq!(names(&call.conflicts(&ctx)), vec!["NotCallable"]);
}

#[test]
fn test_abstract_structures_are_not_instantiable() {
    let area = FunctionDefinition::new("area").returns(Type::number());
    let area_id = area.id;
    let shape = StructureDefinition::new("Shape")
        .with_block(Expr::block(vec![Expr::function(area)]));
    let lexicon = lexicon(vec![Expr::structure(shape)]);
    let ctx = Context::new(&lexicon);

    let call = Expr::evaluate(Expr::reference("Shape"), Vec::new());
    let conflicts = call.conflicts(&ctx);
    assert_eq!(names(&conflicts), vec!["NotInstantiable"]);
    assert!(conflicts[0].implicates(area_id));
}

#[test]
fn test_bails_out_on_placeholders_and_ill_formed_inputs() {
    let broken = FunctionDefinition::new("broken")
        .with_input(Bind::named("a").with_value(Expr::number(1.0)))
        .with_input(Bind::named("b"));
    let lexicon = lexicon(vec![Expr::function(f()), Expr::function(broken)]);
    let ctx = Context::new(&lexicon);

    let placeholder = Expr::evaluate(Expr::reference("f"), vec![Expr::unparsable("@")]);
    let unparsable_callee = Expr::evaluate(Expr::unparsable("@"), Vec::new());
    let ill_formed = Expr::evaluate(Expr::reference("broken"), Vec::new());

    assert!(placeholder.conflicts(&ctx).is_empty());
    assert!(unparsable_callee.conflicts(&ctx).is_empty());
    assert!(ill_formed.conflicts(&ctx).is_empty());
}

#[test]
fn test_variable_length_inputs() {
    let sum = FunctionDefinition::new("sum")
        .with_input(Bind::named("numbers").typed(Type::number()).variable_length())
        .with_body(Expr::number(0.0));
    let lexicon = lexicon(vec![Expr::function(sum.clone())]);
    let ctx = Context::new(&lexicon);

    let call = Expr::evaluate(
        Expr::reference("sum"),
        vec![Expr::number(1.0), Expr::number(2.0), Expr::text("\"x\"")],
    );
    assert_eq!(names(&call.conflicts(&ctx)), vec!["IncompatibleInput"]);

    let slots = plan(as_evaluate(&call), &sum.inputs);
    assert_eq!(slots.iter().map(describe).collect::<Vec<_>>(), vec!["rest 3"]);
    assert_eq!(value_count(&slots), 3);

    let empty = Expr::evaluate(Expr::reference("sum"), Vec::new());
    let slots = plan(as_evaluate(&empty), &sum.inputs);
    assert_eq!(value_count(&slots), 0);
}

#[test]
fn test_plan_follows_declaration_order() {
    let definition = f();
    let call = Expr::evaluate(
        Expr::reference("f"),
        vec![named("b", Expr::text("\"y\"")), Expr::number(1.0)],
    );
    let slots = plan(as_evaluate(&call), &definition.inputs);
    // Required inputs take the next argument, named or not.
    assert_eq!(
        slots.iter().map(describe).collect::<Vec<_>>(),
        vec!["given \"y\"", "given 1"]
    );

    let defaulted = Expr::evaluate(Expr::reference("f"), vec![Expr::number(1.0)]);
    let slots = plan(as_evaluate(&defaulted), &definition.inputs);
    assert_eq!(
        slots.iter().map(describe).collect::<Vec<_>>(),
        vec!["given 1", "default \"b\""]
    );

    let missing = Expr::evaluate(Expr::reference("f"), Vec::new());
    let slots = plan(as_evaluate(&missing), &definition.inputs);
    assert_eq!(
        slots.iter().map(describe).collect::<Vec<_>>(),
        vec!["missing a", "default \"b\""]
    );
}

/// ƒ⸨T⸩ pair(a•T b•T) a
fn pair() -> FunctionDefinition {
    FunctionDefinition::new("pair")
        .with_type_var("T")
        .with_input(Bind::named("a").typed(Type::variable("T")))
        .with_input(Bind::named("b").typed(Type::variable("T")))
        .with_body(Expr::reference("a"))
}

#[test]
fn test_type_variables_from_siblings() {
    let lexicon = lexicon(vec![Expr::function(pair())]);
    let ctx = Context::new(&lexicon);

    let agreeing = Expr::evaluate(
        Expr::reference("pair"),
        vec![Expr::text("\"x\""), Expr::text("\"y\"")],
    );
    assert!(agreeing.conflicts(&ctx).is_empty());
    assert_eq!(ctx.type_of(&agreeing), Type::text());

    let disagreeing = Expr::evaluate(
        Expr::reference("pair"),
        vec![Expr::number(1.0), Expr::text("\"y\"")],
    );
    assert_eq!(names(&disagreeing.conflicts(&ctx)), vec!["IncompatibleInput"]);
}

#[test]
fn test_explicit_type_inputs_win() {
    let lexicon = lexicon(vec![Expr::function(pair())]);
    let ctx = Context::new(&lexicon);

    let call = Expr::evaluate_with_types(
        vec![Type::number()],
        Expr::reference("pair"),
        vec![Expr::text("\"x\""), Expr::text("\"y\"")],
    );
    assert_eq!(
        names(&call.conflicts(&ctx)),
        vec!["IncompatibleInput", "IncompatibleInput"]
    );
    assert_eq!(ctx.type_of(&call), Type::number());
}

#[test]
fn test_type_variables_from_function_outputs() {
    // ƒ⸨T⸩ call(f•ƒ() T) T
    let call = FunctionDefinition::new("call")
        .with_type_var("T")
        .with_input(Bind::named("f").typed(Type::function(Vec::new(), Type::variable("T"))))
        .returns(Type::variable("T"))
        .with_body(Expr::evaluate(Expr::reference("f"), Vec::new()));
    let seven = FunctionDefinition::new("seven").with_body(Expr::number(7.0));
    let lexicon = lexicon(vec![Expr::function(call), Expr::function(seven)]);
    let ctx = Context::new(&lexicon);

    let evaluation = Expr::evaluate(Expr::reference("call"), vec![Expr::reference("seven")]);
    assert!(evaluation.conflicts(&ctx).is_empty());
    assert_eq!(ctx.type_of(&evaluation), Type::number());
}

#[test]
fn test_type_variables_from_receivers() {
    // •Box⸨T⸩(value•T) (ƒ put(v•T) v)
    let put = FunctionDefinition::new("put")
        .with_input(Bind::named("v").typed(Type::variable("T")))
        .with_body(Expr::reference("v"));
    let boxed = StructureDefinition::new("Box")
        .with_type_var("T")
        .with_input(Bind::named("value").typed(Type::variable("T")))
        .with_block(Expr::block(vec![Expr::function(put)]));
    let lexicon = lexicon(vec![Expr::structure(boxed)]);
    let ctx = Context::new(&lexicon);

    let instance = Expr::evaluate(Expr::reference("Box"), vec![Expr::number(1.0)]);
    assert_eq!(ctx.type_of(&instance).to_string(), "Box⸨#⸩");

    let call = Expr::evaluate(
        Expr::access(instance, "put"),
        vec![Expr::text("\"x\"")],
    );
    assert_eq!(names(&call.conflicts(&ctx)), vec!["IncompatibleInput"]);
}

#[test]
fn test_bind_covers_every_alias() {
    let inputs = vec![
        Bind::named("a").with_alias(crate::node::Name::localized("eh", "fr")),
        Bind::named("rest").variable_length(),
    ];
    let values = vec![Value::number(1.0), Value::number(2.0), Value::number(3.0)];

    let bindings = bind(&inputs, values).unwrap();
    assert_eq!(bindings.get("a"), Some(&Value::number(1.0)));
    assert_eq!(bindings.get("eh"), Some(&Value::number(1.0)));
    assert_eq!(
        bindings.get("rest"),
        Some(&Value::List(vec![Value::number(2.0), Value::number(3.0)]))
    );
}

#[test]
fn test_bind_without_enough_values() {
    let inputs = vec![Bind::named("a"), Bind::named("b")];
    let error = bind(&inputs, vec![Value::number(1.0)]).unwrap_err();
    assert_eq!(error.kind, ExceptionKind::MissingValue { name: "b".into() });
}
