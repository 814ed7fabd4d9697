/*
 * Static analysis through the public facade: conflicts, diagnostics, types
 * and instruction listings.
 */

mod cases;

use cases::{greet, without_ids};
use pretty_assertions::assert_eq;
use quill::{
    Bind, Context, Error, Expr, FunctionDefinition, Name, Program, Severity, StructureDefinition,
    Type,
};

fn conflict_names(program: &Program) -> Vec<&'static str> {
    let lexicon = program.lexicon();
    let context = Context::new(&lexicon);
    program
        .conflicts(&context)
        .iter()
        .map(|conflict| conflict.name())
        .collect()
}

#[test]
fn test_well_formed_program_has_no_conflicts() {
    let program = Program::new(Expr::block(vec![
        Expr::function(greet()),
        Expr::evaluate(Expr::reference("greet"), vec![Expr::text("\"Ada\"")]),
    ]));
    assert_eq!(conflict_names(&program), Vec::<&str>::new());

    let lexicon = program.lexicon();
    let context = Context::new(&lexicon);
    assert_eq!(program.check(&context), Ok(()));
    assert_eq!(context.type_of(program.root()), Type::text());
}

#[test]
fn test_conflicts_are_found_anywhere_in_the_tree() {
    let program = Program::new(Expr::block(vec![
        Expr::function(greet()),
        Expr::list(vec![
            Expr::evaluate(Expr::reference("greet"), Vec::new()),
            Expr::conditional(Expr::number(1.0), Expr::text("\"a\""), Expr::text("\"b\"")),
            Expr::reference("missing"),
        ]),
    ]));
    assert_eq!(
        conflict_names(&program),
        vec!["MissingInput", "ExpectedBooleanCondition", "UnknownName"]
    );
}

#[test]
fn test_check_reports_diagnostics() {
    let call = Expr::evaluate(
        Expr::reference("greet"),
        vec![Expr::text("\"Ada\""), Expr::number(1.0)],
    );
    let program = Program::new(Expr::block(vec![Expr::function(greet()), call]));
    let lexicon = program.lexicon();
    let context = Context::new(&lexicon);

    let Err(Error::Conflicts { diagnostics }) = program.check(&context) else {
        panic!("expected conflicts");
    };
    assert_eq!(diagnostics.len(), 1);
    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.severity, Severity::Error);
    assert_eq!(diagnostic.code.as_deref(), Some("C006"));
    assert_eq!(diagnostic.message, "greeting expects '', but was given #");
    assert_eq!(diagnostic.related.len(), 1);
}

#[test]
fn test_duplicate_languages_do_not_block_evaluation() {
    let bind = Bind::named("hello")
        .with_alias(Name::localized("bonjour", "fr"))
        .with_alias(Name::localized("salut", "fr"))
        .with_value(Expr::number(1.0));
    let program = Program::new(Expr::block(vec![Expr::bind(bind), Expr::reference("salut")]));
    let lexicon = program.lexicon();
    let context = Context::new(&lexicon);

    let conflicts = program.conflicts(&context);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].name(), "DuplicateLanguages");
    assert_eq!(conflicts[0].to_diagnostic().severity, Severity::Warning);
    assert_eq!(program.check(&context), Ok(()));
}

#[test]
fn test_ill_formed_definitions() {
    let program = Program::new(Expr::block(vec![
        Expr::function(
            FunctionDefinition::new("f")
                .with_input(Bind::named("rest").variable_length())
                .with_input(Bind::named("last"))
                .with_body(Expr::number(1.0)),
        ),
        Expr::evaluate(Expr::reference("f"), vec![Expr::number(1.0)]),
    ]));
    // The call itself is not analyzed against an ill-formed input list.
    assert_eq!(conflict_names(&program), vec!["VariableLengthNotLast", "RequiredAfterOptional"]);
}

#[test]
fn test_structures_with_abstract_functions() {
    let shape = StructureDefinition::new("Shape").with_block(Expr::block(vec![Expr::function(
        FunctionDefinition::new("area").returns(Type::number()),
    )]));
    let program = Program::new(Expr::block(vec![
        Expr::structure(shape),
        Expr::evaluate(Expr::reference("Shape"), Vec::new()),
    ]));
    assert_eq!(conflict_names(&program), vec!["NotInstantiable"]);
}

#[test]
fn test_lowering_listing() {
    let program = Program::new(Expr::conditional(
        Expr::boolean(true),
        Expr::number(1.0),
        Expr::list(vec![Expr::number(2.0)]),
    ));
    let lexicon = program.lexicon();
    let context = Context::new(&lexicon);

    let listing = format!("{:?}", program.lower(&context));
    assert_eq!(
        without_ids(&listing),
        "Instructions {
       0       Finish Boolean
       1       JumpIfFalse +1 (to L0)
       2       Finish Number
       3       Jump +3 (to L1)
       4  L0:  Start List
       5       Finish Number
       6       Finish List
}"
    );
}
