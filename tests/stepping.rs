/*
 * Driving the evaluator by hand: stepping granularity, frame inspection and
 * stream injection between passes.
 */

mod cases;

use cases::fib;
use pretty_assertions::assert_eq;
use quill::{
    BinaryOperator, Context, ExecutionOptions, Expr, Instruction, Program, Step, Type, Value,
};

#[test]
fn test_single_steps_follow_the_listing() {
    let program = Program::new(Expr::list(vec![Expr::number(1.0), Expr::number(2.0)]));
    let lexicon = program.lexicon();
    let context = Context::new(&lexicon);
    let listing = program.lower(&context);

    let mut evaluator = program.evaluator(&context, ExecutionOptions::default());
    for instruction in listing.iter() {
        assert_eq!(evaluator.current_frame().and_then(|frame| frame.current()), Some(instruction));
        evaluator.step();
        assert_eq!(evaluator.active_node(), Some(instruction.node()));
    }
    assert!(evaluator.is_done());
    assert_eq!(
        evaluator.step(),
        Step::Produced(Value::List(vec![Value::number(1.0), Value::number(2.0)]))
    );
}

#[test]
fn test_boundaries_skip_jumps() {
    let program = Program::new(Expr::conditional(
        Expr::boolean(false),
        Expr::number(1.0),
        Expr::number(2.0),
    ));
    let lexicon = program.lexicon();
    let context = Context::new(&lexicon);
    let listing = program.lower(&context);

    let mut evaluator = program.evaluator(&context, ExecutionOptions::default());
    let mut boundaries = 0;
    let outcome = loop {
        let step = evaluator.step_to_boundary();
        if step != Step::Running {
            break step;
        }
        boundaries += 1;
    };
    assert_eq!(outcome, Step::Produced(Value::number(2.0)));
    // The condition, then the no branch; the final boundary ends the pass.
    assert_eq!(boundaries, 1);
    assert_eq!(
        listing.iter().filter(|instruction| instruction.is_boundary()).count(),
        3
    );
    assert!(matches!(listing[1], Instruction::JumpIfFalse { .. }));
}

#[test]
fn test_frames_grow_with_recursion() {
    let program = Program::new(Expr::block(vec![
        Expr::function(fib()),
        Expr::evaluate(Expr::reference("fib"), vec![Expr::number(5.0)]),
    ]));
    let lexicon = program.lexicon();
    let context = Context::new(&lexicon);

    let mut evaluator = program.evaluator(&context, ExecutionOptions::default());
    let mut deepest = 0;
    let outcome = loop {
        let step = evaluator.step();
        deepest = deepest.max(evaluator.frames().len());
        if step != Step::Running {
            break step;
        }
    };
    assert_eq!(outcome, Step::Produced(Value::number(5.0)));
    // The program frame plus fib(5) down to fib(1).
    assert_eq!(deepest, 6);
}

#[test]
fn test_streams_change_between_passes() {
    let program = Program::new(Expr::binary(
        Expr::reference("temperature"),
        BinaryOperator::Multiply,
        Expr::number(2.0),
    ));
    let mut lexicon = program.lexicon();
    lexicon.declare_stream("temperature", Type::number());
    let context = Context::new(&lexicon);
    assert!(program.conflicts(&context).is_empty());

    let mut evaluator = program.evaluator(&context, ExecutionOptions::default());
    evaluator.inject("temperature", Value::number(20.0));
    // Nothing was applied to the pass already underway.
    assert!(matches!(evaluator.run(), Step::Halted(_)));

    evaluator.begin_pass(program.root());
    assert_eq!(evaluator.run(), Step::Produced(Value::number(40.0)));

    evaluator.inject("temperature", Value::number(21.0));
    evaluator.inject("temperature", Value::number(22.0));
    evaluator.begin_pass(program.root());
    assert_eq!(evaluator.run(), Step::Produced(Value::number(44.0)));
    assert_eq!(evaluator.stream_value("temperature"), Some(&Value::number(22.0)));
}
