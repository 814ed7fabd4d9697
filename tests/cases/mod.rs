#![allow(dead_code)]

use quill::{BinaryOperator, Bind, Expr, FunctionDefinition, StructureDefinition, Type};

/// Initialize tracing output for a test; safe to call more than once.
pub fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

/// Instruction listings with node ids removed, so they can be compared
/// across runs.
pub fn without_ids(listing: &str) -> String {
    let mut out = String::with_capacity(listing.len());
    let mut chars = listing.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '#' && chars.peek().is_some_and(char::is_ascii_digit) {
            while chars.peek().is_some_and(char::is_ascii_digit) {
                chars.next();
            }
            continue;
        }
        out.push(c);
    }
    out
}

/// ƒ greet(name•'' greeting•'': "hi") greeting
pub fn greet() -> FunctionDefinition {
    FunctionDefinition::new("greet")
        .with_input(Bind::named("name").typed(Type::text()))
        .with_input(
            Bind::named("greeting")
                .typed(Type::text())
                .with_value(Expr::text("\"hi\"")),
        )
        .with_body(Expr::reference("greeting"))
}

/// ƒ fib(n•#) n < 2 ? n fib(n - 1) + fib(n - 2)
pub fn fib() -> FunctionDefinition {
    let call = |offset: f64| {
        Expr::evaluate(
            Expr::reference("fib"),
            vec![Expr::binary(
                Expr::reference("n"),
                BinaryOperator::Subtract,
                Expr::number(offset),
            )],
        )
    };
    FunctionDefinition::new("fib")
        .with_input(Bind::named("n").typed(Type::number()))
        .with_body(Expr::conditional(
            Expr::binary(Expr::reference("n"), BinaryOperator::Less, Expr::number(2.0)),
            Expr::reference("n"),
            Expr::binary(call(1.0), BinaryOperator::Add, call(2.0)),
        ))
}

/// •Counter(count•#) (ƒ next() Counter(count + 1))
pub fn counter() -> StructureDefinition {
    StructureDefinition::new("Counter")
        .with_input(Bind::named("count").typed(Type::number()))
        .with_block(Expr::block(vec![Expr::function(
            FunctionDefinition::new("next").with_body(Expr::evaluate(
                Expr::reference("Counter"),
                vec![Expr::binary(
                    Expr::reference("count"),
                    BinaryOperator::Add,
                    Expr::number(1.0),
                )],
            )),
        )]))
}
