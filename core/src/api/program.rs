use super::{Error, ExecutionOptions};
use crate::conflict::{self, Conflict};
use crate::context::{Context, Lexicon};
use crate::expr::Expr;
use crate::values::{Exception, ExceptionKind, Value};
use crate::vm::{Evaluator, Instructions, Step};
use crate::Vec;
use tracing::debug;

/// A program tree together with the operations hosts run on it.
///
/// # Example
///
/// ```
/// use quill_core::{Context, Expr, ExecutionOptions, Program, Value};
///
/// let program = Program::new(Expr::list(vec![Expr::number(1.0), Expr::number(2.0)]));
/// let lexicon = program.lexicon();
/// let context = Context::new(&lexicon);
///
/// let value = program.run(&context, ExecutionOptions::default()).unwrap();
/// assert_eq!(value, Value::List(vec![Value::number(1.0), Value::number(2.0)]));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    root: Expr,
}

impl Program {
    pub fn new(root: Expr) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Expr {
        &self.root
    }

    /// The declarations made in the program itself.
    pub fn lexicon(&self) -> Lexicon {
        Lexicon::collect(&self.root)
    }

    pub fn conflicts(&self, ctx: &Context) -> Vec<Conflict> {
        conflict::analyze(&self.root, ctx)
    }

    /// Fails when analysis finds any conflict that is not minor.
    pub fn check(&self, ctx: &Context) -> Result<(), Error> {
        let conflicts = self.conflicts(ctx);
        if conflicts.iter().all(Conflict::is_minor) {
            return Ok(());
        }
        debug!(conflicts = conflicts.len(), "program has conflicts");
        Err(Error::Conflicts {
            diagnostics: conflicts.iter().map(Conflict::to_diagnostic).collect(),
        })
    }

    pub fn lower(&self, ctx: &Context) -> Instructions {
        self.root.lower(ctx)
    }

    /// An evaluator with a pass over this program already begun.
    pub fn evaluator<'c>(&self, ctx: &'c Context<'c>, options: ExecutionOptions) -> Evaluator<'c> {
        let mut evaluator = Evaluator::new(ctx, options);
        evaluator.begin_pass(&self.root);
        evaluator
    }

    /// Checks the program, then evaluates it to completion.
    pub fn run<'c>(&self, ctx: &'c Context<'c>, options: ExecutionOptions) -> Result<Value, Error> {
        self.check(ctx)?;
        match self.evaluator(ctx, options).run() {
            Step::Produced(value) => Ok(value),
            Step::Halted(exception) => Err(Error::from(exception)),
            // `run` only returns once the pass is over.
            Step::Running => Err(Error::Exception(Exception::new(ExceptionKind::NoValue))),
        }
    }
}
