use super::{Expr, Expression, finish, start};
use crate::conflict::Conflict;
use crate::context::Context;
use crate::node::{Bind, Node, NodeId, NodeRef, Replace, Replacement};
use crate::types::{Type, UnknownReason};
use crate::values::{ExceptionKind, Value};
use crate::vm::{Evaluator, Halt, HaltKind, Instruction, Instructions};
use crate::{Rc, Vec};

/// Statements evaluated in order; the block's value is the last one's.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: NodeId,
    pub statements: Vec<Expr>,
}

impl Node for Block {
    fn id(&self) -> NodeId {
        self.id
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        self.statements.iter().map(NodeRef::Expr).collect()
    }
}

impl Replace for Block {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        Self {
            id: self.id,
            statements: self.statements.replace(target, with),
        }
    }
}

impl Expression for Block {
    fn conflicts(&self, _ctx: &Context) -> Vec<Conflict> {
        Vec::new()
    }

    fn compute_type(self: &Rc<Self>, ctx: &Context) -> Type {
        match self.statements.last() {
            Some(last) => ctx.type_of(last),
            None => Type::unknown(UnknownReason::Unspecified, Some(self.id)),
        }
    }

    fn lower(self: &Rc<Self>, ctx: &Context) -> Instructions {
        let mut instructions = Instructions::new();
        instructions.push(start(self));
        for statement in &self.statements {
            instructions.append(statement.lower(ctx));
        }
        instructions.push(finish(self));
        instructions
    }

    /// Every statement leaves one value; all but the last are discarded.
    fn execute(self: &Rc<Self>, evaluator: &mut Evaluator<'_>) -> Option<Value> {
        let mut last = None;
        for _ in 0..self.statements.len() {
            let value = pop_or_return!(evaluator);
            last.get_or_insert(value);
        }
        let value = last.unwrap_or_else(|| {
            Value::Exception(evaluator.exception(ExceptionKind::NoValue).at(self.id))
        });
        Some(value)
    }
}

/// A bind statement, `name: value`, binding every alias in the current
/// frame.
impl Expression for Bind {
    fn conflicts(&self, ctx: &Context) -> Vec<Conflict> {
        Bind::conflicts(self, ctx)
    }

    fn compute_type(self: &Rc<Self>, ctx: &Context) -> Type {
        self.ty(ctx)
    }

    fn lower(self: &Rc<Self>, ctx: &Context) -> Instructions {
        let mut instructions = Instructions::new();
        instructions.push(start(self));
        match &self.value {
            Some(value) => instructions.append(value.lower(ctx)),
            None => instructions.push(Instruction::Halt(Halt::new(
                self.id,
                HaltKind::MissingValue {
                    name: self.primary_name().into(),
                },
            ))),
        }
        instructions.push(finish(self));
        instructions
    }

    fn execute(self: &Rc<Self>, evaluator: &mut Evaluator<'_>) -> Option<Value> {
        let value = pop_or_return!(evaluator);
        for name in self.names() {
            evaluator.bind(name, value.clone());
        }
        Some(value)
    }
}
