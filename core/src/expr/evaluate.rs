use super::{Expr, Expression, finish, start};
use crate::binder::{self, Callee, Slot};
use crate::conflict::Conflict;
use crate::context::Context;
use crate::node::{Node, NodeId, NodeRef, Replace, Replacement, Token, TypeInput};
use crate::types::Type;
use crate::values::{ExceptionKind, Value};
use crate::vm::{Evaluator, Halt, HaltKind, Instruction, Instructions};
use crate::{Rc, Vec, vec};
use tracing::trace;

/// Evaluation of a function or structure definition: `f⸨T⸩(a b: 1)`.
///
/// Given inputs are either plain expressions or named arguments, which are
/// binds carrying the argument's value.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluate {
    pub id: NodeId,
    pub type_inputs: Vec<TypeInput>,
    pub func: Expr,
    pub open: Token,
    pub inputs: Vec<Expr>,
    pub close: Token,
}

impl Evaluate {
    fn halt(&self, kind: HaltKind) -> Instructions {
        Instructions::from(vec![Instruction::Halt(Halt::new(self.id, kind))])
    }
}

impl Node for Evaluate {
    fn id(&self) -> NodeId {
        self.id
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        let mut children: Vec<NodeRef<'_>> =
            self.type_inputs.iter().map(NodeRef::TypeInput).collect();
        children.push(NodeRef::Expr(&self.func));
        children.push(NodeRef::Token(&self.open));
        children.extend(self.inputs.iter().map(NodeRef::Expr));
        children.push(NodeRef::Token(&self.close));
        children
    }
}

impl Replace for Evaluate {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        Self {
            id: self.id,
            type_inputs: self.type_inputs.replace(target, with),
            func: self.func.replace(target, with),
            open: self.open.replace(target, with),
            inputs: self.inputs.replace(target, with),
            close: self.close.replace(target, with),
        }
    }
}

impl Expression for Evaluate {
    fn conflicts(&self, ctx: &Context) -> Vec<Conflict> {
        binder::check(self, ctx)
    }

    fn compute_type(self: &Rc<Self>, ctx: &Context) -> Type {
        binder::output_type(self, ctx)
    }

    /// `Start arguments… callee Finish`, one argument per declared input in
    /// declaration order. Anything that cannot be evaluated lowers to a halt
    /// in its place.
    fn lower(self: &Rc<Self>, ctx: &Context) -> Instructions {
        let callee_type = ctx.type_of(&self.func);
        let Some(callee) = Callee::of(&callee_type) else {
            return self.halt(HaltKind::NotCallable {
                callee: self.func.describe(),
            });
        };
        if self.func.is_unparsable() || self.inputs.iter().any(Expr::is_unparsable) {
            return self.halt(HaltKind::Unparsable);
        }

        let mut instructions = Instructions::new();
        instructions.push(start(self));
        for slot in binder::plan(self, callee.inputs()) {
            match slot {
                Slot::Given(value) | Slot::Default(value) => instructions.append(value.lower(ctx)),
                Slot::Missing(input) => {
                    instructions.push(Instruction::Halt(Halt::new(
                        self.id,
                        HaltKind::MissingInput {
                            name: input.primary_name().into(),
                        },
                    )));
                }
                Slot::Rest(values) => {
                    for value in values {
                        instructions.append(value.lower(ctx));
                    }
                }
            }
        }
        instructions.append(self.func.lower(ctx));
        instructions.push(finish(self));
        instructions
    }

    fn execute(self: &Rc<Self>, evaluator: &mut Evaluator<'_>) -> Option<Value> {
        let callee = pop_or_return!(evaluator);
        let inputs = match &callee {
            Value::Function(function) => function.definition.inputs.clone(),
            Value::StructureDefinition(structure) => structure.definition.inputs.clone(),
            _ => {
                let exception = evaluator
                    .exception(ExceptionKind::NotCallable {
                        name: self.func.describe(),
                    })
                    .at(self.id);
                return Some(Value::Exception(exception));
            }
        };

        let count = binder::value_count(&binder::plan(self, &inputs));
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(pop_or_return!(evaluator));
        }
        values.reverse();

        let bindings = match binder::bind(&inputs, values) {
            Ok(bindings) => bindings,
            Err(exception) => return Some(Value::Exception(exception.at(self.id))),
        };
        trace!(callee = %self.func.describe(), inputs = bindings.len(), "evaluating");

        let started = match callee {
            Value::Function(function) => evaluator.call_function(function, bindings),
            Value::StructureDefinition(structure) => evaluator.instantiate(structure, bindings),
            _ => Ok(()),
        };
        match started {
            Ok(()) => None,
            Err(exception) => Some(Value::Exception(exception.at(self.id))),
        }
    }
}
