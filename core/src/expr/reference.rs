use super::{Expr, Expression, finish, start};
use crate::conflict::{Conflict, ConflictKind};
use crate::context::Context;
use crate::node::{Node, NodeId, NodeRef, Replace, Replacement, Token};
use crate::types::{Type, UnknownReason};
use crate::values::{ExceptionKind, FunctionValue, Value};
use crate::vm::{Evaluator, Instructions};
use crate::{Rc, Vec, vec};

/// A name standing for whatever it is bound to.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub id: NodeId,
    pub name: Token,
}

impl Reference {
    pub fn name(&self) -> &str {
        self.name.text()
    }
}

impl Node for Reference {
    fn id(&self) -> NodeId {
        self.id
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        vec![NodeRef::Token(&self.name)]
    }
}

impl Replace for Reference {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        Self {
            id: self.id,
            name: self.name.replace(target, with),
        }
    }
}

impl Expression for Reference {
    fn conflicts(&self, ctx: &Context) -> Vec<Conflict> {
        match ctx.resolve(self.name()) {
            Some(_) => Vec::new(),
            None => vec![Conflict::new(
                ConflictKind::UnknownName {
                    name: self.name().into(),
                },
                [self.id],
            )],
        }
    }

    fn compute_type(self: &Rc<Self>, ctx: &Context) -> Type {
        match ctx.resolve(self.name()) {
            Some(definition) => definition.ty(ctx),
            None => Type::unknown(
                UnknownReason::UnknownName(self.name().into()),
                Some(self.id),
            ),
        }
    }

    fn lower(self: &Rc<Self>, _ctx: &Context) -> Instructions {
        Instructions::from(vec![finish(self)])
    }

    fn execute(self: &Rc<Self>, evaluator: &mut Evaluator<'_>) -> Option<Value> {
        let value = evaluator.lookup(self.name()).unwrap_or_else(|| {
            Value::Exception(
                evaluator
                    .exception(ExceptionKind::UnknownName {
                        name: self.name().into(),
                    })
                    .at(self.id),
            )
        });
        Some(value)
    }
}

/// `subject.name`: a member of a structure value.
#[derive(Debug, Clone, PartialEq)]
pub struct Access {
    pub id: NodeId,
    pub subject: Expr,
    pub dot: Token,
    pub name: Token,
}

impl Access {
    pub fn name(&self) -> &str {
        self.name.text()
    }
}

impl Node for Access {
    fn id(&self) -> NodeId {
        self.id
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        vec![
            NodeRef::Expr(&self.subject),
            NodeRef::Token(&self.dot),
            NodeRef::Token(&self.name),
        ]
    }
}

impl Replace for Access {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        Self {
            id: self.id,
            subject: self.subject.replace(target, with),
            dot: self.dot.replace(target, with),
            name: self.name.replace(target, with),
        }
    }
}

impl Expression for Access {
    /// Only members of known structures can be checked.
    fn conflicts(&self, ctx: &Context) -> Vec<Conflict> {
        let Type::Structure(structure) = ctx.type_of(&self.subject).resolve_names(ctx) else {
            return Vec::new();
        };
        match structure.member_type(self.name(), ctx) {
            Some(_) => Vec::new(),
            None => vec![Conflict::new(
                ConflictKind::UnknownName {
                    name: self.name().into(),
                },
                [self.id],
            )],
        }
    }

    fn compute_type(self: &Rc<Self>, ctx: &Context) -> Type {
        let unknown = || {
            Type::unknown(
                UnknownReason::UnknownName(self.name().into()),
                Some(self.id),
            )
        };
        match ctx.type_of(&self.subject).resolve_names(ctx) {
            Type::Structure(structure) => structure
                .member_type(self.name(), ctx)
                .unwrap_or_else(unknown),
            _ => unknown(),
        }
    }

    fn lower(self: &Rc<Self>, ctx: &Context) -> Instructions {
        let mut instructions = Instructions::new();
        instructions.push(start(self));
        instructions.append(self.subject.lower(ctx));
        instructions.push(finish(self));
        instructions
    }

    fn execute(self: &Rc<Self>, evaluator: &mut Evaluator<'_>) -> Option<Value> {
        let instance = match pop_or_return!(evaluator) {
            Value::Structure(instance) => instance,
            other => {
                let exception = evaluator
                    .exception(ExceptionKind::TypeMismatch {
                        expected: "structure",
                        received: other.kind(),
                    })
                    .at(self.id);
                return Some(Value::Exception(exception));
            }
        };

        if let Some(value) = instance.scope.bindings().get(self.name()) {
            return Some(value.clone());
        }
        if let Some(function) = instance.definition.function_named(self.name()) {
            return Some(Value::Function(FunctionValue {
                definition: function.clone(),
                scope: instance.scope.clone(),
            }));
        }
        let exception = evaluator
            .exception(ExceptionKind::UnknownName {
                name: self.name().into(),
            })
            .at(self.id);
        Some(Value::Exception(exception))
    }
}
