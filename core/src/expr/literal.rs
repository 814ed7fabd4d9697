use super::{Expression, finish};
use crate::conflict::Conflict;
use crate::context::Context;
use crate::node::{Node, NodeId, NodeRef, Replace, Replacement, Token};
use crate::types::{Type, Unit};
use crate::values::Value;
use crate::vm::{Evaluator, Instructions};
use crate::{Rc, Vec, vec};

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLiteral {
    pub id: NodeId,
    pub token: Token,
    pub value: bool,
}

impl Node for BooleanLiteral {
    fn id(&self) -> NodeId {
        self.id
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        vec![NodeRef::Token(&self.token)]
    }
}

impl Replace for BooleanLiteral {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        Self {
            id: self.id,
            token: self.token.replace(target, with),
            value: self.value,
        }
    }
}

impl Expression for BooleanLiteral {
    fn conflicts(&self, _ctx: &Context) -> Vec<Conflict> {
        Vec::new()
    }

    fn compute_type(self: &Rc<Self>, _ctx: &Context) -> Type {
        Type::Boolean
    }

    fn lower(self: &Rc<Self>, _ctx: &Context) -> Instructions {
        Instructions::from(vec![finish(self)])
    }

    fn execute(self: &Rc<Self>, _evaluator: &mut Evaluator<'_>) -> Option<Value> {
        Some(Value::Boolean(self.value))
    }
}

/// A number with an optional unit, like `3m`.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteral {
    pub id: NodeId,
    pub token: Token,
    pub amount: f64,
    pub unit: Unit,
}

impl Node for NumberLiteral {
    fn id(&self) -> NodeId {
        self.id
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        vec![NodeRef::Token(&self.token)]
    }
}

impl Replace for NumberLiteral {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        Self {
            id: self.id,
            token: self.token.replace(target, with),
            amount: self.amount,
            unit: self.unit.clone(),
        }
    }
}

impl Expression for NumberLiteral {
    fn conflicts(&self, _ctx: &Context) -> Vec<Conflict> {
        Vec::new()
    }

    fn compute_type(self: &Rc<Self>, _ctx: &Context) -> Type {
        Type::measure(self.unit.clone())
    }

    fn lower(self: &Rc<Self>, _ctx: &Context) -> Instructions {
        Instructions::from(vec![finish(self)])
    }

    fn execute(self: &Rc<Self>, _evaluator: &mut Evaluator<'_>) -> Option<Value> {
        Some(Value::measure(self.amount, self.unit.clone()))
    }
}
