use super::{Expr, Expression, finish, start};
use crate::conflict::Conflict;
use crate::context::Context;
use crate::node::{Node, NodeId, NodeRef, Replace, Replacement, Token};
use crate::types::{Type, UnknownReason, union_of};
use crate::values::Value;
use crate::vm::{Evaluator, Instructions};
use crate::{Rc, Vec};

#[derive(Debug, Clone, PartialEq)]
pub struct ListLiteral {
    pub id: NodeId,
    pub open: Token,
    pub values: Vec<Expr>,
    pub close: Token,
}

impl Node for ListLiteral {
    fn id(&self) -> NodeId {
        self.id
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        let mut children = Vec::with_capacity(self.values.len() + 2);
        children.push(NodeRef::Token(&self.open));
        children.extend(self.values.iter().map(NodeRef::Expr));
        children.push(NodeRef::Token(&self.close));
        children
    }
}

impl Replace for ListLiteral {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        Self {
            id: self.id,
            open: self.open.replace(target, with),
            values: self.values.replace(target, with),
            close: self.close.replace(target, with),
        }
    }
}

impl Expression for ListLiteral {
    fn conflicts(&self, _ctx: &Context) -> Vec<Conflict> {
        Vec::new()
    }

    /// A list of the union of its element types; an empty list's element
    /// type is unknown.
    fn compute_type(self: &Rc<Self>, ctx: &Context) -> Type {
        let items = self
            .values
            .iter()
            .filter(|value| !value.is_unparsable())
            .map(|value| ctx.type_of(value));
        let item = union_of(items, ctx)
            .unwrap_or_else(|| Type::unknown(UnknownReason::NoElements, Some(self.id)));
        Type::list(item)
    }

    fn lower(self: &Rc<Self>, ctx: &Context) -> Instructions {
        let mut instructions = Instructions::new();
        instructions.push(start(self));
        for value in &self.values {
            instructions.append(value.lower(ctx));
        }
        instructions.push(finish(self));
        instructions
    }

    fn execute(self: &Rc<Self>, evaluator: &mut Evaluator<'_>) -> Option<Value> {
        let mut items = Vec::with_capacity(self.values.len());
        for _ in 0..self.values.len() {
            items.push(pop_or_return!(evaluator));
        }
        items.reverse();
        Some(Value::List(items))
    }
}
