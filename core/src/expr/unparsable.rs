use super::Expression;
use crate::conflict::Conflict;
use crate::context::Context;
use crate::node::{Node, NodeId, NodeRef, Replace, Replacement, Token};
use crate::types::{Type, UnknownReason};
use crate::values::Value;
use crate::vm::{Evaluator, Halt, HaltKind, Instruction, Instructions};
use crate::{Rc, Vec, vec};

/// Tokens the parser could not make sense of, standing in for an
/// expression. The parser reports them; analysis stays quiet about them.
#[derive(Debug, Clone, PartialEq)]
pub struct Unparsable {
    pub id: NodeId,
    pub tokens: Vec<Token>,
}

impl Node for Unparsable {
    fn id(&self) -> NodeId {
        self.id
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        self.tokens.iter().map(NodeRef::Token).collect()
    }
}

impl Replace for Unparsable {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        Self {
            id: self.id,
            tokens: self.tokens.replace(target, with),
        }
    }
}

impl Expression for Unparsable {
    fn conflicts(&self, _ctx: &Context) -> Vec<Conflict> {
        Vec::new()
    }

    fn compute_type(self: &Rc<Self>, _ctx: &Context) -> Type {
        Type::unknown(UnknownReason::Unparsable, Some(self.id))
    }

    fn lower(self: &Rc<Self>, _ctx: &Context) -> Instructions {
        Instructions::from(vec![Instruction::Halt(Halt::new(
            self.id,
            HaltKind::Unparsable,
        ))])
    }

    fn execute(self: &Rc<Self>, _evaluator: &mut Evaluator<'_>) -> Option<Value> {
        None
    }
}
