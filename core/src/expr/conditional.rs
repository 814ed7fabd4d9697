use super::{Expr, Expression};
use crate::conflict::{Conflict, ConflictKind};
use crate::context::Context;
use crate::node::{Node, NodeId, NodeRef, Replace, Replacement, Token};
use crate::types::{Type, UnknownReason};
use crate::values::Value;
use crate::vm::{Evaluator, Instruction, Instructions};
use crate::{Rc, Vec, vec};

/// `condition ? yes no`
#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    pub id: NodeId,
    pub condition: Expr,
    pub question: Token,
    pub yes: Expr,
    pub no: Expr,
}

impl Node for Conditional {
    fn id(&self) -> NodeId {
        self.id
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        vec![
            NodeRef::Expr(&self.condition),
            NodeRef::Token(&self.question),
            NodeRef::Expr(&self.yes),
            NodeRef::Expr(&self.no),
        ]
    }
}

impl Replace for Conditional {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        Self {
            id: self.id,
            condition: self.condition.replace(target, with),
            question: self.question.replace(target, with),
            yes: self.yes.replace(target, with),
            no: self.no.replace(target, with),
        }
    }
}

impl Expression for Conditional {
    fn conflicts(&self, ctx: &Context) -> Vec<Conflict> {
        let mut conflicts = Vec::new();

        let condition = ctx.type_of(&self.condition);
        if !condition.is_unknown() && !Type::Boolean.accepts(&condition, ctx) {
            conflicts.push(Conflict::new(
                ConflictKind::ExpectedBooleanCondition { ty: condition },
                [self.condition.id()],
            ));
        }

        // Placeholder branches have no type to compare.
        if !self.yes.is_unparsable() && !self.no.is_unparsable() {
            let yes = ctx.type_of(&self.yes);
            let no = ctx.type_of(&self.no);
            if !yes.is_unknown() && !no.is_unknown() && !yes.is_compatible(&no, ctx) {
                conflicts.push(
                    Conflict::new(ConflictKind::IncompatibleBranches { yes, no }, [self.yes.id()])
                        .with_secondary([self.no.id()]),
                );
            }
        }

        conflicts
    }

    /// The type of the yes branch.
    fn compute_type(self: &Rc<Self>, ctx: &Context) -> Type {
        if self.yes.is_unparsable() {
            return Type::unknown(UnknownReason::Unparsable, Some(self.yes.id()));
        }
        ctx.type_of(&self.yes)
    }

    /// `condition… JumpIfFalse(|yes|) yes… Jump(|no|) no…`
    ///
    /// The conditional itself contributes no start or finish marker.
    fn lower(self: &Rc<Self>, ctx: &Context) -> Instructions {
        let yes = self.yes.lower(ctx);
        let no = self.no.lower(ctx);

        let mut instructions = self.condition.lower(ctx);
        instructions.push(Instruction::JumpIfFalse {
            distance: yes.len(),
            node: self.id,
        });
        instructions.append(yes);
        instructions.push(Instruction::Jump {
            distance: no.len(),
            node: self.id,
        });
        instructions.append(no);
        instructions
    }

    fn execute(self: &Rc<Self>, _evaluator: &mut Evaluator<'_>) -> Option<Value> {
        None
    }
}
