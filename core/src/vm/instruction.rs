use crate::expr::Expr;
use crate::node::NodeId;
use crate::values::{Exception, ExceptionKind};
use crate::vm::Evaluator;
use core::fmt;
use ecow::EcoString;

/// One element of a lowered expression.
///
/// Jumps are relative to the instruction after the jump. A `JumpIfFalse`
/// that is taken also skips the instruction at its landing point, which is
/// the `Jump` closing the branch it guards.
#[derive(Clone, PartialEq)]
pub enum Instruction {
    /// Marks the start of a node's evaluation. Executes nothing.
    Start(Expr),
    /// Executes the node, consuming its operands from the value stack.
    Finish(Expr),
    Jump { distance: usize, node: NodeId },
    /// Pops a boolean; when it is false, skips `distance + 1` instructions.
    JumpIfFalse { distance: usize, node: NodeId },
    /// Ends evaluation with an exception built when it executes.
    Halt(Halt),
}

impl Instruction {
    /// The node this instruction belongs to.
    pub fn node(&self) -> NodeId {
        match self {
            Instruction::Start(expr) | Instruction::Finish(expr) => expr.id(),
            Instruction::Jump { node, .. } | Instruction::JumpIfFalse { node, .. } => *node,
            Instruction::Halt(halt) => halt.node,
        }
    }

    /// Start and finish markers are the boundaries stepping can stop at.
    pub fn is_boundary(&self) -> bool {
        matches!(self, Instruction::Start(_) | Instruction::Finish(_))
    }

    /// Where a jump at `address` lands when taken.
    pub fn jump_target(&self, address: usize) -> Option<usize> {
        match self {
            Instruction::Jump { distance, .. } => Some(address + 1 + distance),
            Instruction::JumpIfFalse { distance, .. } => Some(address + 2 + distance),
            _ => None,
        }
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Start(expr) => write!(f, "Start {}{}", expr.kind_name(), expr.id()),
            Instruction::Finish(expr) => write!(f, "Finish {}{}", expr.kind_name(), expr.id()),
            Instruction::Jump { distance, .. } => write!(f, "Jump +{distance}"),
            Instruction::JumpIfFalse { distance, .. } => write!(f, "JumpIfFalse +{distance}"),
            Instruction::Halt(halt) => write!(f, "Halt {:?}", halt.kind),
        }
    }
}

/// A deferred failure: the exception is only built when the halt executes.
#[derive(Debug, Clone, PartialEq)]
pub struct Halt {
    pub node: NodeId,
    pub kind: HaltKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HaltKind {
    NotCallable { callee: EcoString },
    Unparsable,
    MissingInput { name: EcoString },
    MissingValue { name: EcoString },
}

impl Halt {
    pub fn new(node: NodeId, kind: HaltKind) -> Self {
        Self { node, kind }
    }

    pub fn exception(&self, evaluator: &Evaluator<'_>) -> Exception {
        let kind = match &self.kind {
            HaltKind::NotCallable { callee } => ExceptionKind::NotCallable {
                name: callee.clone(),
            },
            HaltKind::Unparsable => ExceptionKind::Unparsable,
            HaltKind::MissingInput { name } => ExceptionKind::MissingInput { name: name.clone() },
            HaltKind::MissingValue { name } => ExceptionKind::MissingValue { name: name.clone() },
        };
        Exception::new(kind)
            .at(self.node)
            .in_frame(evaluator.current_definition())
    }
}
