use crate::node::NodeId;
use ecow::EcoString;
use thiserror::Error;

/// A runtime failure, carried as an ordinary value.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct Exception {
    pub kind: ExceptionKind,
    /// The node whose evaluation failed.
    pub node: Option<NodeId>,
    /// The definition whose frame was active when the failure happened.
    pub frame: Option<NodeId>,
}

impl Exception {
    pub fn new(kind: ExceptionKind) -> Self {
        Self {
            kind,
            node: None,
            frame: None,
        }
    }

    pub fn at(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    pub fn in_frame(mut self, frame: Option<NodeId>) -> Self {
        self.frame = frame;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExceptionKind {
    #[error("{name} is not a function or structure")]
    NotCallable { name: EcoString },

    #[error("expected an input for {name}")]
    MissingInput { name: EcoString },

    #[error("{name} has no value")]
    MissingValue { name: EcoString },

    #[error("expected a value on the stack, but the frame had none")]
    InsufficientValues,

    #[error("this is not implemented")]
    NotImplemented,

    #[error("this could not be parsed")]
    Unparsable,

    #[error("{name} is not defined")]
    UnknownName { name: EcoString },

    #[error("expected {expected}, received {received}")]
    TypeMismatch {
        expected: &'static str,
        received: &'static str,
    },

    #[error("units {left} and {right} are incompatible")]
    IncompatibleUnits { left: EcoString, right: EcoString },

    #[error("a unit exponent of {unit} overflowed")]
    UnitOverflow { unit: EcoString },

    #[error("evaluation exceeded the maximum depth of {max_depth} frames")]
    StackOverflow { max_depth: usize },

    #[error("evaluation exceeded the limit of {limit} steps")]
    StepLimit { limit: usize },

    #[error("there was nothing to evaluate")]
    NoValue,
}
