use crate::node::NodeId;
use core::fmt;
use ecow::EcoString;

/// Why a type could not be determined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnknownReason {
    /// The type depends on itself.
    Cycle,
    /// The expression could not be parsed.
    Unparsable,
    /// The callee of an evaluation is not a function or structure.
    NotCallable,
    /// A name that nothing defines.
    UnknownName(EcoString),
    /// A list literal without elements.
    NoElements,
    /// Nothing was declared and nothing could be inferred.
    Unspecified,
}

/// The checked bottom of the type lattice.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownType {
    pub reason: UnknownReason,
    /// The node whose type is unknown, when there is one.
    pub node: Option<NodeId>,
}

impl fmt::Display for UnknownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnknownReason::Cycle => write!(f, "its type depends on itself"),
            UnknownReason::Unparsable => write!(f, "it could not be parsed"),
            UnknownReason::NotCallable => write!(f, "its callee is not a function"),
            UnknownReason::UnknownName(name) => write!(f, "{name} is not defined"),
            UnknownReason::NoElements => write!(f, "it has no elements"),
            UnknownReason::Unspecified => write!(f, "no type was given"),
        }
    }
}
