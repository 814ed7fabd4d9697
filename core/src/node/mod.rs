//! Node identity, child enumeration and structural replacement.
//!
//! Nodes are immutable. Each one carries a [`NodeId`] assigned at
//! construction; identity never changes, even when a tree is rebuilt with
//! [`Replace::replace`], so ids can key memo tables across passes.

mod bind;
mod token;

pub use bind::{Bind, TypeInput, TypeVariable};
pub use token::{Language, Name, Token, TokenKind};

pub(crate) use bind::input_list_conflicts;
pub(crate) use token::duplicate_languages;

use crate::{Vec, expr::Expr, types::Type, vec};
use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

static NEXT_ID: AtomicU32 = AtomicU32::new(1);

/// Stable identity of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Allocates an id that no other node shares.
    pub fn fresh() -> Self {
        NodeId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Common surface of every tree node.
pub trait Node {
    fn id(&self) -> NodeId;

    /// Direct children in source order.
    fn children(&self) -> Vec<NodeRef<'_>>;
}

/// A borrowed reference to any kind of node, used for generic traversal.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Expr(&'a Expr),
    Bind(&'a Bind),
    Name(&'a Name),
    Token(&'a Token),
    Language(&'a Language),
    TypeVariable(&'a TypeVariable),
    TypeInput(&'a TypeInput),
    /// Type annotations are traversed but carry no identity of their own.
    Type(&'a Type),
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> Option<NodeId> {
        match *self {
            NodeRef::Expr(expr) => Some(expr.id()),
            NodeRef::Bind(bind) => Some(bind.id()),
            NodeRef::Name(name) => Some(name.id()),
            NodeRef::Token(token) => Some(token.id()),
            NodeRef::Language(language) => Some(language.id()),
            NodeRef::TypeVariable(variable) => Some(variable.id()),
            NodeRef::TypeInput(input) => Some(input.id()),
            NodeRef::Type(_) => None,
        }
    }

    pub fn children(&self) -> Vec<NodeRef<'a>> {
        match *self {
            NodeRef::Expr(expr) => expr.children(),
            NodeRef::Bind(bind) => bind.children(),
            NodeRef::Name(name) => name.children(),
            NodeRef::Token(_) | NodeRef::Language(_) => Vec::new(),
            NodeRef::TypeVariable(variable) => variable.children(),
            NodeRef::TypeInput(input) => input.children(),
            NodeRef::Type(ty) => ty.children(),
        }
    }

    pub fn as_expr(&self) -> Option<&'a Expr> {
        match *self {
            NodeRef::Expr(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn as_bind(&self) -> Option<&'a Bind> {
        match *self {
            NodeRef::Bind(bind) => Some(bind),
            NodeRef::Expr(Expr::Bind(bind)) => Some(bind),
            _ => None,
        }
    }
}

/// Pre-order traversal of `root` and everything beneath it.
pub fn descendants(root: NodeRef<'_>) -> Vec<NodeRef<'_>> {
    let mut out = Vec::new();
    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        let mut children = node.children();
        children.reverse();
        pending.extend(children);
        out.push(node);
    }
    out
}

/// Finds the node with the given id beneath `root`, if any.
pub fn find(root: NodeRef<'_>, id: NodeId) -> Option<NodeRef<'_>> {
    descendants(root)
        .into_iter()
        .find(|node| node.id() == Some(id))
}

/// A node that may be swapped into a tree by [`Replace::replace`].
#[derive(Debug, Clone, PartialEq)]
pub enum Replacement {
    Expr(Expr),
    Bind(Bind),
    Name(Name),
    Token(Token),
    Language(Language),
    TypeVariable(TypeVariable),
    TypeInput(TypeInput),
}

/// Deep, non-destructive rebuild of a tree with one node swapped out.
///
/// Nodes other than the target keep their ids. A replacement whose kind does
/// not fit the target's slot leaves the slot unchanged.
pub trait Replace: Sized {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self;
}

impl<T: Replace> Replace for Vec<T> {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        self.iter().map(|item| item.replace(target, with)).collect()
    }
}

impl<T: Replace> Replace for Option<T> {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        self.as_ref().map(|item| item.replace(target, with))
    }
}

impl<T: Replace> Replace for crate::Box<T> {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        crate::Box::new(self.as_ref().replace(target, with))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;
    use pretty_assertions::assert_eq;

    #[test]
    fn fresh_ids_are_distinct() {
        let a = NodeId::fresh();
        let b = NodeId::fresh();
        assert!(a != b);
        assert!(b.index() > a.index());
    }

    #[test]
    fn descendants_are_pre_order() {
        let first = Expr::number(1.0);
        let second = Expr::number(2.0);
        let list = Expr::list(vec![first.clone(), second.clone()]);

        let exprs: Vec<NodeId> = descendants(NodeRef::Expr(&list))
            .into_iter()
            .filter_map(|node| node.as_expr().map(Expr::id))
            .collect();

        assert_eq!(exprs, vec![list.id(), first.id(), second.id()]);
    }

    #[test]
    fn replace_keeps_untouched_ids() {
        let first = Expr::number(1.0);
        let second = Expr::number(2.0);
        let list = Expr::list(vec![first.clone(), second.clone()]);
        let third = Expr::text("\"three\"");

        let replaced = list.replace(second.id(), &Replacement::Expr(third.clone()));

        assert_eq!(replaced.id(), list.id());
        let Expr::List(literal) = &replaced else {
            panic!("expected a list literal");
        };
        assert_eq!(literal.values[0].id(), first.id());
        assert_eq!(literal.values[1].id(), third.id());

        // The original tree is untouched.
        assert!(find(NodeRef::Expr(&list), second.id()).is_some());
        assert!(find(NodeRef::Expr(&replaced), second.id()).is_none());
    }
}
