use super::token::duplicate_languages;
use super::{Name, Node, NodeId, NodeRef, Replace, Replacement};
use crate::conflict::{Conflict, ConflictKind};
use crate::context::Context;
use crate::expr::Expr;
use crate::types::{Type, UnknownReason};
use crate::{Vec, vec};
use ecow::EcoString;

/// A declared parameter, structure field, named argument or bind statement.
///
/// A bind is *required* when it has neither a default value nor the
/// variable-length facet. A variable-length bind collects the remaining
/// arguments of a call into a list of its declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct Bind {
    pub id: NodeId,
    pub names: Vec<Name>,
    pub ty: Option<Type>,
    pub value: Option<Expr>,
    pub variable_length: bool,
}

impl Bind {
    pub fn new(names: Vec<Name>) -> Self {
        Self {
            id: NodeId::fresh(),
            names,
            ty: None,
            value: None,
            variable_length: false,
        }
    }

    pub fn named(name: impl Into<EcoString>) -> Self {
        Self::new(vec![Name::new(name)])
    }

    pub fn with_alias(mut self, name: Name) -> Self {
        self.names.push(name);
        self
    }

    pub fn typed(mut self, ty: Type) -> Self {
        self.ty = Some(ty);
        self
    }

    /// Attaches a default (for parameters) or a given value (for named
    /// arguments and bind statements).
    pub fn with_value(mut self, value: Expr) -> Self {
        self.value = Some(value);
        self
    }

    pub fn variable_length(mut self) -> Self {
        self.variable_length = true;
        self
    }

    pub fn is_required(&self) -> bool {
        self.value.is_none() && !self.variable_length
    }

    pub fn is_variable_length(&self) -> bool {
        self.variable_length
    }

    pub fn has_default(&self) -> bool {
        self.value.is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(Name::text)
    }

    /// The first alias, used in messages.
    pub fn primary_name(&self) -> &str {
        self.names.first().map(Name::text).unwrap_or("_")
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.names().any(|alias| alias == name)
    }

    pub fn shares_name(&self, other: &Bind) -> bool {
        other.names().any(|name| self.has_name(name))
    }

    /// The declared type, or the value's type when none was written.
    ///
    /// Variable-length binds are list-shaped: `…n•#` has type `[#]`.
    pub fn ty(&self, ctx: &Context) -> Type {
        let declared = match (&self.ty, &self.value) {
            (Some(ty), _) => ty.resolve_names(ctx),
            (None, Some(value)) => ctx.type_of(value),
            (None, None) => Type::unknown(UnknownReason::Unspecified, Some(self.id)),
        };
        if self.variable_length {
            Type::list(declared)
        } else {
            declared
        }
    }

    pub fn conflicts(&self, _ctx: &Context) -> Vec<Conflict> {
        duplicate_languages(&self.names)
            .into_iter()
            .map(|(language, names)| {
                Conflict::new(
                    ConflictKind::DuplicateLanguages {
                        languages: vec![language],
                    },
                    names,
                )
                .minor()
            })
            .collect()
    }
}

impl Node for Bind {
    fn id(&self) -> NodeId {
        self.id
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        let mut children: Vec<NodeRef<'_>> = self.names.iter().map(NodeRef::Name).collect();
        if let Some(ty) = &self.ty {
            children.push(NodeRef::Type(ty));
        }
        if let Some(value) = &self.value {
            children.push(NodeRef::Expr(value));
        }
        children
    }
}

impl Replace for Bind {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        match with {
            Replacement::Bind(bind) if self.id == target => return bind.clone(),
            _ => {}
        }
        Self {
            id: self.id,
            names: self.names.replace(target, with),
            ty: self.ty.replace(target, with),
            value: self.value.replace(target, with),
            variable_length: self.variable_length,
        }
    }
}

/// Checks the shape of a declared input list: required inputs come first and
/// at most one variable-length input closes the list.
pub(crate) fn input_list_conflicts(inputs: &[Bind]) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    let mut seen_optional = false;
    for (index, input) in inputs.iter().enumerate() {
        if input.is_required() && seen_optional {
            conflicts.push(Conflict::new(
                ConflictKind::RequiredAfterOptional {
                    name: input.primary_name().into(),
                },
                vec![input.id],
            ));
        }
        if !input.is_required() {
            seen_optional = true;
        }
        if input.is_variable_length() && index + 1 != inputs.len() {
            conflicts.push(Conflict::new(
                ConflictKind::VariableLengthNotLast {
                    name: input.primary_name().into(),
                },
                vec![input.id],
            ));
        }
    }
    conflicts
}

/// A type parameter declared on a function or structure definition.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeVariable {
    pub id: NodeId,
    pub name: Name,
}

impl TypeVariable {
    pub fn new(name: impl Into<EcoString>) -> Self {
        Self {
            id: NodeId::fresh(),
            name: Name::new(name),
        }
    }

    pub fn name(&self) -> &str {
        self.name.text()
    }
}

impl Node for TypeVariable {
    fn id(&self) -> NodeId {
        self.id
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        vec![NodeRef::Name(&self.name)]
    }
}

impl Replace for TypeVariable {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        match with {
            Replacement::TypeVariable(variable) if self.id == target => return variable.clone(),
            _ => {}
        }
        Self {
            id: self.id,
            name: self.name.replace(target, with),
        }
    }
}

/// An explicit type argument at a call site, as in `ƒ⸨#⸩(1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeInput {
    pub id: NodeId,
    pub ty: Type,
}

impl TypeInput {
    pub fn new(ty: Type) -> Self {
        Self {
            id: NodeId::fresh(),
            ty,
        }
    }
}

impl Node for TypeInput {
    fn id(&self) -> NodeId {
        self.id
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        vec![NodeRef::Type(&self.ty)]
    }
}

impl Replace for TypeInput {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        match with {
            Replacement::TypeInput(input) if self.id == target => return input.clone(),
            _ => {}
        }
        Self {
            id: self.id,
            ty: self.ty.replace(target, with),
        }
    }
}
