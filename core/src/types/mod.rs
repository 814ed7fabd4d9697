//! Semantic types and the compatibility relation between them.

mod function;
mod number;
mod structure;
mod unknown;

pub use function::FunctionType;
pub use number::{Derivation, NumberType, NumberUnit, Unit, UnitOp};
pub use structure::{Column, StructureType, TableType};
pub use unknown::{UnknownReason, UnknownType};

use crate::context::{Context, Definition};
use crate::node::{Bind, NodeId, NodeRef, Replace, Replacement};
use crate::{Box, Vec, vec};
use core::fmt;
use ecow::EcoString;

/// The type variable through which a list exposes its element type to
/// receiver inference.
pub const LIST_ITEM: &str = "Item";

/// The statically inferred shape of an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Function(FunctionType),
    List(ListType),
    Table(TableType),
    Number(NumberType),
    Text(TextType),
    Boolean,
    Structure(StructureType),
    /// A structure definition itself, as evaluated to build an instance.
    StructureDefinition(StructureType),
    /// A reference to a type variable declared on a generic definition.
    Variable(TypeVariableRef),
    /// A written type name that has not been resolved yet.
    Name(NameType),
    Union(UnionType),
    Any,
    Unknown(UnknownType),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListType {
    pub item: Box<Type>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextType {
    pub language: Option<EcoString>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeVariableRef {
    pub name: EcoString,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameType {
    pub name: EcoString,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionType {
    pub members: Vec<Type>,
}

impl Type {
    pub fn list(item: Type) -> Type {
        Type::List(ListType {
            item: Box::new(item),
        })
    }

    pub fn number() -> Type {
        Type::Number(NumberType::unitless())
    }

    pub fn measure(unit: Unit) -> Type {
        Type::Number(NumberType::with_unit(unit))
    }

    pub fn text() -> Type {
        Type::Text(TextType::default())
    }

    pub fn variable(name: impl Into<EcoString>) -> Type {
        Type::Variable(TypeVariableRef { name: name.into() })
    }

    pub fn name(name: impl Into<EcoString>) -> Type {
        Type::Name(NameType { name: name.into() })
    }

    pub fn function(inputs: Vec<Bind>, output: Type) -> Type {
        Type::Function(FunctionType::new(inputs, output))
    }

    pub fn table(columns: Vec<Column>) -> Type {
        Type::Table(TableType { columns })
    }

    pub fn unknown(reason: UnknownReason, node: Option<NodeId>) -> Type {
        Type::Unknown(UnknownType { reason, node })
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown(_))
    }

    /// Whether a value of type `given` may stand where `self` is expected.
    pub fn accepts(&self, given: &Type, ctx: &Context) -> bool {
        match (self, given) {
            (Type::Any, _) | (_, Type::Any) => true,
            // Unresolved type variables are treated as satisfied.
            (Type::Variable(_), _) | (_, Type::Variable(_)) => true,
            (_, Type::Union(union)) => union.members.iter().all(|member| self.accepts(member, ctx)),
            (Type::Union(union), _) => union.members.iter().any(|member| member.accepts(given, ctx)),
            (Type::Name(_), _) | (_, Type::Name(_)) => {
                let expected = self.resolve_names(ctx);
                let given = given.resolve_names(ctx);
                match (&expected, &given) {
                    (Type::Name(a), Type::Name(b)) => a == b,
                    (Type::Name(_), _) | (_, Type::Name(_)) => false,
                    _ => expected.accepts(&given, ctx),
                }
            }
            (Type::Boolean, Type::Boolean) => true,
            (Type::Text(_), Type::Text(_)) => true,
            (Type::Number(expected), Type::Number(given)) => expected.accepts(given, ctx),
            (Type::List(expected), Type::List(given)) => {
                // An empty list literal fits any list.
                expected.item.is_unknown()
                    || given.item.is_unknown()
                    || expected.item.accepts(&given.item, ctx)
            }
            (Type::Table(expected), Type::Table(given)) => expected.accepts(given, ctx),
            (Type::Function(expected), Type::Function(given)) => expected.accepts(given, ctx),
            (Type::Structure(expected), Type::Structure(given)) => {
                expected.definition.id == given.definition.id
            }
            (Type::StructureDefinition(expected), Type::StructureDefinition(given)) => {
                expected.definition.id == given.definition.id
            }
            _ => false,
        }
    }

    /// Compatibility in both directions.
    pub fn is_compatible(&self, other: &Type, ctx: &Context) -> bool {
        self.accepts(other, ctx) && other.accepts(self, ctx)
    }

    /// Replaces written type names with the structure types and type
    /// variables they refer to.
    pub fn resolve_names(&self, ctx: &Context) -> Type {
        match self {
            Type::Name(name) => match ctx.resolve(&name.name) {
                Some(Definition::Structure(definition)) => {
                    Type::Structure(StructureType::new(definition))
                }
                Some(Definition::TypeVariable(variable)) => Type::variable(variable.name()),
                _ => self.clone(),
            },
            Type::List(list) => Type::list(list.item.resolve_names(ctx)),
            Type::Function(function) => Type::Function(function.resolve_names(ctx)),
            Type::Table(table) => Type::Table(table.resolve_names(ctx)),
            Type::Structure(structure) => Type::Structure(StructureType {
                definition: structure.definition.clone(),
                type_args: structure
                    .type_args
                    .iter()
                    .map(|arg| arg.resolve_names(ctx))
                    .collect(),
            }),
            Type::StructureDefinition(structure) => Type::StructureDefinition(StructureType {
                definition: structure.definition.clone(),
                type_args: structure
                    .type_args
                    .iter()
                    .map(|arg| arg.resolve_names(ctx))
                    .collect(),
            }),
            Type::Union(union) => Type::Union(UnionType {
                members: union.members.iter().map(|m| m.resolve_names(ctx)).collect(),
            }),
            _ => self.clone(),
        }
    }

    /// The concrete type this type supplies for a type variable, when it is a
    /// receiver that knows one.
    pub fn resolve_type_variable(&self, name: &str) -> Option<Type> {
        match self {
            Type::List(list) if name == LIST_ITEM => Some((*list.item).clone()),
            Type::Structure(structure) => structure.resolve_type_variable(name),
            _ => None,
        }
    }

    /// Rewrites every type variable for which `concrete` has an answer.
    pub fn substitute(&self, concrete: &mut dyn FnMut(&str) -> Option<Type>) -> Type {
        match self {
            Type::Variable(variable) => concrete(&variable.name).unwrap_or_else(|| self.clone()),
            Type::List(list) => Type::list(list.item.substitute(concrete)),
            Type::Function(function) => Type::Function(function.substitute(concrete)),
            Type::Table(table) => Type::Table(TableType {
                columns: table
                    .columns
                    .iter()
                    .map(|column| Bind {
                        ty: column.ty.as_ref().map(|ty| ty.substitute(concrete)),
                        ..column.clone()
                    })
                    .collect(),
            }),
            Type::Structure(structure) => Type::Structure(StructureType {
                definition: structure.definition.clone(),
                type_args: structure
                    .type_args
                    .iter()
                    .map(|arg| arg.substitute(concrete))
                    .collect(),
            }),
            Type::StructureDefinition(structure) => Type::StructureDefinition(StructureType {
                definition: structure.definition.clone(),
                type_args: structure
                    .type_args
                    .iter()
                    .map(|arg| arg.substitute(concrete))
                    .collect(),
            }),
            Type::Union(union) => Type::Union(UnionType {
                members: union.members.iter().map(|m| m.substitute(concrete)).collect(),
            }),
            _ => self.clone(),
        }
    }

    pub fn children(&self) -> Vec<NodeRef<'_>> {
        match self {
            Type::Function(function) => {
                let mut children: Vec<NodeRef<'_>> = function
                    .type_vars
                    .iter()
                    .map(NodeRef::TypeVariable)
                    .collect();
                children.extend(function.inputs.iter().map(NodeRef::Bind));
                children.push(NodeRef::Type(&function.output));
                children
            }
            Type::List(list) => vec![NodeRef::Type(&list.item)],
            Type::Table(table) => table.columns.iter().map(NodeRef::Bind).collect(),
            Type::Structure(structure) | Type::StructureDefinition(structure) => {
                structure.type_args.iter().map(NodeRef::Type).collect()
            }
            Type::Union(union) => union.members.iter().map(NodeRef::Type).collect(),
            _ => Vec::new(),
        }
    }
}

/// The least upper bound of `types`: duplicates collapse, distinct types
/// form a union. `None` when there are no types at all.
pub fn union_of(types: impl IntoIterator<Item = Type>, ctx: &Context) -> Option<Type> {
    let mut members: Vec<Type> = Vec::new();
    for ty in types {
        let flattened = match ty {
            Type::Union(union) => union.members,
            other => vec![other],
        };
        for ty in flattened {
            if !members.iter().any(|member| member.is_compatible(&ty, ctx)) {
                members.push(ty);
            }
        }
    }
    match members.len() {
        0 => None,
        1 => members.pop(),
        _ => Some(Type::Union(UnionType { members })),
    }
}

impl Replace for Type {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        match self {
            Type::Function(function) => Type::Function(FunctionType {
                type_vars: function.type_vars.replace(target, with),
                inputs: function.inputs.replace(target, with),
                output: function.output.replace(target, with),
            }),
            Type::List(list) => Type::List(ListType {
                item: list.item.replace(target, with),
            }),
            Type::Table(table) => Type::Table(TableType {
                columns: table.columns.replace(target, with),
            }),
            Type::Union(union) => Type::Union(UnionType {
                members: union.members.replace(target, with),
            }),
            _ => self.clone(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Function(function) => write!(f, "{function}"),
            Type::List(list) => write!(f, "[{}]", list.item),
            Type::Table(table) => write!(f, "{table}"),
            Type::Number(number) => write!(f, "{number}"),
            Type::Text(text) => match &text.language {
                Some(language) => write!(f, "''/{language}"),
                None => write!(f, "''"),
            },
            Type::Boolean => write!(f, "?"),
            Type::Structure(structure) => write!(f, "{structure}"),
            Type::StructureDefinition(structure) => write!(f, "•{structure}"),
            Type::Variable(variable) => write!(f, "{}", variable.name),
            Type::Name(name) => write!(f, "{}", name.name),
            Type::Union(union) => {
                for (index, member) in union.members.iter().enumerate() {
                    if index > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
            Type::Any => write!(f, "*"),
            Type::Unknown(_) => write!(f, "∅"),
        }
    }
}

/// Writes a bind the way it appears in a type: `…name•Type`.
pub(crate) fn fmt_bind(bind: &Bind, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if bind.is_variable_length() {
        write!(f, "…")?;
    }
    write!(f, "{}", bind.primary_name())?;
    if let Some(ty) = &bind.ty {
        write!(f, "•{ty}")?;
    }
    if bind.has_default() {
        write!(f, ":")?;
    }
    Ok(())
}

#[cfg(test)]
mod types_test;
