use super::{Type, fmt_bind};
use crate::context::Context;
use crate::expr::StructureDefinition;
use crate::node::Bind;
use crate::{Rc, Vec};
use core::fmt;

/// The type of a value created by a structure definition.
#[derive(Debug, Clone)]
pub struct StructureType {
    pub definition: Rc<StructureDefinition>,
    /// Concrete types for the definition's type variables, by position.
    pub type_args: Vec<Type>,
}

impl StructureType {
    pub fn new(definition: Rc<StructureDefinition>) -> Self {
        Self {
            definition,
            type_args: Vec::new(),
        }
    }

    pub fn with_type_args(mut self, type_args: Vec<Type>) -> Self {
        self.type_args = type_args;
        self
    }

    pub fn resolve_type_variable(&self, name: &str) -> Option<Type> {
        let index = self
            .definition
            .type_vars
            .iter()
            .position(|variable| variable.name() == name)?;
        self.type_args.get(index).cloned()
    }

    /// The type of the input or function named `name`, with the structure's
    /// type arguments substituted.
    pub fn member_type(&self, name: &str, ctx: &Context) -> Option<Type> {
        let member = if let Some(input) = self.definition.input_named(name) {
            input.ty(ctx)
        } else if let Some(function) = self.definition.function_named(name) {
            Type::Function(function.function_type(ctx))
        } else {
            self.definition.block_bind_named(name)?.ty(ctx)
        };
        Some(member.substitute(&mut |variable| self.resolve_type_variable(variable)))
    }
}

impl PartialEq for StructureType {
    fn eq(&self, other: &Self) -> bool {
        self.definition.id == other.definition.id && self.type_args == other.type_args
    }
}

impl fmt::Display for StructureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.definition.name())?;
        if !self.type_args.is_empty() {
            write!(f, "⸨")?;
            for (index, arg) in self.type_args.iter().enumerate() {
                if index > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{arg}")?;
            }
            write!(f, "⸩")?;
        }
        Ok(())
    }
}

/// A table column is a bind: aliases plus a declared type.
pub type Column = Bind;

#[derive(Debug, Clone, PartialEq)]
pub struct TableType {
    pub columns: Vec<Column>,
}

impl TableType {
    pub fn column_named(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.has_name(name))
    }

    /// Tables are compatible when every expected column has a same-named
    /// column of an acceptable type.
    pub fn accepts(&self, given: &TableType, ctx: &Context) -> bool {
        self.columns.len() == given.columns.len()
            && self.columns.iter().all(|column| {
                given
                    .columns
                    .iter()
                    .find(|other| column.shares_name(other))
                    .is_some_and(|other| column.ty(ctx).accepts(&other.ty(ctx), ctx))
            })
    }

    pub(crate) fn resolve_names(&self, ctx: &Context) -> TableType {
        TableType {
            columns: self
                .columns
                .iter()
                .map(|column| Bind {
                    ty: column.ty.as_ref().map(|ty| ty.resolve_names(ctx)),
                    ..column.clone()
                })
                .collect(),
        }
    }
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "⎡")?;
        for (index, column) in self.columns.iter().enumerate() {
            if index > 0 {
                write!(f, " ")?;
            }
            fmt_bind(column, f)?;
        }
        write!(f, "⎦")
    }
}
