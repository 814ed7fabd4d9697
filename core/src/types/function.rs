use super::{Type, fmt_bind};
use crate::context::Context;
use crate::node::{Bind, TypeVariable};
use crate::{Box, Vec};
use core::fmt;

/// The type of a function: its declared inputs and its output.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub type_vars: Vec<TypeVariable>,
    pub inputs: Vec<Bind>,
    pub output: Box<Type>,
}

impl FunctionType {
    pub fn new(inputs: Vec<Bind>, output: Type) -> Self {
        Self {
            type_vars: Vec::new(),
            inputs,
            output: Box::new(output),
        }
    }

    pub fn with_type_vars(mut self, type_vars: Vec<TypeVariable>) -> Self {
        self.type_vars = type_vars;
        self
    }

    /// Structural compatibility: same number of inputs, pairwise compatible
    /// input types with the same facets, and a compatible output.
    pub fn accepts(&self, given: &FunctionType, ctx: &Context) -> bool {
        if !self.output.accepts(&given.output, ctx) {
            return false;
        }
        if self.inputs.len() != given.inputs.len() {
            return false;
        }
        self.inputs.iter().zip(&given.inputs).all(|(expected, given)| {
            let compatible = match (&expected.ty, &given.ty) {
                (Some(expected), Some(given)) => expected
                    .resolve_names(ctx)
                    .accepts(&given.resolve_names(ctx), ctx),
                _ => true,
            };
            compatible
                && expected.is_variable_length() == given.is_variable_length()
                && expected.has_default() == given.has_default()
        })
    }

    pub(crate) fn resolve_names(&self, ctx: &Context) -> FunctionType {
        FunctionType {
            type_vars: self.type_vars.clone(),
            inputs: self
                .inputs
                .iter()
                .map(|input| Bind {
                    ty: input.ty.as_ref().map(|ty| ty.resolve_names(ctx)),
                    ..input.clone()
                })
                .collect(),
            output: Box::new(self.output.resolve_names(ctx)),
        }
    }

    pub(crate) fn substitute(&self, concrete: &mut dyn FnMut(&str) -> Option<Type>) -> FunctionType {
        FunctionType {
            type_vars: self.type_vars.clone(),
            inputs: self
                .inputs
                .iter()
                .map(|input| Bind {
                    ty: input.ty.as_ref().map(|ty| ty.substitute(concrete)),
                    ..input.clone()
                })
                .collect(),
            output: Box::new(self.output.substitute(concrete)),
        }
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ƒ")?;
        if !self.type_vars.is_empty() {
            write!(f, "⸨")?;
            for (index, variable) in self.type_vars.iter().enumerate() {
                if index > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", variable.name())?;
            }
            write!(f, "⸩")?;
        }
        write!(f, "(")?;
        for (index, input) in self.inputs.iter().enumerate() {
            if index > 0 {
                write!(f, " ")?;
            }
            fmt_bind(input, f)?;
        }
        write!(f, ") {}", self.output)
    }
}
