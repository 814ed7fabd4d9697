//! Matching given arguments to declared inputs.
//!
//! The same matching drives three things: static checking of an evaluation
//! ([`check`]), the order in which lowering emits argument instructions
//! ([`plan`]), and binding popped values to input names at run time
//! ([`bind`]).
//!
//! Matching walks the declared inputs in order over a pool of given
//! arguments. A required input takes the next argument. An optional input
//! takes the argument named after it, else the next positional argument,
//! else its default. A variable-length input takes everything left.

use crate::conflict::{Conflict, ConflictKind};
use crate::context::Context;
use crate::expr::{Evaluate, Expr};
use crate::node::{Bind, TypeVariable, input_list_conflicts};
use crate::types::{FunctionType, StructureType, Type, UnknownReason};
use crate::values::{Exception, ExceptionKind, Value};
use crate::{Vec, vec};
use ecow::EcoString;
use hashbrown::HashMap;
use tracing::error;

/// Values bound to every alias of every input.
pub type Bindings = HashMap<EcoString, Value>;

/// What an evaluation's callee turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum Callee {
    Function(FunctionType),
    Structure(StructureType),
}

impl Callee {
    pub fn of(ty: &Type) -> Option<Callee> {
        match ty {
            Type::Function(function) => Some(Callee::Function(function.clone())),
            Type::StructureDefinition(structure) => Some(Callee::Structure(structure.clone())),
            _ => None,
        }
    }

    pub fn inputs(&self) -> &[Bind] {
        match self {
            Callee::Function(function) => &function.inputs,
            Callee::Structure(structure) => &structure.definition.inputs,
        }
    }

    pub fn type_vars(&self) -> &[TypeVariable] {
        match self {
            Callee::Function(function) => &function.type_vars,
            Callee::Structure(structure) => &structure.definition.type_vars,
        }
    }
}

/// The argument value behind a given argument: a named argument's value, or
/// the expression itself. A named argument without a value stands for
/// itself and lowers to a halt.
fn given_value(given: &Expr) -> &Expr {
    match given {
        Expr::Bind(named) => named.value.as_ref().unwrap_or(given),
        other => other,
    }
}

fn named(given: &Expr) -> Option<&Bind> {
    match given {
        Expr::Bind(named) => Some(named),
        _ => None,
    }
}

/// Static conflicts of an evaluation's inputs.
pub fn check(evaluate: &Evaluate, ctx: &Context) -> Vec<Conflict> {
    // The parser already reported the callee.
    if evaluate.func.is_unparsable() {
        return Vec::new();
    }

    let callee_type = ctx.type_of(&evaluate.func);
    let Some(callee) = Callee::of(&callee_type) else {
        return vec![Conflict::new(
            ConflictKind::NotCallable { ty: callee_type },
            [evaluate.func.id()],
        )];
    };

    if let Callee::Structure(structure) = &callee {
        let abstract_functions = structure.definition.abstract_functions();
        if !abstract_functions.is_empty() {
            return vec![
                Conflict::new(
                    ConflictKind::NotInstantiable {
                        structure: structure.definition.name().into(),
                        abstract_functions: abstract_functions
                            .iter()
                            .map(|function| EcoString::from(function.name()))
                            .collect(),
                    },
                    [evaluate.func.id()],
                )
                .with_secondary(abstract_functions.iter().map(|function| function.id)),
            ];
        }
    }

    // Ill-formed input lists are reported on the definition itself.
    if !input_list_conflicts(callee.inputs()).is_empty() {
        return Vec::new();
    }
    if evaluate.inputs.iter().any(|given| given_value(given).is_unparsable()) {
        return Vec::new();
    }

    let mut conflicts = Vec::new();
    let mut given: Vec<&Expr> = evaluate.inputs.iter().collect();

    for input in callee.inputs() {
        let expected = resolve_type_variables(evaluate, &callee, &input.ty(ctx), ctx);

        if input.is_required() {
            if given.is_empty() {
                conflicts.push(
                    Conflict::new(
                        ConflictKind::MissingInput {
                            name: input.primary_name().into(),
                        },
                        [evaluate.id],
                    )
                    .with_secondary([input.id]),
                );
                return conflicts;
            }
            let next = given.remove(0);
            match named(next) {
                Some(bind) if !input.shares_name(bind) => conflicts.push(
                    Conflict::new(
                        ConflictKind::UnexpectedInput {
                            expected: input.primary_name().into(),
                            given: bind.primary_name().into(),
                        },
                        [next.id()],
                    )
                    .with_secondary([input.id]),
                ),
                _ => check_given(input, next, &expected, ctx, &mut conflicts),
            }
        } else if input.is_variable_length() {
            let item = match expected {
                Type::List(list) => *list.item,
                other => {
                    error!(input = input.primary_name(), ty = %other, "variable-length input is not list-shaped");
                    other
                }
            };
            for next in given.drain(..) {
                check_given(input, next, &item, ctx, &mut conflicts);
            }
        } else if let Some(position) = given
            .iter()
            .position(|next| named(next).is_some_and(|bind| input.shares_name(bind)))
        {
            let next = given.remove(position);
            check_given(input, next, &expected, ctx, &mut conflicts);
        } else if given.first().is_some_and(|next| named(next).is_none()) {
            let next = given.remove(0);
            check_given(input, next, &expected, ctx, &mut conflicts);
        }
    }

    if !given.is_empty() {
        conflicts.push(
            Conflict::new(
                ConflictKind::UnexpectedInputs { count: given.len() },
                given.iter().map(|next| next.id()),
            )
            .with_secondary([evaluate.func.id()]),
        );
    }

    conflicts
}

fn check_given(
    input: &Bind,
    given: &Expr,
    expected: &Type,
    ctx: &Context,
    conflicts: &mut Vec<Conflict>,
) {
    let value = given_value(given);
    if matches!(value, Expr::Bind(_)) {
        // A named argument without a value; lowering halts on it.
        return;
    }
    let given_type = ctx.type_of(value);
    if !expected.accepts(&given_type, ctx) {
        conflicts.push(
            Conflict::new(
                ConflictKind::IncompatibleInput {
                    name: input.primary_name().into(),
                    expected: expected.clone(),
                    given: given_type,
                },
                [value.id()],
            )
            .with_secondary([input.id]),
        );
    }
}

/// Replaces the type variables in `ty` with the concrete types this call
/// site implies. Variables nothing resolves are left in place.
pub fn resolve_type_variables(
    evaluate: &Evaluate,
    callee: &Callee,
    ty: &Type,
    ctx: &Context,
) -> Type {
    ty.substitute(&mut |name| concrete_type(evaluate, callee, name, ctx))
}

/// The concrete type for type variable `name` at this call site, from (in
/// order) an explicit type input, the receiver of a property access, or a
/// sibling input declared with that variable.
fn concrete_type(evaluate: &Evaluate, callee: &Callee, name: &str, ctx: &Context) -> Option<Type> {
    if let Some(index) = callee
        .type_vars()
        .iter()
        .position(|variable| variable.name() == name)
    {
        if let Some(explicit) = evaluate.type_inputs.get(index) {
            return Some(explicit.ty.resolve_names(ctx));
        }
    }

    if let Expr::Access(access) = &evaluate.func {
        if let Some(concrete) = ctx.type_of(&access.subject).resolve_type_variable(name) {
            return Some(concrete);
        }
    }

    let is_variable = |ty: &Type| match ty {
        Type::Variable(variable) => variable.name == name,
        Type::Name(written) => written.name == name,
        _ => false,
    };
    let inputs = callee.inputs();
    let (index, in_output) = match inputs
        .iter()
        .position(|input| input.ty.as_ref().is_some_and(is_variable))
    {
        Some(index) => (index, false),
        None => {
            let index = inputs.iter().position(|input| match &input.ty {
                Some(Type::Function(function)) => is_variable(&function.output),
                _ => false,
            })?;
            (index, true)
        }
    };

    let input = &inputs[index];
    let given = evaluate
        .inputs
        .iter()
        .find(|given| named(given).is_some_and(|bind| input.shares_name(bind)))
        .or_else(|| {
            evaluate
                .inputs
                .get(index)
                .filter(|given| named(given).is_none())
        })?;
    let given = given_value(given);
    if matches!(given, Expr::Bind(_)) {
        return None;
    }

    let concrete = match ctx.type_of(given) {
        Type::Function(function) if in_output => *function.output,
        _ if in_output => return None,
        other => other,
    };
    // An unknown sibling says nothing about the variable.
    (!concrete.is_unknown()).then_some(concrete)
}

/// The type an evaluation produces.
pub fn output_type(evaluate: &Evaluate, ctx: &Context) -> Type {
    let callee_type = ctx.type_of(&evaluate.func);
    match Callee::of(&callee_type) {
        Some(Callee::Function(function)) => {
            let callee = Callee::Function(function.clone());
            resolve_type_variables(evaluate, &callee, &function.output, ctx)
        }
        Some(Callee::Structure(structure)) => {
            let callee = Callee::Structure(structure.clone());
            let type_args = structure
                .definition
                .type_vars
                .iter()
                .map(|variable| {
                    concrete_type(evaluate, &callee, variable.name(), ctx)
                        .unwrap_or_else(|| Type::variable(variable.name()))
                })
                .collect();
            Type::Structure(structure.with_type_args(type_args))
        }
        None => Type::unknown(UnknownReason::NotCallable, Some(evaluate.id)),
    }
}

/// What feeds one declared input when an evaluation is lowered.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<'e> {
    /// A given argument's value.
    Given(&'e Expr),
    /// The input's default value.
    Default(&'e Expr),
    /// Nothing: lowering emits a halt.
    Missing(&'e Bind),
    /// Everything left, for a variable-length input.
    Rest(Vec<&'e Expr>),
}

/// One slot per declared input, matched the same way [`check`] matches.
pub fn plan<'e>(evaluate: &'e Evaluate, inputs: &'e [Bind]) -> Vec<Slot<'e>> {
    let mut given: Vec<&Expr> = evaluate.inputs.iter().collect();
    let mut slots = Vec::with_capacity(inputs.len());

    for input in inputs {
        let slot = if input.is_required() {
            if given.is_empty() {
                Slot::Missing(input)
            } else {
                Slot::Given(given_value(given.remove(0)))
            }
        } else if input.is_variable_length() {
            Slot::Rest(given.drain(..).map(given_value).collect())
        } else if let Some(position) = given
            .iter()
            .position(|next| named(next).is_some_and(|bind| input.shares_name(bind)))
        {
            Slot::Given(given_value(given.remove(position)))
        } else if given.first().is_some_and(|next| named(next).is_none()) {
            Slot::Given(given_value(given.remove(0)))
        } else {
            match &input.value {
                Some(default) => Slot::Default(default),
                None => Slot::Missing(input),
            }
        };
        slots.push(slot);
    }

    slots
}

/// How many argument values a planned call leaves on the stack before its
/// callee: one per slot, except that a variable-length slot contributes
/// one per remaining argument, possibly none.
pub fn value_count(slots: &[Slot<'_>]) -> usize {
    slots
        .iter()
        .map(|slot| match slot {
            Slot::Rest(rest) => rest.len(),
            _ => 1,
        })
        .sum()
}

/// Binds `values` (in declaration order) to every alias of each input. A
/// variable-length input receives the remaining values as a list.
pub fn bind(inputs: &[Bind], values: Vec<Value>) -> Result<Bindings, Exception> {
    let mut bindings = Bindings::new();
    let mut values = values.into_iter();

    for input in inputs {
        let value = if input.is_variable_length() {
            Value::List(values.by_ref().collect())
        } else {
            match values.next() {
                Some(value) => value,
                None => {
                    return Err(Exception::new(ExceptionKind::MissingValue {
                        name: input.primary_name().into(),
                    }));
                }
            }
        };
        for name in input.names() {
            bindings.insert(name.into(), value.clone());
        }
    }

    Ok(bindings)
}

#[cfg(test)]
mod binder_test;
