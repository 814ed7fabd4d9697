use super::{Expr, Expression, finish};
use crate::conflict::{Conflict, ConflictKind};
use crate::context::Context;
use crate::node::{
    Bind, Name, Node, NodeId, NodeRef, Replace, Replacement, TypeVariable, duplicate_languages,
    input_list_conflicts,
};
use crate::types::{FunctionType, StructureType, Type, UnknownReason};
use crate::values::{FunctionValue, StructureDefinitionValue, Value};
use crate::vm::{Evaluator, Instructions};
use crate::{Rc, Vec, vec};
use ecow::EcoString;

fn definition_conflicts(names: &[Name], inputs: &[Bind]) -> Vec<Conflict> {
    let mut conflicts: Vec<Conflict> = duplicate_languages(names)
        .into_iter()
        .map(|(language, nodes)| {
            Conflict::new(
                ConflictKind::DuplicateLanguages {
                    languages: vec![language],
                },
                nodes,
            )
            .minor()
        })
        .collect();
    conflicts.extend(input_list_conflicts(inputs));
    conflicts
}

fn definition_children<'a>(
    names: &'a [Name],
    type_vars: &'a [TypeVariable],
    inputs: &'a [Bind],
) -> Vec<NodeRef<'a>> {
    let mut children: Vec<NodeRef<'a>> = names.iter().map(NodeRef::Name).collect();
    children.extend(type_vars.iter().map(NodeRef::TypeVariable));
    children.extend(inputs.iter().map(NodeRef::Bind));
    children
}

/// `ƒ name⸨T⸩(inputs) Output body`
///
/// A definition without a body is abstract: it can be declared in a
/// structure, but the structure cannot be instantiated.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub id: NodeId,
    pub names: Vec<Name>,
    pub type_vars: Vec<TypeVariable>,
    pub inputs: Vec<Bind>,
    pub output: Option<Type>,
    pub body: Option<Expr>,
}

impl FunctionDefinition {
    pub fn new(name: impl Into<EcoString>) -> Self {
        Self {
            id: NodeId::fresh(),
            names: vec![Name::new(name)],
            type_vars: Vec::new(),
            inputs: Vec::new(),
            output: None,
            body: None,
        }
    }

    pub fn with_alias(mut self, name: Name) -> Self {
        self.names.push(name);
        self
    }

    pub fn with_type_var(mut self, name: impl Into<EcoString>) -> Self {
        self.type_vars.push(TypeVariable::new(name));
        self
    }

    pub fn with_input(mut self, input: Bind) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn returns(mut self, output: Type) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_body(mut self, body: Expr) -> Self {
        self.body = Some(body);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(Name::text)
    }

    pub fn name(&self) -> &str {
        self.names.first().map(Name::text).unwrap_or("_")
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.names().any(|alias| alias == name)
    }

    pub fn is_abstract(&self) -> bool {
        self.body.is_none()
    }

    /// The declared output, else the body's type.
    pub fn function_type(&self, ctx: &Context) -> FunctionType {
        let output = match (&self.output, &self.body) {
            (Some(output), _) => output.resolve_names(ctx),
            (None, Some(body)) => ctx.type_of(body),
            (None, None) => Type::unknown(UnknownReason::Unspecified, Some(self.id)),
        };
        FunctionType::new(self.inputs.clone(), output).with_type_vars(self.type_vars.clone())
    }
}

impl Node for FunctionDefinition {
    fn id(&self) -> NodeId {
        self.id
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        let mut children = definition_children(&self.names, &self.type_vars, &self.inputs);
        if let Some(output) = &self.output {
            children.push(NodeRef::Type(output));
        }
        if let Some(body) = &self.body {
            children.push(NodeRef::Expr(body));
        }
        children
    }
}

impl Replace for FunctionDefinition {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        Self {
            id: self.id,
            names: self.names.replace(target, with),
            type_vars: self.type_vars.replace(target, with),
            inputs: self.inputs.replace(target, with),
            output: self.output.replace(target, with),
            body: self.body.replace(target, with),
        }
    }
}

impl Expression for FunctionDefinition {
    fn conflicts(&self, _ctx: &Context) -> Vec<Conflict> {
        definition_conflicts(&self.names, &self.inputs)
    }

    fn compute_type(self: &Rc<Self>, ctx: &Context) -> Type {
        Type::Function(self.function_type(ctx))
    }

    fn lower(self: &Rc<Self>, _ctx: &Context) -> Instructions {
        Instructions::from(vec![finish(self)])
    }

    /// A closure over the current bindings, also bound to the function's
    /// names.
    fn execute(self: &Rc<Self>, evaluator: &mut Evaluator<'_>) -> Option<Value> {
        let value = Value::Function(FunctionValue {
            definition: self.clone(),
            scope: evaluator.capture_scope(),
        });
        for name in self.names() {
            evaluator.bind(name, value.clone());
        }
        Some(value)
    }
}

/// `•Name⸨T⸩(inputs) ( block )`
///
/// Instances are built by evaluating the definition: inputs are bound, the
/// block runs, and everything bound along the way becomes a member.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureDefinition {
    pub id: NodeId,
    pub names: Vec<Name>,
    pub type_vars: Vec<TypeVariable>,
    pub inputs: Vec<Bind>,
    pub block: Option<Expr>,
}

impl StructureDefinition {
    pub fn new(name: impl Into<EcoString>) -> Self {
        Self {
            id: NodeId::fresh(),
            names: vec![Name::new(name)],
            type_vars: Vec::new(),
            inputs: Vec::new(),
            block: None,
        }
    }

    pub fn with_alias(mut self, name: Name) -> Self {
        self.names.push(name);
        self
    }

    pub fn with_type_var(mut self, name: impl Into<EcoString>) -> Self {
        self.type_vars.push(TypeVariable::new(name));
        self
    }

    pub fn with_input(mut self, input: Bind) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_block(mut self, block: Expr) -> Self {
        self.block = Some(block);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(Name::text)
    }

    pub fn name(&self) -> &str {
        self.names.first().map(Name::text).unwrap_or("_")
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.names().any(|alias| alias == name)
    }

    /// The statements of the block; a lone expression counts as one.
    pub fn statements(&self) -> &[Expr] {
        match &self.block {
            Some(Expr::Block(block)) => &block.statements,
            Some(other) => core::slice::from_ref(other),
            None => &[],
        }
    }

    pub fn input_named(&self, name: &str) -> Option<&Bind> {
        self.inputs.iter().find(|input| input.has_name(name))
    }

    pub fn functions(&self) -> impl Iterator<Item = &Rc<FunctionDefinition>> {
        self.statements().iter().filter_map(|statement| match statement {
            Expr::Function(function) => Some(function),
            _ => None,
        })
    }

    pub fn function_named(&self, name: &str) -> Option<&Rc<FunctionDefinition>> {
        self.functions().find(|function| function.has_name(name))
    }

    pub fn block_bind_named(&self, name: &str) -> Option<&Bind> {
        self.statements().iter().find_map(|statement| match statement {
            Expr::Bind(bind) if bind.has_name(name) => Some(bind.as_ref()),
            _ => None,
        })
    }

    pub fn abstract_functions(&self) -> Vec<&Rc<FunctionDefinition>> {
        self.functions()
            .filter(|function| function.is_abstract())
            .collect()
    }
}

impl Node for StructureDefinition {
    fn id(&self) -> NodeId {
        self.id
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        let mut children = definition_children(&self.names, &self.type_vars, &self.inputs);
        if let Some(block) = &self.block {
            children.push(NodeRef::Expr(block));
        }
        children
    }
}

impl Replace for StructureDefinition {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        Self {
            id: self.id,
            names: self.names.replace(target, with),
            type_vars: self.type_vars.replace(target, with),
            inputs: self.inputs.replace(target, with),
            block: self.block.replace(target, with),
        }
    }
}

impl Expression for StructureDefinition {
    fn conflicts(&self, _ctx: &Context) -> Vec<Conflict> {
        definition_conflicts(&self.names, &self.inputs)
    }

    fn compute_type(self: &Rc<Self>, _ctx: &Context) -> Type {
        Type::StructureDefinition(StructureType::new(self.clone()))
    }

    fn lower(self: &Rc<Self>, _ctx: &Context) -> Instructions {
        Instructions::from(vec![finish(self)])
    }

    fn execute(self: &Rc<Self>, evaluator: &mut Evaluator<'_>) -> Option<Value> {
        let value = Value::StructureDefinition(StructureDefinitionValue {
            definition: self.clone(),
            scope: evaluator.capture_scope(),
        });
        for name in self.names() {
            evaluator.bind(name, value.clone());
        }
        Some(value)
    }
}
