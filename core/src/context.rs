//! The explicit query context threaded through analysis, typing and lowering.
//!
//! Name resolution is delegated to a [`Definitions`] oracle supplied by the
//! host. The context adds a memo of expression types and a guard that turns
//! self-referential typing into an unknown type instead of endless recursion.

use crate::expr::{Expr, FunctionDefinition, StructureDefinition};
use crate::node::{Bind, NodeId, TypeVariable};
use crate::types::{StructureType, Type, UnknownReason};
use crate::{Rc, Vec};
use core::cell::RefCell;
use ecow::EcoString;
use hashbrown::HashMap;
use tracing::trace;

/// What a name refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Bind(Bind),
    Function(Rc<FunctionDefinition>),
    Structure(Rc<StructureDefinition>),
    TypeVariable(TypeVariable),
    /// An input stream supplied by the host.
    Stream { name: EcoString, ty: Type },
    /// A constant supplied by the host.
    Host { name: EcoString, ty: Type },
}

impl Definition {
    /// The type a reference to this definition has.
    pub fn ty(&self, ctx: &Context) -> Type {
        match self {
            Definition::Bind(bind) => bind.ty(ctx),
            Definition::Function(function) => Type::Function(function.function_type(ctx)),
            Definition::Structure(structure) => {
                Type::StructureDefinition(StructureType::new(structure.clone()))
            }
            Definition::TypeVariable(variable) => Type::variable(variable.name()),
            Definition::Stream { ty, .. } | Definition::Host { ty, .. } => ty.clone(),
        }
    }
}

/// Resolves names to their declarations.
pub trait Definitions {
    fn resolve(&self, name: &str) -> Option<Definition>;
}

/// A type query in progress.
struct Visit {
    id: NodeId,
    /// The shallowest in-progress query whose provisional cycle marker this
    /// query observed, or its own depth when it saw none.
    depends_on: usize,
}

/// Query context for conflicts, types and lowering.
pub struct Context<'d> {
    definitions: &'d dyn Definitions,
    parent: Option<&'d Context<'d>>,
    locals: Vec<(EcoString, Definition)>,
    visiting: RefCell<Vec<Visit>>,
    types: RefCell<HashMap<NodeId, Type>>,
}

impl<'d> Context<'d> {
    pub fn new(definitions: &'d dyn Definitions) -> Self {
        Self {
            definitions,
            parent: None,
            locals: Vec::new(),
            visiting: RefCell::new(Vec::new()),
            types: RefCell::new(HashMap::new()),
        }
    }

    /// A child context in which `locals` shadow everything else, as table
    /// columns do inside a query.
    pub fn scoped<'s>(
        &'s self,
        locals: impl IntoIterator<Item = (EcoString, Definition)>,
    ) -> Context<'s> {
        Context {
            definitions: self.definitions,
            parent: Some(self),
            locals: locals.into_iter().collect(),
            visiting: RefCell::new(Vec::new()),
            types: RefCell::new(HashMap::new()),
        }
    }

    pub fn resolve(&self, name: &str) -> Option<Definition> {
        if let Some((_, definition)) = self.locals.iter().find(|(local, _)| local == name) {
            return Some(definition.clone());
        }
        match self.parent {
            Some(parent) => parent.resolve(name),
            None => self.definitions.resolve(name),
        }
    }

    /// The type of `expr`, memoized per node.
    ///
    /// Asking for the type of an expression while its type is being computed
    /// yields an unknown type with reason [`UnknownReason::Cycle`]. Results
    /// that depended on such a marker for an enclosing query are not
    /// remembered, since the enclosing query has not finished yet.
    pub fn type_of(&self, expr: &Expr) -> Type {
        let id = expr.id();
        if let Some(ty) = self.types.borrow().get(&id) {
            return ty.clone();
        }
        {
            let mut visiting = self.visiting.borrow_mut();
            if let Some(depth) = visiting.iter().position(|visit| visit.id == id) {
                trace!(node = %id, "type cycle");
                if let Some(current) = visiting.last_mut() {
                    current.depends_on = current.depends_on.min(depth);
                }
                return Type::unknown(UnknownReason::Cycle, Some(id));
            }
        }

        let depth = self.visiting.borrow().len();
        self.visiting.borrow_mut().push(Visit {
            id,
            depends_on: depth,
        });
        let ty = expr.compute_type(self);

        let mut visiting = self.visiting.borrow_mut();
        let depends_on = visiting.pop().map_or(depth, |visit| visit.depends_on);
        if depends_on >= depth {
            drop(visiting);
            self.types.borrow_mut().insert(id, ty.clone());
        } else if let Some(caller) = visiting.last_mut() {
            caller.depends_on = caller.depends_on.min(depends_on);
        }
        ty
    }
}

/// A flat definitions table: the first declaration of a name wins.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: HashMap<EcoString, Definition>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects every declaration in `root`: bind statements, definitions,
    /// their inputs and their type variables.
    pub fn collect(root: &Expr) -> Self {
        let mut lexicon = Self::new();
        lexicon.collect_expr(root);
        lexicon
    }

    pub fn declare_stream(&mut self, name: impl Into<EcoString>, ty: Type) -> &mut Self {
        let name = name.into();
        self.define(name.clone(), Definition::Stream { name, ty });
        self
    }

    pub fn declare_host(&mut self, name: impl Into<EcoString>, ty: Type) -> &mut Self {
        let name = name.into();
        self.define(name.clone(), Definition::Host { name, ty });
        self
    }

    pub fn define(&mut self, name: EcoString, definition: Definition) {
        self.entries.entry(name).or_insert(definition);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn define_bind(&mut self, bind: &Bind) {
        for name in bind.names() {
            self.define(name.into(), Definition::Bind(bind.clone()));
        }
        if let Some(value) = &bind.value {
            self.collect_expr(value);
        }
    }

    fn define_function(&mut self, function: &Rc<FunctionDefinition>) {
        for name in function.names() {
            self.define(name.into(), Definition::Function(function.clone()));
        }
        for variable in &function.type_vars {
            self.define(variable.name().into(), Definition::TypeVariable(variable.clone()));
        }
        for input in &function.inputs {
            self.define_bind(input);
        }
        if let Some(body) = &function.body {
            self.collect_expr(body);
        }
    }

    fn collect_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Bind(bind) => self.define_bind(bind),
            Expr::Function(function) => self.define_function(function),
            Expr::Structure(structure) => {
                for name in structure.names() {
                    self.define(name.into(), Definition::Structure(structure.clone()));
                }
                for variable in &structure.type_vars {
                    self.define(variable.name().into(), Definition::TypeVariable(variable.clone()));
                }
                for input in &structure.inputs {
                    self.define_bind(input);
                }
                if let Some(block) = &structure.block {
                    self.collect_expr(block);
                }
            }
            // Named arguments are not declarations; only their values are.
            Expr::Evaluate(evaluate) => {
                self.collect_expr(&evaluate.func);
                for input in &evaluate.inputs {
                    match input {
                        Expr::Bind(named) => {
                            if let Some(value) = &named.value {
                                self.collect_expr(value);
                            }
                        }
                        other => self.collect_expr(other),
                    }
                }
            }
            other => {
                for child in other.children() {
                    if let Some(child) = child.as_expr() {
                        self.collect_expr(child);
                    }
                }
            }
        }
    }
}

impl Definitions for Lexicon {
    fn resolve(&self, name: &str) -> Option<Definition> {
        self.entries.get(name).cloned()
    }
}
