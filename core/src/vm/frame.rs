use crate::expr::{FunctionDefinition, StructureDefinition};
use crate::node::NodeId;
use crate::values::{Scope, Value};
use crate::vm::{Instruction, Instructions};
use crate::{Rc, Vec};
use core::fmt;
use ecow::EcoString;
use hashbrown::HashMap;

/// What a frame is evaluating.
#[derive(Clone)]
pub enum FrameKind {
    /// The root expression of an evaluation pass.
    Program,
    Function(Rc<FunctionDefinition>),
    /// A structure's block; finishing yields an instance.
    Structure(Rc<StructureDefinition>),
}

/// One active evaluation: its instructions, cursor and bindings.
pub struct Frame {
    kind: FrameKind,
    /// The node whose lowering this frame runs.
    node: NodeId,
    instructions: Rc<Instructions>,
    cursor: usize,
    bindings: HashMap<EcoString, Value>,
    /// The scope the definition was created in.
    scope: Rc<Scope>,
    /// Value stack height when the frame started.
    base: usize,
}

impl Frame {
    pub fn new(
        kind: FrameKind,
        node: NodeId,
        instructions: Rc<Instructions>,
        scope: Rc<Scope>,
        bindings: HashMap<EcoString, Value>,
    ) -> Self {
        Self {
            kind,
            node,
            instructions,
            cursor: 0,
            bindings,
            scope,
            base: 0,
        }
    }

    pub fn kind(&self) -> &FrameKind {
        &self.kind
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn instructions(&self) -> &Instructions {
        &self.instructions
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub(crate) fn set_base(&mut self, base: usize) {
        self.base = base;
    }

    pub fn is_done(&self) -> bool {
        self.cursor >= self.instructions.len()
    }

    /// The instruction the cursor is on, without moving it.
    pub fn current(&self) -> Option<&Instruction> {
        self.instructions.get(self.cursor)
    }

    pub(crate) fn fetch(&mut self) -> Option<Instruction> {
        let instruction = self.instructions.get(self.cursor).cloned()?;
        self.cursor += 1;
        Some(instruction)
    }

    pub(crate) fn advance(&mut self, distance: usize) {
        self.cursor += distance;
    }

    pub fn bindings(&self) -> &HashMap<EcoString, Value> {
        &self.bindings
    }

    pub fn bind(&mut self, name: impl Into<EcoString>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name).or_else(|| self.scope.lookup(name))
    }

    /// Freezes the current bindings into a scope for closures and instances.
    pub fn capture(&self) -> Rc<Scope> {
        Rc::new(Scope::new(self.bindings.clone(), Some(self.scope.clone())))
    }

    /// The function or structure definition this frame runs, if any.
    pub fn definition(&self) -> Option<NodeId> {
        match &self.kind {
            FrameKind::Program => None,
            FrameKind::Function(function) => Some(function.id),
            FrameKind::Structure(structure) => Some(structure.id),
        }
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            FrameKind::Program => "program",
            FrameKind::Function(function) => function.name(),
            FrameKind::Structure(structure) => structure.name(),
        };
        let mut names: Vec<&str> = self.bindings.keys().map(|name| name.as_str()).collect();
        names.sort_unstable();
        f.debug_struct("Frame")
            .field("kind", &kind)
            .field("cursor", &self.cursor)
            .field("len", &self.instructions.len())
            .field("bindings", &names)
            .field("base", &self.base)
            .finish()
    }
}
