//! The stack machine.
//!
//! An evaluation pass lowers the root expression into a program frame and
//! executes it one instruction at a time. Evaluating a function or structure
//! pushes a new frame with its own bindings and instructions; when a frame
//! runs out of instructions its result is handed to the frame below.
//!
//! The first exception value produced ends the pass. Frames are abandoned,
//! not unwound.

use crate::api::ExecutionOptions;
use crate::context::Context;
use crate::expr::Expr;
use crate::node::NodeId;
use crate::values::{
    Exception, ExceptionKind, FunctionValue, Scope, StructureDefinitionValue, StructureValue, Value,
};
use crate::vm::{Frame, FrameKind, Instruction, Instructions, Stack};
use crate::{Rc, Vec};
use ecow::EcoString;
use hashbrown::HashMap;
use tracing::{debug, trace};

/// Identifies an external input stream.
pub type StreamId = EcoString;

/// The outcome of advancing the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// More instructions remain.
    Running,
    /// The pass finished with a value.
    Produced(Value),
    /// The pass ended with an exception.
    Halted(Exception),
}

pub struct Evaluator<'c> {
    context: &'c Context<'c>,
    options: ExecutionOptions,
    globals: HashMap<EcoString, Value>,
    streams: HashMap<StreamId, Value>,
    /// Injected values waiting for the next pass.
    pending: Vec<(StreamId, Value)>,
    stack: Stack<Value>,
    frames: Vec<Frame>,
    lowered: HashMap<NodeId, Rc<Instructions>>,
    outcome: Option<Step>,
    steps: usize,
    last: Option<(NodeId, bool)>,
}

impl<'c> Evaluator<'c> {
    pub fn new(context: &'c Context<'c>, options: ExecutionOptions) -> Self {
        let stack = Stack::new(options.value_stack_size);
        Self {
            context,
            options,
            globals: HashMap::new(),
            streams: HashMap::new(),
            pending: Vec::new(),
            stack,
            frames: Vec::new(),
            lowered: HashMap::new(),
            outcome: None,
            steps: 0,
            last: None,
        }
    }

    /// Makes `value` visible to every reference named `name`.
    pub fn with_global(mut self, name: impl Into<EcoString>, value: Value) -> Self {
        self.define_global(name, value);
        self
    }

    pub fn define_global(&mut self, name: impl Into<EcoString>, value: Value) {
        self.globals.insert(name.into(), value);
    }

    pub fn context(&self) -> &'c Context<'c> {
        self.context
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    /// Queues a value for `stream`. It becomes visible when the next pass
    /// begins, never in the middle of one.
    pub fn inject(&mut self, stream: impl Into<StreamId>, value: Value) {
        let stream = stream.into();
        debug!(stream = %stream, "value injected");
        self.pending.push((stream, value));
    }

    /// The latest value of `stream` applied by a pass.
    pub fn stream_value(&self, stream: &str) -> Option<&Value> {
        self.streams.get(stream)
    }

    /// Starts evaluating `root` from scratch, applying injected values first.
    pub fn begin_pass(&mut self, root: &Expr) {
        for (stream, value) in core::mem::take(&mut self.pending) {
            self.streams.insert(stream, value);
        }
        self.stack.clear();
        self.frames.clear();
        self.outcome = None;
        self.steps = 0;
        self.last = None;

        let instructions = self.lowered(root);
        debug!(root = %root.id(), instructions = instructions.len(), "evaluation pass started");
        self.frames.push(Frame::new(
            FrameKind::Program,
            root.id(),
            instructions,
            Scope::root(),
            HashMap::new(),
        ));
    }

    /// Executes one instruction.
    pub fn step(&mut self) -> Step {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }
        if let Some(limit) = self.options.max_steps {
            if self.steps >= limit {
                return self.halt(self.exception(ExceptionKind::StepLimit { limit }));
            }
        }
        let Some(frame) = self.frames.last_mut() else {
            return self.halt(Exception::new(ExceptionKind::NoValue));
        };
        let Some(instruction) = frame.fetch() else {
            return self.complete_frames();
        };
        self.steps += 1;
        self.last = Some((instruction.node(), instruction.is_boundary()));
        trace!(depth = self.frames.len(), ?instruction, "step");

        match instruction {
            Instruction::Start(_) => {}
            Instruction::Finish(expr) => {
                if let Some(value) = expr.execute(self) {
                    if let Value::Exception(exception) = value {
                        return self.halt(exception);
                    }
                    self.stack.push(value);
                }
            }
            Instruction::Jump { distance, .. } => self.advance(distance),
            Instruction::JumpIfFalse { distance, node } => match self.pop_value() {
                Ok(Value::Boolean(true)) => {}
                Ok(Value::Boolean(false)) => self.advance(distance + 1),
                Ok(Value::Exception(exception)) => return self.halt(exception),
                Ok(other) => {
                    let exception = self
                        .exception(ExceptionKind::TypeMismatch {
                            expected: "boolean",
                            received: other.kind(),
                        })
                        .at(node);
                    return self.halt(exception);
                }
                Err(exception) => return self.halt(exception.at(node)),
            },
            Instruction::Halt(halt) => {
                let exception = halt.exception(self);
                return self.halt(exception);
            }
        }

        self.complete_frames()
    }

    /// Steps until a start or finish marker has executed, or the pass ends.
    pub fn step_to_boundary(&mut self) -> Step {
        loop {
            let step = self.step();
            if step != Step::Running || self.last.is_some_and(|(_, boundary)| boundary) {
                return step;
            }
        }
    }

    /// Steps until the pass ends.
    pub fn run(&mut self) -> Step {
        loop {
            let step = self.step();
            if step != Step::Running {
                return step;
            }
        }
    }

    pub fn is_done(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Active frames, outermost first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// The node of the most recently executed instruction.
    pub fn active_node(&self) -> Option<NodeId> {
        self.last.map(|(node, _)| node)
    }

    /// The function or structure whose frame is innermost, if any.
    pub fn current_definition(&self) -> Option<NodeId> {
        self.frames.iter().rev().find_map(Frame::definition)
    }

    pub fn stack(&self) -> &Stack<Value> {
        &self.stack
    }

    /// Pops a value produced within the current frame.
    pub fn pop_value(&mut self) -> Result<Value, Exception> {
        let base = self.frames.last().map_or(0, Frame::base);
        self.stack
            .pop_above(base)
            .ok_or_else(|| self.exception(ExceptionKind::InsufficientValues))
    }

    /// Resolves a name against the current frame, then globals, then
    /// streams.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.frames
            .last()
            .and_then(|frame| frame.lookup(name))
            .or_else(|| self.globals.get(name))
            .or_else(|| self.streams.get(name))
            .cloned()
    }

    /// Binds `name` in the current frame.
    pub fn bind(&mut self, name: impl Into<EcoString>, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.bind(name, value);
        }
    }

    /// The scope a definition created now closes over.
    pub fn capture_scope(&self) -> Rc<Scope> {
        self.frames
            .last()
            .map_or_else(Scope::root, Frame::capture)
    }

    /// An exception attributed to the innermost definition frame.
    pub fn exception(&self, kind: ExceptionKind) -> Exception {
        Exception::new(kind).in_frame(self.current_definition())
    }

    /// Pushes `frame`, failing when the depth limit is reached.
    pub fn start_frame(&mut self, mut frame: Frame) -> Result<(), Exception> {
        if self.frames.len() >= self.options.max_depth {
            return Err(self.exception(ExceptionKind::StackOverflow {
                max_depth: self.options.max_depth,
            }));
        }
        frame.set_base(self.stack.len());
        debug!(depth = self.frames.len() + 1, frame = ?frame, "frame started");
        self.frames.push(frame);
        Ok(())
    }

    /// Starts evaluating `function`'s body with `bindings` for its inputs.
    pub fn call_function(
        &mut self,
        function: FunctionValue,
        mut bindings: HashMap<EcoString, Value>,
    ) -> Result<(), Exception> {
        let Some(body) = function.definition.body.clone() else {
            return Err(self.exception(ExceptionKind::NotImplemented));
        };
        // The function can refer to itself by any of its names.
        for name in function.definition.names() {
            bindings
                .entry(EcoString::from(name))
                .or_insert_with(|| Value::Function(function.clone()));
        }
        let instructions = self.lowered(&body);
        self.start_frame(Frame::new(
            FrameKind::Function(function.definition.clone()),
            body.id(),
            instructions,
            function.scope.clone(),
            bindings,
        ))
    }

    /// Starts evaluating a structure's block; the frame yields the instance.
    pub fn instantiate(
        &mut self,
        structure: StructureDefinitionValue,
        bindings: HashMap<EcoString, Value>,
    ) -> Result<(), Exception> {
        // An empty block creates the instance from its inputs alone.
        let instructions = match &structure.definition.block {
            Some(Expr::Block(block)) if block.statements.is_empty() => {
                Rc::new(Instructions::new())
            }
            Some(block) => self.lowered(block),
            None => Rc::new(Instructions::new()),
        };
        // The block can refer to the structure by any of its names, without
        // those names becoming members.
        let names = structure
            .definition
            .names()
            .map(|name| {
                (
                    EcoString::from(name),
                    Value::StructureDefinition(structure.clone()),
                )
            })
            .collect();
        let scope = Rc::new(Scope::new(names, Some(structure.scope.clone())));
        self.start_frame(Frame::new(
            FrameKind::Structure(structure.definition.clone()),
            structure.definition.id,
            instructions,
            scope,
            bindings,
        ))
    }

    fn lowered(&mut self, expr: &Expr) -> Rc<Instructions> {
        if let Some(instructions) = self.lowered.get(&expr.id()) {
            return instructions.clone();
        }
        let instructions = Rc::new(expr.lower(self.context));
        self.lowered.insert(expr.id(), instructions.clone());
        instructions
    }

    fn advance(&mut self, distance: usize) {
        if let Some(frame) = self.frames.last_mut() {
            frame.advance(distance);
        }
    }

    /// Pops every finished frame, handing each result to the frame below.
    fn complete_frames(&mut self) -> Step {
        loop {
            if !self.frames.last().is_some_and(Frame::is_done) {
                return Step::Running;
            }
            let Some(frame) = self.frames.pop() else {
                return Step::Running;
            };

            let value = match frame.kind() {
                FrameKind::Structure(definition) => Value::Structure(StructureValue {
                    definition: definition.clone(),
                    scope: frame.capture(),
                }),
                FrameKind::Program | FrameKind::Function(_) => {
                    match self.stack.pop_above(frame.base()) {
                        Some(value) => value,
                        None => {
                            let exception = Exception::new(ExceptionKind::NoValue)
                                .at(frame.node())
                                .in_frame(frame.definition());
                            return self.halt(exception);
                        }
                    }
                }
            };
            self.stack.truncate(frame.base());
            debug!(depth = self.frames.len(), value = %value, "frame finished");

            if let Value::Exception(exception) = value {
                return self.halt(exception);
            }
            if self.frames.is_empty() {
                let step = Step::Produced(value);
                self.outcome = Some(step.clone());
                return step;
            }
            self.stack.push(value);
        }
    }

    fn halt(&mut self, exception: Exception) -> Step {
        debug!(exception = %exception, depth = self.frames.len(), "evaluation halted");
        let step = Step::Halted(exception);
        self.outcome = Some(step.clone());
        step
    }
}
