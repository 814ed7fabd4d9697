//! Lowered instructions and the stack machine that executes them.

mod code;
mod evaluator;
mod frame;
mod instruction;
mod stack;

pub use code::Instructions;
pub use evaluator::{Evaluator, Step, StreamId};
pub use frame::{Frame, FrameKind};
pub use instruction::{Halt, HaltKind, Instruction};
pub use stack::Stack;
