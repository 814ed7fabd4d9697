//! Quill - the semantic core of an educational programming language
//!
//! # Overview
//!
//! Quill programs are immutable trees built by an external parser (or by the
//! builder functions on [`Expr`]). This crate answers three questions about a
//! tree:
//!
//! - What is wrong with it? [`Program::conflicts`] lists every static
//!   [`Conflict`], each with a stable code and the nodes it implicates.
//! - What does each expression produce? [`Context::type_of`] infers types on
//!   demand, memoized per context.
//! - What does it evaluate to? [`Program::lower`] turns the tree into a flat
//!   instruction listing that an [`Evaluator`] runs one step at a time.
//!
//! # Quick Start
//!
//! ```
//! use quill::{BinaryOperator, Context, ExecutionOptions, Expr, Program, Value};
//!
//! let program = Program::new(Expr::binary(
//!     Expr::number(1.0),
//!     BinaryOperator::Add,
//!     Expr::number(2.0),
//! ));
//! let lexicon = program.lexicon();
//! let context = Context::new(&lexicon);
//!
//! assert!(program.conflicts(&context).is_empty());
//! let value = program.run(&context, ExecutionOptions::default()).unwrap();
//! assert_eq!(value, Value::number(3.0));
//! ```
//!
//! # Stepping
//!
//! Hosts that visualize evaluation drive the evaluator themselves:
//!
//! ```
//! use quill::{Context, ExecutionOptions, Expr, Program, Step};
//!
//! let program = Program::new(Expr::list(vec![Expr::number(1.0)]));
//! let lexicon = program.lexicon();
//! let context = Context::new(&lexicon);
//!
//! let mut evaluator = program.evaluator(&context, ExecutionOptions::default());
//! assert_eq!(evaluator.step_to_boundary(), Step::Running);
//! assert!(evaluator.active_node().is_some());
//! ```

// Re-export public API from quill_core
pub use quill_core::api::{Diagnostic, Error, ExecutionOptions, Program, RelatedInfo, Severity};

// Re-export the tree, its analysis, and evaluation
pub use quill_core::conflict::{self, Conflict, ConflictKind};
pub use quill_core::context::{Context, Definition, Definitions, Lexicon};
pub use quill_core::expr::{
    self, BinaryOperator, Expr, FunctionDefinition, StructureDefinition, UnaryOperator,
};
pub use quill_core::node::{self, Bind, Name, Node, NodeId, Replace, Replacement};
pub use quill_core::types::{self, Type, Unit};
pub use quill_core::values::{self, Exception, ExceptionKind, Value};
pub use quill_core::vm::{self, Evaluator, Instruction, Instructions, Step};
