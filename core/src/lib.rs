#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]
//! Semantic core of the Quill language.
//!
//! A program is an immutable tree of [`expr::Expr`] nodes. Every node can be
//! asked for its static [`conflict::Conflict`]s, its inferred [`types::Type`],
//! and its lowered [`vm::Instructions`], which the [`vm::Evaluator`] executes
//! one step at a time.
//!
//! ```ignore
//! use quill_core::{context::{Context, Lexicon}, expr::Expr, vm::Evaluator};
//!
//! let program = Expr::list(vec![Expr::number(1.0), Expr::number(2.0)]);
//! let lexicon = Lexicon::collect(&program);
//! let context = Context::new(&lexicon);
//!
//! assert!(quill_core::conflict::analyze(&program, &context).is_empty());
//!
//! let mut evaluator = Evaluator::new(&context, Default::default());
//! evaluator.begin_pass(&program);
//! let step = evaluator.run();
//! ```

extern crate alloc;

// Re-export for convenience so other modules don't need alloc:: prefix
#[allow(unused_imports)]
pub(crate) use alloc::{
    boxed::Box, format, rc::Rc, string::String, string::ToString, vec, vec::Vec,
};

pub mod api;
pub mod binder;
pub mod conflict;
pub mod context;
pub mod expr;
pub mod node;
pub mod types;
pub mod values;
pub mod vm;

pub use api::{Diagnostic, Error, ExecutionOptions, Program, Severity};
pub use conflict::{Conflict, ConflictKind};
pub use context::{Context, Definition, Definitions, Lexicon};
pub use expr::Expr;
pub use node::{Node, NodeId, NodeRef, Replace, Replacement};
pub use types::Type;
pub use values::{Exception, ExceptionKind, Value};
pub use vm::{Evaluator, Instruction, Instructions, Step};
