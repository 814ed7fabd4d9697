//! Public API for the Quill semantic core.
//!
//! Hosts build a [`Program`] from a parsed tree, supply a
//! [`Context`](crate::context::Context) that resolves names, and then ask
//! for conflicts, instructions, or a finished evaluation.
//!
//! # Example
//!
//! ```ignore
//! use quill_core::api::{ExecutionOptions, Program};
//! use quill_core::{Context, Expr};
//!
//! let program = Program::new(Expr::number(2.0));
//! let lexicon = program.lexicon();
//! let context = Context::new(&lexicon);
//!
//! program.check(&context)?;
//! let value = program.run(&context, ExecutionOptions::default())?;
//! ```

pub mod error;
pub mod options;
pub mod program;

pub use error::{Diagnostic, Error, RelatedInfo, Severity};
pub use options::ExecutionOptions;
pub use program::Program;
