//! Public error types for the Quill API.
//!
//! Analysis findings and runtime exceptions are ordinary data inside the
//! core. They become an [`Error`] only at the API boundary, when a caller
//! asks for a checked program or a finished evaluation.

use crate::node::NodeId;
use crate::values::Exception;
use crate::{String, Vec};
use core::fmt;
use thiserror::Error;

/// Public error type for all Quill operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Analysis found conflicts.
    ///
    /// Contains one diagnostic per conflict, in tree order.
    #[error("analysis failed with {} error(s)", error_count(.diagnostics))]
    Conflicts { diagnostics: Vec<Diagnostic> },

    /// Evaluation ended with an exception.
    #[error("evaluation failed: {0}")]
    Exception(Exception),

    /// Evaluation did not finish within the configured number of steps.
    #[error("evaluation exceeded the limit of {limit} steps")]
    StepLimit { limit: usize },
}

fn error_count(diagnostics: &[Diagnostic]) -> usize {
    diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count()
}

/// A diagnostic message (error, warning, or info) attached to tree nodes.
///
/// Hosts map node ids back to source ranges themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Severity level (error, warning, info).
    pub severity: Severity,

    /// Primary diagnostic message.
    pub message: String,

    /// Nodes the primary issue is about.
    pub nodes: Vec<NodeId>,

    /// Related nodes that provide additional context.
    pub related: Vec<RelatedInfo>,

    /// Optional help text suggesting how to fix the issue.
    pub help: Option<String>,

    /// Optional conflict code (e.g., "C001") for documentation lookup.
    pub code: Option<String>,
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - the program cannot be trusted to evaluate.
    Error,
    /// Warning - suspicious code that might be wrong.
    Warning,
    /// Info - informational message.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Related information for a diagnostic (e.g., "declared here").
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedInfo {
    /// Nodes the related information is about.
    pub nodes: Vec<NodeId>,

    /// Locale-neutral key explaining the relevance.
    pub message: String,
}

impl From<Exception> for Error {
    fn from(exception: Exception) -> Self {
        match exception.kind {
            crate::values::ExceptionKind::StepLimit { limit } => Error::StepLimit { limit },
            _ => Error::Exception(exception),
        }
    }
}
