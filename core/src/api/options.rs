//! Configuration options for evaluation.

/// Resource limits for an evaluation.
///
/// # Example
///
/// ```
/// use quill_core::api::ExecutionOptions;
///
/// let options = ExecutionOptions {
///     max_steps: Some(10_000),
///     ..ExecutionOptions::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Maximum number of frames active at once (for recursion protection).
    ///
    /// Default: 256
    pub max_depth: usize,

    /// Maximum number of instructions a pass may execute (if Some).
    ///
    /// Set to `None` for no limit (be careful with untrusted programs!).
    ///
    /// Default: None
    pub max_steps: Option<usize>,

    /// Initial capacity of the value stack.
    ///
    /// Default: 256
    pub value_stack_size: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            max_depth: 256,
            max_steps: None,
            value_stack_size: 256,
        }
    }
}
