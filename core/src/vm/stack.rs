use crate::Vec;
use alloc::fmt;

/// The evaluator's value stack.
///
/// Frames share one stack; each frame only pops values above the height it
/// started at. `capacity` is a preallocation hint, not a limit: recursion
/// depth is bounded by the frame limit instead.
///
/// # Examples
///
/// ```ignore
/// use quill_core::vm::Stack;
///
/// let mut stack = Stack::new(100);
/// stack.push(42);
/// stack.push(17);
/// assert_eq!(stack.pop_above(0), Some(17));
/// assert_eq!(stack.peek(), Some(&42));
/// assert_eq!(stack.len(), 1);
/// ```
pub struct Stack<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> Stack<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    pub fn push(&mut self, value: T) {
        self.items.push(value);
    }

    /// Removes and returns the top value, unless that would take the stack
    /// below `base`.
    #[inline]
    pub fn pop_above(&mut self, base: usize) -> Option<T> {
        if self.items.len() > base {
            self.items.pop()
        } else {
            None
        }
    }

    #[inline]
    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Drops everything above `height`.
    #[inline]
    pub fn truncate(&mut self, height: usize) {
        self.items.truncate(height);
    }

    /// Iterates from bottom to top.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack")
            .field("items", &self.items)
            .field("len", &self.items.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
