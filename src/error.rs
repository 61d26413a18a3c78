use thiserror::Error;

/// A heap break that could not be moved.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BreakError {
  #[error("the heap break cannot move by {delta} bytes")]
  Refused { delta: isize },
  #[error("a block of {size} bytes does not fit in a break adjustment")]
  Overflow { size: usize },
}

/// Why `try_allocate` returned no memory.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
  #[error("zero-sized allocation request")]
  ZeroSize,
  #[error("heap exhausted: {0}")]
  Exhausted(#[from] BreakError),
}
