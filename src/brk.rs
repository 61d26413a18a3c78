use std::{
  alloc::{self, Layout},
  mem,
  ptr::NonNull,
};

use libc::{c_void, intptr_t, sbrk};

use crate::error::BreakError;

/// The end of a growable heap region.
pub trait HeapBreak {
  /// Moves the break by `delta` bytes and returns where it was before the move.
  ///
  /// A zero `delta` only reads the break.
  ///
  /// # Safety
  ///
  /// Memory above the new break must no longer be accessed after a shrink.
  unsafe fn sbrk(
    &mut self,
    delta: isize,
  ) -> Result<NonNull<u8>, BreakError>;

  fn current(&mut self) -> Result<NonNull<u8>, BreakError> {
    unsafe { self.sbrk(0) }
  }
}

/// The process data segment, moved with `sbrk(2)`.
///
/// There is one program break per process, so the only instance lives inside
/// [`process_heap`](crate::process_heap).
#[derive(Debug)]
pub struct ProgramBreak {
  _private: (),
}

impl ProgramBreak {
  pub(crate) const fn new() -> Self {
    Self { _private: () }
  }
}

impl HeapBreak for ProgramBreak {
  unsafe fn sbrk(
    &mut self,
    delta: isize,
  ) -> Result<NonNull<u8>, BreakError> {
    let previous = unsafe { sbrk(delta as intptr_t) };

    if previous == usize::MAX as *mut c_void {
      return Err(BreakError::Refused { delta });
    }

    NonNull::new(previous.cast()).ok_or(BreakError::Refused { delta })
  }
}

/// A fixed-capacity buffer with a movable break, standing in for the data
/// segment.
///
/// The base is aligned like a machine word, matching a fresh program break.
pub struct SimulatedBreak {
  base: NonNull<u8>,
  capacity: usize,
  offset: usize,
}

// The buffer is uniquely owned and only reached through `&mut self`.
unsafe impl Send for SimulatedBreak {}

impl SimulatedBreak {
  pub fn with_capacity(capacity: usize) -> Self {
    let capacity = capacity.min(isize::MAX as usize - mem::align_of::<usize>());
    let layout = Self::layout(capacity);
    let base = unsafe { alloc::alloc_zeroed(layout) };
    let Some(base) = NonNull::new(base) else {
      alloc::handle_alloc_error(layout);
    };

    Self {
      base,
      capacity,
      offset: 0,
    }
  }

  /// First address of the region; the break before any growth.
  pub fn base(&self) -> NonNull<u8> {
    self.base
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Bytes currently below the break.
  pub fn used(&self) -> usize {
    self.offset
  }

  fn layout(capacity: usize) -> Layout {
    Layout::from_size_align(capacity.max(1), mem::align_of::<usize>())
      .unwrap_or(Layout::new::<usize>())
  }
}

impl HeapBreak for SimulatedBreak {
  unsafe fn sbrk(
    &mut self,
    delta: isize,
  ) -> Result<NonNull<u8>, BreakError> {
    let previous = self.offset;
    let moved = previous
      .checked_add_signed(delta)
      .filter(|&offset| offset <= self.capacity)
      .ok_or(BreakError::Refused { delta })?;

    self.offset = moved;
    Ok(unsafe { self.base.add(previous) })
  }
}

impl Drop for SimulatedBreak {
  fn drop(&mut self) {
    unsafe { alloc::dealloc(self.base.as_ptr(), Self::layout(self.capacity)) };
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn returns_the_break_before_moving() {
    let mut brk = SimulatedBreak::with_capacity(64);
    let base = brk.base();

    unsafe {
      assert_eq!(brk.sbrk(16), Ok(base));
      assert_eq!(brk.sbrk(8), Ok(base.add(16)));
      assert_eq!(brk.current(), Ok(base.add(24)));
      assert_eq!(brk.sbrk(-24), Ok(base.add(24)));
    }

    assert_eq!(brk.current(), Ok(base));
    assert_eq!(brk.used(), 0);
  }

  #[test]
  fn zero_delta_is_a_query() {
    let mut brk = SimulatedBreak::with_capacity(32);

    unsafe { brk.sbrk(12).unwrap() };

    let before = brk.used();
    let first = brk.current().unwrap();
    let second = brk.current().unwrap();

    assert_eq!(first, second);
    assert_eq!(brk.used(), before);
  }

  #[test]
  fn refuses_to_leave_the_region() {
    let mut brk = SimulatedBreak::with_capacity(32);

    unsafe {
      assert_eq!(brk.sbrk(33), Err(BreakError::Refused { delta: 33 }));
      assert_eq!(brk.sbrk(-1), Err(BreakError::Refused { delta: -1 }));
      assert!(brk.sbrk(32).is_ok());
      assert_eq!(brk.sbrk(1), Err(BreakError::Refused { delta: 1 }));
    }

    assert_eq!(brk.used(), 32);
  }

  #[test]
  fn base_is_word_aligned() {
    let brk = SimulatedBreak::with_capacity(3);

    assert_eq!(brk.base().as_ptr() as usize % mem::align_of::<usize>(), 0);
    assert_eq!(brk.capacity(), 3);
  }

  #[test]
  fn program_break_answers_queries() {
    let mut brk = ProgramBreak::new();

    assert!(brk.current().is_ok());
  }
}
