use std::{
  alloc::{GlobalAlloc, Layout},
  mem, ptr,
};

use crate::{align::word_align, block::Block, brk::ProgramBreak, heap::HeapAllocator};

static PROCESS_HEAP: HeapAllocator<ProgramBreak> = HeapAllocator::unlogged(ProgramBreak::new());

/// The allocator over the process's program break.
///
/// It lives as long as the process and is never torn down. Logging starts
/// disabled so the heap can back the global allocator.
pub fn process_heap() -> &'static HeapAllocator<ProgramBreak> {
  &PROCESS_HEAP
}

/// [`GlobalAlloc`] front for [`process_heap`].
///
/// ```rust,ignore
/// #[global_allocator]
/// static GLOBAL: brkalloc::BrkAlloc = brkalloc::BrkAlloc;
/// ```
///
/// Sizes are rounded up to the machine word so consecutive headers stay
/// aligned. Layouts asking for more than the header's alignment get null.
pub struct BrkAlloc;

unsafe impl GlobalAlloc for BrkAlloc {
  unsafe fn alloc(
    &self,
    layout: Layout,
  ) -> *mut u8 {
    if layout.align() > mem::align_of::<Block>() {
      return ptr::null_mut();
    }

    let word = mem::size_of::<usize>();
    if layout.size() > isize::MAX as usize - word {
      return ptr::null_mut();
    }
    let size = word_align(layout.size()).max(word);

    let Some(payload) = PROCESS_HEAP.allocate(size) else {
      return ptr::null_mut();
    };

    // The break is only word-aligned if every other user of it kept it so.
    if payload.as_ptr() as usize % layout.align() != 0 {
      unsafe { PROCESS_HEAP.release(payload.as_ptr()) };
      return ptr::null_mut();
    }

    payload.as_ptr()
  }

  unsafe fn dealloc(
    &self,
    ptr: *mut u8,
    _layout: Layout,
  ) {
    unsafe { PROCESS_HEAP.release(ptr) }
  }
}
