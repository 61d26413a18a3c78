use std::{
  ptr::{self, NonNull},
  sync::atomic::{AtomicBool, Ordering},
};

use log::{debug, trace, warn};
use spin::Mutex;

use crate::{
  block::{Block, BlockList, HEADER_SIZE},
  brk::HeapBreak,
  error::{AllocError, BreakError},
};

/// A copy of one header, taken under the allocator lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
  pub header: NonNull<u8>,
  pub payload: NonNull<u8>,
  pub size: usize,
  pub is_free: bool,
}

impl BlockInfo {
  fn read(header: *mut Block) -> Option<Self> {
    let header = NonNull::new(header)?;
    let block = unsafe { Block::load(header.as_ptr()) };

    Some(Self {
      header: header.cast(),
      payload: unsafe { header.cast::<u8>().add(HEADER_SIZE) },
      size: block.size,
      is_free: block.is_free,
    })
  }
}

struct State<B> {
  blocks: BlockList,
  brk: B,
}

/// First-fit allocator over a heap break.
///
/// Every operation runs under one lock, including all calls into the break.
pub struct HeapAllocator<B: HeapBreak> {
  state: Mutex<State<B>>,
  logging: AtomicBool,
}

impl<B: HeapBreak> HeapAllocator<B> {
  pub const fn new(brk: B) -> Self {
    Self::with_logging(brk, true)
  }

  /// An allocator that emits no log records until [`set_logging`] is called.
  ///
  /// [`set_logging`]: HeapAllocator::set_logging
  pub const fn unlogged(brk: B) -> Self {
    Self::with_logging(brk, false)
  }

  const fn with_logging(
    brk: B,
    logging: bool,
  ) -> Self {
    Self {
      state: Mutex::new(State {
        blocks: BlockList::new(),
        brk,
      }),
      logging: AtomicBool::new(logging),
    }
  }

  pub fn set_logging(
    &self,
    enabled: bool,
  ) {
    self.logging.store(enabled, Ordering::Relaxed);
  }

  fn logging(&self) -> bool {
    self.logging.load(Ordering::Relaxed)
  }

  /// Returns `size` usable bytes, or `None` for a zero size or an exhausted
  /// heap.
  pub fn allocate(
    &self,
    size: usize,
  ) -> Option<NonNull<u8>> {
    self.try_allocate(size).ok()
  }

  pub fn try_allocate(
    &self,
    size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    if size == 0 {
      return Err(AllocError::ZeroSize);
    }

    let total = HEADER_SIZE
      .checked_add(size)
      .and_then(|total| isize::try_from(total).ok())
      .ok_or(BreakError::Overflow { size })?;

    let mut state = self.state.lock();

    let reused = unsafe { state.blocks.find_free(size) };
    if let Some(header) = NonNull::new(reused) {
      let mut block = unsafe { Block::load(header.as_ptr()) };
      block.is_free = false;
      unsafe { Block::store(header.as_ptr(), block) };
      drop(state);

      let payload = unsafe { header.cast::<u8>().add(HEADER_SIZE) };
      if self.logging() {
        trace!("reused block {:?} ({} bytes) for {} bytes", header, block.size, size);
      }
      return Ok(payload);
    }

    let address = match unsafe { state.brk.sbrk(total) } {
      Ok(address) => address,
      Err(err) => {
        drop(state);
        if self.logging() {
          trace!("cannot grow heap by {} bytes: {}", total, err);
        }
        return Err(err.into());
      },
    };

    let header = address.cast::<Block>();
    unsafe {
      Block::store(header.as_ptr(), Block::new(size, false, ptr::null_mut()));
      state.blocks.push(header.as_ptr());
    }
    drop(state);

    if self.logging() {
      trace!("grew heap by {} bytes, new block {:?}", total, header);
    }
    Ok(unsafe { address.add(HEADER_SIZE) })
  }

  /// Hands a payload back.
  ///
  /// The tail block is returned to the break when it still ends at the
  /// break; any other block is marked free for reuse. Null is ignored.
  ///
  /// # Safety
  ///
  /// `payload` must be null or a pointer returned by this allocator that has
  /// not been released since. Pointers this allocator never handed out are
  /// ignored.
  pub unsafe fn release(
    &self,
    payload: *mut u8,
  ) {
    if payload.is_null() {
      return;
    }

    let mut state = self.state.lock();

    let header = unsafe { state.blocks.find(payload) };
    if header.is_null() {
      drop(state);
      if self.logging() {
        warn!("ignoring release of unknown pointer {:?}", payload);
      }
      return;
    }

    let mut block = unsafe { Block::load(header) };
    let end = payload.wrapping_add(block.size);
    let at_break = state.brk.current().is_ok_and(|brk| brk.as_ptr() == end);

    if at_break && header == state.blocks.tail() {
      unsafe { state.blocks.pop_tail() };

      let total = (HEADER_SIZE + block.size) as isize;
      let shrunk = unsafe { state.brk.sbrk(-total) };
      drop(state);

      if self.logging() {
        match shrunk {
          Ok(_) => debug!("returned {} bytes at {:?} to the heap break", total, header),
          Err(err) => warn!("block {:?} unlinked but the break stayed: {}", header, err),
        }
      }
      return;
    }

    block.is_free = true;
    unsafe { Block::store(header, block) };
    drop(state);

    if self.logging() {
      trace!("marked block {:?} ({} bytes) free", header, block.size);
    }
  }

  pub fn first_block(&self) -> Option<BlockInfo> {
    let state = self.state.lock();
    BlockInfo::read(state.blocks.head())
  }

  pub fn last_block(&self) -> Option<BlockInfo> {
    let state = self.state.lock();
    BlockInfo::read(state.blocks.tail())
  }

  /// The block listed after `block`, if `block` is still listed.
  pub fn block_after(
    &self,
    block: &BlockInfo,
  ) -> Option<BlockInfo> {
    let state = self.state.lock();
    let next = unsafe { state.blocks.successor(block.header.cast::<Block>().as_ptr()) };
    BlockInfo::read(next)
  }

  /// The listed block that owns `payload`.
  pub fn block_of(
    &self,
    payload: *const u8,
  ) -> Option<BlockInfo> {
    let state = self.state.lock();
    BlockInfo::read(unsafe { state.blocks.find(payload) })
  }

  pub fn block_count(&self) -> usize {
    let state = self.state.lock();
    unsafe { state.blocks.len() }
  }

  /// Current break, read under the allocator lock.
  pub fn heap_break(&self) -> Option<NonNull<u8>> {
    let mut state = self.state.lock();
    state.brk.current().ok()
  }
}
