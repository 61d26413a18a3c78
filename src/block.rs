use std::{mem, ptr};

/// Metadata written in front of every payload.
///
/// Growth requests are exactly `HEADER_SIZE + size` bytes, so a header that
/// follows an odd-sized payload is not naturally aligned. Headers are only
/// ever moved in and out of the heap with unaligned loads and stores.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct Block {
  pub size: usize,
  pub is_free: bool,
  pub next: *mut Block,
}

pub const HEADER_SIZE: usize = mem::size_of::<Block>();

impl Block {
  pub fn new(
    size: usize,
    is_free: bool,
    next: *mut Block,
  ) -> Self {
    Self { size, is_free, next }
  }

  pub unsafe fn load(header: *const Block) -> Block {
    unsafe { header.read_unaligned() }
  }

  pub unsafe fn store(
    header: *mut Block,
    block: Block,
  ) {
    unsafe { header.write_unaligned(block) }
  }

  pub fn payload(header: *mut Block) -> *mut u8 {
    header.cast::<u8>().wrapping_add(HEADER_SIZE)
  }
}

/// Headers in the order their memory was taken from the break.
///
/// Callers hold the allocator lock and only pass headers that are in the
/// list.
pub struct BlockList {
  head: *mut Block,
  tail: *mut Block,
}

// Links are only followed by the owner of the allocator lock.
unsafe impl Send for BlockList {}

impl BlockList {
  pub const fn new() -> Self {
    Self {
      head: ptr::null_mut(),
      tail: ptr::null_mut(),
    }
  }

  pub fn head(&self) -> *mut Block {
    self.head
  }

  pub fn tail(&self) -> *mut Block {
    self.tail
  }

  pub fn is_empty(&self) -> bool {
    self.head.is_null()
  }

  /// First block in list order that is free and holds at least `size` bytes.
  pub unsafe fn find_free(
    &self,
    size: usize,
  ) -> *mut Block {
    unsafe {
      let mut current = self.head;

      while !current.is_null() {
        let block = Block::load(current);
        if block.is_free && block.size >= size {
          return current;
        }
        current = block.next;
      }

      ptr::null_mut()
    }
  }

  /// The listed header whose payload starts at `payload`.
  pub unsafe fn find(
    &self,
    payload: *const u8,
  ) -> *mut Block {
    unsafe {
      let mut current = self.head;

      while !current.is_null() {
        if Block::payload(current).cast_const() == payload {
          return current;
        }
        current = Block::load(current).next;
      }

      ptr::null_mut()
    }
  }

  /// The header listed after `header`, or null if `header` is the tail or
  /// no longer listed.
  pub unsafe fn successor(
    &self,
    header: *const Block,
  ) -> *mut Block {
    unsafe {
      let mut current = self.head;

      while !current.is_null() {
        let block = Block::load(current);
        if current.cast_const() == header {
          return block.next;
        }
        current = block.next;
      }

      ptr::null_mut()
    }
  }

  pub unsafe fn len(&self) -> usize {
    unsafe {
      let mut count = 0;
      let mut current = self.head;

      while !current.is_null() {
        count += 1;
        current = Block::load(current).next;
      }

      count
    }
  }

  /// Appends a header whose `next` is already null.
  pub unsafe fn push(
    &mut self,
    header: *mut Block,
  ) {
    unsafe {
      if self.head.is_null() {
        self.head = header;
      } else {
        let mut last = Block::load(self.tail);
        last.next = header;
        Block::store(self.tail, last);
      }
      self.tail = header;
    }
  }

  /// Unlinks the tail and returns it. The new tail is found by walking from
  /// the head.
  pub unsafe fn pop_tail(&mut self) -> *mut Block {
    unsafe {
      let popped = self.tail;

      if self.is_empty() {
        return popped;
      }

      if self.head == self.tail {
        self.head = ptr::null_mut();
        self.tail = ptr::null_mut();
        return popped;
      }

      let mut current = self.head;
      loop {
        let mut block = Block::load(current);
        if block.next == popped {
          block.next = ptr::null_mut();
          Block::store(current, block);
          self.tail = current;
          break;
        }
        current = block.next;
      }

      debug_assert!(Block::load(self.tail).next.is_null());
      popped
    }
  }
}
