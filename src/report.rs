//! Plain-text dumps of allocator state.
//!
//! Everything here reads through the allocator's introspection methods and
//! never changes the heap.

use std::io::{self, Write};

use crate::{
  brk::HeapBreak,
  heap::{BlockInfo, HeapAllocator},
};

pub fn write_break<B: HeapBreak>(
  out: &mut impl Write,
  heap: &HeapAllocator<B>,
) -> io::Result<()> {
  match heap.heap_break() {
    Some(brk) => writeln!(out, "brk: {:?}", brk),
    None => writeln!(out, "brk: unavailable"),
  }
}

pub fn write_header(
  out: &mut impl Write,
  block: Option<&BlockInfo>,
) -> io::Result<()> {
  let Some(block) = block else {
    return Ok(());
  };

  writeln!(out, "hdr:  {:?}", block.header)?;
  writeln!(out, "size: {}", block.size)?;
  writeln!(out, "free: {}", block.is_free)
}

/// The payload address followed by the header that owns it.
pub fn write_block<B: HeapBreak>(
  out: &mut impl Write,
  heap: &HeapAllocator<B>,
  payload: *const u8,
) -> io::Result<()> {
  writeln!(out, "addr: {:?}", payload)?;
  if payload.is_null() {
    return Ok(());
  }
  write_header(out, heap.block_of(payload).as_ref())
}

pub fn write_alloc_list<B: HeapBreak>(
  out: &mut impl Write,
  heap: &HeapAllocator<B>,
) -> io::Result<()> {
  writeln!(out, "== head")?;
  write_header(out, heap.first_block().as_ref())?;
  writeln!(out, "== tail")?;
  write_header(out, heap.last_block().as_ref())
}

/// Every listed header in list order.
pub fn write_blocks<B: HeapBreak>(
  out: &mut impl Write,
  heap: &HeapAllocator<B>,
) -> io::Result<()> {
  let mut current = heap.first_block();
  let mut index = 0;

  while let Some(block) = current {
    writeln!(out, "== block {}", index)?;
    write_header(out, Some(&block))?;
    current = heap.block_after(&block);
    index += 1;
  }

  Ok(())
}
