use std::io::{self, Write};

use anyhow::Context;
use brkalloc::{
  process_heap,
  report::{write_alloc_list, write_block, write_break},
};

/// Echoes the arguments, then allocates and releases one 20 byte block on
/// the process heap, dumping the program break and the block list after
/// every step.
///
/// Run with `RUST_LOG=trace` to see the allocator's own records.
fn main() -> anyhow::Result<()> {
  env_logger::init();

  let heap = process_heap();
  heap.set_logging(true);

  let stdout = io::stdout();
  let mut out = stdout.lock();

  for (index, arg) in std::env::args().enumerate() {
    writeln!(out, "argv[{}]: {}", index, arg)?;
  }

  write_break(&mut out, heap)?;
  write_alloc_list(&mut out, heap)?;
  writeln!(out)?;

  let payload = heap.allocate(20).context("the program break refused to grow")?;
  writeln!(out, "== malloc'ed block")?;
  write_block(&mut out, heap, payload.as_ptr())?;
  write_break(&mut out, heap)?;
  write_alloc_list(&mut out, heap)?;

  unsafe { heap.release(payload.as_ptr()) };
  writeln!(out, "== free'ed block")?;
  write_break(&mut out, heap)?;
  write_alloc_list(&mut out, heap)?;

  out.flush()?;
  Ok(())
}
