//! # brkalloc - A First-Fit Heap Allocator over the Program Break
//!
//! This crate provides a small thread-safe allocator that grows and shrinks
//! a contiguous heap region with `sbrk(2)` and keeps every block it ever
//! handed out in a singly-linked list.
//!
//! ## Overview
//!
//! ```text
//!   Heap Region:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                                                                      │
//!   │   ┌────┬──────┬────┬────────┬────┬─────┐                             │
//!   │   │ H1 │  P1  │ H2 │   P2   │ H3 │ P3  │      (not yet requested)    │
//!   │   └────┴──────┴────┴────────┴────┴─────┘                             │
//!   │   ▲              ▲                      ▲                            │
//!   │   │              │                      │                            │
//!   │  head      free, reusable            Program                         │
//!   │                                       Break                          │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **allocate**: the first free block large enough is reused whole
//!   (first-fit, no splitting); otherwise the break moves up by exactly
//!   `header + size` and the new block is appended.
//! - **release**: if the block is the tail and still ends at the break, the
//!   break moves back down and the block disappears; any other block is
//!   only marked free. Free blocks are never merged.
//!
//! ## Crate Structure
//!
//! ```text
//!   brkalloc
//!   ├── align      - word rounding for BrkAlloc sizes (internal)
//!   ├── block      - block header and block list (internal)
//!   ├── brk        - HeapBreak, ProgramBreak, SimulatedBreak
//!   ├── error      - BreakError, AllocError
//!   ├── heap       - HeapAllocator
//!   ├── process    - process_heap() and the BrkAlloc global allocator
//!   └── report     - read-only text dumps of allocator state
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use brkalloc::{HeapAllocator, SimulatedBreak};
//!
//! let heap = HeapAllocator::new(SimulatedBreak::with_capacity(4096));
//!
//! let payload = heap.allocate(20).unwrap();
//! assert_eq!(heap.last_block().unwrap().size, 20);
//!
//! unsafe { heap.release(payload.as_ptr()) };
//! assert!(heap.last_block().is_none());
//! ```
//!
//! ## Block Layout
//!
//! ```text
//!   ┌───────────────────────┬────────────────────────────────┐
//!   │    Block Header       │         Payload                │
//!   │  ┌─────────────────┐  │                                │
//!   │  │ size: N         │  │  ┌──────────────────────────┐  │
//!   │  │ is_free: false  │  │  │     N bytes usable       │  │
//!   │  │ next: null/ptr  │  │  └──────────────────────────┘  │
//!   │  └─────────────────┘  │                                │
//!   └───────────────────────┴────────────────────────────────┘
//!                           ▲
//!                           └── Pointer returned to the caller
//! ```
//!
//! ## Limitations
//!
//! - **No splitting or coalescing**: oversized free blocks are handed out
//!   whole and neighbouring free blocks stay separate.
//! - **Tail-only shrinking**: memory goes back to the OS only from the end.
//! - **Alignment**: payloads are only as aligned as the break and the sizes
//!   before them make them; [`BrkAlloc`] rounds sizes to keep word alignment.
//! - **Unix-only**: [`ProgramBreak`] requires `sbrk` from `libc`.

mod align;
mod block;
mod brk;
mod error;
mod heap;
mod process;
pub mod report;

pub use block::HEADER_SIZE;
pub use brk::{HeapBreak, ProgramBreak, SimulatedBreak};
pub use error::{AllocError, BreakError};
pub use heap::{BlockInfo, HeapAllocator};
pub use process::{BrkAlloc, process_heap};
