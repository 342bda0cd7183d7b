/*!
This crate contains the core of pagesim, a software simulator of a paged
virtual-memory subsystem.

It contains the simulated [byte stores](mem/index.html) (physical memory
and a swap disk), the [pager](mem/pager/index.html) that moves whole frames
between them, a [TLB](mem/cache/index.html) and the
[address-space manager](mem/mmu/index.html) that translates per-process
virtual addresses through page tables embedded in the physical store.

The crate is a library consumed by an external driver that replays memory
access traces; it has no I/O surface of its own. The simulator is
single-threaded by design: all shared state is owned by one [`Mmu`]
instance and tasks are interleaved only by the driver calling in
round-robin.
*/

#[macro_use]
extern crate bitflags;

pub mod error;
#[doc(hidden)]
pub use error::*;

pub mod params;

pub mod types;
#[doc(hidden)]
pub use types::*;

pub mod mem;
#[doc(hidden)]
pub use mem::*;
