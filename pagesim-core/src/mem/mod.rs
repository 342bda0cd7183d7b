/*!
Module covering the simulated stores and the paging machinery.

This module is the central part of pagesim. It contains the two byte
stores (physical memory and disk), the pager that moves whole frames
between them, the TLB cache and the address-space manager ([`Mmu`])
that composes all of them.
*/

pub mod phys_mem;
#[doc(hidden)]
pub use phys_mem::PhysicalMemory;

pub mod disk;
#[doc(hidden)]
pub use disk::Disk;

pub mod pager;
#[doc(hidden)]
pub use pager::Pager;

pub mod cache;
#[doc(hidden)]
pub use cache::TLBCache;

pub mod mmu;
#[doc(hidden)]
pub use mmu::Mmu;

use crate::error::Result;

/// The `ByteStore` trait is implemented by the simulated memory backends
/// and provides bounds-checked access to single byte cells.
///
/// Accesses take `&mut self` because every successful access updates the
/// store's statistics counters; those counters are the only observable
/// side effect besides the cell content itself.
pub trait ByteStore {
    /// Total number of byte cells in the store.
    fn size(&self) -> usize;

    /// Reads the cell at `position`, failing with a bounds error when
    /// `position` is outside `[0, size)`.
    fn read(&mut self, position: usize) -> Result<u8>;

    /// Writes the cell at `position`, failing with a bounds error when
    /// `position` is outside `[0, size)`.
    fn write(&mut self, position: usize, value: u8) -> Result<()>;
}
