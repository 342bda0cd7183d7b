/*!
Fixed parameters of the simulation.

These are build-time constants, not tunables: the metadata layout inside
physical memory (page-table area, resident-list area) is computed from them
and every component assumes the same values.
*/

/// Size of a page and of a frame, in bytes.
pub const PAGE_SIZE: usize = 256;

/// Number of virtual pages in a process address space.
pub const NB_PAGES_IN_PROCESS_ADDRESS_SPACE: usize = 256;

/// Maximum number of processes that can register an address space.
///
/// This bounds the page-table and resident-list areas reserved at the
/// bottom of physical memory.
pub const MAX_NUMBER_PROCESSES: usize = 4;

/// Number of entries in the translation look-aside buffer.
pub const TLB_SIZE: usize = 16;

/// Default physical memory size: 256 frames of 256 bytes.
pub const MEMORY_SIZE: usize = 256 * 256;

/// Default disk size: 256 * 256 frames of 256 bytes.
pub const DISK_SIZE: usize = 256 * 256 * 256;

/// Size of a page-table entry in bytes:
/// flag byte, frame byte, disk-frame MSB, disk-frame LSB.
pub const PTE_SIZE: usize = 4;

/// Simulated cost of one physical memory access, in milliseconds.
pub const MEMORY_ACCESS_TIME_MS: f64 = 0.000_100;

/// Simulated cost of one disk access (seek), in milliseconds.
pub const DISK_ACCESS_TIME_MS: u64 = 10;

/// Simulated cost of one transferred disk byte, in milliseconds.
pub const DISK_TRANSFER_TIME_MS: u64 = 1;
