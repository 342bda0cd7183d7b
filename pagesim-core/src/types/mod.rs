/*!
Module with basic types used in pagesim.

It contains the process identifier type and the binary page-table entry
representation shared by the address-space manager and its tests.
*/

pub mod page;
#[doc(hidden)]
pub use page::{PageFlags, PageState, PageTableEntry};

/// Identifier of a simulated process.
pub type Pid = u32;
