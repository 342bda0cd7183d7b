pub mod tlb_cache;

#[doc(hidden)]
pub use tlb_cache::TLBCache;
