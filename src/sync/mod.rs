//! Substrate sinkronisasi: ordering primitives, cache line padding,
//! dan arena raw memory.
//!
//! Semua komponen di atasnya (linked queue, ring buffer) dibangun hanya
//! dari vocabulary ini: plain / release / acquire plus satu CAS.

mod padding;
mod region;

pub use padding::{CacheLinePadded, CACHE_LINE_SIZE};
pub use region::Region;
