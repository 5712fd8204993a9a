//! Ring buffer slot protocol + instansiasi off-heap.
//!
//! Protokol MPSC fixed-message-size yang sama dipakai untuk dua backing:
//! alokasi private aligned (intra-process) dan memory-mapped file
//! (antar process).

mod buffer;
mod layout;
mod shared;

pub use buffer::OffHeapRingBuffer;
pub use shared::SharedRingBuffer;
