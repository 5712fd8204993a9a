//! Arus - Nonblocking Concurrent Queue Primitives
//!
//! Primitif antrian lock-free untuk message passing throughput tinggi
//! antar thread, dan antar process lewat shared memory:
//!
//! - [`LinkedQueueBase`]: base queue unbounded node-linked — state producer
//!   dan consumer dipisah per cache line, `size()`/`is_empty()` dibangun
//!   dari tiga ordering primitive (plain / release / acquire).
//! - [`OffHeapRingBuffer`]: ring buffer fixed-capacity slot-based,
//!   multi-producer single-consumer, arbitrase CAS pada producer index.
//! - [`SharedRingBuffer`]: protokol yang sama di atas memory-mapped file —
//!   producer dan consumer boleh process berbeda.
//!
//! Prinsip desain:
//! - Lock-Free: hanya atomic operations, tidak ada Mutex/RwLock
//! - No-Allocation di hot path ring buffer (semua layout dihitung sekali)
//! - Sentinel results: penuh/kosong adalah return value, bukan error dan
//!   bukan blocking — kebijakan spin/yield/park milik caller

pub mod linked;
pub mod ring;
pub mod sync;

pub use linked::{LinkedQueueBase, Node, UNBOUNDED_CAPACITY};
pub use ring::{OffHeapRingBuffer, SharedRingBuffer};
pub use sync::{CacheLinePadded, Region, CACHE_LINE_SIZE};
