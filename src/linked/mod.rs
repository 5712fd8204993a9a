//! Linked queue unbounded: node single-writer + base cardinality-agnostic.
//!
//! Base ini tidak memilih kardinalitas producer/consumer — varian konkret
//! (spsc, mpsc, ...) menyusun append/poll dari accessor yang disediakan.

mod node;
mod queue;

pub use node::Node;
pub use queue::{LinkedQueueBase, UNBOUNDED_CAPACITY};
