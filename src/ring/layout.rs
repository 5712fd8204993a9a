//! Layout Byte Off-Heap Ring Buffer (versioned, bit-exact untuk IPC)
//!
//! ┌──────────────────────────────────────────────────────────┐
//! │ line 0: magic u64 │ version u32 │ capacity u32           │
//! │         message_size u32                                 │
//! ├──────────────────────────────────────────────────────────┤
//! │ line 1: producer_index u64 (CAS-contended antar producer)│
//! ├──────────────────────────────────────────────────────────┤
//! │ line 2: consumer_index u64 (milik consumer tunggal)      │
//! ├──────────────────────────────────────────────────────────┤
//! │ slot[0]: state u32 │ payload (message_size bytes)        │
//! │ slot[1]: ... stride dibulatkan ke cache line             │
//! └──────────────────────────────────────────────────────────┘
//!
//! Setiap field yang di-mutate agent berbeda menempati cache line sendiri;
//! setiap slot mulai pada offset aligned cache line, jadi metadata slot
//! bertetangga tidak berbagi line antar accessor konkuren.

use crate::sync::CACHE_LINE_SIZE;

/// "ARUS_RV1" — magic number format region, untuk validasi saat attach.
pub(crate) const MAGIC: u64 = 0x4152_5553_5F52_5631;
pub(crate) const VERSION: u32 = 1;

pub(crate) const MAGIC_OFFSET: usize = 0;
pub(crate) const VERSION_OFFSET: usize = 8;
pub(crate) const CAPACITY_OFFSET: usize = 12;
pub(crate) const MESSAGE_SIZE_OFFSET: usize = 16;

pub(crate) const PRODUCER_INDEX_OFFSET: usize = CACHE_LINE_SIZE;
pub(crate) const CONSUMER_INDEX_OFFSET: usize = 2 * CACHE_LINE_SIZE;
pub(crate) const SLOTS_OFFSET: usize = 3 * CACHE_LINE_SIZE;

/// Readiness marker per slot: u32 tepat sebelum payload.
pub(crate) const STATE_SIZE: usize = 4;

// State machine per slot:
//   READ_RELEASED --claim producer (CAS producer_index)--> WRITE_CLAIMED
//   WRITE_CLAIMED --write_release (release store)--------> WRITTEN
//   WRITTEN       --consumer majukan consumer_index------> READ_CLAIMED
//   READ_CLAIMED  --read_release (release store)---------> READ_RELEASED
// Hanya dua state yang pernah DISIMPAN di marker: transisi claim dibawa
// oleh ownership index (CAS producer / advance consumer), bukan oleh store
// state tersendiri.
pub(crate) const STATE_READ_RELEASED: u32 = 0;
pub(crate) const STATE_WRITTEN: u32 = 1;

/// Kapasitas efektif: dibulatkan ke atas ke power of two berikutnya,
/// supaya `index mod capacity` cukup dengan mask.
pub(crate) fn effective_capacity(requested: usize) -> usize {
    requested.next_power_of_two()
}

/// Jarak antar slot: marker + payload, dibulatkan ke kelipatan cache line.
pub(crate) fn slot_stride(message_size: usize) -> usize {
    (STATE_SIZE + message_size + CACHE_LINE_SIZE - 1) & !(CACHE_LINE_SIZE - 1)
}

/// Total bytes region yang dibutuhkan untuk kapasitas (sudah power of two)
/// dan message size tertentu.
pub(crate) fn required_size(capacity: usize, message_size: usize) -> usize {
    SLOTS_OFFSET + capacity * slot_stride(message_size)
}
