//! Base Linked Queue Unbounded — Cardinality-Agnostic
//!
//! Menyimpan referensi node sisi producer dan sisi consumer, masing-masing
//! diisolasi pada cache line-nya sendiri. `size()`/`is_empty()` dibangun
//! murni dari tiga ordering primitive dan berlaku untuk varian konkret mana
//! pun (spsc/mpsc/...) yang menyusun append/poll dari accessor di sini.
//!
//! Varian konkret adalah pemilik logika link/unlink: producer melepaskan
//! ownership node saat link, consumer mengambilnya saat unlink dan
//! bertanggung jawab atas reklamasi (tidak ada garbage collector).

use std::sync::atomic::{AtomicPtr, Ordering};

use super::node::Node;
use crate::sync::CacheLinePadded;

/// Sentinel kapasitas: keluarga queue ini tidak pernah penuh.
pub const UNBOUNDED_CAPACITY: usize = usize::MAX;

/// State bersama linked queue: dua referensi node, satu per sisi.
///
/// Referensi producer hanya di-mutate logika sisi producer, referensi
/// consumer hanya oleh sisi consumer; keduanya dibaca lintas sisi dengan
/// acquire. Invariant: chain dari node consumer, diikuti lewat `next`,
/// selalu sampai ke node producer dalam hop sebanyak panjang queue;
/// queue kosong iff kedua referensi menunjuk node yang sama.
pub struct LinkedQueueBase<E> {
    producer_node: CacheLinePadded<AtomicPtr<Node<E>>>,
    consumer_node: CacheLinePadded<AtomicPtr<Node<E>>>,
}

// SAFETY: referensi node adalah AtomicPtr; disiplin akses single-writer
// per sisi ditegakkan oleh kontrak accessor di bawah.
unsafe impl<E: Send> Send for LinkedQueueBase<E> {}
unsafe impl<E: Send> Sync for LinkedQueueBase<E> {}

impl<E> LinkedQueueBase<E> {
    /// Queue baru dengan satu node sentinel (value kosong) yang dirujuk
    /// kedua sisi sekaligus — representasi kanonik "kosong".
    pub fn new() -> Self {
        let sentinel = Node::sentinel();
        Self {
            producer_node: CacheLinePadded::new(AtomicPtr::new(sentinel)),
            consumer_node: CacheLinePadded::new(AtomicPtr::new(sentinel)),
        }
    }

    // --- accessor referensi producer ---

    /// Load acquire — untuk pembaca lintas sisi.
    #[inline(always)]
    pub fn producer_node_acquire(&self) -> *mut Node<E> {
        self.producer_node.load(Ordering::Acquire)
    }

    /// Load plain — hanya untuk sisi producer sendiri.
    #[inline(always)]
    pub fn producer_node_plain(&self) -> *mut Node<E> {
        self.producer_node.load(Ordering::Relaxed)
    }

    /// Store plain. Hanya boleh dipanggil dari sisi producer; visibility
    /// lintas sisi datang dari release store pada link `next`, bukan dari
    /// store ini.
    #[inline(always)]
    pub fn set_producer_node(&self, node: *mut Node<E>) {
        self.producer_node.store(node, Ordering::Relaxed)
    }

    // --- accessor referensi consumer ---

    /// Load acquire — untuk pembaca lintas sisi.
    #[inline(always)]
    pub fn consumer_node_acquire(&self) -> *mut Node<E> {
        self.consumer_node.load(Ordering::Acquire)
    }

    /// Load plain — hanya untuk sisi consumer sendiri.
    #[inline(always)]
    pub fn consumer_node_plain(&self) -> *mut Node<E> {
        self.consumer_node.load(Ordering::Relaxed)
    }

    /// Store plain. Hanya boleh dipanggil dari sisi consumer.
    #[inline(always)]
    pub fn set_consumer_node(&self, node: *mut Node<E>) {
        self.consumer_node.store(node, Ordering::Relaxed)
    }

    /// Snapshot jumlah elemen. O(n): menyusuri semua node dari consumer ke
    /// producer. Wait-free read-only, tapi bisa langsung basi begitu return.
    pub fn size(&self) -> usize {
        // Baca consumer DULUAN. Kalau producer dibaca lebih dulu dan posisi
        // yang terlihat 'lebih tua' dari consumer yang sudah maju, chase
        // loop di bawah tidak akan pernah ketemu target.
        let mut chaser = self.consumer_node_acquire();
        let producer = self.producer_node_acquire();
        let mut size = 0usize;
        // Kejar sampai node producer — target yang sudah dibaca, bukan yang
        // sedang bergerak.
        while chaser != producer && size < UNBOUNDED_CAPACITY {
            let next = loop {
                // Link bisa belum ter-publish oleh producer yang sedang
                // menyambung; spin sampai terlihat.
                let next = unsafe { (*chaser).load_next_acquire() };
                if !next.is_null() {
                    break next;
                }
                std::hint::spin_loop();
            };
            chaser = next;
            size += 1;
        }
        size
    }

    /// Kosong iff kedua referensi menunjuk node yang sama. Ekuivalen dengan
    /// mengecek value node consumer kosong (hanya node consumer yang boleh
    /// ber-value kosong), tapi lebih murah.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.consumer_node_acquire() == self.producer_node_acquire()
    }

    /// Kapasitas: unbounded — producer tidak pernah gagal karena penuh.
    #[inline]
    pub fn capacity(&self) -> usize {
        UNBOUNDED_CAPACITY
    }

    /// Iterasi tidak stabil di bawah mutasi konkuren: tidak didukung.
    /// Selalu panic — tidak pernah mengembalikan view parsial.
    pub fn iter(&self) -> std::iter::Empty<&E> {
        panic!("iteration over a concurrent linked queue is not supported");
    }
}

impl<E> Default for LinkedQueueBase<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Drop for LinkedQueueBase<E> {
    fn drop(&mut self) {
        // &mut self: tidak ada agent lain. Jalan dari node consumer,
        // bebaskan seluruh chain; value yang belum dikonsumsi ikut di-drop
        // bersama Box-nya.
        let mut node = self.consumer_node_plain();
        while !node.is_null() {
            // SAFETY: chain hanya reachable dari self, dan self sedang drop.
            let boxed = unsafe { Node::into_box(node) };
            node = boxed.load_next_plain();
        }
    }
}
