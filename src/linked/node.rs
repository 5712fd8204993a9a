//! Link Cell Single-Writer untuk Linked Queue
//!
//! Setiap node ditulis oleh tepat satu agent (producer yang
//! mengalokasikannya), kecuali `next` yang ditulis tepat sekali oleh
//! producer penyambung node berikutnya — dengan release store — dan dibaca
//! consumer dengan acquire. Chain hanya maju (singly linked), tidak ada
//! back-reference.

use std::cell::UnsafeCell;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

/// Node linked queue. `value == None` hanya boleh terjadi pada node
/// sentinel yang sedang dirujuk consumer (head yang sudah "spent").
pub struct Node<E> {
    value: UnsafeCell<Option<E>>,
    next: AtomicPtr<Node<E>>,
}

// SAFETY: value diakses oleh maksimal satu agent pada satu waktu sesuai
// protokol ownership — producer sebelum link, consumer setelah unlink.
// next adalah AtomicPtr.
unsafe impl<E: Send> Send for Node<E> {}
unsafe impl<E: Send> Sync for Node<E> {}

impl<E> Node<E> {
    /// Alokasi node berisi `value`. Ownership berpindah ke queue saat node
    /// di-link; pointer akhirnya dibebaskan consumer lewat [`Node::into_box`].
    pub fn new(value: E) -> *mut Node<E> {
        Box::into_raw(Box::new(Node {
            value: UnsafeCell::new(Some(value)),
            next: AtomicPtr::new(ptr::null_mut()),
        }))
    }

    /// Node sentinel tanpa value, untuk head awal queue.
    pub fn sentinel() -> *mut Node<E> {
        Box::into_raw(Box::new(Node {
            value: UnsafeCell::new(None),
            next: AtomicPtr::new(ptr::null_mut()),
        }))
    }

    /// Link node berikutnya dengan release store. Dipanggil tepat sekali
    /// per node, oleh producer yang menyambung node berikutnya; semua write
    /// producer sebelum link ikut ter-publish.
    #[inline(always)]
    pub fn store_next_release(&self, next: *mut Node<E>) {
        self.next.store(next, Ordering::Release);
    }

    /// Load `next` dengan acquire. Bisa null kalau link belum ter-publish —
    /// caller harus retry/spin.
    #[inline(always)]
    pub fn load_next_acquire(&self) -> *mut Node<E> {
        self.next.load(Ordering::Acquire)
    }

    /// Load `next` plain. Hanya untuk agent yang tidak pernah balapan dengan
    /// dirinya sendiri, mis. consumer membaca node yang sudah jadi miliknya.
    #[inline(always)]
    pub fn load_next_plain(&self) -> *mut Node<E> {
        self.next.load(Ordering::Relaxed)
    }

    /// Ambil value keluar dari node.
    ///
    /// # Safety
    /// Hanya consumer — setelah node menjadi miliknya — yang boleh memanggil
    /// ini, dan tidak boleh konkuren dengan akses value lain ke node yang sama.
    #[inline(always)]
    pub unsafe fn take_value(&self) -> Option<E> {
        (*self.value.get()).take()
    }

    /// Ambil kembali ownership node untuk reklamasi.
    ///
    /// # Safety
    /// `node` harus berasal dari [`Node::new`] / [`Node::sentinel`] dan tidak
    /// lagi reachable oleh agent lain (termasuk pembaca `size()` yang sedang
    /// menyusuri chain).
    pub unsafe fn into_box(node: *mut Node<E>) -> Box<Node<E>> {
        Box::from_raw(node)
    }
}
