//! Arena Raw Memory dengan Typed Accessor untuk Tiga Mode Ordering
//!
//! Memory dimodelkan sebagai byte range contiguous yang dialamati offset
//! integer. Semua pointer arithmetic di crate ini dikurung di module ini;
//! komponen lain hanya memakai accessor yang bounds-checked.
//!
//! Tiga mode akses — vocabulary yang dipakai seluruh protokol:
//! - plain   : `Relaxed` — tanpa jaminan ordering lintas agent
//! - release : store yang mem-publish semua write sebelumnya milik agent ini
//! - acquire : load yang melihat release store terbaru beserta semua
//!             yang mendahuluinya
//!
//! Plus satu CAS untuk arbitrase multi-producer. Tidak ada full fence di
//! mana pun: pasangan acquire/release satu sisi sudah minimal secara biaya
//! coherence untuk field single-writer/single-reader.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// View non-owning atas byte range contiguous — private allocation
/// atau memory-mapped region. Lifetime memory adalah tanggung jawab
/// pemilik backing, bukan `Region`.
#[derive(Debug)]
pub struct Region {
    base: *mut u8,
    len: usize,
}

// SAFETY: semua akses lintas thread terjadi lewat atomic accessor di bawah;
// payload copy (non-atomic) diproteksi protokol slot — hanya agent yang
// memegang claim eksklusif yang menyentuh byte payload.
unsafe impl Send for Region {}
unsafe impl Sync for Region {}

impl Region {
    /// Bungkus pointer mentah menjadi region.
    ///
    /// # Safety
    /// `base` harus valid untuk read/write sepanjang `len` bytes selama
    /// `Region` hidup, dan aligned minimal 8 bytes (mmap dan aligned
    /// allocation selalu memenuhi ini).
    pub unsafe fn from_raw_parts(base: *mut u8, len: usize) -> Self {
        debug_assert!(base as usize % 8 == 0, "base region harus aligned 8 bytes");
        Self { base, len }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    fn atomic_u64(&self, offset: usize) -> &AtomicU64 {
        assert!(offset + 8 <= self.len, "akses u64 di luar region");
        debug_assert!(offset % 8 == 0, "offset u64 harus aligned 8 bytes");
        // SAFETY: bounds dan alignment dicek di atas; AtomicU64 punya
        // layout identik dengan u64.
        unsafe { &*(self.base.add(offset) as *const AtomicU64) }
    }

    #[inline(always)]
    fn atomic_u32(&self, offset: usize) -> &AtomicU32 {
        assert!(offset + 4 <= self.len, "akses u32 di luar region");
        debug_assert!(offset % 4 == 0, "offset u32 harus aligned 4 bytes");
        // SAFETY: bounds dan alignment dicek di atas.
        unsafe { &*(self.base.add(offset) as *const AtomicU32) }
    }

    // --- u64: index fields ---

    #[inline(always)]
    pub fn load_u64_plain(&self, offset: usize) -> u64 {
        self.atomic_u64(offset).load(Ordering::Relaxed)
    }

    #[inline(always)]
    pub fn load_u64_acquire(&self, offset: usize) -> u64 {
        self.atomic_u64(offset).load(Ordering::Acquire)
    }

    #[inline(always)]
    pub fn store_u64_plain(&self, offset: usize, value: u64) {
        self.atomic_u64(offset).store(value, Ordering::Relaxed)
    }

    #[inline(always)]
    pub fn store_u64_release(&self, offset: usize, value: u64) {
        self.atomic_u64(offset).store(value, Ordering::Release)
    }

    /// CAS untuk arbitrase antar producer. `true` kalau agent ini menang.
    #[inline(always)]
    pub fn cas_u64(&self, offset: usize, expected: u64, new: u64) -> bool {
        self.atomic_u64(offset)
            .compare_exchange(expected, new, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    // --- u32: header metadata dan slot state marker ---

    #[inline(always)]
    pub fn load_u32_acquire(&self, offset: usize) -> u32 {
        self.atomic_u32(offset).load(Ordering::Acquire)
    }

    #[inline(always)]
    pub fn store_u32_plain(&self, offset: usize, value: u32) {
        self.atomic_u32(offset).store(value, Ordering::Relaxed)
    }

    #[inline(always)]
    pub fn store_u32_release(&self, offset: usize, value: u32) {
        self.atomic_u32(offset).store(value, Ordering::Release)
    }

    // --- payload copy ---

    /// Copy `src` ke region mulai di `offset`.
    ///
    /// Non-atomic: hanya boleh dipanggil oleh agent yang memegang claim
    /// eksklusif atas range tersebut (slot WRITE_CLAIMED).
    #[inline(always)]
    pub fn write_bytes(&self, offset: usize, src: &[u8]) {
        assert!(
            offset.checked_add(src.len()).is_some_and(|end| end <= self.len),
            "write payload di luar region"
        );
        // SAFETY: bounds dicek di atas; eksklusivitas dijamin protokol slot.
        unsafe { std::ptr::copy_nonoverlapping(src.as_ptr(), self.base.add(offset), src.len()) }
    }

    /// Copy dari region mulai di `offset` ke `dst`.
    ///
    /// Non-atomic: hanya untuk agent yang memegang claim baca atas range
    /// tersebut (slot milik consumer setelah `read_acquire`).
    #[inline(always)]
    pub fn read_bytes(&self, offset: usize, dst: &mut [u8]) {
        assert!(
            offset.checked_add(dst.len()).is_some_and(|end| end <= self.len),
            "read payload di luar region"
        );
        // SAFETY: bounds dicek di atas; eksklusivitas dijamin protokol slot.
        unsafe { std::ptr::copy_nonoverlapping(self.base.add(offset), dst.as_mut_ptr(), dst.len()) }
    }
}
