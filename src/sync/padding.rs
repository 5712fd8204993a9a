//! Cache Line Isolation untuk Field yang Di-mutate Independen
//!
//! Dua field yang ditulis oleh agent berbeda tidak boleh berbagi cache line
//! (false sharing menyebabkan coherence traffic antar core yang tidak perlu).
//! Padding dinyatakan eksplisit lewat alignment attribute, bukan
//! mengandalkan layout object yang kebetulan.

use std::ops::{Deref, DerefMut};

/// Ukuran cache line yang diasumsikan (64 bytes pada x86-64 dan
/// mayoritas ARM64). Semua perhitungan layout memakai konstanta ini.
pub const CACHE_LINE_SIZE: usize = 64;

/// Wrapper yang mengisolasi `value` pada cache line-nya sendiri.
///
/// `align(64)` menjamin dua hal sekaligus: start address aligned ke cache
/// line, dan ukuran struct dibulatkan ke kelipatan 64 byte. Artinya field
/// tetangga di atas maupun di bawah tidak mungkin berbagi line dengan
/// `value`. Literal 64 harus sama dengan [`CACHE_LINE_SIZE`]
/// (attribute alignment hanya menerima literal).
#[repr(C, align(64))]
pub struct CacheLinePadded<T> {
    value: T,
}

impl<T> CacheLinePadded<T> {
    pub const fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T> Deref for CacheLinePadded<T> {
    type Target = T;

    #[inline(always)]
    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for CacheLinePadded<T> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}
