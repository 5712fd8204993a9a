//! Ring Buffer MPSC Off-Heap dengan Message Size Tetap
//!
//! Protokol channel: fixed message size, readiness marker per slot tepat
//! sebelum payload, arbitrase multi-producer lewat CAS pada producer index.
//! Deteksi elemen berikutnya in-place dari marker — tidak perlu membaca
//! index lawan di hot path consumer.
//!
//! Lock-free untuk producer (CAS retry loop: selalu ada producer yang
//! menang), wait-free untuk consumer tunggal (tidak ada CAS, tidak ada
//! retry). Tidak ada operasi yang blocking: penuh/kosong dikembalikan
//! sebagai `None`/`false`, backoff adalah urusan caller.

use std::alloc::{alloc_zeroed, dealloc, handle_alloc_error, Layout};
use std::io;

use super::layout::{
    effective_capacity, required_size, slot_stride, CAPACITY_OFFSET, CONSUMER_INDEX_OFFSET, MAGIC,
    MAGIC_OFFSET, MESSAGE_SIZE_OFFSET, PRODUCER_INDEX_OFFSET, SLOTS_OFFSET, STATE_READ_RELEASED,
    STATE_SIZE, STATE_WRITTEN, VERSION, VERSION_OFFSET,
};
use crate::sync::{Region, CACHE_LINE_SIZE};

/// Backing memory: alokasi private milik ring, atau region eksternal
/// (mmap) yang lifetime-nya dipegang pihak lain.
#[derive(Debug)]
enum Backing {
    Private { ptr: *mut u8, layout: Layout },
    External,
}

/// Ring buffer multi-producer single-consumer di atas raw memory region.
///
/// Region bisa alokasi private aligned (lihat [`OffHeapRingBuffer::new`])
/// atau memory-mapped file lintas process (lihat
/// [`super::SharedRingBuffer`]) — protokolnya identik. Flag
/// `is_producer`/`is_consumer` menandai peran yang boleh dijalankan handle
/// ini; pada IPC, handle producer dan consumer adalah pemetaan berbeda atas
/// region yang sama.
#[derive(Debug)]
pub struct OffHeapRingBuffer {
    region: Region,
    mask: u64,
    capacity: usize,
    message_size: usize,
    stride: usize,
    is_producer: bool,
    is_consumer: bool,
    backing: Backing,
}

// SAFETY: Region sudah Send+Sync; pointer di Backing::Private hanya
// disentuh di Drop, saat tidak ada agent lain.
unsafe impl Send for OffHeapRingBuffer {}
unsafe impl Sync for OffHeapRingBuffer {}

impl OffHeapRingBuffer {
    /// Ring buffer process-private di memory aligned cache line.
    /// Kapasitas dibulatkan ke power of two berikutnya.
    ///
    /// # Panics
    /// Panic kalau `requested_capacity` atau `message_size` nol, atau
    /// layout alokasi tidak bisa dipenuhi — queue dengan layout salah
    /// tidak boleh pernah terbentuk.
    pub fn new(requested_capacity: usize, message_size: usize) -> Self {
        assert!(requested_capacity > 0, "capacity harus > 0");
        assert!(message_size > 0, "message size harus > 0");

        let capacity = effective_capacity(requested_capacity);
        let total = required_size(capacity, message_size);
        let layout = Layout::from_size_align(total, CACHE_LINE_SIZE)
            .expect("layout region ring buffer tidak valid");

        // SAFETY: layout berukuran non-zero.
        let ptr = unsafe { alloc_zeroed(layout) };
        if ptr.is_null() {
            handle_alloc_error(layout);
        }
        // SAFETY: ptr valid sepanjang `total` bytes sampai Drop men-dealloc.
        let region = unsafe { Region::from_raw_parts(ptr, total) };

        let rb = Self {
            region,
            mask: (capacity - 1) as u64,
            capacity,
            message_size,
            stride: slot_stride(message_size),
            is_producer: true,
            is_consumer: true,
            backing: Backing::Private { ptr, layout },
        };
        rb.initialize_header();
        rb
    }

    /// Inisialisasi ring buffer di region eksternal (mis. memory-mapped
    /// file) — dipanggil tepat sekali, oleh sisi yang membuat region,
    /// sebelum sisi lain attach.
    pub fn initialize_region(
        region: Region,
        requested_capacity: usize,
        message_size: usize,
        is_producer: bool,
        is_consumer: bool,
    ) -> io::Result<Self> {
        assert!(requested_capacity > 0, "capacity harus > 0");
        assert!(message_size > 0, "message size harus > 0");

        let capacity = effective_capacity(requested_capacity);
        let total = required_size(capacity, message_size);
        if region.len() < total {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "region {} bytes, butuh {} untuk capacity {} x message size {}",
                    region.len(),
                    total,
                    capacity,
                    message_size
                ),
            ));
        }

        let rb = Self {
            region,
            mask: (capacity - 1) as u64,
            capacity,
            message_size,
            stride: slot_stride(message_size),
            is_producer,
            is_consumer,
            backing: Backing::External,
        };
        rb.initialize_header();
        Ok(rb)
    }

    /// Attach ke region yang sudah diinisialisasi sisi lain. Geometry
    /// (capacity, message size) diadopsi dari header — bit-exact lintas
    /// process. Magic/versi salah atau region kependekan = fatal.
    pub fn attach_region(
        region: Region,
        is_producer: bool,
        is_consumer: bool,
    ) -> io::Result<Self> {
        if region.len() < SLOTS_OFFSET {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "region lebih kecil dari header ring buffer",
            ));
        }
        // Magic ditulis terakhir (release) oleh initializer; melihatnya
        // lewat acquire berarti seluruh header dan slot state sudah valid.
        let magic = region.load_u64_acquire(MAGIC_OFFSET);
        if magic != MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("magic region tidak dikenal: {magic:#018x}"),
            ));
        }
        let version = region.load_u32_acquire(VERSION_OFFSET);
        if version != VERSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("versi format {version} tidak didukung (butuh {VERSION})"),
            ));
        }
        let capacity = region.load_u32_acquire(CAPACITY_OFFSET) as usize;
        let message_size = region.load_u32_acquire(MESSAGE_SIZE_OFFSET) as usize;
        if capacity == 0 || !capacity.is_power_of_two() || message_size == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("geometry header korup: capacity {capacity}, message size {message_size}"),
            ));
        }
        if region.len() < required_size(capacity, message_size) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "region lebih kecil dari yang dijanjikan header",
            ));
        }

        Ok(Self {
            region,
            mask: (capacity - 1) as u64,
            capacity,
            message_size,
            stride: slot_stride(message_size),
            is_producer,
            is_consumer,
            backing: Backing::External,
        })
    }

    fn initialize_header(&self) {
        self.region.store_u32_plain(VERSION_OFFSET, VERSION);
        self.region
            .store_u32_plain(CAPACITY_OFFSET, self.capacity as u32);
        self.region
            .store_u32_plain(MESSAGE_SIZE_OFFSET, self.message_size as u32);
        self.region.store_u64_plain(PRODUCER_INDEX_OFFSET, 0);
        self.region.store_u64_plain(CONSUMER_INDEX_OFFSET, 0);
        for i in 0..self.capacity as u64 {
            self.region
                .store_u32_plain(self.slot_offset(i), STATE_READ_RELEASED);
        }
        // Magic terakhir, dengan release: attacher yang melihat magic
        // dijamin melihat seluruh inisialisasi di atas.
        self.region.store_u64_release(MAGIC_OFFSET, MAGIC);
    }

    // --- index dan slot ---

    #[inline(always)]
    fn slot_offset(&self, index: u64) -> usize {
        SLOTS_OFFSET + (index & self.mask) as usize * self.stride
    }

    #[inline(always)]
    fn lv_producer_index(&self) -> u64 {
        self.region.load_u64_acquire(PRODUCER_INDEX_OFFSET)
    }

    #[inline(always)]
    fn cas_producer_index(&self, expected: u64, new: u64) -> bool {
        self.region.cas_u64(PRODUCER_INDEX_OFFSET, expected, new)
    }

    #[inline(always)]
    fn lp_consumer_index(&self) -> u64 {
        self.region.load_u64_plain(CONSUMER_INDEX_OFFSET)
    }

    #[inline(always)]
    fn lv_consumer_index(&self) -> u64 {
        self.region.load_u64_acquire(CONSUMER_INDEX_OFFSET)
    }

    #[inline(always)]
    fn so_consumer_index(&self, value: u64) {
        self.region.store_u64_release(CONSUMER_INDEX_OFFSET, value)
    }

    #[inline(always)]
    fn is_read_released(&self, slot_offset: usize) -> bool {
        self.region.load_u32_acquire(slot_offset) == STATE_READ_RELEASED
    }

    // --- protokol slot: sisi producer ---

    /// Claim satu slot untuk ditulis. `None` berarti ring penuh.
    ///
    /// Slot kandidat yang tidak available BELUM berarti penuh: producer lain
    /// bisa sudah menyalip dan yang terlihat adalah message dia yang selesai.
    /// Karena itu producer index di-re-check dulu — berubah berarti retry
    /// dari atas, baru kalau tidak berubah lapor penuh. Melemahkan kebijakan
    /// retry ini menggeser batas penuh/tidak-penuh di bawah kontensi.
    #[inline]
    pub fn write_acquire(&self) -> Option<u64> {
        debug_assert!(self.is_producer, "handle ini bukan sisi producer");
        loop {
            let producer_index = self.lv_producer_index(); // LoadLoad
            let offset = self.slot_offset(producer_index);
            if !self.is_read_released(offset) {
                if producer_index != self.lv_producer_index() {
                    continue;
                }
                return None; // benar-benar penuh
            }
            // Guard lap: marker RELEASED saja tidak cukup — slot bisa sedang
            // di-claim producer lain yang belum sempat write_release, dan
            // marker-nya masih bekas lap sebelumnya. Consumer index dibaca
            // SETELAH marker (acquire menahan reorder): kalau marker memang
            // baru di-release consumer, ci yang terlihat sudah cukup maju dan
            // guard ini tidak pernah menyala; yang tertahan hanya claim yang
            // mau melampaui producer mandek satu lap penuh.
            let consumer_index = self.lv_consumer_index();
            if producer_index.wrapping_sub(consumer_index) >= self.capacity as u64 {
                if producer_index != self.lv_producer_index() {
                    continue;
                }
                return None; // penuh: capacity message sedang outstanding
            }
            if self.cas_producer_index(producer_index, producer_index + 1) {
                // Slot ini sekarang eksklusif milik caller sampai
                // write_release; agent lain belum boleh melihatnya ready.
                return Some(producer_index);
            }
            // CAS kalah dari producer lain — ulang dari atas.
        }
    }

    /// Publish slot sebagai WRITTEN (release store). Wajib dipanggil
    /// SETELAH seluruh payload ditulis — ordering ini satu-satunya jaminan
    /// consumer tidak membaca message parsial.
    #[inline]
    pub fn write_release(&self, index: u64) {
        self.region
            .store_u32_release(self.slot_offset(index), STATE_WRITTEN);
    }

    /// Tulis payload ke slot yang sudah di-claim lewat [`write_acquire`].
    ///
    /// # Panics
    /// Panic kalau `src` melebihi message size.
    ///
    /// [`write_acquire`]: OffHeapRingBuffer::write_acquire
    #[inline]
    pub fn write_payload(&self, index: u64, src: &[u8]) {
        assert!(
            src.len() <= self.message_size,
            "payload {} bytes melebihi message size {}",
            src.len(),
            self.message_size
        );
        self.region
            .write_bytes(self.slot_offset(index) + STATE_SIZE, src);
    }

    // --- protokol slot: sisi consumer ---

    /// Ambil slot berikutnya untuk dibaca. `None` berarti ring kosong.
    ///
    /// Wait-free: consumer tunggal tidak pernah contend dengan dirinya
    /// sendiri — index-nya dibaca plain, tanpa CAS, tanpa retry.
    #[inline]
    pub fn read_acquire(&self) -> Option<u64> {
        debug_assert!(self.is_consumer, "handle ini bukan sisi consumer");
        let consumer_index = self.lp_consumer_index();
        let offset = self.slot_offset(consumer_index);
        if self.is_read_released(offset) {
            return None; // kosong
        }
        // StoreStore: advance harus visible sebelum producer mana pun
        // menganggap slot ini sudah "diambil" saat mengecek penuh.
        self.so_consumer_index(consumer_index + 1);
        Some(consumer_index)
    }

    /// Kembalikan slot ke producer (release store READ_RELEASED). Wajib
    /// dipanggil SETELAH payload selesai dibaca, cermin disiplin sisi
    /// producer — mencegah producer menimpa data yang masih dibaca.
    #[inline]
    pub fn read_release(&self, index: u64) {
        self.region
            .store_u32_release(self.slot_offset(index), STATE_READ_RELEASED);
    }

    /// Baca payload slot yang dipegang lewat [`read_acquire`].
    ///
    /// # Panics
    /// Panic kalau `dst` melebihi message size.
    ///
    /// [`read_acquire`]: OffHeapRingBuffer::read_acquire
    #[inline]
    pub fn read_payload(&self, index: u64, dst: &mut [u8]) {
        assert!(
            dst.len() <= self.message_size,
            "buffer baca {} bytes melebihi message size {}",
            dst.len(),
            self.message_size
        );
        self.region
            .read_bytes(self.slot_offset(index) + STATE_SIZE, dst);
    }

    // --- operasi keluar: offer/poll ---

    /// Tulis satu message. `false` = ring penuh — sentinel, bukan error.
    #[inline]
    pub fn try_offer(&self, msg: &[u8]) -> bool {
        let index = match self.write_acquire() {
            Some(index) => index,
            None => return false,
        };
        self.write_payload(index, msg);
        self.write_release(index);
        true
    }

    /// Baca satu message ke `out`. `false` = ring kosong — sentinel,
    /// bukan error.
    #[inline]
    pub fn try_poll(&self, out: &mut [u8]) -> bool {
        let index = match self.read_acquire() {
            Some(index) => index,
            None => return false,
        };
        self.read_payload(index, out);
        self.read_release(index);
        true
    }

    /// Snapshot jumlah message. Consumer index dibaca duluan supaya hasil
    /// tidak pernah melampaui kapasitas gara-gara producer maju di
    /// sela-sela dua load.
    pub fn size(&self) -> usize {
        let consumer = self.lv_consumer_index();
        let producer = self.lv_producer_index();
        (producer.wrapping_sub(consumer) as usize).min(self.capacity)
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Kapasitas efektif (power of two).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn message_size(&self) -> usize {
        self.message_size
    }
}

impl Drop for OffHeapRingBuffer {
    fn drop(&mut self) {
        if let Backing::Private { ptr, layout } = &self.backing {
            // SAFETY: ptr dialokasikan di new() dengan layout yang sama.
            unsafe { dealloc(*ptr, *layout) };
        }
        // Backing::External: lifetime region milik pemetaan eksternal,
        // bukan urusan ring ini.
    }
}
