//! Ring Buffer di Atas Memory-Mapped File — IPC Antar Process
//!
//! Sisi pembuat memanggil [`SharedRingBuffer::create`] (inisialisasi header
//! tepat sekali), sisi lain [`SharedRingBuffer::attach`] dan mengadopsi
//! geometry dari header. Protokol slot bekerja identik lintas process:
//! acquire/release pada memory-mapped region adalah barrier yang juga
//! berlaku antar process, bukan cuma antar thread.
//!
//! Lifetime region milik pemetaan (field `MmapMut` yang disimpan), bukan
//! milik ring — tidak ada asumsi garbage collector ataupun process yang
//! privileged, kecuali initializer satu kali.

use memmap2::{MmapMut, MmapOptions};
use std::fs::OpenOptions;
use std::io;
use std::ops::Deref;
use std::path::Path;

use super::buffer::OffHeapRingBuffer;
use super::layout::{effective_capacity, required_size};
use crate::sync::Region;

/// Handle ring buffer MPSC yang hidup di file memory-mapped.
///
/// Deref ke [`OffHeapRingBuffer`]: seluruh operasi protokol
/// (`try_offer`/`try_poll`/`write_acquire`/...) dipakai langsung.
#[derive(Debug)]
pub struct SharedRingBuffer {
    ring: OffHeapRingBuffer,
    // Pemetaan wajib hidup selama ring memegang pointer ke dalamnya.
    _mmap: MmapMut,
}

impl SharedRingBuffer {
    /// Buat (atau timpa) file backing dan inisialisasi ring buffer di
    /// dalamnya. Hanya satu sisi yang boleh create; sisi lain attach.
    ///
    /// Flag peran menandai operasi yang akan dijalankan handle ini —
    /// pembuat tidak otomatis jadi producer maupun consumer.
    pub fn create<P: AsRef<Path>>(
        path: P,
        requested_capacity: usize,
        message_size: usize,
        is_producer: bool,
        is_consumer: bool,
    ) -> io::Result<Self> {
        let capacity = effective_capacity(requested_capacity);
        let total = required_size(capacity, message_size);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(total as u64)?;

        // SAFETY: file dibuka read/write dan ukurannya sudah di-set.
        let mut mmap = unsafe { MmapOptions::new().len(total).map_mut(&file)? };
        // SAFETY: pointer mmap valid selama `_mmap` tersimpan di Self;
        // mmap selalu page-aligned.
        let region = unsafe { Region::from_raw_parts(mmap.as_mut_ptr(), total) };
        let ring = OffHeapRingBuffer::initialize_region(
            region,
            requested_capacity,
            message_size,
            is_producer,
            is_consumer,
        )?;

        Ok(Self { ring, _mmap: mmap })
    }

    /// Attach ke file yang sudah diinisialisasi sisi lain. Tidak menulis
    /// header; geometry dibaca dan divalidasi dari region.
    pub fn attach<P: AsRef<Path>>(
        path: P,
        is_producer: bool,
        is_consumer: bool,
    ) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let len = file.metadata()?.len() as usize;

        // SAFETY: file dibuka read/write; len sesuai ukuran file.
        let mut mmap = unsafe { MmapOptions::new().len(len).map_mut(&file)? };
        // SAFETY: pointer mmap valid selama `_mmap` tersimpan di Self.
        let region = unsafe { Region::from_raw_parts(mmap.as_mut_ptr(), len) };
        let ring = OffHeapRingBuffer::attach_region(region, is_producer, is_consumer)?;

        Ok(Self { ring, _mmap: mmap })
    }
}

impl Deref for SharedRingBuffer {
    type Target = OffHeapRingBuffer;

    #[inline(always)]
    fn deref(&self) -> &OffHeapRingBuffer {
        &self.ring
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn temp_ring_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("arus_{}_{}.ring", tag, std::process::id()))
    }

    #[test]
    fn test_create_then_attach_shares_messages() {
        let path = temp_ring_path("share");

        {
            let producer = SharedRingBuffer::create(&path, 8, 16, true, false).unwrap();
            let consumer = SharedRingBuffer::attach(&path, false, true).unwrap();
            assert_eq!(consumer.capacity(), 8);
            assert_eq!(consumer.message_size(), 16);

            let mut msg = [0u8; 16];
            for i in 0u64..5 {
                msg[..8].copy_from_slice(&i.to_le_bytes());
                assert!(producer.try_offer(&msg));
            }

            let mut out = [0u8; 16];
            for i in 0u64..5 {
                assert!(consumer.try_poll(&mut out));
                assert_eq!(u64::from_le_bytes(out[..8].try_into().unwrap()), i);
            }
            assert!(!consumer.try_poll(&mut out));
        }

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_attach_adopts_rounded_geometry() {
        let path = temp_ring_path("geometry");

        {
            let _creator = SharedRingBuffer::create(&path, 10, 32, true, true).unwrap();
            let attached = SharedRingBuffer::attach(&path, true, false).unwrap();
            assert_eq!(attached.capacity(), 16);
            assert_eq!(attached.message_size(), 32);
        }

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_attach_rejects_foreign_file() {
        let path = temp_ring_path("foreign");
        fs::write(&path, vec![0u8; 4096]).unwrap();

        let err = SharedRingBuffer::attach(&path, false, true).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_attach_rejects_truncated_file() {
        let path = temp_ring_path("truncated");
        fs::write(&path, vec![0u8; 16]).unwrap();

        assert!(SharedRingBuffer::attach(&path, false, true).is_err());

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_state_survives_detach_and_reattach() {
        let path = temp_ring_path("reattach");

        {
            let producer = SharedRingBuffer::create(&path, 4, 8, true, false).unwrap();
            assert!(producer.try_offer(&41u64.to_le_bytes()));
            assert!(producer.try_offer(&42u64.to_le_bytes()));
        }

        {
            let consumer = SharedRingBuffer::attach(&path, false, true).unwrap();
            assert_eq!(consumer.size(), 2);
            let mut out = [0u8; 8];
            assert!(consumer.try_poll(&mut out));
            assert_eq!(u64::from_le_bytes(out), 41);
            assert!(consumer.try_poll(&mut out));
            assert_eq!(u64::from_le_bytes(out), 42);
            assert!(!consumer.try_poll(&mut out));
        }

        fs::remove_file(path).ok();
    }
}
