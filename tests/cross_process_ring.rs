//! Cross-Process IPC Integration Test
//!
//! Memverifikasi protokol ring buffer bekerja identik saat producer dan
//! consumer adalah process berbeda yang berbagi memory-mapped file.
//!
//! Child process = binary test ini yang di-invoke ulang dengan env var
//! penanda. Parent berperan producer-only, child consumer-only, jadi kedua
//! sisi benar-benar lewat pemetaan masing-masing — bukan fast path
//! satu process.

use std::fs;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use arus::SharedRingBuffer;

/// Env var penanda invocation child.
const CHILD_ENV: &str = "ARUS_IPC_CHILD";
/// Env var pembawa path file ring ke child.
const PATH_ENV: &str = "ARUS_IPC_PATH";
/// Env var pembawa jumlah message ke child.
const COUNT_ENV: &str = "ARUS_IPC_COUNT";
/// Penanda akhir stream.
const SENTINEL: u64 = u64::MAX;

const MESSAGE_SIZE: usize = 16;

fn is_child() -> bool {
    std::env::var(CHILD_ENV).is_ok()
}

fn checksum(value: u64) -> u64 {
    value.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Entry child: attach sebagai consumer, drain sampai sentinel, laporkan
/// hasil lewat stdout untuk diparse parent.
fn child_consume() {
    let path = std::env::var(PATH_ENV).expect("ARUS_IPC_PATH not set");
    let expected: u64 = std::env::var(COUNT_ENV)
        .expect("ARUS_IPC_COUNT not set")
        .parse()
        .expect("invalid count");

    let ring = SharedRingBuffer::attach(&path, false, true).expect("child: attach failed");

    let mut received = Vec::new();
    let mut out = [0u8; MESSAGE_SIZE];
    let deadline = Instant::now() + Duration::from_secs(20);

    while Instant::now() < deadline {
        if !ring.try_poll(&mut out) {
            std::thread::yield_now();
            continue;
        }
        let value = u64::from_le_bytes(out[..8].try_into().unwrap());
        let check = u64::from_le_bytes(out[8..16].try_into().unwrap());
        assert_eq!(check, checksum(value), "child: checksum korup untuk {}", value);
        if value == SENTINEL {
            break;
        }
        assert!(value >= 1 && value <= expected, "child: value korup {}", value);
        received.push(value);
    }

    // Ringkasan untuk diparse parent. Diawali newline karena libtest
    // mencetak "test <nama> ... " tanpa newline — tanpa ini baris
    // RECEIVED menempel di situ dan gagal diparse.
    println!("\nRECEIVED:{}", received.len());
    for v in &received {
        println!("V:{}", v);
    }
}

fn parse_child_output(stdout: &str) -> (usize, Vec<u64>) {
    let mut count = 0;
    let mut values = Vec::new();
    for line in stdout.lines() {
        if let Some(n) = line.strip_prefix("RECEIVED:") {
            count = n.parse().unwrap_or(0);
        } else if let Some(v) = line.strip_prefix("V:") {
            if let Ok(val) = v.parse::<u64>() {
                values.push(val);
            }
        }
    }
    (count, values)
}

#[test]
fn cross_process_spsc_over_mmap() {
    if is_child() {
        child_consume();
        return;
    }

    const COUNT: u64 = 500;
    let path = std::env::temp_dir().join(format!("arus_xproc_{}.ring", std::process::id()));

    // Parent membuat region (initializer satu kali) SEBELUM child spawn,
    // jadi child selalu attach ke header yang sudah valid.
    let ring = SharedRingBuffer::create(&path, 8, MESSAGE_SIZE, true, false)
        .expect("parent: create failed");

    let exe = std::env::current_exe().expect("current_exe");
    let child = Command::new(exe)
        .args(["cross_process_spsc_over_mmap", "--exact", "--nocapture"])
        .env(CHILD_ENV, "1")
        .env(PATH_ENV, path.display().to_string())
        .env(COUNT_ENV, COUNT.to_string())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn child process");

    let deadline = Instant::now() + Duration::from_secs(20);
    let mut msg = [0u8; MESSAGE_SIZE];
    for value in (1..=COUNT).chain(std::iter::once(SENTINEL)) {
        msg[..8].copy_from_slice(&value.to_le_bytes());
        msg[8..16].copy_from_slice(&checksum(value).to_le_bytes());
        while !ring.try_offer(&msg) {
            assert!(Instant::now() < deadline, "parent: ring penuh terus, child hilang?");
            std::thread::yield_now();
        }
    }

    let output = child.wait_with_output().expect("wait child");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "child gagal.\nstdout:\n{}\nstderr:\n{}",
        stdout,
        String::from_utf8_lossy(&output.stderr)
    );

    let (count, values) = parse_child_output(&stdout);
    assert_eq!(count, COUNT as usize, "jumlah message lintas process salah");
    // Single producer: urutan baca = urutan submit.
    for (i, v) in values.iter().enumerate() {
        assert_eq!(*v, i as u64 + 1, "urutan FIFO lintas process rusak");
    }

    fs::remove_file(path).ok();
}
