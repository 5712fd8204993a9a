//! Criterion benchmark untuk off-heap ring buffer
//!
//! Run dengan: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use arus::OffHeapRingBuffer;

fn bench_offer_poll(c: &mut Criterion) {
    let mut group = c.benchmark_group("off_heap_ring");
    group.throughput(Throughput::Elements(1));

    // Benchmark offer
    group.bench_function("try_offer", |b| {
        let rb = OffHeapRingBuffer::new(65536, 8);
        let mut out = [0u8; 8];
        let mut i = 0u64;
        b.iter(|| {
            if !rb.try_offer(black_box(&i.to_le_bytes())) {
                rb.try_poll(&mut out);
                rb.try_offer(black_box(&i.to_le_bytes()));
            }
            i = i.wrapping_add(1);
        });
    });

    // Benchmark poll
    group.bench_function("try_poll", |b| {
        let rb = OffHeapRingBuffer::new(65536, 8);
        for i in 0u64..32768 {
            rb.try_offer(&i.to_le_bytes());
        }
        let mut out = [0u8; 8];
        b.iter(|| {
            if rb.try_poll(black_box(&mut out)) {
                rb.try_offer(&out);
            }
        });
    });

    // Benchmark offer+poll cycle
    group.bench_function("offer_poll_cycle", |b| {
        let rb = OffHeapRingBuffer::new(65536, 8);
        let mut out = [0u8; 8];
        let mut i = 0u64;
        b.iter(|| {
            rb.try_offer(black_box(&i.to_le_bytes()));
            let _ = rb.try_poll(&mut out);
            i = i.wrapping_add(1);
        });
    });

    group.finish();
}

fn bench_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("throughput");

    // Batch operations
    for batch_size in [100, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*batch_size as u64));
        group.bench_function(format!("batch_{}", batch_size), |b| {
            let rb = OffHeapRingBuffer::new(65536, 8);
            let mut out = [0u8; 8];
            b.iter(|| {
                for i in 0..*batch_size {
                    rb.try_offer(black_box(&(i as u64).to_le_bytes()));
                }
                for _ in 0..*batch_size {
                    black_box(rb.try_poll(&mut out));
                }
            });
        });
    }

    group.finish();
}

fn bench_payload_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("payload_size");

    for size in [8usize, 64, 256].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_function(format!("roundtrip_{}b", size), |b| {
            let rb = OffHeapRingBuffer::new(1024, *size);
            let msg = vec![0xA5u8; *size];
            let mut out = vec![0u8; *size];
            b.iter(|| {
                rb.try_offer(black_box(&msg));
                black_box(rb.try_poll(&mut out));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_offer_poll, bench_throughput, bench_payload_sizes);
criterion_main!(benches);
