//! Benchmarks for the bit channel and sliding window.
//!
//! - Bit-level write and read throughput for short codes
//! - Back-reference expansion for fills, overlapping and disjoint copies

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::io::Cursor;
use sufflate_core::bitstream::{BitReader, BitWriter};
use sufflate_core::window::SlidingWindow;

fn bench_bit_io(c: &mut Criterion) {
    let mut group = c.benchmark_group("bit_io");

    for &count in &[1024usize, 64 * 1024] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("write_7bit", count), &count, |b, &n| {
            b.iter(|| {
                let mut writer = BitWriter::new(Vec::with_capacity(n));
                for i in 0..n {
                    writer.write_bits(i as u32, 7).unwrap();
                }
                black_box(writer.into_inner().unwrap())
            });
        });

        let mut writer = BitWriter::new(Vec::new());
        for i in 0..count {
            writer.write_bits(i as u32, 7).unwrap();
        }
        let encoded = writer.into_inner().unwrap();

        group.bench_with_input(BenchmarkId::new("read_7bit", count), &encoded, |b, data| {
            b.iter(|| {
                let mut reader = BitReader::new(Cursor::new(data));
                let mut sum = 0u32;
                for _ in 0..count {
                    sum = sum.wrapping_add(reader.read_bits(7).unwrap());
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

fn bench_window_copy(c: &mut Criterion) {
    let mut group = c.benchmark_group("window_copy");
    group.throughput(Throughput::Bytes(258 * 1000));

    for &(name, distance) in &[("fill", 1usize), ("overlap", 5), ("disjoint", 4096)] {
        group.bench_function(name, |b| {
            let mut window = SlidingWindow::new();
            window.push_slice(&(0..8192).map(|i| i as u8).collect::<Vec<_>>());
            b.iter(|| {
                for _ in 0..1000 {
                    window.copy(distance, 258).unwrap();
                    window.discard_unread();
                }
                black_box(window.end())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_bit_io, bench_window_copy);
criterion_main!(benches);
