//! Benchmarks for the match finder and the full codec.
//!
//! Inputs are random bytes, a short repeated pattern and word-like text.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use sufflate_deflate::lz77::Matcher;
use sufflate_deflate::suffix::SuffixIndex;
use sufflate_deflate::{DeflateConfig, deflate, inflate};

fn generate_random(size: usize) -> Vec<u8> {
    let mut seed = 12345u32;
    (0..size)
        .map(|_| {
            seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
            (seed >> 16) as u8
        })
        .collect()
}

fn generate_repeated(size: usize) -> Vec<u8> {
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789"
        .iter()
        .copied()
        .cycle()
        .take(size)
        .collect()
}

fn generate_text_like(size: usize) -> Vec<u8> {
    let words: &[&[u8]] = &[
        b"the", b"quick", b"brown", b"fox", b"jumps", b"over", b"lazy", b"dog", b"and", b"runs",
        b"through", b"forest", b"near", b"river", b"under", b"blue", b"sky", b"with", b"wind",
        b"blowing",
    ];
    let mut data = Vec::with_capacity(size + 8);
    let mut seed = 42u32;
    while data.len() < size {
        seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        data.extend_from_slice(words[(seed >> 16) as usize % words.len()]);
        data.push(b' ');
    }
    data.truncate(size);
    data
}

fn inputs() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("random", generate_random(64 * 1024)),
        ("repeated", generate_repeated(64 * 1024)),
        ("text", generate_text_like(64 * 1024)),
    ]
}

fn bench_suffix_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("suffix_index");
    for (name, data) in inputs() {
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            b.iter(|| black_box(SuffixIndex::new(data)));
        });
    }
    group.finish();
}

fn bench_matcher(c: &mut Criterion) {
    let mut group = c.benchmark_group("matcher");
    for (name, data) in inputs() {
        group.throughput(Throughput::Bytes(data.len() as u64));
        for level in [1u8, 6, 9] {
            let config = DeflateConfig::with_level(level);
            let matcher = Matcher::new(config.max_candidates, config.match_bias_bits);
            group.bench_with_input(
                BenchmarkId::new(name, format!("level{level}")),
                &data,
                |b, data| b.iter(|| black_box(matcher.find_tokens(data, 0))),
            );
        }
    }
    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    for (name, data) in inputs() {
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("deflate", name), &data, |b, data| {
            b.iter(|| black_box(deflate(data, 6).unwrap()));
        });

        let compressed = deflate(&data, 6).unwrap();
        group.bench_with_input(BenchmarkId::new("inflate", name), &compressed, |b, data| {
            b.iter(|| black_box(inflate(data).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_suffix_array, bench_matcher, bench_codec);
criterion_main!(benches);
