//! Streams written by this crate, decoded by flate2.

use flate2::read::DeflateDecoder;
use std::io::Read;
use sufflate_deflate::{BlockEncoder, BlockKind, DeflateConfig, deflate, deflate_with_config};

const SONNET: &[u8] = include_bytes!("data/sonnet18.txt");

fn flate2_inflate(compressed: &[u8]) -> Vec<u8> {
    let mut decoder = DeflateDecoder::new(compressed);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .expect("flate2 should accept the stream");
    out
}

fn lcg_bytes(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1103515245).wrapping_add(12345);
            (state >> 16) as u8
        })
        .collect()
}

fn inputs() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("empty", Vec::new()),
        ("one byte", vec![b'q']),
        ("single symbol run", vec![0u8; 1000]),
        ("sonnet", SONNET.to_vec()),
        ("random", lcg_bytes(20_000, 3)),
        ("repetitive past window", b"0123456789abcdefghij".repeat(4000)),
        ("sonnet x40", SONNET.repeat(40)),
    ]
}

#[test]
fn test_flate2_decodes_all_levels() {
    for (name, input) in inputs() {
        for level in [0, 1, 6, 9] {
            let compressed = deflate(&input, level).unwrap();
            assert_eq!(flate2_inflate(&compressed), input, "{name} at level {level}");
        }
    }
}

#[test]
fn test_flate2_decodes_small_chunks() {
    for (name, input) in inputs() {
        let config = DeflateConfig::default().with_chunk_size(100);
        let compressed = deflate_with_config(&input, config).unwrap();
        assert_eq!(flate2_inflate(&compressed), input, "{name}");
    }
}

#[test]
fn test_flate2_decodes_forced_dynamic_blocks() {
    let config = DeflateConfig {
        allow_fixed: false,
        allow_stored: false,
        ..DeflateConfig::default()
    };
    let mut encoder = BlockEncoder::with_config(Vec::new(), &config);
    for &byte in b"zzzzzzzz" {
        encoder.encode_literal(byte).unwrap();
    }
    assert_eq!(encoder.flush_block(false).unwrap(), BlockKind::Dynamic);

    // 'z' has no literal code in this block, only the match reaches it
    for &byte in b"ab" {
        encoder.encode_literal(byte).unwrap();
    }
    encoder.encode_length_distance(3, 9).unwrap();
    encoder.encode_length_distance(258, 1).unwrap();
    assert_eq!(encoder.flush_block(true).unwrap(), BlockKind::Dynamic);

    let compressed = encoder.finish().unwrap();
    let mut expected = b"zzzzzzzzabzzz".to_vec();
    expected.extend(std::iter::repeat_n(b'z', 258));
    assert_eq!(flate2_inflate(&compressed), expected);
}

#[test]
fn test_flate2_decodes_forced_dynamic_text() {
    let config = DeflateConfig {
        allow_fixed: false,
        allow_stored: false,
        ..DeflateConfig::default()
    }
    .with_chunk_size(300);
    let compressed = deflate_with_config(SONNET, config).unwrap();
    assert_eq!(flate2_inflate(&compressed), SONNET);
}
