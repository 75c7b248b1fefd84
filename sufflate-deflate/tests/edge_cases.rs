//! Edge case tests for DEFLATE compression.

use sufflate_deflate::{DeflateConfig, deflate, deflate_with_config, inflate};

#[test]
fn test_empty_input() {
    let input = b"";
    let compressed = deflate(input, 6).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_single_byte() {
    let input = b"A";
    let compressed = deflate(input, 6).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_all_zeros() {
    let input = vec![0u8; 1000];
    let compressed = deflate(&input, 6).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
    // All zeros should compress very well
    assert!(compressed.len() < input.len() / 10);
}

#[test]
fn test_all_same_byte() {
    let input = vec![255u8; 5000];
    let compressed = deflate(&input, 6).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
    // Repeated byte should compress extremely well
    assert!(compressed.len() < input.len() / 20);
}

#[test]
fn test_max_match_length() {
    // Create data with maximum match length (258 bytes)
    let pattern = vec![42u8; 258];
    let mut input = Vec::new();
    for _ in 0..10 {
        input.extend_from_slice(&pattern);
    }

    let compressed = deflate(&input, 9).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_two_bytes() {
    for input in [&b"ab"[..], b"zz"] {
        let compressed = deflate(input, 6).unwrap();
        assert_eq!(inflate(&compressed).unwrap(), input);
    }
}

#[test]
fn test_random_bytes() {
    let mut state = 0xDEAD_BEEFu32;
    let input: Vec<u8> = (0..50_000)
        .map(|_| {
            state = state.wrapping_mul(1103515245).wrapping_add(12345);
            (state >> 16) as u8
        })
        .collect();

    for level in [0, 1, 6, 9] {
        let compressed = deflate(&input, level).unwrap();
        assert_eq!(inflate(&compressed).unwrap(), input, "level {level}");
        // Incompressible data falls back to stored blocks
        assert!(compressed.len() <= input.len() + 5 * 2);
    }
}

#[test]
fn test_alternating_pattern() {
    let mut input = Vec::with_capacity(2000);
    for i in 0..1000 {
        input.push(if i % 2 == 0 { b'A' } else { b'B' });
    }

    let compressed = deflate(&input, 6).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_large_input() {
    // Test with 1MB of data
    let mut input = Vec::with_capacity(1024 * 1024);
    let pattern = b"The quick brown fox jumps over the lazy dog. ";
    while input.len() < 1024 * 1024 {
        input.extend_from_slice(pattern);
    }
    input.truncate(1024 * 1024);

    let compressed = deflate(&input, 5).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
    assert_eq!(decompressed.len(), 1024 * 1024);
}

#[test]
fn test_incremental_pattern() {
    // Pattern that increases in complexity
    let mut input = Vec::new();
    for i in 0..256 {
        for _ in 0..10 {
            input.push(i as u8);
        }
    }

    let compressed = deflate(&input, 1).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_compression_levels() {
    let input = b"Hello, world! This is a test of DEFLATE compression with various levels.";

    for level in 0..=9 {
        let compressed = deflate(input, level).unwrap();
        let decompressed = inflate(&compressed).unwrap();
        assert_eq!(decompressed, input, "Level {} failed", level);

        // Level 0 only stores
        if level == 0 {
            assert!(compressed.len() > input.len());
        }
    }
}

#[test]
fn test_binary_data() {
    // Binary data with all byte values
    let input: Vec<u8> = (0..=255).cycle().take(5000).collect();

    let compressed = deflate(&input, 6).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_long_distance_match() {
    // Create a pattern with a match at maximum distance (32KB)
    let mut input = vec![0u8; 32768];
    let pattern = b"PATTERN_TO_MATCH";
    input[0..pattern.len()].copy_from_slice(pattern);
    input[32768 - pattern.len()..32768].copy_from_slice(pattern);

    let compressed = deflate(&input, 1).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_utf8_text() {
    let input = "Grüße aus Köln! Ünïcödé tëxt, ñoño, 日本語のテキスト, 日本語のテキスト. ".repeat(50);
    let compressed = deflate(input.as_bytes(), 6).unwrap();
    assert!(compressed.len() < input.len() / 5);
    assert_eq!(inflate(&compressed).unwrap(), input.as_bytes());
}

#[test]
fn test_tiny_chunks() {
    let input = b"tiny chunks still share history across blocks. ".repeat(30);
    for chunk_size in [1, 2, 3, 7, 100] {
        let config = DeflateConfig::default().with_chunk_size(chunk_size);
        let compressed = deflate_with_config(&input, config).unwrap();
        assert_eq!(inflate(&compressed).unwrap(), input, "chunk size {chunk_size}");
    }
}

#[test]
fn test_block_type_switches() {
    let input = b"only dynamic blocks are allowed here, only dynamic. ".repeat(20);
    let config = DeflateConfig {
        allow_fixed: false,
        allow_stored: false,
        ..DeflateConfig::default()
    };
    let compressed = deflate_with_config(&input, config).unwrap();
    assert_eq!(inflate(&compressed).unwrap(), input);
}
