//! Constant tables for DEFLATE (RFC 1951).
//!
//! Length and distance base/extra-bit tables (section 3.2.5), the
//! code-length permutation (section 3.2.7) and the fixed Huffman codes
//! (section 3.2.6). The fixed codes are built once per process and shared.

use crate::huffman::{CanonicalCodes, CodeLengths, DecodeTable};
use std::sync::OnceLock;
use sufflate_core::error::Result;

/// Number of symbols covered by the fixed literal/length code.
pub const FIXED_LITLEN_SYMBOLS: usize = 288;

/// Number of symbols covered by the fixed distance code.
pub const FIXED_DISTANCE_SYMBOLS: usize = 32;

/// Fixed literal/length code lengths (RFC 1951 Section 3.2.6).
///
/// - Symbols 0-143: 8 bits
/// - Symbols 144-255: 9 bits
/// - Symbols 256-279: 7 bits
/// - Symbols 280-287: 8 bits
pub fn fixed_litlen_lengths() -> [u8; FIXED_LITLEN_SYMBOLS] {
    let mut lengths = [8u8; FIXED_LITLEN_SYMBOLS];
    lengths[144..256].fill(9);
    lengths[256..280].fill(7);
    lengths
}

/// Fixed distance code lengths (RFC 1951 Section 3.2.6).
///
/// All 32 distance codes use 5 bits. Symbols 30 and 31 take part in the
/// code but never appear in valid data.
pub fn fixed_distance_lengths() -> [u8; FIXED_DISTANCE_SYMBOLS] {
    [5u8; FIXED_DISTANCE_SYMBOLS]
}

/// Decode table for the fixed literal/length code.
pub fn fixed_litlen_table() -> Result<&'static DecodeTable> {
    static TABLE: OnceLock<DecodeTable> = OnceLock::new();

    if let Some(table) = TABLE.get() {
        return Ok(table);
    }
    let table = DecodeTable::new(&CodeLengths::new(fixed_litlen_lengths().to_vec())?)?;
    Ok(TABLE.get_or_init(|| table))
}

/// Decode table for the fixed distance code.
pub fn fixed_distance_table() -> Result<&'static DecodeTable> {
    static TABLE: OnceLock<DecodeTable> = OnceLock::new();

    if let Some(table) = TABLE.get() {
        return Ok(table);
    }
    let table = DecodeTable::new(&CodeLengths::new(fixed_distance_lengths().to_vec())?)?;
    Ok(TABLE.get_or_init(|| table))
}

/// Encoder codes for the fixed literal/length code.
pub fn fixed_litlen_codes() -> Result<&'static CanonicalCodes> {
    static CODES: OnceLock<CanonicalCodes> = OnceLock::new();

    if let Some(codes) = CODES.get() {
        return Ok(codes);
    }
    let codes = CanonicalCodes::new(&CodeLengths::new(fixed_litlen_lengths().to_vec())?)?;
    Ok(CODES.get_or_init(|| codes))
}

/// Encoder codes for the fixed distance code.
pub fn fixed_distance_codes() -> Result<&'static CanonicalCodes> {
    static CODES: OnceLock<CanonicalCodes> = OnceLock::new();

    if let Some(codes) = CODES.get() {
        return Ok(codes);
    }
    let codes = CanonicalCodes::new(&CodeLengths::new(fixed_distance_lengths().to_vec())?)?;
    Ok(CODES.get_or_init(|| codes))
}

/// Length code base values (RFC 1951 Section 3.2.5).
///
/// For length codes 257-285, this gives the base length value.
/// Extra bits are added to get the final length.
pub const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, // 257-264: 0 extra bits
    11, 13, 15, 17, // 265-268: 1 extra bit
    19, 23, 27, 31, // 269-272: 2 extra bits
    35, 43, 51, 59, // 273-276: 3 extra bits
    67, 83, 99, 115, // 277-280: 4 extra bits
    131, 163, 195, 227, // 281-284: 5 extra bits
    258, // 285: 0 extra bits
];

/// Number of extra bits for length codes 257-285.
pub const LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, // 257-264
    1, 1, 1, 1, // 265-268
    2, 2, 2, 2, // 269-272
    3, 3, 3, 3, // 273-276
    4, 4, 4, 4, // 277-280
    5, 5, 5, 5, // 281-284
    0, // 285
];

/// Distance code base values (RFC 1951 Section 3.2.5).
pub const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, // 0-3: 0 extra bits
    5, 7, // 4-5: 1 extra bit
    9, 13, // 6-7: 2 extra bits
    17, 25, // 8-9: 3 extra bits
    33, 49, // 10-11: 4 extra bits
    65, 97, // 12-13: 5 extra bits
    129, 193, // 14-15: 6 extra bits
    257, 385, // 16-17: 7 extra bits
    513, 769, // 18-19: 8 extra bits
    1025, 1537, // 20-21: 9 extra bits
    2049, 3073, // 22-23: 10 extra bits
    4097, 6145, // 24-25: 11 extra bits
    8193, 12289, // 26-27: 12 extra bits
    16385, 24577, // 28-29: 13 extra bits
];

/// Number of extra bits for distance codes 0-29.
pub const DISTANCE_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Order in which code-length code lengths are transmitted
/// (RFC 1951 Section 3.2.7).
pub const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// A length or distance split into its symbol and extra bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolCode {
    /// Alphabet symbol (257-285 for lengths, 0-29 for distances).
    pub symbol: u16,
    /// Number of extra bits following the symbol.
    pub extra_bits: u8,
    /// Value carried by the extra bits.
    pub extra_value: u16,
}

/// Convert a match length (3-258) to its length symbol (257-285).
pub fn length_to_code(length: u16) -> SymbolCode {
    debug_assert!((3..=258).contains(&length), "Length out of range: {length}");

    let index = match length {
        0..=10 => length.saturating_sub(3) as usize,
        258 => 28,
        _ => LENGTH_BASE[..28].partition_point(|&base| base <= length) - 1,
    };

    SymbolCode {
        symbol: 257 + index as u16,
        extra_bits: LENGTH_EXTRA_BITS[index],
        extra_value: length - LENGTH_BASE[index],
    }
}

/// Convert a distance (1-32768) to its distance symbol (0-29).
pub fn distance_to_code(distance: u16) -> SymbolCode {
    debug_assert!(
        (1..=32768).contains(&distance),
        "Distance out of range: {distance}"
    );

    let index = DISTANCE_BASE
        .partition_point(|&base| base <= distance)
        .saturating_sub(1);

    SymbolCode {
        symbol: index as u16,
        extra_bits: DISTANCE_EXTRA_BITS[index],
        extra_value: distance - DISTANCE_BASE[index],
    }
}

/// Decode a length from a length symbol and its extra bits.
pub fn decode_length(symbol: u16, extra: u16) -> u16 {
    debug_assert!((257..=285).contains(&symbol), "Invalid length code: {symbol}");
    LENGTH_BASE[(symbol - 257) as usize] + extra
}

/// Decode a distance from a distance symbol and its extra bits.
pub fn decode_distance(symbol: u16, extra: u16) -> u16 {
    debug_assert!(symbol < 30, "Invalid distance code: {symbol}");
    DISTANCE_BASE[symbol as usize] + extra
}
