//! Huffman coding for DEFLATE.
//!
//! DEFLATE uses canonical Huffman codes, where codes of the same length are
//! consecutive integers in symbol order, so a code is fully described by
//! its array of code lengths. The pipeline is a chain of immutable values:
//!
//! ```text
//! frequencies ──HuffmanBuilder──▶ CodeLengths ──restrict──▶ CodeLengths
//!                                                              │
//!                                     ┌────────────────────────┴──────┐
//!                                     ▼                               ▼
//!                              CanonicalCodes                   DecodeTable
//!                              (encoder side)                  (decoder side)
//! ```
//!
//! # Alphabets
//!
//! DEFLATE uses three Huffman alphabets:
//! - **Literal/Length**: 0-285 (0-255 literals, 256 EOB, 257-285 lengths)
//! - **Distance**: 0-29 (back-reference distances)
//! - **Code Length**: 0-18 (for encoding dynamic Huffman tables)

mod builder;
mod canonical;
mod decode;
mod lengths;

pub use builder::HuffmanBuilder;
pub use canonical::{CanonicalCodes, HuffmanCode};
pub use decode::{DecodeTable, Entry, PRIMARY_BITS};
pub use lengths::CodeLengths;

/// Maximum code length for the literal/length and distance alphabets.
pub const MAX_CODE_LENGTH: u8 = 15;

/// Maximum code length for the code-length alphabet.
pub const MAX_CODELEN_LENGTH: u8 = 7;

/// Size of the literal/length alphabet (0-285).
pub const LITLEN_ALPHABET_SIZE: usize = 286;

/// Size of the distance alphabet (0-29).
pub const DISTANCE_ALPHABET_SIZE: usize = 30;

/// Size of the code length alphabet (0-18).
pub const CODELEN_ALPHABET_SIZE: usize = 19;

/// End of block symbol.
pub const END_OF_BLOCK: u16 = 256;

/// Reverse the low `length` bits of `code`.
///
/// Huffman codes are defined MSB-first but DEFLATE packs them LSB-first.
#[inline]
pub fn reverse_bits(code: u16, length: u8) -> u16 {
    if length == 0 {
        return 0;
    }
    code.reverse_bits() >> (16 - length as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_bits() {
        assert_eq!(reverse_bits(0b101, 3), 0b101);
        assert_eq!(reverse_bits(0b1100, 4), 0b0011);
        assert_eq!(reverse_bits(0b10101010, 8), 0b01010101);
        assert_eq!(reverse_bits(1, 15), 1 << 14);
        assert_eq!(reverse_bits(0x7FFF, 0), 0);
    }
}
