//! Canonical code assignment (RFC 1951 Section 3.2.2).

use super::{CodeLengths, MAX_CODE_LENGTH, reverse_bits};
use std::io::Write;
use sufflate_core::BitWriter;
use sufflate_core::error::{Result, SufflateError};

/// One symbol's code, bit-reversed for LSB-first emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HuffmanCode {
    /// Code bits, first transmitted bit in the LSB.
    pub bits: u16,
    /// Code length in bits (0 = symbol has no code).
    pub len: u8,
}

/// Symbol to code mapping for one alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalCodes {
    codes: Vec<HuffmanCode>,
}

impl CanonicalCodes {
    /// Assign canonical codes to a code-length array.
    pub fn new(lengths: &CodeLengths) -> Result<Self> {
        let mut bl_count = [0u16; MAX_CODE_LENGTH as usize + 1];
        for &len in lengths.as_slice() {
            if len > MAX_CODE_LENGTH {
                return Err(SufflateError::invalid_header(format!(
                    "Code length {len} exceeds maximum {MAX_CODE_LENGTH}"
                )));
            }
            bl_count[len as usize] += 1;
        }
        bl_count[0] = 0;

        let mut next_code = [0u16; MAX_CODE_LENGTH as usize + 1];
        let mut code = 0u32;
        for bits in 1..=MAX_CODE_LENGTH as usize {
            code = (code + u32::from(bl_count[bits - 1])) << 1;
            next_code[bits] = code as u16;
        }

        let codes = lengths
            .as_slice()
            .iter()
            .map(|&len| {
                if len == 0 {
                    return HuffmanCode::default();
                }
                let code = next_code[len as usize];
                next_code[len as usize] = code.wrapping_add(1);
                HuffmanCode {
                    bits: reverse_bits(code, len),
                    len,
                }
            })
            .collect();

        Ok(Self { codes })
    }

    /// Code for `symbol` (zero length when unused).
    #[inline]
    pub fn get(&self, symbol: usize) -> HuffmanCode {
        self.codes.get(symbol).copied().unwrap_or_default()
    }

    /// Code length for `symbol`.
    #[inline]
    pub fn len_of(&self, symbol: usize) -> u8 {
        self.get(symbol).len
    }

    /// Alphabet size.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether the alphabet is empty.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Write `symbol`'s code.
    #[inline]
    pub fn write<W: Write>(&self, writer: &mut BitWriter<W>, symbol: usize) -> Result<()> {
        let code = self.get(symbol);
        debug_assert!(code.len > 0, "symbol {symbol} has no code");
        writer.write_bits(u32::from(code.bits), code.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc_example() {
        // RFC 1951 3.2.2: lengths (3, 3, 3, 3, 3, 2, 4, 4) give
        // 010 011 100 101 110 00 1110 1111
        let lengths = CodeLengths::new(vec![3, 3, 3, 3, 3, 2, 4, 4]).unwrap();
        let codes = CanonicalCodes::new(&lengths).unwrap();

        let msb_first = [0b010, 0b011, 0b100, 0b101, 0b110, 0b00, 0b1110, 0b1111];
        for (symbol, &expected) in msb_first.iter().enumerate() {
            let code = codes.get(symbol);
            assert_eq!(reverse_bits(code.bits, code.len), expected);
        }
    }

    #[test]
    fn test_equal_lengths_increase_with_symbol() {
        let lengths = CodeLengths::new(vec![4, 0, 2, 4, 3, 4, 4, 2, 0, 3]).unwrap();
        let codes = CanonicalCodes::new(&lengths).unwrap();

        for len in 1..=4u8 {
            let values: Vec<u16> = (0..lengths.len())
                .filter(|&s| lengths.get(s) == len)
                .map(|s| reverse_bits(codes.get(s).bits, len))
                .collect();
            assert!(values.windows(2).all(|w| w[1] == w[0] + 1));
        }
        assert_eq!(codes.len_of(1), 0);
        assert_eq!(codes.get(99), HuffmanCode::default());
    }

    #[test]
    fn test_write_emits_reversed_code() {
        let lengths = CodeLengths::new(vec![1, 2, 2]).unwrap();
        let codes = CanonicalCodes::new(&lengths).unwrap();

        let mut writer = BitWriter::new(Vec::new());
        for symbol in [0, 1, 2, 0] {
            codes.write(&mut writer, symbol).unwrap();
        }
        // 0 | 01 | 11 | 0 packed LSB-first
        assert_eq!(writer.into_inner().unwrap(), vec![0b0001_1010]);
    }
}
