//! Two-level table for decoding canonical Huffman codes.
//!
//! The primary table is indexed by the next 9 input bits. Codes of at most
//! 9 bits are replicated into every slot that starts with them. Longer
//! codes are grouped by their first 9 bits; the primary slot links to a
//! subtable indexed by the bits that follow. Any code up to 15 bits is
//! decoded with at most two lookups.

use super::{CodeLengths, MAX_CODE_LENGTH, reverse_bits};
use std::io::Read;
use sufflate_core::BitReader;
use sufflate_core::error::{Result, SufflateError};

/// Number of bits indexing the primary table.
pub const PRIMARY_BITS: u8 = 9;

const PRIMARY_SIZE: usize = 1 << PRIMARY_BITS;

/// One decode-table slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// No code starts with these bits.
    Invalid,
    /// A complete code.
    Symbol {
        /// Decoded symbol.
        symbol: u16,
        /// Total code length in bits.
        len: u8,
    },
    /// The code continues in a subtable.
    Link {
        /// Offset of the subtable.
        base: u16,
        /// Number of bits indexing the subtable.
        bits: u8,
    },
}

/// Fast decode table built from code lengths alone.
#[derive(Debug, Clone)]
pub struct DecodeTable {
    primary: Vec<Entry>,
    subtables: Vec<Entry>,
    max_length: u8,
    symbols: usize,
}

impl DecodeTable {
    /// Build the table for a code-length array.
    ///
    /// Over-subscribed lengths are rejected. Incomplete codes are accepted;
    /// their unused bit patterns decode as [`Entry::Invalid`].
    pub fn new(lengths: &CodeLengths) -> Result<Self> {
        let mut bl_count = [0u32; MAX_CODE_LENGTH as usize + 1];
        for &len in lengths.as_slice() {
            if len > MAX_CODE_LENGTH {
                return Err(SufflateError::invalid_header(format!(
                    "Code length {len} exceeds maximum {MAX_CODE_LENGTH}"
                )));
            }
            bl_count[len as usize] += 1;
        }
        bl_count[0] = 0;

        let mut left = 1i64;
        for &count in &bl_count[1..] {
            left = (left << 1) - i64::from(count);
            if left < 0 {
                return Err(SufflateError::invalid_header("Over-subscribed Huffman code"));
            }
        }

        let max_length = lengths.max_length();
        let mut table = Self {
            primary: vec![Entry::Invalid; PRIMARY_SIZE],
            subtables: Vec::new(),
            max_length,
            symbols: lengths.used_symbols(),
        };
        if max_length == 0 {
            return Ok(table);
        }

        let mut next_code = [0u16; MAX_CODE_LENGTH as usize + 1];
        let mut code = 0u32;
        for bits in 1..=MAX_CODE_LENGTH as usize {
            code = (code + bl_count[bits - 1]) << 1;
            next_code[bits] = code as u16;
        }

        let sub_bits = max_length.saturating_sub(PRIMARY_BITS);

        for (symbol, &len) in lengths.as_slice().iter().enumerate() {
            if len == 0 {
                continue;
            }
            let reversed = reverse_bits(next_code[len as usize], len) as usize;
            next_code[len as usize] += 1;
            let entry = Entry::Symbol {
                symbol: symbol as u16,
                len,
            };

            if len <= PRIMARY_BITS {
                for slot in (reversed..PRIMARY_SIZE).step_by(1 << len) {
                    table.primary[slot] = entry;
                }
                continue;
            }

            let prefix = reversed & (PRIMARY_SIZE - 1);
            let base = match table.primary[prefix] {
                Entry::Link { base, .. } => base as usize,
                Entry::Invalid => {
                    let base = table.subtables.len();
                    table
                        .subtables
                        .resize(base + (1 << sub_bits), Entry::Invalid);
                    table.primary[prefix] = Entry::Link {
                        base: base as u16,
                        bits: sub_bits,
                    };
                    base
                }
                Entry::Symbol { .. } => {
                    return Err(SufflateError::invalid_header("Huffman code is not prefix-free"));
                }
            };

            let suffix = reversed >> PRIMARY_BITS;
            let step = 1 << (len - PRIMARY_BITS);
            for slot in (suffix..1 << sub_bits).step_by(step) {
                table.subtables[base + slot] = entry;
            }
        }

        Ok(table)
    }

    /// Longest code length in the table.
    pub fn max_length(&self) -> u8 {
        self.max_length
    }

    /// Number of symbols that have a code.
    pub fn symbol_count(&self) -> usize {
        self.symbols
    }

    /// Primary-table entry for the given 9 bits.
    pub fn primary_entry(&self, bits: usize) -> Entry {
        self.primary[bits & (PRIMARY_SIZE - 1)]
    }

    /// Decode one symbol from the stream.
    #[inline]
    pub fn decode<R: Read>(&self, reader: &mut BitReader<R>) -> Result<u16> {
        let (bits, available) = reader.peek_bits_padded(PRIMARY_BITS)?;

        match self.primary[bits as usize] {
            Entry::Symbol { symbol, len } => {
                if len > available {
                    return Err(SufflateError::unexpected_eof(1));
                }
                reader.skip_bits(len)?;
                Ok(symbol)
            }
            Entry::Link { base, bits: sub_bits } => {
                if available < PRIMARY_BITS {
                    return Err(SufflateError::unexpected_eof(1));
                }
                reader.skip_bits(PRIMARY_BITS)?;

                let (index, available) = reader.peek_bits_padded(sub_bits)?;
                match self.subtables[base as usize + index as usize] {
                    Entry::Symbol { symbol, len } => {
                        let rest = len - PRIMARY_BITS;
                        if rest > available {
                            return Err(SufflateError::unexpected_eof(1));
                        }
                        reader.skip_bits(rest)?;
                        Ok(symbol)
                    }
                    _ => Err(SufflateError::invalid_huffman(reader.bits_read())),
                }
            }
            Entry::Invalid => {
                if available < PRIMARY_BITS.min(self.max_length) {
                    Err(SufflateError::unexpected_eof(1))
                } else {
                    Err(SufflateError::invalid_huffman(reader.bits_read()))
                }
            }
        }
    }
}
