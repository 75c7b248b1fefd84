//! Code-length meta-table for dynamic blocks (RFC 1951 Section 3.2.7).
//!
//! A dynamic block transmits its literal/length and distance code lengths
//! as one run-length coded sequence over a 19-symbol alphabet:
//!
//! - 0-15: a literal code length
//! - 16: repeat the previous length 3-6 times (2 extra bits)
//! - 17: repeat a zero length 3-10 times (3 extra bits)
//! - 18: repeat a zero length 11-138 times (7 extra bits)
//!
//! That alphabet is itself Huffman coded with codes of at most 7 bits,
//! whose lengths are sent as 3-bit values in [`CODE_LENGTH_ORDER`].

use crate::huffman::{
    CODELEN_ALPHABET_SIZE, CanonicalCodes, CodeLengths, DISTANCE_ALPHABET_SIZE, DecodeTable,
    END_OF_BLOCK, HuffmanBuilder, LITLEN_ALPHABET_SIZE, MAX_CODELEN_LENGTH,
};
use crate::tables::CODE_LENGTH_ORDER;
use std::io::{Read, Write};
use sufflate_core::error::{Result, SufflateError};
use sufflate_core::{BitReader, BitWriter};

/// One run-length coded entry of the code-length sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSymbol {
    /// Code-length alphabet symbol (0-18).
    pub symbol: u8,
    /// Value of the extra bits.
    pub extra: u8,
    /// Number of extra bits (0, 2, 3 or 7).
    pub extra_bits: u8,
}

impl RunSymbol {
    fn plain(len: u8) -> Self {
        Self {
            symbol: len,
            extra: 0,
            extra_bits: 0,
        }
    }

    fn repeat(symbol: u8, run: usize) -> Self {
        let (base, extra_bits) = match symbol {
            16 => (3, 2),
            17 => (3, 3),
            _ => (11, 7),
        };
        Self {
            symbol,
            extra: (run - base) as u8,
            extra_bits,
        }
    }
}

/// Run-length code a sequence of code lengths.
pub fn rle_encode(lengths: &[u8]) -> Vec<RunSymbol> {
    let mut symbols = Vec::new();
    let mut i = 0;

    while i < lengths.len() {
        let len = lengths[i];
        let mut count = lengths[i..].iter().take_while(|&&l| l == len).count();
        i += count;

        if len == 0 {
            while count > 0 {
                if count >= 11 {
                    let run = count.min(138);
                    symbols.push(RunSymbol::repeat(18, run));
                    count -= run;
                } else if count >= 3 {
                    let run = count.min(10);
                    symbols.push(RunSymbol::repeat(17, run));
                    count -= run;
                } else {
                    symbols.push(RunSymbol::plain(0));
                    count -= 1;
                }
            }
        } else {
            // The first occurrence is always sent literally
            symbols.push(RunSymbol::plain(len));
            count -= 1;

            while count > 0 {
                if count >= 3 {
                    let run = count.min(6);
                    symbols.push(RunSymbol::repeat(16, run));
                    count -= run;
                } else {
                    symbols.push(RunSymbol::plain(len));
                    count -= 1;
                }
            }
        }
    }

    symbols
}

/// The header payload of a dynamic block, ready to be written.
#[derive(Debug, Clone)]
pub struct DynamicHeader {
    /// Number of literal/length lengths sent (257-286).
    pub hlit: usize,
    /// Number of distance lengths sent (1-30).
    pub hdist: usize,
    /// Number of code-length code lengths sent (4-19).
    pub hclen: usize,
    codelen_lengths: CodeLengths,
    codelen_codes: CanonicalCodes,
    runs: Vec<RunSymbol>,
}

impl DynamicHeader {
    /// Prepare the header for a pair of literal/length and distance codes.
    pub fn new(litlen: &CodeLengths, distance: &CodeLengths) -> Result<Self> {
        let hlit = significant(litlen.as_slice(), 257);
        let hdist = significant(distance.as_slice(), 1);
        if hlit > LITLEN_ALPHABET_SIZE || hdist > DISTANCE_ALPHABET_SIZE {
            return Err(SufflateError::invalid_header(format!(
                "Alphabet too large for a dynamic block: {hlit} literal/length, {hdist} distance codes"
            )));
        }

        let mut combined = Vec::with_capacity(hlit + hdist);
        combined.extend((0..hlit).map(|s| litlen.get(s)));
        combined.extend((0..hdist).map(|s| distance.get(s)));
        let runs = rle_encode(&combined);

        let mut builder = HuffmanBuilder::new(CODELEN_ALPHABET_SIZE, MAX_CODELEN_LENGTH);
        for run in &runs {
            builder.add(u16::from(run.symbol));
        }
        builder.pad_to(2);
        let codelen_lengths = builder.build();
        let codelen_codes = CanonicalCodes::new(&codelen_lengths)?;

        let hclen = CODE_LENGTH_ORDER
            .iter()
            .rposition(|&symbol| codelen_lengths.get(symbol) != 0)
            .map_or(4, |last| (last + 1).max(4));

        Ok(Self {
            hlit,
            hdist,
            hclen,
            codelen_lengths,
            codelen_codes,
            runs,
        })
    }

    /// Code lengths of the code-length alphabet.
    pub fn codelen_lengths(&self) -> &CodeLengths {
        &self.codelen_lengths
    }

    /// Size of the header payload in bits, excluding the 3-bit block header.
    pub fn bit_len(&self) -> u64 {
        let runs: u64 = self
            .runs
            .iter()
            .map(|run| {
                u64::from(self.codelen_codes.len_of(run.symbol as usize))
                    + u64::from(run.extra_bits)
            })
            .sum();
        5 + 5 + 4 + 3 * self.hclen as u64 + runs
    }

    /// Write HLIT, HDIST, HCLEN, the code-length code and the sequence.
    pub fn write<W: Write>(&self, writer: &mut BitWriter<W>) -> Result<()> {
        writer.write_bits((self.hlit - 257) as u32, 5)?;
        writer.write_bits((self.hdist - 1) as u32, 5)?;
        writer.write_bits((self.hclen - 4) as u32, 4)?;

        for &symbol in &CODE_LENGTH_ORDER[..self.hclen] {
            writer.write_bits(u32::from(self.codelen_lengths.get(symbol)), 3)?;
        }

        for run in &self.runs {
            self.codelen_codes.write(writer, run.symbol as usize)?;
            if run.extra_bits > 0 {
                writer.write_bits(u32::from(run.extra), run.extra_bits)?;
            }
        }

        Ok(())
    }
}

/// Number of leading entries to send: up to the last nonzero, at least `min`.
fn significant(lengths: &[u8], min: usize) -> usize {
    lengths
        .iter()
        .rposition(|&len| len != 0)
        .map_or(min, |last| (last + 1).max(min))
}

/// Read the payload of a dynamic block header.
///
/// Returns the literal/length and distance code lengths.
pub fn read_dynamic_tables<R: Read>(
    reader: &mut BitReader<R>,
) -> Result<(CodeLengths, CodeLengths)> {
    let hlit = reader.read_bits(5)? as usize + 257;
    let hdist = reader.read_bits(5)? as usize + 1;
    let hclen = reader.read_bits(4)? as usize + 4;

    if hlit > LITLEN_ALPHABET_SIZE {
        return Err(SufflateError::invalid_header(format!(
            "Too many literal/length codes: {hlit}"
        )));
    }
    if hdist > DISTANCE_ALPHABET_SIZE {
        return Err(SufflateError::invalid_header(format!(
            "Too many distance codes: {hdist}"
        )));
    }

    let mut codelen_lengths = [0u8; CODELEN_ALPHABET_SIZE];
    for &symbol in &CODE_LENGTH_ORDER[..hclen] {
        codelen_lengths[symbol] = reader.read_bits(3)? as u8;
    }
    let codelen_table = DecodeTable::new(&CodeLengths::new(codelen_lengths.to_vec())?)?;

    let mut lengths = vec![0u8; hlit + hdist];
    let mut i = 0;

    while i < lengths.len() {
        let symbol = codelen_table.decode(reader)?;

        let (value, repeat) = match symbol {
            0..=15 => (symbol as u8, 1),
            16 => {
                if i == 0 {
                    return Err(SufflateError::corrupted(
                        reader.byte_position(),
                        "Repeat code 16 with no previous length",
                    ));
                }
                (lengths[i - 1], reader.read_bits(2)? as usize + 3)
            }
            17 => (0, reader.read_bits(3)? as usize + 3),
            18 => (0, reader.read_bits(7)? as usize + 11),
            _ => return Err(SufflateError::invalid_huffman(reader.bits_read())),
        };

        if i + repeat > lengths.len() {
            return Err(SufflateError::corrupted(
                reader.byte_position(),
                "Code length repeat overflows the table",
            ));
        }
        lengths[i..i + repeat].fill(value);
        i += repeat;
    }

    let distance = CodeLengths::new(lengths.split_off(hlit))?;
    let litlen = CodeLengths::new(lengths)?;

    if litlen.get(END_OF_BLOCK as usize) == 0 {
        return Err(SufflateError::invalid_header(
            "End-of-block symbol has no code",
        ));
    }

    Ok((litlen, distance))
}
