//! Block encoder.
//!
//! [`BlockEncoder`] collects literals and matches for one block, then on
//! [`flush_block`] builds that block's Huffman codes, picks the cheapest
//! block type and writes the block.
//!
//! Before each token is written it is replayed through a sliding window
//! that mirrors what a decoder will hold. A match is checked against the
//! block's final codes: if sending its bytes as literals is cheaper, the
//! literals are sent instead. A byte without a literal code (it only ever
//! arrived through matches) makes the literal route impossible, so such a
//! match is always kept.
//!
//! [`flush_block`]: BlockEncoder::flush_block

use crate::config::DeflateConfig;
use crate::codelen::DynamicHeader;
use crate::header::{Block, BlockHeader, BlockKind, MAX_STORED_LEN};
use crate::huffman::{
    CanonicalCodes, DISTANCE_ALPHABET_SIZE, END_OF_BLOCK, HuffmanBuilder, LITLEN_ALPHABET_SIZE,
};
use crate::lz77::{MAX_DISTANCE, MAX_MATCH, MIN_MATCH, Token};
use crate::tables::{
    distance_to_code, fixed_distance_codes, fixed_litlen_codes, length_to_code,
};
use log::{debug, trace};
use std::io::Write;
use sufflate_core::error::{Result, SufflateError};
use sufflate_core::{BitWriter, SlidingWindow};

/// Literal/length and distance codes used to write one block.
struct BlockCodes<'a> {
    litlen: &'a CanonicalCodes,
    distance: &'a CanonicalCodes,
}

/// Encoder producing a raw DEFLATE stream block by block.
#[derive(Debug)]
pub struct BlockEncoder<W: Write> {
    writer: BitWriter<W>,
    tokens: Vec<Token>,
    litlen_freq: Vec<u32>,
    dist_freq: Vec<u32>,
    /// Mirror of the decoder's history.
    window: SlidingWindow,
    /// Uncompressed bytes covered by `tokens`.
    pending_bytes: usize,
    /// Uncompressed bytes accepted so far, pending ones included.
    total_in: u64,
    allow_fixed: bool,
    allow_stored: bool,
    store_only: bool,
    blocks: u64,
    finished: bool,
}

impl<W: Write> BlockEncoder<W> {
    /// Create an encoder that may use any block type.
    pub fn new(writer: W) -> Self {
        Self::with_config(writer, &DeflateConfig::default())
    }

    /// Create an encoder honouring the block-type switches of `config`.
    pub fn with_config(writer: W, config: &DeflateConfig) -> Self {
        Self {
            writer: BitWriter::new(writer),
            tokens: Vec::new(),
            litlen_freq: vec![0; LITLEN_ALPHABET_SIZE],
            dist_freq: vec![0; DISTANCE_ALPHABET_SIZE],
            window: SlidingWindow::new(),
            pending_bytes: 0,
            total_in: 0,
            allow_fixed: config.allow_fixed,
            allow_stored: config.allow_stored,
            store_only: config.store_only,
            blocks: 0,
            finished: false,
        }
    }

    /// Uncompressed bytes accepted so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Bits written so far.
    pub fn bits_written(&self) -> u64 {
        self.writer.bits_written()
    }

    /// Uncompressed bytes waiting for the next flush.
    pub fn pending_bytes(&self) -> usize {
        self.pending_bytes
    }

    /// Whether the final block has been written.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn check_open(&self) -> Result<()> {
        if self.finished {
            return Err(SufflateError::Io(std::io::Error::other(
                "encoder already wrote its final block",
            )));
        }
        Ok(())
    }

    /// Queue a literal byte.
    pub fn encode_literal(&mut self, byte: u8) -> Result<()> {
        self.check_open()?;
        self.tokens.push(Token::Literal(byte));
        self.litlen_freq[byte as usize] += 1;
        self.pending_bytes += 1;
        self.total_in += 1;
        Ok(())
    }

    /// Queue a back-reference of `length` bytes starting `distance` back.
    pub fn encode_length_distance(&mut self, length: usize, distance: usize) -> Result<()> {
        self.check_open()?;
        let reachable = self.total_in.min(MAX_DISTANCE as u64) as usize;
        if !(MIN_MATCH..=MAX_MATCH).contains(&length) || distance == 0 || distance > reachable {
            return Err(SufflateError::invalid_match(length, distance));
        }

        let length = length as u16;
        let distance = distance as u16;
        self.tokens.push(Token::Match { length, distance });
        self.litlen_freq[length_to_code(length).symbol as usize] += 1;
        self.dist_freq[distance_to_code(distance).symbol as usize] += 1;
        self.pending_bytes += length as usize;
        self.total_in += u64::from(length);
        Ok(())
    }

    /// Queue a token from the match finder.
    pub fn encode_token(&mut self, token: Token) -> Result<()> {
        match token {
            Token::Literal(byte) => self.encode_literal(byte),
            Token::Match { length, distance } => {
                self.encode_length_distance(length as usize, distance as usize)
            }
        }
    }

    /// Write the queued tokens as one block (or several stored blocks).
    ///
    /// The final block is followed by zero padding to a byte boundary and
    /// a flush of the underlying writer.
    pub fn flush_block(&mut self, is_final: bool) -> Result<BlockKind> {
        self.check_open()?;

        let kind = if self.store_only {
            BlockKind::Stored
        } else {
            self.write_huffman_or_stored(is_final)?
        };
        if kind == BlockKind::Stored {
            self.write_stored(is_final)?;
        }

        self.tokens.clear();
        self.litlen_freq.fill(0);
        self.dist_freq.fill(0);
        self.pending_bytes = 0;
        self.window.discard_unread();
        self.blocks += 1;

        if is_final {
            self.writer.flush()?;
            self.finished = true;
        }

        Ok(kind)
    }

    /// Choose a block type by exact size and write Huffman blocks.
    ///
    /// Returns the chosen kind; stored blocks are left to the caller.
    fn write_huffman_or_stored(&mut self, is_final: bool) -> Result<BlockKind> {
        let mut litlen = HuffmanBuilder::from_frequencies(&self.litlen_freq);
        litlen.add(END_OF_BLOCK);
        litlen.pad_to(2);
        let mut dist = HuffmanBuilder::from_frequencies(&self.dist_freq);
        dist.pad_to(2);

        let litlen_lengths = litlen.build();
        let dist_lengths = dist.build();
        let dynamic_codes = (
            CanonicalCodes::new(&litlen_lengths)?,
            CanonicalCodes::new(&dist_lengths)?,
        );
        let dynamic_header = DynamicHeader::new(&litlen_lengths, &dist_lengths)?;

        let fixed_codes = (fixed_litlen_codes()?, fixed_distance_codes()?);

        let dynamic_bits = 3
            + dynamic_header.bit_len()
            + self.data_bits(&BlockCodes {
                litlen: &dynamic_codes.0,
                distance: &dynamic_codes.1,
            });
        let fixed_bits = 3 + self.data_bits(&BlockCodes {
            litlen: fixed_codes.0,
            distance: fixed_codes.1,
        });
        let stored_bits = self.stored_bits();

        let mut choice = (dynamic_bits, BlockKind::Dynamic);
        if self.allow_fixed && fixed_bits <= choice.0 {
            choice = (fixed_bits, BlockKind::Fixed);
        }
        if self.allow_stored && stored_bits < choice.0 {
            choice = (stored_bits, BlockKind::Stored);
        }

        debug!(
            "block {}: {} tokens, {} bytes, dynamic {} / fixed {} / stored {} bits -> {}",
            self.blocks,
            self.tokens.len(),
            self.pending_bytes,
            dynamic_bits,
            fixed_bits,
            stored_bits,
            choice.1
        );

        match choice.1 {
            BlockKind::Stored => {}
            BlockKind::Fixed => {
                BlockHeader {
                    is_final,
                    block: Block::Fixed,
                }
                .write(&mut self.writer)?;
                self.write_tokens(&BlockCodes {
                    litlen: fixed_codes.0,
                    distance: fixed_codes.1,
                })?;
            }
            BlockKind::Dynamic => {
                self.writer.write_bit(is_final)?;
                self.writer.write_bits(BlockKind::Dynamic.btype(), 2)?;
                dynamic_header.write(&mut self.writer)?;
                self.write_tokens(&BlockCodes {
                    litlen: &dynamic_codes.0,
                    distance: &dynamic_codes.1,
                })?;
            }
        }

        Ok(choice.1)
    }

    /// Bits for the queued tokens plus end-of-block under `codes`.
    fn data_bits(&self, codes: &BlockCodes<'_>) -> u64 {
        let mut bits = u64::from(codes.litlen.len_of(END_OF_BLOCK as usize));
        for token in &self.tokens {
            bits += match *token {
                Token::Literal(byte) => u64::from(codes.litlen.len_of(byte as usize)),
                Token::Match { length, distance } => {
                    u64::from(match_bits(codes, length, distance).unwrap_or(0))
                }
            };
        }
        bits
    }

    /// Exact size of the queued bytes as stored blocks.
    fn stored_bits(&self) -> u64 {
        let blocks = self.pending_bytes.div_ceil(MAX_STORED_LEN).max(1) as u64;
        // The first header may start mid-byte; later ones start aligned
        let first_pad = (8 - (self.writer.bits_written() + 3) % 8) % 8;
        blocks * (3 + 32) + first_pad + (blocks - 1) * 5 + 8 * self.pending_bytes as u64
    }

    /// Replay the tokens through the window and write them, re-checking
    /// each match against the final codes.
    fn write_tokens(&mut self, codes: &BlockCodes<'_>) -> Result<()> {
        let tokens = std::mem::take(&mut self.tokens);

        for &token in &tokens {
            match token {
                Token::Literal(byte) => {
                    self.window.push(byte);
                    codes.litlen.write(&mut self.writer, byte as usize)?;
                }
                Token::Match { length, distance } => {
                    self.window.copy(distance as usize, length as usize)?;
                    self.write_match_or_literals(codes, length, distance)?;
                }
            }
            self.window.discard_unread();
        }

        codes.litlen.write(&mut self.writer, END_OF_BLOCK as usize)?;
        self.tokens = tokens;
        Ok(())
    }

    fn write_match_or_literals(
        &mut self,
        codes: &BlockCodes<'_>,
        length: u16,
        distance: u16,
    ) -> Result<()> {
        let (head, tail) = self.window.recent(length as usize);
        let literal_bits = head
            .iter()
            .chain(tail)
            .try_fold(0u32, |sum, &b| match codes.litlen.len_of(b as usize) {
                0 => None,
                len => Some(sum + u32::from(len)),
            });

        let Some(match_cost) = match_bits(codes, length, distance) else {
            return Err(SufflateError::invalid_match(length as usize, distance as usize));
        };

        match literal_bits {
            Some(literal_bits) if literal_bits < match_cost => {
                trace!(
                    "match len {length} dist {distance}: {match_cost} bits, sending literals ({literal_bits} bits)"
                );
                for &byte in head.iter().chain(tail) {
                    codes.litlen.write(&mut self.writer, byte as usize)?;
                }
                Ok(())
            }
            _ => {
                if literal_bits.is_none() {
                    trace!("match len {length} dist {distance}: kept, a byte has no literal code");
                }
                self.write_match(codes, length, distance)
            }
        }
    }

    fn write_match(&mut self, codes: &BlockCodes<'_>, length: u16, distance: u16) -> Result<()> {
        let len = length_to_code(length);
        codes.litlen.write(&mut self.writer, len.symbol as usize)?;
        self.writer
            .write_bits(u32::from(len.extra_value), len.extra_bits)?;

        let dist = distance_to_code(distance);
        codes.distance.write(&mut self.writer, dist.symbol as usize)?;
        self.writer
            .write_bits(u32::from(dist.extra_value), dist.extra_bits)?;
        Ok(())
    }

    /// Write the queued bytes as stored blocks of at most 65535 bytes.
    fn write_stored(&mut self, is_final: bool) -> Result<()> {
        let mut data = Vec::with_capacity(self.pending_bytes);
        for &token in &self.tokens {
            match token {
                Token::Literal(byte) => self.window.push(byte),
                Token::Match { length, distance } => {
                    self.window.copy(distance as usize, length as usize)?
                }
            }
            let (head, tail) = self.window.recent(token.byte_len());
            data.extend_from_slice(head);
            data.extend_from_slice(tail);
        }

        let mut chunks = data.chunks(MAX_STORED_LEN).peekable();
        if chunks.peek().is_none() {
            return self.write_stored_chunk(&[], is_final);
        }
        while let Some(chunk) = chunks.next() {
            let last = chunks.peek().is_none();
            self.write_stored_chunk(chunk, is_final && last)?;
        }
        Ok(())
    }

    fn write_stored_chunk(&mut self, chunk: &[u8], is_final: bool) -> Result<()> {
        BlockHeader {
            is_final,
            block: Block::Stored {
                len: chunk.len() as u16,
            },
        }
        .write(&mut self.writer)?;
        self.writer.write_bytes(chunk)
    }

    /// Write the final block if needed and return the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        if !self.finished {
            self.flush_block(true)?;
        }
        self.writer.into_inner()
    }
}

/// Bits for a match under `codes`, or `None` if a symbol has no code.
fn match_bits(codes: &BlockCodes<'_>, length: u16, distance: u16) -> Option<u32> {
    let len = length_to_code(length);
    let dist = distance_to_code(distance);
    let len_code = codes.litlen.len_of(len.symbol as usize);
    let dist_code = codes.distance.len_of(dist.symbol as usize);
    if len_code == 0 || dist_code == 0 {
        return None;
    }
    Some(
        u32::from(len_code)
            + u32::from(len.extra_bits)
            + u32::from(dist_code)
            + u32::from(dist.extra_bits),
    )
}
