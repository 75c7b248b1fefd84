//! Streaming DEFLATE decompression.
//!
//! [`Decoder`] pulls bits from any [`Read`] source and expands them into a
//! 32 KiB [`SlidingWindow`], which doubles as the output buffer. Symbols are
//! only decoded while the window has room for the longest match, so unread
//! output is never overwritten; the caller drains it with [`Decoder::read`],
//! [`Decoder::read_byte`], [`Decoder::skip`] or the [`Read`] impl.

use crate::header::{Block, BlockHeader, BlockKind};
use crate::huffman::{DecodeTable, END_OF_BLOCK};
use crate::lz77::MAX_MATCH;
use crate::tables::{
    DISTANCE_EXTRA_BITS, LENGTH_EXTRA_BITS, decode_distance, decode_length,
    fixed_distance_table, fixed_litlen_table,
};
use log::debug;
use std::borrow::Cow;
use std::io::{self, Read};
use sufflate_core::error::{Result, SufflateError};
use sufflate_core::{BitReader, SlidingWindow};

/// Largest stored-block piece copied per step.
const STORED_CHUNK: usize = 4096;

/// What the decoder learned about one finished block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSummary {
    /// Block type.
    pub kind: BlockKind,
    /// Whether the block was marked final.
    pub is_final: bool,
    /// Uncompressed bytes the block produced.
    pub output_len: u64,
    /// Compressed size in bits, header included.
    pub bit_len: u64,
}

#[derive(Debug)]
enum State {
    /// Expecting a block header.
    Header,
    /// Inside a stored block.
    Stored { remaining: usize },
    /// Inside a fixed or dynamic block.
    Huffman {
        litlen: Cow<'static, DecodeTable>,
        distance: Cow<'static, DecodeTable>,
    },
    /// Past the final block.
    Done,
}

/// Block being decoded.
#[derive(Debug, Clone, Copy)]
struct Current {
    kind: BlockKind,
    is_final: bool,
    output_start: u64,
    bit_start: u64,
}

/// Streaming raw DEFLATE decoder.
#[derive(Debug)]
pub struct Decoder<R: Read> {
    reader: BitReader<R>,
    window: SlidingWindow,
    state: State,
    current: Option<Current>,
    summaries: Vec<BlockSummary>,
}

impl<R: Read> Decoder<R> {
    /// Create a decoder over a raw DEFLATE stream.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BitReader::new(reader),
            window: SlidingWindow::new(),
            state: State::Header,
            current: None,
            summaries: Vec::new(),
        }
    }

    /// Whether the final block has been decoded and all output read.
    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Done) && self.window.available() == 0
    }

    /// Summaries of the blocks decoded so far.
    pub fn block_summaries(&self) -> &[BlockSummary] {
        &self.summaries
    }

    /// Uncompressed bytes produced so far, read or not.
    pub fn total_out(&self) -> u64 {
        self.window.total_written()
    }

    /// Compressed bits consumed so far.
    pub fn bits_read(&self) -> u64 {
        self.reader.bits_read()
    }

    /// Return the underlying reader.
    ///
    /// Input the decoder had buffered but not consumed is lost.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    /// Read the next output byte, or `None` at the end of the stream.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        self.fill()?;
        Ok(self.window.read_byte())
    }

    /// Read output into `buf`, returning the number of bytes copied.
    ///
    /// Returns 0 only at the end of the stream (or for an empty `buf`).
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.fill()?;
        Ok(self.window.read(buf))
    }

    /// Discard up to `count` output bytes, returning how many were skipped.
    pub fn skip(&mut self, count: u64) -> Result<u64> {
        let mut skipped = 0u64;
        while skipped < count {
            self.fill()?;
            let want = (count - skipped).min(self.window.available() as u64) as usize;
            if want == 0 {
                break;
            }
            skipped += self.window.skip(want) as u64;
        }
        Ok(skipped)
    }

    /// Decode the rest of the stream, appending it to `out`.
    pub fn read_to_end(&mut self, out: &mut Vec<u8>) -> Result<usize> {
        let before = out.len();
        loop {
            self.fill()?;
            let available = self.window.available();
            if available == 0 {
                return Ok(out.len() - before);
            }
            let start = out.len();
            out.resize(start + available, 0);
            self.window.read(&mut out[start..]);
        }
    }

    /// Decode until some output is unread or the stream has ended.
    fn fill(&mut self) -> Result<()> {
        while self.window.available() == 0 && !matches!(self.state, State::Done) {
            self.step()?;
        }
        Ok(())
    }

    /// Advance by one header, one stored piece, or a run of symbols.
    fn step(&mut self) -> Result<()> {
        match &self.state {
            State::Header => self.start_block(),
            State::Stored { remaining } => {
                let remaining = *remaining;
                self.copy_stored(remaining)
            }
            State::Huffman { .. } => self.decode_symbols(),
            State::Done => Ok(()),
        }
    }

    fn start_block(&mut self) -> Result<()> {
        let bit_start = self.reader.bits_read();
        let header = BlockHeader::read(&mut self.reader)?;
        let kind = header.kind();

        debug!(
            "block {} at bit {}: {}{}",
            self.summaries.len(),
            bit_start,
            kind,
            if header.is_final { " (final)" } else { "" }
        );

        self.current = Some(Current {
            kind,
            is_final: header.is_final,
            output_start: self.window.total_written(),
            bit_start,
        });

        self.state = match header.block {
            Block::Stored { len } => State::Stored {
                remaining: len as usize,
            },
            Block::Fixed => State::Huffman {
                litlen: Cow::Borrowed(fixed_litlen_table()?),
                distance: Cow::Borrowed(fixed_distance_table()?),
            },
            Block::Dynamic { litlen, distance } => State::Huffman {
                litlen: Cow::Owned(DecodeTable::new(&litlen)?),
                distance: Cow::Owned(DecodeTable::new(&distance)?),
            },
        };

        if let State::Stored { remaining: 0 } = self.state {
            self.end_block();
        }
        Ok(())
    }

    fn copy_stored(&mut self, remaining: usize) -> Result<()> {
        let mut buf = [0u8; STORED_CHUNK];
        let count = remaining.min(self.window.free_space()).min(STORED_CHUNK);
        self.reader.read_bytes(&mut buf[..count])?;
        self.window.push_slice(&buf[..count]);

        let remaining = remaining - count;
        if remaining == 0 {
            self.end_block();
        } else {
            self.state = State::Stored { remaining };
        }
        Ok(())
    }

    fn decode_symbols(&mut self) -> Result<()> {
        let State::Huffman { litlen, distance } = &self.state else {
            return Ok(());
        };

        let mut block_done = false;
        while self.window.free_space() >= MAX_MATCH {
            let symbol = litlen.decode(&mut self.reader)?;

            if symbol < END_OF_BLOCK {
                self.window.push(symbol as u8);
                continue;
            }
            if symbol == END_OF_BLOCK {
                block_done = true;
                break;
            }

            let index = (symbol - 257) as usize;
            if index >= LENGTH_EXTRA_BITS.len() {
                return Err(SufflateError::corrupted(
                    self.reader.byte_position(),
                    format!("Invalid literal/length symbol {symbol}"),
                ));
            }
            let extra = self.reader.read_bits(LENGTH_EXTRA_BITS[index])? as u16;
            let length = decode_length(symbol, extra);

            let dist_symbol = distance.decode(&mut self.reader)?;
            if dist_symbol as usize >= DISTANCE_EXTRA_BITS.len() {
                return Err(SufflateError::corrupted(
                    self.reader.byte_position(),
                    format!("Invalid distance symbol {dist_symbol}"),
                ));
            }
            let extra = self.reader.read_bits(DISTANCE_EXTRA_BITS[dist_symbol as usize])? as u16;
            let dist = decode_distance(dist_symbol, extra);

            self.window.copy(dist as usize, length as usize)?;
        }

        if block_done {
            self.end_block();
        }
        Ok(())
    }

    fn end_block(&mut self) {
        let Some(current) = self.current.take() else {
            return;
        };
        let summary = BlockSummary {
            kind: current.kind,
            is_final: current.is_final,
            output_len: self.window.total_written() - current.output_start,
            bit_len: self.reader.bits_read() - current.bit_start,
        };
        debug!(
            "block {} done: {} bytes from {} bits",
            self.summaries.len(),
            summary.output_len,
            summary.bit_len
        );
        self.summaries.push(summary);

        self.state = if current.is_final {
            State::Done
        } else {
            State::Header
        };
    }
}

impl<R: Read> Read for Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Decoder::read(self, buf).map_err(io::Error::from)
    }
}

/// Decompress a complete raw DEFLATE stream.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    inflate_reader(data)
}

/// Decompress a raw DEFLATE stream read from `reader`.
pub fn inflate_reader<R: Read>(reader: R) -> Result<Vec<u8>> {
    let mut decoder = Decoder::new(reader);
    let mut output = Vec::new();
    decoder.read_to_end(&mut output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sufflate_core::error::ErrorKind;

    /// Stored block holding "Hello".
    const STORED_HELLO: [u8; 10] = [0x01, 0x05, 0x00, 0xFA, 0xFF, b'H', b'e', b'l', b'l', b'o'];

    #[test]
    fn test_inflate_stored() {
        assert_eq!(inflate(&STORED_HELLO).unwrap(), b"Hello");
    }

    #[test]
    fn test_inflate_empty_fixed_block() {
        assert!(inflate(&[0x03, 0x00]).unwrap().is_empty());
    }

    #[test]
    fn test_inflate_fixed_literals() {
        // Fixed block with 'a', 'b', 'c' then end-of-block
        let data = [0x4B, 0x4C, 0x4A, 0x06, 0x00];
        assert_eq!(inflate(&data).unwrap(), b"abc");
    }

    #[test]
    fn test_byte_at_a_time() {
        let mut decoder = Decoder::new(&STORED_HELLO[..]);
        let mut out = Vec::new();
        while let Some(b) = decoder.read_byte().unwrap() {
            out.push(b);
        }
        assert_eq!(out, b"Hello");
        assert!(decoder.is_finished());
        assert_eq!(decoder.read_byte().unwrap(), None);
    }

    #[test]
    fn test_skip() {
        let mut decoder = Decoder::new(&STORED_HELLO[..]);
        assert_eq!(decoder.skip(3).unwrap(), 3);
        assert_eq!(decoder.read_byte().unwrap(), Some(b'l'));
        assert_eq!(decoder.skip(10).unwrap(), 1);
        assert!(decoder.is_finished());
    }

    #[test]
    fn test_block_summaries() {
        let mut data = vec![0x00, 0x02, 0x00, 0xFD, 0xFF, b'h', b'i'];
        data.extend_from_slice(&[0x03, 0x00]);

        let mut decoder = Decoder::new(&data[..]);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"hi");

        let summaries = decoder.block_summaries();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].kind, BlockKind::Stored);
        assert!(!summaries[0].is_final);
        assert_eq!(summaries[0].output_len, 2);
        assert_eq!(summaries[0].bit_len, 56);
        assert_eq!(summaries[1].kind, BlockKind::Fixed);
        assert!(summaries[1].is_final);
        assert_eq!(summaries[1].bit_len, 10);
    }

    #[test]
    fn test_distance_beyond_history() {
        // Fixed block: length 3 (symbol 257), distance 1 with no history
        // 257 -> 0000001 (7 bits), distance code 0 -> 00000 (5 bits)
        let data = [0x03, 0x02, 0x00, 0x00];
        let err = inflate(&data).unwrap_err();
        assert!(matches!(err, SufflateError::InvalidDistance { .. }));
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_truncated_stream() {
        assert_eq!(
            inflate(&STORED_HELLO[..7]).unwrap_err().kind(),
            ErrorKind::UnexpectedEof
        );
        assert_eq!(inflate(&[]).unwrap_err().kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_io_read() {
        let mut decoder = Decoder::new(&STORED_HELLO[..]);
        let mut out = String::new();
        io::Read::read_to_string(&mut decoder, &mut out).unwrap();
        assert_eq!(out, "Hello");
    }
}
