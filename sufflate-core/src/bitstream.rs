//! Bit-level I/O channel for the DEFLATE codec.
//!
//! This module provides `BitReader` and `BitWriter` for reading and writing
//! data at the bit level, which the codec needs for Huffman codes and the
//! extra bits that follow length and distance symbols.
//!
//! # Bit Ordering
//!
//! DEFLATE packs bits LSB-first (least significant bit first) within bytes.
//! Multi-bit values are read and written with their first bit in the LSB
//! position. Huffman codes are therefore stored bit-reversed by the encoder.
//!
//! # Example
//!
//! ```
//! use sufflate_core::bitstream::{BitReader, BitWriter};
//! use std::io::Cursor;
//!
//! // Writing bits
//! let mut output = Vec::new();
//! {
//!     let mut writer = BitWriter::new(&mut output);
//!     writer.write_bits(0b101, 3).unwrap();  // Write 3 bits
//!     writer.write_bits(0b1100, 4).unwrap(); // Write 4 bits
//!     writer.flush().unwrap();
//! }
//!
//! // Reading bits
//! let mut reader = BitReader::new(Cursor::new(&output));
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(4).unwrap(), 0b1100);
//! ```

use crate::error::{Result, SufflateError};
use std::io::{ErrorKind, Read, Write};

/// A bit-level reader that wraps any `Read` implementation.
///
/// `BitReader` keeps up to 64 bits buffered so that peeks across byte
/// boundaries do not touch the underlying reader. Wrap unbuffered sources
/// (files, sockets) in a `BufReader` first.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    /// Underlying reader.
    reader: R,
    /// Bit buffer (LSB-first).
    buffer: u64,
    /// Number of valid bits in buffer.
    bits_in_buffer: u8,
    /// Total bits consumed (for error reporting).
    total_bits_read: u64,
    /// Set once the underlying reader returned 0 bytes.
    exhausted: bool,
}

impl<R: Read> BitReader<R> {
    /// Create a new `BitReader` wrapping the given reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: 0,
            bits_in_buffer: 0,
            total_bits_read: 0,
            exhausted: false,
        }
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Get a mutable reference to the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Consume this `BitReader` and return the underlying reader.
    ///
    /// Bits already pulled into the internal buffer are lost.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Get the total number of bits consumed so far.
    pub fn bits_read(&self) -> u64 {
        self.total_bits_read
    }

    /// Current position in whole bytes, rounded down.
    pub fn byte_position(&self) -> u64 {
        self.total_bits_read / 8
    }

    /// Pull bytes from the reader until `count` bits are buffered or the
    /// reader is exhausted. Never fails on end of input.
    fn refill(&mut self, count: u8) -> Result<()> {
        debug_assert!(count <= 56, "Cannot buffer more than 56 bits at once");

        let mut temp_buf = [0u8; 8];
        while self.bits_in_buffer < count && !self.exhausted {
            let room = ((64 - self.bits_in_buffer) / 8) as usize;
            match self.reader.read(&mut temp_buf[..room]) {
                Ok(0) => self.exhausted = true,
                Ok(n) => {
                    for &byte in &temp_buf[..n] {
                        self.buffer |= (byte as u64) << self.bits_in_buffer;
                        self.bits_in_buffer += 8;
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Ensure at least `count` bits are available in the buffer.
    #[inline]
    fn fill_buffer(&mut self, count: u8) -> Result<()> {
        if self.bits_in_buffer >= count {
            return Ok(());
        }

        self.refill(count)?;

        if self.bits_in_buffer < count {
            let missing = (count - self.bits_in_buffer).div_ceil(8);
            return Err(SufflateError::unexpected_eof(missing as usize));
        }

        Ok(())
    }

    #[inline]
    fn consume(&mut self, count: u8) {
        self.buffer = if count >= 64 { 0 } else { self.buffer >> count };
        self.bits_in_buffer -= count;
        self.total_bits_read += count as u64;
    }

    /// Read up to 32 bits from the stream.
    ///
    /// The first bit read lands in the LSB position of the result.
    #[inline]
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!(count <= 32, "Cannot read more than 32 bits at once");

        if count == 0 {
            return Ok(0);
        }

        self.fill_buffer(count)?;

        let mask = (1u64 << count).wrapping_sub(1);
        let result = (self.buffer & mask) as u32;
        self.consume(count);

        Ok(result)
    }

    /// Peek at up to 32 bits without consuming them.
    ///
    /// Fails with an EOF error if fewer than `count` bits remain.
    #[inline]
    pub fn peek_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!(count <= 32, "Cannot peek more than 32 bits at once");

        if count == 0 {
            return Ok(0);
        }

        self.fill_buffer(count)?;

        let mask = (1u64 << count) - 1;
        Ok((self.buffer & mask) as u32)
    }

    /// Peek at up to 32 bits, padding with zero bits past the end of input.
    ///
    /// Returns the bits together with how many of them are real. Huffman
    /// decoding uses this so a short final code can still be looked up in a
    /// table indexed by more bits than remain in the stream.
    #[inline]
    pub fn peek_bits_padded(&mut self, count: u8) -> Result<(u32, u8)> {
        debug_assert!(count <= 32, "Cannot peek more than 32 bits at once");

        if self.bits_in_buffer < count {
            self.refill(count)?;
        }

        let mask = (1u64 << count) - 1;
        Ok(((self.buffer & mask) as u32, self.bits_in_buffer.min(count)))
    }

    /// Skip a number of bits.
    pub fn skip_bits(&mut self, count: u8) -> Result<()> {
        if count == 0 {
            return Ok(());
        }

        self.fill_buffer(count)?;
        self.consume(count);

        Ok(())
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Align to the next byte boundary by discarding partial bits.
    pub fn align_to_byte(&mut self) {
        let remainder = (self.total_bits_read % 8) as u8;
        if remainder > 0 {
            let skip = (8 - remainder).min(self.bits_in_buffer);
            self.consume(skip);
        }
    }

    /// Check if the reader is at end of stream.
    pub fn is_eof(&mut self) -> bool {
        if self.bits_in_buffer > 0 {
            return false;
        }
        match self.refill(8) {
            Ok(()) => self.bits_in_buffer == 0,
            Err(_) => true,
        }
    }

    /// Read bytes directly, bypassing bit extraction where possible.
    ///
    /// The reader must be byte-aligned before calling this method.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        debug_assert!(
            self.total_bits_read % 8 == 0,
            "read_bytes requires byte alignment"
        );

        // Drain complete bytes from the bit buffer first
        let mut offset = 0;
        while self.bits_in_buffer >= 8 && offset < buf.len() {
            buf[offset] = (self.buffer & 0xFF) as u8;
            self.consume(8);
            offset += 1;
        }

        if offset < buf.len() {
            let remaining = buf.len() - offset;
            self.reader.read_exact(&mut buf[offset..]).map_err(|e| {
                if e.kind() == ErrorKind::UnexpectedEof {
                    SufflateError::unexpected_eof(remaining)
                } else {
                    e.into()
                }
            })?;
            self.total_bits_read += remaining as u64 * 8;
        }

        Ok(())
    }
}

/// A bit-level writer that wraps any `Write` implementation.
///
/// `BitWriter` accumulates bits in an internal buffer and forwards complete
/// bytes to the underlying writer. Call `flush()` when done to write any
/// remaining partial byte; nothing is flushed implicitly.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    /// Underlying writer.
    writer: W,
    /// Bit buffer (LSB-first).
    buffer: u64,
    /// Number of bits in buffer.
    bits_in_buffer: u8,
    /// Total bits written.
    total_bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a new `BitWriter` wrapping the given writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buffer: 0,
            bits_in_buffer: 0,
            total_bits_written: 0,
        }
    }

    /// Get a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Get a mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Flush pending bits (zero padded) and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.writer)
    }

    /// Get the total number of bits written so far.
    pub fn bits_written(&self) -> u64 {
        self.total_bits_written
    }

    /// Whether the next bit starts a fresh byte.
    pub fn is_aligned(&self) -> bool {
        self.total_bits_written % 8 == 0
    }

    /// Flush complete bytes from the buffer to the writer.
    #[inline]
    fn flush_bytes(&mut self) -> Result<()> {
        if self.bits_in_buffer >= 32 {
            let bytes = (self.buffer as u32).to_le_bytes();
            self.writer.write_all(&bytes)?;
            self.buffer >>= 32;
            self.bits_in_buffer -= 32;
        }

        while self.bits_in_buffer >= 8 {
            let byte = (self.buffer & 0xFF) as u8;
            self.writer.write_all(&[byte])?;
            self.buffer >>= 8;
            self.bits_in_buffer -= 8;
        }
        Ok(())
    }

    /// Write up to 32 bits to the stream, LSB-first.
    #[inline]
    pub fn write_bits(&mut self, value: u32, count: u8) -> Result<()> {
        debug_assert!(count <= 32, "Cannot write more than 32 bits at once");

        if count == 0 {
            return Ok(());
        }

        let mask = if count == 32 {
            u32::MAX
        } else {
            (1u32 << count).wrapping_sub(1)
        };
        let value = value & mask;

        self.buffer |= (value as u64) << self.bits_in_buffer;
        self.bits_in_buffer += count;
        self.total_bits_written += count as u64;

        self.flush_bytes()
    }

    /// Write a single bit.
    #[inline(always)]
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.buffer |= (bit as u64) << self.bits_in_buffer;
        self.bits_in_buffer += 1;
        self.total_bits_written += 1;

        if self.bits_in_buffer >= 8 {
            self.flush_bytes()?;
        }

        Ok(())
    }

    /// Pad to byte boundary with zeros.
    pub fn align_to_byte(&mut self) -> Result<()> {
        if self.bits_in_buffer % 8 != 0 {
            let padding = 8 - (self.bits_in_buffer % 8);
            self.write_bits(0, padding)?;
        }
        Ok(())
    }

    /// Pad the last partial byte with zeros and flush the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.align_to_byte()?;
        self.flush_bytes()?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write bytes directly to the stream.
    ///
    /// Falls back to bit packing when the writer is not byte-aligned.
    pub fn write_bytes(&mut self, buf: &[u8]) -> Result<()> {
        self.flush_bytes()?;

        if self.bits_in_buffer > 0 {
            for &byte in buf {
                self.write_bits(byte as u32, 8)?;
            }
        } else {
            self.writer.write_all(buf)?;
            self.total_bits_written += buf.len() as u64 * 8;
        }

        Ok(())
    }
}
