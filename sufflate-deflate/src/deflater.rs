//! DEFLATE compression driver.
//!
//! [`Deflater`] buffers input into chunks, runs the suffix-array matcher
//! over each chunk with up to 32 KiB of preceding data as history, and
//! hands the tokens to a [`BlockEncoder`]. Each chunk becomes one block
//! (or several stored blocks when it is large and incompressible).

use crate::config::DeflateConfig;
use crate::encoder::BlockEncoder;
use crate::lz77::{MAX_DISTANCE, Matcher};
use log::debug;
use std::io::{self, Write};
use sufflate_core::error::Result;

/// Streaming DEFLATE compressor.
#[derive(Debug)]
pub struct Deflater<W: Write> {
    encoder: BlockEncoder<W>,
    matcher: Matcher,
    config: DeflateConfig,
    /// Up to [`MAX_DISTANCE`] bytes preceding `pending`.
    history: Vec<u8>,
    pending: Vec<u8>,
}

impl<W: Write> Deflater<W> {
    /// Create a compressor for a level from 0 (store) to 9.
    pub fn new(writer: W, level: u8) -> Self {
        Self::with_config(writer, DeflateConfig::with_level(level))
    }

    /// Create a compressor with explicit settings.
    pub fn with_config(writer: W, config: DeflateConfig) -> Self {
        let config = config.with_chunk_size(config.chunk_size);
        Self {
            encoder: BlockEncoder::with_config(writer, &config),
            matcher: Matcher::new(config.max_candidates, config.match_bias_bits),
            config,
            history: Vec::with_capacity(MAX_DISTANCE),
            pending: Vec::new(),
        }
    }

    /// The settings in use.
    pub fn config(&self) -> &DeflateConfig {
        &self.config
    }

    /// Uncompressed bytes accepted so far.
    pub fn total_in(&self) -> u64 {
        self.encoder.total_in() + self.pending.len() as u64
    }

    /// Compressed bits written so far.
    pub fn bits_written(&self) -> u64 {
        self.encoder.bits_written()
    }

    /// Compress `data`, writing a block for every full chunk.
    ///
    /// At most one chunk is ever buffered. Full chunks are compressed
    /// straight from `data`.
    pub fn write(&mut self, mut data: &[u8]) -> Result<()> {
        let chunk_size = self.config.chunk_size;
        // The last chunk waits for finish() so it lands in the final block
        if !self.pending.is_empty() {
            let take = (chunk_size - self.pending.len()).min(data.len());
            self.pending.extend_from_slice(&data[..take]);
            data = &data[take..];
            if data.is_empty() {
                return Ok(());
            }
            let mut chunk = std::mem::take(&mut self.pending);
            self.compress_chunk(&chunk, false)?;
            chunk.clear();
            self.pending = chunk;
        }

        while data.len() > chunk_size {
            let (chunk, rest) = data.split_at(chunk_size);
            self.compress_chunk(chunk, false)?;
            data = rest;
        }
        self.pending.extend_from_slice(data);
        Ok(())
    }

    /// Write the final block and return the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        let chunk = std::mem::take(&mut self.pending);
        self.compress_chunk(&chunk, true)?;
        self.encoder.finish()
    }

    fn compress_chunk(&mut self, chunk: &[u8], is_final: bool) -> Result<()> {
        if self.config.store_only {
            for &byte in chunk {
                self.encoder.encode_literal(byte)?;
            }
        } else {
            let start = self.history.len();
            self.history.extend_from_slice(chunk);
            let tokens = self.matcher.find_tokens(&self.history, start);
            debug!(
                "chunk of {} bytes with {} bytes of history: {} tokens",
                chunk.len(),
                start,
                tokens.len()
            );
            for token in tokens {
                self.encoder.encode_token(token)?;
            }
            self.history.truncate(start);
        }

        self.encoder.flush_block(is_final)?;
        self.remember(chunk);
        Ok(())
    }

    /// Append `chunk` to the history, keeping only the reachable tail.
    fn remember(&mut self, chunk: &[u8]) {
        if self.config.store_only {
            return;
        }
        self.history.extend_from_slice(chunk);
        let excess = self.history.len().saturating_sub(MAX_DISTANCE);
        if excess > 0 {
            self.history.drain(..excess);
        }
    }
}

impl<W: Write> Write for Deflater<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Deflater::write(self, buf)?;
        Ok(buf.len())
    }

    /// Output only appears at block boundaries, so there is nothing to
    /// push through before [`Deflater::finish`].
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Compress `data` at `level` (0-9) into a raw DEFLATE stream.
pub fn deflate(data: &[u8], level: u8) -> Result<Vec<u8>> {
    deflate_with_config(data, DeflateConfig::with_level(level))
}

/// Compress `data` with explicit settings.
pub fn deflate_with_config(data: &[u8], config: DeflateConfig) -> Result<Vec<u8>> {
    let mut deflater = Deflater::with_config(Vec::new(), config);
    deflater.write(data)?;
    deflater.finish()
}
