//! Block headers.
//!
//! Every block starts with a final-block bit and a 2-bit type:
//!
//! | BTYPE | Block                                      |
//! |-------|--------------------------------------------|
//! | 00    | Stored: byte-aligned LEN, NLEN, raw bytes  |
//! | 01    | Fixed Huffman codes                        |
//! | 10    | Dynamic Huffman codes, tables in header    |
//! | 11    | Reserved (error)                           |

use crate::codelen::{DynamicHeader, read_dynamic_tables};
use crate::huffman::CodeLengths;
use std::fmt;
use std::io::{Read, Write};
use sufflate_core::error::{Result, SufflateError};
use sufflate_core::{BitReader, BitWriter};

/// Largest payload of a single stored block.
pub const MAX_STORED_LEN: usize = 65535;

/// Block type without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Uncompressed block.
    Stored,
    /// Block using the fixed Huffman codes.
    Fixed,
    /// Block carrying its own Huffman codes.
    Dynamic,
}

impl BlockKind {
    /// The 2-bit BTYPE value.
    pub fn btype(self) -> u32 {
        match self {
            BlockKind::Stored => 0b00,
            BlockKind::Fixed => 0b01,
            BlockKind::Dynamic => 0b10,
        }
    }

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Stored => "stored",
            BlockKind::Fixed => "fixed",
            BlockKind::Dynamic => "dynamic",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Block type with the data its header carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Stored block of `len` bytes.
    Stored {
        /// Payload length.
        len: u16,
    },
    /// Fixed Huffman block.
    Fixed,
    /// Dynamic Huffman block.
    Dynamic {
        /// Literal/length code lengths.
        litlen: CodeLengths,
        /// Distance code lengths.
        distance: CodeLengths,
    },
}

/// A parsed block header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    /// Whether this is the last block of the stream.
    pub is_final: bool,
    /// Type and payload description.
    pub block: Block,
}

impl BlockHeader {
    /// The block type.
    pub fn kind(&self) -> BlockKind {
        match self.block {
            Block::Stored { .. } => BlockKind::Stored,
            Block::Fixed => BlockKind::Fixed,
            Block::Dynamic { .. } => BlockKind::Dynamic,
        }
    }

    /// Read a block header.
    ///
    /// For stored blocks the reader is left byte-aligned at the first
    /// payload byte; for Huffman blocks at the first symbol.
    pub fn read<R: Read>(reader: &mut BitReader<R>) -> Result<Self> {
        let is_final = reader.read_bit()?;
        let btype = reader.read_bits(2)?;

        let block = match btype {
            0b00 => {
                reader.align_to_byte();
                let len = reader.read_bits(16)? as u16;
                let nlen = reader.read_bits(16)? as u16;
                if len != !nlen {
                    return Err(SufflateError::corrupted(
                        reader.byte_position(),
                        format!("LEN/NLEN mismatch: {len:#06x} vs {nlen:#06x}"),
                    ));
                }
                Block::Stored { len }
            }
            0b01 => Block::Fixed,
            0b10 => {
                let (litlen, distance) = read_dynamic_tables(reader)?;
                Block::Dynamic { litlen, distance }
            }
            _ => return Err(SufflateError::invalid_header("Reserved block type 3")),
        };

        Ok(Self { is_final, block })
    }

    /// Write the block header.
    ///
    /// Stored headers leave the writer byte-aligned, ready for the payload.
    pub fn write<W: Write>(&self, writer: &mut BitWriter<W>) -> Result<()> {
        writer.write_bit(self.is_final)?;
        writer.write_bits(self.kind().btype(), 2)?;

        match &self.block {
            Block::Stored { len } => {
                writer.align_to_byte()?;
                writer.write_bits(u32::from(*len), 16)?;
                writer.write_bits(u32::from(!*len), 16)?;
            }
            Block::Fixed => {}
            Block::Dynamic { litlen, distance } => {
                DynamicHeader::new(litlen, distance)?.write(writer)?;
            }
        }

        Ok(())
    }
}
