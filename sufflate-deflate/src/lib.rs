//! # sufflate deflate
//!
//! A DEFLATE (RFC 1951) codec built from first principles.
//!
//! Compression finds back-references with a suffix array instead of hash
//! chains and chooses them by estimated bit savings. Every block gets its
//! own length-limited Huffman codes and is written as dynamic, fixed or
//! stored, whichever is smallest. Decompression is streaming over any
//! [`std::io::Read`] with a two-level table lookup per symbol.
//!
//! ## Modules
//!
//! - [`huffman`]: code lengths, canonical codes, decode tables
//! - [`codelen`]: run-length coded code-length tables of dynamic blocks
//! - [`header`]: block headers
//! - [`tables`]: fixed codes and length/distance tables
//! - [`suffix`]: suffix array, rank and LCP arrays
//! - [`lz77`]: match finder
//! - [`encoder`]: block encoder
//! - [`decoder`]: streaming decoder
//! - [`deflater`]: chunking compression driver
//! - [`config`]: compression settings
//!
//! ## Example
//!
//! ```rust
//! use sufflate_deflate::{deflate, inflate};
//!
//! let original = b"Hello, World! Hello, World!";
//! let compressed = deflate(original, 6).unwrap();
//!
//! let decompressed = inflate(&compressed).unwrap();
//! assert_eq!(&decompressed, original);
//! ```
//!
//! ## Compression Levels
//!
//! - Level 0: No compression (stored blocks)
//! - Level 1-3: Few suffix-array candidates per position
//! - Level 4-6: Balanced (default is 6)
//! - Level 7-9: Wide candidate scans

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod codelen;
pub mod config;
pub mod decoder;
pub mod deflater;
pub mod encoder;
pub mod header;
pub mod huffman;
pub mod lz77;
pub mod suffix;
pub mod tables;

// Re-exports
pub use config::DeflateConfig;
pub use decoder::{BlockSummary, Decoder, inflate, inflate_reader};
pub use deflater::{Deflater, deflate, deflate_with_config};
pub use encoder::BlockEncoder;
pub use header::BlockKind;
pub use huffman::{CanonicalCodes, CodeLengths, DecodeTable, HuffmanBuilder};
pub use lz77::{Matcher, Token};
pub use sufflate_core::error::{ErrorKind, Result, SufflateError};
