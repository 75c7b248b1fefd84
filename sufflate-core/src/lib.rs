//! # sufflate core
//!
//! Core components for the sufflate DEFLATE codec.
//!
//! This crate provides the pieces the codec treats as external collaborators:
//!
//! - [`bitstream`]: LSB-first bit channel (`BitReader` / `BitWriter`)
//! - [`window`]: 32 KiB circular history used to resolve back-references
//! - [`error`]: Error type shared by every sufflate crate
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ CLI                                                     │
//! │     compress / decompress / inspect raw DEFLATE files   │
//! ├─────────────────────────────────────────────────────────┤
//! │ Codec (sufflate-deflate)                                │
//! │     Huffman tables, block header, suffix-array LZ77     │
//! ├─────────────────────────────────────────────────────────┤
//! │ Channel (this crate)                                    │
//! │     BitReader/BitWriter, SlidingWindow, errors          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use sufflate_core::bitstream::BitReader;
//! use sufflate_core::window::SlidingWindow;
//! use std::io::Cursor;
//!
//! // Read bits from data
//! let data = vec![0xAB, 0xCD];
//! let mut reader = BitReader::new(Cursor::new(data));
//! let bits = reader.read_bits(12).unwrap();
//! assert_eq!(bits, 0xDAB);
//!
//! // Expand a run-length back-reference
//! let mut window = SlidingWindow::new();
//! window.push(b'a');
//! window.copy(1, 3).unwrap();
//! assert_eq!(window.available(), 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod error;
pub mod window;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use error::{ErrorKind, Result, SufflateError};
pub use window::{SlidingWindow, WINDOW_SIZE};
