//! Error types for sufflate operations.
//!
//! Every failure the codec can report is a variant of [`SufflateError`].
//! Malformed input is never recovered from inside the codec; callers use
//! [`SufflateError::kind`] to decide whether to abort or resynchronise at a
//! container boundary.

use std::io;
use thiserror::Error;

/// The main error type for sufflate operations.
#[derive(Debug, Error)]
pub enum SufflateError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid Huffman code encountered during decompression.
    #[error("Invalid Huffman code at bit position {bit_position}")]
    InvalidHuffmanCode {
        /// Bit position where the invalid code was found.
        bit_position: u64,
    },

    /// Corrupted data in the compressed stream.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Byte offset where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// Invalid block or table header.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of input: expected {expected} more bytes")]
    UnexpectedEof {
        /// Number of bytes that were expected but not available.
        expected: usize,
    },

    /// Back-reference pointing before the start of the history.
    #[error("Invalid back-reference distance: {distance} exceeds history size {history_size}")]
    InvalidDistance {
        /// The invalid distance value.
        distance: usize,
        /// History available when the reference was resolved.
        history_size: usize,
    },

    /// A match handed to the encoder is outside the DEFLATE limits.
    #[error("Invalid match: length {length}, distance {distance}")]
    InvalidMatch {
        /// Requested match length.
        length: usize,
        /// Requested match distance.
        distance: usize,
    },
}

/// Coarse classification of a [`SufflateError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The compressed stream violates RFC 1951.
    Format,
    /// The stream ended before the final block completed.
    UnexpectedEof,
    /// The underlying reader or writer failed.
    Io,
    /// The encoder API was called with arguments it cannot represent.
    Usage,
}

/// Result type alias for sufflate operations.
pub type Result<T> = std::result::Result<T, SufflateError>;

impl SufflateError {
    /// Create an invalid Huffman code error.
    pub fn invalid_huffman(bit_position: u64) -> Self {
        Self::InvalidHuffmanCode { bit_position }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(expected: usize) -> Self {
        Self::UnexpectedEof { expected }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: usize, history_size: usize) -> Self {
        Self::InvalidDistance {
            distance,
            history_size,
        }
    }

    /// Create an invalid match error.
    pub fn invalid_match(length: usize, distance: usize) -> Self {
        Self::InvalidMatch { length, distance }
    }

    /// Classify this error.
    ///
    /// A back-reference beyond the history is an internal-state violation in
    /// the decoder, but it can only be reached through malformed input, so it
    /// is reported as a format error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => ErrorKind::UnexpectedEof,
            Self::Io(_) => ErrorKind::Io,
            Self::UnexpectedEof { .. } => ErrorKind::UnexpectedEof,
            Self::InvalidMatch { .. } => ErrorKind::Usage,
            Self::InvalidHuffmanCode { .. }
            | Self::CorruptedData { .. }
            | Self::InvalidHeader { .. }
            | Self::InvalidDistance { .. } => ErrorKind::Format,
        }
    }

    /// Whether this error means the stream itself is malformed.
    pub fn is_format_error(&self) -> bool {
        self.kind() == ErrorKind::Format
    }
}

impl From<SufflateError> for io::Error {
    fn from(err: SufflateError) -> Self {
        match err {
            SufflateError::Io(e) => e,
            other => {
                let kind = match other.kind() {
                    ErrorKind::UnexpectedEof => io::ErrorKind::UnexpectedEof,
                    ErrorKind::Usage => io::ErrorKind::InvalidInput,
                    _ => io::ErrorKind::InvalidData,
                };
                io::Error::new(kind, other)
            }
        }
    }
}
