//! Sliding window for DEFLATE back-references.
//!
//! [`SlidingWindow`] is a 32 KiB circular buffer shared by the decoder and
//! by the encoder's replay of its own output. Bytes enter at `end` (literal
//! pushes and back-reference copies) and leave at `start` when the consumer
//! reads them. Every byte still in the buffer, read or not, is history that
//! later back-references may point at.
//!
//! The writer side never blocks: if more than [`WINDOW_SIZE`] bytes are
//! pushed without being read, the oldest unread bytes are dropped. The
//! decoder avoids this by only producing output while [`free_space`] covers
//! the longest possible match.
//!
//! [`free_space`]: SlidingWindow::free_space

use crate::error::{Result, SufflateError};

/// Window size for DEFLATE (32 KiB).
pub const WINDOW_SIZE: usize = 32768;

const MASK: usize = WINDOW_SIZE - 1;

/// Circular history buffer with read (`start`) and write (`end`) cursors.
#[derive(Clone)]
pub struct SlidingWindow {
    buffer: Box<[u8]>,
    /// Next unread byte.
    start: usize,
    /// Next byte to be written.
    end: usize,
    /// Bytes between `start` and `end` not yet handed to the reader.
    unread: usize,
    /// Total bytes ever written.
    total_written: u64,
}

impl std::fmt::Debug for SlidingWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlidingWindow")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("unread", &self.unread)
            .field("total_written", &self.total_written)
            .finish()
    }
}

impl Default for SlidingWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl SlidingWindow {
    /// Create an empty window.
    pub fn new() -> Self {
        Self {
            buffer: vec![0u8; WINDOW_SIZE].into_boxed_slice(),
            start: 0,
            end: 0,
            unread: 0,
            total_written: 0,
        }
    }

    /// Position the next written byte will occupy.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of bytes written but not yet read.
    pub fn available(&self) -> usize {
        self.unread
    }

    /// Room left before unread bytes would be overwritten.
    pub fn free_space(&self) -> usize {
        WINDOW_SIZE - self.unread
    }

    /// Number of bytes a back-reference may currently reach.
    pub fn history_len(&self) -> usize {
        self.total_written.min(WINDOW_SIZE as u64) as usize
    }

    /// Total bytes ever written into the window.
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    fn advance_end(&mut self, count: usize) {
        self.end = (self.end + count) & MASK;
        self.total_written += count as u64;
        self.unread += count;
        if self.unread > WINDOW_SIZE {
            let dropped = self.unread - WINDOW_SIZE;
            self.start = (self.start + dropped) & MASK;
            self.unread = WINDOW_SIZE;
        }
    }

    /// Append a literal byte.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.buffer[self.end] = byte;
        self.advance_end(1);
    }

    /// Append a run of literal bytes.
    pub fn push_slice(&mut self, bytes: &[u8]) {
        // Only the last WINDOW_SIZE bytes can survive
        let skip = bytes.len().saturating_sub(WINDOW_SIZE);
        if skip > 0 {
            self.advance_end(skip);
        }

        let mut rest = &bytes[skip..];
        while !rest.is_empty() {
            let run = rest.len().min(WINDOW_SIZE - self.end);
            self.buffer[self.end..self.end + run].copy_from_slice(&rest[..run]);
            self.advance_end(run);
            rest = &rest[run..];
        }
    }

    /// Byte at `distance` back from `end` (1 = most recent).
    pub fn byte_at_distance(&self, distance: usize) -> Result<u8> {
        let history = self.history_len();
        if distance == 0 || distance > history {
            return Err(SufflateError::invalid_distance(distance, history));
        }
        Ok(self.buffer[self.end.wrapping_sub(distance) & MASK])
    }

    /// Expand a back-reference: append `length` bytes starting `distance`
    /// bytes behind `end`.
    ///
    /// When `distance < length` the source overlaps the bytes being written
    /// and the copy repeats the last `distance` bytes.
    pub fn copy(&mut self, distance: usize, length: usize) -> Result<()> {
        let history = self.history_len();
        if distance == 0 || distance > history {
            return Err(SufflateError::invalid_distance(distance, history));
        }
        if length == 0 {
            return Ok(());
        }

        if distance == 1 {
            let byte = self.buffer[self.end.wrapping_sub(1) & MASK];
            self.fill(byte, length);
        } else if distance < length {
            self.copy_overlapping(distance, length);
        } else {
            self.copy_disjoint(distance, length);
        }

        Ok(())
    }

    fn fill(&mut self, byte: u8, length: usize) {
        let mut remaining = length;
        while remaining > 0 {
            let run = remaining.min(WINDOW_SIZE - self.end);
            self.buffer[self.end..self.end + run].fill(byte);
            self.advance_end(run);
            remaining -= run;
        }
    }

    fn copy_overlapping(&mut self, distance: usize, length: usize) {
        let mut src = self.end.wrapping_sub(distance) & MASK;
        let mut dst = self.end;
        for _ in 0..length {
            self.buffer[dst] = self.buffer[src];
            src = (src + 1) & MASK;
            dst = (dst + 1) & MASK;
        }
        self.advance_end(length);
    }

    fn copy_disjoint(&mut self, distance: usize, length: usize) {
        let mut src = self.end.wrapping_sub(distance) & MASK;
        let mut remaining = length;
        while remaining > 0 {
            // Split at whichever of source or destination wraps first
            let run = remaining
                .min(WINDOW_SIZE - src)
                .min(WINDOW_SIZE - self.end);
            self.buffer.copy_within(src..src + run, self.end);
            src = (src + run) & MASK;
            self.advance_end(run);
            remaining -= run;
        }
    }

    /// The most recent `count` bytes (oldest first), as at most two slices.
    pub fn recent(&self, count: usize) -> (&[u8], &[u8]) {
        let count = count.min(self.history_len());
        let begin = self.end.wrapping_sub(count) & MASK;
        if count == 0 {
            (&[], &[])
        } else if begin < self.end {
            (&self.buffer[begin..self.end], &[])
        } else {
            (&self.buffer[begin..], &self.buffer[..self.end])
        }
    }

    /// Read one unread byte.
    pub fn read_byte(&mut self) -> Option<u8> {
        if self.unread == 0 {
            return None;
        }
        let byte = self.buffer[self.start];
        self.start = (self.start + 1) & MASK;
        self.unread -= 1;
        Some(byte)
    }

    /// Copy unread bytes into `buf`, returning how many were copied.
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        let count = buf.len().min(self.unread);
        let first = count.min(WINDOW_SIZE - self.start);
        buf[..first].copy_from_slice(&self.buffer[self.start..self.start + first]);
        buf[first..count].copy_from_slice(&self.buffer[..count - first]);
        self.start = (self.start + count) & MASK;
        self.unread -= count;
        count
    }

    /// Discard up to `count` unread bytes, returning how many were skipped.
    pub fn skip(&mut self, count: usize) -> usize {
        let count = count.min(self.unread);
        self.start = (self.start + count) & MASK;
        self.unread -= count;
        count
    }

    /// Mark everything written so far as read.
    pub fn discard_unread(&mut self) {
        self.start = self.end;
        self.unread = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(window: &mut SlidingWindow) -> Vec<u8> {
        let mut out = vec![0u8; window.available()];
        let n = window.read(&mut out);
        out.truncate(n);
        out
    }

    #[test]
    fn test_push_and_read() {
        let mut window = SlidingWindow::new();
        window.push_slice(b"Hello");

        assert_eq!(window.available(), 5);
        assert_eq!(window.byte_at_distance(1).unwrap(), b'o');
        assert_eq!(window.byte_at_distance(5).unwrap(), b'H');
        assert_eq!(window.read_byte(), Some(b'H'));
        assert_eq!(drain(&mut window), b"ello");
        assert_eq!(window.read_byte(), None);
        // Read bytes stay available as history
        assert_eq!(window.history_len(), 5);
    }

    #[test]
    fn test_copy_distance_one_fills() {
        let mut window = SlidingWindow::new();
        window.push(b'X');
        window.copy(1, 50).unwrap();

        let out = drain(&mut window);
        assert_eq!(out.len(), 51);
        assert!(out.iter().all(|&b| b == b'X'));
    }

    #[test]
    fn test_copy_overlapping_pattern() {
        let mut window = SlidingWindow::new();
        window.push_slice(b"ABCDE");
        window.copy(5, 12).unwrap();

        assert_eq!(drain(&mut window), b"ABCDEABCDEABCDEAB");
    }

    #[test]
    fn test_copy_overlapping_across_boundary() {
        let mut window = SlidingWindow::new();
        window.push_slice(&vec![0u8; WINDOW_SIZE - 8]);
        window.discard_unread();
        window.push_slice(b"ABCDE");
        assert_eq!(window.end(), WINDOW_SIZE - 3);

        window.copy(5, 12).unwrap();
        assert_eq!(window.end(), 9);
        assert_eq!(drain(&mut window), b"ABCDEABCDEABCDEAB");
    }

    #[test]
    fn test_copy_distance_one_across_boundary() {
        let mut window = SlidingWindow::new();
        window.push_slice(&vec![7u8; WINDOW_SIZE - 2]);
        window.discard_unread();
        window.push(b'Z');
        window.copy(1, 50).unwrap();

        let out = drain(&mut window);
        assert_eq!(out.len(), 51);
        assert!(out.iter().all(|&b| b == b'Z'));
    }

    #[test]
    fn test_copy_disjoint_split() {
        let mut window = SlidingWindow::new();
        let mut data: Vec<u8> = (0..WINDOW_SIZE - 4).map(|i| (i % 251) as u8).collect();
        window.push_slice(&data);
        window.discard_unread();

        // Source straddles nothing, destination wraps
        window.copy(100, 20).unwrap();
        let start = data.len() - 100;
        let expected: Vec<u8> = data[start..start + 20].to_vec();
        assert_eq!(drain(&mut window), expected);

        data.extend_from_slice(&expected);
        // Source wraps now: the bytes 30 back begin before the boundary
        window.copy(30, 25).unwrap();
        let start = data.len() - 30;
        assert_eq!(drain(&mut window), data[start..start + 25].to_vec());
    }

    #[test]
    fn test_copy_max_distance() {
        let mut window = SlidingWindow::new();
        let data: Vec<u8> = (0..WINDOW_SIZE).map(|i| (i * 7 % 256) as u8).collect();
        window.push_slice(&data);
        window.discard_unread();

        window.copy(WINDOW_SIZE, 258).unwrap();
        assert_eq!(drain(&mut window), data[..258].to_vec());
    }

    #[test]
    fn test_invalid_distance() {
        let mut window = SlidingWindow::new();
        assert!(window.copy(1, 3).is_err());

        window.push_slice(b"abc");
        assert!(window.copy(0, 3).is_err());
        assert!(window.copy(4, 3).is_err());
        let err = window.byte_at_distance(4).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_recent_two_slices() {
        let mut window = SlidingWindow::new();
        window.push_slice(&vec![1u8; WINDOW_SIZE - 2]);
        window.push_slice(b"wxyz");

        let (a, b) = window.recent(4);
        assert_eq!(a, b"wx");
        assert_eq!(b, b"yz");
    }

    #[test]
    fn test_overrun_drops_oldest_unread() {
        let mut window = SlidingWindow::new();
        window.push_slice(&vec![1u8; WINDOW_SIZE]);
        window.push_slice(b"ab");

        assert_eq!(window.available(), WINDOW_SIZE);
        assert_eq!(window.free_space(), 0);
        assert_eq!(window.skip(WINDOW_SIZE - 2), WINDOW_SIZE - 2);
        assert_eq!(drain(&mut window), b"ab");
    }
}
