//! Compression settings.

/// Default number of bytes handed to the matcher per block.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Default compression level.
pub const DEFAULT_LEVEL: u8 = 6;

/// Tunables for [`Deflater`](crate::deflater::Deflater) and
/// [`BlockEncoder`](crate::encoder::BlockEncoder).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeflateConfig {
    /// Bytes fed to the matcher and written as one block.
    pub chunk_size: usize,
    /// Suffix-array neighbours scanned per direction at each position.
    pub max_candidates: usize,
    /// Extra bits charged to every match for table overhead.
    pub match_bias_bits: u32,
    /// Whether fixed-code blocks may be chosen.
    pub allow_fixed: bool,
    /// Whether stored blocks may be chosen.
    pub allow_stored: bool,
    /// Write stored blocks only, skipping the matcher.
    pub store_only: bool,
}

impl DeflateConfig {
    /// Settings for a compression level from 0 (store) to 9 (best).
    ///
    /// Levels above 9 are treated as 9.
    pub fn with_level(level: u8) -> Self {
        let (max_candidates, match_bias_bits) = match level {
            0 => (0, 0),
            1 => (1, 4),
            2 => (2, 4),
            3 => (4, 3),
            4 => (8, 2),
            5 => (16, 2),
            6 => (32, 1),
            7 => (64, 1),
            8 => (128, 0),
            _ => (256, 0),
        };

        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_candidates,
            match_bias_bits,
            allow_fixed: true,
            allow_stored: true,
            store_only: level == 0,
        }
    }

    /// Replace the chunk size. Zero is raised to one byte.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

impl Default for DeflateConfig {
    fn default() -> Self {
        Self::with_level(DEFAULT_LEVEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_level_six() {
        assert_eq!(DeflateConfig::default(), DeflateConfig::with_level(6));
        assert_eq!(DeflateConfig::default().chunk_size, 64 * 1024);
    }

    #[test]
    fn test_level_zero_stores() {
        let config = DeflateConfig::with_level(0);
        assert!(config.store_only);
        assert_eq!(config.max_candidates, 0);
        assert!(!DeflateConfig::with_level(1).store_only);
    }

    #[test]
    fn test_levels_scan_more() {
        for level in 1..9 {
            assert!(
                DeflateConfig::with_level(level).max_candidates
                    < DeflateConfig::with_level(level + 1).max_candidates
            );
        }
        assert_eq!(DeflateConfig::with_level(42), DeflateConfig::with_level(9));
        assert_eq!(DeflateConfig::with_level(u8::MAX).max_candidates, 256);
    }

    #[test]
    fn test_chunk_size_floor() {
        assert_eq!(DeflateConfig::default().with_chunk_size(0).chunk_size, 1);
        assert_eq!(DeflateConfig::default().with_chunk_size(4096).chunk_size, 4096);
    }
}
