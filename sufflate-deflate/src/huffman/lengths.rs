//! Code-length arrays and length restriction.

use super::MAX_CODE_LENGTH;
use sufflate_core::error::{Result, SufflateError};

/// Code length per symbol; 0 marks an unused symbol.
///
/// Values produced by [`HuffmanBuilder::build_unrestricted`] may exceed 15;
/// everything else in the crate only accepts arrays whose lengths fit
/// DEFLATE's 15-bit limit.
///
/// [`HuffmanBuilder::build_unrestricted`]: super::HuffmanBuilder::build_unrestricted
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeLengths {
    lengths: Vec<u8>,
}

impl CodeLengths {
    /// Wrap an explicit array of lengths, each at most 15.
    pub fn new(lengths: Vec<u8>) -> Result<Self> {
        if let Some((symbol, &len)) = lengths
            .iter()
            .enumerate()
            .find(|&(_, &len)| len > MAX_CODE_LENGTH)
        {
            return Err(SufflateError::invalid_header(format!(
                "Code length {len} for symbol {symbol} exceeds maximum {MAX_CODE_LENGTH}"
            )));
        }
        Ok(Self { lengths })
    }

    pub(crate) fn from_raw(lengths: Vec<u8>) -> Self {
        Self { lengths }
    }

    /// Length of `symbol`'s code, 0 when unused or out of range.
    #[inline]
    pub fn get(&self, symbol: usize) -> u8 {
        self.lengths.get(symbol).copied().unwrap_or(0)
    }

    /// The raw lengths.
    pub fn as_slice(&self) -> &[u8] {
        &self.lengths
    }

    /// Alphabet size.
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    /// Whether the alphabet is empty.
    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Longest code length.
    pub fn max_length(&self) -> u8 {
        self.lengths.iter().copied().max().unwrap_or(0)
    }

    /// Number of symbols with a code.
    pub fn used_symbols(&self) -> usize {
        self.lengths.iter().filter(|&&len| len > 0).count()
    }

    /// Kraft sum in units of 2^-15, or `None` if a length exceeds 15.
    pub fn kraft_units(&self) -> Option<u64> {
        self.lengths
            .iter()
            .filter(|&&len| len > 0)
            .try_fold(0u64, |sum, &len| {
                (len <= MAX_CODE_LENGTH).then(|| sum + (1u64 << (MAX_CODE_LENGTH - len)))
            })
    }

    /// Whether the lengths describe a complete prefix code.
    pub fn is_complete(&self) -> bool {
        self.kraft_units() == Some(1 << MAX_CODE_LENGTH)
    }

    /// Limit every code to `ceiling` bits while keeping Kraft equality.
    ///
    /// `frequencies` are the counts the lengths were built from; they decide
    /// which symbols absorb the extra depth. Arrays already within the
    /// ceiling and single-symbol arrays are returned unchanged.
    pub fn restrict(&self, frequencies: &[u32], ceiling: u8) -> CodeLengths {
        debug_assert!((1..=MAX_CODE_LENGTH).contains(&ceiling));

        if self.max_length() <= ceiling || self.used_symbols() <= 1 {
            return self.clone();
        }

        let freq = |symbol: usize| frequencies.get(symbol).copied().unwrap_or(0);
        let mut lengths: Vec<u8> = self.lengths.iter().map(|&len| len.min(ceiling)).collect();

        // Everything is measured in units of 2^-ceiling
        let unit = |len: u8| 1i64 << (ceiling - len);
        let mut excess: i64 = lengths
            .iter()
            .filter(|&&len| len > 0)
            .map(|&len| unit(len))
            .sum::<i64>()
            - (1i64 << ceiling);

        // Push the rarest shallow symbols one level deeper until the
        // clamped code fits.
        while excess > 0 {
            let Some(symbol) = (0..lengths.len())
                .filter(|&s| lengths[s] > 0 && lengths[s] < ceiling)
                .min_by_key(|&s| (freq(s), lengths[s], s))
            else {
                break;
            };
            lengths[symbol] += 1;
            excess -= unit(lengths[symbol]);
        }

        // Hand back any overshoot by lifting the most frequent of the
        // deepest symbols.
        while excess < 0 {
            let deepest = lengths.iter().copied().max().unwrap_or(0);
            let Some(symbol) = (0..lengths.len())
                .filter(|&s| lengths[s] == deepest && deepest > 1)
                .max_by_key(|&s| (freq(s), std::cmp::Reverse(s)))
            else {
                break;
            };
            excess += unit(lengths[symbol]);
            lengths[symbol] -= 1;
        }

        debug_assert_eq!(excess, 0, "length restriction left a Kraft imbalance");
        CodeLengths::from_raw(lengths)
    }
}
