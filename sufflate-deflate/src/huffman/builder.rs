//! Minimum-redundancy code lengths from symbol frequencies.

use super::{CodeLengths, MAX_CODE_LENGTH};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Builder for creating Huffman code lengths from frequencies.
#[derive(Debug, Clone)]
pub struct HuffmanBuilder {
    frequencies: Vec<u32>,
    max_length: u8,
}

impl HuffmanBuilder {
    /// Create a new Huffman builder.
    pub fn new(alphabet_size: usize, max_length: u8) -> Self {
        debug_assert!((1..=MAX_CODE_LENGTH).contains(&max_length));
        Self {
            frequencies: vec![0; alphabet_size],
            max_length,
        }
    }

    /// Start from an existing frequency table, limited to 15-bit codes.
    pub fn from_frequencies(frequencies: &[u32]) -> Self {
        Self {
            frequencies: frequencies.to_vec(),
            max_length: MAX_CODE_LENGTH,
        }
    }

    /// Add a symbol occurrence.
    pub fn add(&mut self, symbol: u16) {
        self.add_count(symbol, 1);
    }

    /// Add multiple occurrences of a symbol.
    pub fn add_count(&mut self, symbol: u16, count: u32) {
        if let Some(freq) = self.frequencies.get_mut(symbol as usize) {
            *freq = freq.saturating_add(count);
        }
    }

    /// The accumulated frequencies.
    pub fn frequencies(&self) -> &[u32] {
        &self.frequencies
    }

    /// Number of symbols seen at least once.
    pub fn used_symbols(&self) -> usize {
        self.frequencies.iter().filter(|&&f| f > 0).count()
    }

    /// Give the lowest-index unused symbols a count of one until at least
    /// `count` symbols are in use.
    ///
    /// A code with a single symbol is incomplete, which strict decoders
    /// reject; padding to two symbols keeps every emitted code complete.
    pub fn pad_to(&mut self, count: usize) {
        let mut used = self.used_symbols();
        for freq in self.frequencies.iter_mut() {
            if used >= count {
                break;
            }
            if *freq == 0 {
                *freq = 1;
                used += 1;
            }
        }
    }

    /// Build code lengths limited to the builder's maximum length.
    pub fn build(&self) -> CodeLengths {
        self.build_unrestricted()
            .restrict(&self.frequencies, self.max_length)
    }

    /// Build optimal code lengths without a length limit.
    ///
    /// The two lightest groups are merged until one remains; every symbol
    /// ends up one bit deeper for each merge above it. Equal weights are
    /// broken by the lowest symbol index in each group.
    pub fn build_unrestricted(&self) -> CodeLengths {
        let n = self.frequencies.len();
        let mut lengths = vec![0u8; n];

        let symbols: Vec<usize> = (0..n).filter(|&s| self.frequencies[s] > 0).collect();
        match symbols.len() {
            0 => return CodeLengths::from_raw(lengths),
            1 => {
                lengths[symbols[0]] = 1;
                return CodeLengths::from_raw(lengths);
            }
            _ => {}
        }

        // Nodes 0..leaves are the symbols, later nodes are merged groups
        let leaves = symbols.len();
        let mut parent = vec![usize::MAX; 2 * leaves - 1];
        let mut heap: BinaryHeap<Reverse<(u64, usize, usize)>> = symbols
            .iter()
            .enumerate()
            .map(|(node, &s)| Reverse((u64::from(self.frequencies[s]), s, node)))
            .collect();

        let mut next = leaves;
        while let (Some(Reverse(a)), Some(Reverse(b))) = (heap.pop(), heap.pop()) {
            parent[a.2] = next;
            parent[b.2] = next;
            heap.push(Reverse((a.0 + b.0, a.1.min(b.1), next)));
            next += 1;
        }

        // Parents are always created after their children, so walking
        // backwards from the root sees each parent's depth first.
        let mut depth = vec![0u32; next];
        for node in (0..next - 1).rev() {
            depth[node] = depth[parent[node]] + 1;
        }

        for (node, &symbol) in symbols.iter().enumerate() {
            lengths[symbol] = u8::try_from(depth[node]).unwrap_or(u8::MAX);
        }

        CodeLengths::from_raw(lengths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_huffman_builder() {
        let mut builder = HuffmanBuilder::new(4, 15);
        builder.add_count(0, 100);
        builder.add_count(1, 50);
        builder.add_count(2, 25);
        builder.add_count(3, 25);

        let lengths = builder.build();
        assert_eq!(lengths.as_slice(), &[1, 2, 3, 3]);
        assert!(lengths.is_complete());
    }

    #[test]
    fn test_empty_and_single() {
        let builder = HuffmanBuilder::new(5, 15);
        assert_eq!(builder.build().as_slice(), &[0; 5]);

        let mut builder = HuffmanBuilder::new(5, 15);
        builder.add(3);
        builder.add(3);
        assert_eq!(builder.build().as_slice(), &[0, 0, 0, 1, 0]);
    }

    #[test]
    fn test_equal_weights_balanced() {
        let builder = HuffmanBuilder::from_frequencies(&[7; 8]);
        assert_eq!(builder.build().as_slice(), &[3; 8]);
    }

    #[test]
    fn test_zero_frequency_gets_no_code() {
        let builder = HuffmanBuilder::from_frequencies(&[3, 0, 9, 0, 1]);
        let lengths = builder.build();
        assert_eq!(lengths.get(1), 0);
        assert_eq!(lengths.get(3), 0);
        assert!(lengths.get(0) > 0 && lengths.get(2) > 0 && lengths.get(4) > 0);
        assert!(lengths.is_complete());
    }

    #[test]
    fn test_pad_to_two_symbols() {
        let mut builder = HuffmanBuilder::new(30, 15);
        builder.pad_to(2);
        assert_eq!(builder.used_symbols(), 2);
        assert_eq!(&builder.frequencies()[..2], &[1, 1]);

        let mut builder = HuffmanBuilder::new(30, 15);
        builder.add(0);
        builder.pad_to(2);
        assert_eq!(&builder.frequencies()[..3], &[1, 1, 0]);
        assert!(builder.build().is_complete());
    }

    #[test]
    fn test_out_of_range_symbol_ignored() {
        let mut builder = HuffmanBuilder::new(3, 7);
        builder.add(10);
        assert_eq!(builder.used_symbols(), 0);
    }
}
