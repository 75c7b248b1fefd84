//! LZ77 match finding for DEFLATE compression.
//!
//! The matcher works on a byte window made of up to 32 KiB of history
//! followed by the pending chunk. It indexes the whole window with a
//! suffix array; for each pending position the candidates are the
//! neighbouring suffixes in suffix order, scanned outwards while their
//! common prefix stays at least [`MIN_MATCH`] bytes long.
//!
//! # Cost model
//!
//! Matches are chosen by estimated bit savings rather than length. A
//! literal costs the length of its code in a Huffman code built from the
//! chunk's byte histogram. A match costs its length and distance codes
//! under the fixed tables, their extra bits and a configurable bias for
//! table overhead. The candidate with the largest positive gain wins; ties
//! prefer the longer match, then the closer one.

use crate::huffman::HuffmanBuilder;
use crate::suffix::SuffixIndex;
use crate::tables::{distance_to_code, length_to_code};
use sufflate_core::WINDOW_SIZE;

/// Minimum match length.
pub const MIN_MATCH: usize = 3;

/// Maximum match length.
pub const MAX_MATCH: usize = 258;

/// Maximum back-reference distance.
pub const MAX_DISTANCE: usize = WINDOW_SIZE;

/// A token produced by the match finder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// A literal byte.
    Literal(u8),
    /// A back-reference to previously seen data.
    Match {
        /// Number of bytes to copy (3-258).
        length: u16,
        /// Distance back into the window (1-32768).
        distance: u16,
    },
}

impl Token {
    /// Number of uncompressed bytes this token stands for.
    pub fn byte_len(&self) -> usize {
        match *self {
            Token::Literal(_) => 1,
            Token::Match { length, .. } => length as usize,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    length: usize,
    distance: usize,
    gain: i64,
}

impl Candidate {
    fn beats(&self, other: &Candidate) -> bool {
        (self.gain, self.length, std::cmp::Reverse(self.distance))
            > (other.gain, other.length, std::cmp::Reverse(other.distance))
    }
}

/// Estimated bits for a match under the fixed code tables.
pub fn match_cost_bits(length: usize, distance: usize) -> u32 {
    let len = length_to_code(length as u16);
    let dist = distance_to_code(distance as u16);
    let len_code_bits = if len.symbol < 280 { 7 } else { 8 };
    len_code_bits + u32::from(len.extra_bits) + 5 + u32::from(dist.extra_bits)
}

/// Suffix-array driven match finder.
#[derive(Debug, Clone)]
pub struct Matcher {
    /// Suffix-array neighbours examined per direction.
    max_candidates: usize,
    /// Extra bits charged to every match.
    bias_bits: u32,
}

/// Per-chunk state shared by every position lookup.
struct Scan<'a> {
    index: &'a SuffixIndex,
    /// Running literal cost, `prefix[i]` covers window bytes `start..start + i`.
    prefix: Vec<u64>,
    start: usize,
    end: usize,
}

impl Scan<'_> {
    fn literal_cost(&self, pos: usize, length: usize) -> u64 {
        self.prefix[pos - self.start + length] - self.prefix[pos - self.start]
    }
}

impl Matcher {
    /// Create a matcher.
    pub fn new(max_candidates: usize, bias_bits: u32) -> Self {
        Self {
            max_candidates,
            bias_bits,
        }
    }

    /// Neighbours examined per direction.
    pub fn max_candidates(&self) -> usize {
        self.max_candidates
    }

    /// Tokenize `window[start..]`, using `window[..start]` as history.
    ///
    /// At most the last [`MAX_DISTANCE`] bytes of history are reachable.
    pub fn find_tokens(&self, window: &[u8], start: usize) -> Vec<Token> {
        let pending = &window[start..];
        if pending.len() < MIN_MATCH || self.max_candidates == 0 {
            return pending.iter().map(|&b| Token::Literal(b)).collect();
        }

        let costs = literal_costs(pending);
        let mut prefix = Vec::with_capacity(pending.len() + 1);
        prefix.push(0u64);
        let mut total = 0u64;
        for &b in pending {
            total += u64::from(costs[b as usize]);
            prefix.push(total);
        }

        let index = SuffixIndex::new(window);
        let scan = Scan {
            index: &index,
            prefix,
            start,
            end: window.len(),
        };

        let mut tokens = Vec::with_capacity(pending.len() / 2);
        let mut pos = start;
        while pos < scan.end {
            match self.best_match(&scan, pos) {
                Some(best) => {
                    tokens.push(Token::Match {
                        length: best.length as u16,
                        distance: best.distance as u16,
                    });
                    pos += best.length;
                }
                None => {
                    tokens.push(Token::Literal(window[pos]));
                    pos += 1;
                }
            }
        }

        tokens
    }

    fn best_match(&self, scan: &Scan<'_>, pos: usize) -> Option<Candidate> {
        let remaining = scan.end - pos;
        if remaining < MIN_MATCH {
            return None;
        }

        let index = scan.index;
        let rank = index.rank(pos);
        let mut best: Option<Candidate> = None;

        // Towards smaller suffixes
        let mut run = usize::MAX;
        let mut r = rank;
        for _ in 0..self.max_candidates {
            if r == 0 {
                break;
            }
            run = run.min(index.lcp(r));
            if run < MIN_MATCH {
                break;
            }
            r -= 1;
            self.consider(scan, pos, index.suffix_at(r), run, &mut best);
        }

        // Towards larger suffixes
        let mut run = usize::MAX;
        let mut r = rank;
        for _ in 0..self.max_candidates {
            r += 1;
            if r >= index.len() {
                break;
            }
            run = run.min(index.lcp(r));
            if run < MIN_MATCH {
                break;
            }
            self.consider(scan, pos, index.suffix_at(r), run, &mut best);
        }

        best
    }

    fn consider(
        &self,
        scan: &Scan<'_>,
        pos: usize,
        candidate: usize,
        common: usize,
        best: &mut Option<Candidate>,
    ) {
        // Only earlier positions within reach can be referenced
        if candidate >= pos || pos - candidate > MAX_DISTANCE {
            return;
        }
        let distance = pos - candidate;
        let length = common.min(MAX_MATCH).min(scan.end - pos);

        let saved = scan.literal_cost(pos, length) as i64;
        let spent = i64::from(match_cost_bits(length, distance) + self.bias_bits);
        let found = Candidate {
            length,
            distance,
            gain: saved - spent,
        };

        if found.gain > 0 && best.is_none_or(|current| found.beats(&current)) {
            *best = Some(found);
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(32, 1)
    }
}

/// Provisional literal cost in bits for every byte value of `chunk`.
fn literal_costs(chunk: &[u8]) -> [u32; 256] {
    let mut builder = HuffmanBuilder::new(256, 15);
    for &b in chunk {
        builder.add(u16::from(b));
    }
    let lengths = builder.build();

    let mut costs = [0u32; 256];
    for (symbol, cost) in costs.iter_mut().enumerate() {
        *cost = u32::from(lengths.get(symbol));
    }
    costs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(history: &[u8], tokens: &[Token]) -> Vec<u8> {
        let mut output = history.to_vec();
        for token in tokens {
            match *token {
                Token::Literal(b) => output.push(b),
                Token::Match { length, distance } => {
                    for _ in 0..length {
                        let pos = output.len() - distance as usize;
                        output.push(output[pos]);
                    }
                }
            }
        }
        output.split_off(history.len())
    }

    #[test]
    fn test_literals_only() {
        let tokens = Matcher::default().find_tokens(b"abcdefgh", 0);
        assert!(tokens.iter().all(|t| matches!(t, Token::Literal(_))));
        assert_eq!(tokens.len(), 8);
    }

    #[test]
    fn test_decode_matches() {
        let input = b"Hello, Hello, Hello, Hello! Hello, Hello, Hello, Hello!";
        let tokens = Matcher::default().find_tokens(input, 0);

        assert!(tokens.iter().any(|t| matches!(t, Token::Match { .. })));
        assert_eq!(expand(&[], &tokens), input);
    }

    #[test]
    fn test_long_run() {
        let input = vec![b'a'; 1000];
        let tokens = Matcher::default().find_tokens(&input, 0);

        assert_eq!(tokens.iter().map(Token::byte_len).sum::<usize>(), 1000);
        assert!(tokens.len() < 20, "{} tokens", tokens.len());
        assert_eq!(expand(&[], &tokens), input);
    }

    #[test]
    fn test_short_matches_not_worth_it() {
        // With a 1-bit literal code a 9-byte run is cheaper as literals
        let tokens = Matcher::default().find_tokens(b"aaaaaaaaaa", 0);
        assert_eq!(tokens.len(), 10);
    }

    #[test]
    fn test_match_into_history() {
        let text = b"The quick brown fox jumps over the lazy dog";
        let mut window = text.to_vec();
        window.extend_from_slice(text);

        let tokens = Matcher::default().find_tokens(&window, text.len());
        assert_eq!(
            tokens,
            vec![Token::Match {
                length: text.len() as u16,
                distance: text.len() as u16,
            }]
        );
    }

    #[test]
    fn test_limits_respected() {
        let mut window: Vec<u8> = (0..40000u32).map(|i| (i % 7) as u8 * 31).collect();
        window.extend(std::iter::repeat_n(9u8, 600));
        let start = 20000;

        let tokens = Matcher::new(16, 1).find_tokens(&window, start);
        for token in &tokens {
            if let Token::Match { length, distance } = *token {
                assert!((MIN_MATCH..=MAX_MATCH).contains(&(length as usize)));
                assert!((1..=MAX_DISTANCE).contains(&(distance as usize)));
            }
        }
        assert_eq!(expand(&window[..start], &tokens), &window[start..]);
    }

    #[test]
    fn test_zero_candidates_is_literal_only() {
        let input = vec![b'z'; 300];
        let tokens = Matcher::new(0, 0).find_tokens(&input, 0);
        assert_eq!(tokens.len(), 300);
    }

    #[test]
    fn test_match_cost_bits() {
        // 257 (7 bits) + distance code 0 (5 bits)
        assert_eq!(match_cost_bits(3, 1), 12);
        // 285 (8 bits) + distance code 29 (5 + 13 bits)
        assert_eq!(match_cost_bits(258, 32768), 26);
    }
}
