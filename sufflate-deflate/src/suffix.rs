//! Suffix array construction for the match finder.
//!
//! The suffix array is built with SA-IS (induced sorting, linear time) and
//! paired with its inverse (the rank of every position) and the LCP array
//! computed by Kasai's algorithm. Suffixes that are adjacent in suffix
//! order share the longest prefixes, so the best match candidates for a
//! position are its neighbours in the array.

use std::cmp::Ordering;

const EMPTY: usize = usize::MAX;

/// Inputs shorter than this are sorted by direct comparison.
const NAIVE_THRESHOLD: usize = 10;

/// Suffix array, rank array and LCP array over one text.
#[derive(Debug, Clone)]
pub struct SuffixIndex {
    sa: Vec<usize>,
    rank: Vec<usize>,
    lcp: Vec<usize>,
}

impl SuffixIndex {
    /// Index every suffix of `text`.
    pub fn new(text: &[u8]) -> Self {
        let sa = suffix_array(text);
        let mut rank = vec![0; text.len()];
        for (i, &pos) in sa.iter().enumerate() {
            rank[pos] = i;
        }
        let lcp = lcp_array(text, &sa, &rank);
        Self { sa, rank, lcp }
    }

    /// Number of indexed suffixes.
    pub fn len(&self) -> usize {
        self.sa.len()
    }

    /// Whether the text was empty.
    pub fn is_empty(&self) -> bool {
        self.sa.is_empty()
    }

    /// Starting positions in suffix order.
    pub fn suffix_array(&self) -> &[usize] {
        &self.sa
    }

    /// Position in suffix order of the suffix starting at `pos`.
    #[inline]
    pub fn rank(&self, pos: usize) -> usize {
        self.rank[pos]
    }

    /// Start of the suffix at `rank` in suffix order.
    #[inline]
    pub fn suffix_at(&self, rank: usize) -> usize {
        self.sa[rank]
    }

    /// Longest common prefix of the suffixes at `rank - 1` and `rank`
    /// (0 for the first).
    #[inline]
    pub fn lcp(&self, rank: usize) -> usize {
        self.lcp[rank]
    }
}

/// Build the suffix array of a byte string.
pub fn suffix_array(text: &[u8]) -> Vec<usize> {
    let s: Vec<usize> = text.iter().map(|&b| b as usize).collect();
    sa_is(&s, 255)
}

/// Kasai's algorithm: `lcp[r]` is the common prefix length of the suffixes
/// at ranks `r - 1` and `r`.
pub fn lcp_array(text: &[u8], sa: &[usize], rank: &[usize]) -> Vec<usize> {
    let n = text.len();
    let mut lcp = vec![0; n];
    let mut h = 0usize;

    for i in 0..n {
        let r = rank[i];
        if r == 0 {
            h = 0;
            continue;
        }
        let j = sa[r - 1];
        while i + h < n && j + h < n && text[i + h] == text[j + h] {
            h += 1;
        }
        lcp[r] = h;
        h = h.saturating_sub(1);
    }

    lcp
}

fn sa_naive(s: &[usize]) -> Vec<usize> {
    let mut sa: Vec<usize> = (0..s.len()).collect();
    sa.sort_by(|&a, &b| {
        if a == b {
            Ordering::Equal
        } else {
            s[a..].cmp(&s[b..])
        }
    });
    sa
}

/// SA-IS over an integer alphabet `0..=upper`.
fn sa_is(s: &[usize], upper: usize) -> Vec<usize> {
    let n = s.len();
    match n {
        0 => return Vec::new(),
        1 => return vec![0],
        2 => return if s[0] < s[1] { vec![0, 1] } else { vec![1, 0] },
        _ if n < NAIVE_THRESHOLD => return sa_naive(s),
        _ => {}
    }

    // ls[i]: suffix i is S-type (smaller than suffix i + 1)
    let mut ls = vec![false; n];
    for i in (0..n - 1).rev() {
        ls[i] = if s[i] == s[i + 1] {
            ls[i + 1]
        } else {
            s[i] < s[i + 1]
        };
    }

    // Bucket starts: sum_l[c] for the L part, sum_s[c] for the S part
    let mut sum_l = vec![0usize; upper + 1];
    let mut sum_s = vec![0usize; upper + 1];
    for i in 0..n {
        if ls[i] {
            sum_l[s[i] + 1] += 1;
        } else {
            sum_s[s[i]] += 1;
        }
    }
    for c in 0..=upper {
        sum_s[c] += sum_l[c];
        if c < upper {
            sum_l[c + 1] += sum_s[c];
        }
    }

    let buckets = Buckets {
        s,
        ls: &ls,
        sum_l: &sum_l,
        sum_s: &sum_s,
    };

    let mut lms_map = vec![EMPTY; n + 1];
    let mut lms = Vec::new();
    for i in 1..n {
        if !ls[i - 1] && ls[i] {
            lms_map[i] = lms.len();
            lms.push(i);
        }
    }
    let m = lms.len();

    let mut sa = vec![EMPTY; n];
    buckets.induce(&lms, &mut sa);

    if m > 0 {
        let mut sorted_lms: Vec<usize> = sa
            .iter()
            .copied()
            .filter(|&v| v != EMPTY && lms_map[v] != EMPTY)
            .collect();

        // Name each LMS substring; equal substrings share a name
        let mut rec_s = vec![0usize; m];
        let mut rec_upper = 0;
        rec_s[lms_map[sorted_lms[0]]] = 0;
        for i in 1..m {
            let mut l = sorted_lms[i - 1];
            let mut r = sorted_lms[i];
            let end_l = if lms_map[l] + 1 < m { lms[lms_map[l] + 1] } else { n };
            let end_r = if lms_map[r] + 1 < m { lms[lms_map[r] + 1] } else { n };

            let same = if end_l - l != end_r - r {
                false
            } else {
                while l < end_l && s[l] == s[r] {
                    l += 1;
                    r += 1;
                }
                l != n && r != n && s[l] == s[r]
            };
            if !same {
                rec_upper += 1;
            }
            rec_s[lms_map[sorted_lms[i]]] = rec_upper;
        }

        let rec_sa = sa_is(&rec_s, rec_upper);
        for (slot, &rank) in sorted_lms.iter_mut().zip(&rec_sa) {
            *slot = lms[rank];
        }
        buckets.induce(&sorted_lms, &mut sa);
    }

    sa
}

struct Buckets<'a> {
    s: &'a [usize],
    ls: &'a [bool],
    sum_l: &'a [usize],
    sum_s: &'a [usize],
}

impl Buckets<'_> {
    /// Induce the order of all suffixes from the sorted LMS suffixes.
    fn induce(&self, lms: &[usize], sa: &mut [usize]) {
        let (s, ls) = (self.s, self.ls);
        let n = s.len();
        sa.fill(EMPTY);

        let mut buf = self.sum_s.to_vec();
        for &d in lms {
            sa[buf[s[d]]] = d;
            buf[s[d]] += 1;
        }

        // L-type suffixes, left to right
        buf.copy_from_slice(self.sum_l);
        sa[buf[s[n - 1]]] = n - 1;
        buf[s[n - 1]] += 1;
        for i in 0..n {
            let v = sa[i];
            if v != EMPTY && v >= 1 && !ls[v - 1] {
                sa[buf[s[v - 1]]] = v - 1;
                buf[s[v - 1]] += 1;
            }
        }

        // S-type suffixes, right to left
        buf.copy_from_slice(self.sum_l);
        for i in (0..n).rev() {
            let v = sa[i];
            if v != EMPTY && v >= 1 && ls[v - 1] {
                buf[s[v - 1] + 1] -= 1;
                sa[buf[s[v - 1] + 1]] = v - 1;
            }
        }
    }
}
