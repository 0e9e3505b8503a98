//! Sequence similarity over file contents.
//!
//! [`SequenceMatcher`] finds the longest contiguous matching block between two
//! sequences, then recurses on the pieces to either side of it. The ratio is
//! `2 * matched / (len_a + len_b)`, so identical inputs score `1.0` and inputs
//! with nothing in common score `0.0`.
//!
//! Elements that make up more than 1% of a sequence of 200 or more elements
//! are never used to *start* a match ("popular" elements, typically spaces,
//! braces and common letters in source code). They can still extend a match
//! found from a rarer element. This keeps large boilerplate-heavy files cheap
//! to compare and stops shared filler from dominating the score.

use std::collections::HashMap;
use std::hash::Hash;

use relink_core::SimilarityMode;

/// Minimum length of the second sequence before popular elements are junked.
const AUTOJUNK_MIN_LEN: usize = 200;

/// A matching block: `a[a..a + size] == b[b..b + size]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Match {
    pub a: usize,
    pub b: usize,
    pub size: usize,
}

/// Longest-matching-block comparison of two sequences.
pub struct SequenceMatcher<'a, T> {
    a: &'a [T],
    b: &'a [T],
    b2j: HashMap<T, Vec<usize>>,
}

impl<'a, T> SequenceMatcher<'a, T>
where
    T: Eq + Hash + Copy,
{
    /// Index `b` and prepare to compare it against `a`.
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        let mut b2j: HashMap<T, Vec<usize>> = HashMap::new();
        for (j, elt) in b.iter().enumerate() {
            b2j.entry(*elt).or_default().push(j);
        }

        if b.len() >= AUTOJUNK_MIN_LEN {
            let threshold = b.len() / 100 + 1;
            b2j.retain(|_, indices| indices.len() <= threshold);
        }

        Self { a, b, b2j }
    }

    /// Longest block matching within `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Ties go to the block starting earliest in `a`, then earliest in `b`.
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Match {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

        // j2len[j] = length of the match ending at a[i - 1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next_j2len = HashMap::new();
            if let Some(indices) = self.b2j.get(&self.a[i]) {
                for &j in indices {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let prev = j
                        .checked_sub(1)
                        .and_then(|p| j2len.get(&p))
                        .copied()
                        .unwrap_or(0);
                    let k = prev + 1;
                    next_j2len.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = next_j2len;
        }

        // Grow the block over popular elements on both sides.
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && self.a[best_i + best_size] == self.b[best_j + best_size]
        {
            best_size += 1;
        }

        Match {
            a: best_i,
            b: best_j,
            size: best_size,
        }
    }

    /// Non-overlapping matching blocks, in increasing order, adjacent blocks merged.
    pub fn matching_blocks(&self) -> Vec<Match> {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.size == 0 {
                continue;
            }
            if alo < m.a && blo < m.b {
                queue.push((alo, m.a, blo, m.b));
            }
            if m.a + m.size < ahi && m.b + m.size < bhi {
                queue.push((m.a + m.size, ahi, m.b + m.size, bhi));
            }
            blocks.push(m);
        }
        blocks.sort();

        let mut merged: Vec<Match> = Vec::with_capacity(blocks.len());
        for block in blocks {
            match merged.last_mut() {
                Some(last) if last.a + last.size == block.a && last.b + last.size == block.b => {
                    last.size += block.size;
                }
                _ => merged.push(block),
            }
        }
        merged
    }

    /// Similarity in `[0, 1]` from the matching blocks.
    pub fn ratio(&self) -> f64 {
        let matched: usize = self.matching_blocks().iter().map(|m| m.size).sum();
        calculate_ratio(matched, self.a.len() + self.b.len())
    }
}

/// Upper bound on [`SequenceMatcher::ratio`] from the multiset intersection.
pub fn quick_ratio<T: Eq + Hash + Copy>(a: &[T], b: &[T]) -> f64 {
    let mut available: HashMap<T, isize> = HashMap::new();
    for elt in b {
        *available.entry(*elt).or_default() += 1;
    }

    let mut matched = 0;
    for elt in a {
        let count = available.entry(*elt).or_default();
        if *count > 0 {
            matched += 1;
        }
        *count -= 1;
    }

    calculate_ratio(matched, a.len() + b.len())
}

fn calculate_ratio(matched: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        2.0 * matched as f64 / total as f64
    }
}

/// Character-level similarity of two texts.
pub fn text_similarity(mode: SimilarityMode, a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    match mode {
        SimilarityMode::Ratio => SequenceMatcher::new(&a, &b).ratio(),
        SimilarityMode::Quick => quick_ratio(&a, &b),
    }
}
