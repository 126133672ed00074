// SPDX-License-Identifier: AGPL-3.0
// Campus Exchange Core - Fuzzy keyword matching
//
// Scores are integers in 0..=100. `partial_ratio` finds the best alignment of
// the shorter string inside the longer one, so a keyword that appears inside
// an item name scores 100 even when the name is much longer.

/// A string similarity function used by search
pub trait Similarity {
    /// Score how well `needle` matches somewhere in `haystack`, 0..=100
    fn score(&self, needle: &str, haystack: &str) -> u8;
}

/// Substring-aware similarity backed by [`partial_ratio`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialRatio;

impl Similarity for PartialRatio {
    fn score(&self, needle: &str, haystack: &str) -> u8 {
        partial_ratio(needle, haystack)
    }
}

/// Normalized indel similarity of two strings
pub fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// Best [`ratio`] of the shorter string against any same-length slice of the
/// longer one, including slices that only partly overlap its ends
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return 0;
    }
    if short.len() == long.len() {
        return ratio_chars(&short, &long);
    }

    let m = short.len();
    let n = long.len();
    let windows = (1..m)
        .map(|k| &long[..k])
        .chain((0..=n - m).map(|start| &long[start..start + m]))
        .chain((1..m).rev().map(|k| &long[n - k..]));

    let mut best = 0;
    for window in windows {
        best = best.max(ratio_chars(&short, window));
        if best == 100 {
            break;
        }
    }
    best
}

fn ratio_chars(a: &[char], b: &[char]) -> u8 {
    let total = a.len() + b.len();
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let matched = 2 * longest_common_subsequence(a, b);
    // Round half up; the result never exceeds 100.
    ((matched * 100 + total / 2) / total) as u8
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb {
                previous[j] + 1
            } else {
                current[j].max(previous[j + 1])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}
