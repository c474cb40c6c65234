//! Longest-matching-block similarity ratio.
//!
//! The score is `2 * M / T`, where `T` is the combined length of both strings in
//! Unicode scalar values and `M` is the number of characters covered by matching
//! blocks. Blocks are found by taking the longest common contiguous run, then
//! repeating on the unmatched text to its left and to its right. Among runs of
//! equal length the one starting earliest in `a`, then earliest in `b`, wins.
//! No characters are treated as junk.
//!
//! The 0.7 default threshold is calibrated against this exact metric, so it must
//! not be swapped for an edit-distance or token-based score.

use std::collections::HashMap;

/// Similarity of `a` and `b` in `0.0..=1.0`. Two empty strings score `1.0`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn ratio(a: &str, b: &str) -> f64 {
    let a = a.chars().collect::<Vec<_>>();
    let b = b.chars().collect::<Vec<_>>();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    2.0 * matched_chars(&a, &b) as f64 / total as f64
}

/// Total length of all matching blocks between `a` and `b`.
pub(crate) fn matched_chars(a: &[char], b: &[char]) -> usize {
    let mut b_positions: HashMap<char, Vec<usize>> = HashMap::new();
    for (index, ch) in b.iter().enumerate() {
        b_positions.entry(*ch).or_default().push(index);
    }

    let mut pending = vec![(0, a.len(), 0, b.len())];
    let mut matched = 0;
    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let (i, j, size) = longest_match(a, &b_positions, (a_lo, a_hi), (b_lo, b_hi));
        if size == 0 {
            continue;
        }

        matched += size;
        if a_lo < i && b_lo < j {
            pending.push((a_lo, i, b_lo, j));
        }
        if i + size < a_hi && j + size < b_hi {
            pending.push((i + size, a_hi, j + size, b_hi));
        }
    }

    matched
}

/// Longest common run of `a[a_lo..a_hi]` and `b[b_lo..b_hi]` as `(start_a, start_b, len)`.
fn longest_match(
    a: &[char],
    b_positions: &HashMap<char, Vec<usize>>,
    (a_lo, a_hi): (usize, usize),
    (b_lo, b_hi): (usize, usize),
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (a_lo, b_lo, 0);

    // run_ending_at[j] = length of the common run ending at a[i - 1] and b[j].
    let mut run_ending_at: HashMap<usize, usize> = HashMap::new();
    for (i, ch) in a.iter().enumerate().take(a_hi).skip(a_lo) {
        let mut next_runs = HashMap::new();
        if let Some(positions) = b_positions.get(ch) {
            for &j in positions {
                if j < b_lo {
                    continue;
                }
                if j >= b_hi {
                    break;
                }

                let run = j
                    .checked_sub(1)
                    .and_then(|previous| run_ending_at.get(&previous))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_runs.insert(j, run);
                if run > best_size {
                    best_i = i + 1 - run;
                    best_j = j + 1 - run;
                    best_size = run;
                }
            }
        }
        run_ending_at = next_runs;
    }

    (best_i, best_j, best_size)
}

#[cfg(test)]
mod tests {
    use super::{matched_chars, ratio};

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn identical_strings_score_one() {
        assert_close(ratio("해리포터(조앤롤링)", "해리포터(조앤롤링)"), 1.0);
        assert_close(ratio("", ""), 1.0);
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert_close(ratio("어린왕자", "백설공주"), 0.0);
        assert_close(ratio("abc", ""), 0.0);
    }

    #[test]
    fn inserted_space_keeps_high_score() {
        // "농장(조지오웰)" (8) plus "동물" (2) match; 2 * 10 / 21.
        assert_close(ratio("동물농장(조지오웰)", "동물 농장(조지오웰)"), 20.0 / 21.0);
    }

    #[test]
    fn counts_blocks_on_both_sides_of_the_longest_run() {
        assert_eq!(matched_chars(&chars("abxcd"), &chars("abycd")), 4);
        assert_close(ratio("abcd", "bcde"), 0.75);
    }

    #[test]
    fn earliest_longest_run_is_chosen() {
        // Choosing the first "ab" in `a` leaves "cab" vs "" on the right, so only 2 chars match.
        assert_eq!(matched_chars(&chars("abcab"), &chars("ab")), 2);
        // The longest run "bcd" wins over the earlier "a", which then cannot match on the left.
        assert_eq!(matched_chars(&chars("abcd"), &chars("bcda")), 3);
    }

    #[test]
    fn ratio_is_symmetric_for_simple_inputs() {
        assert_close(ratio("qabxcd", "abycdf"), ratio("abycdf", "qabxcd"));
    }
}
