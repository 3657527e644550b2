//! Minimal-divergence diff between two content sequences.
//!
//! Both synchronization directions use this to decide what to patch:
//! longest common prefix, longest common suffix, and an overlap correction
//! for repeated-substring edits. Offsets are byte offsets, but comparison
//! walks chars from both ends so every returned offset lands on a UTF-8
//! boundary and can be used as a rope edit point.

/// The minimal span in which two sequences differ.
///
/// Content outside `start..end_a` in A and `start..end_b` in B is identical;
/// `start <= end_a` and `start <= end_b` hold by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffWindow {
    pub start: usize,
    pub end_a: usize,
    pub end_b: usize,
}

impl DiffWindow {
    /// Zero-width window: the inputs were identical, nothing to patch.
    pub fn is_empty(&self) -> bool {
        self.start == self.end_a && self.start == self.end_b
    }

    /// Apply the patch this window implies: replace `a[start..end_a]` with
    /// `b[start..end_b]`. The result is always exactly `b`.
    pub fn splice(&self, a: &str, b: &str) -> String {
        let mut out = String::with_capacity(b.len());
        out.push_str(&a[..self.start]);
        out.push_str(&b[self.start..self.end_b]);
        out.push_str(&a[self.end_a..]);
        out
    }
}

/// Compute the minimal divergence window between `a` and `b`.
pub fn diff(a: &str, b: &str) -> DiffWindow {
    if a == b {
        let len = a.len();
        return DiffWindow {
            start: len,
            end_a: len,
            end_b: len,
        };
    }

    let mut start = 0;
    for (ca, cb) in a.chars().zip(b.chars()) {
        if ca != cb {
            break;
        }
        start += ca.len_utf8();
    }

    let mut suffix = 0;
    for (ca, cb) in a.chars().rev().zip(b.chars().rev()) {
        if ca != cb {
            break;
        }
        suffix += ca.len_utf8();
    }

    let mut end_a = a.len() - suffix;
    let mut end_b = b.len() - suffix;

    // Prefix and suffix scans overlap on repeated-character runs
    // (e.g. "aaa" -> "aaaa"); advance both ends to keep the window
    // well-formed.
    let overlap = start.saturating_sub(end_a.min(end_b));
    if overlap > 0 {
        end_a += overlap;
        end_b += overlap;
    }

    DiffWindow { start, end_a, end_b }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_identical_inputs_yield_zero_width_window_at_len() {
        let window = diff("hello", "hello");
        assert_eq!(
            window,
            DiffWindow {
                start: 5,
                end_a: 5,
                end_b: 5
            }
        );
        assert!(window.is_empty());
    }

    #[test]
    fn test_simple_replacement() {
        let window = diff("Hello World", "Hello Rust!");
        assert_eq!(window.start, 6);
        assert_eq!(window.splice("Hello World", "Hello Rust!"), "Hello Rust!");
    }

    #[test]
    fn test_overlap_correction_repeated_run() {
        // "aaa" -> "aaaa": prefix and suffix scans both consume the whole
        // string; the corrected window must not be negative and must still
        // round-trip.
        let window = diff("aaa", "aaaa");
        assert!(window.start <= window.end_a);
        assert!(window.start <= window.end_b);
        assert_eq!(window.splice("aaa", "aaaa"), "aaaa");
    }

    #[test]
    fn test_overlap_correction_repeated_substring() {
        // "string" -> "strString": the suffix scan overlaps the prefix scan
        let window = diff("string", "strString");
        assert_eq!(window.splice("string", "strString"), "strString");
    }

    #[rstest]
    #[case("", "")]
    #[case("", "abc")]
    #[case("abc", "")]
    #[case("abc", "abc")]
    #[case("abc", "axc")]
    #[case("abc", "abcd")]
    #[case("abcd", "abc")]
    #[case("aaa", "aaaa")]
    #[case("aaaa", "aaa")]
    #[case("## Title", "### Title")]
    #[case("one two three", "one 2 three")]
    #[case("héllo", "hèllo")]
    #[case("日本語", "日本")]
    #[case("ab", "ba")]
    fn test_diff_round_trip(#[case] a: &str, #[case] b: &str) {
        let window = diff(a, b);
        assert!(window.start <= window.end_a);
        assert!(window.start <= window.end_b);
        assert!(a.is_char_boundary(window.start));
        assert!(a.is_char_boundary(window.end_a));
        assert!(b.is_char_boundary(window.end_b));
        assert_eq!(window.splice(a, b), b);
    }

    #[test]
    fn test_window_boundaries_are_char_aligned_on_multibyte_content() {
        let a = "ééé";
        let b = "éééé";
        let window = diff(a, b);
        assert!(a.is_char_boundary(window.start));
        assert!(a.is_char_boundary(window.end_a));
        assert!(b.is_char_boundary(window.end_b));
        assert_eq!(window.splice(a, b), b);
    }
}
