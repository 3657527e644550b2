//! Marker-prefix parsing for leveled nodes.
//!
//! A leveled node is edited as text prefixed with a run of `#` characters
//! followed by whitespace. The stored `level` attribute is the single source
//! of truth; the prefix only ever exists inside the inner surface while the
//! node is being edited.

use regex::Regex;
use std::sync::OnceLock;

/// Deepest structural level a node can take.
pub const MAX_LEVEL: usize = 6;

fn marker_regex() -> &'static Regex {
    static MARKER_REGEX: OnceLock<Regex> = OnceLock::new();
    MARKER_REGEX.get_or_init(|| Regex::new(r"^(#+)\s").expect("Invalid marker regex"))
}

/// Parse the leading marker run of `text`.
///
/// With `clamp` the result is bounded to [`MAX_LEVEL`] and suitable for the
/// structural attribute; without it the raw run length is returned, which is
/// what prefix stripping needs. `None` means the content no longer denotes a
/// leveled node.
pub fn infer_level(text: &str, clamp: bool) -> Option<usize> {
    let caps = marker_regex().captures(text)?;
    let run = caps[1].len();
    if clamp { Some(run.min(MAX_LEVEL)) } else { Some(run) }
}

/// The editable prefix for a given level: a run of markers plus one space.
pub fn marker_prefix(level: usize) -> String {
    let mut prefix = "#".repeat(level);
    prefix.push(' ');
    prefix
}

/// Drop the marker run and the single whitespace char that terminates it.
/// Text without a marker prefix is returned unchanged.
pub fn strip_markers(text: &str) -> &str {
    match infer_level(text, false) {
        Some(run) => {
            let ws = text[run..].chars().next().map_or(0, char::len_utf8);
            &text[run + ws..]
        }
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("# one", Some(1))]
    #[case("### x", Some(3))]
    #[case("###### deep", Some(6))]
    #[case("####### x", Some(6))]
    #[case("no marker", None)]
    #[case("#nospace", None)]
    #[case("", None)]
    fn test_infer_level_clamped(#[case] text: &str, #[case] expected: Option<usize>) {
        assert_eq!(infer_level(text, true), expected);
    }

    #[test]
    fn test_infer_level_raw_run_length() {
        assert_eq!(infer_level("####### x", false), Some(7));
        assert_eq!(infer_level("## x", false), Some(2));
    }

    #[test]
    fn test_marker_prefix() {
        assert_eq!(marker_prefix(1), "# ");
        assert_eq!(marker_prefix(4), "#### ");
    }

    #[test]
    fn test_strip_markers() {
        assert_eq!(strip_markers("## Title"), "Title");
        assert_eq!(strip_markers("####### over"), "over");
        assert_eq!(strip_markers("plain"), "plain");
        // tab is valid marker-terminating whitespace
        assert_eq!(strip_markers("#\tTabbed"), "Tabbed");
    }

    #[test]
    fn test_strip_markers_round_trips_with_prefix() {
        let text = "Body";
        let prefixed = format!("{}{}", marker_prefix(3), text);
        assert_eq!(strip_markers(&prefixed), text);
    }
}
