//! Coordinate translation between the outer document and an inner surface.
//!
//! The inner surface's root wraps the projected content one addressable unit
//! deep, so every mapping adds or subtracts a fixed boundary offset relative
//! to the node's base position in the outer document.

use std::ops::Range;

/// Container markup depth of the inner surface root.
pub const SURFACE_BOUNDARY: usize = 1;

/// Translate an inner-surface range to outer-document coordinates.
pub fn map_inner_to_outer(range: Range<usize>, base: usize) -> Range<usize> {
    let offset = base + SURFACE_BOUNDARY;
    (range.start + offset)..(range.end + offset)
}

/// Translate an outer-document range to inner-surface coordinates, clamping
/// below the node's content start.
pub fn map_outer_to_inner(range: Range<usize>, base: usize) -> Range<usize> {
    let offset = base + SURFACE_BOUNDARY;
    let start = range.start.saturating_sub(offset);
    let end = range.end.saturating_sub(offset).max(start);
    start..end
}

/// Resolve a raw click position plus a pending cursor correction to the
/// nearest valid selection boundary in `text`.
///
/// Positions past the end of the surface degrade to "select the end of the
/// document" rather than failing; in-bounds positions snap back to the
/// nearest char boundary.
pub fn resolve_click(text: &str, pos: usize, correction: usize) -> usize {
    let target = pos + correction;
    if target >= text.len() {
        return text.len();
    }
    let mut at = target;
    while at > 0 && !text.is_char_boundary(at) {
        at -= 1;
    }
    at
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_to_outer_adds_base_and_boundary() {
        assert_eq!(map_inner_to_outer(0..4, 10), 11..15);
        assert_eq!(map_inner_to_outer(2..2, 0), 3..3);
    }

    #[test]
    fn test_outer_to_inner_round_trips() {
        let outer = map_inner_to_outer(3..7, 5);
        assert_eq!(map_outer_to_inner(outer, 5), 3..7);
    }

    #[test]
    fn test_outer_to_inner_clamps_below_content_start() {
        // a range starting on the node's opening boundary clamps to 0
        assert_eq!(map_outer_to_inner(5..9, 5), 0..3);
        assert_eq!(map_outer_to_inner(0..2, 5), 0..0);
    }

    #[test]
    fn test_resolve_click_applies_correction() {
        assert_eq!(resolve_click("## Title", 2, 3), 5);
        assert_eq!(resolve_click("## Title", 0, 0), 0);
    }

    #[test]
    fn test_resolve_click_out_of_bounds_selects_end() {
        assert_eq!(resolve_click("short", 100, 3), 5);
        assert_eq!(resolve_click("", 0, 4), 0);
    }

    #[test]
    fn test_resolve_click_snaps_to_char_boundary() {
        // "é" is two bytes; position 1 is mid-char
        assert_eq!(resolve_click("été", 1, 0), 0);
        assert_eq!(resolve_click("été", 0, 1), 0);
    }
}
