//! # Page Break Decisions
//!
//! Logic for deciding whether a block goes on the current page or the next.
//! This module encodes the rules that make Folio's page breaks feel natural
//! rather than mechanical.

use super::cursor::FlowCursor;

/// Slack for floating point accumulation when comparing heights.
const EPSILON: f64 = 1e-9;

/// Decide what to do with the next block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreakDecision {
    /// Place the block at the cursor (it fits).
    Place,
    /// Start a new page and place the block at its top.
    MoveToNextPage,
    /// The block is taller than a whole page. Place it anyway at the top of
    /// the current (fresh) page and let it overflow.
    PlaceOversized,
}

/// Given the cursor and the height a block needs, decide where it goes.
///
/// `keep_with_next` is the space that must remain below the block for it to
/// stay on this page (a heading's following body line). It only applies when
/// moving the block could help: not at the top of a page, and not when the
/// block plus that space is taller than a page anyway.
pub fn decide_break(
    cursor: &FlowCursor,
    required_height: f64,
    keep_with_next: Option<f64>,
) -> BreakDecision {
    // Pathological: no page could ever hold this block.
    if required_height > cursor.usable_height() + EPSILON {
        if cursor.at_page_top() {
            return BreakDecision::PlaceOversized;
        }
        return BreakDecision::MoveToNextPage;
    }

    if required_height > cursor.remaining_height() + EPSILON {
        return BreakDecision::MoveToNextPage;
    }

    // Orphan control
    if let Some(reserve) = keep_with_next {
        let satisfiable = required_height + reserve <= cursor.usable_height() + EPSILON;
        let left_below = cursor.remaining_height() - required_height;
        if satisfiable && !cursor.at_page_top() && left_below + EPSILON < reserve {
            return BreakDecision::MoveToNextPage;
        }
    }

    BreakDecision::Place
}
