//! Write position during a single layout pass.

/// Tracks where we are on the current page.
///
/// `remaining_height` is always `usable_height - y_offset` and never goes
/// negative: a placement that would overflow must break the page first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowCursor {
    page_index: usize,
    y_offset: f64,
    remaining_height: f64,
    usable_height: f64,
}

impl FlowCursor {
    pub fn new(usable_height: f64) -> Self {
        Self {
            page_index: 0,
            y_offset: 0.0,
            remaining_height: usable_height,
            usable_height,
        }
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn y_offset(&self) -> f64 {
        self.y_offset
    }

    pub fn remaining_height(&self) -> f64 {
        self.remaining_height
    }

    pub fn usable_height(&self) -> f64 {
        self.usable_height
    }

    /// Nothing has been placed on the current page yet.
    pub fn at_page_top(&self) -> bool {
        self.y_offset == 0.0
    }

    /// Consume `height` of the current page. Anything beyond the remaining
    /// space marks the page as full rather than driving it negative.
    pub fn advance(&mut self, height: f64) {
        if height >= self.remaining_height {
            self.y_offset = self.usable_height;
            self.remaining_height = 0.0;
        } else {
            self.y_offset += height;
            self.remaining_height = self.usable_height - self.y_offset;
        }
    }

    /// Move to the top of the next page.
    pub fn break_page(&mut self) {
        self.page_index += 1;
        self.y_offset = 0.0;
        self.remaining_height = self.usable_height;
    }
}
