//! Engine configuration constants.
//!
//! These are fixed for the lifetime of a [`LayoutEngine`](crate::layout::LayoutEngine);
//! nothing is derived per call, so identical inputs always produce identical plans.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// Placeholder replaced with the 1-based page number.
pub const PAGE_NUMBER_PLACEHOLDER: &str = "{{pageNumber}}";
/// Placeholder replaced with the total page count.
pub const TOTAL_PAGES_PLACEHOLDER: &str = "{{totalPages}}";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Line height as a multiple of font size.
    pub line_height: f64,
    /// Body lines that must still fit below a heading for it to stay on the page.
    pub heading_keep_lines: u32,
    /// Footer text with `{{pageNumber}}` and `{{totalPages}}` placeholders.
    pub footer_template: String,
    /// Indent per list nesting level, in points.
    pub list_indent: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_height: 1.25,
            heading_keep_lines: 1,
            footer_template: format!(
                "Page {} of {}",
                PAGE_NUMBER_PLACEHOLDER, TOTAL_PAGES_PLACEHOLDER
            ),
            list_indent: 12.0,
        }
    }
}

impl LayoutConfig {
    /// Expand the footer template for one page.
    pub fn format_footer(&self, page_number: usize, total_pages: usize) -> String {
        format_footer(&self.footer_template, page_number, total_pages)
    }

    /// Reject settings that would let a block wrap outside the content area
    /// or give lines no height.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if !self.line_height.is_finite() || self.line_height <= 0.0 {
            return Err(LayoutError::config(format!(
                "lineHeight must be positive, got {}",
                self.line_height
            )));
        }
        if !self.list_indent.is_finite() || self.list_indent < 0.0 {
            return Err(LayoutError::config(format!(
                "listIndent must be zero or positive, got {}",
                self.list_indent
            )));
        }
        Ok(())
    }
}

pub(crate) fn format_footer(template: &str, page_number: usize, total_pages: usize) -> String {
    template
        .replace(PAGE_NUMBER_PLACEHOLDER, &page_number.to_string())
        .replace(TOTAL_PAGES_PLACEHOLDER, &total_pages.to_string())
}
