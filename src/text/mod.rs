//! # Text Measurement
//!
//! Greedy word wrapping and height measurement.
//!
//! Break opportunities come from UAX#14: a "word" is whatever lies between
//! two allowed breaks, trailing whitespace included. Words accumulate onto a
//! line until the next one would overflow, then the overflowing word starts
//! a new line. A word wider than the whole line sits alone on its own line;
//! it is never split or dropped. Mandatory breaks (newlines) always end the
//! current line.
//!
//! Measurement is a pure function of `(text, font_size, max_width)` and the
//! configured line height, which is what lets the finalizer trust the page
//! boundaries the layout pass produced.

use std::sync::Arc;

use serde::Serialize;
use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::error::LayoutError;
use crate::font::{FontMetrics, StandardMetrics};

/// Result of measuring a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub line_count: usize,
    pub height: f64,
}

/// One line of wrapped text.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    /// The line's text, trailing whitespace removed.
    pub text: String,
    /// Width of `text` in points.
    pub width: f64,
}

/// Wraps and measures text against a font. Cheap to clone and safe to share
/// across threads.
#[derive(Debug, Clone)]
pub struct TextMeasurer {
    metrics: Arc<dyn FontMetrics>,
    line_height: f64,
}

impl Default for TextMeasurer {
    fn default() -> Self {
        Self::new(Arc::new(StandardMetrics), 1.25)
    }
}

impl TextMeasurer {
    /// `line_height` is a multiple of the font size.
    pub fn new(metrics: Arc<dyn FontMetrics>, line_height: f64) -> Self {
        Self {
            metrics,
            line_height,
        }
    }

    /// Height of one line at `font_size`.
    pub fn line_height(&self, font_size: f64) -> f64 {
        font_size * self.line_height
    }

    /// Count wrapped lines and the height they occupy.
    pub fn measure(
        &self,
        text: &str,
        font_size: f64,
        max_width: f64,
    ) -> Result<Measurement, LayoutError> {
        let lines = self.wrap(text, font_size, max_width)?;
        Ok(Measurement {
            line_count: lines.len(),
            height: lines.len() as f64 * self.line_height(font_size),
        })
    }

    /// Break `text` into lines no wider than `max_width`, except for single
    /// words that are wider on their own.
    pub fn wrap(
        &self,
        text: &str,
        font_size: f64,
        max_width: f64,
    ) -> Result<Vec<WrappedLine>, LayoutError> {
        if !font_size.is_finite() || font_size <= 0.0 {
            return Err(LayoutError::measurement(format!(
                "font size must be positive, got {}",
                font_size
            )));
        }
        if !max_width.is_finite() || max_width <= 0.0 {
            return Err(LayoutError::measurement(format!(
                "line width must be positive, got {}",
                max_width
            )));
        }
        if !self.line_height.is_finite() || self.line_height <= 0.0 {
            return Err(LayoutError::measurement(format!(
                "line height factor must be positive, got {}",
                self.line_height
            )));
        }
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let mut lines = Vec::new();
        let mut current = String::new();
        // Width of `current` including any trailing whitespace.
        let mut current_width = 0.0;
        let mut start = 0;

        for (end, opportunity) in linebreaks(text) {
            let segment = &text[start..end];
            start = end;

            let body = segment.trim_end_matches(is_line_terminator);
            let visible = body.trim_end();
            let body_width = self.text_width(body, font_size)?;
            let visible_width = self.text_width(visible, font_size)?;

            if !current.is_empty() && current_width + visible_width > max_width {
                lines.push(self.finish_line(&current, font_size)?);
                current.clear();
                current_width = 0.0;
            }

            current.push_str(body);
            current_width += body_width;

            if opportunity == BreakOpportunity::Mandatory {
                lines.push(self.finish_line(&current, font_size)?);
                current.clear();
                current_width = 0.0;
            }
        }

        if !current.is_empty() {
            lines.push(self.finish_line(&current, font_size)?);
        }

        Ok(lines)
    }

    /// Width of a string on a single line.
    pub fn text_width(&self, text: &str, font_size: f64) -> Result<f64, LayoutError> {
        let mut width = 0.0;
        for ch in text.chars() {
            let w = self.metrics.char_width(ch, font_size).ok_or_else(|| {
                LayoutError::measurement(format!("no metrics for character {:?}", ch))
            })?;
            if !w.is_finite() {
                return Err(LayoutError::measurement(format!(
                    "non-finite width for character {:?}",
                    ch
                )));
            }
            width += w;
        }
        Ok(width)
    }

    fn finish_line(&self, text: &str, font_size: f64) -> Result<WrappedLine, LayoutError> {
        let text = text.trim_end().to_string();
        let width = self.text_width(&text, font_size)?;
        Ok(WrappedLine { text, width })
    }
}

fn is_line_terminator(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}
