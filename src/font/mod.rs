//! # Font Metrics
//!
//! Character advance widths for the text measurer. The engine only ever asks
//! one question of a font: how wide is this character at this size?
//!
//! Three sources are provided: the built-in Helvetica widths (no font file
//! needed), a fixed-advance monospace model, and real TrueType/OpenType
//! metrics parsed with ttf-parser.

use std::collections::HashMap;

use crate::error::LayoutError;

/// Advance-width lookup. Implementations must be pure: the same character
/// and size always yield the same width.
pub trait FontMetrics: Send + Sync + std::fmt::Debug {
    /// Width of `ch` in points at `font_size`, or `None` if the font
    /// cannot measure it.
    fn char_width(&self, ch: char, font_size: f64) -> Option<f64>;
}

/// Helvetica advance widths for printable ASCII (32..=126), in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A-M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a-m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n-z
    334, 260, 334, 584, // {..~
];

/// Width used for characters outside the table.
const HELVETICA_DEFAULT_WIDTH: u16 = 556;

/// The standard PDF Helvetica face. Needs no font file and never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardMetrics;

impl FontMetrics for StandardMetrics {
    fn char_width(&self, ch: char, font_size: f64) -> Option<f64> {
        let code = ch as u32;
        let units = if (32..=126).contains(&code) {
            HELVETICA_WIDTHS[(code - 32) as usize]
        } else if ch == '\u{00A0}' {
            HELVETICA_WIDTHS[0]
        } else {
            HELVETICA_DEFAULT_WIDTH
        };
        Some(units as f64 * font_size / 1000.0)
    }
}

/// Every character is `advance` em wide.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMetrics {
    pub advance: f64,
}

impl MonospaceMetrics {
    pub fn new(advance: f64) -> Self {
        Self { advance }
    }
}

impl FontMetrics for MonospaceMetrics {
    fn char_width(&self, _ch: char, font_size: f64) -> Option<f64> {
        if self.advance.is_finite() && self.advance >= 0.0 {
            Some(self.advance * font_size)
        } else {
            None
        }
    }
}

/// Metrics parsed from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct TrueTypeMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    /// Advance of `.notdef`, used for characters the font has no glyph for.
    pub notdef_advance: Option<u16>,
}

impl TrueTypeMetrics {
    /// Parse metrics from raw font data.
    pub fn from_font_data(data: &[u8]) -> Result<Self, LayoutError> {
        let face = ttf_parser::Face::parse(data, 0)
            .map_err(|e| LayoutError::measurement(format!("unreadable font data: {}", e)))?;
        let units_per_em = face.units_per_em();
        if units_per_em == 0 {
            return Err(LayoutError::measurement("font reports zero units per em"));
        }

        let mut advance_widths = HashMap::new();
        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    if let Some(advance) = face.glyph_hor_advance(glyph_id) {
                        advance_widths.insert(ch, advance);
                    }
                }
            }
        }
        let notdef_advance = face.glyph_hor_advance(ttf_parser::GlyphId(0));

        log::debug!(
            "parsed font metrics: {} glyph advances, {} units/em",
            advance_widths.len(),
            units_per_em
        );

        Ok(Self {
            units_per_em,
            advance_widths,
            notdef_advance,
        })
    }
}

impl FontMetrics for TrueTypeMetrics {
    fn char_width(&self, ch: char, font_size: f64) -> Option<f64> {
        let units = self
            .advance_widths
            .get(&ch)
            .copied()
            .or(self.notdef_advance)?;
        Some(units as f64 * font_size / self.units_per_em as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_table_lines_up() {
        let m = StandardMetrics;
        assert_eq!(m.char_width(' ', 1000.0), Some(278.0));
        assert_eq!(m.char_width('0', 1000.0), Some(556.0));
        assert_eq!(m.char_width('@', 1000.0), Some(1015.0));
        assert_eq!(m.char_width('A', 1000.0), Some(667.0));
        assert_eq!(m.char_width('W', 1000.0), Some(944.0));
        assert_eq!(m.char_width('a', 1000.0), Some(556.0));
        assert_eq!(m.char_width('i', 1000.0), Some(222.0));
        assert_eq!(m.char_width('~', 1000.0), Some(584.0));
    }

    #[test]
    fn helvetica_unknown_char_uses_default() {
        assert_eq!(StandardMetrics.char_width('é', 10.0), Some(5.56));
    }

    #[test]
    fn monospace_scales_with_size() {
        let m = MonospaceMetrics::new(0.5);
        assert_eq!(m.char_width('W', 20.0), Some(10.0));
        assert_eq!(m.char_width('i', 20.0), Some(10.0));
    }

    #[test]
    fn monospace_rejects_nan_advance() {
        assert_eq!(MonospaceMetrics::new(f64::NAN).char_width('a', 10.0), None);
    }

    #[test]
    fn garbage_font_data_is_a_measurement_failure() {
        let err = TrueTypeMetrics::from_font_data(b"definitely not a font").unwrap_err();
        assert!(matches!(err, LayoutError::MeasurementFailure { .. }));
    }

    #[test]
    fn truetype_missing_glyph_without_notdef_fails() {
        let metrics = TrueTypeMetrics {
            units_per_em: 1000,
            advance_widths: HashMap::from([('a', 500)]),
            notdef_advance: None,
        };
        assert_eq!(metrics.char_width('a', 10.0), Some(5.0));
        assert_eq!(metrics.char_width('b', 10.0), None);
    }

    #[test]
    fn truetype_from_system_font() {
        let candidates = [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/System/Library/Fonts/Supplemental/Arial.ttf",
        ];
        let Some(data) = candidates.iter().find_map(|p| std::fs::read(p).ok()) else {
            eprintln!("Skipping: no test TTF font found");
            return;
        };
        let metrics = TrueTypeMetrics::from_font_data(&data).unwrap();
        let w = metrics.char_width('M', 12.0).unwrap();
        assert!(w > 0.0 && w < 24.0);
    }
}
