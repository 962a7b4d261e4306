//! # Document Model
//!
//! The input representation for the layout engine. A document is an ordered
//! list of sections, each an ordered list of blocks. The surrounding
//! application builds it from whatever records it has (a prescription becomes
//! a heading plus a handful of key-value lines) and hands it over read-only.
//!
//! Page geometry lives here too: the engine needs nothing else to know how
//! much room a page offers.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// A complete document ready for layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Document title. Not flowed; renderers may use it for metadata.
    #[serde(default)]
    pub title: String,

    /// Sections in reading order.
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Document {
    pub fn new(title: &str, sections: Vec<Section>) -> Self {
        Self {
            title: title.to_string(),
            sections,
        }
    }

    /// Number of leaf blocks (list groups expanded) across all sections.
    pub fn leaf_count(&self) -> usize {
        self.sections
            .iter()
            .flat_map(|s| s.blocks.iter())
            .map(Block::leaf_count)
            .sum()
    }
}

/// A named group of blocks that belong together, e.g. one record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,

    #[serde(default)]
    pub blocks: Vec<Block>,

    /// Force this section to begin at the top of a fresh page.
    #[serde(default)]
    pub start_on_new_page: bool,
}

impl Section {
    pub fn new(id: &str, blocks: Vec<Block>) -> Self {
        Self {
            id: id.to_string(),
            blocks,
            start_on_new_page: false,
        }
    }

    /// Builder-style toggle for [`Section::start_on_new_page`].
    pub fn on_new_page(mut self) -> Self {
        self.start_on_new_page = true;
        self
    }
}

/// The atomic unit of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Block {
    Heading { text: String, font_size: f64 },
    Paragraph { text: String, font_size: f64 },
    KeyValueLine {
        label: String,
        value: String,
        font_size: f64,
    },
    /// A repeated list of items. Never measured as a unit: each item is
    /// placed on its own and may land on a different page.
    ListGroup { items: Vec<Block> },
}

/// Placement hint carried by a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BreakHint {
    /// No preference; break wherever the page runs out.
    Auto,
    /// Must not be left alone at the bottom of a page.
    KeepWithNext,
}

impl Block {
    pub fn heading(text: &str, font_size: f64) -> Self {
        Block::Heading {
            text: text.to_string(),
            font_size,
        }
    }

    pub fn paragraph(text: &str, font_size: f64) -> Self {
        Block::Paragraph {
            text: text.to_string(),
            font_size,
        }
    }

    pub fn key_value(label: &str, value: &str, font_size: f64) -> Self {
        Block::KeyValueLine {
            label: label.to_string(),
            value: value.to_string(),
            font_size,
        }
    }

    pub fn list(items: Vec<Block>) -> Self {
        Block::ListGroup { items }
    }

    /// The text the measurer sees. `None` for list groups.
    pub fn render_text(&self) -> Option<String> {
        match self {
            Block::Heading { text, .. } | Block::Paragraph { text, .. } => Some(text.clone()),
            Block::KeyValueLine { label, value, .. } => {
                if label.is_empty() {
                    Some(value.clone())
                } else {
                    Some(format!("{}: {}", label, value))
                }
            }
            Block::ListGroup { .. } => None,
        }
    }

    /// Font size of a leaf block. `None` for list groups.
    pub fn font_size(&self) -> Option<f64> {
        match self {
            Block::Heading { font_size, .. }
            | Block::Paragraph { font_size, .. }
            | Block::KeyValueLine { font_size, .. } => Some(*font_size),
            Block::ListGroup { .. } => None,
        }
    }

    pub fn break_hint(&self) -> BreakHint {
        match self {
            Block::Heading { .. } => BreakHint::KeepWithNext,
            _ => BreakHint::Auto,
        }
    }

    /// Number of leaf blocks this block expands to.
    pub fn leaf_count(&self) -> usize {
        match self {
            Block::ListGroup { items } => items.iter().map(Block::leaf_count).sum(),
            _ => 1,
        }
    }
}

/// Page size and margins, in points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    #[serde(default)]
    pub size: PageSize,
    #[serde(default = "default_margin")]
    pub margin: Edges,
}

fn default_margin() -> Edges {
    Edges::uniform(54.0)
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margin: default_margin(), // ~0.75 inch
        }
    }
}

impl PageGeometry {
    pub fn new(size: PageSize, margin: Edges) -> Self {
        Self { size, margin }
    }

    /// A custom page whose content area is exactly `width` x `height`.
    pub fn content_area(width: f64, height: f64) -> Self {
        Self {
            size: PageSize::Custom { width, height },
            margin: Edges::default(),
        }
    }

    pub fn usable_width(&self) -> f64 {
        self.size.dimensions().0 - self.margin.horizontal()
    }

    pub fn usable_height(&self) -> f64 {
        self.size.dimensions().1 - self.margin.vertical()
    }

    /// Reject pages with no room for content.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let (w, h) = self.size.dimensions();
        let m = &self.margin;
        let all = [w, h, m.top, m.right, m.bottom, m.left];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(LayoutError::geometry("dimensions must be finite"));
        }
        if all.iter().any(|v| *v < 0.0) {
            return Err(LayoutError::geometry("dimensions must not be negative"));
        }
        if self.usable_height() <= 0.0 {
            return Err(LayoutError::geometry(format!(
                "usable height is {} (page height {} minus margins {})",
                self.usable_height(),
                h,
                m.vertical()
            )));
        }
        if self.usable_width() <= 0.0 {
            return Err(LayoutError::geometry(format!(
                "usable width is {} (page width {} minus margins {})",
                self.usable_width(),
                w,
                m.horizontal()
            )));
        }
        Ok(())
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Tabloid => (792.0, 1224.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Edge values (top, right, bottom, left) used for margins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}
