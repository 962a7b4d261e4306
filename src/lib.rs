//! # Folio
//!
//! A paginated layout engine for structured records.
//!
//! Folio takes a document (ordered sections of headings, paragraphs,
//! key-value lines and lists) and a page geometry, and decides exactly which
//! page every block lands on and where. Nothing is drawn here: the output is
//! a plan a renderer can walk.
//!
//! "Page 3 of 7" needs the 7 before any footer can be written, so layout is
//! split in two:
//!
//! ```text
//! Document + PageGeometry
//!       ↓
//!   [layout]     — one forward pass: measure, place, break pages  → draft plan
//!       ↓
//!   [finalize]   — stamp "page i of n" footers now that n is known → final plan
//!       ↓
//!   [render]     — draw it (outside this crate, or the text renderer)
//! ```
//!
//! Measurement is deterministic, so the finalize pass never has to revisit
//! page boundaries.

pub mod config;
pub mod error;
pub mod font;
pub mod layout;
pub mod model;
pub mod render;
pub mod text;

use serde::Deserialize;

pub use config::LayoutConfig;
pub use error::LayoutError;
use layout::{LayoutEngine, LayoutPlan};
use model::{Document, PageGeometry};

/// Lay out and finalize a document with the default configuration and
/// built-in Helvetica metrics.
///
/// This is the primary entry point.
pub fn paginate(document: &Document, geometry: &PageGeometry) -> Result<LayoutPlan, LayoutError> {
    LayoutEngine::new().paginate(document, geometry)
}

/// A layout request as JSON: the document plus optional geometry and config.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutRequest {
    document: Document,
    #[serde(default)]
    geometry: PageGeometry,
    #[serde(default)]
    config: LayoutConfig,
}

/// Paginate a layout request described as JSON.
pub fn paginate_json(json: &str) -> Result<LayoutPlan, LayoutError> {
    let request: LayoutRequest = serde_json::from_str(json)?;
    LayoutEngine::with_config(request.config).paginate(&request.document, &request.geometry)
}
