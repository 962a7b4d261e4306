//! # Page-Aware Layout Engine
//!
//! Flows a document's blocks into bounded pages in one forward pass.
//!
//! The algorithm is the simple one, done carefully:
//!
//! 1. Open page 0 with the full usable height remaining
//! 2. For each block, measure it at the usable width
//! 3. If it fits: place it at the cursor, reduce remaining space
//! 4. If it doesn't fit: start a new page and place it at the top
//! 5. If no page could ever hold it: place it alone on a fresh page and
//!    record a warning instead of looping or dropping it
//! 6. A heading that would fit but leave no room for the line after it
//!    moves to the next page with its content
//!
//! List groups are never measured as a unit. Their items are placed one by
//! one and may land on different pages.
//!
//! The result is a *draft* plan: every page carries the unexpanded footer
//! template, because the total page count isn't known until the last block
//! has been placed. [`finalize`] stamps the real footers in a second pass.

pub mod cursor;
pub mod finalize;
pub mod page_break;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::font::{FontMetrics, StandardMetrics};
use crate::model::{Block, BreakHint, Document, PageGeometry};
use crate::text::{Measurement, TextMeasurer};

pub use cursor::FlowCursor;
pub use finalize::finalize;
pub use page_break::{decide_break, BreakDecision};

/// Where a leaf block came from: its section index, then the index path
/// through any nested list groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BlockPath {
    pub section: usize,
    pub indices: Vec<usize>,
}

impl fmt::Display for BlockPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.section)?;
        for i in &self.indices {
            write!(f, "/{}", i)?;
        }
        Ok(())
    }
}

/// A placed block. Positions are relative to the top-left of the page's
/// content area (inside the margins).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedBlock {
    pub block: Block,
    pub path: BlockPath,
    pub page: usize,
    pub y: f64,
    pub height_used: f64,
    /// List nesting level; 0 outside any list group.
    pub depth: usize,
    /// Width the block was wrapped at.
    pub width: f64,
}

/// A fully laid-out page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub index: usize,
    pub blocks: Vec<PositionedBlock>,
    /// The footer template while the plan is a draft, the concrete
    /// "page i of n" text once finalized.
    pub footer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlanStatus {
    /// Pages complete, footers not yet stamped.
    Draft,
    /// Footers stamped; ready for a renderer.
    Final,
}

/// Non-fatal conditions found during layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum LayoutWarning {
    /// The block is taller than a whole page and overflows the one it was
    /// placed on.
    BlockTooLarge {
        path: BlockPath,
        page: usize,
        height: f64,
        usable_height: f64,
    },
}

/// The complete page-assigned placement of a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPlan {
    pub pages: Vec<Page>,
    /// Zero until finalized.
    pub total_pages: usize,
    pub status: PlanStatus,
    pub warnings: Vec<LayoutWarning>,
    pub footer_template: String,
}

impl LayoutPlan {
    pub fn is_final(&self) -> bool {
        self.status == PlanStatus::Final
    }

    /// All positioned blocks in reading order.
    pub fn positioned_blocks(&self) -> impl Iterator<Item = &PositionedBlock> {
        self.pages.iter().flat_map(|p| p.blocks.iter())
    }

    pub fn has_oversized_blocks(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, LayoutWarning::BlockTooLarge { .. }))
    }
}

/// The main layout engine. Holds configuration only; every call to
/// [`LayoutEngine::layout`] runs an independent pass, so one engine can
/// serve many documents concurrently.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
    measurer: TextMeasurer,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::with_config(LayoutConfig::default())
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self::with_metrics(config, Arc::new(StandardMetrics))
    }

    pub fn with_metrics(config: LayoutConfig, metrics: Arc<dyn FontMetrics>) -> Self {
        let measurer = TextMeasurer::new(metrics, config.line_height);
        Self { config, measurer }
    }

    pub fn measurer(&self) -> &TextMeasurer {
        &self.measurer
    }

    /// Lay out and finalize in one call.
    pub fn paginate(
        &self,
        document: &Document,
        geometry: &PageGeometry,
    ) -> Result<LayoutPlan, LayoutError> {
        self.layout(document, geometry).map(finalize)
    }

    /// Flow a document into pages, producing a draft plan.
    ///
    /// Fails without a partial plan on invalid geometry or config, or when
    /// any block cannot be measured.
    pub fn layout(
        &self,
        document: &Document,
        geometry: &PageGeometry,
    ) -> Result<LayoutPlan, LayoutError> {
        geometry.validate()?;
        self.config.validate()?;

        let mut leaves = Vec::with_capacity(document.leaf_count());
        for (section_idx, section) in document.sections.iter().enumerate() {
            let first = leaves.len();
            for (i, block) in section.blocks.iter().enumerate() {
                collect_leaves(block, section_idx, vec![i], 0, &mut leaves);
            }
            if section.start_on_new_page {
                if let Some(leaf) = leaves.get_mut(first) {
                    leaf.starts_new_page = true;
                }
            }
        }

        let mut pass = LayoutPass::new(self, geometry);
        let reserves = pass.keep_with_next_reserves(&leaves)?;
        let mut breaks = 0;
        for (leaf, reserve) in leaves.iter().zip(reserves) {
            if pass.place(leaf, reserve)? {
                breaks += 1;
            }
        }

        let plan = pass.into_plan();
        log::debug!(
            "laid out {} block(s) from {} section(s) onto {} page(s) with {} break(s), {} warning(s)",
            leaves.len(),
            document.sections.len(),
            plan.pages.len(),
            breaks,
            plan.warnings.len()
        );
        Ok(plan)
    }
}

/// A leaf block scheduled for placement.
#[derive(Debug)]
struct Leaf<'a> {
    block: &'a Block,
    path: BlockPath,
    depth: usize,
    starts_new_page: bool,
}

fn collect_leaves<'a>(
    block: &'a Block,
    section: usize,
    indices: Vec<usize>,
    depth: usize,
    out: &mut Vec<Leaf<'a>>,
) {
    match block {
        Block::ListGroup { items } => {
            for (i, item) in items.iter().enumerate() {
                let mut child = indices.clone();
                child.push(i);
                collect_leaves(item, section, child, depth + 1, out);
            }
        }
        _ => out.push(Leaf {
            block,
            path: BlockPath { section, indices },
            depth,
            starts_new_page: false,
        }),
    }
}

/// State for one layout request. Never outlives the call to `layout`.
struct LayoutPass<'e> {
    engine: &'e LayoutEngine,
    usable_width: f64,
    cursor: FlowCursor,
    pages: Vec<Page>,
    warnings: Vec<LayoutWarning>,
    cache: HashMap<(String, u64, u64), Measurement>,
}

impl<'e> LayoutPass<'e> {
    fn new(engine: &'e LayoutEngine, geometry: &PageGeometry) -> Self {
        let mut pass = Self {
            engine,
            usable_width: geometry.usable_width(),
            cursor: FlowCursor::new(geometry.usable_height()),
            pages: Vec::new(),
            warnings: Vec::new(),
            cache: HashMap::new(),
        };
        pass.ensure_page();
        pass
    }

    /// Never wider than the content area, never narrower than half of it.
    fn width_at_depth(&self, depth: usize) -> f64 {
        let indent = depth as f64 * self.engine.config.list_indent.max(0.0);
        (self.usable_width - indent).clamp(self.usable_width / 2.0, self.usable_width)
    }

    fn measure(&mut self, block: &Block, depth: usize) -> Result<Measurement, LayoutError> {
        let (Some(text), Some(font_size)) = (block.render_text(), block.font_size()) else {
            return Ok(Measurement {
                line_count: 0,
                height: 0.0,
            });
        };
        let width = self.width_at_depth(depth);
        let key = (text, font_size.to_bits(), width.to_bits());
        if let Some(m) = self.cache.get(&key) {
            return Ok(*m);
        }
        let m = self.engine.measurer.measure(&key.0, font_size, width)?;
        self.cache.insert(key, m);
        Ok(m)
    }

    /// Space each keep-with-next leaf needs below it: any run of further
    /// keep-with-next leaves, plus the first lines of the leaf after them.
    /// `None` for other leaves and when nothing follows on the same flow.
    ///
    /// One backward sweep, so a long run of headings stays linear.
    fn keep_with_next_reserves(
        &mut self,
        leaves: &[Leaf<'_>],
    ) -> Result<Vec<Option<f64>>, LayoutError> {
        let keep_lines = self.engine.config.heading_keep_lines as f64;
        let mut reserves = vec![None; leaves.len()];
        // What the leaves from `j` onward offer to a heading just before `j`.
        let mut tail: Option<f64> = None;
        for (j, leaf) in leaves.iter().enumerate().rev() {
            if leaf.block.break_hint() == BreakHint::KeepWithNext {
                reserves[j] = tail;
            }
            tail = if leaf.starts_new_page {
                None
            } else {
                let m = self.measure(leaf.block, leaf.depth)?;
                if leaf.block.break_hint() == BreakHint::KeepWithNext {
                    tail.map(|t| t + m.height)
                } else {
                    let font_size = leaf.block.font_size().unwrap_or_default();
                    let lines = keep_lines * self.engine.measurer.line_height(font_size);
                    Some(lines.min(m.height))
                }
            };
        }
        Ok(reserves)
    }

    /// Place one leaf. Returns whether a page break happened first.
    fn place(&mut self, leaf: &Leaf<'_>, reserve: Option<f64>) -> Result<bool, LayoutError> {
        let height = self.measure(leaf.block, leaf.depth)?.height;
        let mut broke_page = false;

        if leaf.starts_new_page && !self.cursor.at_page_top() {
            log::debug!("section at {} starts a new page", leaf.path);
            self.new_page();
            broke_page = true;
        }

        let mut decision = decide_break(&self.cursor, height, reserve);
        if decision == BreakDecision::MoveToNextPage {
            if reserve.is_some() && height <= self.cursor.remaining_height() {
                log::debug!(
                    "moving heading {} to page {} to keep it with its content",
                    leaf.path,
                    self.cursor.page_index() + 1
                );
            }
            self.new_page();
            broke_page = true;
            decision = decide_break(&self.cursor, height, reserve);
        }

        if decision == BreakDecision::PlaceOversized {
            log::warn!(
                "block {} is {:.1}pt tall but a page holds {:.1}pt; it will overflow page {}",
                leaf.path,
                height,
                self.cursor.usable_height(),
                self.cursor.page_index() + 1
            );
            self.warnings.push(LayoutWarning::BlockTooLarge {
                path: leaf.path.clone(),
                page: self.cursor.page_index(),
                height,
                usable_height: self.cursor.usable_height(),
            });
        }

        let page = self.cursor.page_index();
        let positioned = PositionedBlock {
            block: leaf.block.clone(),
            path: leaf.path.clone(),
            page,
            y: self.cursor.y_offset(),
            height_used: height,
            depth: leaf.depth,
            width: self.width_at_depth(leaf.depth),
        };
        self.ensure_page();
        self.pages[page].blocks.push(positioned);
        self.cursor.advance(height);

        Ok(broke_page)
    }

    fn new_page(&mut self) {
        self.cursor.break_page();
        self.ensure_page();
    }

    /// Create the page record for the cursor's page on first use.
    fn ensure_page(&mut self) {
        while self.pages.len() <= self.cursor.page_index() {
            self.pages.push(Page {
                index: self.pages.len(),
                blocks: Vec::new(),
                footer: self.engine.config.footer_template.clone(),
            });
        }
    }

    fn into_plan(self) -> LayoutPlan {
        LayoutPlan {
            pages: self.pages,
            total_pages: 0,
            status: PlanStatus::Draft,
            warnings: self.warnings,
            footer_template: self.engine.config.footer_template.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::MonospaceMetrics;
    use crate::model::Section;

    /// 10pt text, 5pt per character, 12.5pt lines.
    fn engine() -> LayoutEngine {
        LayoutEngine::with_metrics(LayoutConfig::default(), Arc::new(MonospaceMetrics::new(0.5)))
    }

    /// A paragraph of `n` explicit lines.
    fn lines(n: usize) -> Block {
        Block::paragraph(&vec!["x"; n].join("\n"), 10.0)
    }

    fn doc(blocks: Vec<Block>) -> Document {
        Document::new("t", vec![Section::new("s", blocks)])
    }

    #[test]
    fn draft_has_template_footers() {
        let plan = engine()
            .layout(&doc(vec![lines(2)]), &PageGeometry::content_area(200.0, 100.0))
            .unwrap();
        assert_eq!(plan.status, PlanStatus::Draft);
        assert_eq!(plan.total_pages, 0);
        assert_eq!(plan.pages[0].footer, "Page {{pageNumber}} of {{totalPages}}");
    }

    #[test]
    fn blocks_stack_down_the_page() {
        let plan = engine()
            .layout(
                &doc(vec![lines(2), lines(1)]),
                &PageGeometry::content_area(200.0, 100.0),
            )
            .unwrap();
        let ys: Vec<f64> = plan.positioned_blocks().map(|b| b.y).collect();
        assert_eq!(ys, vec![0.0, 25.0]);
        assert_eq!(plan.pages[0].blocks[1].height_used, 12.5);
    }

    #[test]
    fn list_items_split_across_pages() {
        // 100pt page holds 8 lines; the list has 3 items of 3 lines each.
        let plan = engine()
            .layout(
                &doc(vec![Block::list(vec![lines(3), lines(3), lines(3)])]),
                &PageGeometry::content_area(200.0, 100.0),
            )
            .unwrap();
        assert_eq!(plan.pages.len(), 2);
        assert_eq!(plan.pages[0].blocks.len(), 2);
        assert_eq!(plan.pages[1].blocks.len(), 1);
        assert_eq!(
            plan.pages[1].blocks[0].path,
            BlockPath {
                section: 0,
                indices: vec![0, 2]
            }
        );
        assert!(plan.positioned_blocks().all(|b| b.depth == 1));
    }

    #[test]
    fn nested_list_items_are_indented() {
        let plan = engine()
            .layout(
                &doc(vec![Block::list(vec![Block::list(vec![lines(1)])])]),
                &PageGeometry::content_area(200.0, 100.0),
            )
            .unwrap();
        let b = &plan.pages[0].blocks[0];
        assert_eq!(b.depth, 2);
        assert_eq!(b.width, 176.0);
    }

    #[test]
    fn indent_never_narrows_below_half_width() {
        let mut block = lines(1);
        for _ in 0..20 {
            block = Block::list(vec![block]);
        }
        let plan = engine()
            .layout(&doc(vec![block]), &PageGeometry::content_area(200.0, 100.0))
            .unwrap();
        assert_eq!(plan.pages[0].blocks[0].width, 100.0);
    }

    #[test]
    fn section_can_force_new_page() {
        let document = Document::new(
            "t",
            vec![
                Section::new("a", vec![lines(1)]),
                Section::new("b", vec![lines(1)]).on_new_page(),
            ],
        );
        let plan = engine()
            .layout(&document, &PageGeometry::content_area(200.0, 100.0))
            .unwrap();
        assert_eq!(plan.pages.len(), 2);
        assert_eq!(plan.pages[1].blocks[0].y, 0.0);
    }

    #[test]
    fn forced_section_on_first_page_wastes_nothing() {
        let document = Document::new("t", vec![Section::new("a", vec![lines(1)]).on_new_page()]);
        let plan = engine()
            .layout(&document, &PageGeometry::content_area(200.0, 100.0))
            .unwrap();
        assert_eq!(plan.pages.len(), 1);
    }

    #[test]
    fn heading_chain_moves_together() {
        // Page holds 8 lines. After 6 lines, two one-line headings would fill
        // the page exactly and leave no room for the body, so the first
        // heading moves along with the second.
        let plan = engine()
            .layout(
                &doc(vec![
                    lines(6),
                    Block::heading("A", 10.0),
                    Block::heading("B", 10.0),
                    lines(4),
                ]),
                &PageGeometry::content_area(200.0, 100.0),
            )
            .unwrap();
        assert_eq!(plan.pages.len(), 2);
        assert_eq!(plan.pages[0].blocks.len(), 1);
        assert_eq!(plan.pages[1].blocks[0].block, Block::heading("A", 10.0));
    }

    #[test]
    fn trailing_heading_is_not_moved() {
        // Nothing follows the heading, so there is nothing to keep it with.
        let plan = engine()
            .layout(
                &doc(vec![lines(7), Block::heading("End", 10.0)]),
                &PageGeometry::content_area(200.0, 100.0),
            )
            .unwrap();
        assert_eq!(plan.pages.len(), 1);
    }

    #[test]
    fn measurement_failure_aborts() {
        let err = engine()
            .layout(
                &doc(vec![lines(1), Block::paragraph("bad", -3.0)]),
                &PageGeometry::content_area(200.0, 100.0),
            )
            .unwrap_err();
        assert!(matches!(err, LayoutError::MeasurementFailure { .. }));
    }

    #[test]
    fn negative_list_indent_is_rejected() {
        let config = LayoutConfig {
            list_indent: -50.0,
            ..LayoutConfig::default()
        };
        let engine = LayoutEngine::with_metrics(config, Arc::new(MonospaceMetrics::new(0.5)));
        let err = engine
            .layout(
                &doc(vec![Block::list(vec![Block::list(vec![lines(1)])])]),
                &PageGeometry::content_area(200.0, 100.0),
            )
            .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidConfig { .. }));
    }

    #[test]
    fn long_heading_run_lays_out_in_linear_time() {
        // 8 headings per page; nothing but headings, so none has a body to
        // keep with and every one is placed in order.
        let count = 40_000;
        let blocks = (0..count).map(|_| Block::heading("H", 10.0)).collect();
        let started = std::time::Instant::now();
        let plan = engine()
            .layout(&doc(blocks), &PageGeometry::content_area(200.0, 100.0))
            .unwrap();
        let elapsed = started.elapsed();

        assert_eq!(plan.pages.len(), count / 8);
        assert_eq!(plan.positioned_blocks().count(), count);
        assert!(plan.pages.iter().all(|p| p.blocks.len() == 8));
        assert!(plan.warnings.is_empty());
        assert!(
            elapsed < std::time::Duration::from_secs(10),
            "took {elapsed:?}"
        );
    }

    #[test]
    fn overlong_heading_run_keeps_only_its_tail_together() {
        // Twelve headings plus a body line can't share one page. The leading
        // headings flow normally; from the sixth on the rest of the run fits
        // a page with the body, so that tail moves as one chain.
        let mut blocks = vec![lines(2)];
        blocks.extend((0..12).map(|_| Block::heading("H", 10.0)));
        blocks.push(lines(1));
        let plan = engine()
            .layout(&doc(blocks), &PageGeometry::content_area(200.0, 100.0))
            .unwrap();
        assert_eq!(plan.pages.len(), 2);
        assert_eq!(plan.pages[0].blocks.len(), 6);
        assert_eq!(plan.pages[1].blocks.len(), 8);
        assert_eq!(plan.pages[1].blocks[7].block, lines(1));
    }

    #[test]
    fn block_path_display() {
        let path = BlockPath {
            section: 2,
            indices: vec![0, 3],
        };
        assert_eq!(path.to_string(), "s2/0/3");
    }
}
