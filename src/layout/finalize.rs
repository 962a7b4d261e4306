//! Footer stamping.
//!
//! The total page count only exists once the whole document has been flowed,
//! so footers are filled in by a second pass over the finished page list.
//! No geometry is touched here; measurement is deterministic, so the page
//! boundaries from the layout pass stay valid.

use super::{LayoutPlan, PlanStatus};
use crate::config::format_footer;

/// Stamp every page's footer with its concrete "page i of n" text.
///
/// Idempotent: finalizing an already final plan recomputes the same text.
pub fn finalize(mut plan: LayoutPlan) -> LayoutPlan {
    let total_pages = plan.pages.len();
    for (i, page) in plan.pages.iter_mut().enumerate() {
        page.footer = format_footer(&plan.footer_template, i + 1, total_pages);
    }
    plan.total_pages = total_pages;
    plan.status = PlanStatus::Final;
    log::debug!("finalized plan: {} page(s)", total_pages);
    plan
}
