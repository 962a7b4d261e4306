//! # Renderers
//!
//! The drawing side of the pipeline. A renderer walks a finalized plan page
//! by page and draws each positioned block at its `y` offset, then the page
//! footer. Concrete document formats live outside this crate; the text
//! renderer here exists for debugging and tests.

use std::fmt::Write;

use crate::error::LayoutError;
use crate::layout::LayoutPlan;
use crate::model::Block;
use crate::text::TextMeasurer;

/// Consumes a finalized [`LayoutPlan`].
pub trait Renderer {
    type Output;

    /// Draw the plan. Implementations must reject draft plans with
    /// [`LayoutError::PlanNotFinal`].
    fn render(&mut self, plan: &LayoutPlan) -> Result<Self::Output, LayoutError>;
}

/// Renders a plan as plain text, one wrapped line per output line, with
/// pages separated by form feeds.
#[derive(Debug, Clone)]
pub struct TextRenderer {
    measurer: TextMeasurer,
    indent: usize,
}

impl TextRenderer {
    /// `measurer` must be the one the plan was laid out with, so the lines
    /// drawn are the lines that were measured.
    pub fn new(measurer: TextMeasurer) -> Self {
        Self {
            measurer,
            indent: 2,
        }
    }
}

impl Renderer for TextRenderer {
    type Output = String;

    fn render(&mut self, plan: &LayoutPlan) -> Result<String, LayoutError> {
        if !plan.is_final() {
            return Err(LayoutError::PlanNotFinal);
        }

        let mut out = String::new();
        for (i, page) in plan.pages.iter().enumerate() {
            if i > 0 {
                out.push('\u{000C}');
            }
            for placed in &page.blocks {
                let (Some(text), Some(font_size)) =
                    (placed.block.render_text(), placed.block.font_size())
                else {
                    continue;
                };
                let pad = " ".repeat(placed.depth * self.indent);
                let lines = self.measurer.wrap(&text, font_size, placed.width)?;
                for (n, line) in lines.iter().enumerate() {
                    let lead = match (placed.depth, n) {
                        (0, _) => "",
                        (_, 0) => "- ",
                        _ => "  ",
                    };
                    let text = match placed.block {
                        Block::Heading { .. } => line.text.to_uppercase(),
                        _ => line.text.clone(),
                    };
                    let _ = writeln!(out, "{}{}{}", pad, lead, text);
                }
            }
            let _ = writeln!(out, "-- {} --", page.footer);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutEngine;
    use crate::model::{Document, PageGeometry, Section};

    fn plan() -> LayoutPlan {
        let document = Document::new(
            "Prescriptions",
            vec![Section::new(
                "rx-1",
                vec![
                    Block::heading("Amoxicillin", 14.0),
                    Block::key_value("Dose", "500mg", 10.0),
                    Block::list(vec![Block::paragraph("with food", 10.0)]),
                ],
            )],
        );
        LayoutEngine::new()
            .layout(&document, &PageGeometry::default())
            .unwrap()
    }

    #[test]
    fn refuses_draft_plans() {
        let mut renderer = TextRenderer::new(LayoutEngine::new().measurer().clone());
        assert!(matches!(
            renderer.render(&plan()),
            Err(LayoutError::PlanNotFinal)
        ));
    }

    #[test]
    fn renders_final_plan() {
        let engine = LayoutEngine::new();
        let mut renderer = TextRenderer::new(engine.measurer().clone());
        let out = renderer.render(&crate::layout::finalize(plan())).unwrap();
        assert_eq!(
            out,
            "AMOXICILLIN\nDose: 500mg\n  - with food\n-- Page 1 of 1 --\n"
        );
    }
}
