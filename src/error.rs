//! Structured error types for the Folio layout engine.
//!
//! Geometry, config and measurement failures abort a layout request outright. An
//! oversized block is not an error; it is recorded as a
//! [`LayoutWarning`](crate::layout::LayoutWarning) on the plan instead.

use thiserror::Error;

/// The unified error type returned by all public Folio API functions.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The page leaves no usable area once margins are removed.
    #[error("invalid page geometry: {reason}")]
    InvalidGeometry { reason: String },

    /// A layout setting is out of range.
    #[error("invalid layout config: {reason}")]
    InvalidConfig { reason: String },

    /// Text could not be measured (bad font metrics, unusable font size or width).
    #[error("measurement failed: {reason}")]
    MeasurementFailure { reason: String },

    /// A renderer was handed a plan whose footers have not been stamped.
    #[error("layout plan has not been finalized")]
    PlanNotFinal,

    /// JSON input failed to parse as a valid layout request.
    #[error("failed to parse layout request: {}{}", .source, format_hint(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },
}

impl LayoutError {
    pub(crate) fn geometry(reason: impl Into<String>) -> Self {
        LayoutError::InvalidGeometry {
            reason: reason.into(),
        }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        LayoutError::InvalidConfig {
            reason: reason.into(),
        }
    }

    pub(crate) fn measurement(reason: impl Into<String>) -> Self {
        LayoutError::MeasurementFailure {
            reason: reason.into(),
        }
    }
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for LayoutError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the layout request schema. Check block types and field names.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        LayoutError::Parse { source: e, hint }
    }
}
