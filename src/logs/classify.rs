//! Semantic tagging of log lines.
//!
//! Classification is pure data: it says *what* a line is. Mapping a category
//! to terminal styling happens in the dashboard theme.

use serde::{Deserialize, Serialize};

/// Markers the function runtime writes around each invocation.
pub const BOUNDARY_MARKERS: [&str; 3] = ["START RequestId:", "END RequestId:", "REPORT RequestId:"];

/// Presentation category of a log line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCategory {
    /// Start, end, or summary of one invocation.
    Boundary,
    /// Anything else.
    #[default]
    Plain,
}

/// Categorize a raw message. Total: anything not starting with a marker is `Plain`.
#[must_use]
pub fn classify(message: &str) -> LineCategory {
    if BOUNDARY_MARKERS
        .iter()
        .any(|marker| message.starts_with(marker))
    {
        LineCategory::Boundary
    } else {
        LineCategory::Plain
    }
}
