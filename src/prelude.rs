//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use lambda_log_viewer::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{LlvError, Result};

// Sources
pub use crate::source::aws_cli::AwsCliBackend;
pub use crate::source::memory::MemoryBackend;
pub use crate::source::{
    EntityDirectory, LogSource, LogStreamRef, Metadata, RawEvent, filter_entities,
    startup_entities,
};

// Logs
pub use crate::logs::classify::{LineCategory, classify};
pub use crate::logs::merger::{LogMerger, MergedLine};

// Dashboard
pub use crate::tui::selection::{CycleStatus, RefreshContext, RefreshTarget, SelectionController};
pub use crate::tui::viewport::{ScrollOutcome, ViewportController, ViewportState};

// Activity log
pub use crate::logger::ActivityLog;
