#![forbid(unsafe_code)]

//! Lambda log viewer (llv): a terminal dashboard listing serverless functions,
//! showing a function's configuration, and merging its most recent execution
//! logs.
//!
//! The core is backend-independent:
//! 1. **Sources** ([`source`]): narrow traits for the function directory and
//!    the log backend, with an AWS CLI implementation and an in-memory fake.
//! 2. **Logs** ([`logs`]): stream merge, line classification, display
//!    normalization.
//! 3. **Dashboard** ([`tui`]): viewport and selection controllers, an
//!    Elm-style model/update/render loop, and the crossterm runtime.
//!
//! # Library usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use lambda_log_viewer::prelude::*;
//!
//! let backend = Arc::new(MemoryBackend::new().with_entity("orderSvc", &[]));
//! let merger = LogMerger::new(backend.clone());
//! let lines = merger.merge("orderSvc").unwrap();
//! assert!(lines.is_empty());
//! ```

pub mod prelude;

pub mod core;
pub mod logger;
pub mod logs;
pub mod source;
pub mod tui;
