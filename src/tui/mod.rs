//! Terminal dashboard: Elm-style model/update/render plus the runtime that
//! drives it.
//!
//! Everything except the terminal guard and the event loop is
//! backend-independent and testable without a terminal.

#![allow(missing_docs)]

pub mod input;
pub mod layout;
pub mod model;
pub mod render;
pub mod runtime;
pub mod selection;
#[cfg(feature = "tui")]
pub mod terminal_guard;
pub mod theme;
pub mod update;
pub mod viewport;

#[cfg(test)]
mod test_properties;

#[cfg(feature = "tui")]
pub use runtime::run_dashboard;
pub use runtime::{DashboardRuntimeConfig, RefreshWorker};
pub use selection::{RefreshContext, SelectionController};
pub use viewport::ViewportController;
