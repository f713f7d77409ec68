//! Elm-style state model for the dashboard.
//!
//! All display state lives in [`DashboardModel`]. Input and worker results
//! arrive as [`DashboardMsg`] values; side-effects are represented as
//! [`DashboardCmd`] values returned from the update function.
//!
//! The model performs no I/O.

#![allow(missing_docs)]

use std::time::Duration;

use super::input::Key;
use super::layout::{DashboardLayout, build_layout};
use super::selection::{
    CycleStatus, RefreshOutcome, RefreshStage, RefreshTarget, RefreshTicket, SelectionController,
};
use super::viewport::ViewportController;
use crate::core::config::DashboardConfig;
use crate::core::errors::LlvError;
use crate::logs::TimeZoneMode;
use crate::logs::merger::MergedLine;
use crate::source::Metadata;

// ──────────────────── focus ────────────────────

/// Panel receiving navigation keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Entities,
    Logs,
}

impl Focus {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Entities => Self::Logs,
            Self::Logs => Self::Entities,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Entities => "functions",
            Self::Logs => "logs",
        }
    }
}

// ──────────────────── settings ────────────────────

/// Dashboard knobs resolved from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSettings {
    pub page_step: usize,
    pub line_step: usize,
    pub side_width: u16,
    pub metadata_rows: u16,
    pub zone: TimeZoneMode,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self::from(&DashboardConfig::default())
    }
}

impl From<&DashboardConfig> for DashboardSettings {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            page_step: config.page_step,
            line_step: config.line_step,
            side_width: config.side_width,
            metadata_rows: config.metadata_rows,
            zone: if config.utc_timestamps {
                TimeZoneMode::Utc
            } else {
                TimeZoneMode::Local
            },
        }
    }
}

// ──────────────────── panels ────────────────────

/// Progress of the right-hand panels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PanelStatus {
    /// Nothing activated yet.
    #[default]
    Idle,
    Loading {
        entity: String,
    },
    Ready,
    Failed {
        entity: String,
        stage: RefreshStage,
        message: String,
    },
}

/// Metadata panel, log buffer, and the log viewport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panels {
    /// Entity the metadata belongs to, with its fields.
    pub metadata: Option<(String, Metadata)>,
    pub log_lines: Vec<MergedLine>,
    pub log_view: ViewportController,
    pub status: PanelStatus,
}

impl Panels {
    #[must_use]
    pub fn new(log_height: usize) -> Self {
        Self {
            metadata: None,
            log_lines: Vec::new(),
            log_view: ViewportController::new(log_height),
            status: PanelStatus::Idle,
        }
    }

    /// Merged lines currently on screen.
    #[must_use]
    pub fn visible_lines(&self) -> &[MergedLine] {
        let range = self.log_view.visible_range();
        self.log_lines.get(range).unwrap_or_default()
    }
}

impl RefreshTarget for Panels {
    fn show_metadata(&mut self, entity: &str, metadata: Metadata) {
        self.metadata = Some((entity.to_string(), metadata));
    }

    fn reset_logs(&mut self) {
        self.log_lines.clear();
        self.log_view.reset();
    }

    fn append_logs(&mut self, lines: Vec<MergedLine>) {
        let added = lines.len();
        self.log_lines.extend(lines);
        self.log_view.append(added);
        self.status = PanelStatus::Ready;
    }

    fn refresh_failed(&mut self, entity: &str, stage: RefreshStage, error: &LlvError) {
        self.status = PanelStatus::Failed {
            entity: entity.to_string(),
            stage,
            message: error.to_string(),
        };
    }
}

// ──────────────────── model ────────────────────

/// Result of applying one worker outcome, handed to the runtime for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleRecord {
    pub entity: String,
    pub generation: u64,
    pub status: CycleStatus,
    pub elapsed: Duration,
}

/// Complete dashboard state.
#[derive(Debug, Clone)]
pub struct DashboardModel {
    /// Filtered, sorted function names.
    pub entities: Vec<String>,
    /// Cursor and scroll position of the function list.
    pub entity_view: ViewportController,
    pub focus: Focus,
    pub selection: SelectionController,
    pub panels: Panels,
    /// Ticket of the refresh the worker is running, if any.
    pub in_flight: Option<RefreshTicket>,
    pub terminal_size: (u16, u16),
    pub settings: DashboardSettings,
    pub tick: u64,
    pub quit: bool,
}

impl DashboardModel {
    #[must_use]
    pub fn new(entities: Vec<String>, settings: DashboardSettings, terminal_size: (u16, u16)) -> Self {
        let mut model = Self {
            entity_view: ViewportController::without_autoscroll(1),
            entities,
            focus: Focus::default(),
            selection: SelectionController::new(),
            panels: Panels::new(1),
            in_flight: None,
            terminal_size,
            settings,
            tick: 0,
            quit: false,
        };
        model.entity_view.set_total_lines(model.entities.len());
        model.sync_viewports();
        model
    }

    /// Panel rectangles for the current terminal size.
    #[must_use]
    pub fn layout(&self) -> DashboardLayout {
        let (cols, rows) = self.terminal_size;
        build_layout(
            cols,
            rows,
            self.settings.side_width,
            self.settings.metadata_rows,
        )
    }

    /// Re-derive both viewports' visible heights from the layout, keeping the
    /// list cursor on screen.
    pub fn sync_viewports(&mut self) {
        let layout = self.layout();
        self.entity_view
            .set_visible_height(usize::from(layout.entities.content_height()));
        self.entity_view.reveal_cursor();
        self.panels
            .log_view
            .set_visible_height(usize::from(layout.logs.content_height()));
    }

    /// Function under the list cursor.
    #[must_use]
    pub fn cursor_entity(&self) -> Option<&str> {
        self.entities
            .get(self.entity_view.state().cursor)
            .map(String::as_str)
    }

    /// Whether a refresh for the current selection is still running.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|ticket| self.selection.is_current(ticket))
    }
}

// ──────────────────── messages ────────────────────

/// Events consumed by the update function.
#[derive(Debug)]
pub enum DashboardMsg {
    /// Periodic timer tick.
    Tick,
    Key(Key),
    Resize { cols: u16, rows: u16 },
    /// The refresh worker finished a cycle.
    RefreshLoaded(Box<RefreshOutcome>),
}

/// Side-effects requested by the update function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardCmd {
    /// No side-effect.
    None,
    /// Terminate the event loop.
    Quit,
    /// Hand the I/O half of a refresh cycle to the worker.
    StartRefresh(RefreshTicket),
    /// Record the result of an applied (or discarded) cycle.
    RecordCycle(CycleRecord),
}
