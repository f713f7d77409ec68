//! Selection ownership and the refresh cycle it triggers.
//!
//! Activating a function runs one refresh cycle: metadata fetch, log viewport
//! reset, log merge. The cycle is split in two halves so the I/O can run off
//! the input thread:
//!
//! 1. [`RefreshContext::run`] performs the backend calls and yields a
//!    [`RefreshOutcome`] (safe to run on a worker thread).
//! 2. [`SelectionController::apply_outcome`] applies it to the panels on the
//!    state-owning thread, in cycle order, and drops outcomes for superseded
//!    activations.

#![allow(missing_docs)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::errors::LlvError;
use crate::logs::merger::{LogMerger, MergeReport, MergedLine};
use crate::source::{EntityDirectory, LogSource, Metadata};

/// Identifies one activation. Only the newest ticket's outcome is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTicket {
    pub entity: String,
    pub generation: u64,
}

/// Which step of the cycle failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStage {
    Metadata,
    Logs,
}

impl RefreshStage {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::Logs => "logs",
        }
    }
}

/// Backend results of one cycle.
#[derive(Debug)]
pub enum CycleResult {
    /// Metadata could not be fetched; logs were not attempted.
    MetadataFailed(LlvError),
    /// Metadata arrived but the merge failed.
    LogsFailed { metadata: Metadata, error: LlvError },
    Loaded {
        metadata: Metadata,
        report: MergeReport,
    },
}

/// A finished cycle, ready to apply.
#[derive(Debug)]
pub struct RefreshOutcome {
    pub ticket: RefreshTicket,
    pub result: CycleResult,
    pub elapsed: Duration,
}

/// How applying an outcome went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleStatus {
    Completed {
        streams: usize,
        lines: usize,
    },
    Failed {
        stage: RefreshStage,
        error_code: &'static str,
        message: String,
    },
    /// A newer activation superseded this one; nothing was applied.
    Stale,
}

/// Panels a refresh cycle writes into.
pub trait RefreshTarget {
    /// Replace the metadata panel.
    fn show_metadata(&mut self, entity: &str, metadata: Metadata);
    /// Clear the log buffer and reset its viewport.
    fn reset_logs(&mut self);
    /// Append merged lines to the log buffer.
    fn append_logs(&mut self, lines: Vec<MergedLine>);
    /// Surface a failed step without touching content already rendered.
    fn refresh_failed(&mut self, entity: &str, stage: RefreshStage, error: &LlvError);
}

/// Backend handles needed to run a refresh cycle. Cheap to clone.
#[derive(Clone)]
pub struct RefreshContext {
    directory: Arc<dyn EntityDirectory>,
    merger: LogMerger,
}

impl std::fmt::Debug for RefreshContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshContext")
            .field("merger", &self.merger)
            .finish_non_exhaustive()
    }
}

impl RefreshContext {
    #[must_use]
    pub fn new(directory: Arc<dyn EntityDirectory>, source: Arc<dyn LogSource>) -> Self {
        Self {
            directory,
            merger: LogMerger::new(source),
        }
    }

    /// Perform the backend half of a cycle. Stops at the first failure.
    #[must_use]
    pub fn run(&self, ticket: RefreshTicket) -> RefreshOutcome {
        let started = Instant::now();
        let result = match self.directory.get_metadata(&ticket.entity) {
            Err(error) => CycleResult::MetadataFailed(error),
            Ok(metadata) => match self.merger.merge_report(&ticket.entity) {
                Ok(report) => CycleResult::Loaded { metadata, report },
                Err(error) => CycleResult::LogsFailed { metadata, error },
            },
        };
        RefreshOutcome {
            ticket,
            result,
            elapsed: started.elapsed(),
        }
    }
}

/// Owns the selected function; the only trigger of refresh cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionController {
    selected: Option<String>,
    generation: u64,
}

impl SelectionController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected function, `None` before the first activation.
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Select `entity` and issue the ticket for its refresh cycle.
    ///
    /// Re-activating the same function issues a fresh ticket; the cycle reruns.
    pub fn activate(&mut self, entity: &str) -> RefreshTicket {
        self.selected = Some(entity.to_string());
        self.generation = self.generation.wrapping_add(1);
        RefreshTicket {
            entity: entity.to_string(),
            generation: self.generation,
        }
    }

    /// Whether `ticket` belongs to the latest activation.
    #[must_use]
    pub fn is_current(&self, ticket: &RefreshTicket) -> bool {
        ticket.generation == self.generation && self.selected() == Some(ticket.entity.as_str())
    }

    /// Apply a finished cycle: metadata, then viewport reset, then logs.
    ///
    /// A metadata failure leaves the log panel untouched. A log failure leaves
    /// the new metadata in place and an empty log buffer.
    pub fn apply_outcome<T>(&self, outcome: RefreshOutcome, target: &mut T) -> CycleStatus
    where
        T: RefreshTarget + ?Sized,
    {
        if !self.is_current(&outcome.ticket) {
            return CycleStatus::Stale;
        }
        let entity = outcome.ticket.entity.as_str();

        let (metadata, logs) = match outcome.result {
            CycleResult::MetadataFailed(error) => {
                target.refresh_failed(entity, RefreshStage::Metadata, &error);
                return failed(RefreshStage::Metadata, &error);
            }
            CycleResult::LogsFailed { metadata, error } => (metadata, Err(error)),
            CycleResult::Loaded { metadata, report } => (metadata, Ok(report)),
        };

        target.show_metadata(entity, metadata);
        target.reset_logs();

        match logs {
            Ok(report) => {
                let streams = report.streams.len();
                let lines = report.lines.len();
                target.append_logs(report.lines);
                CycleStatus::Completed { streams, lines }
            }
            Err(error) => {
                target.refresh_failed(entity, RefreshStage::Logs, &error);
                failed(RefreshStage::Logs, &error)
            }
        }
    }

    /// Run a whole cycle synchronously on the calling thread.
    pub fn on_activate<T>(
        &mut self,
        entity: &str,
        context: &RefreshContext,
        target: &mut T,
    ) -> CycleStatus
    where
        T: RefreshTarget + ?Sized,
    {
        let ticket = self.activate(entity);
        let outcome = context.run(ticket);
        self.apply_outcome(outcome, target)
    }
}

fn failed(stage: RefreshStage, error: &LlvError) -> CycleStatus {
    CycleStatus::Failed {
        stage,
        error_code: error.code(),
        message: error.to_string(),
    }
}
