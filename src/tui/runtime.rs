//! Dashboard runtime: event loop, refresh worker, and command execution.
//!
//! The loop thread owns the model. Refresh I/O runs on one worker thread that
//! receives tickets and reports outcomes over crossbeam channels; the loop
//! drains outcomes between input polls and applies each in a single update.

#![allow(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use super::model::{CycleRecord, DashboardSettings};
use super::selection::{CycleStatus, RefreshContext, RefreshOutcome, RefreshStage, RefreshTicket};
use crate::core::config::DashboardConfig;
use crate::core::errors::{LlvError, Result};
use crate::logger::jsonl::{EventType, LogEntry, Severity};

/// Everything the event loop needs besides backend handles.
#[derive(Debug, Clone)]
pub struct DashboardRuntimeConfig {
    pub entities: Vec<String>,
    pub settings: DashboardSettings,
    /// Input poll interval.
    pub tick: Duration,
}

impl DashboardRuntimeConfig {
    #[must_use]
    pub fn new(entities: Vec<String>, config: &DashboardConfig) -> Self {
        Self {
            entities,
            settings: DashboardSettings::from(config),
            tick: config.tick(),
        }
    }
}

// ──────────────────── refresh worker ────────────────────

/// Flags shared between the worker thread and its owner.
#[derive(Debug, Default)]
struct WorkerFlags {
    /// Set before a cycle starts, cleared when it finishes.
    busy: AtomicBool,
    shutdown: AtomicBool,
}

/// Background thread running the I/O half of refresh cycles.
///
/// Dropping the worker never waits on backend calls: an idle worker is
/// joined, a busy one is detached and exits once its cycle returns.
pub struct RefreshWorker {
    tickets: Option<Sender<RefreshTicket>>,
    outcomes: Receiver<RefreshOutcome>,
    handle: Option<JoinHandle<()>>,
    flags: Arc<WorkerFlags>,
}

impl RefreshWorker {
    /// Start the worker thread.
    ///
    /// # Errors
    /// Returns `Runtime` when the thread cannot be spawned.
    pub fn spawn(context: RefreshContext) -> Result<Self> {
        let (ticket_tx, ticket_rx) = crossbeam_channel::unbounded::<RefreshTicket>();
        let (outcome_tx, outcome_rx) = crossbeam_channel::unbounded::<RefreshOutcome>();
        let flags = Arc::new(WorkerFlags::default());
        let worker_flags = Arc::clone(&flags);

        let handle = thread::Builder::new()
            .name("llv-refresh".to_string())
            .spawn(move || worker_loop(&context, &ticket_rx, &outcome_tx, &worker_flags))
            .map_err(|e| LlvError::Runtime {
                details: format!("failed to spawn refresh worker: {e}"),
            })?;

        Ok(Self {
            tickets: Some(ticket_tx),
            outcomes: outcome_rx,
            handle: Some(handle),
            flags,
        })
    }

    /// Queue a refresh cycle.
    ///
    /// # Errors
    /// Returns `ChannelClosed` when the worker has exited.
    pub fn submit(&self, ticket: RefreshTicket) -> Result<()> {
        self.tickets
            .as_ref()
            .ok_or(LlvError::ChannelClosed {
                component: "refresh_worker",
            })?
            .send(ticket)
            .map_err(|_| LlvError::ChannelClosed {
                component: "refresh_worker",
            })
    }

    /// A finished outcome, if one is ready.
    #[must_use]
    pub fn try_recv(&self) -> Option<RefreshOutcome> {
        self.outcomes.try_recv().ok()
    }

    /// Wait up to `timeout` for a finished outcome.
    #[must_use]
    pub fn recv_timeout(&self, timeout: Duration) -> Option<RefreshOutcome> {
        self.outcomes.recv_timeout(timeout).ok()
    }
}

impl Drop for RefreshWorker {
    fn drop(&mut self) {
        // The worker reads `shutdown` only after raising `busy`, so an idle
        // reading here means it will exit without starting another cycle.
        self.flags.shutdown.store(true, Ordering::SeqCst);
        self.tickets = None;
        let busy = self.flags.busy.load(Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if !busy {
                let _ = handle.join();
            }
        }
    }
}

fn worker_loop(
    context: &RefreshContext,
    tickets: &Receiver<RefreshTicket>,
    outcomes: &Sender<RefreshOutcome>,
    flags: &WorkerFlags,
) {
    while let Ok(mut ticket) = tickets.recv() {
        // Only the newest queued activation can still be current.
        while let Ok(newer) = tickets.try_recv() {
            ticket = newer;
        }
        flags.busy.store(true, Ordering::SeqCst);
        if flags.shutdown.load(Ordering::SeqCst) {
            break;
        }
        let outcome = context.run(ticket);
        flags.busy.store(false, Ordering::SeqCst);
        if outcomes.send(outcome).is_err() {
            break;
        }
    }
}

// ──────────────────── activity records ────────────────────

/// Activity log entries describing one applied (or discarded) cycle.
#[must_use]
pub fn cycle_entries(record: &CycleRecord) -> Vec<LogEntry> {
    let elapsed_ms = u64::try_from(record.elapsed.as_millis()).unwrap_or(u64::MAX);
    let base = |event, severity| {
        LogEntry::new(event, severity)
            .with_entity(record.entity.clone())
            .with_duration_ms(elapsed_ms)
    };

    match &record.status {
        CycleStatus::Completed { streams, lines } => vec![
            base(EventType::MetadataLoaded, Severity::Info),
            base(EventType::LogsMerged, Severity::Info).with_counts(Some(*streams), *lines),
        ],
        CycleStatus::Failed {
            stage,
            error_code,
            message,
        } => {
            let failed = base(EventType::RefreshFailed, Severity::Warning)
                .with_details(stage.label())
                .with_error(error_code, message.clone());
            match stage {
                RefreshStage::Metadata => vec![failed],
                RefreshStage::Logs => vec![base(EventType::MetadataLoaded, Severity::Info), failed],
            }
        }
        CycleStatus::Stale => vec![
            base(EventType::RefreshDiscarded, Severity::Info)
                .with_details(format!("generation {}", record.generation)),
        ],
    }
}

/// Activity log entry for a started cycle.
#[must_use]
pub fn refresh_start_entry(ticket: &RefreshTicket) -> LogEntry {
    LogEntry::info(EventType::RefreshStart)
        .with_entity(ticket.entity.clone())
        .with_details(format!("generation {}", ticket.generation))
}

// ──────────────────── event loop ────────────────────

#[cfg(feature = "tui")]
pub use self::event_loop::{map_key, run_dashboard};

#[cfg(feature = "tui")]
mod event_loop {
    use std::io::{self, Write};

    use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
    use crossterm::queue;
    use crossterm::terminal::{Clear, ClearType};

    use super::{DashboardRuntimeConfig, RefreshWorker, cycle_entries, refresh_start_entry};
    use crate::core::errors::{LlvError, Result};
    use crate::logger::ActivityLog;
    use crate::tui::input::Key;
    use crate::tui::model::{DashboardCmd, DashboardModel, DashboardMsg};
    use crate::tui::render::{compose_frame, paint};
    use crate::tui::selection::RefreshContext;
    use crate::tui::terminal_guard::TerminalGuard;
    use crate::tui::theme::ColorMode;
    use crate::tui::update::update;

    /// Run the dashboard until the user quits.
    ///
    /// # Errors
    /// Returns `Runtime` for terminal failures and `ChannelClosed` when the
    /// refresh worker dies. Backend failures never end the session.
    pub fn run_dashboard(
        config: DashboardRuntimeConfig,
        context: RefreshContext,
        log: &ActivityLog,
    ) -> Result<()> {
        let worker = RefreshWorker::spawn(context)?;
        let guard = TerminalGuard::new().map_err(terminal_error)?;
        let mut model = DashboardModel::new(
            config.entities.clone(),
            config.settings,
            TerminalGuard::terminal_size(),
        );
        let result = run_loop(&mut model, &config, &worker, log);
        drop(guard);
        result
    }

    fn run_loop(
        model: &mut DashboardModel,
        config: &DashboardRuntimeConfig,
        worker: &RefreshWorker,
        log: &ActivityLog,
    ) -> Result<()> {
        let mut stdout = io::stdout();
        let color = ColorMode::from_environment();
        draw(&mut stdout, model, color, true)?;

        loop {
            let mut dirty = false;
            let mut clear = false;

            while let Some(outcome) = worker.try_recv() {
                let cmd = update(model, DashboardMsg::RefreshLoaded(Box::new(outcome)));
                execute(cmd, worker, log)?;
                dirty = true;
            }

            if event::poll(config.tick).map_err(terminal_error)? {
                let msg = match event::read().map_err(terminal_error)? {
                    Event::Key(key) if key.kind != KeyEventKind::Release => {
                        Some(DashboardMsg::Key(map_key(key)))
                    }
                    Event::Resize(cols, rows) => {
                        clear = true;
                        Some(DashboardMsg::Resize { cols, rows })
                    }
                    _ => None,
                };
                if let Some(msg) = msg {
                    let cmd = update(model, msg);
                    if !execute(cmd, worker, log)? {
                        return Ok(());
                    }
                    dirty = true;
                }
            } else {
                update(model, DashboardMsg::Tick);
            }

            if dirty {
                draw(&mut stdout, model, color, clear)?;
            }
        }
    }

    /// Run a command. Returns `false` when the loop should stop.
    fn execute(cmd: DashboardCmd, worker: &RefreshWorker, log: &ActivityLog) -> Result<bool> {
        match cmd {
            DashboardCmd::None => {}
            DashboardCmd::Quit => return Ok(false),
            DashboardCmd::StartRefresh(ticket) => {
                log.record(&refresh_start_entry(&ticket));
                worker.submit(ticket)?;
            }
            DashboardCmd::RecordCycle(record) => {
                for entry in cycle_entries(&record) {
                    log.record(&entry);
                }
            }
        }
        Ok(true)
    }

    fn draw(
        out: &mut io::Stdout,
        model: &DashboardModel,
        color: ColorMode,
        clear: bool,
    ) -> Result<()> {
        if clear {
            queue!(out, Clear(ClearType::All)).map_err(terminal_error)?;
        }
        paint(out, &compose_frame(model), color).map_err(terminal_error)?;
        out.flush().map_err(terminal_error)
    }

    /// Translate a crossterm key event to a backend-neutral key.
    #[must_use]
    pub fn map_key(key: KeyEvent) -> Key {
        match key.code {
            KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Key::Ctrl(c.to_ascii_lowercase())
            }
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::Enter => Key::Enter,
            KeyCode::Tab => Key::Tab,
            KeyCode::BackTab => Key::BackTab,
            KeyCode::Esc => Key::Esc,
            _ => Key::Other,
        }
    }

    fn terminal_error(err: io::Error) -> LlvError {
        LlvError::Runtime {
            details: format!("terminal I/O failed: {err}"),
        }
    }
}
