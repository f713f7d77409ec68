//! Activity logging: a shared handle over the JSONL writer.

pub mod jsonl;

use std::path::PathBuf;

use parking_lot::Mutex;

use self::jsonl::{JsonlConfig, JsonlWriter, LogEntry};
use crate::core::config::Config;
use crate::core::paths::fallback_activity_log;

/// Thread-safe activity log. A disabled log accepts and drops entries.
pub struct ActivityLog {
    writer: Option<Mutex<JsonlWriter>>,
}

impl std::fmt::Debug for ActivityLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityLog")
            .field("state", &self.state())
            .finish()
    }
}

impl ActivityLog {
    /// Open the log described by `config`, or a disabled log when logging is
    /// turned off.
    #[must_use]
    pub fn open(config: &Config) -> Self {
        if !config.logging.enabled {
            return Self::disabled();
        }
        Self::open_at(
            config.paths.activity_log.clone(),
            Some(fallback_activity_log()),
            config.logging.max_size_bytes,
            config.logging.max_rotated_files,
        )
    }

    /// Log at an explicit path, bypassing the config.
    #[must_use]
    pub fn open_at(
        path: PathBuf,
        fallback_path: Option<PathBuf>,
        max_size_bytes: u64,
        max_rotated_files: u32,
    ) -> Self {
        let writer = JsonlWriter::open(JsonlConfig {
            path,
            fallback_path,
            max_size_bytes,
            max_rotated_files,
        });
        Self {
            writer: Some(Mutex::new(writer)),
        }
    }

    /// Handle that drops every entry.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { writer: None }
    }

    /// Append `entry`. Write failures degrade the writer and are not reported.
    pub fn record(&self, entry: &LogEntry) {
        if let Some(writer) = &self.writer {
            writer.lock().write_entry(entry);
        }
    }

    /// Writer degradation state, `"disabled"` when logging is off.
    #[must_use]
    pub fn state(&self) -> &'static str {
        self.writer
            .as_ref()
            .map_or("disabled", |writer| writer.lock().state())
    }
}
