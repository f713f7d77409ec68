//! Backend seams: where function names, metadata, and raw log events come from.
//!
//! Two narrow traits model the external collaborators:
//! - [`EntityDirectory`] enumerates functions and describes their configuration.
//! - [`LogSource`] discovers a function's current log streams and reads them.
//!
//! [`aws_cli::AwsCliBackend`] is the production implementation of both;
//! [`memory::MemoryBackend`] is the in-memory fake used by tests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::errors::Result;

pub mod aws_cli;
pub mod memory;

/// Only this many most-recently-active streams are considered current.
pub const MAX_CURRENT_STREAMS: usize = 2;

/// Display fields for one function, keyed (and therefore sorted) by label.
pub type Metadata = BTreeMap<String, String>;

/// Handle to one partition of a function's log history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStreamRef {
    /// Log group the stream belongs to.
    pub group: String,
    /// Stream name within the group.
    pub name: String,
    /// Last event time in epoch seconds, when the backend reports it.
    pub last_event_at: Option<i64>,
}

/// One log record as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Epoch seconds.
    pub timestamp: i64,
    /// Message text, trailing newline stripped.
    pub message: String,
}

impl RawEvent {
    /// Event at `timestamp` epoch seconds.
    #[must_use]
    pub fn new(timestamp: i64, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
        }
    }
}

/// Discovers and reads the log streams of a named function.
///
/// Implementations perform no retries or caching. An entity that never logged
/// yields an empty stream list, not an error.
pub trait LogSource: Send + Sync {
    /// Current streams, most-recently-active first, at most
    /// [`MAX_CURRENT_STREAMS`] entries.
    fn list_streams(&self, entity: &str) -> Result<Vec<LogStreamRef>>;

    /// Events of one stream in backend-native order.
    fn fetch_events(&self, stream: &LogStreamRef) -> Result<Vec<RawEvent>>;

    /// Cheap probe used at startup to fail fast when the backend is unreachable.
    fn check_connectivity(&self) -> Result<()> {
        Ok(())
    }
}

/// Supplies the function list and per-function configuration metadata.
pub trait EntityDirectory: Send + Sync {
    /// Every function name visible to the backend, unfiltered.
    fn list_entities(&self) -> Result<Vec<String>>;

    /// Display fields for one function. Missing values are empty strings.
    fn get_metadata(&self, entity: &str) -> Result<Metadata>;
}

/// Keep names containing `filter` (case-sensitive), sorted ascending.
///
/// An absent or empty filter keeps everything.
#[must_use]
pub fn filter_entities(names: Vec<String>, filter: Option<&str>) -> Vec<String> {
    let mut kept: Vec<String> = match filter {
        Some(needle) if !needle.is_empty() => names
            .into_iter()
            .filter(|name| name.contains(needle))
            .collect(),
        _ => names,
    };
    kept.sort();
    kept
}

/// Startup sequence: probe the log backend, then load and filter the function
/// list. Any failure here is fatal for the session.
///
/// # Errors
/// Propagates the first backend failure.
pub fn startup_entities(
    directory: &dyn EntityDirectory,
    source: &dyn LogSource,
    filter: Option<&str>,
) -> Result<Vec<String>> {
    source.check_connectivity()?;
    let names = directory.list_entities()?;
    Ok(filter_entities(names, filter))
}
