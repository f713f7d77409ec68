//! Merge of a function's current log streams into one presentable sequence.
//!
//! Streams arrive most-recent-first. Their events are concatenated with the
//! older stream's events first, each stream keeping its own arrival order.
//! There is no cross-stream sort: timestamps can step backwards at a stream
//! boundary when two streams overlap in time.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::classify::{LineCategory, classify};
use crate::core::errors::Result;
use crate::source::{LogSource, LogStreamRef, MAX_CURRENT_STREAMS, RawEvent};

/// One normalized, classified log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedLine {
    /// Epoch seconds.
    pub timestamp: i64,
    /// Message as delivered, before display sanitizing.
    pub text: String,
    /// Presentation category from [`classify`].
    pub category: LineCategory,
}

impl MergedLine {
    /// Normalize a raw event, classifying its message.
    #[must_use]
    pub fn from_event(event: RawEvent) -> Self {
        let category = classify(&event.message);
        Self {
            timestamp: event.timestamp,
            text: event.message,
            category,
        }
    }
}

/// Result of one merge, with the streams that contributed to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Streams read, most-recent-first.
    pub streams: Vec<LogStreamRef>,
    /// Merged lines, older stream first.
    pub lines: Vec<MergedLine>,
}

/// Pulls the current streams of an entity from a [`LogSource`] and merges them.
#[derive(Clone)]
pub struct LogMerger {
    source: Arc<dyn LogSource>,
}

impl std::fmt::Debug for LogMerger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogMerger").finish_non_exhaustive()
    }
}

impl LogMerger {
    /// Merger reading from `source`.
    #[must_use]
    pub fn new(source: Arc<dyn LogSource>) -> Self {
        Self { source }
    }

    /// Merged lines for `entity`.
    ///
    /// Issues one `list_streams` call and one `fetch_events` call per stream.
    /// The first failure aborts the merge and nothing fetched so far is
    /// returned.
    pub fn merge(&self, entity: &str) -> Result<Vec<MergedLine>> {
        self.merge_report(entity).map(|report| report.lines)
    }

    /// Like [`merge`](Self::merge) but also reports the contributing streams.
    pub fn merge_report(&self, entity: &str) -> Result<MergeReport> {
        let mut streams = self.source.list_streams(entity)?;
        streams.truncate(MAX_CURRENT_STREAMS);

        let mut per_stream = Vec::with_capacity(streams.len());
        for stream in &streams {
            per_stream.push(self.source.fetch_events(stream)?);
        }

        Ok(MergeReport {
            lines: concat_oldest_first(per_stream),
            streams,
        })
    }
}

/// Concatenate per-stream events given most-recent-first, oldest stream first.
#[must_use]
pub fn concat_oldest_first(most_recent_first: Vec<Vec<RawEvent>>) -> Vec<MergedLine> {
    let total = most_recent_first.iter().map(Vec::len).sum();
    let mut lines = Vec::with_capacity(total);
    for events in most_recent_first.into_iter().rev() {
        lines.extend(events.into_iter().map(MergedLine::from_event));
    }
    lines
}
