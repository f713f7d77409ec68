//! In-memory backend for tests and headless runs.
//!
//! Behaves like the production backend (most-recent-first stream ordering,
//! bounded stream discovery) and records every call so tests can assert on
//! call counts. Failures can be injected per operation.

#![allow(missing_docs)]

use std::collections::{BTreeMap, HashSet};

use parking_lot::Mutex;

use super::{EntityDirectory, LogSource, LogStreamRef, MAX_CURRENT_STREAMS, Metadata, RawEvent};
use crate::core::errors::{LlvError, Result};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    ListEntities,
    GetMetadata(String),
    ListStreams(String),
    FetchEvents(String),
}

#[derive(Debug, Clone, Default)]
struct FakeStream {
    name: String,
    last_event_at: i64,
    events: Vec<RawEvent>,
}

#[derive(Debug, Clone, Default)]
struct FakeEntity {
    metadata: Metadata,
    streams: Vec<FakeStream>,
}

#[derive(Debug, Default)]
struct Failures {
    entities: bool,
    metadata: HashSet<String>,
    list_streams: HashSet<String>,
    fetch: HashSet<String>,
}

/// Thread-safe fake implementing both [`EntityDirectory`] and [`LogSource`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entities: Mutex<BTreeMap<String, FakeEntity>>,
    failures: Mutex<Failures>,
    calls: Mutex<Vec<BackendCall>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function with its metadata fields.
    #[must_use]
    pub fn with_entity(self, name: &str, metadata: &[(&str, &str)]) -> Self {
        let fields = metadata
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        self.entities
            .lock()
            .entry(name.to_string())
            .or_default()
            .metadata = fields;
        self
    }

    /// Register a stream for `entity`; the entity is created if missing.
    #[must_use]
    pub fn with_stream(
        self,
        entity: &str,
        stream: &str,
        last_event_at: i64,
        events: Vec<RawEvent>,
    ) -> Self {
        self.entities
            .lock()
            .entry(entity.to_string())
            .or_default()
            .streams
            .push(FakeStream {
                name: stream.to_string(),
                last_event_at,
                events,
            });
        self
    }

    /// Append an event to an existing stream, simulating new log activity.
    pub fn push_event(&self, entity: &str, stream: &str, event: RawEvent) {
        let mut entities = self.entities.lock();
        if let Some(fake) = entities
            .get_mut(entity)
            .and_then(|e| e.streams.iter_mut().find(|s| s.name == stream))
        {
            fake.last_event_at = fake.last_event_at.max(event.timestamp);
            fake.events.push(event);
        }
    }

    pub fn fail_list_entities(&self, fail: bool) {
        self.failures.lock().entities = fail;
    }

    pub fn fail_metadata(&self, entity: &str) {
        self.failures.lock().metadata.insert(entity.to_string());
    }

    pub fn fail_list_streams(&self, entity: &str) {
        self.failures.lock().list_streams.insert(entity.to_string());
    }

    pub fn fail_fetch(&self, stream: &str) {
        self.failures.lock().fetch.insert(stream.to_string());
    }

    /// Remove every injected failure.
    pub fn heal(&self) {
        *self.failures.lock() = Failures::default();
    }

    /// Snapshot of calls made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().clone()
    }

    /// Number of `fetch_events` calls made so far.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, BackendCall::FetchEvents(_)))
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().push(call);
    }
}

fn group_for(entity: &str) -> String {
    format!("/aws/lambda/{entity}")
}

impl EntityDirectory for MemoryBackend {
    fn list_entities(&self) -> Result<Vec<String>> {
        self.record(BackendCall::ListEntities);
        if self.failures.lock().entities {
            return Err(LlvError::source_unavailable(
                "list_entities",
                "injected failure",
            ));
        }
        Ok(self.entities.lock().keys().cloned().collect())
    }

    fn get_metadata(&self, entity: &str) -> Result<Metadata> {
        self.record(BackendCall::GetMetadata(entity.to_string()));
        if self.failures.lock().metadata.contains(entity) {
            return Err(LlvError::source_unavailable("get_metadata", "injected failure"));
        }
        Ok(self
            .entities
            .lock()
            .get(entity)
            .map(|e| e.metadata.clone())
            .unwrap_or_default())
    }
}

impl LogSource for MemoryBackend {
    fn list_streams(&self, entity: &str) -> Result<Vec<LogStreamRef>> {
        self.record(BackendCall::ListStreams(entity.to_string()));
        if self.failures.lock().list_streams.contains(entity) {
            return Err(LlvError::source_unavailable("list_streams", "injected failure"));
        }
        let entities = self.entities.lock();
        let Some(fake) = entities.get(entity) else {
            return Ok(Vec::new());
        };
        let mut streams: Vec<&FakeStream> = fake.streams.iter().collect();
        // Stable: equal activity keeps registration order.
        streams.sort_by(|a, b| b.last_event_at.cmp(&a.last_event_at));
        Ok(streams
            .into_iter()
            .take(MAX_CURRENT_STREAMS)
            .map(|s| LogStreamRef {
                group: group_for(entity),
                name: s.name.clone(),
                last_event_at: Some(s.last_event_at),
            })
            .collect())
    }

    fn fetch_events(&self, stream: &LogStreamRef) -> Result<Vec<RawEvent>> {
        self.record(BackendCall::FetchEvents(stream.name.clone()));
        if self.failures.lock().fetch.contains(&stream.name) {
            return Err(LlvError::source_unavailable("fetch_events", "injected failure"));
        }
        let entities = self.entities.lock();
        Ok(entities
            .iter()
            .filter(|(name, _)| group_for(name) == stream.group)
            .flat_map(|(_, e)| e.streams.iter())
            .find(|s| s.name == stream.name)
            .map(|s| s.events.clone())
            .unwrap_or_default())
    }
}
