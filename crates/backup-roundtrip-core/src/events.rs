// crates/backup-roundtrip-core/src/events.rs
// ============================================================================
// Module: Round-Trip Run Events
// Description: Structured JSON-lines events emitted while a run progresses.
// Purpose: Record stage transitions and diagnostics without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every stage transition, settle wait, and teardown action is reported to a
//! [`RunLog`]. Sinks serialize events as one JSON object per line so runs can
//! be replayed or grepped after the fact. Sinks never fail the run: write
//! errors are dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use serde_json::Value;

use crate::core::PipelineStage;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Severity of a run event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    /// Routine progress.
    Info,
    /// Unexpected but tolerated.
    Warn,
    /// Failure.
    Error,
}

/// One structured run event.
#[derive(Debug, Clone, Serialize)]
pub struct RunEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Severity.
    pub level: EventLevel,
    /// Stage the pipeline was in.
    pub stage: PipelineStage,
    /// Human-readable message.
    pub message: String,
    /// Optional structured detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl RunEvent {
    /// Creates an info-level event stamped with the current time.
    #[must_use]
    pub fn info(event: &'static str, stage: PipelineStage, message: impl Into<String>) -> Self {
        Self::new(EventLevel::Info, event, stage, message)
    }

    /// Creates a warn-level event stamped with the current time.
    #[must_use]
    pub fn warn(event: &'static str, stage: PipelineStage, message: impl Into<String>) -> Self {
        Self::new(EventLevel::Warn, event, stage, message)
    }

    /// Creates an error-level event stamped with the current time.
    #[must_use]
    pub fn error(event: &'static str, stage: PipelineStage, message: impl Into<String>) -> Self {
        Self::new(EventLevel::Error, event, stage, message)
    }

    /// Attaches structured detail.
    #[must_use]
    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Creates an event with a consistent timestamp.
    fn new(
        level: EventLevel,
        event: &'static str,
        stage: PipelineStage,
        message: impl Into<String>,
    ) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event,
            timestamp_ms,
            level,
            stage,
            message: message.into(),
            detail: None,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Sink for run events.
pub trait RunLog: Send + Sync {
    /// Records an event.
    fn record(&self, event: &RunEvent);
}

/// Sink that discards events.
pub struct NoopRunLog;

impl RunLog for NoopRunLog {
    fn record(&self, _event: &RunEvent) {}
}

/// Sink that writes JSON lines to stderr.
pub struct StderrRunLog;

impl RunLog for StderrRunLog {
    fn record(&self, event: &RunEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Sink that appends JSON lines to a file.
pub struct FileRunLog {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileRunLog {
    /// Opens the log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl RunLog for FileRunLog {
    fn record(&self, event: &RunEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Sink that retains events in memory.
#[derive(Default)]
pub struct MemoryRunLog {
    /// Captured events.
    events: Mutex<Vec<RunEvent>>,
}

impl MemoryRunLog {
    /// Creates an empty in-memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every captured event.
    #[must_use]
    pub fn events(&self) -> Vec<RunEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    /// Returns the identifiers of captured events in order.
    #[must_use]
    pub fn event_names(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .map(|events| events.iter().map(|event| event.event).collect())
            .unwrap_or_default()
    }
}

impl RunLog for MemoryRunLog {
    fn record(&self, event: &RunEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Fans events out to several sinks.
pub struct TeeRunLog {
    /// Downstream sinks.
    sinks: Vec<Box<dyn RunLog>>,
}

impl TeeRunLog {
    /// Creates a fan-out sink.
    #[must_use]
    pub fn new(sinks: Vec<Box<dyn RunLog>>) -> Self {
        Self {
            sinks,
        }
    }
}

impl RunLog for TeeRunLog {
    fn record(&self, event: &RunEvent) {
        for sink in &self.sinks {
            sink.record(event);
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
