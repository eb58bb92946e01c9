//! Per-request access events and the sinks that record them.
//!
//! # Responsibilities
//! - Define the completion event recorded for instrumented routes
//! - Console sink: structured `tracing` event under the `access` target
//! - File sink: one JSON line per event, appended to a durable log
//!
//! # Design Decisions
//! - Sinks are side-effect only; a failing write is logged, never surfaced
//!   to the request
//! - The file sink holds a mutex around the file and writes each line with a
//!   single `write_all`, so concurrent requests never interleave
//! - The file is opened lazily, only when some route asks for it
//! - The file sink appends synchronously on the request's task: the line is
//!   on disk before the response leaves, at the cost of one small blocking
//!   write per observed request

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::routing::descriptor::LogMode;

/// One completed request on an instrumented route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessEvent {
    pub method: String,
    pub url: String,
    pub status_code: u16,
    pub duration_ms: u64,
}

impl AccessEvent {
    /// Build an event timed from `started` until now.
    pub fn finished(method: &str, url: &str, status_code: u16, started: Instant) -> Self {
        Self {
            method: method.to_string(),
            url: url.to_string(),
            status_code,
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }
}

/// Destination for access events.
pub trait AccessSink: Send + Sync + std::fmt::Debug {
    fn record(&self, event: &AccessEvent);
}

/// Interactive sink: emits a structured `tracing` event.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl AccessSink for ConsoleSink {
    fn record(&self, event: &AccessEvent) {
        tracing::info!(
            target: "access",
            method = %event.method,
            url = %event.url,
            status = event.status_code,
            duration_ms = event.duration_ms,
            "{} {} {} {}ms",
            event.method,
            event.url,
            event.status_code,
            event.duration_ms
        );
    }
}

#[derive(Serialize)]
struct FileLine<'a> {
    timestamp_ms: u128,
    #[serde(flatten)]
    event: &'a AccessEvent,
}

/// Durable sink: appends one JSON object per line.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    /// Open (or create) the log file in append mode.
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing::info!(path = %path.display(), "Access log opened");
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AccessSink for FileSink {
    fn record(&self, event: &AccessEvent) {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let mut line = match serde_json::to_vec(&FileLine { timestamp_ms, event }) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode access event");
                return;
            }
        };
        line.push(b'\n');

        let mut file = match self.file.lock() {
            Ok(file) => file,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = file.write_all(&line).and_then(|_| file.flush()) {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to write access event");
        }
    }
}

/// Keeps events in memory. Useful when embedding or testing.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<AccessEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AccessEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AccessSink for MemorySink {
    fn record(&self, event: &AccessEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}

enum FileTarget {
    Path(PathBuf),
    Opened(Arc<dyn AccessSink>),
}

/// The sinks a route may be composed with, one per non-`None` log mode.
pub struct AccessSinks {
    console: Arc<dyn AccessSink>,
    file: FileTarget,
}

impl AccessSinks {
    /// Console sink plus a file sink opened at `access_log` on first use.
    pub fn new(access_log: impl Into<PathBuf>) -> Self {
        Self {
            console: Arc::new(ConsoleSink),
            file: FileTarget::Path(access_log.into()),
        }
    }

    /// Use already-built sinks for both modes.
    pub fn with_sinks(console: Arc<dyn AccessSink>, file: Arc<dyn AccessSink>) -> Self {
        Self {
            console,
            file: FileTarget::Opened(file),
        }
    }

    /// Resolve the sink for a log mode, opening the file sink if needed.
    pub fn sink_for(&mut self, mode: LogMode) -> io::Result<Option<Arc<dyn AccessSink>>> {
        match mode {
            LogMode::None => Ok(None),
            LogMode::Console => Ok(Some(self.console.clone())),
            LogMode::File => {
                if let FileTarget::Path(path) = &self.file {
                    let sink: Arc<dyn AccessSink> = Arc::new(FileSink::open(path)?);
                    self.file = FileTarget::Opened(sink);
                }
                match &self.file {
                    FileTarget::Opened(sink) => Ok(Some(sink.clone())),
                    FileTarget::Path(_) => Ok(None),
                }
            }
        }
    }
}

impl std::fmt::Debug for AccessSinks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let file = match &self.file {
            FileTarget::Path(path) => format!("unopened({})", path.display()),
            FileTarget::Opened(sink) => format!("{sink:?}"),
        };
        f.debug_struct("AccessSinks")
            .field("console", &self.console)
            .field("file", &file)
            .finish()
    }
}
