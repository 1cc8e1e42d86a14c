//! Append-only log backends that journey progress is reconstructed from.
//!
//! The [`LogSink`] trait decouples the journey commands from where entries
//! live. The file sink is the durable backend; the memory sink backs tests and
//! embedders that own persistence themselves. The backend is picked from
//! configuration through [`open_log_sink`].

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::io::config::LogBackend;

/// Abstraction over append-only log stores.
pub trait LogSink {
    /// Append one entry. Earlier entries are never rewritten.
    fn append(&self, entry: &str) -> Result<()>;

    /// Every entry in append order.
    fn read_all(&self) -> Result<Vec<String>>;

    /// Human-readable name used in messages (a path, or `memory`).
    fn describe(&self) -> String;
}

/// One line of a file-backed log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogRecord {
    /// RFC 3339 UTC timestamp of the append.
    pub recorded_at: String,
    pub entry: String,
}

/// JSON Lines log file, one [`LogRecord`] per line.
///
/// Lines written by other tools that are not records are read back verbatim,
/// so plain-text logs work too.
#[derive(Debug, Clone)]
pub struct FileLogSink {
    path: PathBuf,
}

impl FileLogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileLogSink {
    fn append(&self, entry: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create log directory {}", parent.display()))?;
        }
        let record = LogRecord {
            recorded_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            entry: entry.to_string(),
        };
        let mut line = serde_json::to_string(&record).context("serialize log record")?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open log {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("append log {}", self.path.display()))?;
        file.flush()
            .with_context(|| format!("flush log {}", self.path.display()))?;
        debug!(path = %self.path.display(), "appended log entry");
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        // Other writers may share the file; undecodable bytes must not fail reads.
        let bytes =
            fs::read(&self.path).with_context(|| format!("read log {}", self.path.display()))?;
        let entries = bytes
            .split(|byte| *byte == b'\n')
            .map(|raw| String::from_utf8_lossy(raw.strip_suffix(b"\r").unwrap_or(raw)))
            .filter(|line| !line.trim().is_empty())
            .map(|line| match serde_json::from_str::<LogRecord>(&line) {
                Ok(record) => record.entry,
                Err(_) => line.into_owned(),
            })
            .collect::<Vec<_>>();
        debug!(path = %self.path.display(), entries = entries.len(), "read log");
        Ok(entries)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process log, mostly for tests.
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    entries: Mutex<Vec<String>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink pre-filled with `entries`.
    pub fn with_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: Mutex::new(entries.into_iter().map(Into::into).collect()),
        }
    }
}

impl LogSink for MemoryLogSink {
    fn append(&self, entry: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| anyhow!("memory log lock poisoned"))?
            .push(entry.to_string());
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<String>> {
        Ok(self
            .entries
            .lock()
            .map_err(|_| anyhow!("memory log lock poisoned"))?
            .clone())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Build the configured backend for `target` (ignored by the memory backend).
pub fn open_log_sink(backend: LogBackend, target: &Path) -> Box<dyn LogSink> {
    match backend {
        LogBackend::File => Box::new(FileLogSink::new(target)),
        LogBackend::Memory => Box::new(MemoryLogSink::new()),
    }
}
