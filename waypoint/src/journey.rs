//! Journey commands: `start`, `next`, `progress` and `reset`.
//!
//! A [`Journey`] pairs a persisted document with its path. It is never cached:
//! every command rebuilds it from the log, because the latest `START` entry
//! records which document is being traversed.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::core::log_entry::{LogEntry, Marker};
use crate::core::receipt::{ProgressReceipt, TraversalState};
use crate::core::reconstruct::{latest_start, reconstruct};
use crate::core::traversal::{completion_entry, end_entry, journey_state, next_piece};
use crate::document::SequenceDocument;
use crate::errors::WaypointError;
use crate::io::document_store::load_document;
use crate::io::log_sink::LogSink;

/// A loaded document plus the path it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journey {
    pub document_path: PathBuf,
    pub document: SequenceDocument,
}

/// Result of asking for the next waypoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextOutcome {
    /// A piece was served and its `DONE` entry appended.
    Served {
        identifier: String,
        content: String,
        step: usize,
        total: usize,
    },
    /// Nothing left; an `END` entry was appended.
    Complete,
}

impl NextOutcome {
    /// Piece content, or the empty string once the journey is complete.
    pub fn into_content(self) -> String {
        match self {
            NextOutcome::Served { content, .. } => content,
            NextOutcome::Complete => String::new(),
        }
    }
}

/// Snapshot reported by `progress`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    pub receipt: ProgressReceipt,
    pub state: TraversalState,
    pub next: Option<String>,
}

impl ProgressReport {
    pub fn message(&self) -> String {
        format!(
            "Waypoint journey: {} {}\nProgress: {}/{} waypoints ({:.1}% complete)\nState: {}\nNext: {}",
            self.receipt.domain,
            self.receipt.version,
            self.receipt.completed_count(),
            self.receipt.total,
            self.receipt.completion_percentage(),
            self.state,
            self.next.as_deref().unwrap_or("none"),
        )
    }
}

impl Journey {
    /// Load the document at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let document = load_document(path)?;
        let document_path =
            fs::canonicalize(path).with_context(|| format!("resolve {}", path.display()))?;
        Ok(Self {
            document_path,
            document,
        })
    }

    /// Rebuild the journey named by the most recent `START` entry in `sink`.
    pub fn resume(sink: &dyn LogSink) -> Result<Self> {
        let entries = sink.read_all()?;
        let Some(LogEntry {
            marker: Marker::Start { document },
            ..
        }) = latest_start(&entries)
        else {
            return Err(WaypointError::NoActiveJourney {
                log: sink.describe(),
            }
            .into());
        };
        debug!(document = %document, "resuming journey");
        Self::open(Path::new(&document))
            .with_context(|| format!("resume journey from {}", sink.describe()))
    }

    fn entry(&self, marker: Marker) -> LogEntry {
        LogEntry::new(&self.document.domain, &self.document.version, marker)
    }

    /// Append the `START` entry that later commands resume from.
    pub fn begin(&self, sink: &dyn LogSink, notes: &str) -> Result<()> {
        let entry = self
            .entry(Marker::Start {
                document: self.document_path.to_string_lossy().into_owned(),
            })
            .with_detail("Waypoint journey started")
            .with_notes(notes);
        sink.append(&entry.to_string())?;
        info!(
            domain = %self.document.domain,
            version = %self.document.version,
            pieces = self.document.piece_count(),
            "journey started"
        );
        Ok(())
    }

    /// Progress according to the log right now.
    pub fn receipt(&self, sink: &dyn LogSink) -> Result<ProgressReceipt> {
        let entries = sink.read_all()?;
        Ok(reconstruct(&entries, &self.document))
    }

    /// Serve the next unserved piece, logging `DONE`, or log `END`.
    pub fn advance(&self, sink: &dyn LogSink, notes: &str) -> Result<NextOutcome> {
        let receipt = self.receipt(sink)?;
        let Some(piece) = next_piece(&self.document, &receipt) else {
            sink.append(&end_entry(&self.document, notes).to_string())?;
            info!(domain = %self.document.domain, "journey complete");
            return Ok(NextOutcome::Complete);
        };
        sink.append(&completion_entry(&self.document, piece, &receipt, notes).to_string())?;
        let step = receipt.completed_count() + 1;
        info!(
            identifier = %piece.identifier,
            step,
            total = receipt.total,
            "served waypoint"
        );
        Ok(NextOutcome::Served {
            identifier: piece.identifier.clone(),
            content: piece.content.clone(),
            step,
            total: receipt.total,
        })
    }

    pub fn report(&self, sink: &dyn LogSink) -> Result<ProgressReport> {
        let receipt = self.receipt(sink)?;
        let state = journey_state(&self.document, &receipt);
        let next = next_piece(&self.document, &receipt).map(|piece| piece.identifier.clone());
        Ok(ProgressReport {
            receipt,
            state,
            next,
        })
    }

    /// Append `RESET`; completions logged before it stop counting.
    pub fn restart(&self, sink: &dyn LogSink, notes: &str) -> Result<()> {
        let entry = self
            .entry(Marker::Reset)
            .with_detail("Journey reset")
            .with_notes(notes);
        sink.append(&entry.to_string())?;
        info!(domain = %self.document.domain, "journey reset");
        Ok(())
    }
}

/// `start`: load the document, log `START` and summarize it.
pub fn start(document_path: &Path, sink: &dyn LogSink, notes: &str) -> Result<String> {
    let journey = Journey::open(document_path)?;
    journey.begin(sink, notes)?;
    Ok(format!(
        "Waypoint journey started: {}\nTotal waypoints: {}",
        journey.document.label(),
        journey.document.piece_count()
    ))
}

/// `next`: content of the next piece, or `""` once every piece is served.
pub fn next(sink: &dyn LogSink, notes: &str) -> Result<String> {
    Ok(Journey::resume(sink)?.advance(sink, notes)?.into_content())
}

/// `progress`: human-readable status without touching the log.
pub fn progress(sink: &dyn LogSink) -> Result<String> {
    Ok(Journey::resume(sink)?.report(sink)?.message())
}

/// `reset`: restart the active journey from its first piece.
pub fn reset(sink: &dyn LogSink, notes: &str) -> Result<String> {
    let journey = Journey::resume(sink)?;
    journey.restart(sink, notes)?;
    Ok(format!(
        "Waypoint journey reset: {}",
        journey.document.label()
    ))
}
