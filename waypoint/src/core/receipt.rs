//! Progress receipts: a disposable view of which pieces are done.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::document::SequenceDocument;

/// Coarse traversal state derived from a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalState {
    NotStarted,
    InProgress,
    Complete,
}

impl fmt::Display for TraversalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TraversalState::NotStarted => "not started",
            TraversalState::InProgress => "in progress",
            TraversalState::Complete => "complete",
        })
    }
}

/// Which sequence numbers of a document have been completed.
///
/// Receipts are never persisted; they are rebuilt from the log on every
/// request (see [`crate::core::reconstruct`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressReceipt {
    pub domain: String,
    pub version: String,
    pub completed: BTreeSet<u32>,
    /// Piece count of the document when the receipt was built.
    pub total: usize,
}

impl ProgressReceipt {
    /// Empty receipt for `doc`.
    pub fn new(doc: &SequenceDocument) -> Self {
        Self {
            domain: doc.domain.clone(),
            version: doc.version.clone(),
            completed: BTreeSet::new(),
            total: doc.piece_count(),
        }
    }

    /// Receipt for `doc` with `completed` filtered to the document's numbers.
    pub fn with_completed(doc: &SequenceDocument, completed: impl IntoIterator<Item = u32>) -> Self {
        let known = doc.sequence_numbers();
        let mut receipt = Self::new(doc);
        receipt.completed = completed
            .into_iter()
            .filter(|number| known.contains(number))
            .collect();
        receipt
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.completed.len() >= self.total
    }

    /// Percentage in `0.0..=100.0`; `0.0` for an empty document.
    pub fn completion_percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.completed.len() as f64 / self.total as f64) * 100.0
    }

    pub fn state(&self) -> TraversalState {
        if self.is_complete() {
            TraversalState::Complete
        } else if self.completed.is_empty() {
            TraversalState::NotStarted
        } else {
            TraversalState::InProgress
        }
    }
}
