//! Deterministic selection of the next unserved piece.
//!
//! Traversal order is strictly numeric: declared dependencies are advisory and
//! never reorder pieces. The engine only computes what should be logged next;
//! appending to the log is the caller's job.

use crate::core::log_entry::{LogEntry, Marker};
use crate::core::receipt::{ProgressReceipt, TraversalState};
use crate::document::{Piece, SequenceDocument};

/// All pieces ascending by `sequence_number`.
///
/// The sort is stable over document order (root pieces, then groups by name),
/// so pieces sharing a number keep that order.
pub fn traversal_order(doc: &SequenceDocument) -> Vec<&Piece> {
    let mut order: Vec<&Piece> = doc.pieces().collect();
    order.sort_by_key(|piece| piece.sequence_number);
    order
}

/// First piece in traversal order whose number is not completed.
///
/// Returns `None` once every piece is served. Pure in `(doc, receipt)`:
/// calling it again without logging a completion returns the same piece.
pub fn next_piece<'a>(doc: &'a SequenceDocument, receipt: &ProgressReceipt) -> Option<&'a Piece> {
    traversal_order(doc)
        .into_iter()
        .find(|piece| !receipt.completed.contains(&piece.sequence_number))
}

/// Journey state, treating "nothing left to serve" as complete even when
/// duplicate sequence numbers keep the completed count below the total.
pub fn journey_state(doc: &SequenceDocument, receipt: &ProgressReceipt) -> TraversalState {
    if next_piece(doc, receipt).is_none() {
        TraversalState::Complete
    } else {
        receipt.state()
    }
}

/// Entry the caller should append after serving `piece`.
pub fn completion_entry(
    doc: &SequenceDocument,
    piece: &Piece,
    receipt: &ProgressReceipt,
    notes: &str,
) -> LogEntry {
    let step = receipt.completed_count() + 1;
    LogEntry::new(
        &doc.domain,
        &doc.version,
        Marker::Done {
            identifier: piece.identifier.clone(),
        },
    )
    .with_detail(format!("Completed step {}/{}", step, receipt.total))
    .with_notes(notes)
}

/// Entry the caller should append when [`next_piece`] returns `None`.
pub fn end_entry(doc: &SequenceDocument, notes: &str) -> LogEntry {
    LogEntry::new(&doc.domain, &doc.version, Marker::End)
        .with_detail("All waypoints traversed")
        .with_notes(notes)
}
