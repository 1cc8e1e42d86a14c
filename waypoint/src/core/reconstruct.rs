//! Rebuild progress receipts from log text alone.
//!
//! The log is the only source of truth: every call re-reads every entry and
//! nothing is cached between calls, which keeps traversal safe to resume from a
//! fresh process or to retry after a crash.

use std::collections::BTreeSet;

use crate::core::log_entry::{LogEntry, Marker};
use crate::core::receipt::ProgressReceipt;
use crate::core::traversal::traversal_order;
use crate::document::SequenceDocument;

/// Parsed entries tagged with the `(domain, version)` namespace, in log order.
///
/// Untagged, malformed and foreign-namespace entries are skipped.
pub fn namespace_entries<S: AsRef<str>>(entries: &[S], domain: &str, version: &str) -> Vec<LogEntry> {
    entries
        .iter()
        .filter_map(|raw| LogEntry::parse(raw.as_ref()))
        .filter(|entry| entry.in_namespace(domain, version))
        .collect()
}

/// Recover which pieces of `doc` have been completed according to `entries`.
///
/// - `DONE(<identifier>)` marks the first piece in traversal order that
///   carries that identifier and is not yet completed. Grouped pieces may
///   share a filename, so each entry claims one of them; identifiers the
///   document does not know are dropped.
/// - `RESET()` opens a new scope: completions logged before it no longer count.
/// - `START` and `END` do not affect progress.
pub fn reconstruct<S: AsRef<str>>(entries: &[S], doc: &SequenceDocument) -> ProgressReceipt {
    let order = traversal_order(doc);
    let mut completed = BTreeSet::new();
    for entry in namespace_entries(entries, &doc.domain, &doc.version) {
        match entry.marker {
            Marker::Done { identifier } => {
                let claimed = order.iter().find(|piece| {
                    piece.identifier == identifier && !completed.contains(&piece.sequence_number)
                });
                if let Some(piece) = claimed {
                    completed.insert(piece.sequence_number);
                }
            }
            Marker::Reset => completed.clear(),
            Marker::Start { .. } | Marker::End => {}
        }
    }
    ProgressReceipt::with_completed(doc, completed)
}

/// Most recent `START` entry in any namespace.
pub fn latest_start<S: AsRef<str>>(entries: &[S]) -> Option<LogEntry> {
    entries
        .iter()
        .rev()
        .filter_map(|raw| LogEntry::parse(raw.as_ref()))
        .find(|entry| matches!(entry.marker, Marker::Start { .. }))
}
