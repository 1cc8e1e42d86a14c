//! Structural checks not expressible via JSON Schema.

use std::collections::BTreeMap;

use crate::document::SequenceDocument;

/// Check advisory document invariants, in order:
/// - No duplicate identifiers across root pieces and all groups
/// - Every dependency names an existing sequence number
///
/// Issues are advisory: callers log them and carry on.
pub fn validate_document(doc: &SequenceDocument) -> Vec<String> {
    let mut issues = Vec::new();

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for piece in doc.pieces() {
        *counts.entry(piece.identifier.as_str()).or_default() += 1;
    }
    for (identifier, count) in counts {
        if count > 1 {
            issues.push(format!(
                "duplicate identifier '{}' ({} pieces)",
                identifier, count
            ));
        }
    }

    let known = doc.sequence_numbers();
    for piece in doc.pieces() {
        for dependency in &piece.dependencies {
            if !known.contains(dependency) {
                issues.push(format!(
                    "piece '{}' depends on non-existent sequence number {}",
                    piece.identifier, dependency
                ));
            }
        }
    }

    issues
}
