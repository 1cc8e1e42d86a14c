//! Per-file metadata extraction for the compiler pipeline.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::document::UNTITLED;

/// Default first synthetic sequence number for files without a numeric prefix.
pub const DEFAULT_SYNTHETIC_OFFSET: u32 = 1000;

static SEQUENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)_").unwrap());
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#[ \t]+(.+)$").unwrap());

/// Parse the leading `NN_` prefix of a filename (`03_Setup.md` -> 3).
///
/// Returns `None` when there is no prefix or the digits overflow `u32`.
pub fn parse_sequence_prefix(filename: &str) -> Option<u32> {
    SEQUENCE_RE
        .captures(filename)
        .and_then(|caps| caps[1].parse().ok())
}

/// Text of the first top-level heading, or `Untitled`.
pub fn extract_title(content: &str) -> String {
    TITLE_RE
        .captures(content)
        .map(|caps| caps[1].trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Immediate-predecessor heuristic: `[n - 1]` when that number is known.
pub fn infer_dependencies(sequence_number: u32, known: &BTreeSet<u32>) -> Vec<u32> {
    match sequence_number.checked_sub(1) {
        Some(previous) if known.contains(&previous) => vec![previous],
        _ => Vec::new(),
    }
}

/// Hands out sequence numbers for unnumbered files within one compile run.
///
/// Numbers start at `offset` and increase by one per unnumbered file, so such
/// files sort after numbered ones and keep their discovery order.
#[derive(Debug, Clone)]
pub struct SyntheticNumbers {
    next: u32,
}

impl SyntheticNumbers {
    pub fn new(offset: u32) -> Self {
        Self { next: offset }
    }

    /// Prefix number if present, otherwise the next synthetic number.
    pub fn assign(&mut self, filename: &str) -> u32 {
        if let Some(number) = parse_sequence_prefix(filename) {
            return number;
        }
        let assigned = self.next;
        self.next = self.next.saturating_add(1);
        assigned
    }
}

impl Default for SyntheticNumbers {
    fn default() -> Self {
        Self::new(DEFAULT_SYNTHETIC_OFFSET)
    }
}
