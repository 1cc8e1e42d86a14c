//! Sequence document model and its persisted wire shape.
//!
//! Field names on the wire (`filename`, `piece_type`, `root_files`,
//! `directories`) are a contract with tools that edit documents by hand, so the
//! Rust names are mapped with `serde(rename)` instead of changing the JSON.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Title used when a piece has no top-level heading.
pub const UNTITLED: &str = "Untitled";

/// Entry point used when a document has no pieces at all.
pub const DEFAULT_ENTRY_POINT: &str = "README.md";

/// Version assigned when neither the caller nor the document provides one.
pub const DEFAULT_VERSION: &str = "v01";

/// Category of a piece, inferred by the compiler or set by hand.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    Overview,
    MasterPrompt,
    Architecture,
    Summary,
    Example,
    Dsl,
    Visual,
    Guide,
    Quickstart,
    #[default]
    Instruction,
    Research,
    Roadmap,
    TestCase,
    Workflow,
    Implementation,
    Framework,
    Ontological,
}

impl PieceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PieceKind::Overview => "overview",
            PieceKind::MasterPrompt => "master_prompt",
            PieceKind::Architecture => "architecture",
            PieceKind::Summary => "summary",
            PieceKind::Example => "example",
            PieceKind::Dsl => "dsl",
            PieceKind::Visual => "visual",
            PieceKind::Guide => "guide",
            PieceKind::Quickstart => "quickstart",
            PieceKind::Instruction => "instruction",
            PieceKind::Research => "research",
            PieceKind::Roadmap => "roadmap",
            PieceKind::TestCase => "test_case",
            PieceKind::Workflow => "workflow",
            PieceKind::Implementation => "implementation",
            PieceKind::Framework => "framework",
            PieceKind::Ontological => "ontological",
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One numbered, titled, typed block of content.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Piece {
    pub sequence_number: u32,
    /// Log-visible token for "this piece was completed" (usually a filename).
    #[serde(rename = "filename")]
    pub identifier: String,
    pub title: String,
    pub content: String,
    #[serde(rename = "piece_type", default)]
    pub kind: PieceKind,
    /// Advisory predecessors; traversal never enforces them.
    #[serde(default)]
    pub dependencies: Vec<u32>,
}

/// Ordered collection of pieces plus identity metadata.
///
/// `(domain, version)` doubles as the namespace that isolates this document's
/// entries from unrelated traversals sharing one log.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SequenceDocument {
    pub domain: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub description: String,
    /// Named partitions, one per source subdirectory.
    #[serde(rename = "directories", default)]
    pub groups: BTreeMap<String, Vec<Piece>>,
    #[serde(rename = "root_files", default)]
    pub root_pieces: Vec<Piece>,
    #[serde(default = "default_entry_point")]
    pub entry_point: String,
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

fn default_entry_point() -> String {
    DEFAULT_ENTRY_POINT.to_string()
}

fn lowest_numbered<'a>(pieces: impl Iterator<Item = &'a Piece>) -> Option<&'a Piece> {
    pieces.reduce(|best, piece| {
        if piece.sequence_number < best.sequence_number {
            piece
        } else {
            best
        }
    })
}

impl SequenceDocument {
    /// Empty document for a namespace.
    pub fn new(domain: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            version: version.into(),
            description: String::new(),
            groups: BTreeMap::new(),
            root_pieces: Vec::new(),
            entry_point: default_entry_point(),
        }
    }

    /// All pieces in document order: root pieces, then groups sorted by name.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.root_pieces
            .iter()
            .chain(self.groups.values().flatten())
    }

    pub fn piece_count(&self) -> usize {
        self.root_pieces.len() + self.groups.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.piece_count() == 0
    }

    pub fn sequence_numbers(&self) -> BTreeSet<u32> {
        self.pieces().map(|piece| piece.sequence_number).collect()
    }

    /// First piece (in document order) carrying `identifier`.
    pub fn find_by_identifier(&self, identifier: &str) -> Option<&Piece> {
        self.pieces().find(|piece| piece.identifier == identifier)
    }

    /// Lowest-numbered root piece, else lowest-numbered grouped piece.
    ///
    /// Ties resolve to the earliest piece in document order.
    pub fn resolve_entry_point(&self) -> String {
        lowest_numbered(self.root_pieces.iter())
            .or_else(|| lowest_numbered(self.groups.values().flatten()))
            .map(|piece| piece.identifier.clone())
            .unwrap_or_else(default_entry_point)
    }

    /// Namespace label used in human-facing messages.
    pub fn label(&self) -> String {
        format!("{} {}", self.domain, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{document_with, piece};

    #[test]
    fn piece_serializes_with_wire_field_names() {
        let value = serde_json::to_value(piece(3, "03_Setup.md")).expect("serialize");
        assert_eq!(value["filename"], "03_Setup.md");
        assert_eq!(value["piece_type"], "instruction");
        assert_eq!(value["sequence_number"], 3);
        assert!(value.get("identifier").is_none());
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let raw = r#"{
            "domain": "demo",
            "root_files": [
                {"sequence_number": 0, "filename": "00_a.md", "title": "A", "content": "x"}
            ]
        }"#;
        let doc: SequenceDocument = serde_json::from_str(raw).expect("parse");
        assert_eq!(doc.version, "v01");
        assert_eq!(doc.entry_point, "README.md");
        assert_eq!(doc.root_pieces[0].kind, PieceKind::Instruction);
        assert!(doc.root_pieces[0].dependencies.is_empty());
    }

    #[test]
    fn pieces_iterate_root_then_groups_by_name() {
        let doc = document_with(
            vec![piece(5, "root.md")],
            vec![
                ("zeta", vec![piece(1, "z.md")]),
                ("alpha", vec![piece(9, "a.md")]),
            ],
        );
        let ids: Vec<&str> = doc.pieces().map(|p| p.identifier.as_str()).collect();
        assert_eq!(ids, vec!["root.md", "a.md", "z.md"]);
        assert_eq!(doc.piece_count(), 3);
    }

    #[test]
    fn entry_point_prefers_root_pieces() {
        let doc = document_with(
            vec![piece(4, "04_root.md"), piece(2, "02_root.md")],
            vec![("group", vec![piece(0, "00_grouped.md")])],
        );
        assert_eq!(doc.resolve_entry_point(), "02_root.md");
    }

    #[test]
    fn entry_point_falls_back_to_groups_then_sentinel() {
        let grouped = document_with(
            Vec::new(),
            vec![
                ("b", vec![piece(3, "03_b.md")]),
                ("a", vec![piece(7, "07_a.md")]),
            ],
        );
        assert_eq!(grouped.resolve_entry_point(), "03_b.md");

        let empty = SequenceDocument::new("demo", "v01");
        assert_eq!(empty.resolve_entry_point(), DEFAULT_ENTRY_POINT);
    }
}
