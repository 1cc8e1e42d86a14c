//! Test-only helpers for constructing pieces, documents and source trees.

use std::fs;
use std::path::Path;

use crate::document::{Piece, PieceKind, SequenceDocument};

/// Create a deterministic piece with default fields and no dependencies.
pub fn piece(sequence_number: u32, identifier: &str) -> Piece {
    Piece {
        sequence_number,
        identifier: identifier.to_string(),
        title: format!("{} title", identifier),
        content: format!("# {}\n\n{} content\n", identifier, identifier),
        kind: PieceKind::Instruction,
        dependencies: Vec::new(),
    }
}

/// Create a piece with explicit dependencies (useful for invariant tests).
pub fn piece_with_deps(sequence_number: u32, identifier: &str, dependencies: Vec<u32>) -> Piece {
    Piece {
        dependencies,
        ..piece(sequence_number, identifier)
    }
}

/// Create a `demo v01` document from root pieces and named groups.
pub fn document_with(root: Vec<Piece>, groups: Vec<(&str, Vec<Piece>)>) -> SequenceDocument {
    let mut doc = SequenceDocument::new("demo", "v01");
    doc.root_pieces = root;
    for (name, pieces) in groups {
        doc.groups.insert(name.to_string(), pieces);
    }
    doc.entry_point = doc.resolve_entry_point();
    doc
}

/// Root-only document with pieces numbered `0..count` named `NN_step.md`.
pub fn numbered_document(count: u32) -> SequenceDocument {
    let root = (0..count)
        .map(|n| piece(n, &format!("{:02}_step.md", n)))
        .collect();
    document_with(root, Vec::new())
}

/// Write `(relative path, contents)` pairs under `root`, creating directories.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) -> std::io::Result<()> {
    for (relative, contents) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
    }
    Ok(())
}
