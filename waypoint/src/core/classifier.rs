//! Deterministic categorization of pieces.
//!
//! Priority chain: filename keywords, then containing-directory keywords, then
//! content keywords, then `Instruction`. Each stage is a first-match-wins scan
//! over an ordered table; matching is case-insensitive substring search.

use crate::document::PieceKind;

/// A rule matches when every needle occurs in the lowercased haystack.
type Rule = (&'static [&'static str], PieceKind);

const FILENAME_RULES: &[Rule] = &[
    (&["readme"], PieceKind::Overview),
    (&["master_prompt"], PieceKind::MasterPrompt),
    (&["architecture"], PieceKind::Architecture),
    (&["overview"], PieceKind::Overview),
    (&["summary"], PieceKind::Summary),
    (&["example"], PieceKind::Example),
    (&["dsl"], PieceKind::Dsl),
    (&["visual"], PieceKind::Visual),
    (&["guide"], PieceKind::Guide),
    (&["quick_start"], PieceKind::Quickstart),
    (&["quickstart"], PieceKind::Quickstart),
];

const DIRECTORY_RULES: &[Rule] = &[
    (&["instruction"], PieceKind::Instruction),
    (&["research"], PieceKind::Research),
    (&["roadmap"], PieceKind::Roadmap),
    (&["test"], PieceKind::TestCase),
];

const CONTENT_RULES: &[Rule] = &[
    (&["workflow", "notation"], PieceKind::Workflow),
    (&["implementation"], PieceKind::Implementation),
    (&["architecture"], PieceKind::Architecture),
    (&["framework"], PieceKind::Framework),
    (&["ontological"], PieceKind::Ontological),
];

/// Categorize a piece from its filename, group directory and content.
///
/// `directory` is the group's relative path, `None` for root pieces.
pub fn classify_piece(filename: &str, directory: Option<&str>, content: &str) -> PieceKind {
    first_match(FILENAME_RULES, filename)
        .or_else(|| directory.and_then(|dir| first_match(DIRECTORY_RULES, dir)))
        .or_else(|| first_match(CONTENT_RULES, content))
        .unwrap_or(PieceKind::Instruction)
}

fn first_match(rules: &[Rule], haystack: &str) -> Option<PieceKind> {
    let lowered = haystack.to_lowercase();
    rules
        .iter()
        .find(|(needles, _)| needles.iter().all(|needle| lowered.contains(needle)))
        .map(|(_, kind)| *kind)
}
