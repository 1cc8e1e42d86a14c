//! Write a document back out as a directory tree, or as a Markdown outline.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use minijinja::{Environment, context};
use serde::Serialize;
use tracing::{debug, info};

use crate::document::{Piece, SequenceDocument};

const OUTLINE_TEMPLATE: &str = include_str!("templates/outline.md");

/// Materialize `doc` under `base/{domain}_{version}/`.
///
/// Root pieces land directly in the target directory, grouped pieces in a
/// like-named subdirectory. Existing files with the same names are
/// overwritten; nothing is deleted. Identifiers and group names must be plain
/// relative names, so nothing is ever written outside the target.
pub fn render_to_directory(doc: &SequenceDocument, base: &Path) -> Result<PathBuf> {
    let dir_name = format!("{}_{}", doc.domain, doc.version);
    ensure_plain_name("document namespace", &dir_name)?;
    let target = base.join(&dir_name);

    for piece in &doc.root_pieces {
        ensure_plain_name("piece identifier", &piece.identifier)?;
    }
    for (group, pieces) in &doc.groups {
        ensure_relative_group(group)?;
        for piece in pieces {
            ensure_plain_name("piece identifier", &piece.identifier)?;
        }
    }

    fs::create_dir_all(&target).with_context(|| format!("create {}", target.display()))?;
    write_pieces(&target, &doc.root_pieces)?;
    for (group, pieces) in &doc.groups {
        let group_dir = group.split('/').fold(target.clone(), |dir, part| dir.join(part));
        fs::create_dir_all(&group_dir)
            .with_context(|| format!("create {}", group_dir.display()))?;
        write_pieces(&group_dir, pieces)?;
    }

    info!(target = %target.display(), pieces = doc.piece_count(), "rendered document");
    Ok(target)
}

fn write_pieces(dir: &Path, pieces: &[Piece]) -> Result<()> {
    for piece in pieces {
        let path = dir.join(&piece.identifier);
        fs::write(&path, &piece.content).with_context(|| format!("write {}", path.display()))?;
        debug!(path = %path.display(), "wrote piece");
    }
    Ok(())
}

fn ensure_plain_name(what: &str, name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == name => Ok(()),
        _ => bail!("unsafe {} '{}': must be a single relative name", what, name),
    }
}

fn ensure_relative_group(group: &str) -> Result<()> {
    if group.is_empty() {
        bail!("unsafe group name '': must not be empty");
    }
    for part in group.split('/') {
        ensure_plain_name("group name", part)
            .with_context(|| format!("unsafe group name '{}'", group))?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct OutlinePiece<'a> {
    sequence_number: u32,
    filename: &'a str,
    title: &'a str,
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct OutlineGroup<'a> {
    name: &'a str,
    pieces: Vec<OutlinePiece<'a>>,
}

fn outline_pieces(pieces: &[Piece]) -> Vec<OutlinePiece<'_>> {
    let mut sorted: Vec<&Piece> = pieces.iter().collect();
    sorted.sort_by_key(|piece| piece.sequence_number);
    sorted
        .into_iter()
        .map(|piece| OutlinePiece {
            sequence_number: piece.sequence_number,
            filename: &piece.identifier,
            title: &piece.title,
            kind: piece.kind.as_str(),
        })
        .collect()
}

/// Human-readable Markdown outline of a document.
pub fn render_outline(doc: &SequenceDocument) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("outline", OUTLINE_TEMPLATE)
        .context("load outline template")?;
    let groups: Vec<OutlineGroup<'_>> = doc
        .groups
        .iter()
        .map(|(name, pieces)| OutlineGroup {
            name,
            pieces: outline_pieces(pieces),
        })
        .collect();
    let rendered = env.get_template("outline")?.render(context! {
        domain => &doc.domain,
        version => &doc.version,
        description => doc.description.trim(),
        entry_point => &doc.entry_point,
        total => doc.piece_count(),
        root => outline_pieces(&doc.root_pieces),
        groups => groups,
    })?;
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::compiler::{CompilerConfig, compile_directory};
    use crate::test_support::{document_with, piece, write_tree};

    #[test]
    fn writes_root_and_nested_group_pieces() {
        let temp = tempfile::tempdir().expect("tempdir");
        let doc = document_with(
            vec![piece(0, "00_intro.md")],
            vec![("guides/advanced", vec![piece(1, "01_deep.md")])],
        );

        let target = render_to_directory(&doc, temp.path()).expect("render");
        assert_eq!(target, temp.path().join("demo_v01"));
        assert_eq!(
            fs::read_to_string(target.join("00_intro.md")).expect("read"),
            doc.root_pieces[0].content
        );
        assert!(target.join("guides/advanced/01_deep.md").is_file());
    }

    #[test]
    fn rendering_overwrites_but_never_deletes() {
        let temp = tempfile::tempdir().expect("tempdir");
        let doc = document_with(vec![piece(0, "00_intro.md")], Vec::new());
        let target = temp.path().join("demo_v01");
        write_tree(&target, &[("00_intro.md", "stale"), ("notes.txt", "keep me")])
            .expect("write");

        render_to_directory(&doc, temp.path()).expect("render");
        render_to_directory(&doc, temp.path()).expect("render again");

        assert_eq!(
            fs::read_to_string(target.join("00_intro.md")).expect("read"),
            doc.root_pieces[0].content
        );
        assert_eq!(fs::read_to_string(target.join("notes.txt")).expect("read"), "keep me");
    }

    #[test]
    fn unsafe_names_are_rejected_before_writing() {
        let temp = tempfile::tempdir().expect("tempdir");
        for doc in [
            document_with(vec![piece(0, "../escape.md")], Vec::new()),
            document_with(vec![piece(0, "sub/inner.md")], Vec::new()),
            document_with(Vec::new(), vec![("../outside", vec![piece(0, "a.md")])]),
            document_with(Vec::new(), vec![("/abs", vec![piece(0, "a.md")])]),
        ] {
            let err = render_to_directory(&doc, temp.path()).expect_err("unsafe");
            assert!(format!("{:#}", err).contains("unsafe"), "{err:#}");
        }
        assert!(!temp.path().join("demo_v01").exists());
        assert!(!temp.path().join("escape.md").exists());
    }

    /// Compiling a rendered document gives back the same document.
    #[test]
    fn render_then_compile_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let source = temp.path().join("source");
        write_tree(
            &source,
            &[
                ("00_Overview.md", "# Overview\nframework"),
                ("01_Setup.md", "# Setup\n"),
                ("guides/02_Guide.md", "# Guide\n"),
                ("guides/deep/03_Deep.md", "# Deep\n"),
            ],
        )
        .expect("write");
        let config = CompilerConfig {
            domain: Some("course".to_string()),
            description: "Course material".to_string(),
            ..CompilerConfig::default()
        };
        let original = compile_directory(&source, &config).expect("compile");

        let rendered = render_to_directory(&original, &temp.path().join("out")).expect("render");
        let recompiled = compile_directory(&rendered, &config).expect("recompile");
        assert_eq!(recompiled, original);
    }

    #[test]
    fn outline_lists_pieces_by_number() {
        let mut doc = document_with(
            vec![piece(2, "02_b.md"), piece(1, "01_a.md")],
            vec![("extras", vec![piece(3, "03_c.md")])],
        );
        doc.description = "Demo course".to_string();

        let outline = render_outline(&doc).expect("outline");
        assert!(outline.starts_with("# demo v01\n"));
        assert!(outline.contains("Demo course"));
        assert!(outline.contains("Entry point: 01_a.md"));
        assert!(outline.contains("Total waypoints: 3"));
        assert!(outline.contains("## extras/"));
        let first = outline.find("01_a.md: 01_a.md title").expect("first");
        let second = outline.find("02_b.md: 02_b.md title").expect("second");
        assert!(first < second);
    }
}
