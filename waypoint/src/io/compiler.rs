//! Compile a directory of numbered content files into a sequence document.
//!
//! Compilation is best-effort per file (an unreadable file is logged and
//! skipped) but all-or-nothing per document: the caller either gets a complete
//! document or an error before anything is returned.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Result, anyhow};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::core::classifier::classify_piece;
use crate::core::extract::{
    DEFAULT_SYNTHETIC_OFFSET, SyntheticNumbers, extract_title, infer_dependencies,
};
use crate::core::invariants::validate_document;
use crate::document::{DEFAULT_VERSION, Piece, SequenceDocument};
use crate::errors::WaypointError;
use crate::io::config::CompilerSettings;
use crate::io::document_store::save_document;

/// Options for a single compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Document domain; defaults to the source directory's name.
    pub domain: Option<String>,
    pub version: String,
    /// Defaults to `Compiled from <source dir name>` when empty.
    pub description: String,
    /// Extensions (without the dot) of files to include, case-insensitive.
    pub extensions: Vec<String>,
    /// First number handed to files without a numeric prefix.
    pub synthetic_offset: u32,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            domain: None,
            version: DEFAULT_VERSION.to_string(),
            description: String::new(),
            extensions: vec!["md".to_string()],
            synthetic_offset: DEFAULT_SYNTHETIC_OFFSET,
        }
    }
}

impl From<&CompilerSettings> for CompilerConfig {
    fn from(settings: &CompilerSettings) -> Self {
        Self {
            version: settings.version.clone(),
            extensions: settings.extensions.clone(),
            synthetic_offset: settings.synthetic_offset,
            ..Self::default()
        }
    }
}

/// A discovered file before dependency inference.
#[derive(Debug, Clone)]
struct FileMapping {
    group: Option<String>,
    piece: Piece,
}

/// Compile `source` into a sequence document.
///
/// Fails with [`WaypointError::NotFound`] if `source` does not exist.
pub fn compile_directory(source: &Path, config: &CompilerConfig) -> Result<SequenceDocument> {
    if !source.exists() {
        return Err(WaypointError::not_found("source directory", source).into());
    }
    if !source.is_dir() {
        return Err(anyhow!("expected directory {}", source.display()));
    }

    let dir_name = source
        .canonicalize()
        .unwrap_or_else(|_| source.to_path_buf())
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "curriculum".to_string());
    let domain = config.domain.clone().unwrap_or_else(|| dir_name.clone());
    let description = if config.description.is_empty() {
        format!("Compiled from {}", dir_name)
    } else {
        config.description.clone()
    };
    info!(source = %source.display(), domain = %domain, "compiling directory");

    let mappings = scan_directory(source, config);
    info!(files = mappings.len(), "mapped content files");

    let mut doc = assemble(domain, config.version.clone(), description, mappings);
    doc.entry_point = doc.resolve_entry_point();

    let issues = validate_document(&doc);
    if !issues.is_empty() {
        warn!(issues = ?issues, "validation issues in compiled document");
    }
    info!(pieces = doc.piece_count(), entry_point = %doc.entry_point, "compiled document");
    Ok(doc)
}

/// Compile `source` and save the result to `output` (with backup).
pub fn compile_and_save(source: &Path, output: &Path, config: &CompilerConfig) -> Result<PathBuf> {
    let doc = compile_directory(source, config)?;
    save_document(&doc, output, true)
}

/// Walk `source` in file-name order, following symlinks.
///
/// Entries the walk cannot reach (unreadable directories, dangling links,
/// link cycles) are logged and skipped like unreadable files.
fn scan_directory(source: &Path, config: &CompilerConfig) -> Vec<FileMapping> {
    let mut numbers = SyntheticNumbers::new(config.synthetic_offset);
    let mut mappings = Vec::new();

    for entry in WalkDir::new(source).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(source).display().to_string();
                warn!(path = %path, error = %err, "skipping unreachable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() || !has_extension(entry.path(), &config.extensions) {
            continue;
        }
        let path = entry.path();
        let filename = entry.file_name().to_string_lossy().into_owned();

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable file");
                continue;
            }
        };

        let group = group_name(source, path);
        let sequence_number = numbers.assign(&filename);
        let kind = classify_piece(&filename, group.as_deref(), &content);
        debug!(
            path = %path.display(),
            sequence_number,
            kind = %kind,
            "mapped file"
        );

        mappings.push(FileMapping {
            group,
            piece: Piece {
                sequence_number,
                identifier: filename,
                title: extract_title(&content),
                content,
                kind,
                dependencies: Vec::new(),
            },
        });
    }

    mappings
}

fn assemble(
    domain: String,
    version: String,
    description: String,
    mappings: Vec<FileMapping>,
) -> SequenceDocument {
    let known: BTreeSet<u32> = mappings
        .iter()
        .map(|mapping| mapping.piece.sequence_number)
        .collect();

    let mut root_pieces = Vec::new();
    let mut groups: BTreeMap<String, Vec<Piece>> = BTreeMap::new();
    for FileMapping { group, mut piece } in mappings {
        piece.dependencies = infer_dependencies(piece.sequence_number, &known);
        match group {
            Some(name) => groups.entry(name).or_default().push(piece),
            None => root_pieces.push(piece),
        }
    }

    SequenceDocument {
        description,
        groups,
        root_pieces,
        ..SequenceDocument::new(domain, version)
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

/// Relative parent directory joined with `/`, or `None` for root files.
fn group_name(source: &Path, path: &Path) -> Option<String> {
    let parent = path.parent()?.strip_prefix(source).ok()?;
    let parts: Vec<String> = parent
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PieceKind;
    use crate::test_support::write_tree;

    fn compile(root: &Path) -> SequenceDocument {
        compile_directory(root, &CompilerConfig::default()).expect("compile")
    }

    #[test]
    fn missing_source_is_not_found() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = compile_directory(&temp.path().join("nope"), &CompilerConfig::default())
            .expect_err("should fail");
        assert!(matches!(
            err.downcast_ref::<WaypointError>(),
            Some(WaypointError::NotFound { .. })
        ));
    }

    #[test]
    fn numbered_files_compile_cleanly() {
        let temp = tempfile::tempdir().expect("tempdir");
        let files: Vec<(String, String)> = (0..5)
            .map(|n| (format!("{:02}_Step.md", n), format!("# Step {n}\n")))
            .collect();
        let refs: Vec<(&str, &str)> = files
            .iter()
            .map(|(name, body)| (name.as_str(), body.as_str()))
            .collect();
        write_tree(temp.path(), &refs).expect("write");

        let doc = compile(temp.path());
        assert_eq!(doc.piece_count(), 5);
        assert_eq!(doc.entry_point, "00_Step.md");
        assert!(validate_document(&doc).is_empty());
        assert_eq!(doc.root_pieces[3].title, "Step 3");
        assert_eq!(doc.root_pieces[3].dependencies, vec![2]);
        assert!(doc.root_pieces[0].dependencies.is_empty());
    }

    #[test]
    fn dependency_needs_the_predecessor_to_exist() {
        let with_prereq = tempfile::tempdir().expect("tempdir");
        write_tree(
            with_prereq.path(),
            &[("02_Prereqs.md", "# Prereqs"), ("03_Setup.md", "# Setup")],
        )
        .expect("write");
        let doc = compile(with_prereq.path());
        let setup = doc.find_by_identifier("03_Setup.md").expect("setup");
        assert_eq!(setup.dependencies, vec![2]);

        let alone = tempfile::tempdir().expect("tempdir");
        write_tree(alone.path(), &[("03_Setup.md", "# Setup")]).expect("write");
        let doc = compile(alone.path());
        assert!(doc.root_pieces[0].dependencies.is_empty());
    }

    #[test]
    fn subdirectories_become_groups_and_unnumbered_files_sort_last() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_tree(
            temp.path(),
            &[
                ("README.md", "# Read me first"),
                ("01_Intro.md", "# Intro"),
                ("notes.txt", "ignored"),
                ("research/02_Survey.md", "# Survey"),
                ("research/deep/03_Paper.md", "# Paper"),
                ("research/appendix.md", "no heading"),
            ],
        )
        .expect("write");

        let doc = compile(temp.path());
        assert_eq!(doc.piece_count(), 5);
        assert_eq!(doc.entry_point, "01_Intro.md");

        let readme = doc.find_by_identifier("README.md").expect("readme");
        assert_eq!(readme.sequence_number, 1000);
        assert_eq!(readme.kind, PieceKind::Overview);

        let research = &doc.groups["research"];
        let ids: Vec<&str> = research.iter().map(|p| p.identifier.as_str()).collect();
        assert_eq!(ids, vec!["02_Survey.md", "appendix.md"]);
        assert_eq!(research[0].kind, PieceKind::Research);
        assert_eq!(research[0].dependencies, vec![1]);
        assert_eq!(research[1].sequence_number, 1001);
        assert_eq!(research[1].title, "Untitled");

        assert_eq!(doc.groups["research/deep"][0].dependencies, vec![2]);
    }

    #[test]
    fn overview_file_mentioning_framework_is_overview() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_tree(temp.path(), &[("overview.md", "# O\nThe framework at a glance")])
            .expect("write");
        let doc = compile(temp.path());
        assert_eq!(doc.root_pieces[0].kind, PieceKind::Overview);
    }

    #[test]
    fn domain_and_description_default_from_directory_name() {
        let temp = tempfile::tempdir().expect("tempdir");
        let source = temp.path().join("research_system");
        write_tree(&source, &[("00_a.md", "# A")]).expect("write");
        let doc = compile(&source);
        assert_eq!(doc.domain, "research_system");
        assert_eq!(doc.description, "Compiled from research_system");
        assert_eq!(doc.version, "v01");

        let config = CompilerConfig {
            domain: Some("custom".to_string()),
            version: "v02".to_string(),
            description: "Hand picked".to_string(),
            ..CompilerConfig::default()
        };
        let doc = compile_directory(&source, &config).expect("compile");
        assert_eq!(doc.label(), "custom v02");
        assert_eq!(doc.description, "Hand picked");
    }

    #[test]
    fn extensions_and_offset_come_from_config() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_tree(temp.path(), &[("a.TXT", "# A"), ("b.md", "# B")]).expect("write");
        let config = CompilerConfig {
            extensions: vec!["txt".to_string()],
            synthetic_offset: 50,
            ..CompilerConfig::default()
        };
        let doc = compile_directory(temp.path(), &config).expect("compile");
        assert_eq!(doc.piece_count(), 1);
        assert_eq!(doc.root_pieces[0].identifier, "a.TXT");
        assert_eq!(doc.root_pieces[0].sequence_number, 50);
    }

    #[test]
    fn non_utf8_files_are_skipped() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_tree(temp.path(), &[("00_ok.md", "# Ok")]).expect("write");
        fs::write(temp.path().join("01_binary.md"), [0xff, 0xfe, 0x00]).expect("write");
        let doc = compile(temp.path());
        assert_eq!(doc.piece_count(), 1);
        assert_eq!(doc.root_pieces[0].identifier, "00_ok.md");
    }

    #[cfg(unix)]
    #[test]
    fn unreachable_entries_are_skipped() {
        use std::os::unix::fs::symlink;

        let temp = tempfile::tempdir().expect("tempdir");
        write_tree(temp.path(), &[("00_ok.md", "# Ok")]).expect("write");
        symlink(temp.path().join("missing.md"), temp.path().join("01_gone.md")).expect("link");
        symlink(temp.path().join("00_ok.md"), temp.path().join("02_alias.md")).expect("link");

        let doc = compile(temp.path());
        let ids: Vec<&str> = doc.pieces().map(|p| p.identifier.as_str()).collect();
        assert_eq!(ids, vec!["00_ok.md", "02_alias.md"]);
    }
}
