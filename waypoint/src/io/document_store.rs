//! Sequence document load/save with schema validation and atomic replace.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use jsonschema::validator_for;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::core::invariants::validate_document;
use crate::document::SequenceDocument;
use crate::errors::WaypointError;
use crate::io::atomic::{scoped_path, write_atomic};

const DOCUMENT_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../schemas/sequence_document/v1.schema.json"
));

/// Process-scoped backup location: `guide.json` -> `guide.backup_<pid>.json`.
pub fn backup_path(path: &Path) -> PathBuf {
    scoped_path(path, "backup")
}

/// Process-scoped temp location: `guide.json` -> `guide.tmp_<pid>.json`.
pub fn temp_path(path: &Path) -> PathBuf {
    scoped_path(path, "tmp")
}

/// Save `doc` as pretty JSON at `path`, replacing any existing file atomically.
///
/// Validation issues are logged, never fatal. With `backup`, an existing file
/// is first copied to [`backup_path`]. The new content goes to [`temp_path`]
/// and is renamed over `path`; on failure the temp file is removed and `path`
/// still holds its previous content.
pub fn save_document(doc: &SequenceDocument, path: &Path, backup: bool) -> Result<PathBuf> {
    let issues = validate_document(doc);
    if !issues.is_empty() {
        warn!(path = %path.display(), issues = ?issues, "saving document with validation issues");
    }

    let mut buf = serde_json::to_string_pretty(doc).context("serialize document")?;
    buf.push('\n');

    if backup && path.exists() {
        let backup = backup_path(path);
        fs::copy(path, &backup).with_context(|| {
            format!("back up {} to {}", path.display(), backup.display())
        })?;
        info!(backup = %backup.display(), "created backup");
    }

    write_atomic(path, &buf)?;
    info!(path = %path.display(), pieces = doc.piece_count(), "saved document");
    Ok(path.to_path_buf())
}

/// Load a document, checking it against the v1 document schema.
///
/// Fails with [`WaypointError::NotFound`] if `path` is missing and with
/// [`WaypointError::Parse`] if it is not valid JSON or not a v1 document.
pub fn load_document(path: &Path) -> Result<SequenceDocument> {
    if !path.exists() {
        return Err(WaypointError::not_found("document", path).into());
    }
    debug!(path = %path.display(), "loading document");
    let contents =
        fs::read_to_string(path).with_context(|| format!("read document {}", path.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .map_err(|err| WaypointError::parse(path, err.to_string()))?;
    validate_schema(path, &value)?;
    let doc: SequenceDocument = serde_json::from_value(value)
        .map_err(|err| WaypointError::parse(path, err.to_string()))?;

    let issues = validate_document(&doc);
    if !issues.is_empty() {
        warn!(path = %path.display(), issues = ?issues, "loaded document has validation issues");
    }
    debug!(domain = %doc.domain, version = %doc.version, pieces = doc.piece_count(), "document loaded");
    Ok(doc)
}

fn validate_schema(path: &Path, doc: &Value) -> Result<()> {
    let schema_value: Value =
        serde_json::from_str(DOCUMENT_SCHEMA).context("parse embedded document schema")?;
    let compiled =
        validator_for(&schema_value).map_err(|err| anyhow!("invalid document schema: {}", err))?;
    if compiled.is_valid(doc) {
        return Ok(());
    }
    let messages = compiled
        .iter_errors(doc)
        .map(|err| err.to_string())
        .collect::<Vec<_>>();
    Err(WaypointError::parse(
        path,
        format!("schema validation failed: {}", messages.join("; ")),
    )
    .into())
}
