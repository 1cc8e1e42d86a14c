//! Crash-atomic file replacement shared by document and config writers.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

/// Sibling of `path` tagged with `tag` and this process id, keeping the
/// extension: `guide.json` -> `guide.<tag>_<pid>.json`.
pub fn scoped_path(path: &Path, tag: &str) -> PathBuf {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_else(|| "json".to_string());
    path.with_extension(format!("{}_{}.{}", tag, std::process::id(), extension))
}

/// Write `contents` to a temp sibling, then rename it over `path`.
///
/// On failure the temp file is removed and `path` keeps its old content.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = scoped_path(path, "tmp");
    let written = fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp file {}", tmp_path.display()))
        .and_then(|()| {
            fs::rename(&tmp_path, path).with_context(|| format!("replace {}", path.display()))
        });
    if let Err(err) = written {
        if tmp_path.is_file() {
            let _ = fs::remove_file(&tmp_path);
        }
        return Err(err);
    }
    debug!(path = %path.display(), bytes = contents.len(), "replaced file");
    Ok(())
}
