//! Waypoint configuration stored in `waypoint.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::extract::DEFAULT_SYNTHETIC_OFFSET;
use crate::document::DEFAULT_VERSION;
use crate::io::atomic::write_atomic;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "waypoint.toml";

/// Waypoint configuration (TOML).
///
/// This file is intended to be edited by humans. Missing fields default to the
/// values the compiler and journey commands use out of the box.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct WaypointConfig {
    pub compiler: CompilerSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CompilerSettings {
    /// File extensions (without the dot) treated as content files.
    pub extensions: Vec<String>,

    /// First sequence number handed to files without a numeric prefix.
    pub synthetic_offset: u32,

    /// Version stamped on compiled documents unless overridden on the CLI.
    pub version: String,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            extensions: vec!["md".to_string()],
            synthetic_offset: DEFAULT_SYNTHETIC_OFFSET,
            version: DEFAULT_VERSION.to_string(),
        }
    }
}

/// Where journey entries are appended and read back from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogBackend {
    /// Append-only JSON Lines file named by `--log`.
    #[default]
    File,
    /// In-process buffer; progress does not outlive the process.
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct LogSettings {
    pub backend: LogBackend,
}

impl WaypointConfig {
    pub fn validate(&self) -> Result<()> {
        if self.compiler.extensions.is_empty() {
            return Err(anyhow!("compiler.extensions must be a non-empty array"));
        }
        if let Some(bad) = self
            .compiler
            .extensions
            .iter()
            .find(|ext| ext.trim().is_empty() || ext.starts_with('.'))
        {
            return Err(anyhow!(
                "compiler.extensions entries must be non-empty and without a leading dot (got '{bad}')"
            ));
        }
        if self.compiler.version.trim().is_empty() {
            return Err(anyhow!("compiler.version must not be empty"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `WaypointConfig::default()`.
pub fn load_config(path: &Path) -> Result<WaypointConfig> {
    let cfg = if path.exists() {
        let contents =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        toml::from_str::<WaypointConfig>(&contents)
            .with_context(|| format!("parse {}", path.display()))?
    } else {
        debug!(path = %path.display(), "no config file, using defaults");
        WaypointConfig::default()
    };
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Write config through the same atomic replace used for documents.
pub fn write_config(path: &Path, cfg: &WaypointConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}
