//! Versioned tag grammar for waypoint log entries.
//!
//! Log entries are free text owned by an external log. Entries that belong to a
//! traversal carry exactly one structured tag:
//!
//! ```text
//! @waypoint/v1:<domain>:<version>:START(<document path>)
//! @waypoint/v1:<domain>:<version>:DONE(<piece identifier>)
//! @waypoint/v1:<domain>:<version>:END()
//! @waypoint/v1:<domain>:<version>:RESET()
//! ```
//!
//! Fields are percent-encoded UTF-8. `%`, `:`, `(`, `)`, whitespace and control
//! characters are always escaped, so a field never contains a delimiter. Any
//! text may precede the tag (timestamps, emoji, sink prefixes); text after the
//! tag is a human-readable detail and is never interpreted. The first
//! well-formed `v1` tag in an entry wins; everything else is ignored.

use std::fmt::{self, Write as _};
use std::sync::LazyLock;

use regex::Regex;

/// Grammar version written into every tag.
pub const GRAMMAR_VERSION: u32 = 1;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@waypoint/v(\d+):([^\s:()]+):([^\s:()]+):(START|DONE|END|RESET)\(([^\s:()]*)\)")
        .unwrap()
});

/// What a tagged entry records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// A journey began; names the persisted document being traversed.
    Start { document: String },
    /// A piece was served; names its identifier.
    Done { identifier: String },
    /// Traversal reached the end of the document.
    End,
    /// Progress restarts from the beginning.
    Reset,
}

impl Marker {
    fn keyword(&self) -> &'static str {
        match self {
            Marker::Start { .. } => "START",
            Marker::Done { .. } => "DONE",
            Marker::End => "END",
            Marker::Reset => "RESET",
        }
    }

    fn argument(&self) -> &str {
        match self {
            Marker::Start { document } => document,
            Marker::Done { identifier } => identifier,
            Marker::End | Marker::Reset => "",
        }
    }
}

/// A parsed (or about to be written) tagged log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub domain: String,
    pub version: String,
    pub marker: Marker,
    /// Free text after the tag.
    pub detail: String,
}

impl LogEntry {
    pub fn new(domain: &str, version: &str, marker: Marker) -> Self {
        Self {
            domain: domain.to_string(),
            version: version.to_string(),
            marker,
            detail: String::new(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    /// Append ` - <notes>` to the detail when notes are non-empty.
    pub fn with_notes(mut self, notes: &str) -> Self {
        let notes = notes.trim();
        if !notes.is_empty() {
            if self.detail.is_empty() {
                self.detail = notes.to_string();
            } else {
                let _ = write!(self.detail, " - {}", notes);
            }
        }
        self
    }

    pub fn in_namespace(&self, domain: &str, version: &str) -> bool {
        self.domain == domain && self.version == version
    }

    /// Parse the first well-formed tag in `text`.
    ///
    /// Returns `None` for untagged text, other grammar versions, undecodable
    /// fields, or markers with a misplaced argument.
    pub fn parse(text: &str) -> Option<LogEntry> {
        TAG_RE.captures_iter(text).find_map(|caps| {
            let whole = caps.get(0)?;
            if caps[1].parse::<u32>().ok()? != GRAMMAR_VERSION {
                return None;
            }
            let domain = unescape_field(&caps[2])?;
            let version = unescape_field(&caps[3])?;
            let argument = unescape_field(&caps[5])?;
            let marker = match (&caps[4], argument.is_empty()) {
                ("START", false) => Marker::Start { document: argument },
                ("DONE", false) => Marker::Done {
                    identifier: argument,
                },
                ("END", true) => Marker::End,
                ("RESET", true) => Marker::Reset,
                _ => return None,
            };
            Some(LogEntry {
                domain,
                version,
                marker,
                detail: text[whole.end()..].trim().to_string(),
            })
        })
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@waypoint/v{}:{}:{}:{}({})",
            GRAMMAR_VERSION,
            escape_field(&self.domain),
            escape_field(&self.version),
            self.marker.keyword(),
            escape_field(self.marker.argument()),
        )?;
        if !self.detail.is_empty() {
            write!(f, " {}", self.detail)?;
        }
        Ok(())
    }
}

fn is_reserved(c: char) -> bool {
    matches!(c, '%' | ':' | '(' | ')') || c.is_whitespace() || c.is_control()
}

/// Percent-encode the reserved characters of a tag field.
pub fn escape_field(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if is_reserved(c) {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                let _ = write!(out, "%{:02X}", byte);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Reverse of [`escape_field`]; `None` on a malformed escape or invalid UTF-8.
pub fn unescape_field(field: &str) -> Option<String> {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = field.get(i + 1..i + 3)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
