//! Compile directories of numbered content files into sequence documents and
//! walk them one piece at a time, with progress recovered from an append-only
//! log.
//!
//! - **[`core`]**: Pure, deterministic logic (extraction, classification,
//!   validation, the log tag grammar, progress reconstruction, traversal).
//!   No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (directory compilation, document
//!   persistence, rendering, configuration, log sinks).
//!
//! [`journey`] coordinates the two to implement the `start`, `next`,
//! `progress` and `reset` commands.

pub mod core;
pub mod document;
pub mod errors;
pub mod exit_codes;
pub mod io;
pub mod journey;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
