//! Stable exit codes for waypoint CLI commands.

/// Command succeeded (or `next` served a piece).
pub const OK: i32 = 0;
/// Command failed: missing input, malformed document, or other errors.
pub const INVALID: i32 = 1;
/// `waypoint next` found nothing left to serve (journey complete).
pub const COMPLETE: i32 = 2;
/// `waypoint validate` reported advisory issues.
pub const ISSUES: i32 = 3;
