//! I/O helpers for waypoint commands.

pub mod atomic;
pub mod compiler;
pub mod config;
pub mod document_store;
pub mod log_sink;
pub mod render;
