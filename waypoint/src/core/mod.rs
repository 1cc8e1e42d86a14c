//! Deterministic, pure logic shared by the compiler and the traversal engine.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod classifier;
pub mod extract;
pub mod invariants;
pub mod log_entry;
pub mod receipt;
pub mod reconstruct;
pub mod traversal;
