//! Filesystem utilities for quire.
//!
//! Output is never written in place: files are staged in a sibling
//! directory and swapped in as a whole, and each staged file is written
//! atomically.

pub mod atomic;
mod staging;

pub use atomic::{atomic_write, atomic_write_file};
pub use staging::StagedOutput;
