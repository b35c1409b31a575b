//! finddupe - duplicate file finder and eliminator
//!
//! Finds files with identical contents across one or more directory trees
//! and reports them, replaces the later copies with hard links to the first,
//! deletes them, or writes a script doing so. A second mode lists groups of
//! existing hard links.
//!
//! Files are processed strictly one at a time in enumeration order. Each is
//! keyed by size and a signature of its first 32 KiB, and only files that
//! collide on both are read in full.

pub mod actions;
pub mod app;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

pub use app::run_app;
