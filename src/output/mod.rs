//! Output formatting for a run.
//!
//! This module provides:
//! - Console report lines (duplicates, signatures, hard-link groups, summary)
//! - Batch and POSIX scripts for deferred elimination
//!
//! # Example
//!
//! ```
//! use finddupe::output::report;
//! use std::path::Path;
//!
//! let lines = report::duplicate_lines(Path::new("a.txt"), Path::new("b.txt"), false);
//! assert_eq!(lines[0], "Duplicate: 'a.txt'");
//! ```

pub mod report;
pub mod script;

// Re-export main types
pub use script::{ScriptEntry, ScriptKind, ScriptWriter};
