//! Scanner module: everything that touches a single file on disk.
//!
//! This module provides functionality for:
//! - Pattern enumeration with single-level and recursive (`**`) wildcards
//! - Rolling CRC/sum signatures over file content
//! - Physical identity (volume + node) and link count extraction
//! - Hard-link capability probing per volume
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Pattern expansion and sorted file discovery
//! - [`checksum`]: Partial and full content signatures
//! - [`hardlink`]: Physical identity from file metadata
//! - [`volume`]: Filesystem type lookup for hard-link support
//!
//! # Example
//!
//! ```no_run
//! use finddupe::scanner::{checksum, Walker};
//!
//! let walker = Walker::new("photos/**/*.jpg", false);
//! let matched = walker.for_each_file(|path| {
//!     let size = std::fs::metadata(path)?.len();
//!     let sig = checksum::partial_signature(path, size)?;
//!     println!("{sig} {size:10} {}", path.display());
//!     Ok::<(), Box<dyn std::error::Error>>(())
//! });
//! ```

pub mod checksum;
pub mod hardlink;
pub mod volume;
pub mod walker;

use std::path::PathBuf;

// Re-export main types
pub use checksum::{Signature, FULL_CHUNK_SIZE, PARTIAL_WINDOW};
pub use hardlink::{LinkInfo, PhysicalIdentity};
pub use volume::VolumeTable;
pub use walker::Walker;

/// Errors that can occur while reading file content.
///
/// These are always recoverable: the file is counted as unreadable (or,
/// during verification, as "not a duplicate") and the run continues.
#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    /// The file could not be opened.
    #[error("can't open '{path}': {source}")]
    Open {
        /// Path that failed to open
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Reading the file failed part way through.
    #[error("file read problem on '{path}': {source}")]
    Read {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Fewer bytes were available than the recorded size promised.
    #[error("file read problem on '{path}': expected {expected} bytes, got {actual}")]
    ShortRead {
        /// Path that was read
        path: PathBuf,
        /// Bytes requested
        expected: u64,
        /// Bytes actually read
        actual: u64,
    },
}

impl ReadError {
    /// Path of the file that could not be read.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Open { path, .. } | Self::Read { path, .. } | Self::ShortRead { path, .. } => {
                path
            }
        }
    }
}
