//! Fatal error conditions and exit codes.
//!
//! Anything in [`FatalError`] stops the run where it happens. The engine
//! returns it through ordinary `Result`s and only the top-level driver turns
//! it into a process exit, so nothing already done on disk is rolled back.

use std::path::PathBuf;

/// Exit codes for the finddupe application.
///
/// - 0: Success (completed normally)
/// - 1: Failure (usage problem, nothing to process, or a fatal condition)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// The run completed.
    Success = 0,
    /// The run stopped or had nothing to do.
    Failure = 1,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "FD000",
            Self::Failure => "FD001",
        }
    }
}

/// Conditions that terminate the run.
#[derive(thiserror::Error, Debug)]
pub enum FatalError {
    /// Growing the in-memory index failed.
    #[error("Malloc failure: could not grow the file index")]
    OutOfMemory,

    /// Deleting a confirmed duplicate failed.
    #[error("Delete of '{path}' failed: {source}")]
    DeleteFailed {
        /// File that could not be deleted
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Creating the replacement link failed after the duplicate was deleted.
    #[error("Create hard link from '{existing}' to '{path}' failed: {source}")]
    LinkFailed {
        /// File the link should point at
        existing: PathBuf,
        /// Former path of the deleted duplicate
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A file that was read moments ago can no longer be examined.
    #[error("stat failed on '{path}': {source}")]
    FileVanished {
        /// File that vanished
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An action was requested on a filesystem that cannot hold hard links.
    #[error("Volume holding '{path}' does not support hard links")]
    VolumeUnsupported {
        /// File on the unsupported volume
        path: PathBuf,
    },

    /// Hard-link mode spans two volumes.
    #[error("Hardlinking across different drives not possible ('{first}' and '{second}')")]
    CrossVolumeLink {
        /// A path on the first volume
        first: PathBuf,
        /// A path on the second volume
        second: PathBuf,
    },

    /// The script file could not be created.
    #[error("Unable to open script file '{path}': {source}")]
    ScriptCreate {
        /// Requested script path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Writing to the script file failed.
    #[error("Unable to write script file: {source}")]
    ScriptWrite {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// No pattern matched any file.
    #[error("No files matched any pattern")]
    NoFilesMatched,

    /// Files matched but none made it into the index.
    #[error("No files to process")]
    NoFilesProcessed,

    /// Hard-link search needs physical identities the platform cannot provide.
    #[error("Hard link search is not supported on this platform")]
    HardlinkSearchUnsupported,
}

impl From<std::collections::TryReserveError> for FatalError {
    fn from(_: std::collections::TryReserveError) -> Self {
        Self::OutOfMemory
    }
}
