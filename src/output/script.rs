//! Script generation for deferred duplicate elimination.
//!
//! With `-bat <file>` nothing on disk is changed during the run. Each
//! confirmed duplicate instead becomes a block of commands in a script the
//! user can review and run later.
//!
//! # Dialects
//!
//! * **Batch**: `del`, `fsutil hardlink create`, `attrib +r`. Names are
//!   double-quoted and `%` is doubled so `cmd` does not expand variables.
//! * **POSIX**: `rm`, `ln`, `chmod a-w`. Names are single-quoted with
//!   embedded quotes written as `'\''`, so nothing inside is expanded.
//!
//! # Usage
//!
//! ```
//! use finddupe::output::script::{ScriptEntry, ScriptKind, ScriptWriter};
//! use std::path::Path;
//!
//! let mut writer = ScriptWriter::new(Vec::new(), ScriptKind::Posix);
//! writer.write_header().unwrap();
//! writer
//!     .write_block(&ScriptEntry {
//!         candidate: Path::new("copy.jpg"),
//!         existing: Path::new("orig.jpg"),
//!         readonly: false,
//!         hardlinked: false,
//!         delete_only: false,
//!     })
//!     .unwrap();
//! let script = String::from_utf8(writer.finish().unwrap()).unwrap();
//! assert!(script.contains("ln -- 'orig.jpg' 'copy.jpg'"));
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::FatalError;

/// Script dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    /// Windows `cmd` batch file
    Batch,
    /// POSIX `sh` script
    Posix,
}

impl ScriptKind {
    /// Dialect native to the current platform.
    #[must_use]
    pub fn platform_default() -> Self {
        if cfg!(windows) {
            Self::Batch
        } else {
            Self::Posix
        }
    }

    /// Dialect implied by a script file name.
    #[must_use]
    pub fn detect(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        match ext.as_deref() {
            Some("bat" | "cmd") => Self::Batch,
            Some("sh") => Self::Posix,
            _ => Self::platform_default(),
        }
    }
}

/// One confirmed duplicate to script.
#[derive(Debug, Clone, Copy)]
pub struct ScriptEntry<'a> {
    /// File to remove
    pub candidate: &'a Path,
    /// File that is kept
    pub existing: &'a Path,
    /// Candidate was read-only when examined
    pub readonly: bool,
    /// Both paths already name the same physical file
    pub hardlinked: bool,
    /// Delete without relinking
    pub delete_only: bool,
}

/// Writes script blocks to any [`Write`] sink.
pub struct ScriptWriter<W: Write> {
    out: W,
    kind: ScriptKind,
    blocks: usize,
}

impl ScriptWriter<Box<dyn Write>> {
    /// Create (truncate) the script file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FatalError::ScriptCreate`] if the file cannot be created.
    pub fn create(path: &Path, kind: ScriptKind) -> Result<Self, FatalError> {
        let file = File::create(path).map_err(|source| FatalError::ScriptCreate {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Writing {:?} script to {}", kind, path.display());
        Ok(Self::new(Box::new(BufWriter::new(file)), kind))
    }
}

impl<W: Write> ScriptWriter<W> {
    /// Wrap a sink.
    #[must_use]
    pub fn new(out: W, kind: ScriptKind) -> Self {
        Self {
            out,
            kind,
            blocks: 0,
        }
    }

    /// Dialect being written.
    #[must_use]
    pub fn kind(&self) -> ScriptKind {
        self.kind
    }

    /// Number of blocks written so far.
    #[must_use]
    pub fn blocks(&self) -> usize {
        self.blocks
    }

    /// Write the identifying header.
    ///
    /// # Errors
    ///
    /// Returns [`FatalError::ScriptWrite`] on I/O failure.
    pub fn write_header(&mut self) -> Result<(), FatalError> {
        let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let text = match self.kind {
            ScriptKind::Batch => format!(
                "@echo off\n\
                 REM Batch file for replacing duplicates with hard links\n\
                 REM created by finddupe on {stamp}\n\n"
            ),
            ScriptKind::Posix => format!(
                "#!/bin/sh\n\
                 # Script for replacing duplicates with hard links\n\
                 # created by finddupe on {stamp}\n\n"
            ),
        };
        self.emit(&text)
    }

    /// Write the commands for one duplicate.
    ///
    /// Returns `true` when the block recreates the candidate as a link to
    /// the existing file.
    ///
    /// # Errors
    ///
    /// Returns [`FatalError::ScriptWrite`] on I/O failure.
    pub fn write_block(&mut self, entry: &ScriptEntry<'_>) -> Result<bool, FatalError> {
        let (text, links) = match self.kind {
            ScriptKind::Batch => batch_block(entry),
            ScriptKind::Posix => posix_block(entry),
        };
        self.emit(&text)?;
        self.blocks += 1;
        Ok(links)
    }

    /// Flush and hand back the sink.
    ///
    /// # Errors
    ///
    /// Returns [`FatalError::ScriptWrite`] if flushing fails.
    pub fn finish(mut self) -> Result<W, FatalError> {
        self.out
            .flush()
            .map_err(|source| FatalError::ScriptWrite { source })?;
        Ok(self.out)
    }

    fn emit(&mut self, text: &str) -> Result<(), FatalError> {
        self.out
            .write_all(text.as_bytes())
            .map_err(|source| FatalError::ScriptWrite { source })
    }
}

fn batch_block(entry: &ScriptEntry<'_>) -> (String, bool) {
    let cand = escape_batch(entry.candidate);
    let existing = escape_batch(entry.existing);
    let force = if entry.readonly { "/F " } else { "" };
    let mut text = format!("del {force}\"{cand}\"\n");

    if entry.delete_only {
        text.push_str(&format!("rem duplicate of \"{existing}\"\n"));
        return (text, false);
    }
    if entry.hardlinked {
        text.push_str(&format!("rem \"{cand}\" already hardlinked to \"{existing}\"\n"));
        return (text, false);
    }

    text.push_str(&format!("fsutil hardlink create \"{cand}\" \"{existing}\"\n"));
    if entry.readonly {
        text.push_str(&format!("attrib +r \"{cand}\"\n"));
    }
    (text, true)
}

fn posix_block(entry: &ScriptEntry<'_>) -> (String, bool) {
    let cand = escape_posix(entry.candidate);
    let existing = escape_posix(entry.existing);
    let force = if entry.readonly { "-f " } else { "" };
    let mut text = format!("rm {force}-- {cand}\n");

    if entry.delete_only {
        text.push_str(&format!("# duplicate of {existing}\n"));
        return (text, false);
    }
    if entry.hardlinked {
        text.push_str(&format!("# {cand} already hardlinked to {existing}\n"));
        return (text, false);
    }

    text.push_str(&format!("ln -- {existing} {cand}\n"));
    if entry.readonly {
        text.push_str(&format!("chmod a-w -- {cand}\n"));
    }
    (text, true)
}

/// Double `%` so `cmd` leaves the name alone.
fn escape_batch(path: &Path) -> String {
    path.to_string_lossy().replace('%', "%%")
}

fn escape_posix(path: &Path) -> String {
    let s = path.to_string_lossy();
    // Wrap in single quotes, escape single quotes as '\''
    format!("'{}'", s.replace('\'', "'\\''"))
}
