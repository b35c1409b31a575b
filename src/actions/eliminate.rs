//! Acting on confirmed duplicates.
//!
//! # Overview
//!
//! The [`Eliminator`] receives each confirmed pair (the earlier record is
//! kept, the later one is the candidate) and, depending on the run mode:
//!
//! - reports it and does nothing else
//! - writes script commands that would replace or delete the candidate
//! - deletes the candidate and recreates it as a hard link to the kept file
//! - deletes the candidate outright
//!
//! Any file-system step that fails after the tool has started changing
//! things ends the run with a [`FatalError`], so a half-linked tree is never
//! left behind silently.
//!
//! # Read-only files
//!
//! Read-only candidates are skipped unless the run opted in. When acted on,
//! the write bit is cleared before deletion and the original permissions and
//! modification time are put back on the new link.

use std::fs::{self, Metadata};
use std::io::Write;
use std::path::Path;

use filetime::FileTime;

use crate::config::{EliminationMode, RunOptions};
use crate::duplicates::index::{CandidateIndex, RecordId};
use crate::error::FatalError;
use crate::output::script::{ScriptEntry, ScriptWriter};
use crate::scanner::hardlink::volume_of;
use crate::scanner::VolumeTable;

/// What happened to a confirmed duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Report-only run; nothing touched.
    Reported,
    /// Read-only candidate left alone.
    ReadOnlySkipped,
    /// Already the same file; no link to create.
    NothingToDo,
    /// Commands were written to the script.
    Scripted {
        /// Whether the block recreates the candidate as a link
        linked: bool,
    },
    /// Candidate replaced with a hard link.
    Linked,
    /// Candidate deleted.
    Deleted,
}

/// Applies the run's elimination mode to confirmed pairs.
pub struct Eliminator {
    mode: EliminationMode,
    include_readonly: bool,
    volumes: VolumeTable,
    script: Option<ScriptWriter<Box<dyn Write>>>,
}

impl std::fmt::Debug for Eliminator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Eliminator")
            .field("mode", &self.mode)
            .field("include_readonly", &self.include_readonly)
            .field("scripted", &self.script.is_some())
            .finish()
    }
}

impl Eliminator {
    /// Create an eliminator that acts on the file system directly.
    #[must_use]
    pub fn new(options: &RunOptions, volumes: VolumeTable) -> Self {
        Self {
            mode: options.mode,
            include_readonly: options.include_readonly,
            volumes,
            script: None,
        }
    }

    /// Write actions to `script` instead of performing them.
    #[must_use]
    pub fn with_script(mut self, script: ScriptWriter<Box<dyn Write>>) -> Self {
        self.script = Some(script);
        self
    }

    /// Act on `candidate`, a confirmed duplicate of `existing`.
    ///
    /// `hardlinked` is true when both already name the same physical file.
    /// A newly created or scripted link bumps the kept record's link count.
    ///
    /// # Errors
    ///
    /// Any failure after the run started modifying the tree is fatal:
    /// [`FatalError::FileVanished`], [`FatalError::VolumeUnsupported`],
    /// [`FatalError::CrossVolumeLink`], [`FatalError::DeleteFailed`],
    /// [`FatalError::LinkFailed`] or a script write error.
    pub fn apply(
        &mut self,
        index: &mut CandidateIndex,
        candidate: RecordId,
        existing: RecordId,
        hardlinked: bool,
    ) -> Result<Outcome, FatalError> {
        if self.mode == EliminationMode::ReportOnly {
            return Ok(Outcome::Reported);
        }

        let cand_path = index.get(candidate).path.clone();
        let prev_path = index.get(existing).path.clone();

        let metadata = fs::metadata(&cand_path).map_err(|source| FatalError::FileVanished {
            path: cand_path.clone(),
            source,
        })?;
        let readonly = is_readonly(&metadata);

        if readonly && !self.include_readonly && !hardlinked {
            log::debug!("Leaving read-only {}", cand_path.display());
            return Ok(Outcome::ReadOnlySkipped);
        }

        if !self.volumes.supports_hard_links(&cand_path) {
            return Err(FatalError::VolumeUnsupported { path: cand_path });
        }

        let linking = self.mode == EliminationMode::HardLink;
        if linking && hardlinked && self.script.is_none() {
            return Ok(Outcome::NothingToDo);
        }

        if linking && !hardlinked {
            let cand_volume = index.get(candidate).link.identity.map(|id| id.volume);
            let prev_volume = match index.get(existing).link.identity {
                Some(id) => Some(id.volume),
                None => fs::metadata(&prev_path).ok().as_ref().and_then(volume_of),
            };
            if let (Some(a), Some(b)) = (cand_volume.or_else(|| volume_of(&metadata)), prev_volume) {
                if a != b {
                    return Err(FatalError::CrossVolumeLink {
                        first: prev_path,
                        second: cand_path,
                    });
                }
            }
        }

        if let Some(script) = self.script.as_mut() {
            let linked = script.write_block(&ScriptEntry {
                candidate: &cand_path,
                existing: &prev_path,
                readonly,
                hardlinked,
                delete_only: self.mode == EliminationMode::DeleteOnly,
            })?;
            if linked {
                index.get_mut(existing).link.links += 1;
            }
            return Ok(Outcome::Scripted { linked });
        }

        if readonly {
            make_writable(&cand_path, &metadata);
        }
        fs::remove_file(&cand_path).map_err(|source| FatalError::DeleteFailed {
            path: cand_path.clone(),
            source,
        })?;

        if !linking {
            log::info!("Deleted {}", cand_path.display());
            return Ok(Outcome::Deleted);
        }

        fs::hard_link(&prev_path, &cand_path).map_err(|source| FatalError::LinkFailed {
            existing: prev_path.clone(),
            path: cand_path.clone(),
            source,
        })?;
        restore_attributes(&cand_path, &metadata);
        index.get_mut(existing).link.links += 1;
        log::info!(
            "Linked {} to {}",
            cand_path.display(),
            prev_path.display()
        );
        Ok(Outcome::Linked)
    }

    /// Flush the script, if any.
    ///
    /// # Errors
    ///
    /// Returns [`FatalError::ScriptWrite`] if the final flush fails.
    pub fn finish(self) -> Result<(), FatalError> {
        if let Some(script) = self.script {
            let blocks = script.blocks();
            let kind = script.kind();
            script.finish()?;
            log::debug!("{:?} script complete with {} blocks", kind, blocks);
        }
        Ok(())
    }
}

#[cfg(unix)]
fn is_readonly(metadata: &Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o200 == 0
}

#[cfg(not(unix))]
fn is_readonly(metadata: &Metadata) -> bool {
    metadata.permissions().readonly()
}

#[cfg(unix)]
fn make_writable(path: &Path, metadata: &Metadata) {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = metadata.permissions();
    perms.set_mode(perms.mode() | 0o200);
    if let Err(e) = fs::set_permissions(path, perms) {
        log::warn!("Could not clear read-only on '{}': {}", path.display(), e);
    }
}

#[cfg(not(unix))]
#[allow(clippy::permissions_set_readonly_false)]
fn make_writable(path: &Path, metadata: &Metadata) {
    let mut perms = metadata.permissions();
    perms.set_readonly(false);
    if let Err(e) = fs::set_permissions(path, perms) {
        log::warn!("Could not clear read-only on '{}': {}", path.display(), e);
    }
}

fn restore_attributes(path: &Path, metadata: &Metadata) {
    if let Err(e) = fs::set_permissions(path, metadata.permissions()) {
        log::warn!("Could not restore permissions on '{}': {}", path.display(), e);
    }
    let mtime = FileTime::from_last_modification_time(metadata);
    if let Err(e) = filetime::set_file_times(path, mtime, mtime) {
        log::warn!("Could not restore times on '{}': {}", path.display(), e);
    }
}
