//! Path admission and full-signature memoisation.
//!
//! [`IdentityIndex`] remembers every path handed to the engine so a file
//! matched by two overlapping patterns is only processed once.
//! [`VerificationCache`] keeps the full-content signature of each record
//! that has been read completely, so a file that meets several partial-key
//! collisions is only read once.
//!
//! Both are keyed by value (the path itself, or the arena handle), never by
//! a hash of the path text.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use super::index::RecordId;
use crate::error::FatalError;
use crate::scanner::{ReadError, Signature};

/// Result of offering a path to the [`IdentityIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// First time this path was seen.
    New,
    /// The path was already admitted earlier in the run.
    RepeatPath,
}

/// Set of paths already accepted this run.
#[derive(Debug, Default)]
pub struct IdentityIndex {
    seen: HashSet<PathBuf>,
}

impl IdentityIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path`, reporting whether it was new.
    ///
    /// # Errors
    ///
    /// Returns [`FatalError::OutOfMemory`] if the set cannot grow.
    pub fn admit(&mut self, path: &Path) -> Result<Admission, FatalError> {
        if self.seen.contains(path) {
            return Ok(Admission::RepeatPath);
        }
        self.seen.try_reserve(1)?;
        self.seen.insert(path.to_path_buf());
        Ok(Admission::New)
    }

    /// Number of admitted paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing was admitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Full-content signatures computed so far, by record.
#[derive(Debug, Default)]
pub struct VerificationCache {
    full: HashMap<RecordId, Signature>,
}

impl VerificationCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Previously computed signature for `id`.
    #[must_use]
    pub fn lookup(&self, id: RecordId) -> Option<Signature> {
        self.full.get(&id).copied()
    }

    /// Remember the signature for `id`.
    pub fn store(&mut self, id: RecordId, signature: Signature) {
        self.full.insert(id, signature);
    }

    /// Cached signature for `id`, computing and storing it on a miss.
    ///
    /// Failures are not cached, so a later comparison retries the read.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `compute`.
    pub fn get_or_compute<F>(&mut self, id: RecordId, compute: F) -> Result<Signature, ReadError>
    where
        F: FnOnce() -> Result<Signature, ReadError>,
    {
        if let Some(sig) = self.lookup(id) {
            log::trace!("Full signature cache hit for record {}", id.index());
            return Ok(sig);
        }
        let sig = compute()?;
        self.store(id, sig);
        Ok(sig)
    }

    /// Number of cached signatures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.full.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.full.is_empty()
    }
}
