//! Size-bucketed candidate index.
//!
//! # Overview
//!
//! Every accepted file becomes a [`FileRecord`] in an append-only arena and
//! is addressed by a [`RecordId`]. Records of one exact size share a bucket;
//! each bucket is an unbalanced binary tree ordered by [`MatchKey`], which is
//! the partial content signature normally and the physical identity in
//! hard-link-search mode.
//!
//! Records with equal keys form a chain: starting at the first one inserted,
//! each next member is that record's `larger` child. Nothing with a different
//! key is ever placed inside a chain, which is what lets the group walk in
//! [`super::groups`] report each chain in one piece.
//!
//! # Insertion
//!
//! [`CandidateIndex::insert_with`] walks the bucket. On a key match with a
//! different path it asks the caller to compare the two files:
//!
//! - [`Comparison::Matched`] stops the walk. The new record stays in the arena
//!   but is not linked into the tree.
//! - [`Comparison::Distinct`] moves on to the next chain member; after the
//!   last one the new record is spliced in as the chain's new tail.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::FatalError;
use crate::scanner::{LinkInfo, PhysicalIdentity, Signature};

/// Stable handle to a record in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(usize);

impl RecordId {
    /// Position in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Ordering key inside a bucket tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchKey {
    hi: u64,
    lo: u64,
}

impl From<Signature> for MatchKey {
    fn from(sig: Signature) -> Self {
        Self {
            hi: u64::from(sig.crc),
            lo: u64::from(sig.sum),
        }
    }
}

impl From<PhysicalIdentity> for MatchKey {
    fn from(id: PhysicalIdentity) -> Self {
        Self {
            hi: id.volume,
            lo: id.node,
        }
    }
}

/// One file accepted into the index.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Path as produced by enumeration
    pub path: PathBuf,
    /// Exact byte length
    pub size: u64,
    /// Tree ordering key
    pub key: MatchKey,
    /// Partial content signature, absent in hard-link-search mode
    pub signature: Option<Signature>,
    /// Physical identity and link count, updated when links are added
    pub link: LinkInfo,
    /// Protected content: compared against, never eliminated
    pub reference: bool,
    smaller: Option<RecordId>,
    larger: Option<RecordId>,
}

impl FileRecord {
    /// Create an unattached record.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, key: MatchKey, link: LinkInfo) -> Self {
        Self {
            path,
            size,
            key,
            signature: None,
            link,
            reference: false,
            smaller: None,
            larger: None,
        }
    }

    /// Attach the partial signature this record was keyed by.
    #[must_use]
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    /// Mark this record as reference content.
    #[must_use]
    pub fn with_reference(mut self, reference: bool) -> Self {
        self.reference = reference;
        self
    }

    /// Child with a lower key.
    #[must_use]
    pub fn smaller(&self) -> Option<RecordId> {
        self.smaller
    }

    /// Child with a higher key, or the next member of this record's chain.
    #[must_use]
    pub fn larger(&self) -> Option<RecordId> {
        self.larger
    }
}

/// Caller's verdict on two records with equal keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// The candidate is accounted for by the existing record.
    Matched,
    /// Keep looking; the candidate is a different file.
    Distinct,
}

/// Where an inserted record ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// First record of its size; now the bucket root.
    NewBucket,
    /// Attached as a child of `parent` after a key mismatch.
    Attached {
        /// Record whose child slot now holds the new record
        parent: RecordId,
    },
    /// Appended to the tail of an equal-key chain.
    ChainTail {
        /// Previous tail of the chain
        after: RecordId,
    },
    /// Matched an existing record and was left out of the tree.
    Matched {
        /// Record it matched
        existing: RecordId,
    },
    /// Same path is already in the tree; nothing changed.
    RepeatPath {
        /// Record holding that path
        existing: RecordId,
    },
}

/// Arena of records plus the per-size tree roots.
#[derive(Debug, Default)]
pub struct CandidateIndex {
    records: Vec<FileRecord>,
    buckets: HashMap<u64, RecordId>,
}

impl CandidateIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in the arena, including matched ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record was ever pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of distinct sizes seen.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Borrow a record.
    #[must_use]
    pub fn get(&self, id: RecordId) -> &FileRecord {
        &self.records[id.0]
    }

    /// Mutably borrow a record.
    pub fn get_mut(&mut self, id: RecordId) -> &mut FileRecord {
        &mut self.records[id.0]
    }

    /// Root of the tree holding files of `size`.
    #[must_use]
    pub fn bucket_root(&self, size: u64) -> Option<RecordId> {
        self.buckets.get(&size).copied()
    }

    /// Bucket roots ordered by size.
    #[must_use]
    pub fn buckets_by_size(&self) -> Vec<(u64, RecordId)> {
        let mut roots: Vec<(u64, RecordId)> =
            self.buckets.iter().map(|(&size, &root)| (size, root)).collect();
        roots.sort_unstable();
        roots
    }

    /// Append a record to the arena without placing it in a tree.
    ///
    /// # Errors
    ///
    /// Returns [`FatalError::OutOfMemory`] if the arena cannot grow.
    pub fn push(&mut self, record: FileRecord) -> Result<RecordId, FatalError> {
        self.records.try_reserve(1)?;
        let id = RecordId(self.records.len());
        self.records.push(record);
        Ok(id)
    }

    /// Records of the equal-key chain that starts at `head`, in chain order.
    #[must_use]
    pub fn chain(&self, head: RecordId) -> Vec<RecordId> {
        let key = self.get(head).key;
        let mut members = vec![head];
        let mut cur = head;
        while let Some(next) = self.get(cur).larger {
            if self.get(next).key != key {
                break;
            }
            members.push(next);
            cur = next;
        }
        members
    }

    /// Place a pushed record into its size bucket.
    ///
    /// `compare(index, candidate, existing)` is called for every record met
    /// along the way whose key equals the candidate's and whose path differs.
    /// It may update records through the index it is handed.
    ///
    /// # Errors
    ///
    /// Returns whatever `compare` returns, or [`FatalError::OutOfMemory`] if
    /// a new bucket cannot be allocated.
    pub fn insert_with<F>(&mut self, id: RecordId, mut compare: F) -> Result<Placement, FatalError>
    where
        F: FnMut(&mut Self, RecordId, RecordId) -> Result<Comparison, FatalError>,
    {
        let size = self.get(id).size;
        let key = self.get(id).key;

        let Some(mut cur) = self.bucket_root(size) else {
            self.buckets.try_reserve(1)?;
            self.buckets.insert(size, id);
            return Ok(Placement::NewBucket);
        };

        loop {
            match key.cmp(&self.get(cur).key) {
                Ordering::Less => match self.get(cur).smaller {
                    Some(next) => cur = next,
                    None => {
                        self.get_mut(cur).smaller = Some(id);
                        return Ok(Placement::Attached { parent: cur });
                    }
                },
                Ordering::Greater => match self.get(cur).larger {
                    Some(next) => cur = next,
                    None => {
                        self.get_mut(cur).larger = Some(id);
                        return Ok(Placement::Attached { parent: cur });
                    }
                },
                Ordering::Equal => {
                    if self.get(cur).path == self.get(id).path {
                        return Ok(Placement::RepeatPath { existing: cur });
                    }
                    if compare(self, id, cur)? == Comparison::Matched {
                        return Ok(Placement::Matched { existing: cur });
                    }

                    let next = self.get(cur).larger;
                    match next {
                        Some(n) if self.get(n).key == key => cur = n,
                        _ => {
                            self.get_mut(id).larger = next;
                            self.get_mut(cur).larger = Some(id);
                            return Ok(Placement::ChainTail { after: cur });
                        }
                    }
                }
            }
        }
    }
}
