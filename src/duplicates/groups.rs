//! Hard-link group reconstruction.
//!
//! # Overview
//!
//! In hard-link-search mode every record is keyed by its physical identity,
//! so all instances of one physical file found by the search sit in a single
//! equal-key chain of their size bucket. This module walks each bucket once
//! and turns every chain into a [`HardlinkGroup`].
//!
//! The walk is iterative with an explicit stack, so a bucket that
//! degenerated into a long list cannot exhaust the call stack. A chain is
//! always collected from its head, which means it is reported whole and
//! exactly once.
//!
//! # Example
//!
//! ```
//! use finddupe::duplicates::groups::reconstruct_groups;
//! use finddupe::duplicates::index::CandidateIndex;
//!
//! let index = CandidateIndex::new();
//! assert!(reconstruct_groups(&index).is_empty());
//! ```

use std::path::PathBuf;

use super::index::{CandidateIndex, RecordId};
use crate::scanner::PhysicalIdentity;

/// Instances of one physical file found by the search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardlinkGroup {
    /// File size shared by every instance
    pub size: u64,
    /// Physical identity of the file
    pub identity: Option<PhysicalIdentity>,
    /// Link count recorded for the file
    pub links: u64,
    /// Paths found, in discovery order
    pub paths: Vec<PathBuf>,
}

impl HardlinkGroup {
    /// Number of instances found.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the group holds no paths.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Whether the search found every link the filesystem reports.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.paths.len() as u64 >= self.links
    }
}

/// Walk every bucket, smallest size first, and collect one group per chain.
#[must_use]
pub fn reconstruct_groups(index: &CandidateIndex) -> Vec<HardlinkGroup> {
    let mut groups = Vec::new();
    let mut stack: Vec<RecordId> = Vec::new();

    for (size, root) in index.buckets_by_size() {
        stack.push(root);
        while let Some(head) = stack.pop() {
            let chain = index.chain(head);

            // Pushed first, so visited after every smaller subtree below.
            if let Some(&tail) = chain.last() {
                if let Some(larger) = index.get(tail).larger() {
                    stack.push(larger);
                }
            }
            for &member in chain.iter().rev() {
                if let Some(smaller) = index.get(member).smaller() {
                    stack.push(smaller);
                }
            }

            let first = index.get(head);
            log::trace!(
                "Chain of {} at size {} (record {})",
                chain.len(),
                size,
                head.index()
            );
            groups.push(HardlinkGroup {
                size,
                identity: first.link.identity,
                links: first.link.links,
                paths: chain.iter().map(|&id| index.get(id).path.clone()).collect(),
            });
        }
    }

    groups
}
