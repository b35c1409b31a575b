//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Path admission, so overlapping patterns cost nothing ([`identity`])
//! - Size buckets holding signature-ordered comparison trees ([`index`])
//! - The per-file pipeline driving resolution and elimination ([`finder`])
//! - Hard-link group reconstruction ([`groups`])
//! - Run statistics ([`stats`])

pub mod finder;
pub mod groups;
pub mod identity;
pub mod index;
pub mod stats;

// Re-export main types
pub use finder::{Disposition, DuplicateFinder};
pub use groups::{reconstruct_groups, HardlinkGroup};
pub use identity::{Admission, IdentityIndex, VerificationCache};
pub use index::{CandidateIndex, Comparison, FileRecord, MatchKey, Placement, RecordId};
pub use stats::RunStats;
