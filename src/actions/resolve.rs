//! Deciding what two same-key records really are.
//!
//! A partial-key collision is only a hint. [`Resolver::resolve`] settles it:
//! two paths onto one physical file are [`Resolution::AlreadyLinked`], equal
//! full-content signatures make a [`Resolution::Duplicate`], and everything
//! else (including any read failure) is [`Resolution::Distinct`].

use crate::config::RunOptions;
use crate::duplicates::identity::VerificationCache;
use crate::duplicates::index::{CandidateIndex, RecordId};
use crate::duplicates::stats::RunStats;
use crate::scanner::checksum::{contents_equal, full_signature};
use crate::scanner::ReadError;

/// Verdict on a candidate and the existing record it collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Both paths name the same physical file.
    AlreadyLinked,
    /// Separate files with identical contents.
    Duplicate,
    /// Not the same contents, or could not be verified.
    Distinct,
}

impl Resolution {
    /// Whether the pair counts as a match in the index.
    #[must_use]
    pub fn is_match(self) -> bool {
        !matches!(self, Self::Distinct)
    }
}

/// Settles partial-key collisions.
#[derive(Debug, Clone)]
pub struct Resolver {
    max_links: u64,
    paranoid: bool,
    warn_unreadable: bool,
}

impl Resolver {
    /// Create a resolver from the run settings.
    #[must_use]
    pub fn new(options: &RunOptions) -> Self {
        Self {
            max_links: options.max_links,
            paranoid: options.paranoid,
            warn_unreadable: options.warn_unreadable,
        }
    }

    /// Compare `candidate` against `existing`.
    ///
    /// Records a confirmed [`Resolution::Duplicate`] in `stats`. Full
    /// signatures are memoised in `cache`, so each record is read completely
    /// at most once however many collisions it takes part in.
    pub fn resolve(
        &self,
        index: &CandidateIndex,
        cache: &mut VerificationCache,
        stats: &mut RunStats,
        candidate: RecordId,
        existing: RecordId,
    ) -> Resolution {
        let cand = index.get(candidate);
        let prev = index.get(existing);
        debug_assert_eq!(cand.size, prev.size);

        if let (Some(a), Some(b)) = (cand.link.identity, prev.link.identity) {
            if a == b {
                log::debug!(
                    "{} and {} are the same file",
                    cand.path.display(),
                    prev.path.display()
                );
                return Resolution::AlreadyLinked;
            }
        }

        if prev.link.links >= self.max_links {
            log::debug!(
                "{} already has {} links, not matching against it",
                prev.path.display(),
                prev.link.links
            );
            return Resolution::Distinct;
        }

        let cand_sig = match cache.get_or_compute(candidate, || full_signature(&cand.path)) {
            Ok(sig) => sig,
            Err(e) => return self.unverified(&e),
        };
        let prev_sig = match cache.get_or_compute(existing, || full_signature(&prev.path)) {
            Ok(sig) => sig,
            Err(e) => return self.unverified(&e),
        };
        if cand_sig != prev_sig {
            log::trace!(
                "Partial match only: {} vs {}",
                cand.path.display(),
                prev.path.display()
            );
            return Resolution::Distinct;
        }

        if self.paranoid {
            match contents_equal(&cand.path, &prev.path) {
                Ok(true) => {}
                Ok(false) => {
                    log::warn!(
                        "Signature collision between '{}' and '{}'",
                        cand.path.display(),
                        prev.path.display()
                    );
                    return Resolution::Distinct;
                }
                Err(e) => return self.unverified(&e),
            }
        }

        stats.record_duplicate(cand.size);
        Resolution::Duplicate
    }

    fn unverified(&self, err: &ReadError) -> Resolution {
        if self.warn_unreadable {
            log::warn!("{}", err);
        } else {
            log::debug!("{}", err);
        }
        Resolution::Distinct
    }
}
