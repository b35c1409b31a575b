//! Per-file pipeline and run context.
//!
//! # Overview
//!
//! [`DuplicateFinder`] owns everything one run needs: the candidate index,
//! the set of admitted paths, the full-signature cache, the statistics and
//! the elimination settings. Files are fed to it one at a time, in the
//! order the enumerator yields them, and each goes through:
//!
//! 1. **Admission** - a path already seen this run is dropped
//! 2. **Filters** - ignored names, unreadable files, empty files
//! 3. **Keying** - partial content signature, or physical identity in
//!    hard-link-search mode
//! 4. **Insertion** - the record is placed in its size bucket; every
//!    same-key record met on the way is resolved and, when it turns out to
//!    be a duplicate, eliminated
//!
//! Nothing is buffered: a duplicate is acted on as soon as its second copy
//! is seen, so the first path found is always the one that is kept.
//!
//! # Example
//!
//! ```no_run
//! use finddupe::config::{EliminationMode, RunOptions};
//! use finddupe::duplicates::DuplicateFinder;
//!
//! let options = RunOptions {
//!     mode: EliminationMode::HardLink,
//!     ..RunOptions::default()
//! };
//! let mut finder = DuplicateFinder::new(options)?;
//! finder.process_pattern("photos/**", false)?;
//! let stats = finder.finish()?;
//! println!("{} duplicates, {} bytes", stats.duplicate_files, stats.duplicate_bytes);
//! # Ok::<(), finddupe::error::FatalError>(())
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::groups::{reconstruct_groups, HardlinkGroup};
use super::identity::{Admission, IdentityIndex, VerificationCache};
use super::index::{CandidateIndex, Comparison, FileRecord, MatchKey, Placement, RecordId};
use super::stats::RunStats;
use crate::actions::{Eliminator, Outcome, Resolution, Resolver};
use crate::config::RunOptions;
use crate::error::FatalError;
use crate::output::report;
use crate::output::script::ScriptWriter;
use crate::progress::{Progress, ProgressCallback};
use crate::scanner::checksum::partial_signature;
use crate::scanner::{LinkInfo, VolumeTable, Walker};

/// What the pipeline did with one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The script output file itself.
    Excluded,
    /// Path already processed this run.
    RepeatPath,
    /// Name matched an ignore substring.
    Ignored,
    /// Could not be examined or read.
    Unreadable,
    /// Empty file, skipped.
    ZeroLength,
    /// Hard-link search: only one link, nothing to group.
    SingleLink,
    /// Recorded in the index.
    Indexed(Placement),
}

/// Resolution and elimination state handed to the index walk.
struct PairHandler {
    options: RunOptions,
    resolver: Resolver,
    cache: VerificationCache,
    eliminator: Eliminator,
    stats: RunStats,
    progress: Arc<dyn ProgressCallback>,
}

impl PairHandler {
    fn say(&self, line: &str) {
        self.progress.on_line(line);
    }

    fn say_all(&self, lines: &[String]) {
        for line in lines {
            self.progress.on_line(line);
        }
    }

    /// Settle a same-key meeting between `candidate` and `existing`.
    fn compare(
        &mut self,
        index: &mut CandidateIndex,
        candidate: RecordId,
        existing: RecordId,
    ) -> Result<Comparison, FatalError> {
        if self.options.hardlink_search || index.get(candidate).reference {
            return Ok(Comparison::Distinct);
        }

        let resolution =
            self.resolver
                .resolve(index, &mut self.cache, &mut self.stats, candidate, existing);
        let hardlinked = match resolution {
            Resolution::Distinct => return Ok(Comparison::Distinct),
            Resolution::AlreadyLinked => true,
            Resolution::Duplicate => false,
        };

        let cand_path = index.get(candidate).path.clone();
        let show = self.options.print_duplicates && !(hardlinked && self.options.hide_already_linked);
        if show {
            let existing_path = &index.get(existing).path;
            self.say_all(&report::duplicate_lines(existing_path, &cand_path, hardlinked));
        }

        let outcome = self.eliminator.apply(index, candidate, existing, hardlinked)?;
        if show || outcome == Outcome::ReadOnlySkipped {
            if let Some(line) = report::outcome_line(outcome, &cand_path) {
                self.say(&line);
            }
        }
        Ok(Comparison::Matched)
    }
}

/// Duplicate finder: the run context and per-file pipeline.
pub struct DuplicateFinder {
    index: CandidateIndex,
    admitted: IdentityIndex,
    pairs: PairHandler,
    reference_dirs: HashSet<PathBuf>,
    excluded: Option<PathBuf>,
    scanned: usize,
}

impl std::fmt::Debug for DuplicateFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateFinder")
            .field("records", &self.index.len())
            .field("buckets", &self.index.bucket_count())
            .field("scanned", &self.scanned)
            .field("stats", &self.pairs.stats)
            .finish()
    }
}

impl DuplicateFinder {
    /// Create a finder for one run.
    ///
    /// Mounted filesystems are read only when the run may eliminate files.
    ///
    /// # Errors
    ///
    /// Returns [`FatalError::ScriptCreate`] or [`FatalError::ScriptWrite`]
    /// if a requested script cannot be started.
    pub fn new(options: RunOptions) -> Result<Self, FatalError> {
        let volumes = if options.eliminates() {
            VolumeTable::from_system()
        } else {
            VolumeTable::default()
        };
        Self::with_volume_table(options, volumes)
    }

    /// Create a finder that answers hard-link capability from `volumes`.
    ///
    /// # Errors
    ///
    /// Returns [`FatalError::ScriptCreate`] or [`FatalError::ScriptWrite`]
    /// if a requested script cannot be started.
    pub fn with_volume_table(options: RunOptions, volumes: VolumeTable) -> Result<Self, FatalError> {
        let mut eliminator = Eliminator::new(&options, volumes);
        let mut excluded = None;

        if let Some(path) = &options.script_path {
            let mut writer = ScriptWriter::create(path, options.script_kind)?;
            writer.write_header()?;
            eliminator = eliminator.with_script(writer);
            excluded = Some(fs::canonicalize(path).unwrap_or_else(|_| path.clone()));
        }

        Ok(Self {
            index: CandidateIndex::new(),
            admitted: IdentityIndex::new(),
            pairs: PairHandler {
                resolver: Resolver::new(&options),
                options,
                cache: VerificationCache::new(),
                eliminator,
                stats: RunStats::new(),
                progress: Arc::new(Progress::new(true)),
            },
            reference_dirs: HashSet::new(),
            excluded,
            scanned: 0,
        })
    }

    /// Send progress ticks and report lines to `callback`.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.pairs.progress = callback;
        self
    }

    /// Expand `pattern` and process every file it matches.
    ///
    /// Returns the number of files matched. A pattern matching nothing is
    /// only a warning.
    ///
    /// # Errors
    ///
    /// Stops at the first fatal error from [`Self::process_file`].
    pub fn process_pattern(&mut self, pattern: &str, reference: bool) -> Result<usize, FatalError> {
        let walker = Walker::new(pattern, self.pairs.options.follow_links);
        log::debug!(
            "Processing {}pattern '{}'",
            if reference { "reference " } else { "" },
            walker.pattern()
        );
        let matched = walker.for_each_file(|path| self.process_file(path, reference).map(|_| ()))?;
        if matched == 0 {
            log::warn!("No files matched '{}'", pattern);
        }
        Ok(matched)
    }

    /// Run one file through the pipeline.
    ///
    /// `reference` marks the file as one to compare against but never
    /// eliminate; its directory becomes a reference directory for the rest
    /// of the run.
    ///
    /// # Errors
    ///
    /// Returns a [`FatalError`] when the index cannot grow, when an
    /// elimination step fails, or when hard-link search is impossible on
    /// this platform. Unreadable files are counted, not errors.
    pub fn process_file(&mut self, path: &Path, reference: bool) -> Result<Disposition, FatalError> {
        self.scanned += 1;
        self.pairs.progress.on_file(self.scanned, path);

        if self.admitted.admit(path)? == Admission::RepeatPath {
            log::trace!("Already processed {}", path.display());
            return Ok(Disposition::RepeatPath);
        }

        if self.is_excluded(path) {
            log::debug!("Skipping script output {}", path.display());
            return Ok(Disposition::Excluded);
        }

        if self.is_ignored(path) {
            self.pairs.stats.record_ignored();
            log::debug!("Ignoring {}", path.display());
            return Ok(Disposition::Ignored);
        }

        let metadata = match fs::metadata(path) {
            Ok(m) => m,
            Err(e) => {
                self.unreadable(&format!("Could not read '{}': {}", path.display(), e));
                return Ok(Disposition::Unreadable);
            }
        };
        let size = metadata.len();

        if size == 0 && !self.pairs.options.include_zero_length {
            self.pairs.stats.record_zero_length();
            return Ok(Disposition::ZeroLength);
        }

        let link = LinkInfo::from_metadata(&metadata);
        if self.pairs.options.verbose {
            self.pairs.say(&report::link_info_line(&link, path));
        }

        let mut record = if self.pairs.options.hardlink_search {
            let Some(identity) = link.identity else {
                return Err(FatalError::HardlinkSearchUnsupported);
            };
            if !link.is_multiply_linked() {
                return Ok(Disposition::SingleLink);
            }
            FileRecord::new(path.to_path_buf(), size, MatchKey::from(identity), link)
        } else {
            let signature = match partial_signature(path, size) {
                Ok(sig) => sig,
                Err(e) => {
                    self.unreadable(&e.to_string());
                    return Ok(Disposition::Unreadable);
                }
            };
            if self.pairs.options.print_signatures {
                self.pairs.say(&report::signature_line(signature, size, path));
            }
            FileRecord::new(path.to_path_buf(), size, MatchKey::from(signature), link)
                .with_signature(signature)
        };

        let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
        if reference {
            self.reference_dirs.insert(parent.clone());
        }
        record = record.with_reference(reference || self.reference_dirs.contains(&parent));

        self.pairs.stats.record_file(size);
        let id = self.index.push(record)?;

        let pairs = &mut self.pairs;
        let placement = self
            .index
            .insert_with(id, |index, candidate, existing| {
                pairs.compare(index, candidate, existing)
            })?;
        log::trace!("{} -> {:?}", path.display(), placement);
        Ok(Disposition::Indexed(placement))
    }

    /// Report every hard-link group found, then the group count.
    ///
    /// Meaningful after a hard-link search; in content mode the index holds
    /// content chains and the result is not a list of links.
    pub fn report_hardlink_groups(&mut self) -> Vec<HardlinkGroup> {
        let groups = reconstruct_groups(&self.index);
        for group in &groups {
            self.pairs.stats.record_hardlink_group();
            self.pairs.say_all(&report::group_lines(group));
        }
        self.pairs
            .say_all(&report::groups_footer(self.pairs.stats.hardlink_groups));
        groups
    }

    /// Statistics so far.
    #[must_use]
    pub fn stats(&self) -> &RunStats {
        &self.pairs.stats
    }

    /// The candidate index built so far.
    #[must_use]
    pub fn index(&self) -> &CandidateIndex {
        &self.index
    }

    /// Options this run was started with.
    #[must_use]
    pub fn options(&self) -> &RunOptions {
        &self.pairs.options
    }

    /// Number of paths handed to [`Self::process_file`].
    #[must_use]
    pub fn scanned(&self) -> usize {
        self.scanned
    }

    /// Complete the run: flush the script and hand back the statistics.
    ///
    /// # Errors
    ///
    /// Returns [`FatalError::ScriptWrite`] if the script cannot be flushed.
    pub fn finish(self) -> Result<RunStats, FatalError> {
        self.pairs.eliminator.finish()?;
        Ok(self.pairs.stats)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let Some(excluded) = &self.excluded else {
            return false;
        };
        if path.file_name() != excluded.file_name() {
            return false;
        }
        fs::canonicalize(path).map_or(path == excluded, |p| &p == excluded)
    }

    fn is_ignored(&self, path: &Path) -> bool {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        self.pairs
            .options
            .ignore
            .iter()
            .any(|pat| !pat.is_empty() && name.contains(pat.as_str()))
    }

    fn unreadable(&mut self, message: &str) {
        self.pairs.stats.record_unreadable();
        if self.pairs.options.warn_unreadable {
            log::warn!("{}", message);
        } else {
            log::debug!("{}", message);
        }
    }
}
