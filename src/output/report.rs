//! Console report lines.
//!
//! Every function here only formats; printing is left to the caller's
//! [`ProgressCallback`](crate::progress::ProgressCallback) so the lines can
//! be interleaved with the progress indicator or captured in tests.

use std::path::Path;

use crate::actions::Outcome;
use crate::duplicates::groups::HardlinkGroup;
use crate::duplicates::stats::RunStats;
use crate::scanner::{LinkInfo, Signature};

/// Lines announcing that `candidate` duplicates `existing`.
#[must_use]
pub fn duplicate_lines(existing: &Path, candidate: &Path, hardlinked: bool) -> Vec<String> {
    let mut lines = vec![
        format!("Duplicate: '{}'", existing.display()),
        format!("With:      '{}'", candidate.display()),
    ];
    if hardlinked {
        lines.push("    (hardlinked instances of same file)".to_string());
    }
    lines
}

/// Follow-up line for an elimination outcome, if it has one.
#[must_use]
pub fn outcome_line(outcome: Outcome, candidate: &Path) -> Option<String> {
    match outcome {
        Outcome::Linked => Some("    Created hardlink".to_string()),
        Outcome::Deleted => Some("    Deleted duplicate".to_string()),
        Outcome::ReadOnlySkipped => Some(format!(
            "Skipping duplicate readonly file '{}'",
            candidate.display()
        )),
        Outcome::Reported | Outcome::NothingToDo | Outcome::Scripted { .. } => None,
    }
}

/// `-sigs` listing line: signature, size, path.
#[must_use]
pub fn signature_line(signature: Signature, size: u64, path: &Path) -> String {
    format!("{signature} {size:10} {}", path.display())
}

/// Verbose per-file line with link count and physical node.
#[must_use]
pub fn link_info_line(link: &LinkInfo, path: &Path) -> String {
    match link.identity {
        Some(identity) => format!(
            "Hardlinked ({} links) node={}: {}",
            link.links,
            identity,
            path.display()
        ),
        None => format!(
            "Hardlinked ({} links) node=unknown: {}",
            link.links,
            path.display()
        ),
    }
}

/// Lines for one hard-link group, preceded by a blank line.
#[must_use]
pub fn group_lines(group: &HardlinkGroup) -> Vec<String> {
    let mut lines = Vec::with_capacity(group.len() + 2);
    lines.push(String::new());
    lines.push(format!(
        "Hardlink group, {} of {} hardlinked instances found in search tree:",
        group.len(),
        group.links
    ));
    lines.extend(group.paths.iter().map(|p| format!("  \"{}\"", p.display())));
    lines
}

/// Closing line of a hard-link search.
#[must_use]
pub fn groups_footer(groups: u64) -> Vec<String> {
    vec![
        String::new(),
        format!("Number of hardlink groups found: {groups}"),
    ]
}

/// End-of-run summary.
///
/// Totals are left out after a hard-link search; the skip counters are only
/// printed when non-zero.
#[must_use]
pub fn summary_lines(stats: &RunStats, hardlink_search: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if !hardlink_search {
        lines.push(String::new());
        lines.push(format!(
            "Files: {:>10} in {:5} files",
            stats.total_size_display(),
            stats.total_files
        ));
        lines.push(format!(
            "Dupes: {:>10} in {:5} files",
            stats.duplicate_size_display(),
            stats.duplicate_files
        ));
    }
    if stats.zero_length_files > 0 {
        lines.push(format!(
            "  {} files of zero length were skipped",
            stats.zero_length_files
        ));
    }
    if stats.unreadable_files > 0 {
        lines.push(format!(
            "  {} files could not be opened",
            stats.unreadable_files
        ));
    }
    if stats.ignored_files > 0 {
        lines.push(format!("  {} files were ignored", stats.ignored_files));
    }
    lines
}
