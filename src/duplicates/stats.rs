//! Run-wide counters.

use bytesize::ByteSize;

/// Counters accumulated over one run. Every field only ever grows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Files accepted into the index
    pub total_files: u64,
    /// Bytes across accepted files
    pub total_bytes: u64,
    /// Files confirmed as content duplicates
    pub duplicate_files: u64,
    /// Bytes across confirmed duplicates
    pub duplicate_bytes: u64,
    /// Hard-link groups reported in hard-link-search mode
    pub hardlink_groups: u64,
    /// Files that could not be examined or read
    pub unreadable_files: u64,
    /// Empty files left out of comparison
    pub zero_length_files: u64,
    /// Files whose name matched an ignore substring
    pub ignored_files: u64,
}

impl RunStats {
    /// Create zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a file accepted into the index.
    pub fn record_file(&mut self, size: u64) {
        self.total_files += 1;
        self.total_bytes = self.total_bytes.saturating_add(size);
    }

    /// Count a confirmed duplicate.
    pub fn record_duplicate(&mut self, size: u64) {
        self.duplicate_files += 1;
        self.duplicate_bytes = self.duplicate_bytes.saturating_add(size);
    }

    /// Count a file that could not be stat'ed, opened or read.
    pub fn record_unreadable(&mut self) {
        self.unreadable_files += 1;
    }

    /// Count a skipped empty file.
    pub fn record_zero_length(&mut self) {
        self.zero_length_files += 1;
    }

    /// Count a file excluded by an ignore substring.
    pub fn record_ignored(&mut self) {
        self.ignored_files += 1;
    }

    /// Count a reported hard-link group.
    pub fn record_hardlink_group(&mut self) {
        self.hardlink_groups += 1;
    }

    /// Total bytes, human readable.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_bytes).to_string()
    }

    /// Duplicate bytes, human readable.
    #[must_use]
    pub fn duplicate_size_display(&self) -> String {
        ByteSize::b(self.duplicate_bytes).to_string()
    }
}
