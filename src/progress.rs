//! Progress reporting utilities using indicatif.
//!
//! The engine reports through the [`ProgressCallback`] trait: a tick per
//! file taken from the enumerator and every report line it wants printed.
//! [`Progress`] is the terminal implementation; it keeps a single
//! "Scanned N files" spinner on stderr and prints report lines to stdout
//! above it, so the two never overwrite each other.

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};

/// Sink for engine progress and report output.
///
/// Implement this trait to receive the report lines and per-file ticks
/// produced while the duplicate finder runs.
pub trait ProgressCallback: Send + Sync {
    /// Called for each file handed to the engine.
    ///
    /// # Arguments
    ///
    /// * `scanned` - Files seen so far (1-based)
    /// * `path` - Path being processed
    fn on_file(&self, scanned: usize, path: &Path);

    /// Called with one line of report output.
    fn on_line(&self, line: &str);

    /// Called once when the engine is done, before the summary.
    fn on_finish(&self) {}
}

/// Terminal progress reporter.
pub struct Progress {
    bar: ProgressBar,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, the spinner is hidden; report lines still print.
    ///
    /// # Examples
    ///
    /// ```
    /// use finddupe::progress::{Progress, ProgressCallback};
    ///
    /// let progress = Progress::new(true);
    /// progress.on_line("Files:   1.0 KiB in     2 files");
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(scan_style());
            pb
        };
        Self { bar, quiet }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new(true)
    }
}

fn scan_style() -> ProgressStyle {
    ProgressStyle::with_template("Scanned {pos:>4} files: {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

impl ProgressCallback for Progress {
    fn on_file(&self, scanned: usize, path: &Path) {
        if self.quiet {
            return;
        }
        self.bar.set_position(scanned as u64);
        self.bar
            .set_message(truncate_path(&path.to_string_lossy(), 60));
    }

    fn on_line(&self, line: &str) {
        self.bar.suspend(|| println!("{line}"));
    }

    fn on_finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Truncate a path for display next to the counter.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len + 4 > max_len {
        let keep = max_len.saturating_sub(3);
        let tail: String = file_name.chars().skip(name_len.saturating_sub(keep)).collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}
