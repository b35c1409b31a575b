//! Top-level driver.
//!
//! [`run_app`] wires the parsed command line, the layered configuration and
//! the engine together. It is the only place a [`FatalError`] turns into the
//! process outcome: the progress indicator is cleared and the error is handed
//! to `main`, which prints it and exits non-zero.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::{Cli, PatternArg};
use crate::config::{Config, EliminationMode, RunOptions};
use crate::duplicates::{DuplicateFinder, RunStats};
use crate::error::{ExitCode, FatalError};
use crate::logging::init_logging;
use crate::output::report;
use crate::progress::{Progress, ProgressCallback};
use crate::scanner::hardlink::volume_of;
use crate::scanner::walker::pattern_base;

/// Run finddupe for a parsed command line.
///
/// # Errors
///
/// Returns the first [`FatalError`] hit during the run.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    init_logging(cli.verbose);

    let config = Config::load(cli.config.as_deref());
    let options = RunOptions::resolve(&cli, &config);
    let hardlink_search = options.hardlink_search;
    log::debug!("Run options: {:?}", options);

    let progress = Arc::new(Progress::new(!options.show_progress));
    let result = run(&cli.patterns, options, progress.clone());
    progress.on_finish();
    let stats = result?;

    for line in report::summary_lines(&stats, hardlink_search) {
        println!("{line}");
    }
    Ok(ExitCode::Success)
}

fn run(
    patterns: &[PatternArg],
    options: RunOptions,
    progress: Arc<Progress>,
) -> Result<RunStats, FatalError> {
    if options.mode == EliminationMode::HardLink {
        check_pattern_volumes(patterns)?;
    }
    let hardlink_search = options.hardlink_search;

    let mut finder = DuplicateFinder::new(options)?.with_progress_callback(progress);

    let mut matched = 0;
    for pattern in patterns {
        matched += finder.process_pattern(&pattern.pattern, pattern.reference)?;
    }
    if matched == 0 {
        return Err(FatalError::NoFilesMatched);
    }

    if hardlink_search {
        finder.report_hardlink_groups();
    } else if finder.stats().total_files == 0 {
        return Err(FatalError::NoFilesProcessed);
    }

    finder.finish()
}

/// Reject hard-link runs whose patterns start on different volumes.
///
/// Patterns whose base directory does not exist are left to the per-pair
/// check.
fn check_pattern_volumes(patterns: &[PatternArg]) -> Result<(), FatalError> {
    let mut first: Option<(PathBuf, u64)> = None;
    for pattern in patterns {
        let base = pattern_base(&pattern.pattern);
        let Some(volume) = fs::metadata(&base).ok().as_ref().and_then(volume_of) else {
            continue;
        };
        match &first {
            None => first = Some((base, volume)),
            Some((first_base, first_volume)) if *first_volume != volume => {
                return Err(FatalError::CrossVolumeLink {
                    first: first_base.clone(),
                    second: base,
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}
