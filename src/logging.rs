//! Logging infrastructure for finddupe.
//!
//! Diagnostics go through the `log` facade with an `env_logger` backend, on
//! stderr. The duplicate report itself is plain stdout output and is not
//! affected by the log level.
//!
//! Log levels are determined by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `-v` (debug) or `-vv` (trace)
//! 3. Default: warn level
//!
//! # Example
//!
//! ```rust,no_run
//! use finddupe::logging::init_logging;
//!
//! // Warnings only
//! init_logging(0);
//!
//! // Engine decisions too (-v)
//! init_logging(1);
//! ```

use env_logger::Builder;
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Initialize the logging subsystem based on the `-v` count.
///
/// Call once at start-up. A second call is ignored, so library users that
/// already installed a logger keep theirs.
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI (0=warn, 1=debug, 2+=trace)
pub fn init_logging(verbose: u8) {
    let use_env = env::var("RUST_LOG").is_ok();

    let mut builder = Builder::new();
    if use_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose));
    }

    configure_format(&mut builder, verbose);

    if builder.try_init().is_err() {
        return;
    }

    if use_env {
        log::debug!(
            "Logging initialized from RUST_LOG environment variable: {:?}",
            env::var("RUST_LOG").ok()
        );
    } else {
        log::debug!("Logging initialized at level: {:?}", determine_level(verbose));
    }
}

/// Map the `-v` count to a level filter.
fn determine_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Module paths only appear with `-vv`, where engine tracing is noisy
/// enough to need them.
fn configure_format(builder: &mut Builder, verbose: u8) {
    builder.format(move |buf, record| {
        let level = record.level();
        let level_style = buf.default_level_style(level);
        if verbose >= 2 {
            writeln!(
                buf,
                "{level_style}{:<5}{level_style:#} [{}] {}",
                level,
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        } else {
            writeln!(
                buf,
                "{level_style}{:<5}{level_style:#} {}",
                level,
                record.args()
            )
        }
    });
}
