//! Command-line interface definitions for finddupe.
//!
//! The flag surface is defined with the clap derive API. Two things sit on
//! top of plain clap parsing:
//!
//! - the historical single-dash long flags (`-bat`, `-hardlink`, `-del`,
//!   `-ref`, ...) are rewritten to their double-dash form first
//! - file patterns and `-ref` patterns are merged back into command-line
//!   order, since that order decides which copy of a duplicate is kept
//!
//! # Example
//!
//! ```bash
//! # Report duplicates under the current directory, recursively
//! finddupe '**'
//!
//! # Replace duplicates in photos/ with hard links to the copies in archive/
//! finddupe -hardlink -ref 'archive/**' 'photos/**'
//!
//! # Write the actions to a script for review instead
//! finddupe -bat dedupe.sh 'photos/**'
//! ```

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};

/// Single-dash spellings accepted for compatibility with older scripts.
const LEGACY_LONG_FLAGS: &[&str] = &[
    "bat", "hardlink", "del", "sigs", "rdonly", "listlink", "ign", "ref", "sl",
];

/// Options that consume the following argument.
const VALUE_FLAGS: &[&str] = &["--bat", "--ign", "--config"];

/// Find duplicate files and hard link, delete, or script them.
///
/// Patterns use `*` and `?` within one directory level and `**` for any
/// number of levels. A directory name on its own means everything below it.
/// Files found earlier on the command line are kept; later copies are the
/// ones linked or deleted.
#[derive(Debug, Parser)]
#[command(name = "finddupe")]
#[command(author, version, about, long_about = None)]
#[command(override_usage = "finddupe [OPTIONS] [-ref <FILESPEC>] <FILESPEC>...")]
pub struct Cli {
    /// Write a script with the actions instead of performing them
    #[arg(long, value_name = "FILE")]
    pub bat: Option<PathBuf>,

    /// Replace duplicates with hard links to the first copy found
    #[arg(long, conflicts_with = "del")]
    pub hardlink: bool,

    /// Delete duplicates
    #[arg(long)]
    pub del: bool,

    /// Verbose: print signatures, link counts and node ids (-vv for trace logging)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print the signature of every file instead of the duplicate report
    #[arg(long)]
    pub sigs: bool,

    /// Also act on read-only files
    #[arg(long)]
    pub rdonly: bool,

    /// Also compare zero-length files
    #[arg(short = 'z', long = "zero-length")]
    pub zero_length: bool,

    /// Do not warn about files that cannot be read
    #[arg(short = 'u', long)]
    pub hide_unreadable: bool,

    /// Leave already hard-linked pairs out of the report
    #[arg(long = "sl")]
    pub skip_linked: bool,

    /// Hide the progress indicator
    #[arg(short = 'p', long)]
    pub hide_progress: bool,

    /// Follow symbolic links and junctions into directories
    #[arg(short = 'j', long)]
    pub follow_junctions: bool,

    /// List groups of hard-linked files instead of looking for duplicates
    #[arg(long, conflicts_with_all = ["del", "bat", "hardlink", "rdonly"])]
    pub listlink: bool,

    /// Skip files whose name contains this text (repeatable)
    #[arg(long = "ign", value_name = "SUBSTRING")]
    pub ignore: Vec<String>,

    /// Compare against files matching this pattern but never touch them
    #[arg(long = "ref", value_name = "FILESPEC")]
    pub reference: Vec<String>,

    /// Configuration file (default: platform config dir)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Byte-compare files after their full signatures agree
    #[arg(long)]
    pub paranoid: bool,

    /// File patterns to search
    #[arg(value_name = "FILESPEC", required_unless_present = "reference")]
    pub files: Vec<String>,

    /// Every pattern in command-line order
    #[arg(skip)]
    pub patterns: Vec<PatternArg>,
}

/// One file pattern and whether it names reference files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternArg {
    /// The pattern text as given
    pub pattern: String,
    /// Files matched here are kept and never eliminated
    pub reference: bool,
}

impl Cli {
    /// Parse the process arguments, exiting with a usage message on error.
    #[must_use]
    pub fn parse() -> Self {
        Self::try_parse_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    /// Parse `args`, accepting the single-dash long flags.
    ///
    /// # Errors
    ///
    /// Returns a clap error for unknown or conflicting flags, missing
    /// patterns, or a flag placed after the file patterns.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args = normalize_args(args.into_iter().map(Into::into).collect());
        check_ordering(&args)?;

        let matches = <Self as CommandFactory>::command().try_get_matches_from(args)?;
        let mut cli = <Self as FromArgMatches>::from_arg_matches(&matches)?;
        cli.patterns = ordered_patterns(&matches);
        Ok(cli)
    }
}

/// Rewrite `-bat` style flags to `--bat`.
fn normalize_args(args: Vec<OsString>) -> Vec<OsString> {
    let mut out = Vec::with_capacity(args.len());
    let mut literal = false;
    for (i, arg) in args.into_iter().enumerate() {
        if i == 0 || literal {
            out.push(arg);
            continue;
        }
        match arg.to_str() {
            Some("--") => {
                literal = true;
                out.push(arg);
            }
            Some(text) if is_legacy_flag(text) => out.push(OsString::from(format!("-{text}"))),
            _ => out.push(arg),
        }
    }
    out
}

fn is_legacy_flag(arg: &str) -> bool {
    arg.strip_prefix('-')
        .filter(|rest| !rest.starts_with('-'))
        .is_some_and(|name| LEGACY_LONG_FLAGS.contains(&name))
}

/// Options must all come before the first pattern or `-ref`.
fn check_ordering(args: &[OsString]) -> Result<(), clap::Error> {
    let mut patterns_started = false;
    let mut i = 1;
    while i < args.len() {
        let Some(arg) = args[i].to_str() else {
            patterns_started = true;
            i += 1;
            continue;
        };
        if arg == "--" {
            break;
        }
        if arg == "--ref" {
            patterns_started = true;
            i += 2;
            continue;
        }
        if arg.starts_with('-') && arg.len() > 1 {
            if patterns_started && !arg.starts_with("--ref=") {
                return Err(Cli::command().error(
                    ErrorKind::ArgumentConflict,
                    format!("option '{arg}' must come before the file patterns and -ref"),
                ));
            }
            if arg.starts_with("--ref=") {
                patterns_started = true;
            } else if VALUE_FLAGS.contains(&arg) {
                i += 1;
            }
        } else {
            patterns_started = true;
        }
        i += 1;
    }
    Ok(())
}

/// Merge positional and `-ref` patterns by their position in argv.
fn ordered_patterns(matches: &ArgMatches) -> Vec<PatternArg> {
    let mut tagged: Vec<(usize, PatternArg)> = Vec::new();
    for (id, reference) in [("files", false), ("reference", true)] {
        let values = matches.get_many::<String>(id).into_iter().flatten();
        let indices = matches.indices_of(id).into_iter().flatten();
        for (index, pattern) in indices.zip(values) {
            tagged.push((
                index,
                PatternArg {
                    pattern: pattern.clone(),
                    reference,
                },
            ));
        }
    }
    tagged.sort_by_key(|(index, _)| *index);
    tagged.into_iter().map(|(_, arg)| arg).collect()
}
