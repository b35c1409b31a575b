//! Application configuration management.
//!
//! Settings are layered with figment, lowest priority first:
//!
//! 1. built-in defaults ([`Config::default`])
//! 2. a TOML file (`--config <path>`, else `<config dir>/finddupe/config.toml`)
//! 3. `FINDDUPE_*` environment variables
//! 4. command-line flags, applied by [`RunOptions::resolve`]
//!
//! A missing file contributes nothing. A file that fails to parse is logged
//! and the defaults are used instead.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::output::script::ScriptKind;

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "FINDDUPE_";

/// Most links the engine will pile onto one physical file.
#[cfg(windows)]
pub const DEFAULT_MAX_LINKS: u64 = 1023;
/// Most links the engine will pile onto one physical file.
#[cfg(not(windows))]
pub const DEFAULT_MAX_LINKS: u64 = 65000;

/// Script dialect selection in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptKindSetting {
    /// Pick from the script file extension and platform
    #[default]
    Auto,
    /// Windows batch file
    Batch,
    /// POSIX shell script
    Posix,
}

/// Persistent application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Show the "Scanned N files" indicator.
    pub show_progress: bool,
    /// Warn about files that cannot be read.
    pub warn_unreadable: bool,
    /// Compare empty files too.
    pub include_zero_length: bool,
    /// File name substrings to leave out, added to `-ign`.
    pub ignore: Vec<String>,
    /// Link count at which a file stops accepting new links.
    pub max_links: u64,
    /// Byte-compare files after their full signatures agree.
    pub paranoid: bool,
    /// Dialect for `-bat` scripts.
    pub script_kind: ScriptKindSetting,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            show_progress: true,
            warn_unreadable: true,
            include_zero_length: false,
            ignore: Vec::new(),
            max_links: DEFAULT_MAX_LINKS,
            paranoid: false,
            script_kind: ScriptKindSetting::Auto,
        }
    }
}

impl Config {
    /// Load the configuration, from `explicit` when given, else from the
    /// default platform-specific path.
    #[must_use]
    pub fn load(explicit: Option<&Path>) -> Self {
        let path = explicit.map(Path::to_path_buf).or_else(Self::config_path);
        match Self::figment(path.as_deref()).extract() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Layered provider chain for `path`.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            log::debug!("Reading configuration from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Get the default platform-specific configuration path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "finddupe").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// What happens to a confirmed duplicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EliminationMode {
    /// Only report it
    #[default]
    ReportOnly,
    /// Replace it with a hard link to the kept file
    HardLink,
    /// Delete it
    DeleteOnly,
}

/// Resolved settings for one run, threaded through the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Action on confirmed duplicates
    pub mode: EliminationMode,
    /// Write the actions to this script instead of performing them
    pub script_path: Option<PathBuf>,
    /// Script dialect
    pub script_kind: ScriptKind,
    /// Group by physical identity instead of content
    pub hardlink_search: bool,
    /// Act on read-only duplicates too
    pub include_readonly: bool,
    /// Compare empty files too
    pub include_zero_length: bool,
    /// Warn about unreadable files
    pub warn_unreadable: bool,
    /// Print a signature line per file
    pub print_signatures: bool,
    /// Print the duplicate report
    pub print_duplicates: bool,
    /// Print link count and node per file
    pub verbose: bool,
    /// Leave already-linked pairs out of the report
    pub hide_already_linked: bool,
    /// Show the progress indicator
    pub show_progress: bool,
    /// Follow symbolic links and junctions while enumerating
    pub follow_links: bool,
    /// File name substrings to leave out
    pub ignore: Vec<String>,
    /// Link count at which a file stops accepting new links
    pub max_links: u64,
    /// Byte-compare after full signatures agree
    pub paranoid: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            mode: EliminationMode::ReportOnly,
            script_path: None,
            script_kind: ScriptKind::platform_default(),
            hardlink_search: false,
            include_readonly: false,
            include_zero_length: false,
            warn_unreadable: true,
            print_signatures: false,
            print_duplicates: true,
            verbose: false,
            hide_already_linked: false,
            show_progress: true,
            follow_links: false,
            ignore: Vec::new(),
            max_links: DEFAULT_MAX_LINKS,
            paranoid: false,
        }
    }
}

impl RunOptions {
    /// Merge command-line flags over the loaded configuration.
    #[must_use]
    pub fn resolve(cli: &Cli, config: &Config) -> Self {
        let verbose = cli.verbose > 0;

        let mode = if cli.del {
            EliminationMode::DeleteOnly
        } else if cli.hardlink || cli.bat.is_some() {
            EliminationMode::HardLink
        } else {
            EliminationMode::ReportOnly
        };

        let script_kind = match config.script_kind {
            ScriptKindSetting::Batch => ScriptKind::Batch,
            ScriptKindSetting::Posix => ScriptKind::Posix,
            ScriptKindSetting::Auto => cli
                .bat
                .as_deref()
                .map_or_else(ScriptKind::platform_default, ScriptKind::detect),
        };

        let mut ignore = cli.ignore.clone();
        ignore.extend(config.ignore.iter().cloned());

        Self {
            mode,
            script_path: cli.bat.clone(),
            script_kind,
            hardlink_search: cli.listlink,
            include_readonly: cli.rdonly,
            include_zero_length: cli.zero_length || config.include_zero_length,
            warn_unreadable: verbose || (!cli.hide_unreadable && config.warn_unreadable),
            print_signatures: cli.sigs || verbose,
            print_duplicates: !cli.sigs || verbose,
            verbose,
            hide_already_linked: cli.skip_linked,
            show_progress: !cli.hide_progress && config.show_progress,
            follow_links: cli.follow_junctions,
            ignore,
            max_links: config.max_links,
            paranoid: cli.paranoid || config.paranoid,
        }
    }

    /// Whether confirmed duplicates are acted on or scripted.
    #[must_use]
    pub fn eliminates(&self) -> bool {
        self.mode != EliminationMode::ReportOnly
    }
}
