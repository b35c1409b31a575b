//! Pattern expansion and ordered file discovery using walkdir.
//!
//! # Overview
//!
//! A [`Walker`] turns one command-line pattern into a sequence of file paths
//! and hands each to a callback, strictly one at a time. Supported forms:
//!
//! - a plain file path: yielded once
//! - a plain directory path: every file below it, recursively
//! - single-level wildcards (`*`, `?`, `[...]`) in any component
//! - a whole `**` component, matching zero or more directory levels
//!
//! Within each directory, files are visited before subdirectories and both
//! are ordered by name, so a run over the same tree is reproducible.
//! Symbolic links are skipped unless `follow_links` is set.
//!
//! # Example
//!
//! ```no_run
//! use finddupe::scanner::Walker;
//!
//! let walker = Walker::new("music/**/*.flac", false);
//! let count = walker.for_each_file(|path| {
//!     println!("{}", path.display());
//!     Ok::<(), std::io::Error>(())
//! })?;
//! println!("{count} files matched");
//! # Ok::<(), std::io::Error>(())
//! ```

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use walkdir::{DirEntry, WalkDir};

/// Characters that make a pattern component a wildcard.
const WILDCARD_CHARS: &[char] = &['*', '?', '['];

/// Enumerates the files matched by a single pattern.
#[derive(Debug, Clone)]
pub struct Walker {
    /// Pattern text as given on the command line
    pattern: String,
    /// Descend into symlinked directories and yield symlinked files
    follow_links: bool,
}

/// A pattern split into its literal leading directories and the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PatternParts {
    /// Literal directory prefix; empty when the pattern starts with a wildcard
    base: PathBuf,
    /// Remaining components, the first of which contains a wildcard
    rest: Vec<String>,
}

impl PatternParts {
    fn parse(pattern: &str) -> Self {
        let normalized = normalize_separators(pattern);
        let absolute = normalized.starts_with('/');
        let components: Vec<&str> = normalized.split('/').filter(|c| !c.is_empty()).collect();
        let literal = components
            .iter()
            .take_while(|c| !has_wildcard(c))
            .count();

        let mut base = if absolute {
            PathBuf::from("/")
        } else {
            PathBuf::new()
        };
        for component in &components[..literal] {
            base.push(component);
        }

        Self {
            base,
            rest: components[literal..].iter().map(|c| (*c).to_string()).collect(),
        }
    }

    fn is_literal(&self) -> bool {
        self.rest.is_empty()
    }

    fn implicit_base(&self) -> bool {
        self.base.as_os_str().is_empty()
    }

    fn has_globstar(&self) -> bool {
        self.rest.iter().any(|c| c == "**")
    }

    /// Directory the walk starts from.
    fn walk_root(&self) -> PathBuf {
        if self.implicit_base() {
            PathBuf::from(".")
        } else {
            self.base.clone()
        }
    }

    /// Glob text matched against each candidate path.
    fn glob_text(&self) -> String {
        let rest = self.rest.join("/");
        if self.implicit_base() {
            return rest;
        }
        let base = Pattern::escape(&self.base.to_string_lossy());
        if base.ends_with('/') {
            format!("{base}{rest}")
        } else {
            format!("{base}/{rest}")
        }
    }
}

impl Walker {
    /// Create a walker for `pattern`.
    #[must_use]
    pub fn new(pattern: impl Into<String>, follow_links: bool) -> Self {
        Self {
            pattern: pattern.into(),
            follow_links,
        }
    }

    /// The pattern this walker expands.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Call `visit` once per matching file, in discovery order.
    ///
    /// Returns the number of files yielded. Unreadable directories are
    /// logged and skipped; an error returned by `visit` stops the walk and
    /// is passed straight back.
    ///
    /// # Errors
    ///
    /// Only errors produced by `visit` are returned.
    pub fn for_each_file<F, E>(&self, mut visit: F) -> Result<usize, E>
    where
        F: FnMut(&Path) -> Result<(), E>,
    {
        let parts = PatternParts::parse(&self.pattern);

        if parts.is_literal() {
            let path = parts.walk_root();
            return match std::fs::metadata(&path) {
                Ok(meta) if meta.is_dir() => self.walk(&path, None, None, &mut visit),
                Ok(_) => {
                    visit(&path)?;
                    Ok(1)
                }
                Err(e) => {
                    log::debug!("Pattern '{}' names nothing: {}", self.pattern, e);
                    Ok(0)
                }
            };
        }

        let matcher = match Pattern::new(&parts.glob_text()) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("Invalid pattern '{}': {}", self.pattern, e);
                return Ok(0);
            }
        };
        let max_depth = if parts.has_globstar() {
            None
        } else {
            Some(parts.rest.len())
        };

        let root = parts.walk_root();
        let strip = parts.implicit_base();
        self.walk(&root, Some((&matcher, strip)), max_depth, &mut visit)
    }

    fn walk<F, E>(
        &self,
        root: &Path,
        matcher: Option<(&Pattern, bool)>,
        max_depth: Option<usize>,
        visit: &mut F,
    ) -> Result<usize, E>
    where
        F: FnMut(&Path) -> Result<(), E>,
    {
        let options = MatchOptions {
            case_sensitive: !cfg!(windows),
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };

        let mut walk_dir = WalkDir::new(root)
            .follow_links(self.follow_links)
            .min_depth(1)
            .sort_by(files_first_by_name);
        if let Some(depth) = max_depth {
            walk_dir = walk_dir.max_depth(depth);
        }

        let mut count = 0;
        for entry in walk_dir {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    let path = e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
                    log::warn!("Walker error for {}: {}", path.display(), e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                if entry.path_is_symlink() && !self.follow_links {
                    log::trace!("Skipping link: {}", entry.path().display());
                }
                continue;
            }

            let path = match matcher {
                Some((_, true)) => entry.path().strip_prefix(".").unwrap_or(entry.path()),
                _ => entry.path(),
            };

            if let Some((pattern, _)) = matcher {
                if !pattern.matches_path_with(path, options) {
                    continue;
                }
            }

            visit(path)?;
            count += 1;
        }
        Ok(count)
    }
}

/// Literal directory a pattern is rooted at (`.` when it starts with a
/// wildcard). Used to decide which volume a pattern lives on.
#[must_use]
pub fn pattern_base(pattern: &str) -> PathBuf {
    PatternParts::parse(pattern).walk_root()
}

fn files_first_by_name(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn has_wildcard(component: &str) -> bool {
    component.contains(WILDCARD_CHARS)
}

#[cfg(windows)]
fn normalize_separators(pattern: &str) -> String {
    pattern.replace('\\', "/")
}

#[cfg(not(windows))]
fn normalize_separators(pattern: &str) -> String {
    pattern.to_string()
}
