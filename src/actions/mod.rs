//! Duplicate resolution and elimination.
//!
//! This module provides functionality for:
//! - Settling partial-key collisions into linked / duplicate / distinct
//! - Replacing confirmed duplicates with hard links
//! - Deleting confirmed duplicates
//! - Writing the same actions to a script for later review
//!
//! # Resolution
//!
//! ```no_run
//! use finddupe::actions::{Resolution, Resolver};
//! use finddupe::config::RunOptions;
//!
//! let resolver = Resolver::new(&RunOptions::default());
//! assert!(Resolution::Duplicate.is_match());
//! # let _ = resolver;
//! ```
//!
//! # Elimination
//!
//! The [`Eliminator`] applies the run mode to each confirmed pair and
//! reports an [`Outcome`]. Failures after the tree has been modified are
//! fatal.

pub mod eliminate;
pub mod resolve;

// Re-export commonly used types
pub use eliminate::{Eliminator, Outcome};
pub use resolve::{Resolution, Resolver};
