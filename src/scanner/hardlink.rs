//! Physical file identity for hard-link detection.
//!
//! # Overview
//!
//! Hard links are multiple directory entries pointing to the same node on
//! disk. They share content but are NOT duplicates: they are the same file.
//! This module extracts the identity that all instances share, plus the live
//! link count, so the engine can recognise already-linked pairs and group
//! instances in hard-link-search mode.
//!
//! # Platform Support
//!
//! - **Unix**: `(st_dev, st_ino)` pairs and `st_nlink` from file metadata
//! - **Other**: no stable identity from std metadata; every file reports
//!   `identity: None` and a link count of 1
//!
//! # Example
//!
//! ```no_run
//! use finddupe::scanner::hardlink::LinkInfo;
//!
//! let meta = std::fs::metadata("photo.jpg").unwrap();
//! let info = LinkInfo::from_metadata(&meta);
//! if let Some(id) = info.identity {
//!     println!("Hardlinked ({} links) node={id}", info.links);
//! }
//! ```

use std::fmt;
use std::fs::Metadata;

/// Filesystem-durable identifier shared by every hard-link instance of one
/// physical file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysicalIdentity {
    /// Device / volume the node lives on.
    pub volume: u64,
    /// Node number, unique within `volume`.
    pub node: u64,
}

impl fmt::Display for PhysicalIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x} {:016x}", self.volume, self.node)
    }
}

/// Identity plus the hard-link count observed at discovery time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkInfo {
    /// Physical identity, when the platform exposes one.
    pub identity: Option<PhysicalIdentity>,
    /// Number of directory entries referencing the node.
    pub links: u64,
}

impl LinkInfo {
    /// Read identity and link count from file metadata.
    #[cfg(unix)]
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self {
            identity: Some(PhysicalIdentity {
                volume: metadata.dev(),
                node: metadata.ino(),
            }),
            links: metadata.nlink(),
        }
    }

    /// Read identity and link count from file metadata.
    ///
    /// std does not expose file indices outside unix, so identity is
    /// unavailable here.
    #[cfg(not(unix))]
    #[must_use]
    pub fn from_metadata(_metadata: &Metadata) -> Self {
        Self {
            identity: None,
            links: 1,
        }
    }

    /// Whether more than one directory entry references this node.
    #[must_use]
    pub fn is_multiply_linked(&self) -> bool {
        self.links > 1
    }
}

/// Whether physical identity is available on this platform.
#[must_use]
pub const fn is_supported() -> bool {
    cfg!(unix)
}

/// Volume identifier for a file, used for the cross-volume link check.
#[cfg(unix)]
#[must_use]
pub fn volume_of(metadata: &Metadata) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;
    Some(metadata.dev())
}

/// Volume identifier for a file, used for the cross-volume link check.
#[cfg(not(unix))]
#[must_use]
pub fn volume_of(_metadata: &Metadata) -> Option<u64> {
    None
}
