//! Mounted filesystem table and hard-link capability.
//!
//! Maps a path to the mounted filesystem that holds it and answers whether
//! that filesystem can carry hard links. Mount information comes from
//! [`sysinfo::Disks`]; a path whose mount cannot be determined is assumed
//! capable, and the link call itself reports the failure if it is not.

use std::path::{Path, PathBuf};

use sysinfo::Disks;

/// Filesystem types that cannot hold more than one name per file.
const NO_HARDLINK_FILESYSTEMS: &[&str] = &["vfat", "fat", "fat12", "fat16", "fat32", "msdos", "exfat"];

/// One mounted filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    /// Where the filesystem is mounted.
    pub mount_point: PathBuf,
    /// Filesystem type name as reported by the OS (e.g. `ext4`, `ntfs`).
    pub fs_type: String,
}

/// Snapshot of mounted filesystems, taken once per run.
#[derive(Debug, Clone, Default)]
pub struct VolumeTable {
    mounts: Vec<MountEntry>,
}

impl VolumeTable {
    /// Snapshot the mounts currently known to the OS.
    #[must_use]
    pub fn from_system() -> Self {
        let disks = Disks::new_with_refreshed_list();
        let mounts = disks
            .list()
            .iter()
            .map(|disk| MountEntry {
                mount_point: disk.mount_point().to_path_buf(),
                fs_type: disk.file_system().to_string_lossy().into_owned(),
            })
            .collect::<Vec<_>>();
        log::debug!("Volume table holds {} mounted filesystems", mounts.len());
        Self { mounts }
    }

    /// Build a table from explicit mount entries.
    #[must_use]
    pub fn from_mounts(mounts: Vec<MountEntry>) -> Self {
        Self { mounts }
    }

    /// Mount entry holding `path`, by longest mount-point prefix.
    #[must_use]
    pub fn mount_for(&self, path: &Path) -> Option<&MountEntry> {
        let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.mounts
            .iter()
            .filter(|mount| resolved.starts_with(&mount.mount_point))
            .max_by_key(|mount| mount.mount_point.as_os_str().len())
    }

    /// Whether the filesystem holding `path` supports hard links.
    #[must_use]
    pub fn supports_hard_links(&self, path: &Path) -> bool {
        match self.mount_for(path) {
            Some(mount) => fs_type_supports_hard_links(&mount.fs_type),
            None => true,
        }
    }
}

/// Whether a filesystem type name can carry hard links.
#[must_use]
pub fn fs_type_supports_hard_links(fs_type: &str) -> bool {
    let lowered = fs_type.to_ascii_lowercase();
    !NO_HARDLINK_FILESYSTEMS.contains(&lowered.as_str())
}
