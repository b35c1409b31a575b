#![cfg(unix)]

use filetime::FileTime;
use finddupe::config::{EliminationMode, RunOptions};
use finddupe::duplicates::DuplicateFinder;
use finddupe::error::FatalError;
use finddupe::scanner::VolumeTable;
use std::fs;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn hardlinking(include_readonly: bool) -> DuplicateFinder {
    let options = RunOptions {
        mode: EliminationMode::HardLink,
        include_readonly,
        ..RunOptions::default()
    };
    DuplicateFinder::with_volume_table(options, VolumeTable::default()).unwrap()
}

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn make_readonly(path: &Path) {
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o444);
    fs::set_permissions(path, perms).unwrap();
}

#[test]
fn test_hardlink_replaces_every_copy() {
    let dir = tempdir().unwrap();
    let first = write(dir.path(), "1.jpg", b"photo bytes");
    let second = write(dir.path(), "2.jpg", b"photo bytes");
    let third = write(dir.path(), "3.jpg", b"photo bytes");

    let mut finder = hardlinking(false);
    for path in [&first, &second, &third] {
        finder.process_file(path, false).unwrap();
    }
    let stats = finder.finish().unwrap();

    let ino = fs::metadata(&first).unwrap().ino();
    assert_eq!(fs::metadata(&second).unwrap().ino(), ino);
    assert_eq!(fs::metadata(&third).unwrap().ino(), ino);
    assert_eq!(fs::metadata(&first).unwrap().nlink(), 3);
    assert_eq!(stats.duplicate_files, 2);
}

#[test]
fn test_second_run_finds_links_already_in_place() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a", b"content");
    let b = write(dir.path(), "b", b"content");

    let mut first_run = hardlinking(false);
    first_run.process_file(&a, false).unwrap();
    first_run.process_file(&b, false).unwrap();
    first_run.finish().unwrap();

    let mut second_run = hardlinking(false);
    second_run.process_file(&a, false).unwrap();
    second_run.process_file(&b, false).unwrap();
    let stats = second_run.finish().unwrap();

    assert_eq!(stats.duplicate_files, 0);
    assert_eq!(fs::metadata(&a).unwrap().ino(), fs::metadata(&b).unwrap().ino());
}

#[test]
fn test_readonly_duplicate_skipped_by_default() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"locked");
    let b = write(dir.path(), "b.txt", b"locked");
    make_readonly(&b);

    let mut finder = hardlinking(false);
    finder.process_file(&a, false).unwrap();
    finder.process_file(&b, false).unwrap();
    finder.finish().unwrap();

    assert_ne!(fs::metadata(&a).unwrap().ino(), fs::metadata(&b).unwrap().ino());
}

#[test]
fn test_readonly_duplicate_linked_when_included() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"locked");
    let b = write(dir.path(), "b.txt", b"locked");
    make_readonly(&b);

    let mut finder = hardlinking(true);
    finder.process_file(&a, false).unwrap();
    finder.process_file(&b, false).unwrap();
    finder.finish().unwrap();

    let meta = fs::metadata(&b).unwrap();
    assert_eq!(meta.ino(), fs::metadata(&a).unwrap().ino());
    assert_eq!(meta.permissions().mode() & 0o222, 0);
}

#[test]
fn test_modification_time_survives_linking() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"timestamped");
    let b = write(dir.path(), "b.txt", b"timestamped");
    let stamp = FileTime::from_unix_time(1_000_000_000, 0);
    filetime::set_file_mtime(&b, stamp).unwrap();

    let mut finder = hardlinking(false);
    finder.process_file(&a, false).unwrap();
    finder.process_file(&b, false).unwrap();
    finder.finish().unwrap();

    let meta = fs::metadata(&a).unwrap();
    assert_eq!(FileTime::from_last_modification_time(&meta), stamp);
}

#[test]
fn test_delete_mode_on_unlinkable_volume_is_fatal() {
    use finddupe::scanner::volume::MountEntry;

    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a", b"fat data");
    let b = write(dir.path(), "b", b"fat data");
    let volumes = VolumeTable::from_mounts(vec![MountEntry {
        mount_point: PathBuf::from("/"),
        fs_type: "vfat".to_string(),
    }]);
    let options = RunOptions {
        mode: EliminationMode::DeleteOnly,
        ..RunOptions::default()
    };

    let mut finder = DuplicateFinder::with_volume_table(options, volumes).unwrap();
    finder.process_file(&a, false).unwrap();
    assert!(matches!(
        finder.process_file(&b, false),
        Err(FatalError::VolumeUnsupported { .. })
    ));

    assert!(a.exists());
    assert!(b.exists());
}
