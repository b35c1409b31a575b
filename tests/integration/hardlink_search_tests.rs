#![cfg(unix)]

use finddupe::config::RunOptions;
use finddupe::duplicates::{Disposition, DuplicateFinder};
use finddupe::scanner::VolumeTable;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn searching() -> DuplicateFinder {
    let options = RunOptions {
        hardlink_search: true,
        ..RunOptions::default()
    };
    DuplicateFinder::with_volume_table(options, VolumeTable::default()).unwrap()
}

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn link(original: &Path, dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::hard_link(original, &path).unwrap();
    path
}

#[test]
fn test_three_links_form_one_group() {
    let dir = tempdir().unwrap();
    let original = write(dir.path(), "a", b"shared inode");
    let second = link(&original, dir.path(), "b");
    let third = link(&original, dir.path(), "c");

    let mut finder = searching();
    for path in [&original, &second, &third] {
        finder.process_file(path, false).unwrap();
    }
    let groups = finder.report_hardlink_groups();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 3);
    assert_eq!(groups[0].links, 3);
    assert!(groups[0].is_complete());
    assert_eq!(groups[0].paths, vec![original, second, third]);
    assert_eq!(finder.stats().hardlink_groups, 1);
    assert_eq!(finder.stats().duplicate_files, 0);
}

#[test]
fn test_partial_group_reports_live_link_count() {
    let dir = tempdir().unwrap();
    let inside = dir.path().join("inside");
    let outside = dir.path().join("outside");
    fs::create_dir_all(&inside).unwrap();
    fs::create_dir_all(&outside).unwrap();
    let original = write(&inside, "a", b"partly searched");
    link(&original, &inside, "b");
    link(&original, &outside, "c");

    let mut finder = searching();
    finder
        .process_pattern(&format!("{}/*", inside.display()), false)
        .unwrap();
    let groups = finder.report_hardlink_groups();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
    assert_eq!(groups[0].links, 3);
    assert!(!groups[0].is_complete());
}

#[test]
fn test_interleaved_files_grouped_separately() {
    let dir = tempdir().unwrap();
    // Same size, so both physical files share one bucket.
    let red = write(dir.path(), "red1", b"aaaa");
    let blue = write(dir.path(), "blue1", b"bbbb");
    let red2 = link(&red, dir.path(), "red2");
    let blue2 = link(&blue, dir.path(), "blue2");

    let mut finder = searching();
    for path in [&red, &blue, &red2, &blue2] {
        finder.process_file(path, false).unwrap();
    }
    let mut groups = finder.report_hardlink_groups();
    groups.sort_by(|a, b| a.paths[0].cmp(&b.paths[0]));

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].paths, vec![blue, blue2]);
    assert_eq!(groups[1].paths, vec![red, red2]);
}

#[test]
fn test_single_link_files_left_out() {
    let dir = tempdir().unwrap();
    let lonely = write(dir.path(), "lonely", b"one name only");

    let mut finder = searching();
    let disposition = finder.process_file(&lonely, false).unwrap();

    assert_eq!(disposition, Disposition::SingleLink);
    assert!(finder.index().is_empty());
    assert!(finder.report_hardlink_groups().is_empty());
}

#[test]
fn test_search_never_touches_files() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a", b"identical");
    let b = write(dir.path(), "b", b"identical");

    let mut finder = searching();
    finder.process_file(&a, false).unwrap();
    finder.process_file(&b, false).unwrap();

    assert!(a.exists());
    assert!(b.exists());
    assert!(finder.report_hardlink_groups().is_empty());
}
