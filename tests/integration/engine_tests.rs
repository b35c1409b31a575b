use finddupe::config::{EliminationMode, RunOptions};
use finddupe::duplicates::{Disposition, DuplicateFinder, Placement};
use finddupe::scanner::VolumeTable;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

fn finder(options: RunOptions) -> DuplicateFinder {
    DuplicateFinder::with_volume_table(options, VolumeTable::default()).unwrap()
}

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn all_under(dir: &TempDir) -> String {
    format!("{}/**", dir.path().display())
}

#[test]
fn test_delete_mode_removes_second_copy() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"0123456789");
    let b = write(dir.path(), "b.txt", b"0123456789");

    let mut finder = finder(RunOptions {
        mode: EliminationMode::DeleteOnly,
        ..RunOptions::default()
    });
    assert_eq!(finder.process_pattern(&all_under(&dir), false).unwrap(), 2);
    let stats = finder.finish().unwrap();

    assert!(a.exists());
    assert!(!b.exists());
    assert_eq!(stats.duplicate_files, 1);
    assert_eq!(stats.duplicate_bytes, 10);
    assert_eq!(stats.total_files, 2);
}

#[test]
fn test_different_sizes_never_compared() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"0123456789");
    write(dir.path(), "b.txt", b"0123456789X");

    let mut finder = finder(RunOptions::default());
    finder.process_pattern(&all_under(&dir), false).unwrap();

    assert_eq!(finder.stats().duplicate_files, 0);
    assert_eq!(finder.index().bucket_count(), 2);
}

#[test]
fn test_difference_past_partial_window_kept_as_siblings() {
    let dir = tempdir().unwrap();
    let mut one = vec![7u8; 40_000];
    let mut two = one.clone();
    one[39_999] = 1;
    two[39_999] = 2;
    let a = write(dir.path(), "a.bin", &one);
    let b = write(dir.path(), "b.bin", &two);

    let mut finder = finder(RunOptions {
        mode: EliminationMode::DeleteOnly,
        ..RunOptions::default()
    });
    finder.process_file(&a, false).unwrap();
    let second = finder.process_file(&b, false).unwrap();

    assert!(matches!(
        second,
        Disposition::Indexed(Placement::ChainTail { .. })
    ));
    assert!(a.exists());
    assert!(b.exists());
    assert_eq!(finder.stats().duplicate_files, 0);

    let root = finder.index().bucket_root(40_000).unwrap();
    assert_eq!(finder.index().chain(root).len(), 2);
}

#[test]
fn test_overlapping_patterns_process_once() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"same");
    write(dir.path(), "b.txt", b"same");

    let mut finder = finder(RunOptions::default());
    finder.process_pattern(&all_under(&dir), false).unwrap();
    let first = *finder.stats();
    finder
        .process_pattern(&format!("{}/*.txt", dir.path().display()), false)
        .unwrap();

    assert_eq!(finder.stats().total_files, first.total_files);
    assert_eq!(finder.stats().duplicate_files, 1);
}

#[test]
fn test_first_pattern_wins() {
    let dir = tempdir().unwrap();
    let late = write(dir.path(), "z/late.txt", b"keep me");
    let early = write(dir.path(), "a/early.txt", b"keep me");

    let mut finder = finder(RunOptions {
        mode: EliminationMode::DeleteOnly,
        ..RunOptions::default()
    });
    finder
        .process_pattern(&format!("{}/z/*", dir.path().display()), false)
        .unwrap();
    finder
        .process_pattern(&format!("{}/a/*", dir.path().display()), false)
        .unwrap();

    assert!(late.exists());
    assert!(!early.exists());
}

#[test]
fn test_reference_pattern_protected() {
    let dir = tempdir().unwrap();
    let archived = write(dir.path(), "archive/photo.jpg", b"jpeg bytes");
    let archived_twin = write(dir.path(), "archive/photo (1).jpg", b"jpeg bytes");
    let working = write(dir.path(), "work/photo.jpg", b"jpeg bytes");

    let mut finder = finder(RunOptions {
        mode: EliminationMode::DeleteOnly,
        ..RunOptions::default()
    });
    finder
        .process_pattern(&format!("{}/archive/*", dir.path().display()), true)
        .unwrap();
    finder
        .process_pattern(&format!("{}/work/*", dir.path().display()), false)
        .unwrap();

    assert!(archived.exists());
    assert!(archived_twin.exists());
    assert!(!working.exists());
    assert_eq!(finder.stats().duplicate_files, 1);
}

#[test]
fn test_zero_length_skipped_by_default() {
    let dir = tempdir().unwrap();
    write(dir.path(), "e1", b"");
    write(dir.path(), "e2", b"");

    let mut finder = finder(RunOptions::default());
    finder.process_pattern(&all_under(&dir), false).unwrap();
    assert_eq!(finder.stats().zero_length_files, 2);
    assert_eq!(finder.stats().duplicate_files, 0);

    let mut including = self::finder(RunOptions {
        include_zero_length: true,
        ..RunOptions::default()
    });
    including.process_pattern(&all_under(&dir), false).unwrap();
    assert_eq!(including.stats().zero_length_files, 0);
    assert_eq!(including.stats().duplicate_files, 1);
}

#[test]
fn test_many_copies_all_reported_against_first() {
    let dir = tempdir().unwrap();
    for i in 0..5 {
        write(dir.path(), &format!("copy{i}.dat"), b"repeated payload");
    }
    write(dir.path(), "other.dat", b"different paylo!");

    let mut finder = finder(RunOptions::default());
    finder.process_pattern(&all_under(&dir), false).unwrap();

    assert_eq!(finder.stats().total_files, 6);
    assert_eq!(finder.stats().duplicate_files, 4);
    assert_eq!(finder.stats().duplicate_bytes, 4 * 16);
}
