use finddupe::config::{EliminationMode, RunOptions};
use finddupe::duplicates::DuplicateFinder;
use finddupe::output::ScriptKind;
use finddupe::scanner::VolumeTable;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn scripting(mode: EliminationMode, script: &Path, kind: ScriptKind) -> DuplicateFinder {
    let options = RunOptions {
        mode,
        script_path: Some(script.to_path_buf()),
        script_kind: kind,
        ..RunOptions::default()
    };
    DuplicateFinder::with_volume_table(options, VolumeTable::default()).unwrap()
}

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_posix_script_relinks_without_touching_tree() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"scripted twin");
    let b = write(dir.path(), "b.txt", b"scripted twin");
    let script = dir.path().join("out.sh");

    let mut finder = scripting(EliminationMode::HardLink, &script, ScriptKind::Posix);
    finder
        .process_pattern(&format!("{}/*.txt", dir.path().display()), false)
        .unwrap();
    let stats = finder.finish().unwrap();

    let text = fs::read_to_string(&script).unwrap();
    assert!(text.starts_with("#!/bin/sh\n"));
    assert!(text.contains(&format!("rm -- '{}'", b.display())));
    assert!(text.contains(&format!("ln -- '{}' '{}'", a.display(), b.display())));
    assert_eq!(stats.duplicate_files, 1);
    assert_eq!(fs::read(&b).unwrap(), b"scripted twin");
}

#[test]
fn test_delete_only_script() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"to be removed");
    let b = write(dir.path(), "b.txt", b"to be removed");
    let script = dir.path().join("out.sh");

    let mut finder = scripting(EliminationMode::DeleteOnly, &script, ScriptKind::Posix);
    finder.process_file(&a, false).unwrap();
    finder.process_file(&b, false).unwrap();
    finder.finish().unwrap();

    let text = fs::read_to_string(&script).unwrap();
    assert!(text.contains(&format!("rm -- '{}'", b.display())));
    assert!(text.contains(&format!("# duplicate of '{}'", a.display())));
    assert!(!text.contains("ln --"));
    assert!(b.exists());
}

#[test]
fn test_batch_script_dialect() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"for windows");
    let b = write(dir.path(), "b.txt", b"for windows");
    let script = dir.path().join("out.bat");

    let mut finder = scripting(EliminationMode::HardLink, &script, ScriptKind::Batch);
    finder.process_file(&a, false).unwrap();
    finder.process_file(&b, false).unwrap();
    finder.finish().unwrap();

    let text = fs::read_to_string(&script).unwrap();
    assert!(text.starts_with("@echo off"));
    assert!(text.contains(&format!("del \"{}\"", b.display())));
    assert!(text.contains(&format!(
        "fsutil hardlink create \"{}\" \"{}\"",
        b.display(),
        a.display()
    )));
}

#[test]
fn test_script_file_inside_search_tree_is_skipped() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"x");
    let script = dir.path().join("links.sh");

    let mut finder = scripting(EliminationMode::HardLink, &script, ScriptKind::Posix);
    let matched = finder
        .process_pattern(&format!("{}/*", dir.path().display()), false)
        .unwrap();
    let stats = finder.finish().unwrap();

    assert_eq!(matched, 2);
    assert_eq!(stats.total_files, 1);
}

#[test]
fn test_empty_script_has_only_header() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"unique one");
    let b = write(dir.path(), "b.txt", b"unique two");
    let script = dir.path().join("out.sh");

    let mut finder = scripting(EliminationMode::HardLink, &script, ScriptKind::Posix);
    finder.process_file(&a, false).unwrap();
    finder.process_file(&b, false).unwrap();
    finder.finish().unwrap();

    let text = fs::read_to_string(&script).unwrap();
    assert!(!text.contains("rm "));
    assert!(text.contains("created by finddupe on"));
}
