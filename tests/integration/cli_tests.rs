use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn finddupe() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("finddupe").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help() {
    finddupe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("FILESPEC"));
}

#[test]
fn test_report_only_leaves_files() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "same content").unwrap();
    fs::write(dir.path().join("b.txt"), "same content").unwrap();

    finddupe()
        .arg("-p")
        .arg(format!("{}/*.txt", dir.path().display()))
        .assert()
        .success()
        .stdout(predicate::str::contains("Duplicate: '"))
        .stdout(predicate::str::contains("With:      '"))
        .stdout(predicate::str::contains("Dupes:"));

    assert!(dir.path().join("a.txt").exists());
    assert!(dir.path().join("b.txt").exists());
}

#[test]
fn test_del_removes_later_copy() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "same content").unwrap();
    fs::write(dir.path().join("b.txt"), "same content").unwrap();

    finddupe()
        .args(["-p", "-del"])
        .arg(format!("{}/*.txt", dir.path().display()))
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted duplicate"));

    assert!(dir.path().join("a.txt").exists());
    assert!(!dir.path().join("b.txt").exists());
}

#[test]
fn test_no_match_fails() {
    let dir = tempdir().unwrap();

    finddupe()
        .arg("-p")
        .arg(format!("{}/*.nothing", dir.path().display()))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No files matched any pattern"));
}

#[test]
fn test_conflicting_modes_rejected() {
    finddupe()
        .args(["-hardlink", "-del", "some/dir"])
        .assert()
        .failure();
}

#[test]
fn test_listlink_with_del_rejected() {
    finddupe()
        .args(["-listlink", "-del", "some/dir"])
        .assert()
        .failure();
}

#[test]
fn test_option_after_pattern_rejected() {
    finddupe()
        .args(["some/dir", "-del"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("-del"));
}

#[test]
fn test_option_after_ref_rejected() {
    finddupe()
        .args(["-ref", "keep/dir", "-sigs", "work/dir"])
        .assert()
        .failure();
}

#[test]
fn test_ref_protects_reference_copy() {
    let dir = tempdir().unwrap();
    let keep = dir.path().join("keep");
    let work = dir.path().join("work");
    fs::create_dir_all(&keep).unwrap();
    fs::create_dir_all(&work).unwrap();
    fs::write(work.join("doc.txt"), "shared text").unwrap();
    fs::write(keep.join("doc.txt"), "shared text").unwrap();

    // A reference file is never eliminated, even when it is found last.
    finddupe()
        .args(["-p", "-del"])
        .arg(format!("{}/*", work.display()))
        .arg("-ref")
        .arg(format!("{}/*", keep.display()))
        .assert()
        .success();

    assert!(keep.join("doc.txt").exists());
    assert!(work.join("doc.txt").exists());
}

#[test]
fn test_sigs_lists_signature_and_size() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("one.bin"), "0123456789").unwrap();

    finddupe()
        .args(["-p", "-sigs"])
        .arg(format!("{}/*", dir.path().display()))
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"[0-9a-f]{16}         10 .*one\.bin").unwrap())
        .stdout(predicate::str::contains("Duplicate:").not());
}

#[test]
fn test_bat_writes_script_and_keeps_files() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("a.txt"), "script me").unwrap();
    fs::write(data.join("b.txt"), "script me").unwrap();
    let script = dir.path().join("fix.sh");

    finddupe()
        .arg("-p")
        .arg("-bat")
        .arg(&script)
        .arg(format!("{}/*", data.display()))
        .assert()
        .success();

    let text = fs::read_to_string(&script).unwrap();
    assert!(text.starts_with("#!/bin/sh"));
    assert!(text.contains("rm -- '"));
    assert!(text.contains("ln -- '"));
    assert!(data.join("a.txt").exists());
    assert!(data.join("b.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_hardlink_replaces_copy() {
    use std::os::unix::fs::MetadataExt;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "link me please").unwrap();
    fs::write(dir.path().join("b.txt"), "link me please").unwrap();

    finddupe()
        .args(["-p", "-hardlink"])
        .arg(format!("{}/*.txt", dir.path().display()))
        .assert()
        .success()
        .stdout(predicate::str::contains("Created hardlink"));

    let a = fs::metadata(dir.path().join("a.txt")).unwrap();
    let b = fs::metadata(dir.path().join("b.txt")).unwrap();
    assert_eq!(a.ino(), b.ino());
}

#[cfg(unix)]
#[test]
fn test_listlink_reports_groups() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("original.txt");
    fs::write(&original, "linked").unwrap();
    fs::hard_link(&original, dir.path().join("alias.txt")).unwrap();
    fs::write(dir.path().join("single.txt"), "alone").unwrap();

    finddupe()
        .args(["-p", "-listlink"])
        .arg(format!("{}/*", dir.path().display()))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Hardlink group, 2 of 2 hardlinked instances found in search tree:",
        ))
        .stdout(predicate::str::contains("Number of hardlink groups found: 1"));
}

#[test]
fn test_ignore_substring() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "twin").unwrap();
    fs::write(dir.path().join("a.bak"), "twin").unwrap();

    finddupe()
        .args(["-p", "-ign", ".bak"])
        .arg(format!("{}/*", dir.path().display()))
        .assert()
        .success()
        .stdout(predicate::str::contains("1 files were ignored"))
        .stdout(predicate::str::contains("Duplicate:").not());
}
