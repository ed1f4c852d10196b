use dupsweep::duplicates::{DuplicateFinder, FinderConfig};
use dupsweep::scanner::WalkerConfig;
use filetime::{set_file_mtime, FileTime};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn write_with_mtime(path: &Path, content: &[u8], mtime: i64) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
    set_file_mtime(path, FileTime::from_unix_time(mtime, 0)).unwrap();
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (classification, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(!classification.has_duplicates());
    assert!(classification.singletons.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "content a").unwrap();
    fs::write(dir.path().join("b.txt"), "content b").unwrap();
    fs::write(dir.path().join("c.txt"), "content c").unwrap();

    let (classification, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(classification.groups.is_empty());
    assert_eq!(classification.singletons.len(), 3);
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_end_to_end_scenario_classification() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_with_mtime(&root.join("a").join("1.txt"), b"X", 100);
    write_with_mtime(&root.join("b").join("2.txt"), b"X", 200);
    write_with_mtime(&root.join("c").join("3.txt"), b"Y", 150);

    let (classification, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(root)
        .unwrap();

    assert_eq!(classification.groups.len(), 1);
    let group = &classification.groups[0];
    assert_eq!(group.kept.path, root.join("b").join("2.txt"));
    assert_eq!(group.duplicates.len(), 1);
    assert_eq!(group.duplicates[0].path, root.join("a").join("1.txt"));
    assert_eq!(classification.singletons.len(), 1);
    assert_eq!(classification.singletons[0].path, root.join("c").join("3.txt"));
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.reclaimable_space, 1);
}

#[test]
fn test_newest_copy_kept_regardless_of_discovery_order() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    // "a" sorts first but is the newest
    write_with_mtime(&root.join("a.txt"), b"same", 300);
    write_with_mtime(&root.join("b.txt"), b"same", 100);
    write_with_mtime(&root.join("c.txt"), b"same", 200);

    let (classification, _) = DuplicateFinder::with_defaults()
        .find_duplicates(root)
        .unwrap();

    let group = &classification.groups[0];
    assert_eq!(group.kept.path, root.join("a.txt"));
    let dups: Vec<_> = group.duplicates.iter().map(|r| r.path.clone()).collect();
    assert_eq!(dups, vec![root.join("b.txt"), root.join("c.txt")]);
}

#[test]
fn test_equal_mtimes_keep_first_discovered() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_with_mtime(&root.join("x.txt"), b"tie", 500);
    write_with_mtime(&root.join("y.txt"), b"tie", 500);
    write_with_mtime(&root.join("z.txt"), b"tie", 500);

    let (classification, _) = DuplicateFinder::with_defaults()
        .find_duplicates(root)
        .unwrap();

    let group = &classification.groups[0];
    assert_eq!(group.kept.path, root.join("x.txt"));
    assert_eq!(group.duplicates.len(), 2);
}

#[test]
fn test_empty_files_form_a_group() {
    let dir = tempdir().unwrap();
    File::create(dir.path().join("empty1.txt")).unwrap();
    File::create(dir.path().join("empty2.txt")).unwrap();

    let (classification, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(classification.groups.len(), 1);
    assert_eq!(classification.groups[0].len(), 2);
    assert_eq!(summary.reclaimable_space, 0);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let deep = dir.path().join("one").join("two").join("three");
    fs::create_dir_all(&deep).unwrap();
    fs::write(dir.path().join("top.txt"), "nested copy").unwrap();
    fs::write(deep.join("bottom.txt"), "nested copy").unwrap();

    let (classification, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(classification.groups.len(), 1);
}

#[test]
fn test_backup_directory_not_scanned() {
    let dir = tempdir().unwrap();
    let backup = dir.path().join("backup");
    fs::create_dir(&backup).unwrap();
    fs::write(dir.path().join("a.txt"), "payload").unwrap();
    fs::write(backup.join("a.txt"), "payload").unwrap();

    let config = FinderConfig::default()
        .with_walker_config(WalkerConfig::default().with_excluded_dir(backup.clone()));
    let (classification, summary) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(summary.total_files, 1);
    assert!(!classification.has_duplicates());
}

#[test]
fn test_ignore_patterns_and_hidden() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("keep.txt"), "dup").unwrap();
    fs::write(dir.path().join("skip.tmp"), "dup").unwrap();
    fs::write(dir.path().join(".hidden"), "dup").unwrap();

    let config = FinderConfig::default()
        .with_walker_config(WalkerConfig::new(true, vec!["*.tmp".to_string()]));
    let (_, summary) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(summary.total_files, 1);
}

#[test]
fn test_unicode_file_names() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("résumé.txt"), "same bytes").unwrap();
    fs::write(dir.path().join("日本語.txt"), "same bytes").unwrap();

    let (classification, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(classification.groups.len(), 1);
}

#[test]
fn test_scan_root_must_exist() {
    let dir = tempdir().unwrap();
    let result = DuplicateFinder::with_defaults().find_duplicates(&dir.path().join("nope"));
    assert!(result.is_err());
}
