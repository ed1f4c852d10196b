use dupsweep::duplicates::{DuplicateFinder, FinderConfig};
use dupsweep::logging::EventLog;
use dupsweep::scanner::{ScanError, WalkerConfig};
use dupsweep::workflow::{Prompt, RetentionWorkflow, WorkflowOptions, WorkflowReport, WorkflowState};
use filetime::{set_file_mtime, FileTime};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

struct Answer(&'static str);

impl Prompt for Answer {
    fn ask(&mut self, _question: &str) -> io::Result<String> {
        Ok(format!("{}\n", self.0))
    }
}

/// Scan root with `/a/1.txt` ("X", t=100), `/b/2.txt` ("X", t=200) and
/// `/c/3.txt` ("Y", t=150), plus a sibling backup dir and log file.
struct Fixture {
    _dir: TempDir,
    root: PathBuf,
    backup: PathBuf,
    log: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let root = dir.path().join("root");
        for (rel, content, mtime) in [
            ("a/1.txt", "X", 100),
            ("b/2.txt", "X", 200),
            ("c/3.txt", "Y", 150),
        ] {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, content).unwrap();
            set_file_mtime(&path, FileTime::from_unix_time(mtime, 0)).unwrap();
        }
        Self {
            backup: dir.path().join("backup"),
            log: dir.path().join("duplicate_files_log.txt"),
            root,
            _dir: dir,
        }
    }

    fn run(&self, answer: &'static str) -> (WorkflowReport, String) {
        run_in(&self.root, &self.backup, &self.log, answer)
    }

    fn log_text(&self) -> String {
        fs::read_to_string(&self.log).unwrap_or_default()
    }
}

fn run_in(root: &Path, backup: &Path, log: &Path, answer: &'static str) -> (WorkflowReport, String) {
    run_with_skipped(root, backup, log, answer, Vec::new())
}

/// Like [`run_in`], with `skipped` added to whatever the scan itself skipped.
fn run_with_skipped(
    root: &Path,
    backup: &Path,
    log: &Path,
    answer: &'static str,
    skipped: Vec<ScanError>,
) -> (WorkflowReport, String) {
    let config = FinderConfig::default()
        .with_walker_config(WalkerConfig::default().with_excluded_dir(backup.to_path_buf()));
    let (classification, mut summary) = DuplicateFinder::new(config).find_duplicates(root).unwrap();
    summary.scan_errors.extend(skipped);

    let mut prompt = Answer(answer);
    let mut out = Vec::new();
    let report = RetentionWorkflow::new(
        WorkflowOptions::new(root, backup).with_color(false),
        EventLog::open(log).unwrap(),
        &mut prompt,
        &mut out,
    )
    .with_scan_errors(&summary.scan_errors)
    .run(&classification);

    (report, String::from_utf8(out).unwrap())
}

#[test]
fn test_confirmed_end_to_end() {
    let fx = Fixture::new();

    let (report, out) = fx.run("yes");

    assert!(!fx.root.join("a").join("1.txt").exists());
    assert!(!fx.root.join("a").exists());
    assert!(fx.root.join("b").join("2.txt").exists());
    assert!(fx.root.join("c").join("3.txt").exists());
    assert_eq!(fs::read_to_string(fx.backup.join("1.txt")).unwrap(), "X");

    use WorkflowState::*;
    assert_eq!(
        report.states,
        vec![Scanned, Classified, BackedUp, Presented, Confirmed, Deleted, Pruned]
    );
    assert_eq!(report.prune.removed, vec![fx.root.join("a")]);

    // The singleton is never presented
    assert!(!out.contains("3.txt"));
    assert!(out.contains("Found 1 duplicate files."));

    let log = fx.log_text();
    let lines: Vec<_> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(&format!(
        " - INFO - Deleted: {}",
        fx.root.join("a").join("1.txt").display()
    )));
    assert!(lines[1].ends_with(&format!(
        " - INFO - Removed empty folder: {}",
        fx.root.join("a").display()
    )));
}

#[test]
fn test_any_other_answer_declines() {
    for answer in ["no", "y", "", "yess", "ok"] {
        let fx = Fixture::new();

        let (report, out) = fx.run(answer);

        assert_eq!(report.final_state(), WorkflowState::Pruned);
        assert!(!report.confirmed(), "answer {:?} must decline", answer);
        assert!(fx.root.join("a").join("1.txt").exists());
        assert!(fx.root.join("b").join("2.txt").exists());
        assert!(out.contains("Deletion aborted."));
        assert!(!fx.log_text().contains("Deleted:"));
        // Backup already happened before the question
        assert!(fx.backup.join("1.txt").exists());
    }
}

#[test]
fn test_answer_is_case_insensitive() {
    let fx = Fixture::new();

    let (report, _) = fx.run("  YES ");

    assert!(report.confirmed());
    assert!(!fx.root.join("a").join("1.txt").exists());
}

#[test]
fn test_backup_failure_does_not_exclude_from_deletion() {
    let fx = Fixture::new();
    // A regular file where the backup directory should be
    fs::write(&fx.backup, "in the way").unwrap();

    let (report, out) = fx.run("yes");

    let backup = report.backup.as_ref().unwrap();
    assert_eq!(backup.failure_count(), 1);
    assert!(out.contains(&format!(
        "Error backing up {}",
        fx.root.join("a").join("1.txt").display()
    )));
    assert!(out.contains("The following files are selected for deletion:"));
    assert!(!fx.root.join("a").join("1.txt").exists());
    assert_eq!(report.deletion.as_ref().unwrap().success_count(), 1);
    assert!(fx.log_text().contains(" - ERROR - Error backing up "));
}

#[test]
fn test_no_duplicates_still_prunes() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    fs::create_dir_all(root.join("empty").join("nested")).unwrap();
    fs::write(root.join("only.txt"), "unique").unwrap();

    let (report, out) = run_in(&root, &dir.path().join("backup"), &dir.path().join("log.txt"), "yes");

    use WorkflowState::*;
    assert_eq!(report.states, vec![Scanned, Classified, Pruned]);
    assert!(out.contains("No duplicate files found."));
    assert!(!root.join("empty").exists());
    assert!(root.join("only.txt").exists());
    assert!(!dir.path().join("backup").exists());
}

#[test]
fn test_second_run_is_clean() {
    let fx = Fixture::new();
    fx.run("yes");

    let (report, out) = fx.run("yes");

    assert!(report.backup.is_none());
    assert_eq!(report.prune.removed_count(), 0);
    assert!(out.contains("No duplicate files found."));
}

#[test]
fn test_skipped_entry_is_printed_and_logged() {
    let fx = Fixture::new();
    // A file that disappeared between listing and hashing
    let vanished = fx.root.join("c").join("gone.txt");

    let (report, out) = run_with_skipped(
        &fx.root,
        &fx.backup,
        &fx.log,
        "no",
        vec![ScanError::NotFound(vanished.clone())],
    );

    assert_eq!(report.scan_failures, 1);
    let message = format!("Error reading {}: ", vanished.display());
    assert!(out.contains(&message));
    let log = fx.log_text();
    let lines: Vec<_> = log.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains(&format!(" - ERROR - {}", message)));
    assert!(out.contains("1 failed"));
}
