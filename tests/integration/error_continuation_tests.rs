use dupsweep::actions::{delete_batch, DeleteConfig, DeleteError, SilentReporter};
use dupsweep::duplicates::{DuplicateFinder, FinderError};
use dupsweep::logging::EventLog;
use dupsweep::scanner::FileRecord;
use dupsweep::workflow::{Prompt, RetentionWorkflow, WorkflowOptions};
use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;
use tempfile::tempdir;

struct Decline;

impl Prompt for Decline {
    fn ask(&mut self, _question: &str) -> std::io::Result<String> {
        Ok("no\n".to_string())
    }
}

#[test]
fn test_delete_batch_continues_past_missing_files() {
    let dir = tempdir().unwrap();
    let present = dir.path().join("present.txt");
    fs::write(&present, "bytes").unwrap();
    let meta = fs::metadata(&present).unwrap();
    let present_record = FileRecord::new(
        present.clone(),
        meta.len(),
        meta.modified().unwrap(),
        meta.modified().unwrap(),
    );
    let gone = |name: &str| {
        FileRecord::new(
            PathBuf::from(format!("nonexistent_{}.txt", name)),
            100,
            SystemTime::now(),
            SystemTime::now(),
        )
    };
    let records = vec![gone("1"), present_record, gone("2")];

    let result = delete_batch(records.iter(), &DeleteConfig::default(), &mut SilentReporter);

    assert_eq!(result.success_count(), 1);
    assert_eq!(result.failure_count(), 2);
    for err in &result.failures {
        match err {
            DeleteError::NotFound(_) => {}
            other => panic!("Expected NotFound, got: {:?}", other),
        }
    }
    assert!(!present.exists());
}

#[test]
fn test_missing_scan_root_is_fatal() {
    let result = DuplicateFinder::with_defaults().find_duplicates(&PathBuf::from("/definitely/not/here"));

    match result {
        Err(FinderError::PathNotFound(path)) => {
            assert_eq!(path, PathBuf::from("/definitely/not/here"));
        }
        other => panic!("Expected PathNotFound, got: {:?}", other.map(|(_, s)| s.total_files)),
    }
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_skipped_not_fatal() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "same").unwrap();
    fs::write(dir.path().join("b.txt"), "same").unwrap();
    let locked = dir.path().join("locked.txt");
    fs::write(&locked, "same").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can read the file anyway; nothing to check then
    if fs::read(&locked).is_ok() {
        return;
    }

    let (classification, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(summary.scan_errors.len(), 1);
    assert_eq!(summary.scan_errors[0].path(), locked.as_path());
    assert_eq!(classification.groups.len(), 1);
    assert_eq!(classification.groups[0].len(), 2);

    // The skipped file reaches the event log even though nothing is deleted
    let log_path = dir.path().join("events.txt");
    let mut out = Vec::new();
    let mut prompt = Decline;
    let report = RetentionWorkflow::new(
        WorkflowOptions::new(dir.path(), dir.path().join("backup")).with_color(false),
        EventLog::open(&log_path).unwrap(),
        &mut prompt,
        &mut out,
    )
    .with_scan_errors(&summary.scan_errors)
    .run(&classification);

    assert_eq!(report.scan_failures, 1);
    let log = fs::read_to_string(&log_path).unwrap();
    assert!(log.contains(&format!(" - ERROR - Error reading {}", locked.display())));

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
}
