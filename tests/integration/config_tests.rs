use clap::Parser;
use dupsweep::cli::Cli;
use dupsweep::config::{Config, ConfigError};
use dupsweep::duplicates::{DuplicateFinder, FinderConfig};
use filetime::{set_file_mtime, FileTime};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();

    assert_eq!(config.backup_dir, PathBuf::from("dupsweep-backup"));
    assert_eq!(config.log_file, PathBuf::from("duplicate_files_log.txt"));
    assert!(!config.skip_hidden);
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
scan_root = "/data/photos"
backup_dir = "/data/backup"
skip_hidden = true
ignore_patterns = ["*.tmp", "cache"]
"#,
    )
    .unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();

    assert_eq!(config.scan_root, Some(PathBuf::from("/data/photos")));
    assert_eq!(config.backup_dir, PathBuf::from("/data/backup"));
    assert_eq!(config.log_file, PathBuf::from("duplicate_files_log.txt"));
    assert!(config.skip_hidden);
    assert_eq!(config.ignore_patterns, vec!["*.tmp", "cache"]);
}

#[test]
fn test_config_env_layer() {
    // Jail isolates the environment from concurrently running tests
    figment::Jail::expect_with(|jail| {
        jail.set_env("DUPSWEEP_BACKUP_DIR", "/env/backup");
        jail.set_env("DUPSWEEP_SKIP_HIDDEN", "true");

        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("DUPSWEEP_"))
            .extract()?;

        assert_eq!(config.backup_dir, PathBuf::from("/env/backup"));
        assert!(config.skip_hidden);
        Ok(())
    });
}

#[test]
fn test_cli_beats_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("dupsweep.toml");
    fs::write(&config_path, "backup_dir = \"/from/file\"\nlog_file = \"/from/file.log\"\n").unwrap();

    let cli = Cli::try_parse_from([
        "dupsweep",
        "--config",
        config_path.to_str().unwrap(),
        "--backup-dir",
        "/from/cli",
    ])
    .unwrap();
    let config = Config::load(&cli).unwrap();

    assert_eq!(config.backup_dir, PathBuf::from("/from/cli"));
    assert_eq!(config.log_file, PathBuf::from("/from/file.log"));
}

#[test]
fn test_config_invalid_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "invalid = toml").unwrap();

    let cli = Cli::try_parse_from(["dupsweep", "--config", config_path.to_str().unwrap()]).unwrap();
    let result = Config::load(&cli);

    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_inaccessible_scan_root_is_fatal() {
    let temp_dir = tempdir().unwrap();
    let file = temp_dir.path().join("not_a_dir.txt");
    fs::write(&file, "x").unwrap();

    let config = Config {
        scan_root: Some(file),
        ..Config::default()
    };

    assert!(matches!(config.validate(), Err(ConfigError::ScanRoot(_))));
}

/// `data/b/2.txt` ("X", t=200) and a newer copy already in `data/backup`.
fn data_with_backup_copy(base: &Path) {
    let b = base.join("data").join("b");
    let backup = base.join("data").join("backup");
    fs::create_dir_all(&b).unwrap();
    fs::create_dir_all(&backup).unwrap();
    fs::write(b.join("2.txt"), "X").unwrap();
    set_file_mtime(b.join("2.txt"), FileTime::from_unix_time(200, 0)).unwrap();
    fs::write(backup.join("1.txt"), "X").unwrap();
    set_file_mtime(backup.join("1.txt"), FileTime::from_unix_time(900, 0)).unwrap();
}

fn scan_validated(config: Config) -> usize {
    let validated = config.validate().unwrap();
    let finder = DuplicateFinder::new(
        FinderConfig::default().with_walker_config(validated.walker_config()),
    );
    let (classification, summary) = finder.find_duplicates(&validated.scan_root).unwrap();

    assert!(classification.groups.is_empty(), "backup copy was classified");
    summary.total_files
}

#[test]
fn test_backup_excluded_when_root_has_parent_components() {
    let temp_dir = tempdir().unwrap();
    data_with_backup_copy(temp_dir.path());

    let config = Config {
        scan_root: Some(temp_dir.path().join("data").join("b").join("..")),
        backup_dir: temp_dir.path().join("data").join("backup"),
        ..Config::default()
    };

    assert_eq!(scan_validated(config), 1);
}

#[cfg(unix)]
#[test]
fn test_backup_excluded_when_root_is_a_symlink() {
    let temp_dir = tempdir().unwrap();
    data_with_backup_copy(temp_dir.path());
    let link = temp_dir.path().join("link");
    std::os::unix::fs::symlink(temp_dir.path().join("data"), &link).unwrap();

    let config = Config {
        scan_root: Some(link),
        backup_dir: temp_dir.path().join("data").join("backup"),
        ..Config::default()
    };

    assert_eq!(scan_validated(config), 1);
}
