//! Tests for the backup-once/restore-once file store.
//!
//! Validates the reversibility contract: exactly one backup per
//! install/cleanup cycle, restore of the exact pristine bytes, durable
//! recording of pre-install absence, and convergence across simulated
//! agent restarts.

use kata_installer::FileBackup;
use std::fs;
use tempfile::TempDir;

// =============================================================================
// Backup-Once
// =============================================================================

#[test]
fn test_first_backup_is_created() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("crio.conf");
    fs::write(&path, "pristine").unwrap();

    let backup = FileBackup::new(&path);
    assert!(backup.backup_once().unwrap(), "first call creates the backup");
    assert_eq!(fs::read_to_string(backup.backup_path()).unwrap(), "pristine");
    // The live file keeps serving the backend.
    assert_eq!(fs::read_to_string(&path).unwrap(), "pristine");
}

#[test]
fn test_repeated_backups_keep_first_content() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("crio.conf");
    fs::write(&path, "pristine").unwrap();

    let backup = FileBackup::new(&path);
    assert!(backup.backup_once().unwrap());

    // The agent edits the file, then re-runs install several times.
    fs::write(&path, "mutated by agent").unwrap();
    for _ in 0..4 {
        assert!(!backup.backup_once().unwrap(), "later calls are no-ops");
    }

    assert_eq!(
        fs::read_to_string(backup.backup_path()).unwrap(),
        "pristine",
        "backup must hold content from the first call only"
    );
}

#[test]
fn test_absent_file_records_marker_not_backup() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");

    let backup = FileBackup::new(&path);
    assert!(backup.backup_once().unwrap(), "marker creation counts as new state");
    assert!(!backup.backup_path().exists());
    assert!(backup.has_backup_state());

    // Re-running install after the agent wrote the file must not back up
    // the agent's own content.
    fs::write(&path, "agent content").unwrap();
    assert!(!backup.backup_once().unwrap());
    assert!(!backup.backup_path().exists());
}

// =============================================================================
// Restore
// =============================================================================

#[test]
fn test_restore_returns_exact_pristine_bytes() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("crio.conf");
    fs::write(&path, "pristine\nwith several\nlines\n").unwrap();

    let backup = FileBackup::new(&path);
    backup.backup_once().unwrap();
    fs::write(&path, "completely different").unwrap();

    backup.restore().unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "pristine\nwith several\nlines\n"
    );
    assert!(!backup.has_backup_state(), "restore consumes the backup");
}

#[test]
fn test_restore_deletes_file_that_did_not_preexist() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");

    let backup = FileBackup::new(&path);
    backup.backup_once().unwrap();
    fs::write(&path, "agent content").unwrap();

    backup.restore().unwrap();
    assert!(!path.exists(), "file absent pre-install must be absent again");
    assert!(!backup.has_backup_state());
}

#[test]
fn test_restore_twice_is_noop() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("crio.conf");
    fs::write(&path, "pristine").unwrap();

    let backup = FileBackup::new(&path);
    backup.backup_once().unwrap();
    fs::write(&path, "mutated").unwrap();
    backup.restore().unwrap();
    backup.restore().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "pristine");
}

#[test]
fn test_restore_with_no_backup_state_is_noop() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("crio.conf");
    fs::write(&path, "untouched").unwrap();

    let backup = FileBackup::new(&path);
    backup.restore().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "untouched");
}

// =============================================================================
// Restart Survival
// =============================================================================

#[test]
fn test_backup_state_survives_process_restart() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("crio.conf");
    fs::write(&path, "pristine").unwrap();

    // First agent process backs up and mutates.
    FileBackup::new(&path).backup_once().unwrap();
    fs::write(&path, "mutated").unwrap();

    // Supervisor restarts the agent: a fresh value over the same path must
    // see the prior backup and neither clobber nor duplicate it.
    let restarted = FileBackup::new(&path);
    assert!(!restarted.backup_once().unwrap());
    restarted.restore().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "pristine");
}
