//! # Backup-Once / Restore-Once File Store
//!
//! Reversibility primitive for every configuration file the agent mutates.
//!
//! ## Ownership Model
//!
//! The agent exclusively owns a backup once it creates one, and restores
//! exactly the bytes it backed up, never a derived value. Two invariants
//! make repeated invocations safe across agent restarts:
//!
//! - **Backup-once**: a backup for a given path is created at most once per
//!   install/cleanup cycle. Re-running install finds the backup already
//!   present and leaves it alone, so the true pristine state is never
//!   clobbered by a copy of the agent's own edits.
//! - **Durable absence record**: when the file did not exist before install,
//!   that fact is recorded as an empty marker file on disk (not in process
//!   memory), so a restarted agent still knows that cleanup means *delete*,
//!   not *restore*.
//!
//! A backup file and an absent-marker existing simultaneously is an
//! inconsistent state the agent never produces; it is surfaced as
//! [`Error::BackupConflict`] rather than resolved by guessing.

use crate::constants::{ABSENT_MARKER_SUFFIX, BACKUP_SUFFIX};
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Backup state for one configuration file.
///
/// One instance per file the agent mutates. All state lives on disk; the
/// struct itself only carries the three paths, so a freshly constructed
/// value in a restarted process observes exactly the same backup state.
#[derive(Debug, Clone)]
pub struct FileBackup {
    /// The live configuration file.
    path: PathBuf,
    /// Where the pristine copy is kept while installed.
    backup_path: PathBuf,
    /// Marker recording that `path` did not exist pre-install.
    absent_marker_path: PathBuf,
}

impl FileBackup {
    /// Creates backup state for `path`, deriving the backup and marker
    /// locations from the standard suffixes.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let backup_path = suffixed(&path, BACKUP_SUFFIX);
        let absent_marker_path = suffixed(&backup_path, ABSENT_MARKER_SUFFIX);
        Self {
            path,
            backup_path,
            absent_marker_path,
        }
    }

    /// Returns the live file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the backup file path.
    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Returns true if a prior install left backup state on disk, either a
    /// pristine copy or an absent-marker.
    pub fn has_backup_state(&self) -> bool {
        self.backup_path.exists() || self.absent_marker_path.exists()
    }

    /// Backs up the live file, at most once per install/cleanup cycle.
    ///
    /// Returns `true` only when this call created new backup state. If a
    /// backup or absent-marker already exists the call is a no-op returning
    /// `false`, which is what makes install safely re-entrant. If the live
    /// file does not exist, an absent-marker is written instead of a backup
    /// so [`FileBackup::restore`] later deletes rather than restores.
    ///
    /// # Errors
    ///
    /// [`Error::BackupConflict`] when both a backup and an absent-marker are
    /// present, [`Error::Filesystem`] on I/O failure.
    pub fn backup_once(&self) -> Result<bool> {
        self.check_consistency()?;

        if self.has_backup_state() {
            debug!("Backup state for {} already present", self.path.display());
            return Ok(false);
        }

        if self.path.exists() {
            // Copy, not move: the live file keeps serving the backend.
            fs::copy(&self.path, &self.backup_path)
                .map_err(|e| Error::fs(&self.backup_path, e))?;
            info!(
                "Backed up {} to {}",
                self.path.display(),
                self.backup_path.display()
            );
        } else {
            fs::write(&self.absent_marker_path, b"")
                .map_err(|e| Error::fs(&self.absent_marker_path, e))?;
            info!(
                "{} absent pre-install, recorded marker {}",
                self.path.display(),
                self.absent_marker_path.display()
            );
        }
        Ok(true)
    }

    /// Restores the live file to its pre-install condition, consuming the
    /// backup state.
    ///
    /// With a backup present, the backup is moved back over the live file.
    /// With an absent-marker present, the live file is deleted along with
    /// the marker. With neither, the call is a no-op, so restoring twice is
    /// safe.
    pub fn restore(&self) -> Result<()> {
        self.check_consistency()?;

        if self.backup_path.exists() {
            // Rename consumes the backup, so a second restore is a no-op.
            fs::rename(&self.backup_path, &self.path).map_err(|e| Error::fs(&self.path, e))?;
            info!(
                "Restored {} from {}",
                self.path.display(),
                self.backup_path.display()
            );
        } else if self.absent_marker_path.exists() {
            if self.path.exists() {
                fs::remove_file(&self.path).map_err(|e| Error::fs(&self.path, e))?;
            }
            fs::remove_file(&self.absent_marker_path)
                .map_err(|e| Error::fs(&self.absent_marker_path, e))?;
            info!(
                "{} did not exist pre-install, removed it",
                self.path.display()
            );
        } else {
            debug!("No backup state for {}, nothing to restore", self.path.display());
        }
        Ok(())
    }

    fn check_consistency(&self) -> Result<()> {
        if self.backup_path.exists() && self.absent_marker_path.exists() {
            return Err(Error::BackupConflict {
                path: self.path.clone(),
                reason: format!(
                    "both backup {} and absent-marker {} exist",
                    self.backup_path.display(),
                    self.absent_marker_path.display()
                ),
            });
        }
        Ok(())
    }
}

/// Appends a suffix to the final path component.
fn suffixed(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(suffix);
    PathBuf::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_suffixed_keeps_extension() {
        let p = suffixed(Path::new("/etc/crio/crio.conf"), BACKUP_SUFFIX);
        assert_eq!(p, PathBuf::from("/etc/crio/crio.conf.kata-bak"));
    }

    #[test]
    fn test_conflicting_state_is_surfaced() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config");
        let backup = FileBackup::new(&path);

        fs::write(backup.backup_path(), b"pristine").unwrap();
        fs::write(&backup.absent_marker_path, b"").unwrap();

        assert!(matches!(
            backup.backup_once(),
            Err(Error::BackupConflict { .. })
        ));
        assert!(matches!(backup.restore(), Err(Error::BackupConflict { .. })));
    }
}
