//! # Shim Link Management
//!
//! containerd locates the kata shim by a well-known binary path, not by
//! configuration content, so installing the runtime means planting a symlink
//! at that path and cleanup means putting back whatever was there before.
//!
//! This mirrors the backup-once/restore-once discipline of
//! [`crate::backup::FileBackup`], applied to a filesystem link instead of
//! file contents: a foreign entry found at the link path is displaced to a
//! backup location exactly once, and `ensure_unlinked` moves it back.
//!
//! ## State Table
//!
//! | state at link path                    | `ensure_linked` action            |
//! |---------------------------------------|-----------------------------------|
//! | absent                                | create symlink                    |
//! | our symlink (points at the target)    | no-op                             |
//! | foreign entry, no backup              | move entry to backup, then link   |
//! | foreign entry, backup already present | delete entry (keep older backup), then link |

use crate::constants::{SHIM_BACKUP_PATH, SHIM_LINK_PATH, SHIM_TARGET_PATH};
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Observed state of the shim link path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Nothing exists at the link path.
    Absent,
    /// Our symlink, pointing at the alternate runtime binary.
    LinkedToAlternate,
    /// Something else occupies the path and a displaced backup exists.
    ForeignWithBackup,
    /// Something else occupies the path and no backup exists yet.
    ForeignWithoutBackup,
}

/// Manages the symlink a backend consults to locate the kata shim binary.
#[derive(Debug, Clone)]
pub struct ShimLink {
    link_path: PathBuf,
    target_path: PathBuf,
    backup_path: PathBuf,
}

impl Default for ShimLink {
    fn default() -> Self {
        Self::new()
    }
}

impl ShimLink {
    /// Creates a manager for the production shim link location.
    pub fn new() -> Self {
        Self::with_paths(SHIM_LINK_PATH, SHIM_TARGET_PATH, SHIM_BACKUP_PATH)
    }

    /// Creates a manager over explicit paths.
    pub fn with_paths(
        link_path: impl Into<PathBuf>,
        target_path: impl Into<PathBuf>,
        backup_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            link_path: link_path.into(),
            target_path: target_path.into(),
            backup_path: backup_path.into(),
        }
    }

    /// Returns the link path.
    pub fn link_path(&self) -> &Path {
        &self.link_path
    }

    /// Observes the current state of the link path.
    ///
    /// Uses `symlink_metadata` so a dangling symlink still counts as
    /// occupying the path.
    pub fn state(&self) -> Result<LinkState> {
        match fs::symlink_metadata(&self.link_path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(LinkState::Absent),
            Err(e) => return Err(Error::fs(&self.link_path, e)),
            Ok(meta) => {
                if meta.file_type().is_symlink() {
                    let dest =
                        fs::read_link(&self.link_path).map_err(|e| Error::fs(&self.link_path, e))?;
                    if dest == self.target_path {
                        return Ok(LinkState::LinkedToAlternate);
                    }
                }
            }
        }
        if self.backup_path.exists() {
            Ok(LinkState::ForeignWithBackup)
        } else {
            Ok(LinkState::ForeignWithoutBackup)
        }
    }

    /// Ensures the link path is a symlink to the alternate runtime binary.
    ///
    /// Idempotent: an existing correct symlink is left untouched. A foreign
    /// occupant is displaced to the backup path, or deleted if a backup from
    /// an earlier displacement already exists — the older backup holds the
    /// true pre-install state and is never overwritten.
    pub fn ensure_linked(&self) -> Result<()> {
        match self.state()? {
            LinkState::LinkedToAlternate => {
                debug!("Shim link {} already in place", self.link_path.display());
                return Ok(());
            }
            LinkState::Absent => {}
            LinkState::ForeignWithoutBackup => {
                fs::rename(&self.link_path, &self.backup_path)
                    .map_err(|e| Error::fs(&self.backup_path, e))?;
                info!(
                    "Displaced foreign entry at {} to {}",
                    self.link_path.display(),
                    self.backup_path.display()
                );
            }
            LinkState::ForeignWithBackup => {
                warn!(
                    "Foreign entry at {} with backup already present, deleting it",
                    self.link_path.display()
                );
                fs::remove_file(&self.link_path).map_err(|e| Error::fs(&self.link_path, e))?;
            }
        }

        symlink(&self.target_path, &self.link_path).map_err(|e| Error::fs(&self.link_path, e))?;
        info!(
            "Linked {} -> {}",
            self.link_path.display(),
            self.target_path.display()
        );
        Ok(())
    }

    /// Removes our symlink and restores any displaced pre-existing entry.
    ///
    /// Idempotent: with no symlink and no backup this is a no-op.
    pub fn ensure_unlinked(&self) -> Result<()> {
        if matches!(self.state()?, LinkState::LinkedToAlternate) {
            fs::remove_file(&self.link_path).map_err(|e| Error::fs(&self.link_path, e))?;
            debug!("Removed shim link {}", self.link_path.display());
        }
        if self.backup_path.exists() {
            fs::rename(&self.backup_path, &self.link_path)
                .map_err(|e| Error::fs(&self.link_path, e))?;
            info!(
                "Restored displaced entry at {}",
                self.link_path.display()
            );
        }
        Ok(())
    }
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}
