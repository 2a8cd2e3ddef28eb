//! # containerd Adapter
//!
//! Unlike CRI-O, containerd's configuration is treated as wholly owned by
//! the agent while installed: `configure()` backs up whatever exists and
//! then overwrites the file with a fixed declarative block registering the
//! `io.containerd.kata.v2` runtime type. The agent cannot assume any
//! pre-existing structure in the file, so overwrite-and-restore is the only
//! strategy that is both idempotent and exactly reversible.
//!
//! containerd discovers the shim binary by path, not by config content, so
//! this adapter also delegates to [`ShimLink`] to keep the well-known shim
//! location pointing at the kata binary.

use crate::backup::FileBackup;
use crate::constants::{CONTAINERD_CONFIG_BODY, CONTAINERD_CONFIG_PATH};
use crate::detect::RuntimeKind;
use crate::error::{Error, Result};
use crate::shim::ShimLink;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use super::BackendAdapter;

/// Adapter for the containerd backend.
#[derive(Debug, Clone)]
pub struct ContainerdAdapter {
    config_path: PathBuf,
    backup: FileBackup,
    shim: ShimLink,
}

impl Default for ContainerdAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerdAdapter {
    /// Creates an adapter over the production containerd paths.
    pub fn new() -> Self {
        Self::with_paths(CONTAINERD_CONFIG_PATH, ShimLink::new())
    }

    /// Creates an adapter over an explicit config path and shim link.
    pub fn with_paths(config_path: impl Into<PathBuf>, shim: ShimLink) -> Self {
        let config_path = config_path.into();
        let backup = FileBackup::new(&config_path);
        Self {
            config_path,
            backup,
            shim,
        }
    }
}

impl BackendAdapter for ContainerdAdapter {
    fn name(&self) -> &'static str {
        "containerd"
    }

    fn kind(&self) -> RuntimeKind {
        RuntimeKind::Containerd
    }

    fn configure(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::fs(parent, e))?;
        }

        self.backup.backup_once()?;

        // Whole-file ownership: same fixed bytes every time, so repeated
        // installs are trivially byte-identical.
        fs::write(&self.config_path, CONTAINERD_CONFIG_BODY)
            .map_err(|e| Error::fs(&self.config_path, e))?;
        info!(
            "Wrote kata runtime registration to {}",
            self.config_path.display()
        );

        self.shim.ensure_linked()
    }

    fn cleanup(&self) -> Result<()> {
        // The agent owns the config file only while backup state exists; a
        // re-run after a completed cleanup must not touch the restored (or
        // never-installed) operator file.
        if self.backup.has_backup_state() {
            // Delete before restore: a failure in between leaves no file
            // rather than two conflicting ones.
            match fs::remove_file(&self.config_path) {
                Ok(()) => debug!("Removed {}", self.config_path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::fs(&self.config_path, e)),
            }
            self.backup.restore()?;
            info!("containerd config {} restored", self.config_path.display());
        } else {
            debug!(
                "No backup state for {}, config not owned by agent",
                self.config_path.display()
            );
        }

        self.shim.ensure_unlinked()
    }
}
