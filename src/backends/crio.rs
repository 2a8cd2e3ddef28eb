//! # CRI-O Adapter
//!
//! Registers the kata handlers with CRI-O by editing `crio.conf` in place:
//! the two handler stanzas are appended when absent (detected by their
//! table-header marker lines, so re-running install never duplicates them),
//! and the `manage_ns_lifecycle` toggle is inserted into the
//! `[crio.runtime]` section or replaced in place if the key already exists
//! anywhere in the file.
//!
//! Cleanup does not attempt to surgically remove the stanzas. The pristine
//! file was backed up before the first edit, and restoring it verbatim is
//! the recovery path.

use crate::backup::FileBackup;
use crate::constants::{
    CRIO_CONFIG_PATH, CRIO_FC_MARKER, CRIO_FC_STANZA, CRIO_QEMU_MARKER, CRIO_QEMU_STANZA,
    CRIO_RUNTIME_SECTION, CRIO_TOGGLE_KEY, CRIO_TOGGLE_LINE,
};
use crate::detect::RuntimeKind;
use crate::error::{Error, Result};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use super::BackendAdapter;

/// Adapter for the CRI-O backend.
#[derive(Debug, Clone)]
pub struct CrioAdapter {
    config_path: PathBuf,
    backup: FileBackup,
}

impl Default for CrioAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl CrioAdapter {
    /// Creates an adapter over the production CRI-O configuration file.
    pub fn new() -> Self {
        Self::with_config_path(CRIO_CONFIG_PATH)
    }

    /// Creates an adapter over an explicit configuration file path.
    pub fn with_config_path(config_path: impl Into<PathBuf>) -> Self {
        let config_path = config_path.into();
        let backup = FileBackup::new(&config_path);
        Self {
            config_path,
            backup,
        }
    }

    /// Appends each handler stanza unless its marker line is already present.
    fn append_stanzas(content: &mut String) {
        for (marker, stanza) in [
            (CRIO_QEMU_MARKER, CRIO_QEMU_STANZA),
            (CRIO_FC_MARKER, CRIO_FC_STANZA),
        ] {
            if content.contains(marker) {
                debug!("Stanza {} already present", marker);
            } else {
                content.push_str(stanza);
            }
        }
    }

    /// Inserts or replaces the runtime toggle line.
    ///
    /// Replacement matches the key anywhere in the file; insertion goes
    /// immediately after the `[crio.runtime]` section header. A file with
    /// no such header gets the header appended along with the toggle. The
    /// result is a fixed point: applying it to its own output changes
    /// nothing.
    fn apply_toggle(content: &str) -> String {
        let mut lines: Vec<String> = content.lines().map(str::to_string).collect();

        if let Some(line) = lines.iter_mut().find(|l| is_toggle_key(l)) {
            let indent_len = line.len() - line.trim_start().len();
            let indent = line[..indent_len].to_string();
            *line = format!("{indent}{CRIO_TOGGLE_LINE}");
        } else if let Some(pos) = lines.iter().position(|l| l.trim() == CRIO_RUNTIME_SECTION) {
            lines.insert(pos + 1, CRIO_TOGGLE_LINE.to_string());
        } else {
            lines.push(CRIO_RUNTIME_SECTION.to_string());
            lines.push(CRIO_TOGGLE_LINE.to_string());
        }

        let mut out = lines.join("\n");
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }
}

impl BackendAdapter for CrioAdapter {
    fn name(&self) -> &'static str {
        "cri-o"
    }

    fn kind(&self) -> RuntimeKind {
        RuntimeKind::Crio
    }

    fn configure(&self) -> Result<()> {
        self.backup.backup_once()?;

        let original = match fs::read_to_string(&self.config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(Error::fs(&self.config_path, e)),
        };

        let mut content = original.clone();
        Self::append_stanzas(&mut content);
        content = Self::apply_toggle(&content);

        if content == original {
            debug!("CRI-O config {} already current", self.config_path.display());
            return Ok(());
        }

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::fs(parent, e))?;
        }
        fs::write(&self.config_path, &content).map_err(|e| Error::fs(&self.config_path, e))?;
        info!(
            "Registered kata handlers in {}",
            self.config_path.display()
        );
        Ok(())
    }

    fn cleanup(&self) -> Result<()> {
        self.backup.restore()?;
        info!("CRI-O config {} restored", self.config_path.display());
        Ok(())
    }
}

/// Returns true if the line assigns the runtime toggle key.
fn is_toggle_key(line: &str) -> bool {
    let trimmed = line.trim_start();
    match trimmed.strip_prefix(CRIO_TOGGLE_KEY) {
        Some(rest) => rest.trim_start().starts_with('='),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_replaced_in_place() {
        let input = "[crio.runtime]\n  manage_ns_lifecycle = false\nother = 1\n";
        let out = CrioAdapter::apply_toggle(input);
        assert_eq!(
            out,
            "[crio.runtime]\n  manage_ns_lifecycle = true\nother = 1\n"
        );
    }

    #[test]
    fn test_toggle_inserted_after_section_header() {
        let input = "[crio]\n[crio.runtime]\ndefault_runtime = \"runc\"\n";
        let out = CrioAdapter::apply_toggle(input);
        assert_eq!(
            out,
            "[crio]\n[crio.runtime]\nmanage_ns_lifecycle = true\ndefault_runtime = \"runc\"\n"
        );
    }

    #[test]
    fn test_toggle_is_fixed_point() {
        let once = CrioAdapter::apply_toggle("[crio.runtime]\n");
        let twice = CrioAdapter::apply_toggle(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_toggle_key_match_is_exact() {
        assert!(is_toggle_key("manage_ns_lifecycle = false"));
        assert!(is_toggle_key("  manage_ns_lifecycle=true"));
        assert!(!is_toggle_key("manage_ns_lifecycle_extra = true"));
        assert!(!is_toggle_key("# manage_ns_lifecycle = true"));
    }
}
