//! # Installer Constants
//!
//! Well-known paths, configuration stanzas, and marker strings for the
//! runtime configuration mutation engine. These constants are the single
//! source of truth for everything the agent writes to a node.
//!
//! Every component also accepts explicit paths (`with_paths`-style
//! constructors) so tests can run against a temporary directory; the
//! constants here are the production defaults baked into `new()`.

// =============================================================================
// Installation Layout
// =============================================================================

/// Directory the Kata artifacts are unpacked into on the host.
pub const KATA_INSTALL_DIR: &str = "/opt/kata";

/// Suffix appended to a configuration file path to form its backup path.
///
/// A backup at `<path>.kata-bak` holds the pristine pre-install content and
/// is created at most once per install/cleanup cycle.
pub const BACKUP_SUFFIX: &str = ".kata-bak";

/// Suffix appended to a backup path to form the absent-marker path.
///
/// The marker records "the file did not exist before install" durably on
/// disk, so a restarted agent process still knows to delete rather than
/// restore the file on cleanup.
pub const ABSENT_MARKER_SUFFIX: &str = ".absent";

// =============================================================================
// CRI-O
// =============================================================================

/// CRI-O configuration file mutated by [`crate::backends::CrioAdapter`].
pub const CRIO_CONFIG_PATH: &str = "/etc/crio/crio.conf";

/// Section header the runtime toggle is inserted under.
pub const CRIO_RUNTIME_SECTION: &str = "[crio.runtime]";

/// Key of the boolean toggle CRI-O needs for VM-based runtimes.
pub const CRIO_TOGGLE_KEY: &str = "manage_ns_lifecycle";

/// Full toggle line written into the `[crio.runtime]` section.
pub const CRIO_TOGGLE_LINE: &str = "manage_ns_lifecycle = true";

/// Marker line identifying the QEMU handler stanza. Never appended twice.
pub const CRIO_QEMU_MARKER: &str = "[crio.runtime.runtimes.kata-qemu]";

/// Handler stanza registering `kata-qemu` with CRI-O.
pub const CRIO_QEMU_STANZA: &str = r#"
[crio.runtime.runtimes.kata-qemu]
  runtime_path = "/opt/kata/bin/kata-qemu"
  runtime_type = "oci"
"#;

/// Marker line identifying the Firecracker handler stanza.
pub const CRIO_FC_MARKER: &str = "[crio.runtime.runtimes.kata-fc]";

/// Handler stanza registering `kata-fc` with CRI-O.
pub const CRIO_FC_STANZA: &str = r#"
[crio.runtime.runtimes.kata-fc]
  runtime_path = "/opt/kata/bin/kata-fc"
  runtime_type = "oci"
"#;

// =============================================================================
// containerd
// =============================================================================

/// containerd configuration file owned by the agent while installed.
pub const CONTAINERD_CONFIG_PATH: &str = "/etc/containerd/config.toml";

/// Entire containerd configuration written while the runtime is installed.
///
/// Whole-file overwrite, not a merge: the agent cannot assume any
/// pre-existing structure in this file, so it owns the file outright and
/// restores the backup verbatim on cleanup.
pub const CONTAINERD_CONFIG_BODY: &str = r#"[plugins.cri.containerd.runtimes.kata]
  runtime_type = "io.containerd.kata.v2"
"#;

/// Well-known path containerd resolves the kata shim binary from.
pub const SHIM_LINK_PATH: &str = "/usr/local/bin/containerd-shim-kata-v2";

/// Actual shim binary under the installation directory.
pub const SHIM_TARGET_PATH: &str = "/opt/kata/bin/containerd-shim-kata-v2";

/// Backup location for a foreign file displaced from [`SHIM_LINK_PATH`].
pub const SHIM_BACKUP_PATH: &str = "/usr/local/bin/containerd-shim-kata-v2.bak";
