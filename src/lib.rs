//! # kata-installer
//!
//! **Node-local runtime configuration mutation engine**
//!
//! This crate installs, removes, and resets the Kata Containers runtime
//! handler inside whichever of the two supported CRI backends a cluster
//! node runs. It is the core of a node agent: the wrapping daemon discovers
//! the node's runtime string, calls into this crate, and then reloads the
//! backend service and labels the node — those collaborator calls are
//! behind traits here, implemented outside the core.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    LifecycleController                     │
//! │        install(kind) · cleanup(kind) · reset(kind)         │
//! └───────────────┬──────────────────────────┬─────────────────┘
//!                 │                          │
//!        classify(version)          BackendAdapter trait
//!                 │              ┌───────────┴───────────┐
//!           RuntimeKind          │                       │
//!                          CrioAdapter          ContainerdAdapter
//!                        (append + toggle)    (whole-file overwrite)
//!                                │                       │
//!                          FileBackup              FileBackup
//!                                                  + ShimLink
//! ```
//!
//! # Reversibility Model
//!
//! Every mutation is reversible and every operation is idempotent:
//!
//! - [`FileBackup`] backs a configuration file up at most once per
//!   install/cleanup cycle and restores exactly those bytes, with the
//!   "file was absent pre-install" case recorded durably on disk.
//! - [`ShimLink`] applies the same backup-once/restore-once discipline to
//!   the well-known shim binary path containerd resolves.
//! - Both adapters leave the configuration byte-for-byte unchanged when
//!   `configure()` runs a second time.
//!
//! The agent may be restarted arbitrarily often by its supervisor; a
//! re-invoked operation converges to the same end state without
//! double-applying. There is no in-process retry or rollback — restart and
//! re-run *is* the retry model.
//!
//! # Concurrency
//!
//! Single-threaded and synchronous. The agent assumes it is the sole writer
//! to the two configuration files and the shim link on a given host; that
//! is an operational invariant (one agent instance per node), not something
//! arbitrated here.
//!
//! # Example
//!
//! ```rust,ignore
//! use kata_installer::{classify, LifecycleController};
//!
//! fn main() -> kata_installer::Result<()> {
//!     let kind = classify("containerd://1.4.3")?;
//!     let controller = LifecycleController::new();
//!     let result = controller.install(kind)?;
//!     println!("{}: {:?}", result.backend, result.state);
//!     Ok(())
//! }
//! ```

pub mod backends;
pub mod backup;
pub mod constants;
pub mod detect;
pub mod error;
pub mod lifecycle;
pub mod shim;

// Re-exports
pub use backends::{adapter_for, BackendAdapter, ContainerdAdapter, CrioAdapter};
pub use backup::FileBackup;
pub use constants::*;
pub use detect::{classify, RuntimeKind};
pub use error::{Error, Result};
pub use lifecycle::{
    BackendServiceManager, LifecycleAction, LifecycleController, LifecycleResult, LifecycleState,
    NodeStatus, NodeStatusSink, NoopCollaborators,
};
pub use shim::{LinkState, ShimLink};
