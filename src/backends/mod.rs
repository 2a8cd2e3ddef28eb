//! Backend configuration adapters.
//!
//! One adapter per managed backend, behind a single capability trait. The
//! two variants use deliberately different mutation strategies — CRI-O gets
//! surgical append-and-toggle edits, containerd gets whole-file ownership —
//! because the contract is behavioral (idempotent configure/cleanup), not
//! structural.

pub mod containerd;
pub mod crio;

pub use self::containerd::ContainerdAdapter;
pub use self::crio::CrioAdapter;

use crate::detect::RuntimeKind;
use crate::error::Result;

/// Capability interface for mutating one backend's configuration.
///
/// # Contract
///
/// - `configure()` is idempotent: calling it twice in a row with no
///   intervening `cleanup()` leaves the configuration byte-for-byte
///   identical to calling it once.
/// - `cleanup()` returns the configuration to its exact pre-install content
///   (or absence), and is itself safe to repeat.
/// - Neither operation retries internally; failures surface to the caller
///   and a re-invocation after restart is the retry path.
pub trait BackendAdapter {
    /// Returns the backend name, for logging and results.
    fn name(&self) -> &'static str;

    /// Returns the backend kind this adapter manages.
    fn kind(&self) -> RuntimeKind;

    /// Idempotently injects the alternate runtime into the backend's
    /// configuration.
    fn configure(&self) -> Result<()>;

    /// Reverses everything `configure()` did.
    fn cleanup(&self) -> Result<()>;
}

/// Returns the adapter for a backend kind, or `None` for a kind the agent
/// does not manage.
pub fn adapter_for(kind: RuntimeKind) -> Option<Box<dyn BackendAdapter>> {
    match kind {
        RuntimeKind::Crio => Some(Box::new(CrioAdapter::new())),
        RuntimeKind::Containerd => Some(Box::new(ContainerdAdapter::new())),
        RuntimeKind::Other => None,
    }
}
