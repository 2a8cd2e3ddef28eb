//! # Lifecycle Controller
//!
//! Sequences the three supported transitions — install, cleanup, reset —
//! over the detector, the backend adapters, and the external collaborators
//! (node status label, backend service manager).
//!
//! ## Transition Model
//!
//! ```text
//! install:  Uninstalled → Installing → adapter.configure() → Installed
//! cleanup:  Installed → CleaningUp → adapter.cleanup()   → CleanedUp
//! reset:    ResettingExternal (collaborators only, no file mutation)
//! ```
//!
//! Any adapter failure aborts the transition where it stands: no automatic
//! rollback, no in-process retry. On-disk state is left as far as the
//! failing step got, and because every mutation is idempotent, the
//! supervising process re-invoking the same operation after a restart is
//! the retry path.
//!
//! An unmanaged backend kind ([`RuntimeKind::Other`]) is not a failure:
//! every transition resolves to a successful no-op so the agent runs
//! harmlessly on nodes it does not manage.

use crate::backends::{self, BackendAdapter};
use crate::detect::RuntimeKind;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// =============================================================================
// Lifecycle State
// =============================================================================

/// Installation state of the alternate runtime on this node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// No installation has been attempted.
    Uninstalled,
    /// Install transition in progress.
    Installing,
    /// Install transition completed.
    Installed,
    /// Cleanup transition in progress.
    CleaningUp,
    /// Cleanup transition completed.
    CleanedUp,
    /// Reset requested; external collaborators are being signalled.
    ResettingExternal,
}

/// The transition a controller call performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleAction {
    Install,
    Cleanup,
    Reset,
}

/// Outcome of a lifecycle transition, returned to the caller.
///
/// Not persisted anywhere; the durable record of what happened is the
/// on-disk configuration state itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleResult {
    /// The action that was requested.
    pub action: LifecycleAction,
    /// The backend the action was requested for.
    pub backend: RuntimeKind,
    /// State reached by the transition.
    pub state: LifecycleState,
    /// False when the backend is unmanaged and nothing was touched.
    pub performed: bool,
}

/// Node status published for the orchestrator to observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Installing,
    Installed,
    Cleanup,
    Error,
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Installing => write!(f, "installing"),
            Self::Installed => write!(f, "installed"),
            Self::Cleanup => write!(f, "cleanup"),
            Self::Error => write!(f, "error"),
        }
    }
}

// =============================================================================
// External Collaborators
// =============================================================================

/// Publishes the node's installation status for the orchestrator to observe.
///
/// Implemented outside this crate (typically as a node label write); the
/// controller only calls it.
pub trait NodeStatusSink {
    fn publish(&self, status: NodeStatus) -> Result<()>;
}

/// Signals the backend's supervising service manager.
///
/// Implemented outside this crate; `reset` is a pure pass-through to these
/// calls and touches no files.
pub trait BackendServiceManager {
    /// Requests a reload/restart of the backend service.
    fn restart(&self, kind: RuntimeKind) -> Result<()>;

    /// Clears any orchestrator-side installation state for the backend.
    fn clear_orchestrator_state(&self, kind: RuntimeKind) -> Result<()>;
}

/// Collaborator that ignores every call. Used when embedding the engine
/// without an orchestrator, and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCollaborators;

impl NodeStatusSink for NoopCollaborators {
    fn publish(&self, _status: NodeStatus) -> Result<()> {
        Ok(())
    }
}

impl BackendServiceManager for NoopCollaborators {
    fn restart(&self, _kind: RuntimeKind) -> Result<()> {
        Ok(())
    }

    fn clear_orchestrator_state(&self, _kind: RuntimeKind) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// Controller
// =============================================================================

/// Orchestrates install, cleanup, and reset over one node's backend.
pub struct LifecycleController<S, M> {
    status: S,
    services: M,
    /// Override for tests; production dispatch goes through
    /// [`backends::adapter_for`].
    adapter_override: Option<Box<dyn BackendAdapter>>,
}

impl Default for LifecycleController<NoopCollaborators, NoopCollaborators> {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleController<NoopCollaborators, NoopCollaborators> {
    /// Creates a controller with no-op collaborators.
    pub fn new() -> Self {
        Self::with_collaborators(NoopCollaborators, NoopCollaborators)
    }
}

impl<S: NodeStatusSink, M: BackendServiceManager> LifecycleController<S, M> {
    /// Creates a controller wired to external collaborators.
    pub fn with_collaborators(status: S, services: M) -> Self {
        Self {
            status,
            services,
            adapter_override: None,
        }
    }

    /// Replaces backend dispatch with a fixed adapter.
    pub fn with_adapter(mut self, adapter: Box<dyn BackendAdapter>) -> Self {
        self.adapter_override = Some(adapter);
        self
    }

    fn adapter(&self, kind: RuntimeKind) -> Option<&dyn BackendAdapter> {
        // An override only applies to the kind it was built for.
        self.adapter_override
            .as_deref()
            .filter(|a| a.kind() == kind)
    }

    fn run_adapter(
        &self,
        kind: RuntimeKind,
        op: impl Fn(&dyn BackendAdapter) -> Result<()>,
    ) -> Result<bool> {
        if let Some(adapter) = self.adapter(kind) {
            op(adapter)?;
            return Ok(true);
        }
        match backends::adapter_for(kind) {
            Some(adapter) => {
                op(adapter.as_ref())?;
                Ok(true)
            }
            None => {
                info!("Backend {} is not managed, nothing to do", kind);
                Ok(false)
            }
        }
    }

    /// Publishes a status, logging rather than failing when the sink itself
    /// errors while we are already reporting a failure.
    fn publish_error_status(&self) {
        if let Err(e) = self.status.publish(NodeStatus::Error) {
            warn!("Failed to publish error status: {}", e);
        }
    }

    /// Installs the alternate runtime into the node's backend.
    ///
    /// Safe to re-invoke: `configure()` is idempotent for both backends, so
    /// a supervisor restarting the agent mid-install simply runs the
    /// transition again.
    pub fn install(&self, kind: RuntimeKind) -> Result<LifecycleResult> {
        if kind == RuntimeKind::Other {
            return Ok(LifecycleResult {
                action: LifecycleAction::Install,
                backend: kind,
                state: LifecycleState::Uninstalled,
                performed: false,
            });
        }

        self.status.publish(NodeStatus::Installing)?;
        info!("Installing kata runtime for {}", kind);

        if let Err(e) = self.run_adapter(kind, |a| a.configure()) {
            self.publish_error_status();
            return Err(e);
        }

        self.status.publish(NodeStatus::Installed)?;
        Ok(LifecycleResult {
            action: LifecycleAction::Install,
            backend: kind,
            state: LifecycleState::Installed,
            performed: true,
        })
    }

    /// Removes the alternate runtime from the node's backend, restoring the
    /// pre-install configuration.
    pub fn cleanup(&self, kind: RuntimeKind) -> Result<LifecycleResult> {
        if kind == RuntimeKind::Other {
            return Ok(LifecycleResult {
                action: LifecycleAction::Cleanup,
                backend: kind,
                state: LifecycleState::Uninstalled,
                performed: false,
            });
        }

        self.status.publish(NodeStatus::Cleanup)?;
        info!("Cleaning up kata runtime for {}", kind);

        if let Err(e) = self.run_adapter(kind, |a| a.cleanup()) {
            self.publish_error_status();
            return Err(e);
        }

        Ok(LifecycleResult {
            action: LifecycleAction::Cleanup,
            backend: kind,
            state: LifecycleState::CleanedUp,
            performed: true,
        })
    }

    /// Signals external collaborators to restart the backend and clear
    /// orchestrator state. Touches no files.
    pub fn reset(&self, kind: RuntimeKind) -> Result<LifecycleResult> {
        if kind == RuntimeKind::Other {
            return Ok(LifecycleResult {
                action: LifecycleAction::Reset,
                backend: kind,
                state: LifecycleState::Uninstalled,
                performed: false,
            });
        }

        info!("Resetting external state for {}", kind);
        self.services.restart(kind)?;
        self.services.clear_orchestrator_state(kind)?;

        Ok(LifecycleResult {
            action: LifecycleAction::Reset,
            backend: kind,
            state: LifecycleState::ResettingExternal,
            performed: true,
        })
    }
}
