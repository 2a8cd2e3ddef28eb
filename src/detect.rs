//! Runtime backend detection.
//!
//! Maps the free-text runtime version string reported by the orchestrator
//! (e.g. `"cri-o://1.20.0"` from a node's status) to a closed [`RuntimeKind`]
//! enum. All backend dispatch in the crate goes through this one
//! normalization point, so supporting a new backend is a single new variant
//! plus one adapter.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A container runtime backend this agent knows how to classify.
///
/// `Other` is a valid classification, not a failure: it names a backend the
/// agent does not manage, and every operation on it resolves to a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeKind {
    /// CRI-O.
    Crio,
    /// containerd.
    Containerd,
    /// Any other backend (docker, mirantis, ...). Not managed.
    Other,
}

impl std::fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Crio => write!(f, "cri-o"),
            Self::Containerd => write!(f, "containerd"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Classifies a raw runtime version string into a [`RuntimeKind`].
///
/// Accepts the `scheme://version` form used by orchestrator node status
/// (`"containerd://1.4.3"`) as well as a bare backend name. Known spelling
/// variants normalize to the same kind: `cri-o`, `crio`, and `CRI-O` are all
/// [`RuntimeKind::Crio`].
///
/// # Errors
///
/// Returns [`Error::Detection`] when the input is empty or has an empty
/// scheme (`"://1.2.3"`). Callers must treat that differently from
/// [`RuntimeKind::Other`]: `Other` means "valid but unmanaged", a detection
/// error means the input was unusable.
pub fn classify(raw: &str) -> Result<RuntimeKind> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::Detection(raw.to_string()));
    }

    let scheme = match trimmed.split_once("://") {
        Some((scheme, _)) => scheme,
        None => trimmed,
    };
    if scheme.is_empty() {
        return Err(Error::Detection(raw.to_string()));
    }

    // Normalize vendor spelling: lowercase, hyphens dropped ("cri-o" == "crio").
    let normalized: String = scheme
        .chars()
        .filter(|c| *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect();

    Ok(match normalized.as_str() {
        "crio" => RuntimeKind::Crio,
        "containerd" => RuntimeKind::Containerd,
        _ => RuntimeKind::Other,
    })
}
