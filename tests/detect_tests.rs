//! Tests for runtime backend detection.
//!
//! Validates that the free-text runtime version strings reported by the
//! orchestrator classify into the right backend kind, and that unusable
//! input is an error rather than a silent default.

use kata_installer::{classify, Error, RuntimeKind};

// =============================================================================
// Known Backend Mapping
// =============================================================================

#[test]
fn test_crio_version_string() {
    assert_eq!(classify("cri-o://1.20.0").unwrap(), RuntimeKind::Crio);
}

#[test]
fn test_containerd_version_string() {
    assert_eq!(
        classify("containerd://1.4.3").unwrap(),
        RuntimeKind::Containerd
    );
}

#[test]
fn test_spelling_variants_normalize() {
    // Hyphenated and bare vendor spellings are the same backend.
    assert_eq!(classify("crio://1.20.0").unwrap(), RuntimeKind::Crio);
    assert_eq!(classify("CRI-O://1.20.0").unwrap(), RuntimeKind::Crio);
    assert_eq!(classify("Containerd://1.6.0").unwrap(), RuntimeKind::Containerd);
}

#[test]
fn test_version_suffix_is_ignored() {
    assert_eq!(classify("containerd://999").unwrap(), RuntimeKind::Containerd);
    assert_eq!(classify("containerd").unwrap(), RuntimeKind::Containerd);
}

// =============================================================================
// Unmanaged Backends
// =============================================================================

#[test]
fn test_unmanaged_backends_are_other() {
    assert_eq!(classify("docker://19.3").unwrap(), RuntimeKind::Other);
    assert_eq!(classify("mirantis://1.0").unwrap(), RuntimeKind::Other);
}

// =============================================================================
// Unusable Input
// =============================================================================

#[test]
fn test_empty_string_is_detection_error() {
    assert!(matches!(classify(""), Err(Error::Detection(_))));
}

#[test]
fn test_whitespace_is_detection_error() {
    assert!(matches!(classify("  \t "), Err(Error::Detection(_))));
}

#[test]
fn test_missing_scheme_is_detection_error() {
    assert!(matches!(classify("://1.20.0"), Err(Error::Detection(_))));
}

#[test]
fn test_other_is_distinct_from_error() {
    // A valid-but-unmanaged string must not look like a detection failure.
    assert!(classify("docker://19.3").is_ok());
    assert!(classify("").is_err());
}
