//! Type-safe identifiers for remote engine objects.
//!
//! Newtype wrappers prevent mixing incompatible identifiers at compile time.
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`TargetId`] | Opaque name of a remote object (`page$7`, `engine`) |
//! | [`RequestId`] | Per-request UUID for request/reply correlation |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// TargetId
// ============================================================================

/// Reserved target naming the engine-level object itself.
const ENGINE_TARGET: &str = "engine";

/// Prefix for page object targets.
const PAGE_TARGET_PREFIX: &str = "page$";

/// Opaque identifier naming a remote object within the engine's namespace.
///
/// A `TargetId` is immutable for the lifetime of the proxy that owns it.
/// Every command and subscription forwarded by a proxy carries its target
/// unchanged.
///
/// # Example
///
/// ```
/// use wraith::TargetId;
///
/// let target = TargetId::page("7");
/// assert_eq!(target.as_str(), "page$7");
/// assert!(target.is_page());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    /// Creates a target from a raw identifier string.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a page target from a page ID.
    ///
    /// Format: `page$<id>`.
    #[inline]
    #[must_use]
    pub fn page(page_id: impl fmt::Display) -> Self {
        Self(format!("{PAGE_TARGET_PREFIX}{page_id}"))
    }

    /// Returns the engine-level target.
    #[inline]
    #[must_use]
    pub fn engine() -> Self {
        Self(ENGINE_TARGET.to_string())
    }

    /// Returns the raw identifier string.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this target names a page object.
    #[inline]
    #[must_use]
    pub fn is_page(&self) -> bool {
        self.0.starts_with(PAGE_TARGET_PREFIX)
    }

    /// Returns `true` if this is the engine-level target.
    #[inline]
    #[must_use]
    pub fn is_engine(&self) -> bool {
        self.0 == ENGINE_TARGET
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// RequestId
// ============================================================================

/// Unique identifier for request/reply correlation.
///
/// Generated per command, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a fresh random request ID.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_target_format() {
        let target = TargetId::page("7");
        assert_eq!(target.as_str(), "page$7");
        assert_eq!(target.to_string(), "page$7");
        assert!(target.is_page());
        assert!(!target.is_engine());
    }

    #[test]
    fn test_page_target_numeric_id() {
        let target = TargetId::page(42);
        assert_eq!(target.as_str(), "page$42");
    }

    #[test]
    fn test_engine_target() {
        let target = TargetId::engine();
        assert_eq!(target.as_str(), "engine");
        assert!(target.is_engine());
        assert!(!target.is_page());
    }

    #[test]
    fn test_target_serde_transparent() {
        let target = TargetId::page("7");
        let json = serde_json::to_string(&target).expect("serialize");
        assert_eq!(json, "\"page$7\"");

        let back: TargetId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, target);
    }

    #[test]
    fn test_request_id_unique() {
        let a = RequestId::generate();
        let b = RequestId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_request_id_serde_roundtrip() {
        let id = RequestId::generate();
        let json = serde_json::to_string(&id).expect("serialize");
        let back: RequestId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }
}
