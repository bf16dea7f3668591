//! Capture host interface
//!
//! The engine never enumerates windows or creates capture sources itself;
//! both belong to the hosting capture runtime and are reached through this
//! trait.

use anyhow::Result;

/// A capturable window/application as reported by the capture backend
#[derive(Debug, Clone)]
pub struct RawTarget {
    /// Opaque id understood by the backend's capture-target property
    pub id: String,
    /// Human-readable title
    pub title: String,
}

/// Introspection and source creation supplied by the hosting capture runtime
pub trait CaptureHost: Send + Sync {
    /// Enumerate the capturable windows/applications on this platform
    fn enumerate_targets(&self) -> Result<Vec<RawTarget>>;

    /// Create a capture source with the given name for the given target id.
    /// The host announces the new source back through the engine's
    /// lifecycle notifications.
    fn create_capture_source(&self, name: &str, target_id: &str) -> Result<()>;
}
