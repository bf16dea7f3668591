//! Capture source records and registration descriptors
//!
//! A capture source is a host-managed object that renders a window, screen,
//! or application region into the recording pipeline. The engine keeps one
//! record per monitored source, with the target application identifier
//! extracted from the source's settings once at registration time.

use serde_json::Value;

/// One tracked capture source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSource {
    /// Source name assigned by the capture host; unique key in the registry
    pub name: String,
    /// Target app id (bundle id, exe name, or WM_CLASS); empty if unknown.
    /// An empty target never matches anything.
    pub target_app: String,
    /// True while the frontmost app matches `target_app` (or, in manual
    /// mode, while the override is enabled). Written only by the poller.
    pub hooked: bool,
    /// True while the host is rendering this source to output
    pub active: bool,
    /// Tombstone flag; slots are reused rather than removed so index-based
    /// lookups stay stable
    pub in_use: bool,
}

/// Registration-time description of a host capture source: its backend kind,
/// its current settings object, and whether it is already being rendered.
#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    /// Host source type id (e.g. "window_capture", "screen_capture")
    pub kind: String,
    /// The source's current settings, as the host's JSON settings object
    pub settings: Value,
    /// Whether the source is active at registration time
    pub active: bool,
}

impl SourceDescriptor {
    pub fn new(kind: impl Into<String>, settings: Value) -> Self {
        Self {
            kind: kind.into(),
            settings,
            active: false,
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Extract the configured capture-target identifier, or an empty string
    /// when the property is absent or not a string.
    pub fn target_app(&self) -> String {
        self.settings
            .get(target_app_property(&self.kind))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}

/// Whether a host source kind is a window/screen capture type worth tracking
pub fn is_capture_kind(kind: &str) -> bool {
    matches!(
        kind,
        "window_capture"                    // Windows
            | "xcomposite_input"            // Linux X11
            | "pipewire-screen-capture-source" // Linux PipeWire
            | "screen_capture"              // macOS ScreenCaptureKit
    ) || kind.contains("window")
}

/// Settings property holding the capture-target identifier for a source
/// kind. The kinds are platform-unique, so one mapping covers every backend.
pub fn target_app_property(kind: &str) -> &'static str {
    match kind {
        "screen_capture" => "application",
        "window_capture" => "window",
        "xcomposite_input" => "capture_window",
        "pipewire-screen-capture-source" => "window",
        _ => "window",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_capture_kind_predicate() {
        assert!(is_capture_kind("window_capture"));
        assert!(is_capture_kind("xcomposite_input"));
        assert!(is_capture_kind("pipewire-screen-capture-source"));
        assert!(is_capture_kind("screen_capture"));
        // Fallback for backend variants we don't know by name
        assert!(is_capture_kind("game_window_capture"));
        assert!(!is_capture_kind("coreaudio_input_capture"));
        assert!(!is_capture_kind("browser_source"));
    }

    #[test]
    fn test_target_property_per_kind() {
        assert_eq!(target_app_property("screen_capture"), "application");
        assert_eq!(target_app_property("window_capture"), "window");
        assert_eq!(target_app_property("xcomposite_input"), "capture_window");
        assert_eq!(target_app_property("pipewire-screen-capture-source"), "window");
    }

    #[test]
    fn test_target_app_extraction() {
        let descriptor = SourceDescriptor::new(
            "screen_capture",
            json!({ "application": "com.apple.Safari", "show_cursor": true }),
        );
        assert_eq!(descriptor.target_app(), "com.apple.Safari");

        let descriptor = SourceDescriptor::new(
            "xcomposite_input",
            json!({ "capture_window": "0x3c00007 code", "cursor": true }),
        );
        assert_eq!(descriptor.target_app(), "0x3c00007 code");
    }

    #[test]
    fn test_target_app_missing_or_wrong_type_is_empty() {
        let descriptor = SourceDescriptor::new("window_capture", json!({}));
        assert_eq!(descriptor.target_app(), "");

        let descriptor = SourceDescriptor::new("window_capture", json!({ "window": 42 }));
        assert_eq!(descriptor.target_app(), "");
    }
}
