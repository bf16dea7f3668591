//! Capturable target enumeration
//!
//! The actual window/application enumeration is delegated to the capture
//! host; this module annotates the raw list with a best-effort application
//! name and a suggestion flag, and knows which capture source kind and
//! settings property the current platform uses.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::host::CaptureHost;

/// App names worth suggesting for capture (case-insensitive substring match)
const SUGGESTED_APPS: &[&str] = &[
    // Browsers
    "firefox", "chrome", "chromium", "safari", "brave", "edge", "opera", "vivaldi",
    // IDEs and editors
    "cursor", "code", "codium", "idea", "webstorm", "pycharm", "goland", "clion",
    "sublime_text", "sublime", "atom", "vim", "nvim", "emacs", "notepad++",
    // PDF and document viewers
    "preview", "evince", "okular", "acrobat", "reader", "foxit", "zathura",
    // Terminals
    "terminal", "iterm", "iterm2", "alacritty", "kitty", "wezterm", "hyper",
    "gnome-terminal", "konsole", "xterm",
];

/// One capturable window/application target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetInfo {
    /// Opaque target id understood by the capture backend
    pub id: String,
    /// Window/application title as shown by the host
    pub title: String,
    /// Best-effort application name extracted from the title
    pub app_name: String,
    /// Whether the app is on the suggested list
    pub suggested: bool,
}

/// Response to `GetAvailableWindows`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableWindowsResponse {
    /// Every capturable target
    pub windows: Vec<TargetInfo>,
    /// The subset matching the suggested-apps list
    pub suggested: Vec<TargetInfo>,
    /// Capture source kind used for window capture on this platform
    pub source_type: String,
    /// Settings property holding the capture target for that kind
    pub window_property: String,
}

/// Enumerate capturable targets through the host and annotate them
pub fn available_windows(host: &dyn CaptureHost) -> Result<AvailableWindowsResponse> {
    let raw = host.enumerate_targets()?;

    let mut windows = Vec::new();
    let mut suggested = Vec::new();

    for target in raw {
        // Skip empty/placeholder entries.
        if target.id.is_empty() || target.title.is_empty() || target.title == "None" {
            continue;
        }

        let app_name = extract_app_name(&target.title);
        let is_suggested = is_suggested_app(&app_name) || is_suggested_app(&target.title);

        let info = TargetInfo {
            id: target.id,
            title: target.title,
            app_name,
            suggested: is_suggested,
        };

        if is_suggested {
            suggested.push(info.clone());
        }
        windows.push(info);
    }

    debug!(
        "Enumerated {} capturable targets ({} suggested)",
        windows.len(),
        suggested.len()
    );

    Ok(AvailableWindowsResponse {
        windows,
        suggested,
        source_type: capture_source_kind().to_string(),
        window_property: target_property_name().to_string(),
    })
}

/// Best-effort application name from a window title: the segment before the
/// first " - ", " — ", or ":" separator, with trailing whitespace trimmed.
pub fn extract_app_name(title: &str) -> String {
    let cut = title
        .find(" - ")
        .or_else(|| title.find(" \u{2014} "))
        .or_else(|| title.find(':'));

    let head = match cut {
        Some(idx) => &title[..idx],
        None => title,
    };

    head.trim_end().to_string()
}

/// Whether an app name matches the suggested list (case-insensitive)
pub fn is_suggested_app(app_name: &str) -> bool {
    let lower = app_name.to_lowercase();
    SUGGESTED_APPS.iter().any(|app| lower.contains(app))
}

/// Capture source kind used for window/application capture on this platform
pub fn capture_source_kind() -> &'static str {
    #[cfg(target_os = "windows")]
    {
        "window_capture"
    }

    #[cfg(target_os = "macos")]
    {
        // ScreenCaptureKit-based capture, used in application mode
        "screen_capture"
    }

    #[cfg(target_os = "linux")]
    {
        if std::env::var("XDG_SESSION_TYPE")
            .map(|s| s == "wayland")
            .unwrap_or(false)
        {
            "pipewire-screen-capture-source"
        } else {
            "xcomposite_input"
        }
    }
}

/// Settings property the platform's capture source kind stores its target in
pub fn target_property_name() -> &'static str {
    #[cfg(target_os = "windows")]
    {
        "window"
    }

    #[cfg(target_os = "macos")]
    {
        "application"
    }

    #[cfg(target_os = "linux")]
    {
        if std::env::var("XDG_SESSION_TYPE")
            .map(|s| s == "wayland")
            .unwrap_or(false)
        {
            "window"
        } else {
            "capture_window"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RawTarget;

    struct FakeHost {
        targets: Vec<RawTarget>,
    }

    impl CaptureHost for FakeHost {
        fn enumerate_targets(&self) -> Result<Vec<RawTarget>> {
            Ok(self.targets.clone())
        }

        fn create_capture_source(&self, _name: &str, _target_id: &str) -> Result<()> {
            Ok(())
        }
    }

    fn raw(id: &str, title: &str) -> RawTarget {
        RawTarget {
            id: id.to_string(),
            title: title.to_string(),
        }
    }

    #[test]
    fn test_extract_app_name_separators() {
        assert_eq!(extract_app_name("Code - main.rs"), "Code");
        assert_eq!(extract_app_name("Firefox \u{2014} Mozilla"), "Firefox");
        assert_eq!(extract_app_name("Terminal: ~/src"), "Terminal");
        assert_eq!(extract_app_name("Plain Title"), "Plain Title");
    }

    #[test]
    fn test_extract_app_name_trims_trailing_whitespace() {
        assert_eq!(extract_app_name("Code \t - main.rs"), "Code");
        assert_eq!(extract_app_name("Spaces   "), "Spaces");
    }

    #[test]
    fn test_suggested_app_matching() {
        assert!(is_suggested_app("firefox"));
        assert!(is_suggested_app("FIREFOX - Mozilla Firefox"));
        assert!(is_suggested_app("GNOME-Terminal"));
        assert!(!is_suggested_app("randomapp"));
    }

    #[test]
    fn test_available_windows_filters_and_annotates() {
        let host = FakeHost {
            targets: vec![
                raw("0x1", "Firefox - Mozilla Firefox"),
                raw("", "Ghost"),
                raw("0x2", "None"),
                raw("0x3", "Some Unknown App"),
            ],
        };

        let response = available_windows(&host).unwrap();
        assert_eq!(response.windows.len(), 2);

        let firefox = &response.windows[0];
        assert_eq!(firefox.app_name, "Firefox");
        assert!(firefox.suggested);

        let unknown = &response.windows[1];
        assert!(!unknown.suggested);

        assert_eq!(response.suggested.len(), 1);
        assert_eq!(response.suggested[0].id, "0x1");
        assert!(!response.source_type.is_empty());
        assert!(!response.window_property.is_empty());
    }
}
