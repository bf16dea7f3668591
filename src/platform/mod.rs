//! Platform-specific frontmost application detection
//!
//! Answers "which application is the user looking at right now" so the
//! presence poller can decide whether a capture target is frontmost. Every
//! backend is a bounded, local OS query; anything the OS cannot answer is
//! reported as unknown rather than as an error, and unknown is always
//! treated as "not hooked" downstream.

pub mod matching;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
pub use linux::is_wayland_session;

/// Trait for frontmost-application probes
pub trait FrontmostProbe: Send + Sync {
    /// Identifier of the currently focused application: bundle id on macOS,
    /// executable filename on Windows, WM_CLASS name on Linux/X11.
    /// `None` when the platform cannot answer (no display connection, no
    /// focused window, Wayland).
    fn frontmost_app_id(&self) -> Option<String>;

    /// True iff frontmost-app introspection is architecturally unavailable
    /// for this session (Wayland without a usable X11 display). Always false
    /// outside Linux.
    fn is_wayland(&self) -> bool {
        false
    }

    /// Whether a frontmost identifier refers to the same application as a
    /// capture target identifier, under this platform's matching rules.
    fn ids_match(&self, frontmost: &str, target: &str) -> bool;
}

/// Create the appropriate probe for the current platform
pub fn native_probe() -> Box<dyn FrontmostProbe> {
    #[cfg(target_os = "macos")]
    {
        tracing::debug!("Using NSWorkspace probe for frontmost app detection");
        Box::new(macos::MacosProbe)
    }

    #[cfg(target_os = "windows")]
    {
        tracing::debug!("Using foreground window probe for frontmost app detection");
        Box::new(windows::WindowsProbe)
    }

    #[cfg(target_os = "linux")]
    {
        Box::new(linux::X11Probe::new())
    }
}
