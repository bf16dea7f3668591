//! crowd-cast capture presence engine
//!
//! Answers one question for the hosting capture plugin: "is any monitored
//! capture target currently the application the user is looking at?" — and
//! exposes the answer as a low-latency, edge-triggered signal so input
//! logging only runs while the recorded application is actually frontmost.
//!
//! The engine keeps a bounded registry of capture sources, polls the
//! platform's frontmost-application probe on a background thread, and emits
//! an event whenever the aggregate "any source both active and hooked"
//! transitions. On Wayland, where the compositor forbids frontmost-app
//! introspection entirely, a manual override gates presence instead.
//!
//! Presence detection is fail-closed: whenever the OS cannot answer, every
//! source reads as not hooked. Under-logging is safe; over-logging is not.

pub mod config;
pub mod engine;
pub mod host;
pub mod logging;
pub mod platform;
pub mod registry;
pub mod requests;
pub mod sources;
pub mod targets;

pub use config::Config;
pub use engine::{HookedSourcesReport, ManualOverrideAck, PresenceEngine};
pub use host::{CaptureHost, RawTarget};
pub use platform::{native_probe, FrontmostProbe};
pub use requests::{dispatch, HookedSourcesChanged, RequestError};
pub use sources::{is_capture_kind, CaptureSource, SourceDescriptor};
pub use targets::{AvailableWindowsResponse, TargetInfo};
