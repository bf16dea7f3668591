//! Presence engine
//!
//! Owns the source registry and the polling state machine that answers "is
//! any monitored capture target currently the frontmost application" and
//! publishes edge-triggered changes of that aggregate.
//!
//! The poller is a dedicated background thread; host lifecycle notifications
//! and queries run on the host's threads. The registry mutex is the only
//! synchronization point for the table, and the poller is the only writer of
//! the per-source `hooked` flags. On Wayland the probe cannot answer at all
//! and the engine runs in manual override mode for its whole lifetime.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::platform::{native_probe, FrontmostProbe};
use crate::registry::SourceRegistry;
use crate::requests::HookedSourcesChanged;
use crate::sources::{is_capture_kind, CaptureSource, SourceDescriptor};

/// Event channel capacity; the event is edge-triggered and idempotent for
/// consumers, so a lagging receiver losing intermediate values is harmless.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Full answer to the hooked-sources query, consistent with a single atomic
/// snapshot of the table.
#[derive(Debug, Clone)]
pub struct HookedSourcesReport {
    /// Every in-use source, in slot order
    pub sources: Vec<CaptureSource>,
    /// Any source both active and hooked
    pub any_hooked: bool,
    /// Whether the engine is gating presence on the manual override
    pub manual_mode: bool,
}

/// Result of setting the manual override
#[derive(Debug, Clone, Copy)]
pub struct ManualOverrideAck {
    pub enabled: bool,
    pub any_hooked: bool,
    pub manual_mode: bool,
}

/// Shared engine state, injected into the poller thread and the query
/// handlers.
struct EngineShared {
    registry: Mutex<SourceRegistry>,
    probe: Box<dyn FrontmostProbe>,
    running: AtomicBool,
    /// Manual override value; meaningful only in manual mode
    manual_enabled: AtomicBool,
    /// Whether introspection is unavailable and the override gates presence
    manual_mode: AtomicBool,
    events: broadcast::Sender<HookedSourcesChanged>,
}

impl EngineShared {
    fn registry(&self) -> MutexGuard<'_, SourceRegistry> {
        // A poisoned lock means a poller tick panicked; the table itself is
        // still valid and presence stays fail-closed, so keep going.
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// One pass of the presence state machine: recompute every tracked
    /// source's `hooked` flag, then emit an event iff the aggregate changed.
    fn poll_tick(&self) {
        let mut registry = self.registry();
        let old_any_hooked = registry.any_hooked();

        if self.manual_mode.load(Ordering::SeqCst) {
            // There is no way to know which app is frontmost, so the
            // override is an all-or-nothing gate over every tracked source.
            let enabled = self.manual_enabled.load(Ordering::SeqCst);
            for entry in registry.in_use_mut() {
                entry.hooked = enabled;
            }
        } else {
            // The frontmost app is global: probe once per tick, not per
            // source. An unknown frontmost or an empty target never hooks.
            let frontmost = self.probe.frontmost_app_id();
            for entry in registry.in_use_mut() {
                entry.hooked = match frontmost.as_deref() {
                    Some(id) if !entry.target_app.is_empty() => {
                        self.probe.ids_match(id, &entry.target_app)
                    }
                    _ => false,
                };
            }
        }

        let new_any_hooked = registry.any_hooked();
        if new_any_hooked != old_any_hooked {
            info!("Capture state changed: any_hooked={}", new_any_hooked);
            self.emit(new_any_hooked);
        }
    }

    /// Emit while the registry lock is held; event order matches transition
    /// order.
    fn emit(&self, any_hooked: bool) {
        let _ = self.events.send(HookedSourcesChanged { any_hooked });
    }
}

/// The capture presence engine. One instance per hosting process; explicit
/// `start`/`shutdown` bracket its lifetime, and the poller thread is joined
/// before teardown completes.
pub struct PresenceEngine {
    shared: Arc<EngineShared>,
    poll_interval: Duration,
    poll_thread: Option<JoinHandle<()>>,
}

impl PresenceEngine {
    /// Create an engine with the platform's native probe
    pub fn new(config: &Config) -> Self {
        Self::with_probe(config, native_probe())
    }

    /// Create an engine with an injected probe
    pub fn with_probe(config: &Config, probe: Box<dyn FrontmostProbe>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(EngineShared {
                registry: Mutex::new(SourceRegistry::new(config.max_tracked_sources)),
                probe,
                running: AtomicBool::new(false),
                manual_enabled: AtomicBool::new(config.manual_capture_default),
                manual_mode: AtomicBool::new(false),
                events,
            }),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            poll_thread: None,
        }
    }

    /// Start the presence poller.
    pub fn start(&mut self) {
        if self.poll_thread.is_some() {
            debug!("Presence poller already running");
            return;
        }

        self.select_mode();
        self.shared.running.store(true, Ordering::SeqCst);

        info!(
            "Capture state polling thread starting ({}ms interval)",
            self.poll_interval.as_millis()
        );

        let shared = self.shared.clone();
        let interval = self.poll_interval;
        self.poll_thread = Some(thread::spawn(move || {
            while shared.running.load(Ordering::SeqCst) {
                shared.poll_tick();
                // The sleep is the loop's only cancellation point.
                if !shared.running.load(Ordering::SeqCst) {
                    break;
                }
                thread::sleep(interval);
            }
            debug!("Capture state polling thread stopped");
        }));
    }

    /// Stop the poller and wait for it to finish, so no tick can observe
    /// state the host is about to tear down.
    pub fn shutdown(&mut self) {
        self.shared.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.poll_thread.take() {
            if handle.join().is_err() {
                warn!("Presence poller panicked during shutdown");
            }
        }
    }

    /// Decide once, at startup, whether frontmost introspection exists at
    /// all for this session. Wayland has no such query, so the manual
    /// override gates presence for the engine's whole lifetime.
    fn select_mode(&self) {
        if self.shared.probe.is_wayland() {
            self.shared.manual_mode.store(true, Ordering::SeqCst);
            info!("Wayland detected - using manual capture mode");
        }
    }

    /// Host notification: a capture source was created (or reconfigured and
    /// re-announced). Kinds that don't capture a window/application are
    /// ignored.
    pub fn on_source_created(&self, name: &str, descriptor: &SourceDescriptor) {
        if !is_capture_kind(&descriptor.kind) {
            return;
        }

        let mut registry = self.shared.registry();
        if let Some(entry) = registry.register(name, descriptor) {
            info!(
                "Registered source '{}' with target app '{}'",
                name, entry.target_app
            );
        }
    }

    /// Host notification: a source was removed
    pub fn on_source_removed(&self, name: &str) {
        self.shared.registry().remove(name);
    }

    /// Host notification: a source started rendering to output
    pub fn on_source_activated(&self, name: &str) {
        self.shared.registry().set_active(name, true);
        // The poller emits on the next tick if the aggregate changed.
    }

    /// Host notification: a source stopped rendering to output
    pub fn on_source_deactivated(&self, name: &str) {
        self.shared.registry().set_active(name, false);
    }

    /// Set the manual override. In manual mode the new value applies
    /// immediately rather than waiting for the next poll tick, but the event
    /// stays edge-triggered: repeating the current value emits nothing.
    pub fn set_capture_enabled(&self, enabled: bool) -> ManualOverrideAck {
        self.shared.manual_enabled.store(enabled, Ordering::SeqCst);

        let manual_mode = self.shared.manual_mode.load(Ordering::SeqCst);
        let any_hooked = if manual_mode {
            let mut registry = self.shared.registry();
            let old_any_hooked = registry.any_hooked();
            for entry in registry.in_use_mut() {
                entry.hooked = enabled;
            }
            let new_any_hooked = registry.any_hooked();
            if new_any_hooked != old_any_hooked {
                info!("Capture state changed: any_hooked={}", new_any_hooked);
                self.shared.emit(new_any_hooked);
            }
            new_any_hooked
        } else {
            self.shared.registry().any_hooked()
        };

        debug!(
            "SetCaptureEnabled: enabled={} (manual_mode={})",
            enabled, manual_mode
        );

        ManualOverrideAck {
            enabled,
            any_hooked,
            manual_mode,
        }
    }

    /// Snapshot every tracked source plus the aggregate
    pub fn hooked_sources(&self) -> HookedSourcesReport {
        let registry = self.shared.registry();
        HookedSourcesReport {
            sources: registry.snapshot(),
            any_hooked: registry.any_hooked(),
            manual_mode: self.shared.manual_mode.load(Ordering::SeqCst),
        }
    }

    /// Current aggregate presence
    pub fn any_hooked(&self) -> bool {
        self.shared.registry().any_hooked()
    }

    /// Whether the engine is gating presence on the manual override
    pub fn manual_mode(&self) -> bool {
        self.shared.manual_mode.load(Ordering::SeqCst)
    }

    /// Subscribe to edge-triggered aggregate presence changes. Repeated
    /// delivery of the same value must be treated as a no-op.
    pub fn subscribe(&self) -> broadcast::Receiver<HookedSourcesChanged> {
        self.shared.events.subscribe()
    }
}

impl Drop for PresenceEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
