//! Host RPC surface
//!
//! Request/response payloads for the vendor-style requests the hosting
//! plugin exposes over its RPC channel, the outbound presence event, and a
//! string-keyed dispatcher for hosts that forward raw request JSON. All
//! payloads are flat records of primitives.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::engine::PresenceEngine;
use crate::host::CaptureHost;
use crate::targets::{self, AvailableWindowsResponse};

/// Edge-triggered presence event: the aggregate "any source both active and
/// hooked" changed to this value. Consumers must treat repeated delivery of
/// the same value as a no-op.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HookedSourcesChanged {
    pub any_hooked: bool,
}

/// State of a single tracked capture source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceStateView {
    /// Source name
    pub name: String,
    /// Target app id (bundle id, exe name, or WM_CLASS)
    pub target_app: String,
    /// Whether the target app is currently frontmost
    pub hooked: bool,
    /// Whether the source is being rendered to output
    pub active: bool,
}

/// Response to `GetHookedSources`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookedSourcesResponse {
    /// Every tracked source
    pub sources: Vec<SourceStateView>,
    /// Whether any source is currently hooked and active
    pub any_hooked: bool,
    /// Whether presence is gated on the manual override
    pub manual_mode: bool,
}

/// Request for `SetCaptureEnabled`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SetCaptureEnabledRequest {
    #[serde(default)]
    pub enabled: bool,
}

/// Response to `SetCaptureEnabled`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SetCaptureEnabledResponse {
    pub success: bool,
    pub enabled: bool,
    pub any_hooked: bool,
    pub manual_mode: bool,
}

/// One requested source in `CreateCaptureSources`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTargetSpec {
    /// Capture target id, as returned by `GetAvailableWindows`
    pub id: String,
    /// Name for the new capture source
    pub name: String,
}

/// Request for `CreateCaptureSources`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCaptureSourcesRequest {
    pub windows: Vec<CreateTargetSpec>,
}

/// A successfully created source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedSource {
    pub name: String,
    pub id: String,
}

/// A source the host failed to create
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedSource {
    pub name: String,
    pub error: String,
}

/// Response to `CreateCaptureSources`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCaptureSourcesResponse {
    pub success: bool,
    pub created_count: u32,
    pub failed_count: u32,
    pub created: Vec<CreatedSource>,
    pub failed: Vec<FailedSource>,
}

/// Typed errors for the request surface
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("unknown request type '{0}'")]
    UnknownRequest(String),
    #[error("malformed request: {0}")]
    Malformed(&'static str),
    #[error(transparent)]
    Host(#[from] anyhow::Error),
}

/// Handle `GetHookedSources`
pub fn get_hooked_sources(engine: &PresenceEngine) -> HookedSourcesResponse {
    let report = engine.hooked_sources();
    HookedSourcesResponse {
        sources: report
            .sources
            .into_iter()
            .map(|source| SourceStateView {
                name: source.name,
                target_app: source.target_app,
                hooked: source.hooked,
                active: source.active,
            })
            .collect(),
        any_hooked: report.any_hooked,
        manual_mode: report.manual_mode,
    }
}

/// Handle `GetAvailableWindows`
pub fn get_available_windows(
    host: &dyn CaptureHost,
) -> Result<AvailableWindowsResponse, RequestError> {
    targets::available_windows(host).map_err(RequestError::Host)
}

/// Handle `SetCaptureEnabled`
pub fn set_capture_enabled(
    engine: &PresenceEngine,
    request: SetCaptureEnabledRequest,
) -> SetCaptureEnabledResponse {
    let ack = engine.set_capture_enabled(request.enabled);
    SetCaptureEnabledResponse {
        success: true,
        enabled: ack.enabled,
        any_hooked: ack.any_hooked,
        manual_mode: ack.manual_mode,
    }
}

/// Handle `CreateCaptureSources`: forward each requested target to the host.
/// Per-item failures land in `failed` without failing the whole request.
pub fn create_capture_sources(
    host: &dyn CaptureHost,
    request: &CreateCaptureSourcesRequest,
) -> CreateCaptureSourcesResponse {
    let mut created = Vec::new();
    let mut failed = Vec::new();

    info!("Creating {} capture sources", request.windows.len());

    for spec in &request.windows {
        if spec.id.is_empty() || spec.name.is_empty() {
            continue;
        }

        match host.create_capture_source(&spec.name, &spec.id) {
            Ok(()) => {
                info!("Created source '{}'", spec.name);
                created.push(CreatedSource {
                    name: spec.name.clone(),
                    id: spec.id.clone(),
                });
            }
            Err(e) => {
                warn!("Failed to create source '{}': {}", spec.name, e);
                failed.push(FailedSource {
                    name: spec.name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    CreateCaptureSourcesResponse {
        success: failed.is_empty(),
        created_count: created.len() as u32,
        failed_count: failed.len() as u32,
        created,
        failed,
    }
}

/// Route a raw vendor request by type name. Hosts with a typed channel can
/// call the handlers directly instead.
pub fn dispatch(
    engine: &PresenceEngine,
    host: &dyn CaptureHost,
    request_type: &str,
    request_data: &Value,
) -> Result<Value, RequestError> {
    match request_type {
        "GetHookedSources" => encode(get_hooked_sources(engine)),
        "GetAvailableWindows" => encode(get_available_windows(host)?),
        "SetCaptureEnabled" => {
            let request: SetCaptureEnabledRequest = serde_json::from_value(request_data.clone())
                .map_err(|_| RequestError::Malformed("expected an 'enabled' flag"))?;
            encode(set_capture_enabled(engine, request))
        }
        "CreateCaptureSources" => {
            let request: CreateCaptureSourcesRequest = serde_json::from_value(request_data.clone())
                .map_err(|_| RequestError::Malformed("missing 'windows' array"))?;
            encode(create_capture_sources(host, &request))
        }
        other => Err(RequestError::UnknownRequest(other.to_string())),
    }
}

fn encode<T: Serialize>(response: T) -> Result<Value, RequestError> {
    serde_json::to_value(response).map_err(|e| RequestError::Host(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::host::RawTarget;
    use anyhow::anyhow;
    use serde_json::json;

    struct FakeHost {
        fail_ids: Vec<String>,
    }

    impl FakeHost {
        fn new() -> Self {
            Self { fail_ids: Vec::new() }
        }
    }

    impl CaptureHost for FakeHost {
        fn enumerate_targets(&self) -> anyhow::Result<Vec<RawTarget>> {
            Ok(vec![RawTarget {
                id: "0x1".to_string(),
                title: "Firefox - Mozilla Firefox".to_string(),
            }])
        }

        fn create_capture_source(&self, _name: &str, target_id: &str) -> anyhow::Result<()> {
            if self.fail_ids.iter().any(|id| id == target_id) {
                Err(anyhow!("no such window"))
            } else {
                Ok(())
            }
        }
    }

    fn test_engine() -> PresenceEngine {
        PresenceEngine::new(&Config::default())
    }

    #[test]
    fn test_dispatch_get_hooked_sources() {
        let engine = test_engine();
        let host = FakeHost::new();

        let response = dispatch(&engine, &host, "GetHookedSources", &json!({})).unwrap();
        assert_eq!(response["any_hooked"], json!(false));
        assert_eq!(response["manual_mode"], json!(false));
        assert!(response["sources"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_dispatch_set_capture_enabled_defaults_to_false() {
        let engine = test_engine();
        let host = FakeHost::new();

        // Missing flag reads as false, matching the host's bool semantics.
        let response = dispatch(&engine, &host, "SetCaptureEnabled", &json!({})).unwrap();
        assert_eq!(response["success"], json!(true));
        assert_eq!(response["enabled"], json!(false));
    }

    #[test]
    fn test_dispatch_unknown_request() {
        let engine = test_engine();
        let host = FakeHost::new();

        let err = dispatch(&engine, &host, "Reboot", &json!({})).unwrap_err();
        assert!(matches!(err, RequestError::UnknownRequest(_)));
    }

    #[test]
    fn test_create_sources_missing_windows_is_malformed() {
        let engine = test_engine();
        let host = FakeHost::new();

        let err = dispatch(&engine, &host, "CreateCaptureSources", &json!({})).unwrap_err();
        assert!(matches!(err, RequestError::Malformed(_)));
    }

    #[test]
    fn test_create_sources_partial_failure() {
        let host = FakeHost {
            fail_ids: vec!["0x2".to_string()],
        };

        let request = CreateCaptureSourcesRequest {
            windows: vec![
                CreateTargetSpec {
                    id: "0x1".to_string(),
                    name: "Capture Firefox".to_string(),
                },
                CreateTargetSpec {
                    id: "0x2".to_string(),
                    name: "Capture Ghost".to_string(),
                },
                CreateTargetSpec {
                    id: String::new(),
                    name: "Skipped".to_string(),
                },
            ],
        };

        let response = create_capture_sources(&host, &request);
        assert!(!response.success);
        assert_eq!(response.created_count, 1);
        assert_eq!(response.failed_count, 1);
        assert_eq!(response.created[0].name, "Capture Firefox");
        assert_eq!(response.failed[0].name, "Capture Ghost");
    }

    #[test]
    fn test_get_available_windows_round_trip() {
        let engine = test_engine();
        let host = FakeHost::new();

        let response = dispatch(&engine, &host, "GetAvailableWindows", &json!({})).unwrap();
        let windows = response["windows"].as_array().unwrap();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0]["app_name"], json!("Firefox"));
        assert_eq!(windows[0]["suggested"], json!(true));
    }
}
