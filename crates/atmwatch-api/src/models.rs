// Wire models for the ATM Guard backend
//
// The backend's JSON rows are inconsistent across deployments: field
// names vary (`atm_id` vs `device_id`), timestamps arrive as either
// RFC3339 strings or epoch-second numbers, and boolean sensor flags are
// sometimes 0/1 integers. Fields use `#[serde(default)]` liberally and
// flexible fields are kept as `serde_json::Value`; `atmwatch-core`
// resolves the precedence rules in one adapter module.

use serde::{Deserialize, Serialize};

// ── Auth ─────────────────────────────────────────────────────────────

/// Response from `POST /api/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

// ── Devices ──────────────────────────────────────────────────────────

/// Raw row from `GET /api/atms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtmRow {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    /// Preferred device key; older rows use `device_id` instead.
    #[serde(default)]
    pub atm_id: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
    /// `"online"` maps to Normal; anything else is Offline until
    /// telemetry says otherwise.
    #[serde(default)]
    pub status: Option<String>,
    /// Free-text `"branch, city"` string.
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, alias = "lastHeartbeat")]
    pub last_heartbeat: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<serde_json::Value>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Telemetry ────────────────────────────────────────────────────────

/// Point-in-time sensor reading from `GET /api/telemetry`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryRow {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub timestamp: serde_json::Value,
    /// PIR motion flag -- bool or 0/1 integer depending on firmware.
    #[serde(default)]
    pub pir: serde_json::Value,
    #[serde(default)]
    pub vibration: serde_json::Value,
    #[serde(default)]
    pub fire_model: bool,
    #[serde(default)]
    pub cam_blocking: bool,
    #[serde(default)]
    pub person_count: u32,
    /// Raw state string; normalized downstream.
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub buzzer_status: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Alerts ───────────────────────────────────────────────────────────

/// Alert record from `GET /api/alerts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRow {
    pub id: String,
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub timestamp: serde_json::Value,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub alert_type: String,
    #[serde(default)]
    pub message: String,
    /// Detection-engine state string.
    #[serde(default)]
    pub state: String,
    /// Continuous 0.0-10.0 danger scalar, supplied by the detection
    /// engine independently of `severity`.
    #[serde(default)]
    pub threat_score: f64,
    #[serde(default)]
    pub signal_types: Vec<String>,
    #[serde(default)]
    pub acknowledged: Option<bool>,
    #[serde(default)]
    pub archived: Option<bool>,
    #[serde(default)]
    pub acknowledged_by: Option<String>,
    #[serde(default)]
    pub acknowledged_at: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Audit log ────────────────────────────────────────────────────────

/// Entry from `GET /api/user-activity`.
///
/// Field names are especially loose here: the actor may arrive as
/// `userName`, `userId`, or `user_id`, and the target as `target` or
/// `device_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRow {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default, rename = "userName")]
    pub user_name: Option<String>,
    #[serde(default, rename = "userId")]
    pub user_id_camel: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub timestamp: serde_json::Value,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Write acknowledgements ───────────────────────────────────────────

/// Response envelope for acknowledge/archive/buzzer writes.
#[derive(Debug, Clone, Deserialize)]
pub struct AckResponse {
    #[serde(default)]
    pub success: bool,
}
