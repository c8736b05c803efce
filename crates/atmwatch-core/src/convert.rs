// ── Wire-row to domain conversions ──
//
// The single schema-adapter boundary for the backend's inconsistent
// rows. Alias precedence, truthiness coercion, and timestamp decoding
// all live here -- consumers never apply inline fallbacks. Every
// conversion is total: a malformed field degrades to a defined fallback
// value, never an error.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;

use atmwatch_api::models::{ActivityRow, AlertRow, AtmRow, TelemetryRow};

use crate::model::{
    Alert, AlertType, Atm, AuditEntry, DeviceState, EngineState, Location, ResponderContact,
    Severity, SignalType, TelemetryRecord,
};

// ── Field decoding helpers ──────────────────────────────────────────

/// Decode a backend timestamp: RFC3339 strings or epoch seconds.
///
/// Malformed or absent values decode to the Unix epoch, so they sort
/// last under the default newest-first ordering. Deterministic by
/// construction.
pub fn parse_timestamp(value: &Value) -> DateTime<Utc> {
    parse_timestamp_opt(value).unwrap_or(DateTime::UNIX_EPOCH)
}

/// Like [`parse_timestamp`], but absent/malformed stays `None` for
/// genuinely optional fields.
pub fn parse_timestamp_opt(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => {
            // Epoch seconds, possibly fractional.
            let secs = n.as_f64()?;
            #[allow(clippy::cast_possible_truncation)]
            DateTime::from_timestamp(secs.trunc() as i64, 0)
        }
        _ => None,
    }
}

/// Coerce the backend's bool-or-0/1 sensor flags.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

/// Render an id field that may arrive as a string or a number.
fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ── Device ──────────────────────────────────────────────────────────

/// Split the backend's free-text `"branch, city"` location string.
///
/// A single segment doubles as both branch and city.
fn split_location(raw: &str) -> Option<Location> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    let branch = parts[0].to_owned();
    let rest = parts[1..].join(", ");
    let city = if rest.is_empty() { branch.clone() } else { rest };
    Some(Location {
        branch,
        city,
        lat: None,
        lng: None,
    })
}

fn responder_from_extra(extra: &serde_json::Map<String, Value>) -> Option<ResponderContact> {
    let obj = extra
        .get("nearestPoliceStation")
        .or_else(|| extra.get("nearest_responder"))?
        .as_object()?;
    Some(ResponderContact {
        name: obj.get("name")?.as_str()?.to_owned(),
        phone: obj
            .get("phone")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        distance: obj
            .get("distance")
            .and_then(Value::as_str)
            .map(str::to_owned),
    })
}

/// Adapt a raw device row. Returns `None` when the row carries no
/// device key under either alias -- such rows cannot be joined to
/// anything and are dropped with a warning.
pub fn atm_from_row(row: AtmRow) -> Option<Atm> {
    let Some(device_id) = row.atm_id.clone().or_else(|| row.device_id.clone()) else {
        warn!("dropping device row without atm_id/device_id");
        return None;
    };

    let current_state = match row.status.as_deref() {
        Some(s) if s.eq_ignore_ascii_case("online") => DeviceState::Normal,
        _ => DeviceState::Offline,
    };

    let mut location = row.location.as_deref().and_then(split_location);
    if let Some(ref mut loc) = location {
        loc.lat = row.extra.get("lat").and_then(Value::as_f64);
        loc.lng = row.extra.get("lng").and_then(Value::as_f64);
    }

    let last_heartbeat = row
        .last_heartbeat
        .as_ref()
        .and_then(parse_timestamp_opt);

    let buzzer_enabled = row
        .extra
        .get("buzzer_enabled")
        .or_else(|| row.extra.get("buzzerEnabled"))
        .is_some_and(truthy);

    Some(Atm {
        device_id,
        current_state,
        responder: responder_from_extra(&row.extra),
        location,
        last_heartbeat,
        buzzer_enabled,
    })
}

// ── Telemetry ───────────────────────────────────────────────────────

pub fn telemetry_from_row(row: TelemetryRow) -> TelemetryRecord {
    TelemetryRecord {
        timestamp: parse_timestamp(&row.timestamp),
        pir: truthy(&row.pir),
        vibration: truthy(&row.vibration),
        fire_model: row.fire_model,
        cam_blocking: row.cam_blocking,
        person_count: row.person_count,
        state: row.state,
        buzzer_status: row.buzzer_status,
        device_id: row.device_id,
    }
}

// ── Alert ───────────────────────────────────────────────────────────

pub fn alert_from_row(row: AlertRow) -> Alert {
    let signal_types = row
        .signal_types
        .iter()
        .filter_map(|s| SignalType::parse(s))
        .collect();

    Alert {
        timestamp: parse_timestamp(&row.timestamp),
        severity: Severity::parse(&row.severity),
        alert_type: AlertType::parse(&row.alert_type),
        state: EngineState::parse(&row.state),
        threat_score: row.threat_score.clamp(0.0, 10.0),
        signal_types,
        acknowledged: row.acknowledged.unwrap_or(false),
        archived: row.archived.unwrap_or(false),
        acknowledged_by: row.acknowledged_by,
        acknowledged_at: row.acknowledged_at.as_ref().and_then(parse_timestamp_opt),
        id: row.id,
        device_id: row.device_id,
        message: row.message,
    }
}

// ── Audit log ───────────────────────────────────────────────────────

pub fn audit_from_row(row: ActivityRow) -> AuditEntry {
    let timestamp = parse_timestamp(&row.timestamp);

    // Actor precedence: userName, then userId, then user_id.
    let user = row
        .user_name
        .or(row.user_id_camel)
        .or(row.user_id)
        .unwrap_or_else(|| "unknown".into());

    // Target precedence: target, then device_id.
    let target = row.target.or(row.device_id);

    let id = row
        .id
        .as_ref()
        .and_then(value_to_id)
        .unwrap_or_else(|| format!("act:{}", timestamp.timestamp_millis()));

    AuditEntry {
        id,
        user,
        action: row.action,
        target,
        timestamp,
    }
}
