// ── Telemetry domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point-in-time sensor reading for one device.
///
/// Immutable once received; the client only ever re-fetches. Many
/// records exist per device -- only the one with the maximum timestamp
/// is authoritative for that device's current state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    /// PIR motion sensor.
    pub pir: bool,
    pub vibration: bool,
    pub fire_model: bool,
    pub cam_blocking: bool,
    pub person_count: u32,
    /// Raw state string as reported; normalized at enrichment time.
    pub state: String,
    pub buzzer_status: bool,
}
