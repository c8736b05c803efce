// ── Device domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical client-facing classification of an ATM's condition.
///
/// Always derived, never stored authoritatively: every refresh recomputes
/// it from the newest telemetry record (see `crate::enrich`), with
/// `Offline` as the universal fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceState {
    Normal,
    Suspicious,
    Critical,
    Offline,
}

impl DeviceState {
    /// Normalize a raw state string onto the canonical enum.
    ///
    /// Total over all input: every string maps to a defined value.
    /// Engine-state strings like `CONFIRMED_INTRUSION` and
    /// `CRITICAL_HAZARD` must match by substring, not equality.
    pub fn normalize(raw: &str) -> Self {
        let lower = raw.trim().to_lowercase();
        if lower.is_empty() {
            return Self::Offline;
        }
        if lower == "normal" || lower == "safe" {
            return Self::Normal;
        }
        if lower.contains("suspicious") || lower.contains("intrusion") {
            return Self::Suspicious;
        }
        if lower.contains("critical") || lower.contains("hazard") {
            return Self::Critical;
        }
        Self::Offline
    }

    pub fn is_online(self) -> bool {
        !matches!(self, Self::Offline)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Suspicious => "Suspicious",
            Self::Critical => "Critical",
            Self::Offline => "Offline",
        }
    }
}

impl std::fmt::Display for DeviceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Installation location, split out of the backend's free-text
/// `"branch, city"` string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub branch: String,
    pub city: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

/// Nearest-responder contact for escalation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponderContact {
    pub name: String,
    pub phone: String,
    pub distance: Option<String>,
}

/// The canonical ATM device record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Atm {
    /// Stable primary key.
    pub device_id: String,
    /// Derived operational state; replaced every poll cycle.
    pub current_state: DeviceState,
    pub location: Option<Location>,
    pub responder: Option<ResponderContact>,
    pub last_heartbeat: Option<DateTime<Utc>>,
    pub buzzer_enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_exact_matches() {
        assert_eq!(DeviceState::normalize("normal"), DeviceState::Normal);
        assert_eq!(DeviceState::normalize("SAFE"), DeviceState::Normal);
        assert_eq!(DeviceState::normalize("Safe"), DeviceState::Normal);
    }

    #[test]
    fn normalize_substring_matches() {
        assert_eq!(
            DeviceState::normalize("CONFIRMED_INTRUSION"),
            DeviceState::Suspicious
        );
        assert_eq!(DeviceState::normalize("suspicious"), DeviceState::Suspicious);
        assert_eq!(
            DeviceState::normalize("CRITICAL_HAZARD"),
            DeviceState::Critical
        );
        assert_eq!(DeviceState::normalize("critical"), DeviceState::Critical);
    }

    #[test]
    fn normalize_is_total() {
        assert_eq!(DeviceState::normalize(""), DeviceState::Offline);
        assert_eq!(DeviceState::normalize("   "), DeviceState::Offline);
        assert_eq!(DeviceState::normalize("garbage"), DeviceState::Offline);
        assert_eq!(DeviceState::normalize("OBSERVING"), DeviceState::Offline);
        assert_eq!(DeviceState::normalize("\u{1f4a3}"), DeviceState::Offline);
    }
}
