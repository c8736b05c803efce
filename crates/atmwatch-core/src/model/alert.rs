// ── Alert domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Alert urgency classification, ordered LOW < MEDIUM < HIGH < CRITICAL.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Sort rank: most severe first (CRITICAL=0 .. LOW=3).
    pub fn rank(self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }

    /// Parse a wire severity string. Unrecognized values classify as
    /// `Low` so a bad row can never inflate its own visibility.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "CRITICAL" => Self::Critical,
            "HIGH" => Self::High,
            "MEDIUM" => Self::Medium,
            _ => Self::Low,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of alert trigger categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    Motion,
    Vibration,
    Fire,
    CameraTamper,
    HumanDetected,
    Unknown,
}

impl AlertType {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "MOTION" => Self::Motion,
            "VIBRATION" => Self::Vibration,
            "FIRE" => Self::Fire,
            "CAMERA_TAMPER" => Self::CameraTamper,
            "HUMAN_DETECTED" => Self::HumanDetected,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Motion => "MOTION",
            Self::Vibration => "VIBRATION",
            Self::Fire => "FIRE",
            Self::CameraTamper => "CAMERA_TAMPER",
            Self::HumanDetected => "HUMAN_DETECTED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detection-engine confidence state, reported per alert and derived
/// system-wide from the aggregate threat score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineState {
    Observing,
    Suspicious,
    ConfirmedIntrusion,
    CriticalHazard,
    Safe,
}

impl EngineState {
    /// Parse a wire engine-state string. An unrecognized value on an
    /// existing alert classifies as `Observing` -- the alert is real but
    /// its confidence band is unknown.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SAFE" => Self::Safe,
            "SUSPICIOUS" => Self::Suspicious,
            "CONFIRMED_INTRUSION" => Self::ConfirmedIntrusion,
            "CRITICAL_HAZARD" => Self::CriticalHazard,
            _ => Self::Observing,
        }
    }

    /// Step function mapping an aggregate threat score onto the coarse
    /// engine state. Lower bounds are inclusive: a score of exactly 8.0
    /// is `CriticalHazard`.
    pub fn from_score(score: f64) -> Self {
        if score >= 8.0 {
            Self::CriticalHazard
        } else if score >= 6.0 {
            Self::ConfirmedIntrusion
        } else if score >= 4.0 {
            Self::Suspicious
        } else if score > 0.0 {
            Self::Observing
        } else {
            Self::Safe
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Observing => "OBSERVING",
            Self::Suspicious => "SUSPICIOUS",
            Self::ConfirmedIntrusion => "CONFIRMED_INTRUSION",
            Self::CriticalHazard => "CRITICAL_HAZARD",
            Self::Safe => "SAFE",
        }
    }
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signal tags contributing to an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    Motion,
    Vibration,
    Fire,
    CameraTamper,
    HumanDetected,
}

impl SignalType {
    /// Parse a signal tag; unknown tags yield `None` and are dropped.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "motion" => Some(Self::Motion),
            "vibration" => Some(Self::Vibration),
            "fire" => Some(Self::Fire),
            "camera_tamper" => Some(Self::CameraTamper),
            "human_detected" => Some(Self::HumanDetected),
            _ => None,
        }
    }
}

/// A security alert raised by the detection backend.
///
/// `severity` and `threat_score` are independently supplied upstream;
/// neither is derived from the other here. The `acknowledged` and
/// `archived` flags only ever transition false -> true in this system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub alert_type: AlertType,
    pub message: String,
    pub state: EngineState,
    /// Continuous 0.0-10.0 danger scalar.
    pub threat_score: f64,
    pub signal_types: Vec<SignalType>,
    pub acknowledged: bool,
    pub archived: bool,
    pub acknowledged_by: Option<String>,
    pub acknowledged_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering_follows_urgency() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn severity_rank_puts_critical_first() {
        assert_eq!(Severity::Critical.rank(), 0);
        assert_eq!(Severity::Low.rank(), 3);
    }

    #[test]
    fn unknown_severity_parses_low() {
        assert_eq!(Severity::parse("SEVERE"), Severity::Low);
        assert_eq!(Severity::parse(""), Severity::Low);
        assert_eq!(Severity::parse("critical"), Severity::Critical);
    }

    #[test]
    fn engine_state_score_bands() {
        assert_eq!(EngineState::from_score(8.0), EngineState::CriticalHazard);
        assert_eq!(EngineState::from_score(7.999), EngineState::ConfirmedIntrusion);
        assert_eq!(EngineState::from_score(6.0), EngineState::ConfirmedIntrusion);
        assert_eq!(EngineState::from_score(4.0), EngineState::Suspicious);
        assert_eq!(EngineState::from_score(0.1), EngineState::Observing);
        assert_eq!(EngineState::from_score(0.0), EngineState::Safe);
    }

    #[test]
    fn unknown_alert_type_is_unknown() {
        assert_eq!(AlertType::parse("EARTHQUAKE"), AlertType::Unknown);
        assert_eq!(AlertType::parse("camera_tamper"), AlertType::CameraTamper);
    }
}
