// ── Aggregate threat computation ──
//
// Derives the top-level status indicator from a visible alert set.
// Recomputed on every call -- never cached across filter changes or
// poll refreshes.

use serde::Serialize;

use crate::model::{Alert, EngineState, Severity};

/// Aggregate threat picture for a visible alert set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThreatSummary {
    /// Arithmetic mean of the alerts' threat scores, rounded to one
    /// decimal place. An empty set yields exactly 0.0.
    pub score: f64,
    /// Step function of the rounded score (see `EngineState::from_score`).
    pub engine_state: EngineState,
}

impl ThreatSummary {
    pub fn aggregate(alerts: &[Alert]) -> Self {
        if alerts.is_empty() {
            return Self {
                score: 0.0,
                engine_state: EngineState::Safe,
            };
        }

        #[allow(clippy::cast_precision_loss)]
        let mean = alerts.iter().map(|a| a.threat_score).sum::<f64>() / alerts.len() as f64;
        let score = (mean * 10.0).round() / 10.0;

        Self {
            score,
            engine_state: EngineState::from_score(score),
        }
    }
}

/// Per-band alert counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

impl SeverityDistribution {
    pub fn tally(alerts: &[Alert]) -> Self {
        let mut dist = Self::default();
        for alert in alerts {
            match alert.severity {
                Severity::Low => dist.low += 1,
                Severity::Medium => dist.medium += 1,
                Severity::High => dist.high += 1,
                Severity::Critical => dist.critical += 1,
            }
        }
        dist
    }

    pub fn count(self, severity: Severity) -> usize {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
            Severity::Critical => self.critical,
        }
    }

    pub fn total(self) -> usize {
        self.low + self.medium + self.high + self.critical
    }
}

/// Count of alerts not yet acknowledged.
pub fn unacknowledged_count(alerts: &[Alert]) -> usize {
    alerts.iter().filter(|a| !a.acknowledged).count()
}
