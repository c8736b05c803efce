// ── Alert ranking & filtering engine ──
//
// Produces the final ordered alert view from a raw collection plus
// filter criteria. Pure and idempotent: the same input and query always
// yield the same ordered output. Every stage tolerates an empty input.

use crate::model::{Alert, AlertType, Role, Severity};
use crate::policy::filter_alerts_by_role;

/// Sort order for the final view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Newest first (timestamp descending).
    #[default]
    Newest,
    /// Oldest first (timestamp ascending).
    Oldest,
    /// Most severe first; ties keep their incoming order.
    Severity,
}

/// Acknowledgment-status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AckFilter {
    #[default]
    All,
    Unacknowledged,
    Acknowledged,
}

/// Filter criteria for the alert view.
#[derive(Debug, Clone, Default)]
pub struct AlertQuery {
    /// Case-insensitive substring match against message, device id, and
    /// alert type. Empty is a no-op.
    pub search: String,
    /// Severity floor: selecting `Medium` retains Medium and Low --
    /// every band at or below the choice in the CRITICAL>HIGH>MEDIUM>LOW
    /// ordering. `None` passes everything.
    pub min_severity: Option<Severity>,
    pub ack: AckFilter,
    /// Exact-match type filter. `None` passes everything.
    pub alert_type: Option<AlertType>,
    pub sort: SortMode,
}

impl AlertQuery {
    /// Apply the full pipeline: role filter, severity floor, ack status,
    /// type, search, sort.
    pub fn apply(&self, alerts: &[Alert], role: Role) -> Vec<Alert> {
        let mut result = filter_alerts_by_role(alerts, role);

        if let Some(floor) = self.min_severity {
            result.retain(|a| a.severity <= floor);
        }

        match self.ack {
            AckFilter::All => {}
            AckFilter::Unacknowledged => result.retain(|a| !a.acknowledged),
            AckFilter::Acknowledged => result.retain(|a| a.acknowledged),
        }

        if let Some(alert_type) = self.alert_type {
            result.retain(|a| a.alert_type == alert_type);
        }

        if !self.search.is_empty() {
            let query = self.search.to_lowercase();
            result.retain(|a| {
                a.message.to_lowercase().contains(&query)
                    || a.device_id.to_lowercase().contains(&query)
                    || a.alert_type.as_str().to_lowercase().contains(&query)
            });
        }

        sort_alerts(&mut result, self.sort);
        result
    }
}

/// Sort alerts in place. All modes are stable, so equal keys keep their
/// incoming order.
pub fn sort_alerts(alerts: &mut [Alert], sort: SortMode) {
    match sort {
        SortMode::Newest => alerts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
        SortMode::Oldest => alerts.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
        SortMode::Severity => alerts.sort_by_key(|a| a.severity.rank()),
    }
}
