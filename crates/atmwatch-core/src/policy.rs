// ── Role visibility policy ──
//
// Fixed mapping from role to the alert severities that role may see.
// This is display filtering only: the backend remains the real
// authority on access control.

use crate::model::{Alert, Role, Severity};

impl Role {
    /// The severity bands visible to this role.
    ///
    /// Admin bypasses filtering entirely. `Role::parse` maps unknown
    /// role claims to `User`, so an unrecognized role lands on the
    /// least-privileged set here -- fail closed, never open.
    pub fn visible_severities(self) -> &'static [Severity] {
        match self {
            Self::Operator | Self::User => &[Severity::Low, Severity::Medium],
            Self::Supervisor => &[Severity::Medium, Severity::High],
            Self::SecurityTeam => &[Severity::High, Severity::Critical],
            Self::Admin => &Severity::ALL,
        }
    }

    /// Whether this role may see alerts of the given severity.
    pub fn can_see_severity(self, severity: Severity) -> bool {
        self.visible_severities().contains(&severity)
    }
}

/// Retain only the alerts the given role may see.
///
/// Stable: input order is preserved, no implicit resort.
pub fn filter_alerts_by_role(alerts: &[Alert], role: Role) -> Vec<Alert> {
    alerts
        .iter()
        .filter(|a| role.can_see_severity(a.severity))
        .cloned()
        .collect()
}
