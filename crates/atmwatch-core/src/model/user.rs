// ── User, role, and audit-log domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of dashboard roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Operator,
    Supervisor,
    SecurityTeam,
    User,
}

impl Role {
    /// Parse a role claim. Unrecognized strings map to the
    /// least-privileged role -- visibility fails closed, never open.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Self::Admin,
            "operator" => Self::Operator,
            "supervisor" => Self::Supervisor,
            "security_team" => Self::SecurityTeam,
            _ => Self::User,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Operator => "Operator",
            Self::Supervisor => "Supervisor",
            Self::SecurityTeam => "Security Team",
            Self::User => "User",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Operator => "operator",
            Self::Supervisor => "supervisor",
            Self::SecurityTeam => "security_team",
            Self::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated session identity, built from bearer-token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    /// Devices this user is scoped to. Empty means all devices visible.
    pub assigned_devices: Vec<String>,
    pub name: String,
}

impl User {
    /// Whether this user may see the given device.
    pub fn can_see_device(&self, device_id: &str) -> bool {
        self.role == Role::Admin
            || self.assigned_devices.is_empty()
            || self.assigned_devices.iter().any(|d| d == device_id)
    }
}

/// An entry in the user-activity audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    /// Actor, resolved from the backend's loose field naming.
    pub user: String,
    pub action: String,
    /// Target device or subsystem, if any.
    pub target: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_role_fails_closed() {
        assert_eq!(Role::parse("superadmin"), Role::User);
        assert_eq!(Role::parse(""), Role::User);
        assert_eq!(Role::parse("Security_Team"), Role::SecurityTeam);
    }

    #[test]
    fn empty_assignment_means_all_devices() {
        let user = User {
            id: "u1".into(),
            username: "op".into(),
            email: String::new(),
            role: Role::Operator,
            assigned_devices: Vec::new(),
            name: "Op".into(),
        };
        assert!(user.can_see_device("ATM_001"));
    }

    #[test]
    fn assignment_scopes_non_admins() {
        let user = User {
            id: "u1".into(),
            username: "op".into(),
            email: String::new(),
            role: Role::Operator,
            assigned_devices: vec!["ATM_001".into()],
            name: "Op".into(),
        };
        assert!(user.can_see_device("ATM_001"));
        assert!(!user.can_see_device("ATM_003"));
    }
}
