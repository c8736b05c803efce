//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use atmwatch_config::ConfigError;
use atmwatch_core::CoreError;

/// Exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to backend at {url}")]
    #[diagnostic(
        code(atmwatch::connection_failed),
        help("Check that the backend is running and reachable.\nReason: {reason}")
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(atmwatch::timeout),
        help("Increase the timeout in your profile or check backend responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Not logged in")]
    #[diagnostic(
        code(atmwatch::not_logged_in),
        help("Run: atmwatch login")
    )]
    NotLoggedIn,

    #[error("Authentication failed")]
    #[diagnostic(
        code(atmwatch::auth_failed),
        help("Invalid username or password. Run: atmwatch login\nDetails: {message}")
    )]
    AuthFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(atmwatch::not_found),
        help("Run: atmwatch {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Backend error: {message}")]
    #[diagnostic(code(atmwatch::api_error))]
    ApiError { message: String },

    /// A write the backend accepted but did not apply
    /// (`{"success": false}`).
    #[error("Backend refused the {action} request")]
    #[diagnostic(code(atmwatch::rejected))]
    ActionRefused { action: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(atmwatch::profile_not_found),
        help("Add a [profiles.{name}] section to your config, or pass --server.")
    )]
    ProfileNotFound { name: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(atmwatch::validation))]
    Validation { field: String, reason: String },

    #[error("Configuration error: {0}")]
    #[diagnostic(code(atmwatch::config))]
    Config(String),

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NotLoggedIn => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::ProfileNotFound { .. } | Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::NotLoggedIn => CliError::NotLoggedIn,
            CoreError::Timeout => CliError::Timeout,
            CoreError::DeviceNotFound { device_id } => CliError::NotFound {
                resource_type: "device".into(),
                identifier: device_id,
                list_command: "devices list".into(),
            },
            CoreError::AlertNotFound { alert_id } => CliError::NotFound {
                resource_type: "alert".into(),
                identifier: alert_id,
                list_command: "alerts list".into(),
            },
            CoreError::Rejected { message } => CliError::ApiError { message },
            CoreError::Api { message, status } => CliError::ApiError {
                message: match status {
                    Some(s) => format!("HTTP {s}: {message}"),
                    None => message,
                },
            },
            CoreError::Config { message } => CliError::Config(message),
            CoreError::Internal(message) => CliError::ApiError { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { profile } => {
                CliError::ProfileNotFound { name: profile }
            }
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(other.to_string()),
        }
    }
}
