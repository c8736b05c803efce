//! Shared configuration for the atmwatch CLI.
//!
//! TOML profiles merged with `ATMWATCH_`-prefixed environment variables,
//! translation to `atmwatch_core::MonitorConfig`, and durable storage of
//! the session bearer token under a single well-known path. An absent
//! token file means logged out.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use atmwatch_core::{MonitorConfig, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found in configuration")]
    ProfileNotFound { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Base polling interval in seconds for watch mode.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_poll_interval() -> u64 {
    5
}

/// A named backend profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Backend base URL (e.g., "https://guard.example.com").
    pub server: String,

    /// Username for login (password is always prompted or taken from
    /// `ATMWATCH_PASSWORD`).
    pub username: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override polling interval.
    pub poll_interval: Option<u64>,
}

// ── Paths ───────────────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// The well-known token file path. Absence means logged out.
pub fn token_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("token"),
        |dirs| dirs.data_dir().join("token"),
    )
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "atmwatch", "atmwatch")
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("atmwatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from an explicit path (used by tests).
pub fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ATMWATCH_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Profile resolution ──────────────────────────────────────────────

/// Pick the active profile: explicit name, else the configured default,
/// else "default".
pub fn resolve_profile<'a>(
    cfg: &'a Config,
    requested: Option<&str>,
) -> Result<(String, &'a Profile), ConfigError> {
    let name = requested
        .map(str::to_owned)
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into());

    cfg.profiles
        .get(&name)
        .map(|p| (name.clone(), p))
        .ok_or(ConfigError::ProfileNotFound { profile: name })
}

/// Build a `MonitorConfig` from a profile plus global defaults.
pub fn profile_to_monitor_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<MonitorConfig, ConfigError> {
    let url: url::Url = profile
        .server
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "server".into(),
            reason: format!("invalid URL: {}", profile.server),
        })?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(MonitorConfig {
        url,
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        poll_interval_secs: profile.poll_interval.unwrap_or(defaults.poll_interval),
        activity_poll_multiplier: 2,
    })
}

// ── Token storage ───────────────────────────────────────────────────

/// Read the persisted session token, if any.
pub fn load_token() -> Option<SecretString> {
    load_token_from(&token_path())
}

/// Read a token from an explicit path (used by tests).
pub fn load_token_from(path: &std::path::Path) -> Option<SecretString> {
    let raw = std::fs::read_to_string(path).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(SecretString::from(trimmed.to_owned()))
}

/// Persist the session token to the well-known path.
pub fn save_token(token: &SecretString) -> Result<(), ConfigError> {
    save_token_to(&token_path(), token)
}

/// Persist a token to an explicit path (used by tests).
pub fn save_token_to(path: &std::path::Path, token: &SecretString) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, token.expose_secret())?;

    // Token files are credentials: owner-only on unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)?;
    }

    Ok(())
}

/// Remove the persisted token (logout).
pub fn clear_token() -> Result<(), ConfigError> {
    clear_token_at(&token_path())
}

/// Remove a token at an explicit path (used by tests).
pub fn clear_token_at(path: &std::path::Path) -> Result<(), ConfigError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn token_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");

        assert!(load_token_from(&path).is_none());

        let token = SecretString::from("tok123".to_string());
        save_token_to(&path, &token).unwrap();
        assert_eq!(load_token_from(&path).unwrap().expose_secret(), "tok123");

        clear_token_at(&path).unwrap();
        assert!(load_token_from(&path).is_none());
        // Clearing twice is fine.
        clear_token_at(&path).unwrap();
    }

    #[test]
    fn empty_token_file_means_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "  \n").unwrap();
        assert!(load_token_from(&path).is_none());
    }

    #[test]
    fn profile_resolution_and_translation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "lab"

[profiles.lab]
server = "https://guard.example.com"
username = "operator1"
insecure = true
poll_interval = 3
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        let (name, profile) = resolve_profile(&cfg, None).unwrap();
        assert_eq!(name, "lab");

        let monitor_cfg = profile_to_monitor_config(profile, &cfg.defaults).unwrap();
        assert_eq!(monitor_cfg.url.as_str(), "https://guard.example.com/");
        assert_eq!(monitor_cfg.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(monitor_cfg.poll_interval_secs, 3);
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let cfg = Config::default();
        let result = resolve_profile(&cfg, Some("missing"));
        assert!(matches!(result, Err(ConfigError::ProfileNotFound { .. })));
    }

    #[test]
    fn bad_server_url_is_a_validation_error() {
        let profile = Profile {
            server: "not a url".into(),
            username: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
            poll_interval: None,
        };
        let result = profile_to_monitor_config(&profile, &Defaults::default());
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }
}
