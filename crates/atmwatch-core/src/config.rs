// ── Runtime connection configuration ──
//
// These types describe *how* to reach the ATM Guard backend. They carry
// connection tuning but never touch disk -- the CLI constructs a
// `MonitorConfig` from its profile layer and hands it in.

use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed lab backends).
    DangerAcceptInvalid,
}

/// Configuration for connecting to a single backend.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Backend root URL (e.g., `https://guard.example.com`).
    pub url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: std::time::Duration,
    /// Base polling interval in seconds. 0 = no background polling
    /// (one-shot use).
    pub poll_interval_secs: u64,
    /// The audit log polls on a slower multiple of the base interval.
    pub activity_poll_multiplier: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8000"
                .parse()
                .expect("default URL is valid"),
            tls: TlsVerification::default(),
            timeout: std::time::Duration::from_secs(30),
            poll_interval_secs: 5,
            activity_poll_multiplier: 2,
        }
    }
}

impl MonitorConfig {
    /// Effective audit-log polling interval.
    pub fn activity_interval_secs(&self) -> u64 {
        self.poll_interval_secs * u64::from(self.activity_poll_multiplier.max(1))
    }
}
