// atmwatch-core: Reactive data layer between atmwatch-api and consumers.
//
// Everything above the HTTP boundary is a pure function over snapshots:
// state normalization, role visibility, alert ranking, threat
// aggregation, and device enrichment never fail -- malformed input maps
// to defined fallback values. Only the polling monitor can return errors.

pub mod config;
pub mod convert;
pub mod enrich;
pub mod error;
pub mod model;
pub mod monitor;
pub mod policy;
pub mod store;
pub mod threat;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{MonitorConfig, TlsVerification};
pub use error::CoreError;
pub use monitor::{ConnectionState, DashboardView, Monitor};
pub use store::DataStore;
pub use threat::{SeverityDistribution, ThreatSummary};
pub use view::{AckFilter, AlertQuery, SortMode};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Alert, AlertType, Atm, AuditEntry, DeviceState, EngineState, Location, ResponderContact, Role,
    Severity, SignalType, TelemetryRecord, User,
};
