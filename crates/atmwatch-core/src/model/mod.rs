// ── Unified domain model ──
//
// Canonical representations of ATM Guard entities. The wire rows in
// `atmwatch-api` are adapted into these types by `crate::convert`;
// consumers (monitor, CLI) never see raw backend field names.

pub mod alert;
pub mod device;
pub mod telemetry;
pub mod user;

pub use alert::{Alert, AlertType, EngineState, Severity, SignalType};
pub use device::{Atm, DeviceState, Location, ResponderContact};
pub use telemetry::TelemetryRecord;
pub use user::{AuditEntry, Role, User};
