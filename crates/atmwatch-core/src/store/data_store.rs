// ── Central reactive data store ──
//
// Thread-safe storage for the four poll streams. Keyed entities
// (devices, alerts) live in reactive collections; telemetry and the
// audit log are whole-stream snapshots replaced per poll. Each stream
// carries a fetch-sequence guard so a late-resolving response can never
// overwrite newer data.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::collection::EntityCollection;
use crate::model::{Alert, Atm, AuditEntry, TelemetryRecord};

/// Per-stream fetch ordering guard.
///
/// `begin()` hands out a monotonically increasing sequence number at
/// request start; `try_apply()` admits a response only if nothing newer
/// has been applied already. Late out-of-order completions are dropped.
pub(crate) struct FetchSeq {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl FetchSeq {
    fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            applied: AtomicU64::new(0),
        }
    }

    pub(crate) fn begin(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn try_apply(&self, seq: u64) -> bool {
        self.applied.fetch_max(seq, Ordering::AcqRel) < seq
    }
}

/// Central reactive store for the monitor's data streams.
pub struct DataStore {
    pub(crate) atms: EntityCollection<Atm>,
    pub(crate) alerts: EntityCollection<Alert>,
    pub(crate) telemetry: watch::Sender<Arc<Vec<TelemetryRecord>>>,
    pub(crate) activity: watch::Sender<Arc<Vec<AuditEntry>>>,
    pub(crate) last_refresh: watch::Sender<Option<DateTime<Utc>>>,

    pub(crate) atm_seq: FetchSeq,
    pub(crate) telemetry_seq: FetchSeq,
    pub(crate) alert_seq: FetchSeq,
    pub(crate) activity_seq: FetchSeq,
}

impl DataStore {
    pub fn new() -> Self {
        let (telemetry, _) = watch::channel(Arc::new(Vec::new()));
        let (activity, _) = watch::channel(Arc::new(Vec::new()));
        let (last_refresh, _) = watch::channel(None);

        Self {
            atms: EntityCollection::new(),
            alerts: EntityCollection::new(),
            telemetry,
            activity,
            last_refresh,
            atm_seq: FetchSeq::new(),
            telemetry_seq: FetchSeq::new(),
            alert_seq: FetchSeq::new(),
            activity_seq: FetchSeq::new(),
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn atms_snapshot(&self) -> Arc<Vec<Arc<Atm>>> {
        self.atms.snapshot()
    }

    pub fn alerts_snapshot(&self) -> Arc<Vec<Arc<Alert>>> {
        self.alerts.snapshot()
    }

    pub fn telemetry_snapshot(&self) -> Arc<Vec<TelemetryRecord>> {
        self.telemetry.borrow().clone()
    }

    pub fn activity_snapshot(&self) -> Arc<Vec<AuditEntry>> {
        self.activity.borrow().clone()
    }

    // ── Single-entity lookups ────────────────────────────────────────

    pub fn atm_by_id(&self, device_id: &str) -> Option<Arc<Atm>> {
        self.atms.get(device_id)
    }

    pub fn alert_by_id(&self, alert_id: &str) -> Option<Arc<Alert>> {
        self.alerts.get(alert_id)
    }

    // ── Count accessors ──────────────────────────────────────────────

    pub fn atm_count(&self) -> usize {
        self.atms.len()
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.len()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_atms(&self) -> watch::Receiver<Arc<Vec<Arc<Atm>>>> {
        self.atms.subscribe()
    }

    pub fn subscribe_alerts(&self) -> watch::Receiver<Arc<Vec<Arc<Alert>>>> {
        self.alerts.subscribe()
    }

    pub fn subscribe_telemetry(&self) -> watch::Receiver<Arc<Vec<TelemetryRecord>>> {
        self.telemetry.subscribe()
    }

    pub fn subscribe_activity(&self) -> watch::Receiver<Arc<Vec<AuditEntry>>> {
        self.activity.subscribe()
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    /// How long ago the last successful refresh occurred, or `None` if
    /// nothing has been fetched yet.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_refresh().map(|t| Utc::now() - t)
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}
