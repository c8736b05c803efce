// ── Refresh application logic ──
//
// Applies per-stream snapshots from the poll tasks into the DataStore.
// Keyed streams use upsert-then-prune; whole-stream snapshots are
// replaced wholesale. Every apply is gated on the stream's fetch
// sequence so a stale response cannot clobber newer data.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use super::DataStore;
use super::collection::EntityCollection;
use crate::model::{Alert, Atm, AuditEntry, TelemetryRecord};

/// Upsert all incoming entities, then prune any existing keys not in the
/// incoming set. This avoids the brief empty state that a clear-then-
/// insert approach would cause.
fn upsert_and_prune<T: Clone + Send + Sync + 'static>(
    collection: &EntityCollection<T>,
    items: Vec<(String, T)>,
) {
    let incoming_keys: HashSet<String> = items.iter().map(|(k, _)| k.clone()).collect();
    for (key, entity) in items {
        collection.upsert(key, entity);
    }
    for existing_key in collection.keys() {
        if !incoming_keys.contains(&existing_key) {
            collection.remove(&existing_key);
        }
    }
}

impl DataStore {
    // ── Fetch sequencing ─────────────────────────────────────────────

    pub fn begin_atm_fetch(&self) -> u64 {
        self.atm_seq.begin()
    }

    pub fn begin_telemetry_fetch(&self) -> u64 {
        self.telemetry_seq.begin()
    }

    pub fn begin_alert_fetch(&self) -> u64 {
        self.alert_seq.begin()
    }

    pub fn begin_activity_fetch(&self) -> u64 {
        self.activity_seq.begin()
    }

    // ── Stream application ───────────────────────────────────────────

    /// Apply a device listing. Returns `false` if the response was
    /// stale (a newer fetch already applied) and was discarded.
    pub fn apply_atms(&self, seq: u64, atms: Vec<Atm>) -> bool {
        if !self.atm_seq.try_apply(seq) {
            debug!(seq, "discarding stale device snapshot");
            return false;
        }
        upsert_and_prune(
            &self.atms,
            atms.into_iter().map(|a| (a.device_id.clone(), a)).collect(),
        );
        self.touch();
        true
    }

    /// Replace the telemetry snapshot wholesale.
    pub fn apply_telemetry(&self, seq: u64, records: Vec<TelemetryRecord>) -> bool {
        if !self.telemetry_seq.try_apply(seq) {
            debug!(seq, "discarding stale telemetry snapshot");
            return false;
        }
        self.telemetry.send_modify(|snap| *snap = Arc::new(records));
        self.touch();
        true
    }

    /// Apply an alert listing.
    pub fn apply_alerts(&self, seq: u64, alerts: Vec<Alert>) -> bool {
        if !self.alert_seq.try_apply(seq) {
            debug!(seq, "discarding stale alert snapshot");
            return false;
        }
        upsert_and_prune(
            &self.alerts,
            alerts.into_iter().map(|a| (a.id.clone(), a)).collect(),
        );
        self.touch();
        true
    }

    /// Replace the audit-log snapshot wholesale.
    pub fn apply_activity(&self, seq: u64, entries: Vec<AuditEntry>) -> bool {
        if !self.activity_seq.try_apply(seq) {
            debug!(seq, "discarding stale activity snapshot");
            return false;
        }
        self.activity.send_modify(|snap| *snap = Arc::new(entries));
        self.touch();
        true
    }

    // ── Local alert mutations ────────────────────────────────────────
    //
    // Optimistic flag flips after a confirmed backend write. The next
    // alert poll remains the authoritative corrector.

    /// Flip an alert's acknowledged flag. Returns `false` if the alert
    /// is not in the store.
    pub fn mark_acknowledged(&self, alert_id: &str, by: Option<&str>) -> bool {
        let Some(current) = self.alerts.get(alert_id) else {
            return false;
        };
        let mut updated = (*current).clone();
        updated.acknowledged = true;
        updated.acknowledged_by = by.map(str::to_owned);
        updated.acknowledged_at = Some(Utc::now());
        self.alerts.upsert(alert_id.to_owned(), updated);
        true
    }

    /// Flip an alert's archived flag. Returns `false` if the alert is
    /// not in the store.
    pub fn mark_archived(&self, alert_id: &str) -> bool {
        let Some(current) = self.alerts.get(alert_id) else {
            return false;
        };
        let mut updated = (*current).clone();
        updated.archived = true;
        self.alerts.upsert(alert_id.to_owned(), updated);
        true
    }

    fn touch(&self) {
        let _ = self.last_refresh.send(Some(Utc::now()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeviceState;
    use pretty_assertions::assert_eq;

    fn atm(device_id: &str) -> Atm {
        Atm {
            device_id: device_id.into(),
            current_state: DeviceState::Offline,
            location: None,
            responder: None,
            last_heartbeat: None,
            buzzer_enabled: false,
        }
    }

    #[test]
    fn upsert_and_prune_converges_to_incoming_set() {
        let store = DataStore::new();
        let seq = store.begin_atm_fetch();
        store.apply_atms(seq, vec![atm("ATM_001"), atm("ATM_002")]);
        assert_eq!(store.atm_count(), 2);

        let seq = store.begin_atm_fetch();
        store.apply_atms(seq, vec![atm("ATM_002"), atm("ATM_003")]);
        assert_eq!(store.atm_count(), 2);
        assert!(store.atm_by_id("ATM_001").is_none());
        assert!(store.atm_by_id("ATM_003").is_some());
    }

    #[test]
    fn stale_response_is_discarded() {
        let store = DataStore::new();
        let first = store.begin_atm_fetch();
        let second = store.begin_atm_fetch();

        // The later fetch resolves first.
        assert!(store.apply_atms(second, vec![atm("ATM_NEW")]));
        // The earlier fetch resolves afterwards and must be dropped.
        assert!(!store.apply_atms(first, vec![atm("ATM_OLD")]));

        assert!(store.atm_by_id("ATM_NEW").is_some());
        assert!(store.atm_by_id("ATM_OLD").is_none());
    }

    #[test]
    fn refresh_timestamp_advances_on_apply() {
        let store = DataStore::new();
        assert!(store.last_refresh().is_none());

        let seq = store.begin_telemetry_fetch();
        store.apply_telemetry(seq, Vec::new());
        assert!(store.last_refresh().is_some());
        assert!(store.data_age().is_some());
    }
}
