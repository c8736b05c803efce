// ── Device enrichment ──
//
// Joins device records with the most recent telemetry record per device
// to compute each device's live state. Memoryless: every poll cycle
// re-evaluates from scratch, so a flickering reading can toggle state on
// consecutive refreshes. No debounce is applied here (see DESIGN.md).

use std::collections::HashMap;

use serde::Serialize;

use crate::model::{Atm, DeviceState, TelemetryRecord, User};

/// Recompute each device's `current_state` from its newest telemetry.
///
/// The state that arrived with the device listing is discarded:
/// telemetry is always the authoritative source when present, and a
/// device with no telemetry at all is forced to `Offline` -- staleness
/// is not distinguished from absence. Timestamp ties go to the record
/// seen first.
pub fn enrich_atms(atms: &[Atm], telemetry: &[TelemetryRecord]) -> Vec<Atm> {
    let latest = latest_per_device(telemetry);

    atms.iter()
        .map(|atm| {
            let mut enriched = atm.clone();
            enriched.current_state = match latest.get(atm.device_id.as_str()) {
                Some(record) => DeviceState::normalize(&record.state),
                None => DeviceState::Offline,
            };
            enriched
        })
        .collect()
}

/// Index the newest telemetry record per device. First-seen wins on
/// equal timestamps, which keeps the selection deterministic for a
/// given input order.
pub fn latest_per_device(telemetry: &[TelemetryRecord]) -> HashMap<&str, &TelemetryRecord> {
    let mut latest: HashMap<&str, &TelemetryRecord> = HashMap::new();
    for record in telemetry {
        latest
            .entry(record.device_id.as_str())
            .and_modify(|current| {
                if record.timestamp > current.timestamp {
                    *current = record;
                }
            })
            .or_insert(record);
    }
    latest
}

/// Retain only the devices the user is scoped to.
///
/// Admins and users with no assignment see everything.
pub fn scope_to_user(atms: &[Atm], user: &User) -> Vec<Atm> {
    atms.iter()
        .filter(|a| user.can_see_device(&a.device_id))
        .cloned()
        .collect()
}

/// Device counts per state, for the overview header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StateCounts {
    pub normal: usize,
    pub suspicious: usize,
    pub critical: usize,
    pub offline: usize,
}

impl StateCounts {
    pub fn tally(atms: &[Atm]) -> Self {
        let mut counts = Self::default();
        for atm in atms {
            match atm.current_state {
                DeviceState::Normal => counts.normal += 1,
                DeviceState::Suspicious => counts.suspicious += 1,
                DeviceState::Critical => counts.critical += 1,
                DeviceState::Offline => counts.offline += 1,
            }
        }
        counts
    }

    pub fn online(self) -> usize {
        self.normal + self.suspicious + self.critical
    }

    pub fn total(self) -> usize {
        self.online() + self.offline
    }
}
