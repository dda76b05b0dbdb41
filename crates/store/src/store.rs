//! Concurrency-safe latest-reading store
//!
//! One mutex guards the whole map. `apply` replaces an entry wholesale
//! (last-write-wins) and `snapshot` copies the map out under the same lock,
//! so no reader can observe a half-written update. The lock is never held
//! across I/O or an await point; both critical sections are bounded by the
//! map size.

use chrono::{DateTime, Duration, Utc};
use gridwatch_core::Reading;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::trace;

/// Latest-reading table keyed by facility id.
///
/// Constructed once by the composition root and shared by reference with the
/// ingestion adapter (writer) and any snapshot consumers (readers). Entries
/// are upserted as messages arrive and never deleted.
#[derive(Debug, Default)]
pub struct TelemetryStore {
    readings: Mutex<HashMap<String, Reading>>,
}

impl TelemetryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert the reading for its facility, replacing any prior entry
    /// wholesale. Safe under concurrent callers and concurrent snapshots.
    ///
    /// The store trusts its input: validation and defaulting happen in the
    /// ingestion adapter before a reading gets here.
    pub fn apply(&self, reading: Reading) {
        trace!(facility_id = %reading.facility_id, power_mw = reading.power_mw, "apply reading");
        let mut readings = self.lock();
        readings.insert(reading.facility_id.clone(), reading);
    }

    /// Take a consistent, independent copy of the current contents.
    ///
    /// Later mutations of the live store do not affect the returned snapshot
    /// and vice versa.
    pub fn snapshot(&self) -> Snapshot {
        let readings = self.lock().clone();
        Snapshot {
            taken_at: Utc::now(),
            readings,
        }
    }

    /// Number of known facilities.
    pub fn size(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Reading>> {
        // A poisoned lock means a writer panicked mid-call; the map itself
        // is still a whole value set, so readers may keep going.
        self.readings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Immutable point-in-time copy of the store's contents.
#[derive(Debug, Clone)]
pub struct Snapshot {
    taken_at: DateTime<Utc>,
    readings: HashMap<String, Reading>,
}

impl Snapshot {
    /// When this snapshot was taken.
    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    /// Reading for one facility, if known.
    pub fn get(&self, facility_id: &str) -> Option<&Reading> {
        self.readings.get(facility_id)
    }

    /// Number of facilities in the snapshot.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Iterate over all readings.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Reading)> {
        self.readings.iter()
    }

    /// Count facilities whose reading is older than `max_age` relative to
    /// the snapshot time. Drives the degraded-status indicator.
    pub fn stale_count(&self, max_age: Duration) -> usize {
        self.readings
            .values()
            .filter(|r| r.age(self.taken_at) > max_age)
            .count()
    }
}
