//! Per-process timing statistics.
//!
//! The stats table is shared by all workers and guarded by its own lock,
//! never held together with a queue lock.
//!
//! | Event | Update |
//! |-------|--------|
//! | Admission | `admitted_at = last_ready_at = now` |
//! | Leave ready queue | `accumulated_wait += now - last_ready_at` |
//! | Enter ready queue | `last_ready_at = now` |
//! | Retirement | `turnaround = now - admitted_at` |
//!
//! All times are offsets from the simulation epoch.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

use super::ProcessId;

/// Timing record of one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessStats {
    /// Admission time.
    pub admitted_at: Duration,
    /// Last time the process entered the ready queue.
    pub last_ready_at: Duration,
    /// Total time spent waiting in the ready queue.
    pub accumulated_wait: Duration,
    /// Admission-to-retirement time. Set once, at retirement.
    pub turnaround: Option<Duration>,
}

impl ProcessStats {
    fn admitted(now: Duration) -> Self {
        Self {
            admitted_at: now,
            last_ready_at: now,
            accumulated_wait: Duration::ZERO,
            turnaround: None,
        }
    }

    pub fn is_retired(&self) -> bool {
        self.turnaround.is_some()
    }
}

/// Exported view of one process's statistics, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub process_id: ProcessId,
    pub admitted_ms: f64,
    /// `None` while the process is still in flight.
    pub turnaround_ms: Option<f64>,
    pub wait_ms: f64,
}

/// Lock-protected stats table keyed by process id.
///
/// Entries stay after retirement so the final snapshot covers every
/// admitted process.
#[derive(Debug, Default)]
pub struct StatsTable {
    entries: Mutex<BTreeMap<ProcessId, ProcessStats>>,
}

impl StatsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a newly admitted process.
    pub fn register(&self, id: ProcessId, now: Duration) {
        self.entries.lock().insert(id, ProcessStats::admitted(now));
    }

    /// Records the process re-entering the ready queue.
    pub fn mark_ready(&self, id: ProcessId, now: Duration) {
        if let Some(entry) = self.entries.lock().get_mut(&id) {
            entry.last_ready_at = now;
        }
    }

    /// Records the process leaving the ready queue for execution.
    ///
    /// Returns the wait of this residency.
    pub fn record_dispatch(&self, id: ProcessId, now: Duration) -> Duration {
        let mut entries = self.entries.lock();
        match entries.get_mut(&id) {
            Some(entry) => {
                let waited = now.saturating_sub(entry.last_ready_at);
                entry.accumulated_wait += waited;
                waited
            }
            None => Duration::ZERO,
        }
    }

    /// Finalizes the turnaround of a retiring process.
    ///
    /// A second call for the same process keeps the first value.
    pub fn retire(&self, id: ProcessId, now: Duration) -> Option<Duration> {
        let mut entries = self.entries.lock();
        let entry = entries.get_mut(&id)?;
        let admitted_at = entry.admitted_at;
        let turnaround = *entry
            .turnaround
            .get_or_insert_with(|| now.saturating_sub(admitted_at));
        Some(turnaround)
    }

    pub fn get(&self, id: ProcessId) -> Option<ProcessStats> {
        self.entries.lock().get(&id).copied()
    }

    /// Number of admitted processes.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Processes admitted but not yet retired.
    pub fn in_flight(&self) -> usize {
        self.entries
            .lock()
            .values()
            .filter(|s| !s.is_retired())
            .count()
    }

    /// Whether exactly `expected` processes were admitted and all retired.
    pub fn all_retired(&self, expected: usize) -> bool {
        let entries = self.entries.lock();
        entries.len() == expected && entries.values().all(ProcessStats::is_retired)
    }

    /// Latest retirement time (admission + turnaround) across all processes.
    pub fn last_retirement(&self) -> Option<Duration> {
        self.entries
            .lock()
            .values()
            .filter_map(|s| s.turnaround.map(|t| s.admitted_at + t))
            .max()
    }

    /// Copies the table out, ordered by process id.
    pub fn snapshot(&self) -> Vec<StatsSnapshot> {
        self.entries
            .lock()
            .iter()
            .map(|(&process_id, s)| StatsSnapshot {
                process_id,
                admitted_ms: as_ms(s.admitted_at),
                turnaround_ms: s.turnaround.map(as_ms),
                wait_ms: as_ms(s.accumulated_wait),
            })
            .collect()
    }
}

pub(crate) fn as_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_wait_accumulates_over_residencies() {
        let table = StatsTable::new();
        table.register(0, ms(10));

        assert_eq!(table.record_dispatch(0, ms(15)), ms(5));
        table.mark_ready(0, ms(40));
        assert_eq!(table.record_dispatch(0, ms(47)), ms(7));

        let s = table.get(0).unwrap();
        assert_eq!(s.accumulated_wait, ms(12));
        assert!(!s.is_retired());
    }

    #[test]
    fn test_retire_sets_turnaround_once() {
        let table = StatsTable::new();
        table.register(0, ms(10));
        assert_eq!(table.retire(0, ms(60)), Some(ms(50)));
        assert_eq!(table.retire(0, ms(90)), Some(ms(50)));
        assert_eq!(table.last_retirement(), Some(ms(60)));
    }

    #[test]
    fn test_in_flight_and_all_retired() {
        let table = StatsTable::new();
        assert!(table.all_retired(0));

        table.register(0, ms(0));
        table.register(1, ms(0));
        assert_eq!(table.in_flight(), 2);
        assert!(!table.all_retired(2));

        table.retire(0, ms(5));
        assert_eq!(table.in_flight(), 1);
        table.retire(1, ms(8));
        assert_eq!(table.in_flight(), 0);
        assert!(table.all_retired(2));
        assert!(!table.all_retired(3));
    }

    #[test]
    fn test_unknown_process_is_ignored() {
        let table = StatsTable::new();
        table.mark_ready(7, ms(1));
        assert_eq!(table.record_dispatch(7, ms(2)), Duration::ZERO);
        assert_eq!(table.retire(7, ms(3)), None);
        assert!(table.is_empty());
    }

    #[test]
    fn test_snapshot_in_ms() {
        let table = StatsTable::new();
        table.register(1, ms(2));
        table.register(0, ms(0));
        table.record_dispatch(1, ms(5));
        table.retire(1, ms(12));

        let snap = table.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].process_id, 0);
        assert_eq!(snap[0].turnaround_ms, None);
        assert!((snap[1].wait_ms - 3.0).abs() < 1e-9);
        assert!((snap[1].turnaround_ms.unwrap() - 10.0).abs() < 1e-9);
    }
}
