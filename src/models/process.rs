//! Process model.
//!
//! A process is a unit of simulated work: an alternating sequence of
//! CPU and I/O bursts, starting and ending with a CPU burst.
//!
//! # Burst Layout
//!
//! A feed record lists bursts in order. Even positions (0, 2, 4, …) are CPU
//! bursts, odd positions (1, 3, 5, …) are I/O bursts:
//!
//! ```text
//! bursts:  [ 5, 3, 2 ]
//!            │  │  └─ CPU #1
//!            │  └──── I/O #0
//!            └─────── CPU #0
//! ```
//!
//! # Ownership
//! A `Process` is moved between the ready queue, the I/O queue and the
//! worker servicing it. The engine never clones it.

use serde::{Deserialize, Serialize};

/// Unique process identifier, assigned in admission order starting at 0.
pub type ProcessId = u64;

/// Definition of a process before admission.
///
/// # Example
/// ```
/// use u_procsim::models::ProcessSpec;
///
/// let spec = ProcessSpec::new(1).with_bursts([5, 3, 2]);
/// assert_eq!(spec.cpu_bursts(), vec![5, 2]);
/// assert_eq!(spec.io_bursts(), vec![3]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSpec {
    /// Scheduling priority (higher = more urgent).
    pub priority: i32,
    /// Alternating CPU/I-O burst durations, in burst units.
    pub bursts: Vec<u64>,
}

impl ProcessSpec {
    /// Creates a spec with the given priority and no bursts.
    pub fn new(priority: i32) -> Self {
        Self {
            priority,
            bursts: Vec::new(),
        }
    }

    /// Appends one burst.
    pub fn with_burst(mut self, burst: u64) -> Self {
        self.bursts.push(burst);
        self
    }

    /// Appends several bursts.
    pub fn with_bursts(mut self, bursts: impl IntoIterator<Item = u64>) -> Self {
        self.bursts.extend(bursts);
        self
    }

    /// CPU bursts (even positions).
    pub fn cpu_bursts(&self) -> Vec<u64> {
        self.bursts.iter().step_by(2).copied().collect()
    }

    /// I/O bursts (odd positions).
    pub fn io_bursts(&self) -> Vec<u64> {
        self.bursts.iter().skip(1).step_by(2).copied().collect()
    }

    /// Sum of all CPU bursts, saturating at `u64::MAX`.
    pub fn total_cpu(&self) -> u64 {
        self.bursts
            .iter()
            .step_by(2)
            .fold(0u64, |total, &burst| total.saturating_add(burst))
    }
}

/// Result of running one CPU slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CpuSlice {
    /// Burst units consumed in this slice.
    pub amount: u64,
    /// `true` when a round-robin quantum cut the burst short.
    pub preempted: bool,
}

/// Where a process goes after a CPU slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Route {
    /// Back to the ready queue tail.
    Ready,
    /// To the I/O queue tail.
    Io,
    /// All bursts consumed; the process terminates.
    Retire,
}

/// A process in flight.
#[derive(Debug, PartialEq, Eq)]
pub struct Process {
    id: ProcessId,
    priority: i32,
    cpu_bursts: Vec<u64>,
    io_bursts: Vec<u64>,
    cpu_cursor: usize,
    io_cursor: usize,
    remaining_burst_total: u64,
}

impl Process {
    /// Builds a process from its spec with both cursors at zero.
    pub fn from_spec(id: ProcessId, spec: &ProcessSpec) -> Self {
        let cpu_bursts = spec.cpu_bursts();
        let remaining_burst_total = spec.total_cpu();
        Self {
            id,
            priority: spec.priority,
            cpu_bursts,
            io_bursts: spec.io_bursts(),
            cpu_cursor: 0,
            io_cursor: 0,
            remaining_burst_total,
        }
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// CPU time not yet consumed. Equals `sum(cpu_bursts[cpu_cursor..])`.
    pub fn remaining_burst_total(&self) -> u64 {
        self.remaining_burst_total
    }

    pub fn cpu_cursor(&self) -> usize {
        self.cpu_cursor
    }

    pub fn io_cursor(&self) -> usize {
        self.io_cursor
    }

    /// The CPU burst at the cursor (partially consumed under RR).
    pub fn next_cpu_burst(&self) -> Option<u64> {
        self.cpu_bursts.get(self.cpu_cursor).copied()
    }

    /// The I/O burst at the cursor.
    pub fn next_io_burst(&self) -> Option<u64> {
        self.io_bursts.get(self.io_cursor).copied()
    }

    pub fn cpu_finished(&self) -> bool {
        self.cpu_cursor >= self.cpu_bursts.len()
    }

    pub fn io_pending(&self) -> bool {
        self.io_cursor < self.io_bursts.len()
    }

    /// Consumes the next CPU burst, or at most `quantum` of it.
    ///
    /// Without a quantum, or when the burst fits in it, the whole burst is
    /// consumed and the cursor advances. Otherwise the stored burst is
    /// reduced by `quantum` in place and the cursor stays put.
    ///
    /// Returns `None` when no CPU burst remains.
    pub fn run_cpu(&mut self, quantum: Option<u64>) -> Option<CpuSlice> {
        let burst = self.next_cpu_burst()?;
        let slice = match quantum {
            Some(q) if burst > q => {
                self.cpu_bursts[self.cpu_cursor] = burst - q;
                CpuSlice {
                    amount: q,
                    preempted: true,
                }
            }
            _ => {
                self.cpu_cursor += 1;
                CpuSlice {
                    amount: burst,
                    preempted: false,
                }
            }
        };
        self.remaining_burst_total = self.remaining_burst_total.saturating_sub(slice.amount);
        Some(slice)
    }

    /// Consumes the next I/O burst and advances the cursor.
    pub fn run_io(&mut self) -> Option<u64> {
        let burst = self.next_io_burst()?;
        self.io_cursor += 1;
        Some(burst)
    }

    /// Routing decision after a CPU slice.
    pub fn route_after(&self, slice: Option<CpuSlice>) -> Route {
        if slice.is_some_and(|s| s.preempted) {
            Route::Ready
        } else if self.cpu_finished() && !self.io_pending() {
            Route::Retire
        } else if self.io_pending() {
            Route::Io
        } else {
            Route::Ready
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_split() {
        let spec = ProcessSpec::new(3).with_bursts([4, 1, 6, 2, 8]);
        assert_eq!(spec.cpu_bursts(), vec![4, 6, 8]);
        assert_eq!(spec.io_bursts(), vec![1, 2]);
        assert_eq!(spec.total_cpu(), 18);
    }

    #[test]
    fn test_full_burst_sequence() {
        let spec = ProcessSpec::new(1).with_bursts([5, 3, 2]);
        let mut p = Process::from_spec(0, &spec);
        assert_eq!(p.remaining_burst_total(), 7);

        let s = p.run_cpu(None);
        assert_eq!(s, Some(CpuSlice { amount: 5, preempted: false }));
        assert_eq!(p.remaining_burst_total(), 2);
        assert_eq!(p.route_after(s), Route::Io);

        assert_eq!(p.run_io(), Some(3));
        assert!(!p.io_pending());

        let s = p.run_cpu(None);
        assert_eq!(s.map(|s| s.amount), Some(2));
        assert_eq!(p.route_after(s), Route::Retire);
        assert_eq!(p.remaining_burst_total(), 0);
    }

    #[test]
    fn test_quantum_preemption() {
        let spec = ProcessSpec::new(0).with_burst(5);
        let mut p = Process::from_spec(0, &spec);

        let amounts: Vec<_> = std::iter::from_fn(|| {
            let s = p.run_cpu(Some(2))?;
            Some((s.amount, s.preempted, p.cpu_cursor()))
        })
        .collect();

        assert_eq!(amounts, vec![(2, true, 0), (2, true, 0), (1, false, 1)]);
        assert!(p.cpu_finished());
    }

    #[test]
    fn test_quantum_exact_fit() {
        let spec = ProcessSpec::new(0).with_burst(4);
        let mut p = Process::from_spec(0, &spec);
        let s = p.run_cpu(Some(4)).unwrap();
        assert!(!s.preempted);
        assert_eq!(p.route_after(Some(s)), Route::Retire);
    }

    #[test]
    fn test_preempted_routes_ready() {
        let spec = ProcessSpec::new(0).with_bursts([10, 1, 1]);
        let mut p = Process::from_spec(0, &spec);
        let s = p.run_cpu(Some(3));
        assert_eq!(p.route_after(s), Route::Ready);
        assert_eq!(p.next_cpu_burst(), Some(7));
        assert_eq!(p.remaining_burst_total(), 8);
    }

    #[test]
    fn test_cpu_total_saturates() {
        let spec = ProcessSpec::new(0).with_bursts([u64::MAX, 0, 1]);
        assert_eq!(spec.total_cpu(), u64::MAX);
        let p = Process::from_spec(0, &spec);
        assert_eq!(p.remaining_burst_total(), u64::MAX);
    }

    #[test]
    fn test_no_cpu_left() {
        let mut p = Process::from_spec(0, &ProcessSpec::new(0));
        assert!(p.run_cpu(None).is_none());
        assert_eq!(p.route_after(None), Route::Retire);
    }
}
