//! Shared simulation state.
//!
//! `SimulationContext` replaces process-wide globals: it owns both queues,
//! the stats table, the clock and the ingestion/completion flags. The
//! controller creates it, lends it to the three workers, and reads the
//! results after joining them.
//!
//! # Locks
//!
//! | Lock | Guards |
//! |------|--------|
//! | ready queue | ready processes |
//! | I/O queue | blocked processes |
//! | stats table | per-process timing |
//! | ingestion | expected process count |
//! | trace | event log |
//!
//! No method holds two of them at once.
//!
//! # Completion
//!
//! The simulation is complete once ingestion has reported its final count
//! and every admitted process has a turnaround. The first caller to observe
//! this closes both queues, which wakes and releases idle workers.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use super::{SimClock, SimulationConfig};
use crate::dispatching::Policy;
use crate::error::SimError;
use crate::models::{Process, ProcessId, ProcessSpec, Route, StatsSnapshot, StatsTable};
use crate::queue::ProcessQueue;

/// One recorded simulation event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TraceEvent {
    Admit {
        process_id: ProcessId,
    },
    /// A CPU slice finished.
    Dispatch {
        process_id: ProcessId,
        amount: u64,
        preempted: bool,
        cpu_cursor: usize,
        route: Route,
    },
    /// An I/O burst finished.
    Io {
        process_id: ProcessId,
        amount: u64,
    },
    Retire {
        process_id: ProcessId,
    },
}

impl TraceEvent {
    pub fn process_id(&self) -> ProcessId {
        match self {
            TraceEvent::Admit { process_id }
            | TraceEvent::Dispatch { process_id, .. }
            | TraceEvent::Io { process_id, .. }
            | TraceEvent::Retire { process_id } => *process_id,
        }
    }
}

#[derive(Debug)]
pub struct SimulationContext {
    config: SimulationConfig,
    clock: SimClock,
    ready: ProcessQueue,
    io: ProcessQueue,
    stats: StatsTable,
    next_id: AtomicU64,
    expected: Mutex<Option<usize>>,
    finished: AtomicBool,
    cancelled: AtomicBool,
    trace: Mutex<Vec<TraceEvent>>,
}

impl SimulationContext {
    /// Validates the config and starts the simulation clock.
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            clock: SimClock::new(config.tick),
            config,
            ready: ProcessQueue::new("ready"),
            io: ProcessQueue::new("io"),
            stats: StatsTable::new(),
            next_id: AtomicU64::new(0),
            expected: Mutex::new(None),
            finished: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
            trace: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn policy(&self) -> Policy {
        self.config.policy
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn ready(&self) -> &ProcessQueue {
        &self.ready
    }

    pub fn io_queue(&self) -> &ProcessQueue {
        &self.io
    }

    pub fn stats(&self) -> &StatsTable {
        &self.stats
    }

    /// Creates a process, stamps its stats and appends it to the ready queue.
    ///
    /// `spec` is not re-validated here; feed parsing does that.
    pub fn admit_process(&self, spec: ProcessSpec) -> ProcessId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.stats.register(id, self.clock.now());
        self.record(TraceEvent::Admit { process_id: id });
        self.ready.push(Process::from_spec(id, &spec));
        id
    }

    /// No more processes will arrive; `count` were admitted.
    pub fn signal_ingestion_complete(&self, count: usize) {
        *self.expected.lock() = Some(count);
        self.check_completion();
    }

    /// Final process count, once ingestion is complete.
    pub fn expected_processes(&self) -> Option<usize> {
        *self.expected.lock()
    }

    /// Ingestion complete and every admitted process retired.
    pub fn is_simulation_complete(&self) -> bool {
        match self.expected_processes() {
            Some(expected) => self.stats.all_retired(expected),
            None => false,
        }
    }

    /// Processes admitted but not yet retired.
    pub fn in_flight(&self) -> usize {
        self.stats.in_flight()
    }

    pub fn snapshot_stats(&self) -> Vec<StatsSnapshot> {
        self.stats.snapshot()
    }

    /// Stops the simulation early: ingestion ends at its next line, idle
    /// workers are released, busy workers exit after their current burst.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            log::warn!("simulation cancelled");
            self.ready.close();
            self.io.close();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Whether the completion predicate has fired and closed the queues.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    /// Recorded events, in order. Empty unless tracing is enabled.
    pub fn trace(&self) -> Vec<TraceEvent> {
        self.trace.lock().clone()
    }

    pub(crate) fn record(&self, event: TraceEvent) {
        if self.config.trace {
            self.trace.lock().push(event);
        }
    }

    /// Returns a process to the ready queue tail, restarting its wait clock.
    pub(crate) fn enqueue_ready(&self, process: Process) {
        self.stats.mark_ready(process.id(), self.clock.now());
        self.ready.push(process);
    }

    pub(crate) fn enqueue_io(&self, process: Process) {
        self.io.push(process);
    }

    /// Records the turnaround and drops the process.
    pub(crate) fn retire(&self, process: Process) {
        let id = process.id();
        drop(process);
        if let Some(turnaround) = self.stats.retire(id, self.clock.now()) {
            log::info!("process {id} retired, turnaround {turnaround:?}");
        }
        self.record(TraceEvent::Retire { process_id: id });
        self.check_completion();
    }

    /// Routes a process after its CPU slice.
    pub(crate) fn route(&self, process: Process, route: Route) {
        match route {
            Route::Ready => self.enqueue_ready(process),
            Route::Io => self.enqueue_io(process),
            Route::Retire => self.retire(process),
        }
    }

    fn check_completion(&self) {
        if self.is_simulation_complete() && !self.finished.swap(true, Ordering::SeqCst) {
            log::info!("all processes retired");
            self.ready.close();
            self.io.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(trace: bool) -> SimulationContext {
        SimulationContext::new(SimulationConfig::new(Policy::Fcfs).with_trace(trace)).unwrap()
    }

    #[test]
    fn test_admit_assigns_monotonic_ids() {
        let ctx = context(false);
        let a = ctx.admit_process(ProcessSpec::new(0).with_burst(1));
        let b = ctx.admit_process(ProcessSpec::new(0).with_burst(1));
        assert_eq!((a, b), (0, 1));
        assert_eq!(ctx.ready().ids(), vec![0, 1]);
        assert_eq!(ctx.in_flight(), 2);
        assert!(ctx.trace().is_empty());
    }

    #[test]
    fn test_completion_requires_ingestion_signal() {
        let ctx = context(true);
        let id = ctx.admit_process(ProcessSpec::new(0).with_burst(1));
        let p = ctx.ready().pop_head().unwrap();
        ctx.retire(p);

        assert_eq!(ctx.in_flight(), 0);
        assert!(!ctx.is_simulation_complete());
        assert!(!ctx.is_finished());

        ctx.signal_ingestion_complete(1);
        assert!(ctx.is_simulation_complete());
        assert!(ctx.is_finished());
        assert!(ctx.ready().is_closed() && ctx.io_queue().is_closed());
        assert_eq!(
            ctx.trace(),
            vec![
                TraceEvent::Admit { process_id: id },
                TraceEvent::Retire { process_id: id }
            ]
        );
    }

    #[test]
    fn test_empty_simulation_completes_immediately() {
        let ctx = context(false);
        ctx.signal_ingestion_complete(0);
        assert!(ctx.is_simulation_complete());
        assert!(ctx.ready().wait_pop().is_none());
    }

    #[test]
    fn test_enqueue_ready_restarts_wait_clock() {
        let ctx = context(false);
        let id = ctx.admit_process(ProcessSpec::new(0).with_burst(1));
        let p = ctx.ready().pop_head().unwrap();
        let before = ctx.stats().get(id).unwrap().last_ready_at;
        std::thread::sleep(std::time::Duration::from_millis(2));
        ctx.enqueue_ready(p);
        assert!(ctx.stats().get(id).unwrap().last_ready_at > before);
        assert_eq!(ctx.ready().len(), 1);
    }

    #[test]
    fn test_cancel_closes_queues() {
        let ctx = context(false);
        ctx.admit_process(ProcessSpec::new(0).with_burst(1));
        ctx.cancel();
        assert!(ctx.is_cancelled());
        assert!(ctx.ready().wait_pop().is_none());
        assert!(!ctx.is_simulation_complete());
    }

    #[test]
    fn test_queue_names() {
        let ctx = context(false);
        assert_eq!(ctx.ready().name(), "ready");
        assert_eq!(ctx.io_queue().name(), "io");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SimulationConfig::new(Policy::RoundRobin { quantum: 0 });
        assert!(SimulationContext::new(config).is_err());
    }
}
