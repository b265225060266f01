//! Simulation controller.
//!
//! Runs the feed ingester, CPU dispatcher and I/O worker on three scoped
//! threads, joins them once the completion predicate fires, and builds the
//! report from the final stats.
//!
//! A feed file is opened before any worker starts, so an unreadable feed
//! aborts the run without side effects.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::thread;

use super::{
    CpuDispatcher, DispatchSummary, IoWorker, SimulationConfig, SimulationContext, TraceEvent,
};
use crate::error::SimError;
use crate::feed::{FeedIngester, IngestSummary};
use crate::report::SimulationReport;

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub report: SimulationReport,
    pub ingest: IngestSummary,
    pub dispatch: DispatchSummary,
    /// I/O bursts served.
    pub io_bursts: usize,
    /// Event log; empty unless tracing was enabled.
    pub trace: Vec<TraceEvent>,
}

/// Cancels the simulation if a worker unwinds, so the others do not wait
/// forever on queues nobody will feed.
struct CancelOnPanic<'a>(&'a SimulationContext);

impl Drop for CancelOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.cancel();
        }
    }
}

/// Drives one simulation run.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use u_procsim::dispatching::Policy;
/// use u_procsim::simulation::{Simulation, SimulationConfig};
///
/// let config = SimulationConfig::new(Policy::Fcfs).with_tick(Duration::from_micros(100));
/// let outcome = Simulation::new(config)
///     .unwrap()
///     .run("process 1 3 5 3 2\nstop\n".as_bytes())
///     .unwrap();
/// assert_eq!(outcome.report.processes, 1);
/// ```
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
}

impl Simulation {
    /// Rejects an invalid configuration up front.
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Opens the feed file and runs the simulation over it.
    pub fn run_file(&self, path: impl AsRef<Path>) -> Result<SimulationOutcome, SimError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SimError::FeedUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        self.run(BufReader::new(file))
    }

    /// Runs the simulation over an already-open feed.
    pub fn run<R: BufRead + Send>(&self, feed: R) -> Result<SimulationOutcome, SimError> {
        let ctx = SimulationContext::new(self.config.clone())?;
        self.run_with(&ctx, feed)
    }

    /// Runs the three workers against `ctx` and waits for all of them.
    pub fn run_with<R: BufRead + Send>(
        &self,
        ctx: &SimulationContext,
        feed: R,
    ) -> Result<SimulationOutcome, SimError> {
        log::info!("simulation starting: policy {}", ctx.policy());

        let (ingest, dispatch, io_bursts) = thread::scope(|s| {
            let spawn = |name: &'static str| thread::Builder::new().name(name.to_string());

            let ingester = spawn("feed")
                .spawn_scoped(s, move || {
                    let _guard = CancelOnPanic(ctx);
                    FeedIngester::new(ctx).run(feed)
                })
                .map_err(|source| SimError::WorkerSpawn {
                    name: "feed",
                    source,
                })?;

            let cpu = match spawn("cpu").spawn_scoped(s, || {
                let _guard = CancelOnPanic(ctx);
                CpuDispatcher::new(ctx).run()
            }) {
                Ok(handle) => handle,
                Err(source) => {
                    ctx.cancel();
                    return Err(SimError::WorkerSpawn { name: "cpu", source });
                }
            };

            let io = match spawn("io").spawn_scoped(s, || {
                let _guard = CancelOnPanic(ctx);
                IoWorker::new(ctx).run()
            }) {
                Ok(handle) => handle,
                Err(source) => {
                    ctx.cancel();
                    return Err(SimError::WorkerSpawn { name: "io", source });
                }
            };

            let ingest = ingester
                .join()
                .map_err(|_| SimError::WorkerPanicked("feed"))?;
            let dispatch = cpu.join().map_err(|_| SimError::WorkerPanicked("cpu"))?;
            let io_bursts = io.join().map_err(|_| SimError::WorkerPanicked("io"))?;
            Ok((ingest, dispatch, io_bursts))
        })?;

        for queue in [ctx.ready(), ctx.io_queue()] {
            let leftover = queue.drain().len();
            if leftover > 0 {
                log::warn!("{leftover} processes left unfinished in the {} queue", queue.name());
            }
        }

        let total_time = ctx.stats().last_retirement().unwrap_or_default();
        let report = SimulationReport::calculate(ctx.policy(), &ctx.snapshot_stats(), total_time);
        log::info!("simulation finished in {total_time:?}");

        Ok(SimulationOutcome {
            report,
            ingest,
            dispatch,
            io_bursts,
            trace: ctx.trace(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::Policy;
    use std::collections::HashMap;
    use std::time::Duration;

    fn simulation(policy: Policy) -> Simulation {
        let config = SimulationConfig::new(policy)
            .with_tick(Duration::from_micros(200))
            .with_trace(true);
        Simulation::new(config).unwrap()
    }

    const MIXED_FEED: &str = "\
process 1 5 4 2 3 1 2
process 5 3 6 2 1
sleep 2
process 3 1 5
process 2 7 1 1 1 1 1 1 1
stop
";

    #[test]
    fn test_all_policies_terminate() {
        for policy in [
            Policy::Fcfs,
            Policy::Sjf,
            Policy::Priority,
            Policy::RoundRobin { quantum: 2 },
        ] {
            let outcome = simulation(policy).run(MIXED_FEED.as_bytes()).unwrap();
            assert_eq!(outcome.ingest.admitted, 4, "{policy}");
            assert_eq!(outcome.report.processes, 4, "{policy}");
            assert!(outcome.report.rows.iter().all(|r| r.turnaround_ms.is_some()));
            assert_eq!(
                outcome.trace.iter().filter(|e| matches!(e, TraceEvent::Retire { .. })).count(),
                4
            );
        }
    }

    #[test]
    fn test_every_burst_consumed_exactly() {
        let outcome = simulation(Policy::RoundRobin { quantum: 2 })
            .run(MIXED_FEED.as_bytes())
            .unwrap();

        let mut cpu: HashMap<u64, u64> = HashMap::new();
        let mut io: HashMap<u64, u64> = HashMap::new();
        for event in &outcome.trace {
            match event {
                TraceEvent::Dispatch {
                    process_id, amount, ..
                } => *cpu.entry(*process_id).or_default() += amount,
                TraceEvent::Io { process_id, amount } => {
                    *io.entry(*process_id).or_default() += amount
                }
                _ => {}
            }
        }
        assert_eq!(cpu[&0], 4 + 3 + 2);
        assert_eq!(io[&0], 2 + 1);
        assert_eq!(cpu[&1], 7);
        assert_eq!(cpu[&2], 5);
        assert_eq!(cpu[&3], 4);
        assert_eq!(io[&3], 3);
        assert_eq!(outcome.io_bursts, 2 + 1 + 3);
        assert_eq!(outcome.dispatch.busy_units, 9 + 7 + 5 + 4);
    }

    #[test]
    fn test_process_never_in_two_places() {
        // Per process, events alternate admit -> (dispatch | io)* -> retire
        // and an I/O event always follows a dispatch routed to I/O.
        let outcome = simulation(Policy::Sjf).run(MIXED_FEED.as_bytes()).unwrap();
        for id in 0..4u64 {
            let events: Vec<_> = outcome
                .trace
                .iter()
                .filter(|e| e.process_id() == id)
                .collect();
            assert!(matches!(events.first(), Some(TraceEvent::Admit { .. })));
            assert!(matches!(events.last(), Some(TraceEvent::Retire { .. })));
            for pair in events.windows(2) {
                if let TraceEvent::Io { .. } = pair[1] {
                    assert!(matches!(
                        pair[0],
                        TraceEvent::Dispatch {
                            route: crate::models::Route::Io,
                            ..
                        }
                    ));
                }
            }
        }
    }

    #[test]
    fn test_empty_feed() {
        let outcome = simulation(Policy::Fcfs).run("stop\n".as_bytes()).unwrap();
        assert_eq!(outcome.report.processes, 0);
        assert_eq!(outcome.dispatch.dispatches, 0);
        assert!((outcome.report.throughput - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_feed_without_stop_still_terminates() {
        let outcome = simulation(Policy::Priority)
            .run("process 1 1 3\nnonsense\nprocess 2 1 3\n".as_bytes())
            .unwrap();
        assert!(!outcome.ingest.stopped);
        assert_eq!(outcome.ingest.skipped, 1);
        assert_eq!(outcome.report.processes, 2);
    }

    #[test]
    fn test_non_utf8_line_is_skipped() {
        let feed: &[u8] = b"process 1 1 3\n\xff\xfe bogus\nprocess 2 1 3\nstop\n";
        let outcome = simulation(Policy::Fcfs).run(feed).unwrap();
        assert_eq!(outcome.ingest.admitted, 2);
        assert_eq!(outcome.ingest.skipped, 1);
        assert!(outcome.ingest.stopped);
        assert_eq!(outcome.report.processes, 2);
    }

    #[test]
    fn test_overflowing_cpu_total_is_skipped() {
        let feed = "process 1 3 18446744073709551615 0 1\nprocess 1 1 2\nstop\n";
        let outcome = simulation(Policy::Sjf).run(feed.as_bytes()).unwrap();
        assert_eq!(outcome.ingest.admitted, 1);
        assert_eq!(outcome.ingest.skipped, 1);
        assert_eq!(outcome.report.processes, 1);
        assert_eq!(outcome.report.unfinished(), 0);
    }

    #[test]
    fn test_unreadable_feed_is_fatal() {
        let err = simulation(Policy::Fcfs)
            .run_file("/nonexistent/feed.txt")
            .unwrap_err();
        assert!(matches!(err, SimError::FeedUnreadable { .. }));
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let config = SimulationConfig::new(Policy::RoundRobin { quantum: 0 });
        assert!(matches!(
            Simulation::new(config),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_cancelled_run_returns() {
        let sim = simulation(Policy::Fcfs);
        let ctx = SimulationContext::new(sim.config().clone()).unwrap();
        ctx.cancel();
        let outcome = sim
            .run_with(&ctx, "process 1 1 50\nstop\n".as_bytes())
            .unwrap();
        assert_eq!(outcome.ingest.admitted, 0);
        assert_eq!(outcome.dispatch.dispatches, 0);
    }
}
