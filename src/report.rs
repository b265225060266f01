//! Run summary metrics.
//!
//! Computes the end-of-run indicators from the final stats snapshot.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total run time | Simulation start to the last retirement |
//! | Throughput | Retired processes per millisecond of run time |
//! | Avg turnaround | Mean of retirement - admission |
//! | Avg wait | Mean time spent in the ready queue |
//!
//! All time values are in milliseconds.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::dispatching::Policy;
use crate::models::{as_ms, StatsSnapshot};

/// End-of-run indicators.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub policy: Policy,
    /// Processes admitted over the run.
    pub processes: usize,
    pub total_time_ms: f64,
    /// Processes per millisecond; zero for a zero-length run.
    pub throughput: f64,
    /// Averaged over retired processes only.
    pub avg_turnaround_ms: f64,
    pub avg_wait_ms: f64,
    pub rows: Vec<StatsSnapshot>,
}

impl SimulationReport {
    /// Builds the report from per-process snapshots and the total run time.
    pub fn calculate(policy: Policy, rows: &[StatsSnapshot], total_time: Duration) -> Self {
        let total_time_ms = as_ms(total_time);
        let mut total_turnaround = 0.0;
        let mut total_wait = 0.0;
        let mut retired: usize = 0;

        for row in rows {
            total_wait += row.wait_ms;
            if let Some(turnaround) = row.turnaround_ms {
                total_turnaround += turnaround;
                retired += 1;
            }
        }

        let processes = rows.len();
        let throughput = if total_time_ms > 0.0 {
            retired as f64 / total_time_ms
        } else {
            0.0
        };
        let avg_turnaround_ms = if retired == 0 {
            0.0
        } else {
            total_turnaround / retired as f64
        };
        let avg_wait_ms = if processes == 0 {
            0.0
        } else {
            total_wait / processes as f64
        };

        Self {
            policy,
            processes,
            total_time_ms,
            throughput,
            avg_turnaround_ms,
            avg_wait_ms,
            rows: rows.to_vec(),
        }
    }

    /// Processes that never retired (only non-zero for a cancelled run).
    pub fn unfinished(&self) -> usize {
        self.rows.iter().filter(|r| r.turnaround_ms.is_none()).count()
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CPU Scheduling alg.              :{}", self.policy)?;
        writeln!(f, "Total Run time                   :{:.6} ms", self.total_time_ms)?;
        writeln!(f, "Throughput                       :{:.6} proc/ms", self.throughput)?;
        writeln!(f, "Avg. Turnaround time             :{:.6} ms", self.avg_turnaround_ms)?;
        write!(f, "Avg. Waiting time in ready queue :{:.6} ms", self.avg_wait_ms)
    }
}
