//! Built-in dispatching rules.
//!
//! # Score Convention
//! All rules return lower scores for processes that should run first.

use super::{DispatchingRule, RuleScore};
use crate::models::Process;

/// First come, first served.
///
/// Scores every process equally, so the engine's first-encountered
/// tie-break picks the queue head.
#[derive(Debug, Clone, Copy)]
pub struct Fcfs;

impl DispatchingRule for Fcfs {
    fn name(&self) -> &'static str {
        "FCFS"
    }

    fn evaluate(&self, _process: &Process) -> RuleScore {
        0
    }
}

/// Shortest job first.
///
/// Prioritizes the process with the least CPU time left across all of its
/// remaining bursts.
#[derive(Debug, Clone, Copy)]
pub struct Sjf;

impl DispatchingRule for Sjf {
    fn name(&self) -> &'static str {
        "SJF"
    }

    fn evaluate(&self, process: &Process) -> RuleScore {
        RuleScore::try_from(process.remaining_burst_total()).unwrap_or(RuleScore::MAX)
    }
}

/// Priority scheduling.
///
/// Higher `priority` runs first, so the score is the negated priority.
#[derive(Debug, Clone, Copy)]
pub struct Priority;

impl DispatchingRule for Priority {
    fn name(&self) -> &'static str {
        "PR"
    }

    fn evaluate(&self, process: &Process) -> RuleScore {
        -RuleScore::from(process.priority())
    }
}
