//! CPU dispatcher worker.
//!
//! # Cycle
//!
//! 1. Block until the ready queue holds a process, then remove the one the
//!    policy selects (lock released on return).
//! 2. Charge the time it waited in the ready queue.
//! 3. Run its next CPU burst, or one quantum of it under RR, outside any lock.
//! 4. Route it: back to ready (preempted), to I/O, or retire.
//!
//! The loop ends when the ready queue is closed, which happens once the
//! simulation is complete or cancelled.

use super::{SimulationContext, TraceEvent};
use crate::dispatching::RuleEngine;

/// Totals reported by the dispatcher when it exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// CPU slices run.
    pub dispatches: usize,
    /// Slices cut short by the RR quantum.
    pub preemptions: usize,
    /// Total burst units consumed.
    pub busy_units: u64,
}

#[derive(Debug)]
pub struct CpuDispatcher<'a> {
    ctx: &'a SimulationContext,
    engine: RuleEngine,
    quantum: Option<u64>,
}

impl<'a> CpuDispatcher<'a> {
    /// Uses the context's policy.
    pub fn new(ctx: &'a SimulationContext) -> Self {
        let policy = ctx.policy();
        Self {
            ctx,
            engine: policy.engine(),
            quantum: policy.quantum(),
        }
    }

    pub fn run(&self) -> DispatchSummary {
        log::info!(
            "Starting CPU dispatcher ({}) on the {} queue",
            self.ctx.policy(),
            self.ctx.ready().name()
        );
        log::debug!("selection: {:?}", self.engine);
        let mut summary = DispatchSummary::default();

        while let Some(mut process) = self
            .ctx
            .ready()
            .wait_take(|ready| self.engine.select_best(ready))
        {
            let id = process.id();
            let clock = self.ctx.clock();
            let waited = self.ctx.stats().record_dispatch(id, clock.now());

            let slice = process.run_cpu(self.quantum);
            if let Some(slice) = slice {
                clock.simulate(slice.amount);
                summary.busy_units += slice.amount;
                if slice.preempted {
                    summary.preemptions += 1;
                }
            }
            summary.dispatches += 1;

            let route = process.route_after(slice);
            let amount = slice.map_or(0, |s| s.amount);
            log::debug!("process {id}: cpu {amount} after waiting {waited:?}, -> {route:?}");
            self.ctx.record(TraceEvent::Dispatch {
                process_id: id,
                amount,
                preempted: slice.is_some_and(|s| s.preempted),
                cpu_cursor: process.cpu_cursor(),
                route,
            });

            self.ctx.route(process, route);
        }

        log::info!(
            "Exiting CPU dispatcher: {} dispatches, {} preemptions",
            summary.dispatches,
            summary.preemptions
        );
        summary
    }
}
