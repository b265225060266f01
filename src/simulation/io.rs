//! I/O completion worker.
//!
//! Pops the I/O queue head, simulates its I/O burst outside the lock and
//! returns the process to the ready queue tail.

use super::{SimulationContext, TraceEvent};

#[derive(Debug)]
pub struct IoWorker<'a> {
    ctx: &'a SimulationContext,
}

impl<'a> IoWorker<'a> {
    pub fn new(ctx: &'a SimulationContext) -> Self {
        Self { ctx }
    }

    /// Runs until the I/O queue is closed. Returns the number of bursts served.
    pub fn run(&self) -> usize {
        log::info!("Starting I/O worker on the {} queue", self.ctx.io_queue().name());
        let mut served = 0;

        while let Some(mut process) = self.ctx.io_queue().wait_pop() {
            let id = process.id();
            match process.run_io() {
                Some(burst) => {
                    self.ctx.clock().simulate(burst);
                    served += 1;
                    log::debug!("process {id}: io {burst}");
                    self.ctx.record(TraceEvent::Io {
                        process_id: id,
                        amount: burst,
                    });
                }
                None => log::warn!("process {id} queued for I/O with no I/O burst left"),
            }
            self.ctx.enqueue_ready(process);
        }

        log::info!("Exiting I/O worker: {served} bursts");
        served
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::Policy;
    use crate::models::{Process, ProcessSpec};
    use crate::simulation::SimulationConfig;
    use std::thread;
    use std::time::Duration;

    fn context() -> SimulationContext {
        let config = SimulationConfig::new(Policy::Fcfs)
            .with_tick(Duration::from_micros(200))
            .with_trace(true);
        SimulationContext::new(config).unwrap()
    }

    #[test]
    fn test_io_returns_process_to_ready() {
        let ctx = context();
        let id = ctx.admit_process(ProcessSpec::new(0).with_bursts([1, 4, 1]));
        let mut p = ctx.ready().pop_head().unwrap();
        p.run_cpu(None);
        ctx.enqueue_io(p);

        thread::scope(|s| {
            let worker = s.spawn(|| IoWorker::new(&ctx).run());
            while ctx.ready().is_empty() {
                thread::sleep(Duration::from_millis(1));
            }
            ctx.cancel();
            assert_eq!(worker.join().unwrap(), 1);
        });

        let p: Process = ctx.ready().pop_head().unwrap();
        assert_eq!(p.id(), id);
        assert_eq!(p.io_cursor(), 1);
        assert!(ctx.io_queue().is_empty());
        assert!(ctx
            .trace()
            .contains(&TraceEvent::Io { process_id: id, amount: 4 }));
    }

    #[test]
    fn test_io_worker_exits_on_completion() {
        let ctx = context();
        ctx.signal_ingestion_complete(0);
        assert_eq!(IoWorker::new(&ctx).run(), 0);
    }
}
