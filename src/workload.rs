//! Random workload generation.
//!
//! Produces well-formed feeds for experiments and tests: every process has
//! an odd burst count (starts and ends on CPU), bursts and priorities stay
//! within the configured ranges, and the feed ends with `stop`.
//!
//! The generator is deterministic for a seeded RNG.
//!
//! # Example
//! ```
//! use rand::rngs::SmallRng;
//! use rand::SeedableRng;
//! use u_procsim::feed::Directive;
//! use u_procsim::workload::WorkloadGenerator;
//!
//! let mut rng = SmallRng::seed_from_u64(7);
//! let feed = WorkloadGenerator::new(5).with_burst_range(1, 10).generate(&mut rng);
//! assert_eq!(feed.last(), Some(&Directive::Stop));
//! ```

use std::time::Duration;

use rand::Rng;

use crate::feed::Directive;
use crate::models::ProcessSpec;

/// Builder for random feeds.
#[derive(Debug, Clone)]
pub struct WorkloadGenerator {
    processes: usize,
    max_bursts: usize,
    min_burst: u64,
    max_burst: u64,
    max_priority: i32,
    sleep_every: Option<usize>,
    sleep: Duration,
}

impl WorkloadGenerator {
    /// `processes` processes with up to 5 bursts of 1..=20 units and
    /// priorities 0..=10, no pacing.
    pub fn new(processes: usize) -> Self {
        Self {
            processes,
            max_bursts: 5,
            min_burst: 1,
            max_burst: 20,
            max_priority: 10,
            sleep_every: None,
            sleep: Duration::from_millis(10),
        }
    }

    /// Upper bound on bursts per process; rounded down to odd, at least 1.
    pub fn with_max_bursts(mut self, max_bursts: usize) -> Self {
        self.max_bursts = max_bursts.max(1);
        self
    }

    /// Inclusive burst length range. Bounds are swapped if reversed.
    pub fn with_burst_range(mut self, min: u64, max: u64) -> Self {
        self.min_burst = min.min(max);
        self.max_burst = min.max(max);
        self
    }

    /// Priorities are drawn from `0..=max_priority`.
    pub fn with_max_priority(mut self, max_priority: i32) -> Self {
        self.max_priority = max_priority.max(0);
        self
    }

    /// Inserts a `sleep` after every `every` processes.
    pub fn with_sleep_every(mut self, every: usize, sleep: Duration) -> Self {
        self.sleep_every = (every > 0).then_some(every);
        self.sleep = sleep;
        self
    }

    /// Draws one process spec.
    pub fn process<R: Rng + ?Sized>(&self, rng: &mut R) -> ProcessSpec {
        let max_odd = if self.max_bursts % 2 == 0 {
            self.max_bursts - 1
        } else {
            self.max_bursts
        };
        // Odd counts 1, 3, ..., max_odd.
        let count = 2 * rng.random_range(0..=max_odd / 2) + 1;
        let bursts: Vec<u64> = (0..count)
            .map(|_| rng.random_range(self.min_burst..=self.max_burst))
            .collect();
        ProcessSpec::new(rng.random_range(0..=self.max_priority)).with_bursts(bursts)
    }

    /// Generates the whole feed, `stop` included.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Directive> {
        let mut feed = Vec::with_capacity(self.processes + 1);
        for i in 0..self.processes {
            feed.push(Directive::Process(self.process(rng)));
            if let Some(every) = self.sleep_every {
                if (i + 1) % every == 0 && i + 1 < self.processes {
                    feed.push(Directive::Sleep(self.sleep));
                }
            }
        }
        feed.push(Directive::Stop);
        feed
    }

    /// Generates the feed as text, one directive per line.
    pub fn render<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        self.generate(rng)
            .iter()
            .map(|d| format!("{d}\n"))
            .collect()
    }
}
