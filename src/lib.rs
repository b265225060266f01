//! Concurrent CPU scheduling simulator.
//!
//! Simulates an operating-system dispatcher over a workload of processes,
//! each an alternating sequence of CPU and I/O bursts. Three workers run
//! concurrently: a feed ingester admits processes, a CPU dispatcher selects
//! and runs them under the active policy, and an I/O worker completes their
//! I/O bursts. Per-process turnaround and ready-queue waiting times feed the
//! end-of-run report.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `ProcessSpec`, `Process`, `StatsTable`
//! - **`queue`**: Lock-protected `ProcessQueue` with blocking selection
//! - **`dispatching`**: `Policy` and the rule engine behind FCFS, SJF, PR and RR
//! - **`simulation`**: Shared context, workers and the `Simulation` controller
//! - **`feed`**: Feed parsing and the ingestion worker
//! - **`report`**: Throughput, average turnaround and waiting time
//! - **`workload`**: Random feed generation
//! - **`validation`**: Configuration and process-spec checks
//! - **`error`**: Crate-level `SimError`
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use u_procsim::simulation::{Simulation, SimulationConfig};
//!
//! let config = SimulationConfig::from_args("RR", Some(2))
//!     .unwrap()
//!     .with_tick(Duration::from_micros(100));
//! let feed = "process 1 3 4 2 1\nprocess 5 1 3\nstop\n";
//! let outcome = Simulation::new(config).unwrap().run(feed.as_bytes()).unwrap();
//! assert_eq!(outcome.report.processes, 2);
//! ```
//!
//! # References
//!
//! - Silberschatz, Galvin, Gagne (2018), "Operating System Concepts", Ch. 5
//! - Tanenbaum, Bos (2014), "Modern Operating Systems", Ch. 2.4

pub mod dispatching;
pub mod error;
pub mod feed;
pub mod models;
pub mod queue;
pub mod report;
pub mod simulation;
pub mod validation;
pub mod workload;

pub use error::SimError;
