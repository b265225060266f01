//! Concurrent simulation engine.
//!
//! Three workers share a `SimulationContext`:
//!
//! ```text
//!   feed ──admit──▶ ready ──▶ CPU dispatcher ──▶ retire
//!                     ▲            │
//!                     │ preempted  │ I/O pending
//!                     ├────────────┘
//!                     │            ▼
//!                     └──────  I/O queue ◀── I/O worker
//! ```
//!
//! - **`Simulation`**: controller; spawns, joins, reports
//! - **`CpuDispatcher`**: policy-driven selection and CPU slices
//! - **`IoWorker`**: I/O burst completion
//! - **`SimClock`**: maps burst units to wall-clock sleeps

mod clock;
mod config;
mod context;
mod controller;
mod cpu;
mod io;

pub use clock::SimClock;
pub use config::SimulationConfig;
pub use context::{SimulationContext, TraceEvent};
pub use controller::{Simulation, SimulationOutcome};
pub use cpu::{CpuDispatcher, DispatchSummary};
pub use io::IoWorker;
