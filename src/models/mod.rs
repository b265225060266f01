//! Simulation domain models.
//!
//! | Type | Role |
//! |------|------|
//! | `ProcessSpec` | Workload record before admission |
//! | `Process` | In-flight process with burst cursors |
//! | `StatsTable` | Per-process timing bookkeeping |
//! | `StatsSnapshot` | Exported timing row |

mod process;
mod stats;

pub use process::{CpuSlice, Process, ProcessId, ProcessSpec, Route};
pub use stats::{ProcessStats, StatsSnapshot, StatsTable};

pub(crate) use stats::as_ms;
