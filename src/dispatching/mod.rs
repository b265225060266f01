//! Dispatching policies and the rules behind them.
//!
//! A policy decides which ready process the CPU dispatcher takes next.
//! Selection is rule based: each rule scores a process, the engine takes
//! the lowest score, and the first process encountered wins ties.
//!
//! | Policy | Rule | Selects |
//! |--------|------|---------|
//! | FCFS | `rules::Fcfs` | queue head |
//! | SJF | `rules::Sjf` | least remaining CPU time |
//! | PR | `rules::Priority` | highest priority |
//! | RR | `rules::Fcfs` + quantum | queue head, preempted after `quantum` |
//!
//! # Usage
//!
//! ```
//! use u_procsim::dispatching::Policy;
//!
//! let policy = Policy::RoundRobin { quantum: 2 };
//! assert_eq!(policy.name(), "RR");
//! assert_eq!(policy.quantum(), Some(2));
//! let engine = policy.engine();
//! assert_eq!(engine.select_best(std::iter::empty()), None);
//! ```

mod engine;
pub mod rules;

pub use engine::RuleEngine;

use serde::Serialize;
use std::fmt::{self, Debug};

use crate::models::Process;

/// Score returned by a dispatching rule.
///
/// Lower scores = dispatched first.
pub type RuleScore = i64;

/// A dispatching rule that scores a ready process.
///
/// # Score Convention
/// **Lower score = higher priority.**
pub trait DispatchingRule: Send + Sync + Debug {
    /// Rule name (e.g., "SJF").
    fn name(&self) -> &'static str;

    /// Scores a process; lower is dispatched first.
    fn evaluate(&self, process: &Process) -> RuleScore;
}

/// CPU scheduling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Policy {
    /// First come, first served.
    Fcfs,
    /// Shortest job first, by remaining CPU time.
    Sjf,
    /// Highest priority first.
    Priority,
    /// Round robin with a fixed quantum (burst units).
    RoundRobin { quantum: u64 },
}

impl Policy {
    /// Short name as used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Policy::Fcfs => "FCFS",
            Policy::Sjf => "SJF",
            Policy::Priority => "PR",
            Policy::RoundRobin { .. } => "RR",
        }
    }

    /// Preemption quantum, RR only.
    pub fn quantum(&self) -> Option<u64> {
        match self {
            Policy::RoundRobin { quantum } => Some(*quantum),
            _ => None,
        }
    }

    /// Builds the rule engine implementing this policy's selection.
    pub fn engine(&self) -> RuleEngine {
        match self {
            Policy::Fcfs | Policy::RoundRobin { .. } => RuleEngine::new().with_rule(rules::Fcfs),
            Policy::Sjf => RuleEngine::new().with_rule(rules::Sjf),
            Policy::Priority => RuleEngine::new().with_rule(rules::Priority),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::RoundRobin { quantum } => write!(f, "RR, {quantum}"),
            other => f.write_str(other.name()),
        }
    }
}
