//! Simulation configuration.

use std::time::Duration;

use crate::dispatching::Policy;
use crate::error::SimError;
use crate::validation::{parse_policy, validate_config};

/// Settings consumed by the simulation core.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use u_procsim::dispatching::Policy;
/// use u_procsim::simulation::SimulationConfig;
///
/// let config = SimulationConfig::new(Policy::RoundRobin { quantum: 2 })
///     .with_tick(Duration::from_micros(500))
///     .with_trace(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Active dispatching policy.
    pub policy: Policy,
    /// Wall-clock length of one burst unit. Defaults to 1 ms, so feed
    /// burst values read as milliseconds.
    pub tick: Duration,
    /// Record dispatch, I/O and retirement events in memory.
    pub trace: bool,
}

impl SimulationConfig {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            tick: Duration::from_millis(1),
            trace: false,
        }
    }

    /// Builds a config from a policy name and optional quantum.
    pub fn from_args(policy: &str, quantum: Option<u64>) -> Result<Self, SimError> {
        Ok(Self::new(parse_policy(policy, quantum)?))
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Rejects a zero quantum or a zero tick.
    pub fn validate(&self) -> Result<(), SimError> {
        validate_config(&self.policy, self.tick)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::new(Policy::Sjf);
        assert_eq!(config.tick, Duration::from_millis(1));
        assert!(!config.trace);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_args() {
        let config = SimulationConfig::from_args("RR", Some(3)).unwrap();
        assert_eq!(config.policy, Policy::RoundRobin { quantum: 3 });
        assert!(matches!(
            SimulationConfig::from_args("RR", None),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_tick_rejected() {
        let config = SimulationConfig::new(Policy::Fcfs).with_tick(Duration::ZERO);
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }
}
