//! Input validation for simulations.
//!
//! Checks configuration and process definitions before anything runs.
//! Detects:
//! - Unknown policy names
//! - Missing or non-positive round-robin quantum
//! - Zero-length simulation tick
//! - Processes without bursts, or whose burst sequence does not end
//!   with a CPU burst
//! - Processes whose CPU total overflows
//!
//! Every check runs; all problems are reported together.

use std::fmt;
use std::time::Duration;

use crate::dispatching::Policy;
use crate::models::ProcessSpec;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Policy name is not one of FCFS, SJF, PR, RR.
    UnknownPolicy,
    /// RR selected without a quantum.
    MissingQuantum,
    /// Quantum is zero.
    NonPositiveQuantum,
    /// Simulation tick is zero.
    InvalidTick,
    /// A process has no bursts.
    EmptyProcess,
    /// A process's burst sequence ends with an I/O burst.
    TrailingIoBurst,
    /// A process's CPU bursts add up to more than `u64::MAX` units.
    CpuTotalOverflow,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Resolves a policy from its command-line name and optional quantum.
///
/// Names are case-insensitive. A quantum given with a non-RR policy is
/// ignored.
pub fn parse_policy(name: &str, quantum: Option<u64>) -> Result<Policy, Vec<ValidationError>> {
    let policy = match name.to_ascii_uppercase().as_str() {
        "FCFS" | "FIFO" => Policy::Fcfs,
        "SJF" => Policy::Sjf,
        "PR" => Policy::Priority,
        "RR" => match quantum {
            Some(quantum) => Policy::RoundRobin { quantum },
            None => {
                return Err(vec![ValidationError::new(
                    ValidationErrorKind::MissingQuantum,
                    "RR requires a quantum",
                )])
            }
        },
        other => {
            return Err(vec![ValidationError::new(
                ValidationErrorKind::UnknownPolicy,
                format!("Unknown policy '{other}' (expected FCFS, SJF, PR or RR)"),
            )])
        }
    };
    if quantum.is_some() && policy.quantum().is_none() {
        log::warn!("quantum ignored for policy {}", policy.name());
    }
    validate_policy(&policy)?;
    Ok(policy)
}

/// Validates a policy and simulation tick.
pub fn validate_config(policy: &Policy, tick: Duration) -> ValidationResult {
    let mut errors = validate_policy(policy).err().unwrap_or_default();
    if tick.is_zero() {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidTick,
            "Simulation tick must be greater than zero",
        ));
    }
    into_result(errors)
}

fn validate_policy(policy: &Policy) -> ValidationResult {
    match policy {
        Policy::RoundRobin { quantum: 0 } => Err(vec![ValidationError::new(
            ValidationErrorKind::NonPositiveQuantum,
            "quantum time must be an integer greater than zero",
        )]),
        _ => Ok(()),
    }
}

/// Validates one process definition.
///
/// Bursts alternate CPU, I/O, CPU, …; a well-formed sequence has an odd
/// length so it ends on a CPU burst.
pub fn validate_process(spec: &ProcessSpec) -> ValidationResult {
    let mut errors = Vec::new();
    if spec.bursts.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyProcess,
            "Process has no bursts",
        ));
    } else if spec.bursts.len() % 2 == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::TrailingIoBurst,
            format!(
                "Process has {} bursts; the sequence must end with a CPU burst",
                spec.bursts.len()
            ),
        ));
    }
    let total = spec
        .bursts
        .iter()
        .step_by(2)
        .try_fold(0u64, |total, &burst| total.checked_add(burst));
    if total.is_none() {
        errors.push(ValidationError::new(
            ValidationErrorKind::CpuTotalOverflow,
            "Process CPU bursts add up to more than the maximum burst total",
        ));
    }
    into_result(errors)
}

/// Validates a whole workload, prefixing each message with its position.
pub fn validate_workload(specs: &[ProcessSpec]) -> ValidationResult {
    let errors: Vec<_> = specs
        .iter()
        .enumerate()
        .filter_map(|(i, spec)| validate_process(spec).err().map(|e| (i, e)))
        .flat_map(|(i, errs)| {
            errs.into_iter().map(move |e| ValidationError {
                message: format!("process #{i}: {}", e.message),
                ..e
            })
        })
        .collect();
    into_result(errors)
}

fn into_result(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_policies() {
        assert_eq!(parse_policy("FCFS", None), Ok(Policy::Fcfs));
        assert_eq!(parse_policy("sjf", None), Ok(Policy::Sjf));
        assert_eq!(parse_policy("PR", Some(3)), Ok(Policy::Priority));
        assert_eq!(
            parse_policy("RR", Some(2)),
            Ok(Policy::RoundRobin { quantum: 2 })
        );
    }

    #[test]
    fn test_rr_without_quantum() {
        let errors = parse_policy("RR", None).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::MissingQuantum);
    }

    #[test]
    fn test_rr_zero_quantum() {
        let errors = parse_policy("RR", Some(0)).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::NonPositiveQuantum);
    }

    #[test]
    fn test_unknown_policy() {
        let errors = parse_policy("LOTTERY", None).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::UnknownPolicy);
        assert!(errors[0].message.contains("LOTTERY"));
    }

    #[test]
    fn test_config_collects_all_errors() {
        let errors =
            validate_config(&Policy::RoundRobin { quantum: 0 }, Duration::ZERO).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(validate_config(&Policy::Sjf, Duration::from_millis(1)).is_ok());
    }

    #[test]
    fn test_valid_process() {
        assert!(validate_process(&ProcessSpec::new(1).with_bursts([5, 3, 2])).is_ok());
        assert!(validate_process(&ProcessSpec::new(1).with_burst(0)).is_ok());
    }

    #[test]
    fn test_empty_process() {
        let errors = validate_process(&ProcessSpec::new(1)).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::EmptyProcess);
    }

    #[test]
    fn test_trailing_io_burst() {
        let errors = validate_process(&ProcessSpec::new(1).with_bursts([5, 3])).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::TrailingIoBurst);
    }

    #[test]
    fn test_cpu_total_overflow() {
        let spec = ProcessSpec::new(1).with_bursts([u64::MAX, 0, 1]);
        let errors = validate_process(&spec).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::CpuTotalOverflow);

        // Large I/O bursts do not count towards the CPU total.
        let spec = ProcessSpec::new(1).with_bursts([1, u64::MAX, u64::MAX - 1]);
        assert!(validate_process(&spec).is_ok());
    }

    #[test]
    fn test_workload_reports_positions() {
        let specs = vec![
            ProcessSpec::new(0).with_burst(4),
            ProcessSpec::new(0),
            ProcessSpec::new(0).with_bursts([1, 1]),
        ];
        let errors = validate_workload(&specs).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].message.starts_with("process #1"));
        assert!(errors[1].message.starts_with("process #2"));
    }
}
