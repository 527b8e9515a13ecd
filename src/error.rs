//! Error type for workload validation and simulation runs.
//!
//! Input-shape errors are detected before the first tick and name the
//! offending field. `SimulationStalled` is the only error a run can produce
//! once it has started; it means the engine broke an invariant, not that the
//! caller passed bad data.

use std::fmt;

use crate::core::Ticks;
use crate::sim::ProcessId;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SimError {
    /// Process count outside the accepted range.
    InvalidProcessCount { count: usize, min: usize, max: usize },
    /// Arrival time is negative.
    InvalidArrival { id: ProcessId, arrival: i64 },
    /// Burst time is zero or negative.
    InvalidBurst { id: ProcessId, burst: i64 },
    /// Priority missing or not positive under a priority-ordered policy.
    InvalidPriority { id: ProcessId, priority: Option<i64> },
    /// Round Robin quantum missing or not positive.
    InvalidQuantum { quantum: Option<i64> },
    /// Two processes share an id.
    DuplicateProcessId { id: ProcessId },
    /// Latest arrival plus total burst, counted up to this process, passes
    /// the simulated time limit.
    HorizonOverflow { id: ProcessId, limit: Ticks },
    /// The driver exceeded its step or simulated-time bound.
    SimulationStalled { step: u64, now: Ticks },
}

impl SimError {
    /// True for errors raised by input validation.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Self::SimulationStalled { .. })
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidProcessCount { count, min, max } => {
                write!(f, "invalid process count: {count} (expected {min}..={max})")
            }
            Self::InvalidArrival { id, arrival } => {
                write!(f, "process {id}: arrival time must be >= 0, got {arrival}")
            }
            Self::InvalidBurst { id, burst } => {
                write!(f, "process {id}: burst time must be > 0, got {burst}")
            }
            Self::InvalidPriority { id, priority } => match priority {
                Some(priority) => {
                    write!(f, "process {id}: priority must be > 0, got {priority}")
                }
                None => write!(f, "process {id}: priority is required by this policy"),
            },
            Self::InvalidQuantum { quantum } => match quantum {
                Some(quantum) => write!(f, "time quantum must be > 0, got {quantum}"),
                None => write!(f, "round robin requires a time quantum"),
            },
            Self::DuplicateProcessId { id } => write!(f, "duplicate process id {id}"),
            Self::HorizonOverflow { id, limit } => write!(
                f,
                "process {id}: workload would run past the {limit}-tick time limit"
            ),
            Self::SimulationStalled { step, now } => {
                write!(f, "simulation stalled at step {step} (t={now})")
            }
        }
    }
}

impl std::error::Error for SimError {}

pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_offending_field() {
        let err = SimError::InvalidBurst {
            id: ProcessId(3),
            burst: 0,
        };
        assert_eq!(err.to_string(), "process P3: burst time must be > 0, got 0");

        let err = SimError::InvalidQuantum { quantum: None };
        assert_eq!(err.to_string(), "round robin requires a time quantum");
    }

    #[test]
    fn stall_is_not_an_input_error() {
        assert!(!SimError::SimulationStalled { step: 9, now: 4 }.is_input_error());
        assert!(SimError::DuplicateProcessId { id: ProcessId(1) }.is_input_error());
    }
}
