//! Input checks run before a simulation starts.
//!
//! The first violation wins, in this order: process count, quantum, then per
//! process (input order) duplicate id, arrival, burst, priority, time limit.

use rustc_hash::FxHashSet;

use super::{
    config::{MAX_PROCESSES, MIN_PROCESSES},
    job::ProcessSpec,
};
use crate::{
    core::{Process, Ticks},
    error::{Result, SimError},
    scheduler::{PolicyKind, PolicyParams, TieBreak},
};

/// Largest `max(arrival) + sum(burst)` a run may reach. Per-run totals sum at
/// most `MAX_PROCESSES` values bounded by it, so they stay within `Ticks`.
pub const MAX_HORIZON: Ticks = Ticks::MAX / MAX_PROCESSES as Ticks;

/// Checks the quantum for `policy` and returns it as ticks (1 where unused).
pub fn validate_quantum(policy: PolicyKind, quantum: Option<i64>) -> Result<Ticks> {
    if !policy.requires_quantum() {
        return Ok(1);
    }
    match quantum {
        Some(q) if q > 0 => Ok(q as Ticks),
        _ => Err(SimError::InvalidQuantum { quantum }),
    }
}

/// Validates `specs` and builds a fresh process arena from them.
pub fn build_processes(specs: &[ProcessSpec], policy: PolicyKind) -> Result<Vec<Process>> {
    let mut seen = FxHashSet::default();
    let mut processes = Vec::with_capacity(specs.len());
    let mut latest_arrival: Ticks = 0;
    let mut total_burst: Ticks = 0;

    for (idx, spec) in specs.iter().enumerate() {
        if !seen.insert(spec.id) {
            return Err(SimError::DuplicateProcessId { id: spec.id });
        }
        if spec.arrival < 0 {
            return Err(SimError::InvalidArrival {
                id: spec.id,
                arrival: spec.arrival,
            });
        }
        if spec.burst <= 0 {
            return Err(SimError::InvalidBurst {
                id: spec.id,
                burst: spec.burst,
            });
        }
        let priority = match spec.priority {
            Some(p) if p > 0 => Some(p as u64),
            Some(_) => {
                return Err(SimError::InvalidPriority {
                    id: spec.id,
                    priority: spec.priority,
                });
            }
            None if policy.requires_priority() => {
                return Err(SimError::InvalidPriority {
                    id: spec.id,
                    priority: None,
                });
            }
            None => None,
        };

        let (arrival, burst) = (spec.arrival as Ticks, spec.burst as Ticks);
        latest_arrival = latest_arrival.max(arrival);
        total_burst = total_burst.saturating_add(burst);
        if latest_arrival.saturating_add(total_burst) > MAX_HORIZON {
            return Err(SimError::HorizonOverflow {
                id: spec.id,
                limit: MAX_HORIZON,
            });
        }

        processes.push(Process::new(idx, spec.id, arrival, burst, priority));
    }

    Ok(processes)
}

/// Full pre-run validation: count, quantum, then every process.
pub fn validate(
    specs: &[ProcessSpec],
    policy: PolicyKind,
    quantum: Option<i64>,
    tie_break: TieBreak,
) -> Result<(Vec<Process>, PolicyParams)> {
    if !(MIN_PROCESSES..=MAX_PROCESSES).contains(&specs.len()) {
        return Err(SimError::InvalidProcessCount {
            count: specs.len(),
            min: MIN_PROCESSES,
            max: MAX_PROCESSES,
        });
    }

    let quantum = validate_quantum(policy, quantum)?;
    let processes = build_processes(specs, policy)?;
    Ok((processes, PolicyParams { quantum, tie_break }))
}
