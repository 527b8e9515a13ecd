use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::state::Ticks;

/// Stable process identifier, assigned by the caller and never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProcessId(pub u32);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Caller-supplied process description, checked before any run.
///
/// Fields are signed so structurally invalid input can be represented and
/// rejected instead of wrapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSpec {
    pub id: ProcessId,
    pub arrival: i64,
    pub burst: i64,
    #[serde(default)]
    pub priority: Option<i64>,
}

impl ProcessSpec {
    pub fn new(id: u32, arrival: i64, burst: i64) -> Self {
        Self {
            id: ProcessId(id),
            arrival,
            burst,
            priority: None,
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Final per-process figures of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub id: ProcessId,
    pub arrival: Ticks,
    pub burst: Ticks,
    pub priority: Option<u64>,
    pub completion_time: Ticks,
    pub turnaround_time: Ticks,
    pub waiting_time: Ticks,
    // Time from arrival to first dispatch
    pub response_time: Ticks,
}
