//! Run configuration and JSON scenarios.

use serde::{Deserialize, Serialize};

use super::job::ProcessSpec;
use crate::scheduler::{PolicyKind, TieBreak};

pub const MIN_PROCESSES: usize = 3;
pub const MAX_PROCESSES: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    pub policy: PolicyKind,
    /// Round Robin time quantum; required and positive for `round_robin`.
    #[serde(default)]
    pub quantum: Option<i64>,
    #[serde(default)]
    pub tie_break: TieBreak,
    /// Driver step bound. Unset, it is derived from the workload so that only
    /// a spinning engine can hit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<u64>,
}

impl SimConfig {
    pub fn new(policy: PolicyKind) -> Self {
        Self {
            policy,
            quantum: None,
            tie_break: TieBreak::default(),
            max_steps: None,
        }
    }

    pub fn sjn() -> Self {
        Self::new(PolicyKind::Sjn)
    }

    pub fn round_robin(quantum: i64) -> Self {
        Self {
            quantum: Some(quantum),
            ..Self::new(PolicyKind::RoundRobin)
        }
    }

    pub fn priority() -> Self {
        Self::new(PolicyKind::Priority)
    }

    pub fn priority_preemptive() -> Self {
        Self::new(PolicyKind::PriorityPreemptive)
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }
}

/// A config plus the process set to run it on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub config: SimConfig,
    pub processes: Vec<ProcessSpec>,
}

impl Scenario {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_json_fills_defaults() {
        let scenario = Scenario::from_json(
            r#"{
                "config": { "policy": "round_robin", "quantum": 2 },
                "processes": [
                    { "id": 0, "arrival": 0, "burst": 5 },
                    { "id": 1, "arrival": 1, "burst": 4, "priority": 2 },
                    { "id": 2, "arrival": 2, "burst": 2 }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(scenario.config, SimConfig::round_robin(2));
        assert_eq!(scenario.processes[1], ProcessSpec::new(1, 1, 4).with_priority(2));
        assert_eq!(scenario.processes[2].priority, None);
    }

    #[test]
    fn tie_break_is_snake_case() {
        let config: SimConfig = serde_json::from_str(
            r#"{ "policy": "priority_preemptive", "tie_break": "least_dispatched" }"#,
        )
        .unwrap();
        assert_eq!(
            config,
            SimConfig::priority_preemptive().with_tie_break(TieBreak::LeastDispatched)
        );
    }

    #[test]
    fn scenario_survives_json() {
        let scenario = Scenario {
            config: SimConfig::sjn().with_max_steps(50),
            processes: vec![ProcessSpec::new(7, 0, 3), ProcessSpec::new(8, 4, 1)],
        };
        let text = scenario.to_json().unwrap();
        assert_eq!(Scenario::from_json(&text).unwrap(), scenario);
    }
}
