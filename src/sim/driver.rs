use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::{
    config::SimConfig,
    job::{ProcessRecord, ProcessSpec},
    metrics::{self, Summary},
    validate,
};
use crate::{
    core::{SimEvent, Trace, driver::SimCore},
    error::Result,
    scheduler::{
        Policy, PolicyKind, PreemptivePriorityPolicy, PriorityPolicy, RoundRobinPolicy,
        SjnPolicy,
    },
};

/// The three artifacts a finished run hands to its consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimOutcome {
    pub policy: PolicyKind,
    /// Input order.
    pub processes: Vec<ProcessRecord>,
    pub trace: Trace,
    pub summary: Summary,
}

/// One simulation run under policy `P`.
///
/// Owns a private copy of the process set, so runs never observe each
/// other's progress.
pub struct Sim<P: Policy> {
    pub core: SimCore<P>,
    events: Vec<SimEvent>,
}

impl<P: Policy> Sim<P> {
    pub fn new(specs: &[ProcessSpec], config: &SimConfig) -> Result<Self> {
        if config.policy != P::KIND {
            warn!(
                "config names {} but running {}; validating for the latter",
                config.policy.name(),
                P::KIND.name()
            );
        }
        let (processes, params) =
            validate::validate(specs, P::KIND, config.quantum, config.tie_break)?;

        Ok(Self {
            core: SimCore::new(processes, &params, config.max_steps),
            events: Vec::new(),
        })
    }

    pub fn step(&mut self) -> Result<&[SimEvent]> {
        let start = self.events.len();
        let events = self.core.step()?;
        self.events.extend(events);
        Ok(&self.events[start..])
    }

    pub fn all_completed(&self) -> bool {
        self.core.ctx.all_completed()
    }

    /// Runs to completion and returns the outcome with every event emitted.
    pub fn run_with_events(mut self) -> Result<(SimOutcome, Vec<SimEvent>)> {
        info!(
            "{}: simulating {} processes",
            P::KIND.name(),
            self.core.ctx.process_count()
        );
        let events = self.core.run_to_completion()?;
        self.events.extend(events);

        let steps = self.core.steps();
        let (ctx, trace) = self.core.finish();
        let (processes, summary) = metrics::compute(&ctx.processes, &trace);
        info!(
            "{}: finished at t={} after {steps} steps ({} trace intervals)",
            P::KIND.name(),
            ctx.now,
            trace.len()
        );

        let outcome = SimOutcome {
            policy: P::KIND,
            processes,
            trace,
            summary,
        };
        Ok((outcome, self.events))
    }

    pub fn run(self) -> Result<SimOutcome> {
        self.run_with_events().map(|(outcome, _)| outcome)
    }
}

/// Validates `specs` and runs them under the policy named by `config`.
pub fn simulate(config: &SimConfig, specs: &[ProcessSpec]) -> Result<SimOutcome> {
    simulate_with_events(config, specs).map(|(outcome, _)| outcome)
}

pub fn simulate_with_events(
    config: &SimConfig,
    specs: &[ProcessSpec],
) -> Result<(SimOutcome, Vec<SimEvent>)> {
    match config.policy {
        PolicyKind::Sjn => Sim::<SjnPolicy>::new(specs, config)?.run_with_events(),
        PolicyKind::RoundRobin => Sim::<RoundRobinPolicy>::new(specs, config)?.run_with_events(),
        PolicyKind::Priority => Sim::<PriorityPolicy>::new(specs, config)?.run_with_events(),
        PolicyKind::PriorityPreemptive => {
            Sim::<PreemptivePriorityPolicy>::new(specs, config)?.run_with_events()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;

    fn specs() -> Vec<ProcessSpec> {
        vec![
            ProcessSpec::new(0, 0, 5).with_priority(2),
            ProcessSpec::new(1, 1, 3).with_priority(1),
            ProcessSpec::new(2, 2, 1).with_priority(3),
        ]
    }

    #[test]
    fn invalid_input_fails_before_running() {
        let mut bad = specs();
        bad[0].burst = -2;
        let err = simulate(&SimConfig::sjn(), &bad).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn stepping_exposes_events_incrementally() {
        let mut sim = Sim::<SjnPolicy>::new(&specs(), &SimConfig::sjn()).unwrap();
        let first = sim.step().unwrap().to_vec();
        assert_eq!(
            first,
            vec![
                SimEvent::Arrived { process: 0, at: 0 },
                SimEvent::Dispatched {
                    process: 0,
                    start: 0,
                    end: 5
                },
                SimEvent::Arrived { process: 1, at: 5 },
                SimEvent::Arrived { process: 2, at: 5 },
                SimEvent::Completed { process: 0, at: 5 },
            ]
        );
        while !sim.all_completed() {
            sim.step().unwrap();
        }
        let outcome = sim.run().unwrap();
        assert_eq!(outcome.summary.makespan, 9);
    }

    #[test]
    fn stall_aborts_without_partial_outcome() {
        let config = SimConfig::round_robin(1).with_max_steps(3);
        let err = simulate(&config, &specs()).unwrap_err();
        assert!(matches!(err, SimError::SimulationStalled { step: 3, .. }));
    }

    #[test]
    fn reruns_start_from_fresh_state() {
        let config = SimConfig::round_robin(2);
        let first = simulate(&config, &specs()).unwrap();
        let second = simulate(&config, &specs()).unwrap();
        assert_eq!(first, second);
    }
}
