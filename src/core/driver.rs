use log::{debug, trace, warn};

use super::{
    event::SimEvent,
    observer::Observer,
    state::{ProcIdx, Process, SimCtx, Ticks},
    trace::{Trace, TraceRecorder},
};
use crate::{
    error::{Result, SimError},
    scheduler::{Dispatch, ENQ_ARRIVAL, ENQ_PREEMPTED, Policy, PolicyParams},
};

pub struct SimCore<P: Policy> {
    pub ctx: SimCtx,
    pub policy: P,
    recorder: TraceRecorder,
    observer: Observer,
    max_steps: u64,
}

/// Steps a correct run can take: every step either idles until an arrival or
/// ends a slice at a completion, an arrival, or a policy cut.
pub fn step_bound<P: Policy>(processes: &[Process], params: &PolicyParams) -> u64 {
    let n = processes.len() as u64;
    processes
        .iter()
        .map(|p| P::max_slices(p.burst, params))
        .fold(2 * n + 1, u64::saturating_add)
}

impl<P: Policy> SimCore<P> {
    /// `max_steps` overrides the bound derived from the workload.
    pub fn new(processes: Vec<Process>, params: &PolicyParams, max_steps: Option<u64>) -> Self {
        let max_steps = max_steps.unwrap_or_else(|| step_bound::<P>(&processes, params));
        let mut ctx = SimCtx::new(processes);
        let policy = P::init(&mut ctx, params);
        Self {
            ctx,
            policy,
            recorder: TraceRecorder::new(),
            observer: Observer::new(),
            max_steps,
        }
    }

    /// One decision: admit arrivals, ask the policy, apply its answer.
    pub fn step(&mut self) -> Result<Vec<SimEvent>> {
        if self.observer.steps() >= self.max_steps {
            return Err(self.stalled("step bound exceeded"));
        }

        let mut events = Vec::new();
        self.admit_arrivals(&mut events);

        match self.policy.select_and_advance(&mut self.ctx) {
            Dispatch::Run { process, slice } => self.run_slice(process, slice, &mut events)?,
            Dispatch::Idle { until: Some(until) } => {
                let from = self.ctx.now;
                debug!("t={from} idle until t={until}");
                self.ctx.advance_to(until);
                events.push(SimEvent::Idle { from, until });
            }
            Dispatch::Idle { until: None } => {
                return Err(self.stalled("nothing ready and nothing left to arrive"));
            }
        }

        if self.ctx.now > self.ctx.horizon() {
            return Err(self.stalled("clock passed the simulation horizon"));
        }

        self.observer.observe(&self.ctx);
        Ok(events)
    }

    /// Steps until every process has completed.
    pub fn run_to_completion(&mut self) -> Result<Vec<SimEvent>> {
        let mut events = Vec::new();
        while !self.ctx.all_completed() {
            events.extend(self.step()?);
        }
        Ok(events)
    }

    pub fn steps(&self) -> u64 {
        self.observer.steps()
    }

    /// Closes the trace and hands back the final arena.
    pub fn finish(self) -> (SimCtx, Trace) {
        let trace = self.recorder.finish();
        self.observer.observe_finish(&self.ctx, &trace);
        (self.ctx, trace)
    }

    fn admit_arrivals(&mut self, events: &mut Vec<SimEvent>) {
        for process in self.ctx.take_arrived() {
            let at = self.ctx.now;
            trace!("t={at} {} arrived", self.ctx.process(process).id);
            self.policy.enqueue(&mut self.ctx, process, ENQ_ARRIVAL);
            events.push(SimEvent::Arrived { process, at });
        }
    }

    fn run_slice(
        &mut self,
        process: ProcIdx,
        slice: Ticks,
        events: &mut Vec<SimEvent>,
    ) -> Result<()> {
        let slice = slice.min(self.ctx.process(process).remaining);
        if slice == 0 {
            return Err(self.stalled("policy dispatched an empty slice"));
        }

        let start = self.ctx.now;
        self.ctx.set_running(process);
        self.ctx.advance_time(slice);
        let end = self.ctx.now;

        let (id, remaining) = {
            let p = self.ctx.process_mut(process);
            p.remaining -= slice;
            (p.id, p.remaining)
        };
        debug!("t={start} run {id} for {slice} (remaining {remaining})");
        self.recorder.record(id, start, end);
        events.push(SimEvent::Dispatched {
            process,
            start,
            end,
        });

        // Arrivals during the slice queue ahead of the process it preempted
        self.admit_arrivals(events);
        self.ctx.clear_running();

        if remaining == 0 {
            self.ctx.mark_completed(process, end);
            debug!("t={end} {id} completed");
            events.push(SimEvent::Completed { process, at: end });
        } else {
            self.ctx.mark_ready(process);
            debug!("t={end} {id} preempted");
            self.policy.enqueue(&mut self.ctx, process, ENQ_PREEMPTED);
            events.push(SimEvent::Preempted { process, at: end });
        }
        Ok(())
    }

    fn stalled(&self, reason: &str) -> SimError {
        let step = self.observer.steps();
        let now = self.ctx.now;
        warn!(
            "{}: simulation stalled at step {step}, t={now}: {reason}",
            P::KIND.name()
        );
        SimError::SimulationStalled { step, now }
    }
}
