use super::{
    Dispatch, EnqueueFlags, Policy, PolicyKind, PolicyParams, ProcIdx, SimCtx, TieBreak,
};
use crate::core::{QueueId, Ticks};

/// Round Robin over a single FIFO ready queue with a fixed quantum.
pub struct RoundRobinPolicy {
    ready: QueueId,
    quantum: Ticks,
    tie_break: TieBreak,
}

impl RoundRobinPolicy {
    // Among queued processes sharing the head's arrival and priority, the one
    // dispatched least; queue order breaks remaining ties.
    fn take_hungriest(&self, ctx: &mut SimCtx) -> Option<ProcIdx> {
        let head = ctx.fifo_iter(self.ready).next()?;
        let (arrival, priority) = {
            let p = ctx.process(head);
            (p.arrival, p.priority)
        };

        let chosen = ctx
            .fifo_iter(self.ready)
            .filter(|&idx| {
                let p = ctx.process(idx);
                p.arrival == arrival && p.priority == priority
            })
            .min_by_key(|&idx| ctx.process(idx).dispatches)
            .unwrap_or(head);

        ctx.queue_remove(self.ready, chosen).then_some(chosen)
    }
}

impl Policy for RoundRobinPolicy {
    const KIND: PolicyKind = PolicyKind::RoundRobin;

    // A zero quantum yields empty slices, which the driver reports as a stall
    fn init(ctx: &mut SimCtx, params: &PolicyParams) -> Self {
        Self {
            ready: ctx.create_queue_fifo(),
            quantum: params.quantum,
            tie_break: params.tie_break,
        }
    }

    fn enqueue(&mut self, ctx: &mut SimCtx, process: ProcIdx, _flags: EnqueueFlags) {
        ctx.queue_push_back(self.ready, process);
    }

    fn max_slices(burst: Ticks, params: &PolicyParams) -> u64 {
        match params.quantum {
            0 => burst,
            quantum => burst.div_ceil(quantum),
        }
    }

    fn select_and_advance(&mut self, ctx: &mut SimCtx) -> Dispatch {
        let next = match self.tie_break {
            TieBreak::InputOrder => ctx.queue_pop(self.ready),
            TieBreak::LeastDispatched => self.take_hungriest(ctx),
        };

        match next {
            Some(process) => Dispatch::Run {
                process,
                slice: self.quantum.min(ctx.process(process).remaining),
            },
            None => Dispatch::idle(ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Process, SimCtx};
    use crate::scheduler::ENQ_ARRIVAL;
    use crate::sim::ProcessId;

    fn setup(specs: &[(Ticks, Ticks)], params: PolicyParams) -> (SimCtx, RoundRobinPolicy) {
        let processes = specs
            .iter()
            .enumerate()
            .map(|(idx, &(arrival, burst))| {
                Process::new(idx, ProcessId(idx as u32), arrival, burst, Some(1))
            })
            .collect();
        let mut ctx = SimCtx::new(processes);
        let mut policy = RoundRobinPolicy::init(&mut ctx, &params);
        for idx in ctx.take_arrived() {
            policy.enqueue(&mut ctx, idx, ENQ_ARRIVAL);
        }
        (ctx, policy)
    }

    #[test]
    fn slice_is_quantum_or_remaining() {
        let params = PolicyParams {
            quantum: 3,
            ..PolicyParams::default()
        };
        let (mut ctx, mut policy) = setup(&[(0, 5), (0, 2), (0, 7)], params);

        assert_eq!(
            policy.select_and_advance(&mut ctx),
            Dispatch::Run {
                process: 0,
                slice: 3
            }
        );
        assert_eq!(
            policy.select_and_advance(&mut ctx),
            Dispatch::Run {
                process: 1,
                slice: 2
            }
        );
    }

    #[test]
    fn fifo_order_without_fairness_flag() {
        let params = PolicyParams {
            quantum: 2,
            ..PolicyParams::default()
        };
        let (mut ctx, mut policy) = setup(&[(0, 4), (0, 4), (0, 4)], params);
        // P0 has been fed before; plain FIFO ignores that
        ctx.process_mut(0).dispatches = 3;

        assert_eq!(policy.select_and_advance(&mut ctx).process(), Some(0));
    }

    #[test]
    fn fairness_flag_prefers_least_dispatched_peer() {
        let params = PolicyParams {
            quantum: 2,
            tie_break: TieBreak::LeastDispatched,
        };
        let (mut ctx, mut policy) = setup(&[(0, 4), (0, 4), (0, 4)], params);
        ctx.process_mut(0).dispatches = 2;
        ctx.process_mut(1).dispatches = 1;
        ctx.process_mut(2).dispatches = 1;

        assert_eq!(policy.select_and_advance(&mut ctx).process(), Some(1));
        assert_eq!(ctx.fifo_iter(policy.ready).collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn fairness_flag_only_compares_same_arrival_peers() {
        let params = PolicyParams {
            quantum: 2,
            tie_break: TieBreak::LeastDispatched,
        };
        let (mut ctx, mut policy) = setup(&[(0, 4), (1, 4), (5, 4)], params);
        ctx.advance_to(1);
        for idx in ctx.take_arrived() {
            policy.enqueue(&mut ctx, idx, ENQ_ARRIVAL);
        }
        ctx.process_mut(0).dispatches = 4;

        // P1 arrived later, so it is not a tie candidate for the head
        assert_eq!(policy.select_and_advance(&mut ctx).process(), Some(0));
    }
}
