use super::{
    Dispatch, ENQ_PREEMPTED, EnqueueFlags, Policy, PolicyKind, PolicyParams, ProcIdx, SimCtx,
    TieBreak, rank_for,
};
use crate::core::QueueId;

/// Shortest-Job-Next: smallest burst among arrived processes, run to completion.
pub struct SjnPolicy {
    ready: QueueId,
    tie_break: TieBreak,
}

impl Policy for SjnPolicy {
    const KIND: PolicyKind = PolicyKind::Sjn;

    fn init(ctx: &mut SimCtx, params: &PolicyParams) -> Self {
        Self {
            ready: ctx.create_queue_ranked(),
            tie_break: params.tie_break,
        }
    }

    fn enqueue(&mut self, ctx: &mut SimCtx, process: ProcIdx, flags: EnqueueFlags) {
        debug_assert!(
            flags & ENQ_PREEMPTED == 0,
            "SJN never preempts, yet process {process} was requeued"
        );
        let rank = rank_for(ctx, process, ctx.process(process).burst, self.tie_break);
        ctx.queue_push_ranked(self.ready, process, rank);
    }

    fn select_and_advance(&mut self, ctx: &mut SimCtx) -> Dispatch {
        match ctx.queue_pop(self.ready) {
            Some(process) => Dispatch::Run {
                process,
                slice: ctx.process(process).remaining,
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

    fn admitted(specs: &[(u64, u64)]) -> (SimCtx, SjnPolicy) {
        let processes = specs
            .iter()
            .enumerate()
            .map(|(idx, &(arrival, burst))| {
                Process::new(idx, ProcessId(idx as u32), arrival, burst, None)
            })
            .collect();
        let mut ctx = SimCtx::new(processes);
        let mut policy = SjnPolicy::init(&mut ctx, &PolicyParams::default());
        for idx in ctx.take_arrived() {
            policy.enqueue(&mut ctx, idx, ENQ_ARRIVAL);
        }
        (ctx, policy)
    }

    #[test]
    fn picks_shortest_burst_for_its_full_length() {
        let (mut ctx, mut policy) = admitted(&[(0, 5), (0, 3), (0, 8)]);
        assert_eq!(
            policy.select_and_advance(&mut ctx),
            Dispatch::Run {
                process: 1,
                slice: 3
            }
        );
    }

    #[test]
    fn equal_bursts_fall_back_to_input_order() {
        let (mut ctx, mut policy) = admitted(&[(0, 4), (0, 2), (0, 2)]);
        assert_eq!(policy.select_and_advance(&mut ctx).process(), Some(1));
        assert_eq!(policy.select_and_advance(&mut ctx).process(), Some(2));
        assert_eq!(policy.select_and_advance(&mut ctx).process(), Some(0));
    }

    #[test]
    fn idles_until_next_arrival() {
        let (mut ctx, mut policy) = admitted(&[(4, 1), (6, 1), (9, 1)]);
        let decision = policy.select_and_advance(&mut ctx);
        assert_eq!(decision, Dispatch::Idle { until: Some(4) });
    }
}
