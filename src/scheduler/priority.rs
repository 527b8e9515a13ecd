use super::{
    Dispatch, ENQ_PREEMPTED, EnqueueFlags, Policy, PolicyKind, PolicyParams, ProcIdx, SimCtx,
    TieBreak, rank_for,
};
use crate::core::QueueId;

// Lower value wins; validation guarantees every process has one
fn priority_key(ctx: &SimCtx, process: ProcIdx) -> u64 {
    let priority = ctx.process(process).priority;
    debug_assert!(priority.is_some(), "Process {process} has no priority");
    priority.unwrap_or(u64::MAX)
}

/// Non-preemptive priority: best priority among arrived processes, run to completion.
pub struct PriorityPolicy {
    ready: QueueId,
    tie_break: TieBreak,
}

impl Policy for PriorityPolicy {
    const KIND: PolicyKind = PolicyKind::Priority;

    fn init(ctx: &mut SimCtx, params: &PolicyParams) -> Self {
        Self {
            ready: ctx.create_queue_ranked(),
            tie_break: params.tie_break,
        }
    }

    fn enqueue(&mut self, ctx: &mut SimCtx, process: ProcIdx, flags: EnqueueFlags) {
        debug_assert!(
            flags & ENQ_PREEMPTED == 0,
            "non-preemptive priority requeued process {process}"
        );
        let rank = rank_for(ctx, process, priority_key(ctx, process), self.tie_break);
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

/// Preemptive priority.
///
/// Runs the best-ranked ready process until it finishes or the next process
/// arrives, whichever comes first. Arrivals are the only events that can
/// change the ready set mid-run, so re-checking at those boundaries makes the
/// same decisions as re-checking every tick. The process cut off at an
/// arrival keeps the CPU unless a strictly more urgent one is queued, so an
/// arrival never triggers a tie-break between peers of equal priority. Its
/// back-to-back slices are coalesced by the trace recorder.
pub struct PreemptivePriorityPolicy {
    ready: QueueId,
    tie_break: TieBreak,
    // Cut off at an arrival, held outside the queue until the next decision
    incumbent: Option<ProcIdx>,
}

impl PreemptivePriorityPolicy {
    fn push(&self, ctx: &mut SimCtx, process: ProcIdx) {
        let rank = rank_for(ctx, process, priority_key(ctx, process), self.tie_break);
        ctx.queue_push_ranked(self.ready, process, rank);
    }
}

impl Policy for PreemptivePriorityPolicy {
    const KIND: PolicyKind = PolicyKind::PriorityPreemptive;

    fn init(ctx: &mut SimCtx, params: &PolicyParams) -> Self {
        Self {
            ready: ctx.create_queue_ranked(),
            tie_break: params.tie_break,
            incumbent: None,
        }
    }

    fn enqueue(&mut self, ctx: &mut SimCtx, process: ProcIdx, flags: EnqueueFlags) {
        if flags & ENQ_PREEMPTED != 0 {
            debug_assert!(
                self.incumbent.is_none(),
                "process {process} cut off while {:?} still holds the CPU",
                self.incumbent
            );
            self.incumbent = Some(process);
        } else {
            self.push(ctx, process);
        }
    }

    fn select_and_advance(&mut self, ctx: &mut SimCtx) -> Dispatch {
        let next = match self.incumbent.take() {
            Some(incumbent) => match ctx.queue_peek(self.ready) {
                Some(head) if priority_key(ctx, head) < priority_key(ctx, incumbent) => {
                    self.push(ctx, incumbent);
                    ctx.queue_pop(self.ready)
                }
                _ => Some(incumbent),
            },
            None => ctx.queue_pop(self.ready),
        };
        let Some(process) = next else {
            return Dispatch::idle(ctx);
        };

        let remaining = ctx.process(process).remaining;
        let slice = match ctx.next_arrival() {
            Some(arrival) if arrival > ctx.now => remaining.min(arrival - ctx.now),
            _ => remaining,
        };
        Dispatch::Run { process, slice }
    }
}
