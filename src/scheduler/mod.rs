pub mod priority;
pub mod round_robin;
pub mod sjn;

use serde::{Deserialize, Serialize};

use crate::core::{
    Ticks,
    state::{ProcIdx, Rank, SimCtx},
};
pub use priority::{PreemptivePriorityPolicy, PriorityPolicy};
pub use round_robin::RoundRobinPolicy;
pub use sjn::SjnPolicy;

pub type EnqueueFlags = u64;

// Process just arrived
pub const ENQ_ARRIVAL: EnqueueFlags = 1 << 0;
// Process used up its slice with work left
pub const ENQ_PREEMPTED: EnqueueFlags = 1 << 1;

/// The four dispatch policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    Sjn,
    RoundRobin,
    Priority,
    PriorityPreemptive,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 4] = [
        Self::Sjn,
        Self::RoundRobin,
        Self::Priority,
        Self::PriorityPreemptive,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sjn => "Shortest Job Next",
            Self::RoundRobin => "Round Robin",
            Self::Priority => "Priority (non-preemptive)",
            Self::PriorityPreemptive => "Priority (preemptive)",
        }
    }

    pub fn requires_priority(&self) -> bool {
        matches!(self, Self::Priority | Self::PriorityPreemptive)
    }

    pub fn requires_quantum(&self) -> bool {
        matches!(self, Self::RoundRobin)
    }
}

/// How ties that survive arrival time (and priority, where a policy has one)
/// are resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Plain input order.
    #[default]
    InputOrder,
    /// Favor the process dispatched the fewest times so far, then input order.
    LeastDispatched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyParams {
    /// Round Robin slice length; ignored by the other policies.
    pub quantum: Ticks,
    pub tie_break: TieBreak,
}

impl Default for PolicyParams {
    fn default() -> Self {
        Self {
            quantum: 1,
            tie_break: TieBreak::InputOrder,
        }
    }
}

/// Outcome of one `select_and_advance` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Run `process` for `slice` ticks starting now.
    Run { process: ProcIdx, slice: Ticks },
    /// Nothing is ready. `until` is the next arrival, `None` if nothing is left to arrive.
    Idle { until: Option<Ticks> },
}

impl Dispatch {
    pub fn idle(ctx: &SimCtx) -> Self {
        Self::Idle {
            until: ctx.next_arrival(),
        }
    }

    pub fn process(&self) -> Option<ProcIdx> {
        match self {
            Self::Run { process, .. } => Some(*process),
            Self::Idle { .. } => None,
        }
    }
}

/// A dispatch policy driven by [`crate::core::SimCore`].
///
/// The driver admits arrivals through `enqueue`, asks `select_and_advance`
/// who runs next and for how long, then hands preempted processes back
/// through `enqueue` with `ENQ_PREEMPTED` after admitting anything that
/// arrived during the slice.
pub trait Policy {
    const KIND: PolicyKind;

    fn init(ctx: &mut SimCtx, params: &PolicyParams) -> Self;

    fn enqueue(&mut self, ctx: &mut SimCtx, process: ProcIdx, flags: EnqueueFlags);

    fn select_and_advance(&mut self, ctx: &mut SimCtx) -> Dispatch;

    /// Most slices a process of `burst` ticks can take, not counting cuts at
    /// arrivals. Sizes the driver's default step bound.
    fn max_slices(_burst: Ticks, _params: &PolicyParams) -> u64 {
        1
    }
}

/// Rank for ranked ready queues: `key`, then arrival, then (optionally)
/// dispatch count, then input order.
pub fn rank_for(ctx: &SimCtx, process: ProcIdx, key: u64, tie_break: TieBreak) -> Rank {
    let p = ctx.process(process);
    let dispatches = match tie_break {
        TieBreak::InputOrder => 0,
        TieBreak::LeastDispatched => p.dispatches,
    };
    Rank {
        key,
        arrival: p.arrival,
        dispatches,
        seq: p.idx,
    }
}
